use bevy::prelude::*;

/// Which part of a press the caller is interested in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    JustPressed,
    Held,
    JustReleased,
}

/// Screen position of the left mouse button or the first touch in `phase`.
pub fn pointer_screen_position(
    phase: PointerPhase,
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    let mouse_active = match phase {
        PointerPhase::JustPressed => button_input.just_pressed(MouseButton::Left),
        PointerPhase::Held => button_input.pressed(MouseButton::Left),
        PointerPhase::JustReleased => button_input.just_released(MouseButton::Left),
    };
    if mouse_active {
        return windows.get_single().ok()?.cursor_position();
    }

    let touch = match phase {
        PointerPhase::JustPressed => touch_input.iter_just_pressed().next(),
        PointerPhase::Held => touch_input.iter().next(),
        PointerPhase::JustReleased => touch_input.iter_just_released().next(),
    }?;
    Some(touch.position())
}

/// Maps a viewport position to 2D world coordinates through the only camera.
pub fn screen_to_world(
    camera: &Query<(&Camera, &GlobalTransform)>,
    position: Vec2,
) -> Option<Vec2> {
    let (camera, camera_transform) = camera.get_single().ok()?;

    camera
        .viewport_to_world(camera_transform, position)
        .map(|ray| ray.origin.truncate())
        .ok()
}

pub fn pointer_world_position(
    phase: PointerPhase,
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let position = pointer_screen_position(phase, button_input, touch_input, windows)?;
    screen_to_world(camera, position)
}

/// Whether the pointer was let go this frame, wherever it was.
pub fn pointer_just_released(button_input: &ButtonInput<MouseButton>, touch_input: &Touches) -> bool {
    button_input.just_released(MouseButton::Left) || touch_input.any_just_released()
}
