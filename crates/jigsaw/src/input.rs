use bevy::prelude::*;
use bits_helpers::input::{PointerPhase, pointer_just_released, pointer_world_position};
use leafwing_input_manager::prelude::*;

use crate::GameState;
use crate::board::BoardView;
use crate::puzzle::{PointerEvent, PuzzleController, PuzzleEvent};

#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum Action {
    AutoSolve,
    ClosePreview,
    ToggleMute,
    VolumeUp,
    VolumeDown,
}

pub fn create_input_map() -> InputMap<Action> {
    let mut input_map = InputMap::default();

    input_map.insert(Action::AutoSolve, KeyCode::F1);
    input_map.insert(Action::ClosePreview, KeyCode::Escape);
    input_map.insert(Action::ToggleMute, KeyCode::KeyM);
    input_map.insert(Action::VolumeUp, KeyCode::Equal);
    input_map.insert(Action::VolumeUp, KeyCode::NumpadAdd);
    input_map.insert(Action::VolumeDown, KeyCode::Minus);
    input_map.insert(Action::VolumeDown, KeyCode::NumpadSubtract);

    input_map
}

/// Last board position seen while the pointer was held. Touches report no
/// position on the frame they end, so the release falls back to this.
#[derive(Resource, Default)]
struct LastPointer(Vec2);

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<Action>::default())
            .init_resource::<LastPointer>()
            .add_systems(Startup, spawn_input_manager)
            .add_systems(
                Update,
                (pointer_input, auto_solve).run_if(in_state(GameState::Playing)),
            );
    }
}

fn spawn_input_manager(mut commands: Commands) {
    commands.spawn(InputManagerBundle::<Action> {
        input_map: create_input_map(),
        ..default()
    });
}

/// Collects this frame's pointer input in board units and feeds it to the
/// controller.
fn pointer_input(
    mut controller: ResMut<PuzzleController>,
    mut last_pointer: ResMut<LastPointer>,
    mut puzzle_events: EventWriter<PuzzleEvent>,
    view: Res<BoardView>,
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
    ui_buttons: Query<&Interaction, With<Button>>,
) {
    let board_position = |phase| {
        pointer_world_position(phase, &buttons, &touches, &windows, &camera)
            .map(|world| view.to_board(world))
    };

    let mut events = Vec::new();

    // presses that land on a button belong to the UI
    let over_ui = ui_buttons
        .iter()
        .any(|interaction| *interaction != Interaction::None);
    if let Some(position) = board_position(PointerPhase::JustPressed) {
        if !over_ui {
            events.push(PointerEvent::Down(position));
        }
    }
    if let Some(position) = board_position(PointerPhase::Held) {
        last_pointer.0 = position;
        events.push(PointerEvent::Move(position));
    }
    if pointer_just_released(&buttons, &touches) {
        let position = board_position(PointerPhase::JustReleased).unwrap_or(last_pointer.0);
        events.push(PointerEvent::Up(position));
    }

    if events.is_empty() {
        return;
    }
    puzzle_events.send_batch(controller.update(&events));
}

fn auto_solve(
    mut controller: ResMut<PuzzleController>,
    mut puzzle_events: EventWriter<PuzzleEvent>,
    action_query: Query<&ActionState<Action>>,
) {
    let Ok(action_state) = action_query.get_single() else {
        return;
    };
    if action_state.just_pressed(&Action::AutoSolve) {
        info!("Auto-solve requested");
        puzzle_events.send_batch(controller.auto_solve());
    }
}

