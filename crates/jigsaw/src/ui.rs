use bevy::prelude::*;
use bits_helpers::restart::{CleanupMarker, RestartButton, handle_restart};
use leafwing_input_manager::prelude::ActionState;

use crate::board::{BoardView, start_puzzle};
use crate::images::ImageCatalog;
use crate::input::Action;
use crate::puzzle::{PuzzleController, PuzzleSettings};
use crate::{GameState, SelectedImage};

const TITLE_FONT_SIZE: f32 = 32.0;
const BUTTON_FONT_SIZE: f32 = 20.0;
const THUMBNAIL_HEIGHT: f32 = 90.0;
const BUTTON_COLOR: Color = Color::srgb(0.15, 0.15, 0.2);
const OVERLAY_COLOR: Color = Color::srgba(0.0, 0.0, 0.0, 0.8);

#[derive(Component)]
struct LevelSelectPanel;

#[derive(Component)]
struct LevelButton(usize);

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
enum SettingButton {
    Difficulty,
    Tolerance,
}

impl SettingButton {
    fn label(self, settings: &PuzzleSettings) -> String {
        match self {
            Self::Difficulty => format!("Difficulty: {}", settings.difficulty()),
            Self::Tolerance => format!("Snap tolerance: {}", settings.snapping_tolerance()),
        }
    }
}

#[derive(Component)]
struct SettingLabel(SettingButton);

#[derive(Component)]
struct PreviewButton;

/// Full-screen view of the whole picture. Tapping it closes it again.
#[derive(Component)]
struct PreviewPanel;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Select), spawn_level_select)
            .add_systems(OnExit(GameState::Select), despawn_level_select)
            .add_systems(OnEnter(GameState::Playing), spawn_hud.after(start_puzzle))
            .add_systems(OnEnter(GameState::Complete), spawn_play_again)
            .add_systems(
                Update,
                (
                    spawn_level_select.run_if(resource_changed::<ImageCatalog>),
                    level_buttons,
                    setting_buttons,
                    update_setting_labels.run_if(resource_changed::<PuzzleSettings>),
                )
                    .chain()
                    .run_if(in_state(GameState::Select)),
            )
            .add_systems(
                Update,
                (toggle_preview, close_preview)
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Complete))),
            )
            .add_systems(
                Update,
                handle_restart::<PuzzleController>.run_if(in_state(GameState::Complete)),
            );
    }
}

fn button_node() -> Node {
    Node {
        padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
        margin: UiRect::all(Val::Px(6.0)),
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        ..default()
    }
}

fn button_text(label: impl Into<String>) -> impl Bundle {
    (
        Text::new(label),
        TextFont {
            font_size: BUTTON_FONT_SIZE,
            ..default()
        },
        TextColor(Color::WHITE),
    )
}

/// Builds the selection screen, replacing any previous one.
fn spawn_level_select(
    mut commands: Commands,
    catalog: Res<ImageCatalog>,
    settings: Res<PuzzleSettings>,
    panels: Query<Entity, With<LevelSelectPanel>>,
) {
    for panel in &panels {
        commands.entity(panel).despawn_recursive();
    }

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
            LevelSelectPanel,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Pick a picture"),
                TextFont {
                    font_size: TITLE_FONT_SIZE,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));

            parent
                .spawn(Node {
                    width: Val::Percent(100.0),
                    flex_wrap: FlexWrap::Wrap,
                    justify_content: JustifyContent::Center,
                    margin: UiRect::vertical(Val::Px(20.0)),
                    ..default()
                })
                .with_children(|parent| {
                    for (index, entry) in catalog.iter().enumerate() {
                        parent.spawn((
                            Node {
                                width: Val::Px(THUMBNAIL_HEIGHT * entry.size.aspect()),
                                height: Val::Px(THUMBNAIL_HEIGHT),
                                margin: UiRect::all(Val::Px(6.0)),
                                ..default()
                            },
                            ImageNode::new(entry.handle.clone()),
                            Button,
                            LevelButton(index),
                        ));
                    }
                });

            for setting in [SettingButton::Difficulty, SettingButton::Tolerance] {
                parent
                    .spawn((button_node(), BackgroundColor(BUTTON_COLOR), Button, setting))
                    .with_children(|parent| {
                        parent.spawn((button_text(setting.label(&settings)), SettingLabel(setting)));
                    });
            }
        });
}

fn despawn_level_select(mut commands: Commands, panels: Query<Entity, With<LevelSelectPanel>>) {
    for panel in &panels {
        commands.entity(panel).despawn_recursive();
    }
}

fn level_buttons(
    mut selected: ResMut<SelectedImage>,
    mut next_state: ResMut<NextState<GameState>>,
    interaction_query: Query<(&Interaction, &LevelButton), Changed<Interaction>>,
) {
    for (interaction, level) in &interaction_query {
        if *interaction == Interaction::Pressed {
            info!("Image {} selected", level.0);
            selected.0 = level.0;
            next_state.set(GameState::Playing);
        }
    }
}

fn setting_buttons(
    mut settings: ResMut<PuzzleSettings>,
    interaction_query: Query<(&Interaction, &SettingButton), Changed<Interaction>>,
) {
    for (interaction, setting) in &interaction_query {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match setting {
            SettingButton::Difficulty => settings.cycle_difficulty(),
            SettingButton::Tolerance => settings.cycle_snapping_tolerance(),
        }
    }
}

fn update_setting_labels(
    settings: Res<PuzzleSettings>,
    mut labels: Query<(&mut Text, &SettingLabel)>,
) {
    for (mut text, label) in &mut labels {
        text.0 = label.0.label(&settings);
    }
}

fn spawn_hud(mut commands: Commands, view: Res<BoardView>) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            CleanupMarker,
        ))
        .with_children(|parent| {
            parent
                .spawn((button_node(), BackgroundColor(BUTTON_COLOR), Button, PreviewButton))
                .with_children(|parent| {
                    parent.spawn(button_text("View picture"));
                });
        });

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
            BackgroundColor(OVERLAY_COLOR),
            GlobalZIndex(1),
            Visibility::Hidden,
            Button,
            PreviewPanel,
            CleanupMarker,
        ))
        .with_children(|parent| {
            parent.spawn((
                Node {
                    width: Val::Percent(90.0),
                    aspect_ratio: Some(view.image_size.aspect()),
                    ..default()
                },
                ImageNode::new(view.image.clone()),
            ));
        });
}

fn toggle_preview(
    interaction_query: Query<
        &Interaction,
        (Changed<Interaction>, Or<(With<PreviewButton>, With<PreviewPanel>)>),
    >,
    mut panels: Query<&mut Visibility, With<PreviewPanel>>,
) {
    if !interaction_query
        .iter()
        .any(|interaction| *interaction == Interaction::Pressed)
    {
        return;
    }
    for mut visibility in &mut panels {
        *visibility = match *visibility {
            Visibility::Hidden => Visibility::Visible,
            _ => Visibility::Hidden,
        };
    }
}

fn close_preview(
    action_query: Query<&ActionState<Action>>,
    mut panels: Query<&mut Visibility, With<PreviewPanel>>,
) {
    let Ok(action_state) = action_query.get_single() else {
        return;
    };
    if action_state.just_pressed(&Action::ClosePreview) {
        for mut visibility in &mut panels {
            *visibility = Visibility::Hidden;
        }
    }
}

fn spawn_play_again(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                bottom: Val::Px(30.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                ..default()
            },
            CleanupMarker,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Puzzle complete!"),
                TextFont {
                    font_size: TITLE_FONT_SIZE,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            parent
                .spawn((button_node(), BackgroundColor(BUTTON_COLOR), Button, RestartButton))
                .with_children(|parent| {
                    parent.spawn(button_text("Play again"));
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_labels_follow_the_settings() {
        let settings = PuzzleSettings::new(3, 0).unwrap();
        assert_eq!(SettingButton::Difficulty.label(&settings), "Difficulty: 3");
        assert_eq!(SettingButton::Tolerance.label(&settings), "Snap tolerance: 0");
    }
}
