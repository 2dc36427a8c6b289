#![allow(clippy::type_complexity)]

mod audio;
mod board;
mod images;
mod input;
pub mod puzzle;
mod ribbit;
mod ui;

use bevy::prelude::*;

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Default, States)]
pub enum GameState {
    /// Picking an image and the settings.
    #[default]
    Select,
    Playing,
    /// Every piece is in place, waiting for "Play again".
    Complete,
}

/// Catalog index of the image being played.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct SelectedImage(pub usize);

#[derive(Component)]
struct MainCamera;

pub fn run() {
    bits_helpers::get_default_app::<ribbit::Jigsaw>(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        .init_state::<GameState>()
        .init_resource::<SelectedImage>()
        .add_plugins(images::ImagesPlugin)
        .add_plugins(board::BoardPlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(ui::UiPlugin)
        .add_plugins(audio::GameAudioPlugin)
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn((Camera2d, MainCamera));
}
