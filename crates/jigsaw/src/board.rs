use bevy::prelude::*;
use bits_helpers::restart::{CleanupMarker, Restartable, cleanup_marked_entities};
use bits_helpers::{WINDOW_HEIGHT, WINDOW_WIDTH};

use crate::images::ImageCatalog;
use crate::puzzle::{ImageSize, LineSegment, Piece, PuzzleController, PuzzleEvent, PuzzleSettings};
use crate::{GameState, SelectedImage};

/// Share of the window the assembled puzzle may cover.
const BOARD_FILL: f32 = 0.7;

const GUIDE_WIDTH: f32 = 1.0;
const BORDER_WIDTH: f32 = 3.0;
const GUIDE_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.25);
const BORDER_COLOR: Color = Color::srgb(0.85, 0.85, 0.85);

// depth layers, lines stay under every piece
const GUIDE_Z: f32 = 0.0;
const BORDER_Z: f32 = 0.1;
const SOLVED_Z: f32 = 1.0;
const PIECE_Z: f32 = 2.0;
const PIECE_Z_STEP: f32 = 0.01;
const RAISED_Z: f32 = 10.0;

/// How the board maps onto the screen for the current puzzle.
#[derive(Resource, Debug, Clone)]
pub struct BoardView {
    /// World pixels per board unit.
    pub scale: f32,
    pub image: Handle<Image>,
    pub image_size: ImageSize,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            scale: 1.0,
            image: Handle::default(),
            image_size: ImageSize::new(1, 1),
        }
    }
}

impl BoardView {
    pub fn to_board(&self, world: Vec2) -> Vec2 {
        world / self.scale
    }

    pub fn to_world(&self, board: Vec2) -> Vec2 {
        board * self.scale
    }
}

/// Sprite entity of every piece, indexed like the controller's pieces.
#[derive(Resource, Default, Deref, DerefMut)]
struct PieceEntities(Vec<Entity>);

#[derive(Resource, Deref, DerefMut)]
pub struct PuzzleRng(pub fastrand::Rng);

impl Default for PuzzleRng {
    fn default() -> Self {
        Self(fastrand::Rng::new())
    }
}

#[derive(Component)]
struct PieceSprite;

#[derive(Component)]
struct GuideLine;

impl Restartable for PuzzleController {
    type State = GameState;

    fn reset(&mut self) {
        self.restart();
    }

    fn initial_state() -> Self::State {
        GameState::Select
    }
}

pub struct BoardPlugin;

impl Plugin for BoardPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PuzzleController>()
            .init_resource::<PuzzleSettings>()
            .init_resource::<PuzzleRng>()
            .init_resource::<BoardView>()
            .init_resource::<PieceEntities>()
            .add_event::<PuzzleEvent>()
            .add_systems(OnEnter(GameState::Playing), (start_puzzle, spawn_board).chain())
            .add_systems(
                OnEnter(GameState::Select),
                (cleanup_marked_entities, clear_board),
            )
            .add_systems(
                Update,
                (
                    sync_pieces,
                    complete_puzzle.run_if(in_state(GameState::Playing)),
                )
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Complete))),
            );
    }
}

/// Largest scale that keeps a `board`-sized puzzle within the fill share of `window`.
pub fn board_scale(window: Vec2, board: Vec2) -> f32 {
    let fit = window * BOARD_FILL / board;
    fit.x.min(fit.y)
}

pub fn start_puzzle(
    mut controller: ResMut<PuzzleController>,
    mut view: ResMut<BoardView>,
    mut rng: ResMut<PuzzleRng>,
    mut next_state: ResMut<NextState<GameState>>,
    settings: Res<PuzzleSettings>,
    selected: Res<SelectedImage>,
    catalog: Res<ImageCatalog>,
    windows: Query<&Window>,
) {
    let Some(entry) = catalog.get(selected.0) else {
        warn!("No image at catalog index {}", selected.0);
        next_state.set(GameState::Select);
        return;
    };

    let window = windows
        .get_single()
        .map_or(Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT), Window::size);
    view.scale = board_scale(window, Vec2::new(entry.size.aspect(), 1.0));
    view.image = entry.handle.clone();
    view.image_size = entry.size;

    let viewport = Rect::from_center_size(Vec2::ZERO, window / view.scale);
    if let Err(err) = controller.start(entry.size, *settings, viewport, &mut rng) {
        error!("Could not start puzzle with {}: {err}", entry.name);
        next_state.set(GameState::Select);
    }
}

fn spawn_board(
    mut commands: Commands,
    mut entities: ResMut<PieceEntities>,
    controller: Res<PuzzleController>,
    view: Res<BoardView>,
) {
    let Some(layout) = controller.layout() else {
        return;
    };
    let piece_size = view.to_world(layout.piece_size);

    entities.clear();
    for piece in controller.pieces() {
        let rank = controller
            .draw_order()
            .iter()
            .position(|&index| index == piece.index)
            .unwrap_or_default();
        let entity = commands
            .spawn((
                Sprite {
                    image: view.image.clone(),
                    rect: Some(piece.quad.pixel_rect(layout.image)),
                    custom_size: Some(piece_size),
                    ..default()
                },
                Transform::from_translation(piece_translation(&view, piece, rank)),
                PieceSprite,
                CleanupMarker,
            ))
            .id();
        entities.push(entity);
    }

    let guides = controller.guides();
    for line in &guides.lines {
        commands.spawn(line_sprite(&view, line, GUIDE_WIDTH, GUIDE_COLOR, GUIDE_Z));
    }
    for line in guides.border_segments() {
        commands.spawn(line_sprite(&view, &line, BORDER_WIDTH, BORDER_COLOR, BORDER_Z));
    }

    info!(
        "Spawned {} pieces, board scale {:.1}",
        entities.len(),
        view.scale
    );
}

fn line_sprite(
    view: &BoardView,
    line: &LineSegment,
    thickness: f32,
    color: Color,
    z: f32,
) -> impl Bundle {
    // overshoot by the thickness so the border corners close
    let length = view.scale.mul_add(line.length(), thickness);
    let size = if line.is_vertical() {
        Vec2::new(thickness, length)
    } else {
        Vec2::new(length, thickness)
    };
    (
        Sprite::from_color(color, size),
        Transform::from_translation(view.to_world(line.midpoint()).extend(z)),
        GuideLine,
        CleanupMarker,
    )
}

fn piece_translation(view: &BoardView, piece: &Piece, rank: usize) -> Vec3 {
    let z = if piece.solved {
        SOLVED_Z
    } else if piece.raised {
        (rank as f32).mul_add(PIECE_Z_STEP, PIECE_Z + RAISED_Z)
    } else {
        (rank as f32).mul_add(PIECE_Z_STEP, PIECE_Z)
    };
    view.to_world(piece.position).extend(z)
}

fn sync_pieces(
    controller: Res<PuzzleController>,
    view: Res<BoardView>,
    entities: Res<PieceEntities>,
    mut transforms: Query<&mut Transform, With<PieceSprite>>,
) {
    for (rank, &index) in controller.draw_order().iter().enumerate() {
        let (Some(piece), Some(&entity)) = (controller.piece(index), entities.get(index)) else {
            continue;
        };
        if let Ok(mut transform) = transforms.get_mut(entity) {
            transform.translation = piece_translation(&view, piece, rank);
        }
    }
}

fn complete_puzzle(
    mut puzzle_events: EventReader<PuzzleEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if puzzle_events
        .read()
        .any(|event| *event == PuzzleEvent::Completed)
    {
        info!("Puzzle complete");
        next_state.set(GameState::Complete);
    }
}

fn clear_board(mut entities: ResMut<PieceEntities>, mut controller: ResMut<PuzzleController>) {
    entities.clear();
    // a no-op after "Play again", needed when the start itself failed
    controller.restart();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_board_is_limited_by_width() {
        let scale = board_scale(Vec2::new(360.0, 640.0), Vec2::new(4.0 / 3.0, 1.0));
        assert!((scale - 360.0 * BOARD_FILL * 0.75).abs() < 1e-3);
    }

    #[test]
    fn tall_board_is_limited_by_height() {
        let scale = board_scale(Vec2::new(1000.0, 400.0), Vec2::new(0.5, 1.0));
        assert!((scale - 400.0 * BOARD_FILL).abs() < 1e-3);
    }

    #[test]
    fn view_round_trips_between_units() {
        let view = BoardView {
            scale: 200.0,
            ..default()
        };
        let board = Vec2::new(0.25, -0.4);
        assert_eq!(view.to_world(board), Vec2::new(50.0, -80.0));
        assert!((view.to_board(view.to_world(board)) - board).length() < 1e-6);
    }
}
