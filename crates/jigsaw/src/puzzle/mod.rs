//! Engine-independent puzzle logic: grid math, scatter and the drag/snap
//! state machine. The Bevy plugins in this crate only render and feed input
//! into [`PuzzleController`].

mod controller;
pub mod grid;
pub mod scatter;
pub mod settings;

pub use controller::{DragState, Piece, PointerEvent, PuzzleController, PuzzleEvent};
pub use grid::{
    grid_dimensions, GridGuides, GridSize, ImageSize, LineSegment, PuzzleLayout, TextureQuad,
    MAX_PIECES,
};
pub use settings::PuzzleSettings;
use settings::{DIFFICULTY_RANGE, SNAPPING_TOLERANCE_RANGE};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("Image has no area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error(
        "Difficulty {0} is outside {min}..={max}",
        min = DIFFICULTY_RANGE.start(),
        max = DIFFICULTY_RANGE.end()
    )]
    DifficultyOutOfRange(u32),

    #[error(
        "Snapping tolerance {0} is outside {min}..={max}",
        min = SNAPPING_TOLERANCE_RANGE.start(),
        max = SNAPPING_TOLERANCE_RANGE.end()
    )]
    ToleranceOutOfRange(u32),

    #[error("A {cols}x{rows} grid exceeds {max} pieces", max = MAX_PIECES)]
    GridTooLarge { cols: u64, rows: u64 },
}
