use bevy::math::{Rect, Vec2};
use bevy::prelude::{Event, Resource};
use tracing::{debug, info};

use crate::puzzle::grid::{GridGuides, ImageSize, PuzzleLayout, TextureQuad};
use crate::puzzle::scatter::{scatter_area, scatter_point};
use crate::puzzle::settings::PuzzleSettings;
use crate::puzzle::PuzzleError;

/// Pointer input for one frame, already mapped to board units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
}

/// What the controller reports back after consuming pointer input.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PuzzleEvent {
    PiecePicked(usize),
    PieceSnapped(usize),
    PieceDropped(usize),
    Completed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { piece: usize, grab_offset: Vec2 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
    /// Row-major, row 0 at the bottom of the image.
    pub index: usize,
    pub position: Vec2,
    pub target: Vec2,
    pub quad: TextureQuad,
    /// Snapped pieces no longer respond to the pointer.
    pub solved: bool,
    /// Held pieces render above everything else.
    pub raised: bool,
}

/// Owns every piece of the current puzzle and the single drag session.
#[derive(Resource, Debug, Default)]
pub struct PuzzleController {
    layout: Option<PuzzleLayout>,
    settings: PuzzleSettings,
    pieces: Vec<Piece>,
    /// Piece indices, bottom to top.
    draw_order: Vec<usize>,
    guides: GridGuides,
    drag: DragState,
    solved: usize,
    completed: bool,
}

impl PuzzleController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cuts `image` into pieces and scatters them over `viewport`.
    ///
    /// Any previous puzzle is discarded first.
    pub fn start(
        &mut self,
        image: ImageSize,
        settings: PuzzleSettings,
        viewport: Rect,
        rng: &mut fastrand::Rng,
    ) -> Result<(), PuzzleError> {
        let layout = PuzzleLayout::new(image, settings.difficulty())?;
        self.restart();

        self.pieces.extend((0..layout.piece_count()).map(|index| {
            let target = layout.target_position(index);
            Piece {
                index,
                position: target,
                target,
                quad: layout.texture_quad(index),
                solved: false,
                raised: false,
            }
        }));
        self.draw_order.extend(0..layout.piece_count());
        self.guides.rebuild(&layout);
        self.layout = Some(layout);
        self.settings = settings;
        self.scatter(viewport, rng);

        info!(
            "Puzzle started: {}x{} pieces from a {}x{} image",
            layout.grid.cols, layout.grid.rows, image.width, image.height
        );
        Ok(())
    }

    /// Places every unsolved piece at a random spot of `viewport`, kept one
    /// piece width away from its edges.
    pub fn scatter(&mut self, viewport: Rect, rng: &mut fastrand::Rng) {
        let Some(layout) = self.layout else {
            return;
        };
        let area = scatter_area(viewport, layout.piece_size.x);
        for piece in self.pieces.iter_mut().filter(|piece| !piece.solved) {
            piece.position = scatter_point(area, rng);
        }
    }

    /// Runs the drag/snap state machine over one frame of pointer input.
    pub fn update(&mut self, events: &[PointerEvent]) -> Vec<PuzzleEvent> {
        let mut output = Vec::new();
        for event in events {
            match *event {
                PointerEvent::Down(cursor) => self.pointer_down(cursor, &mut output),
                PointerEvent::Move(cursor) => self.pointer_move(cursor),
                PointerEvent::Up(cursor) => self.pointer_up(cursor, &mut output),
            }
        }
        output
    }

    fn pointer_down(&mut self, cursor: Vec2, output: &mut Vec<PuzzleEvent>) {
        if self.drag != DragState::Idle {
            return;
        }
        let Some(index) = self.piece_at(cursor) else {
            return;
        };

        self.bring_to_front(index);
        let Some(piece) = self.pieces.get_mut(index) else {
            return;
        };
        piece.raised = true;
        self.drag = DragState::Dragging {
            piece: index,
            grab_offset: piece.position - cursor,
        };
        debug!("Picked piece {index}");
        output.push(PuzzleEvent::PiecePicked(index));
    }

    fn pointer_move(&mut self, cursor: Vec2) {
        let DragState::Dragging { piece, grab_offset } = self.drag else {
            return;
        };
        if let Some(piece) = self.pieces.get_mut(piece) {
            piece.position = cursor + grab_offset;
        }
    }

    fn pointer_up(&mut self, cursor: Vec2, output: &mut Vec<PuzzleEvent>) {
        let DragState::Dragging { piece: index, .. } = self.drag else {
            return;
        };
        self.pointer_move(cursor);
        self.drag = DragState::Idle;
        let Some(piece) = self.pieces.get_mut(index) else {
            return;
        };
        piece.raised = false;
        let position = piece.position;

        if self.is_within_snap(index) {
            self.solve_piece(index, output);
        } else {
            debug!("Dropped piece {index} at {position}");
            output.push(PuzzleEvent::PieceDropped(index));
        }
    }

    fn bring_to_front(&mut self, index: usize) {
        if let Some(rank) = self.draw_order.iter().position(|&i| i == index) {
            self.draw_order.remove(rank);
            self.draw_order.push(index);
        }
    }

    fn solve_piece(&mut self, index: usize, output: &mut Vec<PuzzleEvent>) {
        let Some(piece) = self.pieces.get_mut(index) else {
            return;
        };
        if piece.solved {
            return;
        }
        piece.position = piece.target;
        piece.solved = true;
        piece.raised = false;
        self.solved += 1;
        output.push(PuzzleEvent::PieceSnapped(index));

        if self.solved == self.pieces.len() && !self.completed {
            self.completed = true;
            info!("Puzzle completed");
            output.push(PuzzleEvent::Completed);
        }
    }

    /// Whether the piece sits close enough to its target to snap.
    pub fn is_within_snap(&self, index: usize) -> bool {
        let Some(piece) = self.pieces.get(index) else {
            return false;
        };
        piece.position.distance(piece.target) < self.snap_threshold()
    }

    pub fn snap_threshold(&self) -> f32 {
        self.layout
            .map_or(0.0, |layout| self.settings.snap_threshold(layout.piece_size.x))
    }

    /// Topmost unsolved piece under `point`.
    pub fn piece_at(&self, point: Vec2) -> Option<usize> {
        let size = self.layout?.piece_size;
        self.draw_order.iter().rev().copied().find(|&index| {
            self.pieces.get(index).is_some_and(|piece| {
                !piece.solved && Rect::from_center_size(piece.position, size).contains(point)
            })
        })
    }

    /// Snaps every piece into place, bypassing the tolerance test.
    pub fn auto_solve(&mut self) -> Vec<PuzzleEvent> {
        let mut output = Vec::new();
        if self.pieces.is_empty() {
            return output;
        }
        info!("Auto-solving {} pieces", self.pieces.len() - self.solved);
        self.drag = DragState::Idle;
        for index in 0..self.pieces.len() {
            self.solve_piece(index, &mut output);
        }
        output
    }

    /// Drops the current puzzle. Storage is kept for the next start.
    pub fn restart(&mut self) {
        if self.layout.is_some() {
            info!("Puzzle restarted");
        }
        self.layout = None;
        self.pieces.clear();
        self.draw_order.clear();
        self.guides.clear();
        self.drag = DragState::Idle;
        self.solved = 0;
        self.completed = false;
    }

    pub const fn layout(&self) -> Option<&PuzzleLayout> {
        self.layout.as_ref()
    }

    pub const fn settings(&self) -> &PuzzleSettings {
        &self.settings
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, index: usize) -> Option<&Piece> {
        self.pieces.get(index)
    }

    pub fn draw_order(&self) -> &[usize] {
        &self.draw_order
    }

    pub const fn guides(&self) -> &GridGuides {
        &self.guides
    }

    pub const fn drag(&self) -> DragState {
        self.drag
    }

    pub const fn solved_count(&self) -> usize {
        self.solved
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub const fn is_started(&self) -> bool {
        self.layout.is_some()
    }

    pub const fn is_complete(&self) -> bool {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect {
        min: Vec2::new(-3.0, -2.0),
        max: Vec2::new(3.0, 2.0),
    };

    fn started(difficulty: u32, tolerance: u32) -> PuzzleController {
        let mut controller = PuzzleController::new();
        let settings = PuzzleSettings::new(difficulty, tolerance).unwrap();
        let mut rng = fastrand::Rng::with_seed(1);
        controller
            .start(ImageSize::new(800, 600), settings, VIEWPORT, &mut rng)
            .unwrap();
        controller
    }

    /// Lifts a piece from where it lies and drops it at `drop`.
    fn drag_to(controller: &mut PuzzleController, index: usize, drop: Vec2) -> Vec<PuzzleEvent> {
        controller.bring_to_front(index);
        let grab = controller.piece(index).unwrap().position;
        let events = controller.update(&[PointerEvent::Down(grab)]);
        assert_eq!(events, vec![PuzzleEvent::PiecePicked(index)]);
        controller.update(&[PointerEvent::Up(drop)])
    }

    #[test]
    fn start_builds_every_piece() {
        let controller = started(4, 2);
        assert_eq!(controller.piece_count(), 20);
        assert_eq!(controller.draw_order().len(), 20);
        assert_eq!(controller.guides().lines.len(), 7);
        assert_eq!(controller.solved_count(), 0);
        assert!(!controller.is_complete());
        for (index, piece) in controller.pieces().iter().enumerate() {
            assert_eq!(piece.index, index);
            assert!(!piece.solved);
        }
    }

    #[test]
    fn scatter_keeps_pieces_inside_inset_viewport() {
        let controller = started(6, 2);
        let width = controller.layout().unwrap().piece_size.x;
        let area = scatter_area(VIEWPORT, width);
        for piece in controller.pieces() {
            assert!(area.contains(piece.position));
        }
    }

    #[test]
    fn start_rejects_empty_image() {
        let mut controller = PuzzleController::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let result = controller.start(
            ImageSize::new(0, 0),
            PuzzleSettings::default(),
            VIEWPORT,
            &mut rng,
        );
        assert!(result.is_err());
        assert!(!controller.is_started());
    }

    #[test]
    fn pick_follows_cursor_with_grab_offset() {
        let mut controller = started(4, 2);
        let top = *controller.draw_order().last().unwrap();
        let origin = controller.piece(top).unwrap().position;
        let grab = origin + Vec2::new(0.01, -0.02);

        let events = controller.update(&[PointerEvent::Down(grab)]);
        assert_eq!(events, vec![PuzzleEvent::PiecePicked(top)]);
        assert!(controller.piece(top).unwrap().raised);

        controller.update(&[PointerEvent::Move(grab + Vec2::new(1.0, 0.5))]);
        let moved = controller.piece(top).unwrap().position;
        assert!((moved - (origin + Vec2::new(1.0, 0.5))).length() < 1e-5);
    }

    #[test]
    fn pick_selects_topmost_and_raises_it() {
        let mut controller = started(4, 2);
        for piece in &mut controller.pieces {
            piece.position = Vec2::ZERO;
        }
        let bottom = controller.draw_order()[0];
        let top = *controller.draw_order().last().unwrap();
        assert_eq!(controller.piece_at(Vec2::ZERO), Some(top));

        controller.draw_order.retain(|&i| i != bottom);
        controller.draw_order.push(bottom);
        assert_eq!(controller.piece_at(Vec2::ZERO), Some(bottom));

        controller.update(&[PointerEvent::Down(Vec2::ZERO)]);
        assert_eq!(controller.draw_order().last(), Some(&bottom));
    }

    #[test]
    fn pointer_down_on_empty_space_does_nothing() {
        let mut controller = started(4, 2);
        let events = controller.update(&[PointerEvent::Down(Vec2::new(100.0, 100.0))]);
        assert!(events.is_empty());
        assert_eq!(controller.drag(), DragState::Idle);
    }

    #[test]
    fn moves_and_releases_without_drag_are_ignored() {
        let mut controller = started(4, 2);
        let before = controller.pieces().to_vec();
        let events = controller.update(&[
            PointerEvent::Move(Vec2::ZERO),
            PointerEvent::Up(Vec2::ZERO),
        ]);
        assert!(events.is_empty());
        assert_eq!(controller.pieces(), before.as_slice());
    }

    #[test]
    fn drop_on_target_snaps() {
        let mut controller = started(4, 2);
        let target = controller.piece(3).unwrap().target;
        let events = drag_to(&mut controller, 3, target);
        assert_eq!(events, vec![PuzzleEvent::PieceSnapped(3)]);

        let piece = controller.piece(3).unwrap();
        assert_eq!(piece.position, target);
        assert!(piece.solved);
        assert!(!piece.raised);
        assert_eq!(controller.solved_count(), 1);
        assert_eq!(controller.piece_at(target), None);
    }

    #[test]
    fn drop_outside_threshold_stays_put() {
        let mut controller = started(4, 2);
        let threshold = controller.snap_threshold();
        let target = controller.piece(5).unwrap().target;
        let drop = target + Vec2::new(threshold * 1.01, 0.0);

        let events = drag_to(&mut controller, 5, drop);
        assert_eq!(events, vec![PuzzleEvent::PieceDropped(5)]);
        let piece = controller.piece(5).unwrap();
        assert!((piece.position - drop).length() < 1e-5);
        assert!(!piece.solved && !piece.raised);
        assert_eq!(controller.solved_count(), 0);
    }

    #[test]
    fn drop_just_inside_threshold_snaps() {
        let mut controller = started(4, 5);
        let threshold = controller.snap_threshold();
        let target = controller.piece(0).unwrap().target;
        let drop = target + Vec2::new(0.0, threshold * 0.9);
        let events = drag_to(&mut controller, 0, drop);
        assert_eq!(events, vec![PuzzleEvent::PieceSnapped(0)]);
        assert_eq!(controller.piece(0).unwrap().position, target);
    }

    #[test]
    fn zero_tolerance_snaps_anywhere() {
        let mut controller = started(3, 0);
        let events = drag_to(&mut controller, 2, Vec2::new(2.5, 1.5));
        assert_eq!(events, vec![PuzzleEvent::PieceSnapped(2)]);
    }

    #[test]
    fn completion_fires_once_on_last_piece() {
        let mut controller = started(2, 2);
        let count = controller.piece_count();
        let mut completions = 0;
        for index in 0..count {
            let target = controller.piece(index).unwrap().target;
            let events = drag_to(&mut controller, index, target);
            let completed = events.contains(&PuzzleEvent::Completed);
            assert_eq!(completed, index == count - 1);
            completions += usize::from(completed);
        }
        assert_eq!(completions, 1);
        assert_eq!(controller.solved_count(), count);
        assert!(controller.is_complete());
        assert!(controller.auto_solve().is_empty());
    }

    #[test]
    fn auto_solve_completes_mid_drag() {
        let mut controller = started(4, 2);
        let target = controller.piece(1).unwrap().target;
        drag_to(&mut controller, 1, target);
        controller.bring_to_front(2);
        let grab = controller.piece(2).unwrap().position;
        controller.update(&[PointerEvent::Down(grab)]);
        assert!(matches!(controller.drag(), DragState::Dragging { piece: 2, .. }));

        let events = controller.auto_solve();
        assert_eq!(events.last(), Some(&PuzzleEvent::Completed));
        assert_eq!(events.len(), controller.piece_count());
        assert_eq!(controller.solved_count(), controller.piece_count());
        assert_eq!(controller.drag(), DragState::Idle);
        assert!(controller.pieces().iter().all(|p| p.solved && p.position == p.target && !p.raised));

        // The release of the cancelled drag is ignored.
        assert!(controller.update(&[PointerEvent::Up(grab)]).is_empty());
    }

    #[test]
    fn auto_solve_without_puzzle_is_noop() {
        let mut controller = PuzzleController::new();
        assert!(controller.auto_solve().is_empty());
        assert_eq!(controller.solved_count(), 0);
    }

    #[test]
    fn drag_of_a_missing_piece_is_dropped_quietly() {
        let mut controller = started(4, 2);
        let before = controller.pieces().to_vec();
        controller.drag = DragState::Dragging {
            piece: 999,
            grab_offset: Vec2::ZERO,
        };

        let events = controller.update(&[PointerEvent::Move(Vec2::ONE), PointerEvent::Up(Vec2::ONE)]);

        assert!(events.is_empty());
        assert_eq!(controller.drag(), DragState::Idle);
        assert_eq!(controller.pieces(), before.as_slice());

        let mut output = Vec::new();
        controller.solve_piece(999, &mut output);
        assert!(output.is_empty());
        assert_eq!(controller.solved_count(), 0);
    }

    #[test]
    fn restart_clears_everything() {
        let mut controller = started(4, 2);
        controller.auto_solve();
        let capacity = controller.pieces.capacity();
        controller.restart();

        assert!(!controller.is_started());
        assert_eq!(controller.piece_count(), 0);
        assert!(controller.draw_order().is_empty());
        assert!(controller.guides().lines.is_empty());
        assert_eq!(controller.solved_count(), 0);
        assert!(!controller.is_complete());
        assert_eq!(controller.pieces.capacity(), capacity);

        controller.restart();
        assert_eq!(controller.piece_count(), 0);
    }

    #[test]
    fn restart_then_start_again() {
        let mut controller = started(4, 2);
        let target = controller.piece(0).unwrap().target;
        drag_to(&mut controller, 0, target);
        controller.restart();

        let mut rng = fastrand::Rng::with_seed(9);
        controller
            .start(ImageSize::new(600, 900), PuzzleSettings::new(2, 1).unwrap(), VIEWPORT, &mut rng)
            .unwrap();
        assert_eq!(controller.piece_count(), 6);
        assert_eq!(controller.solved_count(), 0);
        assert!(controller.pieces().iter().all(|p| !p.solved));
    }
}
