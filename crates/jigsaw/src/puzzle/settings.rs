use core::ops::RangeInclusive;

use bevy::prelude::Resource;

use crate::puzzle::PuzzleError;

/// Pieces along the shorter image side.
pub const DIFFICULTY_RANGE: RangeInclusive<u32> = 2..=6;
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Divisor of the piece width giving the snap radius. Zero snaps every drop.
pub const SNAPPING_TOLERANCE_RANGE: RangeInclusive<u32> = 0..=5;
pub const DEFAULT_SNAPPING_TOLERANCE: u32 = 2;

#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PuzzleSettings {
    difficulty: u32,
    snapping_tolerance: u32,
}

impl Default for PuzzleSettings {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            snapping_tolerance: DEFAULT_SNAPPING_TOLERANCE,
        }
    }
}

impl PuzzleSettings {
    pub fn new(difficulty: u32, snapping_tolerance: u32) -> Result<Self, PuzzleError> {
        if !DIFFICULTY_RANGE.contains(&difficulty) {
            return Err(PuzzleError::DifficultyOutOfRange(difficulty));
        }
        if !SNAPPING_TOLERANCE_RANGE.contains(&snapping_tolerance) {
            return Err(PuzzleError::ToleranceOutOfRange(snapping_tolerance));
        }
        Ok(Self {
            difficulty,
            snapping_tolerance,
        })
    }

    pub const fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub const fn snapping_tolerance(&self) -> u32 {
        self.snapping_tolerance
    }

    /// Snap radius for pieces of the given width.
    ///
    /// Smaller tolerance values give a looser radius.
    pub fn snap_threshold(&self, piece_width: f32) -> f32 {
        if self.snapping_tolerance == 0 {
            f32::INFINITY
        } else {
            piece_width / self.snapping_tolerance as f32
        }
    }

    pub fn cycle_difficulty(&mut self) {
        self.difficulty = next_in_range(self.difficulty, &DIFFICULTY_RANGE);
    }

    pub fn cycle_snapping_tolerance(&mut self) {
        self.snapping_tolerance = next_in_range(self.snapping_tolerance, &SNAPPING_TOLERANCE_RANGE);
    }
}

fn next_in_range(value: u32, range: &RangeInclusive<u32>) -> u32 {
    if value >= *range.end() {
        *range.start()
    } else {
        value + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_in_range() {
        let settings = PuzzleSettings::default();
        assert_eq!(
            PuzzleSettings::new(settings.difficulty(), settings.snapping_tolerance()),
            Ok(settings)
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert_eq!(
            PuzzleSettings::new(7, 2),
            Err(PuzzleError::DifficultyOutOfRange(7))
        );
        assert_eq!(
            PuzzleSettings::new(1, 2),
            Err(PuzzleError::DifficultyOutOfRange(1))
        );
        assert_eq!(
            PuzzleSettings::new(4, 6),
            Err(PuzzleError::ToleranceOutOfRange(6))
        );
    }

    #[test]
    fn cycling_wraps_around() {
        let mut settings = PuzzleSettings::new(6, 5).unwrap();
        settings.cycle_difficulty();
        settings.cycle_snapping_tolerance();
        assert_eq!(settings.difficulty(), 2);
        assert_eq!(settings.snapping_tolerance(), 0);

        settings.cycle_difficulty();
        settings.cycle_snapping_tolerance();
        assert_eq!(settings.difficulty(), 3);
        assert_eq!(settings.snapping_tolerance(), 1);
    }

    #[test]
    fn smaller_tolerance_is_looser() {
        let tight = PuzzleSettings::new(4, 5).unwrap();
        let loose = PuzzleSettings::new(4, 1).unwrap();
        assert!(loose.snap_threshold(0.25) > tight.snap_threshold(0.25));
        assert!((tight.snap_threshold(0.25) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn zero_tolerance_accepts_everything() {
        let settings = PuzzleSettings::new(4, 0).unwrap();
        assert!(settings.snap_threshold(0.25).is_infinite());
    }
}
