use bevy::math::{Rect, Vec2};

use crate::puzzle::settings::DIFFICULTY_RANGE;
use crate::puzzle::PuzzleError;

/// Pixel dimensions of a source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_portrait(self) -> bool {
        self.width < self.height
    }

    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub cols: u32,
    pub rows: u32,
}

impl GridSize {
    pub fn piece_count(self) -> usize {
        usize::try_from(u64::from(self.cols) * u64::from(self.rows)).unwrap_or(usize::MAX)
    }

    /// Row and column of a row-major piece index.
    pub const fn cell(self, index: usize) -> (u32, u32) {
        let cols = self.cols as usize;
        match (index.checked_div(cols), index.checked_rem(cols)) {
            (Some(row), Some(col)) => (row as u32, col as u32),
            _ => (0, 0),
        }
    }
}

/// Upper bound on the pieces of one puzzle. Extremely thin images would
/// otherwise produce grids no board can show.
pub const MAX_PIECES: u64 = 10_000;

/// Number of pieces along each axis.
///
/// `difficulty` pieces go along the shorter image side, the longer side gets
/// proportionally more, truncated. Truncation can leave pieces slightly
/// rectangular. Grids above [`MAX_PIECES`] are rejected.
pub fn grid_dimensions(image: ImageSize, difficulty: u32) -> Result<GridSize, PuzzleError> {
    if image.width == 0 || image.height == 0 {
        return Err(PuzzleError::EmptyImage {
            width: image.width,
            height: image.height,
        });
    }
    if !DIFFICULTY_RANGE.contains(&difficulty) {
        return Err(PuzzleError::DifficultyOutOfRange(difficulty));
    }

    let scaled = |long: u32, short: u32| u64::from(difficulty) * u64::from(long) / u64::from(short);
    let (cols, rows) = if image.is_portrait() {
        (u64::from(difficulty), scaled(image.height, image.width))
    } else {
        (scaled(image.width, image.height), u64::from(difficulty))
    };

    if cols * rows > MAX_PIECES {
        return Err(PuzzleError::GridTooLarge { cols, rows });
    }
    let (Ok(cols), Ok(rows)) = (u32::try_from(cols), u32::try_from(rows)) else {
        return Err(PuzzleError::GridTooLarge { cols, rows });
    };
    Ok(GridSize { cols, rows })
}

/// Texture coordinates of one piece, normalized with v pointing up.
///
/// Corners wind counter-clockwise from the bottom-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureQuad {
    pub corners: [Vec2; 4],
}

impl TextureQuad {
    pub const fn min(&self) -> Vec2 {
        self.corners[0]
    }

    pub const fn max(&self) -> Vec2 {
        self.corners[2]
    }

    /// Region of the source image in pixels, y pointing down as in image space.
    pub fn pixel_rect(&self, image: ImageSize) -> Rect {
        let size = Vec2::new(image.width as f32, image.height as f32);
        let (min, max) = (self.min(), self.max());
        Rect::new(
            min.x * size.x,
            (1.0 - max.y) * size.y,
            max.x * size.x,
            (1.0 - min.y) * size.y,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    pub start: Vec2,
    pub end: Vec2,
}

impl LineSegment {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) / 2.0
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }
}

/// Outline of the assembled puzzle and the dividers between its cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridGuides {
    /// Clockwise from the top-left corner.
    pub border: [Vec2; 4],
    pub lines: Vec<LineSegment>,
}

impl GridGuides {
    pub fn clear(&mut self) {
        self.border = [Vec2::ZERO; 4];
        self.lines.clear();
    }

    pub fn rebuild(&mut self, layout: &PuzzleLayout) {
        self.clear();

        let half = layout.board_size() / 2.0;
        self.border = [
            Vec2::new(-half.x, half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(-half.x, -half.y),
        ];

        for col in 1..layout.grid.cols {
            let x = (col as f32).mul_add(layout.piece_size.x, -half.x);
            self.lines.push(LineSegment {
                start: Vec2::new(x, -half.y),
                end: Vec2::new(x, half.y),
            });
        }
        for row in 1..layout.grid.rows {
            let y = (row as f32).mul_add(layout.piece_size.y, -half.y);
            self.lines.push(LineSegment {
                start: Vec2::new(-half.x, y),
                end: Vec2::new(half.x, y),
            });
        }
    }

    pub fn border_segments(&self) -> impl Iterator<Item = LineSegment> + '_ {
        self.border
            .iter()
            .zip(self.border.iter().cycle().skip(1))
            .map(|(&start, &end)| LineSegment { start, end })
    }
}

/// Board geometry for one image at one difficulty.
///
/// Board units: the assembled puzzle is one unit tall and `aspect` units wide,
/// centered at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PuzzleLayout {
    pub image: ImageSize,
    pub grid: GridSize,
    pub piece_size: Vec2,
}

impl PuzzleLayout {
    pub fn new(image: ImageSize, difficulty: u32) -> Result<Self, PuzzleError> {
        let grid = grid_dimensions(image, difficulty)?;
        Ok(Self {
            image,
            grid,
            piece_size: Vec2::new(image.aspect() / grid.cols as f32, 1.0 / grid.rows as f32),
        })
    }

    pub fn piece_count(&self) -> usize {
        self.grid.piece_count()
    }

    pub fn board_size(&self) -> Vec2 {
        self.piece_size * Vec2::new(self.grid.cols as f32, self.grid.rows as f32)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(Vec2::ZERO, self.board_size())
    }

    /// Center of the cell the piece belongs to.
    pub fn target_position(&self, index: usize) -> Vec2 {
        let (row, col) = self.grid.cell(index);
        let size = self.piece_size;
        Vec2::new(
            -size.x * self.grid.cols as f32 / 2.0 + size.x * col as f32 + size.x / 2.0,
            -size.y * self.grid.rows as f32 / 2.0 + size.y * row as f32 + size.y / 2.0,
        )
    }

    pub fn texture_quad(&self, index: usize) -> TextureQuad {
        let (row, col) = self.grid.cell(index);
        let u = |c: u32| c as f32 / self.grid.cols as f32;
        let v = |r: u32| r as f32 / self.grid.rows as f32;
        TextureQuad {
            corners: [
                Vec2::new(u(col), v(row)),
                Vec2::new(u(col + 1), v(row)),
                Vec2::new(u(col + 1), v(row + 1)),
                Vec2::new(u(col), v(row + 1)),
            ],
        }
    }
}
