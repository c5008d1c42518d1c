//! Shapes module - tetromino templates and matrix rotation
//!
//! Each piece is a small boolean matrix (at most 4x4). Templates are immutable;
//! rotating produces a new matrix. Rotation is a plain 90° clockwise turn
//! (transpose, then reverse each row) with no kick offsets.

use crate::types::PieceKind;

/// Largest extent of any template along either axis.
pub const MAX_SHAPE_DIM: usize = 4;

/// Boolean occupancy matrix of a piece, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: [[bool; MAX_SHAPE_DIM]; MAX_SHAPE_DIM],
    width: u8,
    height: u8,
}

impl Shape {
    /// Build a shape from rows of 0/1 values. All rows must have the same length.
    pub const fn from_rows(rows: &[&[u8]]) -> Self {
        assert!(!rows.is_empty() && rows.len() <= MAX_SHAPE_DIM);
        let width = rows[0].len();
        assert!(width > 0 && width <= MAX_SHAPE_DIM);

        let mut out = [[false; MAX_SHAPE_DIM]; MAX_SHAPE_DIM];
        let mut r = 0;
        while r < rows.len() {
            assert!(rows[r].len() == width);
            let mut c = 0;
            while c < width {
                out[r][c] = rows[r][c] != 0;
                c += 1;
            }
            r += 1;
        }

        Self {
            rows: out,
            width: width as u8,
            height: rows.len() as u8,
        }
    }

    /// Template shape for a piece kind, in spawn orientation.
    pub fn template(kind: PieceKind) -> Self {
        TEMPLATES[(kind.color_index() - 1) as usize]
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Whether the matrix cell at (col, row) is occupied. Out of range is empty.
    pub fn is_filled(&self, col: u8, row: u8) -> bool {
        if col >= self.width || row >= self.height {
            return false;
        }
        self.rows[row as usize][col as usize]
    }

    /// Occupied cells as (col, row) offsets from the top-left corner.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width)
                .filter(move |&col| self.rows[row as usize][col as usize])
                .map(move |col| (col as i8, row as i8))
        })
    }

    /// Number of occupied cells (4 for every template).
    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }

    /// 90° clockwise rotation: transpose, then reverse each row.
    ///
    /// Row `r` of the result is column `r` of `self` read bottom to top.
    pub fn rotate_cw(&self) -> Self {
        let mut out = [[false; MAX_SHAPE_DIM]; MAX_SHAPE_DIM];
        let h = self.height as usize;
        for r in 0..self.width as usize {
            for c in 0..h {
                out[r][c] = self.rows[h - 1 - c][r];
            }
        }

        Self {
            rows: out,
            width: self.height,
            height: self.width,
        }
    }
}

/// Templates in [`PieceKind::ALL`] order.
pub const TEMPLATES: [Shape; 7] = [
    // I
    Shape::from_rows(&[&[1, 1, 1, 1]]),
    // O
    Shape::from_rows(&[&[1, 1], &[1, 1]]),
    // T
    Shape::from_rows(&[&[1, 1, 1], &[0, 1, 0]]),
    // L
    Shape::from_rows(&[&[1, 1, 1], &[1, 0, 0]]),
    // J
    Shape::from_rows(&[&[1, 1, 1], &[0, 0, 1]]),
    // S
    Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
    // Z
    Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
];

/// Spawn column for a shape: horizontally centered, rounded down.
pub fn spawn_col(shape: &Shape, board_width: u8) -> i8 {
    ((board_width - shape.width()) / 2) as i8
}
