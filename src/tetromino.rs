//! Tetromino definitions and shape matrices
//!
//! Each of the 7 tetrominoes is stored as one canonical rotation: a
//! rectangular boolean matrix, row 0 on top. Further rotations are derived
//! by turning the matrix clockwise.

use serde::{Deserialize, Serialize};

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    I, // long bar
    O, // square
    T,
    S,
    Z,
    L,
    J,
}

impl TetrominoType {
    /// Get all tetromino types in catalog order
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::L,
            TetrominoType::J,
        ]
    }

    /// Canonical rotation of this tetromino
    pub fn shape(&self) -> Shape {
        match self {
            TetrominoType::I => Shape::from_rows(&[&[1, 1, 1, 1]]),
            TetrominoType::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            TetrominoType::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
            TetrominoType::S => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
            TetrominoType::Z => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
            TetrominoType::L => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
            TetrominoType::J => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1]]),
        }
    }
}

/// An RGB color with each channel in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Neutral gray used for ghost cells
pub const GHOST_COLOR: Rgb = Rgb::new(0.5, 0.5, 0.5);

/// A rectangular boolean matrix describing which cells of a piece are filled
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    width: usize,
    height: usize,
    /// Row-major, `height * width` entries
    cells: Vec<bool>,
}

impl Shape {
    /// Build a shape from rows of 0/1 values. All rows must have equal length.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        debug_assert!(rows.iter().all(|row| row.len() == width));
        let cells = rows
            .iter()
            .flat_map(|row| row.iter().map(|&v| v != 0))
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the cell at (row, col) of the matrix is filled
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.cells[row * self.width + col]
    }

    /// Iterate the (row, col) offsets of every filled cell
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, filled)| **filled)
            .map(|(idx, _)| (idx / self.width, idx % self.width))
    }

    /// Rotate 90 degrees clockwise: `new[j][h-1-i] = old[i][j]`.
    ///
    /// The result has swapped dimensions. Nothing here keeps a pivot fixed,
    /// callers anchor the rotated matrix at the same top-left corner.
    pub fn rotated_cw(&self) -> Shape {
        let (h, w) = (self.height, self.width);
        let mut cells = vec![false; w * h];
        for i in 0..h {
            for j in 0..w {
                // new matrix is w rows by h cols
                cells[j * h + (h - 1 - i)] = self.cells[i * w + j];
            }
        }
        Shape {
            width: h,
            height: w,
            cells,
        }
    }
}
