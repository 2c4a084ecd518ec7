//! Queued and falling pieces

use crate::board::Board;
use crate::rng::PieceSource;
use crate::tetromino::{Rgb, Shape, TetrominoType};

/// A generated piece waiting in the preview
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub kind: TetrominoType,
    pub shape: Shape,
    pub color: Rgb,
}

impl Piece {
    pub fn new(kind: TetrominoType, color: Rgb) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            color,
        }
    }

    /// Draw the next kind and color from a source
    pub fn generate<S: PieceSource + ?Sized>(source: &mut S) -> Self {
        let kind = source.next_kind();
        let color = source.next_color();
        Self::new(kind, color)
    }
}

/// The piece currently under gravity and player control
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePiece {
    pub kind: TetrominoType,
    /// Shape in its current rotation
    pub shape: Shape,
    /// Top-left corner of the shape's bounding box
    pub row: usize,
    pub col: usize,
    pub color: Rgb,
}

impl ActivePiece {
    /// Place a queued piece at its spawn anchor: row 0, horizontally centered
    /// (rounding toward the left).
    pub fn spawn(piece: Piece, cols: usize) -> Self {
        let col = (cols / 2).saturating_sub(piece.shape.width() / 2);
        Self {
            kind: piece.kind,
            shape: piece.shape,
            row: 0,
            col,
            color: piece.color,
        }
    }

    /// Absolute (row, col) of every filled cell
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.shape
            .filled_cells()
            .map(|(dr, dc)| (self.row + dr, self.col + dc))
    }

    /// Anchor moved by (dr, dc), `None` if it would leave the grid's
    /// non-negative quadrant
    pub fn shifted_anchor(&self, dr: isize, dc: isize) -> Option<(usize, usize)> {
        Some((
            self.row.checked_add_signed(dr)?,
            self.col.checked_add_signed(dc)?,
        ))
    }

    /// Check if the piece fits at its current anchor
    pub fn fits(&self, board: &Board) -> bool {
        board.fits(&self.shape, self.row, self.col)
    }

    /// Check if the piece could move one row down
    pub fn can_fall(&self, board: &Board) -> bool {
        board.fits(&self.shape, self.row + 1, self.col)
    }

    /// Try to move by (dr, dc), returns true if successful
    pub fn try_move(&mut self, board: &Board, dr: isize, dc: isize) -> bool {
        match self.shifted_anchor(dr, dc) {
            Some((row, col)) if board.fits(&self.shape, row, col) => {
                self.row = row;
                self.col = col;
                true
            }
            _ => false,
        }
    }

    /// Try to rotate clockwise about the fixed anchor, no wall kicks
    pub fn try_rotate(&mut self, board: &Board) -> bool {
        let rotated = self.shape.rotated_cw();
        if board.fits(&rotated, self.row, self.col) {
            self.shape = rotated;
            true
        } else {
            false
        }
    }

    /// Row where the piece would come to rest if dropped straight down
    pub fn landing_row(&self, board: &Board) -> usize {
        let mut row = self.row;
        while board.fits(&self.shape, row + 1, self.col) {
            row += 1;
        }
        row
    }
}
