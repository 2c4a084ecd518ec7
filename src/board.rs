//! Grid representation and collision detection

use crate::tetromino::{GHOST_COLOR, Rgb, Shape};

/// Canonical board dimensions
pub const BOARD_ROWS: usize = 20;
pub const BOARD_COLS: usize = 10;

/// A grid cell. Ghost cells only mark the landing preview and never block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Rgb),
    Ghost,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Cell::Occupied(_))
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self, Cell::Ghost)
    }

    /// Display color, if the cell draws anything
    pub fn color(&self) -> Option<Rgb> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(color) => Some(*color),
            Cell::Ghost => Some(GHOST_COLOR),
        }
    }
}

/// The playfield. Row 0 is the top row, rows grow downward.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// Row-major, indexed by `row * cols + col`
    cells: Vec<Cell>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_ROWS, BOARD_COLS)
    }
}

impl Board {
    /// Create an empty board
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Get the cell at (row, col), `None` if out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.index(row, col).map(|idx| self.cells[idx])
    }

    /// Set a cell. Returns false if out of bounds.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> bool {
        match self.index(row, col) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// One row as a slice, or None past the bottom edge
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        if row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols..(row + 1) * self.cols)
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(|cell| cell.is_occupied())
    }

    /// Check whether every filled cell of `shape` anchored at (row, col)
    /// lands in bounds on a non-occupied cell.
    pub fn fits(&self, shape: &Shape, row: usize, col: usize) -> bool {
        shape.filled_cells().all(|(dr, dc)| {
            matches!(
                self.get(row + dr, col + dc),
                Some(Cell::Empty | Cell::Ghost)
            )
        })
    }

    /// Write `shape` into the grid as occupied cells
    pub fn lock(&mut self, shape: &Shape, row: usize, col: usize, color: Rgb) {
        for (dr, dc) in shape.filled_cells() {
            self.set(row + dr, col + dc, Cell::Occupied(color));
        }
    }

    /// Mark the cells of `shape` as ghost, leaving occupied cells alone
    pub fn mark_ghost(&mut self, shape: &Shape, row: usize, col: usize) {
        for (dr, dc) in shape.filled_cells() {
            if let Some(idx) = self.index(row + dr, col + dc) {
                if !self.cells[idx].is_occupied() {
                    self.cells[idx] = Cell::Ghost;
                }
            }
        }
    }

    /// Reset every ghost cell back to empty
    pub fn clear_ghosts(&mut self) {
        for cell in self.cells.iter_mut().filter(|cell| cell.is_ghost()) {
            *cell = Cell::Empty;
        }
    }

    pub fn ghost_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_ghost()).count()
    }

    /// Check if every column of a row is occupied. A zero-width row is
    /// never complete.
    pub fn is_row_complete(&self, row: usize) -> bool {
        self.row(row)
            .is_some_and(|cells| !cells.is_empty() && cells.iter().all(|cell| cell.is_occupied()))
    }

    /// Empty `row` and move every row above it down by one.
    ///
    /// Only occupied cells travel, so the shifted rows carry no ghost marks.
    fn collapse_row(&mut self, row: usize) {
        let cols = self.cols;
        for r in (1..=row).rev() {
            for c in 0..cols {
                let above = self.cells[(r - 1) * cols + c];
                self.cells[r * cols + c] = if above.is_occupied() {
                    above
                } else {
                    Cell::Empty
                };
            }
        }
        self.cells[..cols].fill(Cell::Empty);
    }

    /// Clear completed rows and return how many were removed.
    ///
    /// After a collapse the same row index is tested again, since the row
    /// that slid into it may itself be complete.
    pub fn clear_complete_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut row = 0;
        while row < self.rows {
            if self.is_row_complete(row) {
                self.collapse_row(row);
                cleared += 1;
            } else {
                row += 1;
            }
        }
        cleared
    }

    /// Reset every cell to empty without reallocating
    pub fn reset(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Check if the board holds nothing at all
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }

    /// Iterate rows top to bottom
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols.max(1))
    }
}
