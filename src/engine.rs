//! Board engine: spawning, gravity, movement, ghost projection and line clears
//!
//! The engine owns the grid, the falling piece and the queued next piece. It
//! keeps no score counters of its own; every step reports what happened in a
//! [`StepOutcome`] and the driver folds that into its [`Score`](crate::score::Score).
//!
//! The falling piece is never written into the grid. It is tracked on its own
//! and composited over the grid in [`Engine::snapshot`], so grid cells only
//! ever hold landed blocks and the ghost preview.

use crate::board::{Board, Cell};
use crate::piece::{ActivePiece, Piece};
use crate::rng::{PieceSource, RandomPieces};
use crate::settings::Rules;
use crate::tetromino::{GHOST_COLOR, Rgb};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Preview window dimensions
pub const PREVIEW_ROWS: usize = 4;
pub const PREVIEW_COLS: usize = 4;

/// Lateral commands for the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    /// Fast-forward the fall until blocked. The piece still locks on the
    /// next gravity step, not immediately.
    HardDrop,
}

/// What a single [`Engine::step`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub lines_cleared: u32,
    pub score_delta: u32,
    pub game_over: bool,
}

/// Where the engine is in a piece's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next step to spawn a piece
    NoActivePiece,
    Falling,
    GameOver,
}

/// A drawable cell of the composited board
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tile {
    Empty,
    /// Part of the falling piece
    Active(Rgb),
    /// Landing preview
    Ghost(Rgb),
    /// Landed block
    Locked(Rgb),
}

impl Tile {
    pub fn color(&self) -> Option<Rgb> {
        match self {
            Tile::Empty => None,
            Tile::Active(c) | Tile::Ghost(c) | Tile::Locked(c) => Some(*c),
        }
    }

    fn symbol(&self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Active(_) => '@',
            Tile::Ghost(_) => ':',
            Tile::Locked(_) => '#',
        }
    }
}

/// Read-only picture of the board for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major main grid
    pub tiles: Vec<Tile>,
    /// Next piece, centered in the preview window
    pub preview: [[Option<Rgb>; PREVIEW_COLS]; PREVIEW_ROWS],
    pub game_over: bool,
}

impl Snapshot {
    pub fn tile(&self, row: usize, col: usize) -> Option<Tile> {
        (row < self.rows && col < self.cols).then(|| self.tiles[row * self.cols + col])
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.cols.max(1)) {
            let line: String = row.iter().map(Tile::symbol).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// The board engine
#[derive(Debug, Clone)]
pub struct Engine<S: PieceSource = RandomPieces> {
    board: Board,
    rules: Rules,
    active: Option<ActivePiece>,
    /// `None` only after a game over
    next: Option<Piece>,
    game_over: bool,
    source: S,
}

impl Engine<RandomPieces> {
    /// Engine with the given rules and an entropy-seeded source
    pub fn new(rules: Rules) -> Self {
        Self::with_source(rules, RandomPieces::new())
    }

    /// Engine whose piece sequence is fixed by `seed`
    pub fn with_seed(rules: Rules, seed: u64) -> Self {
        Self::with_source(rules, RandomPieces::with_seed(seed))
    }
}

impl<S: PieceSource> Engine<S> {
    pub fn with_source(rules: Rules, mut source: S) -> Self {
        let next = Piece::generate(&mut source);
        Self {
            board: Board::new(rules.rows, rules.cols),
            rules,
            active: None,
            next: Some(next),
            game_over: false,
            source,
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct grid access, mainly for setting up positions
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active_piece(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn next_piece(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else if self.active.is_some() {
            Phase::Falling
        } else {
            Phase::NoActivePiece
        }
    }

    /// Promote the queued piece to the active piece.
    ///
    /// Fails when any cell of the spawned shape is out of bounds or lands on
    /// an occupied cell; the game-over flag is then set and the grid is left
    /// untouched.
    pub fn spawn_piece(&mut self) -> bool {
        if self.active.is_some() || self.game_over {
            return false;
        }

        let queued = match self.next.take() {
            Some(piece) => piece,
            None => Piece::generate(&mut self.source),
        };
        self.next = Some(Piece::generate(&mut self.source));

        let piece = ActivePiece::spawn(queued, self.board.cols());
        if !piece.fits(&self.board) {
            info!(
                "Spawn blocked for {:?} at ({}, {}), game over",
                piece.kind, piece.row, piece.col
            );
            self.game_over = true;
            return false;
        }

        debug!("Spawned {:?} at ({}, {})", piece.kind, piece.row, piece.col);
        self.active = Some(piece);
        self.ghost_piece();
        true
    }

    /// Advance one gravity tick
    pub fn step(&mut self) -> StepOutcome {
        if self.game_over {
            return StepOutcome {
                game_over: true,
                ..StepOutcome::default()
            };
        }

        let Some(piece) = &mut self.active else {
            if !self.spawn_piece() {
                self.board.reset();
                self.next = None;
                return StepOutcome {
                    game_over: true,
                    ..StepOutcome::default()
                };
            }
            return StepOutcome::default();
        };

        if piece.can_fall(&self.board) {
            piece.row += 1;
            self.ghost_piece();
            return StepOutcome::default();
        }

        self.land()
    }

    /// Lock the active piece in place and score any completed rows
    fn land(&mut self) -> StepOutcome {
        let Some(piece) = self.active.take() else {
            return StepOutcome::default();
        };
        debug!("Locked {:?} at ({}, {})", piece.kind, piece.row, piece.col);

        self.board.clear_ghosts();
        self.board.lock(&piece.shape, piece.row, piece.col, piece.color);
        self.check_for_points()
    }

    /// Remove completed rows and report the lines and points earned
    pub fn check_for_points(&mut self) -> StepOutcome {
        let cleared = self.board.clear_complete_rows() as u32;
        if cleared > 0 {
            debug!("Cleared {} line(s)", cleared);
        }
        StepOutcome {
            lines_cleared: cleared,
            score_delta: cleared.saturating_mul(self.rules.points_per_line),
            game_over: false,
        }
    }

    /// Move the active piece one column, or hard-drop it. Returns true if the
    /// piece moved.
    pub fn shift_active_piece(&mut self, direction: Direction) -> bool {
        let Some(piece) = &mut self.active else {
            return false;
        };

        let moved = match direction {
            Direction::Left => piece.try_move(&self.board, 0, -1),
            Direction::Right => piece.try_move(&self.board, 0, 1),
            Direction::HardDrop => {
                let landing = piece.landing_row(&self.board);
                let moved = landing != piece.row;
                piece.row = landing;
                moved
            }
        };

        if moved {
            self.ghost_piece();
        }
        moved
    }

    /// Rotate the active piece clockwise in place. Rejected outright if any
    /// cell of the rotated shape would collide.
    pub fn rotate_active_piece(&mut self) -> bool {
        let Some(piece) = &mut self.active else {
            return false;
        };
        let rotated = piece.try_rotate(&self.board);
        if rotated {
            self.ghost_piece();
        }
        rotated
    }

    /// Recompute the landing preview for the active piece.
    ///
    /// Old ghost cells are always wiped first. Nothing is drawn when the
    /// piece is within `min_ghost_distance` rows of where it would land.
    pub fn ghost_piece(&mut self) {
        let Some(piece) = &self.active else {
            return;
        };

        let landing = piece.landing_row(&self.board);
        self.board.clear_ghosts();
        if landing - piece.row < self.rules.min_ghost_distance {
            return;
        }
        self.board.mark_ghost(&piece.shape, landing, piece.col);
    }

    /// Start a fresh game: empty grid, no active piece, new queued piece
    pub fn reset(&mut self) {
        self.board.reset();
        self.active = None;
        self.next = Some(Piece::generate(&mut self.source));
        self.game_over = false;
        info!("Board reset");
    }

    /// Composite the grid, ghost and falling piece for display
    pub fn snapshot(&self) -> Snapshot {
        let mut tiles: Vec<Tile> = self
            .board
            .iter_rows()
            .flatten()
            .map(|cell| match cell {
                Cell::Empty => Tile::Empty,
                Cell::Occupied(color) => Tile::Locked(*color),
                Cell::Ghost => Tile::Ghost(GHOST_COLOR),
            })
            .collect();

        if let Some(piece) = &self.active {
            let cols = self.board.cols();
            for (row, col) in piece.cells() {
                if let Some(tile) = tiles.get_mut(row * cols + col) {
                    *tile = Tile::Active(piece.color);
                }
            }
        }

        Snapshot {
            rows: self.board.rows(),
            cols: self.board.cols(),
            tiles,
            preview: self.preview(),
            game_over: self.game_over,
        }
    }

    /// The next piece centered in the preview window
    pub fn preview(&self) -> [[Option<Rgb>; PREVIEW_COLS]; PREVIEW_ROWS] {
        let mut grid = [[None; PREVIEW_COLS]; PREVIEW_ROWS];
        let Some(next) = &self.next else {
            return grid;
        };
        let start_row = PREVIEW_ROWS.saturating_sub(next.shape.height()) / 2;
        let start_col = PREVIEW_COLS.saturating_sub(next.shape.width()) / 2;
        for (dr, dc) in next.shape.filled_cells() {
            if let Some(slot) = grid
                .get_mut(start_row + dr)
                .and_then(|row| row.get_mut(start_col + dc))
            {
                *slot = Some(next.color);
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BOARD_COLS, BOARD_ROWS};
    use crate::rng::FixedSequence;
    use crate::tetromino::TetrominoType;

    const ORANGE: Rgb = Rgb::new(1.0, 0.5, 0.0);
    const STONE: Rgb = Rgb::new(0.2, 0.2, 0.2);

    fn engine_with(kind: TetrominoType) -> Engine<FixedSequence> {
        Engine::with_source(Rules::default(), FixedSequence::repeat(kind, ORANGE))
    }

    fn fill_row(engine: &mut Engine<FixedSequence>, row: usize) {
        for col in 0..engine.board().cols() {
            engine.board_mut().set(row, col, Cell::Occupied(STONE));
        }
    }

    fn ghost_cells(engine: &Engine<FixedSequence>) -> Vec<(usize, usize)> {
        let board = engine.board();
        (0..board.rows())
            .flat_map(|r| (0..board.cols()).map(move |c| (r, c)))
            .filter(|&(r, c)| board.get(r, c).is_some_and(|cell| cell.is_ghost()))
            .collect()
    }

    #[test]
    fn test_spawn_centers_every_shape() {
        for kind in TetrominoType::all() {
            let mut engine = engine_with(kind);
            assert!(engine.spawn_piece());
            let piece = engine.active_piece().unwrap();
            assert_eq!(piece.row, 0);
            assert_eq!(piece.col, BOARD_COLS / 2 - kind.shape().width() / 2);
            assert_eq!(engine.phase(), Phase::Falling);
        }
    }

    #[test]
    fn test_spawn_queues_next_piece() {
        let mut engine = Engine::with_source(
            Rules::default(),
            FixedSequence::new(vec![TetrominoType::T, TetrominoType::I], ORANGE),
        );
        assert_eq!(engine.next_piece().unwrap().kind, TetrominoType::T);
        assert!(engine.spawn_piece());
        assert_eq!(engine.active_piece().unwrap().kind, TetrominoType::T);
        assert_eq!(engine.next_piece().unwrap().kind, TetrominoType::I);
    }

    #[test]
    fn test_spawn_blocked_sets_game_over() {
        let mut engine = engine_with(TetrominoType::O);
        engine.board_mut().set(0, 5, Cell::Occupied(STONE));
        let before = engine.board().clone();

        assert!(!engine.spawn_piece());
        assert!(engine.is_game_over());
        assert!(engine.active_piece().is_none());
        assert_eq!(engine.board(), &before);
        assert_eq!(engine.phase(), Phase::GameOver);
    }

    #[test]
    fn test_step_spawn_failure_wipes_display() {
        let mut engine = engine_with(TetrominoType::I);
        engine.board_mut().set(0, 3, Cell::Occupied(STONE));
        engine.board_mut().set(19, 0, Cell::Occupied(STONE));

        let outcome = engine.step();
        assert!(outcome.game_over);
        assert!(engine.board().is_empty());
        assert!(engine.preview().iter().flatten().all(|slot| slot.is_none()));

        // terminal until reset
        assert!(engine.step().game_over);
        assert!(engine.active_piece().is_none());
        assert!(!engine.shift_active_piece(Direction::Left));
    }

    #[test]
    fn test_o_piece_falls_and_locks() {
        let mut engine = engine_with(TetrominoType::O);
        assert!(engine.spawn_piece());
        assert_eq!(engine.active_piece().unwrap().col, 4);

        for _ in 0..18 {
            assert_eq!(engine.step(), StepOutcome::default());
        }
        assert_eq!(engine.active_piece().unwrap().row, 18);

        // can no longer fall: this step locks it
        assert_eq!(engine.step(), StepOutcome::default());
        assert!(engine.active_piece().is_none());
        for row in 18..20 {
            for col in 4..6 {
                assert_eq!(engine.board().get(row, col), Some(Cell::Occupied(ORANGE)));
            }
        }
        assert_eq!(engine.board().ghost_count(), 0);
        assert_eq!(engine.phase(), Phase::NoActivePiece);

        // next step spawns the queued piece without moving it
        engine.step();
        assert_eq!(engine.active_piece().unwrap().row, 0);
    }

    #[test]
    fn test_shift_left_and_right() {
        let mut engine = engine_with(TetrominoType::O);
        engine.spawn_piece();
        assert!(engine.shift_active_piece(Direction::Left));
        assert_eq!(engine.active_piece().unwrap().col, 3);
        assert!(engine.shift_active_piece(Direction::Right));
        assert!(engine.shift_active_piece(Direction::Right));
        assert_eq!(engine.active_piece().unwrap().col, 5);
    }

    #[test]
    fn test_shift_stops_at_walls() {
        let mut engine = engine_with(TetrominoType::I);
        engine.spawn_piece();
        for _ in 0..10 {
            engine.shift_active_piece(Direction::Left);
        }
        assert_eq!(engine.active_piece().unwrap().col, 0);
        assert!(!engine.shift_active_piece(Direction::Left));

        for _ in 0..10 {
            engine.shift_active_piece(Direction::Right);
        }
        assert_eq!(engine.active_piece().unwrap().col, BOARD_COLS - 4);
        assert!(!engine.shift_active_piece(Direction::Right));
    }

    #[test]
    fn test_shift_blocked_by_single_cell() {
        let mut engine = engine_with(TetrominoType::T);
        engine.spawn_piece();
        // T spawns at col 4: .#. / ###, bottom-left cell at (1, 4)
        engine.board_mut().set(1, 3, Cell::Occupied(STONE));
        assert!(!engine.shift_active_piece(Direction::Left));
        assert_eq!(engine.active_piece().unwrap().col, 4);
    }

    #[test]
    fn test_hard_drop_defers_lock() {
        let mut engine = engine_with(TetrominoType::O);
        engine.spawn_piece();
        assert!(engine.shift_active_piece(Direction::HardDrop));
        assert_eq!(engine.active_piece().unwrap().row, BOARD_ROWS - 2);
        assert!(engine.board().is_empty());
        assert!(!engine.shift_active_piece(Direction::HardDrop));

        engine.step();
        assert!(engine.active_piece().is_none());
        assert!(engine.board().is_occupied(BOARD_ROWS - 1, 4));
    }

    #[test]
    fn test_rotate_in_place() {
        let mut engine = engine_with(TetrominoType::I);
        engine.spawn_piece();
        let (row, col) = {
            let piece = engine.active_piece().unwrap();
            (piece.row, piece.col)
        };
        assert!(engine.rotate_active_piece());
        let piece = engine.active_piece().unwrap();
        assert_eq!((piece.shape.height(), piece.shape.width()), (4, 1));
        assert_eq!((piece.row, piece.col), (row, col));
    }

    #[test]
    fn test_rotate_rejected_on_collision() {
        let mut engine = engine_with(TetrominoType::I);
        engine.spawn_piece();
        // vertical I would cover (0..4, 3)
        engine.board_mut().set(3, 3, Cell::Occupied(STONE));
        assert!(!engine.rotate_active_piece());
        assert_eq!(engine.active_piece().unwrap().shape.height(), 1);
    }

    #[test]
    fn test_commands_without_active_piece_are_noops() {
        let mut engine = engine_with(TetrominoType::O);
        assert!(!engine.shift_active_piece(Direction::Right));
        assert!(!engine.rotate_active_piece());
        engine.ghost_piece();
        assert!(engine.board().is_empty());
    }

    #[test]
    fn test_ghost_marks_landing_spot() {
        let mut engine = engine_with(TetrominoType::O);
        engine.spawn_piece();
        assert_eq!(ghost_cells(&engine), vec![(18, 4), (18, 5), (19, 4), (19, 5)]);

        engine.shift_active_piece(Direction::Right);
        assert_eq!(ghost_cells(&engine), vec![(18, 5), (18, 6), (19, 5), (19, 6)]);
    }

    #[test]
    fn test_ghost_suppressed_near_landing() {
        let mut engine = engine_with(TetrominoType::O);
        engine.spawn_piece();
        // landing row 18: distances 4 and above draw, 3 and below do not
        for _ in 0..14 {
            engine.step();
        }
        assert_eq!(engine.active_piece().unwrap().row, 14);
        assert_eq!(engine.board().ghost_count(), 4);

        engine.step();
        assert_eq!(engine.active_piece().unwrap().row, 15);
        assert_eq!(engine.board().ghost_count(), 0);
    }

    #[test]
    fn test_ghost_redraw_is_idempotent() {
        let mut engine = engine_with(TetrominoType::T);
        engine.spawn_piece();
        let first = ghost_cells(&engine);
        engine.ghost_piece();
        engine.ghost_piece();
        assert_eq!(ghost_cells(&engine), first);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_ghost_never_collides() {
        let mut engine = engine_with(TetrominoType::O);
        engine.spawn_piece();
        assert_eq!(engine.board().ghost_count(), 4);
        // falling onto the ghost cells is allowed
        assert!(engine.shift_active_piece(Direction::HardDrop));
        assert_eq!(engine.active_piece().unwrap().row, 18);
    }

    #[test]
    fn test_check_for_points_single_row() {
        let mut engine = engine_with(TetrominoType::O);
        fill_row(&mut engine, 19);
        engine.board_mut().set(17, 1, Cell::Occupied(ORANGE));

        let outcome = engine.check_for_points();
        assert_eq!(outcome.lines_cleared, 1);
        assert_eq!(outcome.score_delta, 100);
        assert_eq!(engine.board().get(18, 1), Some(Cell::Occupied(ORANGE)));
        assert!(!engine.board().is_occupied(19, 0));
    }

    #[test]
    fn test_check_for_points_cascading() {
        let mut engine = engine_with(TetrominoType::O);
        fill_row(&mut engine, 10);
        fill_row(&mut engine, 19);
        engine.board_mut().set(15, 7, Cell::Occupied(ORANGE));

        let outcome = engine.check_for_points();
        assert_eq!(outcome.lines_cleared, 2);
        assert_eq!(outcome.score_delta, 200);
        assert_eq!(engine.board().get(16, 7), Some(Cell::Occupied(ORANGE)));
    }

    #[test]
    fn test_landing_completes_row() {
        let mut engine = engine_with(TetrominoType::I);
        for col in 4..BOARD_COLS {
            engine.board_mut().set(19, col, Cell::Occupied(STONE));
        }
        engine.spawn_piece();
        for _ in 0..3 {
            engine.shift_active_piece(Direction::Left);
        }
        // I now covers cols 0-3
        assert_eq!(engine.active_piece().unwrap().col, 0);
        engine.shift_active_piece(Direction::HardDrop);

        let outcome = engine.step();
        assert_eq!(outcome.lines_cleared, 1);
        assert_eq!(outcome.score_delta, 100);
        assert!(engine.board().is_empty());
    }

    #[test]
    fn test_reset_restores_fresh_game() {
        let mut engine = engine_with(TetrominoType::I);
        engine.board_mut().set(0, 4, Cell::Occupied(STONE));
        engine.step();
        assert!(engine.is_game_over());

        engine.reset();
        assert!(!engine.is_game_over());
        assert!(engine.board().is_empty());
        assert!(engine.next_piece().is_some());
        assert_eq!(engine.phase(), Phase::NoActivePiece);
        assert_eq!(engine.step(), StepOutcome::default());
        assert!(engine.active_piece().is_some());
    }

    #[test]
    fn test_snapshot_composites_layers() {
        let mut engine = engine_with(TetrominoType::O);
        engine.board_mut().set(19, 0, Cell::Occupied(STONE));
        engine.spawn_piece();
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.tile(0, 4), Some(Tile::Active(ORANGE)));
        assert_eq!(snapshot.tile(19, 4), Some(Tile::Ghost(GHOST_COLOR)));
        assert_eq!(snapshot.tile(19, 0), Some(Tile::Locked(STONE)));
        assert_eq!(snapshot.tile(10, 0), Some(Tile::Empty));
        assert_eq!(snapshot.tile(20, 0), None);
        assert!(!snapshot.game_over);

        let text = snapshot.to_string();
        assert_eq!(text.lines().count(), BOARD_ROWS);
        assert!(text.starts_with("....@@...."));
        assert!(text.ends_with("#...::....\n"));
    }

    #[test]
    fn test_preview_centers_next_piece() {
        let engine = engine_with(TetrominoType::I);
        let preview = engine.preview();
        // 1x4 bar sits on row (4 - 1) / 2 = 1
        assert!(preview[1].iter().all(|slot| *slot == Some(ORANGE)));
        assert_eq!(preview.iter().flatten().filter(|s| s.is_some()).count(), 4);

        let engine = engine_with(TetrominoType::O);
        let preview = engine.preview();
        assert_eq!(preview[1][1], Some(ORANGE));
        assert_eq!(preview[2][2], Some(ORANGE));
        assert_eq!(preview[0][0], None);
    }

    #[test]
    fn test_seeded_engines_agree() {
        let mut a = Engine::with_seed(Rules::default(), 99);
        let mut b = Engine::with_seed(Rules::default(), 99);
        for _ in 0..200 {
            assert_eq!(a.step(), b.step());
            a.rotate_active_piece();
            b.rotate_active_piece();
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
