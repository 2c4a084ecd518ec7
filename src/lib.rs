//! Falling-block board engine
//!
//! The [`engine::Engine`] owns the grid and the falling piece and advances one
//! tick per [`engine::Engine::step`]. [`game::Game`] is a ready-made driver
//! that paces those steps and keeps score.

pub mod board;
pub mod engine;
pub mod game;
pub mod leaderboard;
pub mod piece;
pub mod rng;
pub mod score;
pub mod settings;
pub mod tetromino;

pub use board::{Board, Cell};
pub use engine::{Direction, Engine, Phase, Snapshot, StepOutcome, Tile};
pub use game::{Action, Game, GameState};
pub use leaderboard::Leaderboard;
pub use rng::{FixedSequence, PieceSource, RandomPieces};
pub use score::Score;
pub use settings::{Rules, Settings, TimingSettings};
pub use tetromino::{Rgb, Shape, TetrominoType};
