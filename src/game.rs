//! Game session: ties the engine to score counters and tick pacing

use crate::engine::{Direction, Engine, StepOutcome};
use crate::rng::{PieceSource, RandomPieces};
use crate::score::Score;
use crate::settings::{Rules, TimingSettings};
use tracing::info;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    GameOver,
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    /// Immediate gravity step
    SoftDrop,
    HardDrop,
    Rotate,
    Restart,
}

/// The main game struct
#[derive(Debug, Clone)]
pub struct Game<S: PieceSource = RandomPieces> {
    /// The board engine
    pub engine: Engine<S>,
    /// Score tracking
    pub score: Score,
    /// Current game state
    pub state: GameState,
    timing: TimingSettings,
    /// Ticks since the last gravity step
    tick_count: u32,
    /// Set whenever the board picture changed
    pub needs_redraw: bool,
    /// Set whenever score, level or lines changed
    pub text_needs_update: bool,
}

impl Game<RandomPieces> {
    /// Create a new game with a random piece sequence
    pub fn new(rules: Rules, timing: TimingSettings) -> Self {
        Self::with_source(rules, timing, RandomPieces::new())
    }

    /// Create a new game with a reproducible piece sequence
    pub fn with_seed(rules: Rules, timing: TimingSettings, seed: u64) -> Self {
        Self::with_source(rules, timing, RandomPieces::with_seed(seed))
    }
}

impl<S: PieceSource> Game<S> {
    pub fn with_source(rules: Rules, timing: TimingSettings, source: S) -> Self {
        Self {
            engine: Engine::with_source(rules, source),
            score: Score::new(),
            state: GameState::Playing,
            timing,
            tick_count: 0,
            needs_redraw: true,
            text_needs_update: true,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    /// Ticks currently required per gravity step
    pub fn drop_interval(&self) -> u32 {
        self.score.drop_interval(self.engine.rules(), &self.timing)
    }

    /// Process an action
    pub fn process_action(&mut self, action: Action) {
        if action == Action::Restart {
            self.restart();
            return;
        }
        if self.state != GameState::Playing {
            return;
        }

        match action {
            Action::MoveLeft => {
                self.engine.shift_active_piece(Direction::Left);
            }
            Action::MoveRight => {
                self.engine.shift_active_piece(Direction::Right);
            }
            Action::HardDrop => {
                self.engine.shift_active_piece(Direction::HardDrop);
            }
            Action::Rotate => {
                self.engine.rotate_active_piece();
            }
            Action::SoftDrop => {
                let outcome = self.engine.step();
                self.apply(outcome);
            }
            Action::Restart => {}
        }
        self.needs_redraw = true;
    }

    /// Advance one frame. Runs a gravity step once enough ticks have passed
    /// and returns its outcome.
    pub fn tick(&mut self) -> Option<StepOutcome> {
        if self.state != GameState::Playing {
            return None;
        }

        self.tick_count += 1;
        if self.tick_count < self.drop_interval() {
            return None;
        }
        self.tick_count = 0;

        let outcome = self.engine.step();
        self.apply(outcome);
        self.needs_redraw = true;
        Some(outcome)
    }

    fn apply(&mut self, outcome: StepOutcome) {
        if self.score.apply(&outcome, self.engine.rules()) {
            self.text_needs_update = true;
        }
        if outcome.game_over && self.state == GameState::Playing {
            info!(
                "Game over: score={} level={} lines={}",
                self.score.points, self.score.level, self.score.lines
            );
            self.state = GameState::GameOver;
        }
    }

    /// Reset board, counters and pacing for a new game
    pub fn restart(&mut self) {
        self.engine.reset();
        self.score = Score::new();
        self.state = GameState::Playing;
        self.tick_count = 0;
        self.needs_redraw = true;
        self.text_needs_update = true;
    }
}
