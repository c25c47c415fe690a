use std::time::Duration;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    TopReached,
    core::{Board, Direction, MoveOutcome, RotateOutcome},
};

use super::{
    config::{ConfigError, SessionConfig},
    input::{HeldMovement, InputKey},
    snapshot::SessionSnapshot,
    ticker::{SessionEvent, TickScheduler},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, derive_more::IsVariant)]
pub enum SessionState {
    Running,
    Paused,
    GameOver,
}

/// A game in progress: the board plus pause/game-over sequencing and input state.
///
/// Ticks and keys are ignored while paused or over, except pause toggling,
/// reset and quit.
///
/// # Example
///
/// ```
/// use blockfall_engine::{GameSession, InputKey, SessionConfig};
///
/// let mut session = GameSession::new(SessionConfig::default().with_seed(1)).unwrap();
/// assert!(session.state().is_running());
///
/// session.on_key_up(InputKey::PauseToggle);
/// assert!(session.state().is_paused());
///
/// session.on_key_down(InputKey::Quit);
/// assert!(session.should_quit());
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    state: SessionState,
    held: HeldMovement,
    quit: bool,
    config: SessionConfig,
    scheduler: TickScheduler,
    rng: Pcg32,
}

impl GameSession {
    /// Starts a session on a fresh board with one falling piece.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let mut rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_os_rng(),
        };
        let board = Board::with_seed(Self::board_seed(&config, &mut rng));
        Self::with_rng(board, config, rng)
    }

    /// Starts a session on a prepared board.
    ///
    /// A piece is spawned if none is falling. If that spawn is blocked, the
    /// session starts out over.
    pub fn from_board(board: Board, config: SessionConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_os_rng(),
        };
        Self::with_rng(board, config, rng)
    }

    fn with_rng(board: Board, config: SessionConfig, rng: Pcg32) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut session = Self {
            board,
            state: SessionState::Running,
            held: HeldMovement::default(),
            quit: false,
            config,
            scheduler: TickScheduler::new(&config),
            rng,
        };
        if session.board.falling_piece_id().is_none() {
            session.spawn();
        }
        Ok(session)
    }

    fn board_seed(config: &SessionConfig, rng: &mut Pcg32) -> u64 {
        config.seed.unwrap_or_else(|| rng.random())
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn held_movement(&self) -> &HeldMovement {
        &self.held
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.board.score()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    fn spawn(&mut self) {
        if let Err(TopReached) = self.board.spawn_next() {
            self.state = SessionState::GameOver;
            self.held.clear();
            tracing::info!(score = self.board.score(), "game over");
        }
    }

    fn step(&mut self, direction: Direction) {
        let Some(id) = self.board.falling_piece_id() else {
            // The falling piece was cleared away by a line clear.
            self.spawn();
            return;
        };
        if self.board.try_move(id, direction) == MoveOutcome::Settled {
            self.held.stop();
            self.spawn();
        }
    }

    pub fn on_gravity_tick(&mut self) {
        if !self.state.is_running() {
            return;
        }
        tracing::trace!("gravity tick");
        self.step(Direction::Down);
    }

    pub fn on_repeat_tick(&mut self) {
        if !self.state.is_running() {
            return;
        }
        let Some(direction) = self.held.direction() else {
            return;
        };
        tracing::trace!(?direction, "repeat tick");
        self.step(direction);
    }

    /// Rotates the falling piece. Returns `None` when no rotation was attempted.
    pub fn rotate(&mut self) -> Option<RotateOutcome> {
        if !self.state.is_running() {
            return None;
        }
        let id = self.board.falling_piece_id()?;
        Some(self.board.try_rotate(id))
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Running => SessionState::Paused,
            SessionState::Paused => SessionState::Running,
            SessionState::GameOver => SessionState::GameOver,
        };
        tracing::debug!(state = ?self.state, "pause toggled");
    }

    /// Throws the board away and starts over.
    ///
    /// With a configured seed the new board replays the same piece sequence.
    pub fn reset(&mut self) {
        let seed = Self::board_seed(&self.config, &mut self.rng);
        self.board = Board::with_seed(seed);
        self.state = SessionState::Running;
        self.held.clear();
        self.scheduler.reset();
        self.spawn();
        tracing::info!(seed, "session reset");
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// Movement keys start held movement; reset and quit act on key-down.
    pub fn on_key_down(&mut self, key: InputKey) {
        if let Some(direction) = key.direction() {
            if self.state.is_running() {
                self.held.start(direction);
            }
            return;
        }
        match key {
            InputKey::Reset => self.reset(),
            InputKey::Quit => self.quit(),
            _ => {}
        }
    }

    /// Movement keys stop held movement; rotate and pause act on key-up.
    pub fn on_key_up(&mut self, key: InputKey) {
        match key {
            InputKey::MoveLeft | InputKey::MoveRight | InputKey::MoveDown => self.held.stop(),
            InputKey::Rotate => {
                self.rotate();
            }
            InputKey::PauseToggle => self.toggle_pause(),
            InputKey::Reset | InputKey::Quit => {}
        }
    }

    pub fn process_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::KeyDown(key) => self.on_key_down(key),
            SessionEvent::KeyUp(key) => self.on_key_up(key),
            SessionEvent::GravityTick => self.on_gravity_tick(),
            SessionEvent::RepeatTick => self.on_repeat_tick(),
        }
    }

    /// Consumes one frame's worth of events in order.
    pub fn process_frame<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = SessionEvent>,
    {
        for event in events {
            self.process_event(event);
        }
    }

    /// Advances the session clock by `elapsed` and processes the ticks that fell due.
    pub fn advance(&mut self, elapsed: Duration) {
        let mut events = Vec::new();
        let armed = self.state.is_running() && self.held.is_held();
        self.scheduler.advance(elapsed, armed, &mut events);
        self.process_frame(events);
    }
}
