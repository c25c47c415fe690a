use serde::{Deserialize, Serialize};

use crate::core::Direction;

/// Logical input keys understood by a [`GameSession`](super::GameSession).
///
/// Mapping physical keys to these is the presentation layer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum InputKey {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    PauseToggle,
    Reset,
    Quit,
}

impl InputKey {
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        InputKey::MoveLeft,
        InputKey::MoveRight,
        InputKey::MoveDown,
        InputKey::Rotate,
        InputKey::PauseToggle,
        InputKey::Reset,
        InputKey::Quit,
    ];

    /// Returns the movement direction of a movement key.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            InputKey::MoveLeft => Some(Direction::Left),
            InputKey::MoveRight => Some(Direction::Right),
            InputKey::MoveDown => Some(Direction::Down),
            InputKey::Rotate | InputKey::PauseToggle | InputKey::Reset | InputKey::Quit => None,
        }
    }
}

/// Tracks the movement direction currently held down.
///
/// Pressing a new direction while another is held replaces it. The key-up of
/// the replaced key usually arrives after that, so the first stop following a
/// replacement is ignored.
///
/// ```
/// use blockfall_engine::{Direction, HeldMovement};
///
/// let mut held = HeldMovement::default();
/// held.start(Direction::Left);
/// held.start(Direction::Right);
/// held.stop(); // stale release of the left key
/// assert_eq!(held.direction(), Some(Direction::Right));
/// held.stop();
/// assert_eq!(held.direction(), None);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeldMovement {
    direction: Option<Direction>,
    ignore_next_stop: bool,
}

impl HeldMovement {
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.direction.is_some()
    }

    pub fn start(&mut self, direction: Direction) {
        if self.direction.is_some() {
            self.ignore_next_stop = true;
        }
        self.direction = Some(direction);
    }

    pub fn stop(&mut self) {
        if self.ignore_next_stop {
            self.ignore_next_stop = false;
        } else {
            self.direction = None;
        }
    }

    /// Forgets the held direction and any pending ignored stop.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
