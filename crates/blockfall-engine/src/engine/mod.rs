//! Session sequencing on top of the board.
//!
//! - [`GameSession`] - Running/paused/over state machine that owns the [`Board`](crate::Board)
//! - [`InputKey`] and [`HeldMovement`] - Logical keys and the held direction
//! - [`TickScheduler`] - Converts elapsed time into gravity and repeat ticks
//! - [`SessionConfig`] - Tick intervals and seed
//! - [`SessionSnapshot`] - Serializable view for a presentation layer
//!
//! # Frame Loop
//!
//! A presentation layer typically runs:
//!
//! 1. Feed the frame's key events to [`GameSession::process_frame`]
//! 2. Advance the clock with [`GameSession::advance`]
//! 3. Draw from [`GameSession::snapshot`] or the board queries
//! 4. Stop once [`GameSession::should_quit`] is set
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use blockfall_engine::{GameSession, InputKey, SessionConfig, SessionEvent};
//!
//! let mut session = GameSession::new(SessionConfig::default().with_seed(7)).unwrap();
//! session.process_frame([SessionEvent::KeyDown(InputKey::MoveLeft)]);
//! session.advance(Duration::from_millis(300));
//! session.process_frame([SessionEvent::KeyUp(InputKey::MoveLeft)]);
//!
//! let snapshot = session.snapshot();
//! assert_eq!(snapshot.falling.unwrap().position.unwrap().col(), 1);
//! ```

pub use self::{config::*, input::*, session::*, snapshot::*, ticker::*};

mod config;
mod input;
mod session;
mod snapshot;
mod ticker;
