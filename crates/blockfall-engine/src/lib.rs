pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A freshly spawned piece overlaps the stack: the game is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("spawned piece collides with the stack")]
pub struct TopReached;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding when placing it on the board")]
pub struct PieceCollisionError;
