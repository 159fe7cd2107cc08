//! Game-state engine for a falling-block puzzle game.
//!
//! The engine is a pure state machine: it owns the playfield, the falling
//! piece, the randomized piece supply, and the score/level/timing state.
//! It consumes discrete input commands and millisecond timestamps, and
//! exposes read-only accessors for a renderer. It performs no I/O of its
//! own.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Board construction was attempted with a zero dimension.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("board dimensions must be non-zero, got {width}x{height}")]
pub struct BoardSizeError {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece collides with walls or occupied cells")]
pub struct PieceCollisionError;

/// Why a session rejected a command.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CommandError {
    #[display("piece colliding when moving piece")]
    PieceCollision(PieceCollisionError),
    #[display("command not accepted in the current phase")]
    PhaseDisallowed,
}
