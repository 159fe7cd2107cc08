//! Game logic and state management.
//!
//! This module provides the high-level logic that orchestrates the core data
//! structures into a playable falling-block game:
//!
//! - [`GameSession`] - Full game state machine (board, falling piece, score,
//!   level, gravity timing)
//! - [`PieceBag`] - 7-bag piece generation system
//! - [`Command`] - The closed set of player inputs a session accepts
//! - [`KeyRepeat`] - Delay/interval repeat timers for held movement keys
//!
//! # Game flow
//!
//! 1. Create a [`GameSession`] (optionally with a fixed seed)
//! 2. Feed player inputs through [`GameSession::apply`]
//! 3. Feed elapsed time through [`GameSession::tick`] so gravity advances
//! 4. A piece that can no longer fall locks, completed lines clear, and the
//!    next piece spawns
//! 5. Repeat until a spawn collides or the stack reaches the top row

pub use self::{input::*, piece_bag::*, session::*};

mod input;
mod piece_bag;
mod session;
