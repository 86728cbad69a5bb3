//! Error types for the guessing core.
//!
//! - `InvalidRange`: bad initial bounds supplied to `start`
//! - `InconsistentFeedback`: a single feedback call contradicts the guess position
//! - `NoPendingGuess` / `UnexpectedGuess`: feedback that does not answer the
//!   guess the engine proposed
//! - `ExhaustedSearch`: no candidate is left to propose
//! - `AlreadyResolved`: the search already found the number
//! - `InactiveSession`: an operation was invoked outside an active game
//! - `NoPreviousGame`: `play_again` without an earlier `start`

use crate::engine::{Feedback, SearchRange};
use crate::session::GameStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid range {low} - {high}: {reason}")]
    InvalidRange {
        low: i64,
        high: i64,
        reason: &'static str,
    },

    /// Rejected without touching any state.
    #[error("cannot answer \"{feedback}\" for guess {guess} while the range is {range}")]
    InconsistentFeedback {
        guess: i64,
        feedback: Feedback,
        range: SearchRange,
    },

    #[error("no guess is waiting for feedback")]
    NoPendingGuess,

    #[error("feedback given for {guess}, but the pending guess is {pending}")]
    UnexpectedGuess { guess: i64, pending: i64 },

    #[error("search space exhausted (range {range})")]
    ExhaustedSearch { range: SearchRange },

    #[error("the number has already been found")]
    AlreadyResolved,

    #[error("no active game (status: {status})")]
    InactiveSession { status: GameStatus },

    #[error("no previous game to play again")]
    NoPreviousGame,
}
