//! Binary-search engine that plays the guesser.
//!
//! The engine owns the current bounds, proposes the midpoint and narrows the
//! bounds from the human's feedback.
//!
//! # State Machine
//! - `Ready` → (`next_guess`) → `AwaitingFeedback`
//! - `AwaitingFeedback` → (`TooLow`/`TooHigh`) → `Ready`
//! - `AwaitingFeedback` → (`Correct`) → `Solved`
//! - bounds cross → `Contradiction`
//!
//! `Solved` and `Contradiction` are terminal.

use crate::debug_log;
use crate::error::GameError;
use std::fmt;

/// The human's answer to a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
    /// The hidden number is higher than the guess.
    TooLow,
    /// The hidden number is lower than the guess.
    TooHigh,
    Correct,
}

impl Feedback {
    pub fn label(self) -> &'static str {
        match self {
            Self::TooLow => "too low",
            Self::TooHigh => "too high",
            Self::Correct => "correct",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive search bounds. `low > high` means no candidate is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchRange {
    pub low: i64,
    pub high: i64,
}

impl SearchRange {
    pub fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    pub fn contains(&self, value: i64) -> bool {
        self.low <= value && value <= self.high
    }

    /// Number of candidates left, zero when the bounds have crossed.
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.high.abs_diff(self.low) + 1
        }
    }
}

impl fmt::Display for SearchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.low, self.high)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Ready,
    AwaitingFeedback { guess: i64 },
    Solved { number: i64 },
    Contradiction,
}

impl SearchPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Solved { .. } | Self::Contradiction)
    }
}

/// Result of applying one piece of feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Bounds were narrowed and at least one candidate remains.
    Narrowed(SearchRange),
    Solved(i64),
    /// Bounds crossed; no single hidden number fits the feedback given.
    Contradiction(SearchRange),
}

/// Worst-case number of binary-search guesses over `low..=high`:
/// `ceil(log2(high - low + 1)) + 1`.
pub fn max_expected_guesses(low: i64, high: i64) -> u32 {
    let size = SearchRange::new(low, high).len();
    if size <= 1 {
        return 1;
    }
    // ceil(log2(n)) is the bit length of n - 1.
    (u64::BITS - (size - 1).leading_zeros()) + 1
}

fn validate_bounds(low: i64, high: i64) -> Result<(), GameError> {
    let reason = if low < 0 {
        "minimum must not be negative"
    } else if low >= high {
        "minimum must be less than maximum"
    } else if high.checked_add(1).is_none() {
        "range is too large"
    } else {
        return Ok(());
    };
    Err(GameError::InvalidRange { low, high, reason })
}

#[derive(Debug, Clone)]
pub struct RangeSearchEngine {
    range: SearchRange,
    initial: SearchRange,
    max_expected: u32,
    guesses_made: u32,
    phase: SearchPhase,
}

impl RangeSearchEngine {
    /// Set up a search over `low..=high`.
    ///
    /// Fails with [`GameError::InvalidRange`] when `low >= high`, when `low`
    /// is negative, or when the range does not fit the integer type.
    pub fn new(low: i64, high: i64) -> Result<Self, GameError> {
        validate_bounds(low, high)?;
        let range = SearchRange::new(low, high);
        let max_expected = max_expected_guesses(low, high);
        debug_log!("engine initialised over {range}, max expected guesses {max_expected}");
        Ok(Self {
            range,
            initial: range,
            max_expected,
            guesses_made: 0,
            phase: SearchPhase::Ready,
        })
    }

    pub fn range(&self) -> SearchRange {
        self.range
    }

    pub fn initial_range(&self) -> SearchRange {
        self.initial
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn guesses_made(&self) -> u32 {
        self.guesses_made
    }

    /// Fixed at initialisation; the denominator for efficiency metrics even
    /// as the range narrows.
    pub fn max_expected_guesses(&self) -> u32 {
        self.max_expected
    }

    #[cfg(test)]
    pub(crate) fn set_guesses_made(&mut self, guesses_made: u32) {
        self.guesses_made = guesses_made;
    }

    /// Propose the lower midpoint of the current range.
    ///
    /// While a guess is awaiting feedback the same guess is returned again and
    /// nothing is counted.
    pub fn next_guess(&mut self) -> Result<i64, GameError> {
        match self.phase {
            SearchPhase::AwaitingFeedback { guess } => return Ok(guess),
            SearchPhase::Solved { .. } => return Err(GameError::AlreadyResolved),
            SearchPhase::Contradiction => {
                return Err(GameError::ExhaustedSearch { range: self.range });
            }
            SearchPhase::Ready => {}
        }

        // The attempt counts even when it finds nothing left to guess.
        let attempt = self.guesses_made + 1;
        self.guesses_made = attempt;

        if self.range.is_empty() {
            self.phase = SearchPhase::Contradiction;
            return Err(GameError::ExhaustedSearch { range: self.range });
        }

        // Converged to one candidate but still being told it is wrong.
        if self.range.low >= self.range.high && attempt > self.max_expected {
            self.phase = SearchPhase::Contradiction;
            return Err(GameError::ExhaustedSearch { range: self.range });
        }

        let guess = self.range.low + (self.range.high - self.range.low) / 2;
        self.phase = SearchPhase::AwaitingFeedback { guess };
        debug_log!("guess #{attempt}: {guess} in {}", self.range);
        Ok(guess)
    }

    /// Narrow the bounds around `guess`, which must be the pending guess.
    ///
    /// Feedback with no guess pending, or for any other value, is rejected
    /// with [`GameError::NoPendingGuess`] or [`GameError::UnexpectedGuess`].
    /// A single contradictory answer (`TooLow` at or above the upper bound,
    /// `TooHigh` at or below the lower bound) is rejected with
    /// [`GameError::InconsistentFeedback`] and leaves the engine untouched.
    pub fn apply_feedback(
        &mut self,
        guess: i64,
        feedback: Feedback,
    ) -> Result<SearchOutcome, GameError> {
        if self.phase.is_terminal() {
            return Err(match self.phase {
                SearchPhase::Solved { .. } => GameError::AlreadyResolved,
                _ => GameError::ExhaustedSearch { range: self.range },
            });
        }

        let SearchPhase::AwaitingFeedback { guess: pending } = self.phase else {
            return Err(GameError::NoPendingGuess);
        };
        if guess != pending {
            return Err(GameError::UnexpectedGuess { guess, pending });
        }

        let inconsistent = GameError::InconsistentFeedback {
            guess,
            feedback,
            range: self.range,
        };

        match feedback {
            Feedback::TooLow => {
                if guess >= self.range.high {
                    return Err(inconsistent);
                }
                self.range.low = guess + 1;
            }
            Feedback::TooHigh => {
                if guess <= self.range.low {
                    return Err(inconsistent);
                }
                self.range.high = guess - 1;
            }
            Feedback::Correct => {
                self.phase = SearchPhase::Solved { number: guess };
                debug_log!("solved: {guess} after {} guesses", self.guesses_made);
                return Ok(SearchOutcome::Solved(guess));
            }
        }

        if self.range.is_empty() {
            self.phase = SearchPhase::Contradiction;
            return Ok(SearchOutcome::Contradiction(self.range));
        }

        self.phase = SearchPhase::Ready;
        debug_log!("{feedback} on {guess}, range now {}", self.range);
        Ok(SearchOutcome::Narrowed(self.range))
    }
}
