// Library interface for number-guesser
// This allows integration tests to access internal modules

pub mod logging;

pub mod cli;
pub mod clock;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod game_loop;
pub mod metrics;
pub mod session;
pub mod tui;

// Re-export commonly used types for easier testing
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Feedback, RangeSearchEngine, SearchOutcome, SearchRange, max_expected_guesses};
pub use error::GameError;
pub use game_loop::{GameInterface, LoopStats, game_loop};
pub use metrics::PerformanceSummary;
pub use session::{GameSession, GameStatus, GuessRecord, SessionUpdate};
