//! Game lifecycle around a [`RangeSearchEngine`].
//!
//! A [`GameSession`] is an owned value held by the caller. Every input the
//! presentation layer receives (buttons, keys, typed lines) reduces to one of
//! `start`, `submit_feedback`, `reset` or `play_again`.

use crate::clock::{Clock, SystemClock, elapsed_seconds};
use crate::engine::{Feedback, RangeSearchEngine, SearchOutcome, SearchRange};
use crate::error::GameError;
use crate::metrics::PerformanceSummary;
use crate::{debug_log, info_log};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Idle,
    Active,
    Won,
    Failed,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Won => "won",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One guess together with the feedback it received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessRecord {
    pub value: i64,
    pub feedback: Feedback,
    /// 1-based, chronological.
    pub sequence_number: u32,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstGuess {
    pub guess: i64,
    pub range: SearchRange,
    pub max_expected_guesses: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    NextGuess {
        guess: i64,
        range: SearchRange,
        guess_count: u32,
    },
    Won(PerformanceSummary),
    /// The feedback given so far fits no single number.
    Failed { range: SearchRange },
}

fn record(history: &mut Vec<GuessRecord>, value: i64, feedback: Feedback, timestamp_ms: i64) {
    let sequence_number = u32::try_from(history.len()).map_or(u32::MAX, |n| n.saturating_add(1));
    history.push(GuessRecord {
        value,
        feedback,
        sequence_number,
        timestamp_ms,
    });
}

#[derive(Debug)]
pub struct GameSession<C: Clock = SystemClock> {
    clock: C,
    engine: Option<RangeSearchEngine>,
    original: Option<SearchRange>,
    current_guess: Option<i64>,
    guess_count: u32,
    history: Vec<GuessRecord>,
    status: GameStatus,
    start_timestamp_ms: Option<i64>,
    summary: Option<PerformanceSummary>,
}

impl GameSession<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for GameSession<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> GameSession<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            engine: None,
            original: None,
            current_guess: None,
            guess_count: 0,
            history: Vec::new(),
            status: GameStatus::Idle,
            start_timestamp_ms: None,
            summary: None,
        }
    }

    /// Begin a new game over `low..=high` and make the first guess.
    ///
    /// On [`GameError::InvalidRange`] the previous session is left as it was.
    pub fn start(&mut self, low: i64, high: i64) -> Result<FirstGuess, GameError> {
        let mut engine = RangeSearchEngine::new(low, high)?;
        let guess = engine.next_guess()?;
        let max_expected_guesses = engine.max_expected_guesses();

        self.original = Some(engine.initial_range());
        self.engine = Some(engine);
        self.history.clear();
        self.summary = None;
        self.guess_count = 1;
        self.current_guess = Some(guess);
        self.start_timestamp_ms = Some(self.clock.now_ms());
        self.status = GameStatus::Active;

        info_log!("game started over {low} - {high}, first guess {guess}");
        Ok(FirstGuess {
            guess,
            range: SearchRange::new(low, high),
            max_expected_guesses,
        })
    }

    /// Report the human's answer to the current guess.
    ///
    /// Inconsistent single answers are returned as errors and change nothing.
    /// A search that runs out of candidates is reported as
    /// [`SessionUpdate::Failed`], not as an error.
    pub fn submit_feedback(&mut self, feedback: Feedback) -> Result<SessionUpdate, GameError> {
        let status = self.status;
        let (Some(engine), Some(guess), GameStatus::Active) =
            (self.engine.as_mut(), self.current_guess, status)
        else {
            return Err(GameError::InactiveSession { status });
        };

        let outcome = match engine.apply_feedback(guess, feedback) {
            Ok(outcome) => outcome,
            Err(err @ GameError::InconsistentFeedback { .. }) => {
                log::warn!("rejected feedback: {err}");
                return Err(err);
            }
            Err(GameError::ExhaustedSearch { range }) => return Ok(self.fail(range)),
            Err(err) => return Err(err),
        };

        let max_expected = engine.max_expected_guesses();
        let now = self.clock.now_ms();
        record(&mut self.history, guess, feedback, now);

        match outcome {
            SearchOutcome::Solved(number) => {
                let elapsed = elapsed_seconds(now, self.start_timestamp_ms.unwrap_or(now));
                let summary =
                    PerformanceSummary::compute(number, self.guess_count, max_expected, elapsed);
                self.status = GameStatus::Won;
                self.summary = Some(summary.clone());
                info_log!(
                    "won: {number} in {} guesses, {elapsed}s",
                    self.guess_count
                );
                Ok(SessionUpdate::Won(summary))
            }
            SearchOutcome::Contradiction(range) => Ok(self.fail(range)),
            SearchOutcome::Narrowed(range) => match engine.next_guess() {
                Ok(next) => {
                    self.guess_count += 1;
                    self.current_guess = Some(next);
                    debug_log!("next guess {next} in {range}");
                    Ok(SessionUpdate::NextGuess {
                        guess: next,
                        range,
                        guess_count: self.guess_count,
                    })
                }
                Err(GameError::ExhaustedSearch { range }) => {
                    self.guess_count += 1;
                    Ok(self.fail(range))
                }
                Err(err) => Err(err),
            },
        }
    }

    /// Discard the game and return to `Idle`. The bounds of the last `start`
    /// are kept for [`play_again`](Self::play_again).
    pub fn reset(&mut self) {
        self.engine = None;
        self.current_guess = None;
        self.guess_count = 0;
        self.history.clear();
        self.start_timestamp_ms = None;
        self.summary = None;
        self.status = GameStatus::Idle;
        debug_log!("session reset");
    }

    /// Start again over the bounds given to the most recent `start`.
    pub fn play_again(&mut self) -> Result<FirstGuess, GameError> {
        let range = self.original.ok_or(GameError::NoPreviousGame)?;
        self.reset();
        self.start(range.low, range.high)
    }

    fn fail(&mut self, range: SearchRange) -> SessionUpdate {
        self.status = GameStatus::Failed;
        self.current_guess = None;
        log::warn!(
            "inconsistent feedback: no number left in {range} after {} guesses",
            self.guess_count
        );
        SessionUpdate::Failed { range }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Current bounds, `None` while idle.
    pub fn range(&self) -> Option<SearchRange> {
        self.engine.as_ref().map(RangeSearchEngine::range)
    }

    /// Bounds supplied to the most recent successful `start`.
    pub fn original_range(&self) -> Option<SearchRange> {
        self.original
    }

    pub fn current_guess(&self) -> Option<i64> {
        self.current_guess
    }

    pub fn guess_count(&self) -> u32 {
        self.guess_count
    }

    pub fn max_expected_guesses(&self) -> Option<u32> {
        self.engine
            .as_ref()
            .map(RangeSearchEngine::max_expected_guesses)
    }

    /// Chronological order.
    pub fn history(&self) -> &[GuessRecord] {
        &self.history
    }

    /// Display order: latest guess first.
    pub fn history_recent_first(&self) -> impl Iterator<Item = &GuessRecord> {
        self.history.iter().rev()
    }

    pub fn start_timestamp_ms(&self) -> Option<i64> {
        self.start_timestamp_ms
    }

    /// Seconds since `start`, zero while idle.
    pub fn elapsed_seconds(&self) -> u64 {
        self.start_timestamp_ms
            .map_or(0, |start| elapsed_seconds(self.clock.now_ms(), start))
    }

    /// Set once the game is won.
    pub fn summary(&self) -> Option<&PerformanceSummary> {
        self.summary.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::metrics::EfficiencyTier;

    fn session() -> (GameSession<ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        (GameSession::with_clock(clock.clone()), clock)
    }

    #[test]
    fn test_new_session_is_idle() {
        let (session, _) = session();
        assert_eq!(session.status(), GameStatus::Idle);
        assert_eq!(session.range(), None);
        assert_eq!(session.current_guess(), None);
        assert_eq!(session.elapsed_seconds(), 0);
    }

    #[test]
    fn test_start_makes_first_guess_without_history() {
        let (mut session, _) = session();
        let first = session.start(1, 100).unwrap();
        assert_eq!(first.guess, 50);
        assert_eq!(first.max_expected_guesses, 8);
        assert_eq!(session.status(), GameStatus::Active);
        assert_eq!(session.guess_count(), 1);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_start_with_invalid_range_keeps_previous_game() {
        let (mut session, _) = session();
        session.start(1, 100).unwrap();
        let err = session.start(5, 5).unwrap_err();
        assert!(matches!(err, GameError::InvalidRange { .. }));
        assert_eq!(session.status(), GameStatus::Active);
        assert_eq!(session.original_range(), Some(SearchRange::new(1, 100)));
    }

    #[test]
    fn test_too_low_then_correct_wins_in_two() {
        let (mut session, _) = session();
        session.start(1, 100).unwrap();
        let update = session.submit_feedback(Feedback::TooLow).unwrap();
        assert_eq!(
            update,
            SessionUpdate::NextGuess {
                guess: 75,
                range: SearchRange::new(51, 100),
                guess_count: 2
            }
        );
        let update = session.submit_feedback(Feedback::Correct).unwrap();
        assert!(matches!(update, SessionUpdate::Won(_)));
        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.guess_count(), 2);
    }

    #[test]
    fn test_descending_search_rates_good() {
        let (mut session, clock) = session();
        session.start(1, 8).unwrap();
        assert_eq!(session.current_guess(), Some(4));
        session.submit_feedback(Feedback::TooHigh).unwrap();
        assert_eq!(session.range(), Some(SearchRange::new(1, 3)));
        assert_eq!(session.current_guess(), Some(2));
        session.submit_feedback(Feedback::TooHigh).unwrap();
        assert_eq!(session.range(), Some(SearchRange::new(1, 1)));
        assert_eq!(session.current_guess(), Some(1));
        clock.advance_secs(12);

        let SessionUpdate::Won(summary) = session.submit_feedback(Feedback::Correct).unwrap()
        else {
            panic!("expected a win");
        };
        assert_eq!(summary.number, 1);
        assert_eq!(summary.total_guesses, 3);
        assert_eq!(summary.max_expected_guesses, 4);
        assert_eq!(summary.elapsed_seconds, 12);
        assert_eq!(summary.efficiency_tier, EfficiencyTier::Good);
        assert_eq!(session.summary(), Some(&summary));
    }

    #[test]
    fn test_too_low_at_upper_bound_changes_nothing() {
        let (mut session, _) = session();
        session.start(4, 5).unwrap();
        session.submit_feedback(Feedback::TooLow).unwrap();
        assert_eq!(session.current_guess(), Some(5));
        assert_eq!(session.range(), Some(SearchRange::new(5, 5)));

        let err = session.submit_feedback(Feedback::TooLow).unwrap_err();
        assert!(matches!(err, GameError::InconsistentFeedback { guess: 5, .. }));
        assert_eq!(session.status(), GameStatus::Active);
        assert_eq!(session.guess_count(), 2);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.range(), Some(SearchRange::new(5, 5)));
        assert_eq!(session.current_guess(), Some(5));
    }

    type Snapshot = (
        GameStatus,
        Option<SearchRange>,
        Option<i64>,
        u32,
        Vec<GuessRecord>,
        u64,
        Option<PerformanceSummary>,
    );

    fn snapshot(session: &GameSession<ManualClock>) -> Snapshot {
        (
            session.status(),
            session.range(),
            session.current_guess(),
            session.guess_count(),
            session.history().to_vec(),
            session.elapsed_seconds(),
            session.summary().cloned(),
        )
    }

    #[test]
    fn test_reading_state_changes_nothing() {
        let (mut read, clock) = session();
        let mut untouched = GameSession::with_clock(clock.clone());
        read.start(1, 100).unwrap();
        untouched.start(1, 100).unwrap();
        clock.advance_secs(7);

        let first = snapshot(&read);
        assert_eq!(snapshot(&read), first);
        assert_eq!(first, snapshot(&untouched));
        assert_eq!(first.3, 1);
        assert_eq!(first.5, 7);

        for feedback in [Feedback::TooLow, Feedback::TooHigh, Feedback::Correct] {
            let _ = snapshot(&read);
            let _ = snapshot(&read);
            assert_eq!(
                read.submit_feedback(feedback),
                untouched.submit_feedback(feedback)
            );
        }

        let won = snapshot(&read);
        assert_eq!(won.0, GameStatus::Won);
        assert_eq!(snapshot(&read), won);
        assert_eq!(won, snapshot(&untouched));
        assert_eq!(won.6.map(|summary| summary.number), Some(62));
    }

    #[test]
    fn test_spent_budget_fails_game_instead_of_erroring() {
        let (mut session, _) = session();
        session.start(4, 5).unwrap();
        if let Some(engine) = session.engine.as_mut() {
            engine.set_guesses_made(engine.max_expected_guesses());
        }

        // [4, 5] narrows to [5, 5] with no guesses left to spend
        let update = session.submit_feedback(Feedback::TooLow).unwrap();
        assert_eq!(
            update,
            SessionUpdate::Failed {
                range: SearchRange::new(5, 5)
            }
        );
        assert_eq!(session.status(), GameStatus::Failed);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.current_guess(), None);
        // the attempt that found nothing left is counted
        assert_eq!(session.guess_count(), 2);
        assert!(matches!(
            session.submit_feedback(Feedback::Correct),
            Err(GameError::InactiveSession {
                status: GameStatus::Failed
            })
        ));
    }

    #[test]
    fn test_feedback_while_idle_is_rejected() {
        let (mut session, _) = session();
        assert_eq!(
            session.submit_feedback(Feedback::Correct),
            Err(GameError::InactiveSession {
                status: GameStatus::Idle
            })
        );
    }

    #[test]
    fn test_feedback_after_win_is_rejected() {
        let (mut session, _) = session();
        session.start(1, 100).unwrap();
        session.submit_feedback(Feedback::Correct).unwrap();
        assert!(matches!(
            session.submit_feedback(Feedback::TooLow),
            Err(GameError::InactiveSession {
                status: GameStatus::Won
            })
        ));
    }

    #[test]
    fn test_history_records_feedback_in_order() {
        let (mut session, clock) = session();
        session.start(1, 100).unwrap();
        clock.advance_secs(2);
        session.submit_feedback(Feedback::TooLow).unwrap();
        clock.advance_secs(3);
        session.submit_feedback(Feedback::TooHigh).unwrap();
        session.submit_feedback(Feedback::Correct).unwrap();

        let values: Vec<(i64, Feedback, u32)> = session
            .history()
            .iter()
            .map(|r| (r.value, r.feedback, r.sequence_number))
            .collect();
        assert_eq!(
            values,
            vec![
                (50, Feedback::TooLow, 1),
                (75, Feedback::TooHigh, 2),
                (62, Feedback::Correct, 3),
            ]
        );
        assert_eq!(session.history()[0].timestamp_ms, 1_002_000);
        assert_eq!(session.history()[1].timestamp_ms, 1_005_000);

        let latest: Vec<i64> = session.history_recent_first().map(|r| r.value).collect();
        assert_eq!(latest, vec![62, 75, 50]);
    }

    #[test]
    fn test_elapsed_seconds_tracks_clock() {
        let (mut session, clock) = session();
        session.start(1, 100).unwrap();
        clock.advance_ms(65_900);
        assert_eq!(session.elapsed_seconds(), 65);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let (mut session, _) = session();
        session.start(1, 100).unwrap();
        session.submit_feedback(Feedback::TooLow).unwrap();
        session.reset();
        assert_eq!(session.status(), GameStatus::Idle);
        assert_eq!(session.guess_count(), 0);
        assert!(session.history().is_empty());
        assert_eq!(session.range(), None);
        assert_eq!(session.elapsed_seconds(), 0);
    }

    #[test]
    fn test_play_again_reuses_original_bounds() {
        let (mut session, _) = session();
        session.start(1, 1000).unwrap();
        session.submit_feedback(Feedback::TooLow).unwrap();
        session.submit_feedback(Feedback::Correct).unwrap();

        let first = session.play_again().unwrap();
        assert_eq!(first.range, SearchRange::new(1, 1000));
        assert_eq!(first.guess, 500);
        assert_eq!(session.guess_count(), 1);
        assert!(session.history().is_empty());
        assert_eq!(session.summary(), None);
    }

    #[test]
    fn test_play_again_without_previous_game() {
        let (mut session, _) = session();
        assert_eq!(session.play_again(), Err(GameError::NoPreviousGame));
    }
}
