use crate::clock::Clock;
use crate::engine::{Feedback, SearchRange};
use crate::error::GameError;
use crate::metrics::PerformanceSummary;
use crate::session::{GameSession, GameStatus, GuessRecord, SessionUpdate};
use crate::{debug_log, info_log};

/// Answer to the setup prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupInput {
    Start { low: i64, high: i64 },
    Exit,
}

/// Input while a guess is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Feedback(Feedback),
    /// Abandon the game and go back to setup.
    Reset,
    Exit,
}

/// Input after a game has been won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAction {
    PlayAgain,
    NewGame,
    Exit,
}

/// Read-only snapshot of an active game for display.
#[derive(Debug, Clone, Copy)]
pub struct GuessView<'a> {
    pub guess: i64,
    pub range: SearchRange,
    pub original: SearchRange,
    pub guess_count: u32,
    pub max_expected_guesses: u32,
    pub start_timestamp_ms: i64,
    pub history: &'a [GuessRecord],
}

impl<'a> GuessView<'a> {
    /// `None` unless the session is active with a guess on the table.
    pub fn from_session<C: Clock>(session: &'a GameSession<C>) -> Option<Self> {
        if session.status() != GameStatus::Active {
            return None;
        }
        Some(Self {
            guess: session.current_guess()?,
            range: session.range()?,
            original: session.original_range()?,
            guess_count: session.guess_count(),
            max_expected_guesses: session.max_expected_guesses()?,
            start_timestamp_ms: session.start_timestamp_ms()?,
            history: session.history(),
        })
    }
}

/// The presentation collaborator: supplies inputs and shows state.
///
/// Readers return `None` for input that could not be understood; the loop
/// simply asks again.
pub trait GameInterface {
    fn read_setup(&mut self, defaults: SearchRange) -> Option<SetupInput>;
    fn display_guess(&mut self, view: &GuessView<'_>);
    fn read_action(&mut self, view: &GuessView<'_>) -> Option<UserAction>;
    fn display_error(&mut self, error: &GameError);
    fn display_won(&mut self, summary: &PerformanceSummary, history: &[GuessRecord]);
    fn display_failed(&mut self, range: SearchRange);
    fn read_end_action(&mut self) -> Option<EndAction>;
    fn display_exit_message(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub games_won: u32,
    pub games_failed: u32,
}

enum RoundEnd {
    Won,
    Failed,
    Reset,
    Exit,
}

/// Drive setup → active → resolved until the interface asks to exit.
pub fn game_loop<C: Clock, I: GameInterface>(
    session: &mut GameSession<C>,
    defaults: SearchRange,
    interface: &mut I,
) -> LoopStats {
    let mut stats = LoopStats::default();
    let mut defaults = defaults;

    'setup: loop {
        let Some(input) = interface.read_setup(defaults) else {
            continue;
        };
        let (low, high) = match input {
            SetupInput::Exit => break,
            SetupInput::Start { low, high } => (low, high),
        };
        if let Err(e) = session.start(low, high) {
            interface.display_error(&e);
            continue;
        }
        defaults = SearchRange::new(low, high);

        loop {
            match play_round(session, interface) {
                RoundEnd::Won => stats.games_won += 1,
                RoundEnd::Failed => {
                    stats.games_failed += 1;
                    session.reset();
                    continue 'setup;
                }
                RoundEnd::Reset => {
                    session.reset();
                    continue 'setup;
                }
                RoundEnd::Exit => break 'setup,
            }

            loop {
                match interface.read_end_action() {
                    None => {}
                    Some(EndAction::Exit) => break 'setup,
                    Some(EndAction::NewGame) => {
                        session.reset();
                        continue 'setup;
                    }
                    Some(EndAction::PlayAgain) => match session.play_again() {
                        Ok(_) => break,
                        Err(e) => {
                            interface.display_error(&e);
                            session.reset();
                            continue 'setup;
                        }
                    },
                }
            }
        }
    }

    info_log!(
        "leaving game loop: {} won, {} failed",
        stats.games_won,
        stats.games_failed
    );
    interface.display_exit_message();
    stats
}

fn play_round<C: Clock, I: GameInterface>(
    session: &mut GameSession<C>,
    interface: &mut I,
) -> RoundEnd {
    let mut show_guess = true;
    loop {
        let action = {
            let Some(view) = GuessView::from_session(session) else {
                return RoundEnd::Reset;
            };
            if show_guess {
                interface.display_guess(&view);
            }
            interface.read_action(&view)
        };
        show_guess = false;

        let Some(action) = action else {
            continue;
        };
        debug_log!("play_round() - action {:?}", action);

        let feedback = match action {
            UserAction::Exit => return RoundEnd::Exit,
            UserAction::Reset => return RoundEnd::Reset,
            UserAction::Feedback(feedback) => feedback,
        };

        match session.submit_feedback(feedback) {
            Ok(SessionUpdate::NextGuess { .. }) => show_guess = true,
            Ok(SessionUpdate::Won(summary)) => {
                interface.display_won(&summary, session.history());
                return RoundEnd::Won;
            }
            Ok(SessionUpdate::Failed { range }) => {
                interface.display_failed(range);
                return RoundEnd::Failed;
            }
            Err(e) => interface.display_error(&e),
        }
    }
}
