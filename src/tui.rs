//! TUI (Terminal User Interface) for the number guesser
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # State Machine
//! The UI follows these state transitions:
//! - `Setup` → `Guessing` → `Won` → (`Guessing` on play again | `Setup` on new game)
//! - `Guessing` → `Failed` → `Setup`
//!
//! The elapsed-time display is refreshed on every input poll; it is read from
//! the clock and never feeds back into the game.

use crate::clock::{Clock, SystemClock, elapsed_seconds};
use crate::difficulty::Difficulty;
use crate::engine::{Feedback, SearchRange};
use crate::error::GameError;
use crate::game_loop::{EndAction, GameInterface, GuessView, SetupInput, UserAction};
use crate::metrics::{PerformanceSummary, format_elapsed, format_time_per_guess};
use crate::session::GuessRecord;
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::time::Duration;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const MAX_BOUND_DIGITS: usize = 12;
const MAX_HISTORY_DISPLAY: usize = 15;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const GUESS_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SetupField {
    Min,
    Max,
}

impl SetupField {
    fn toggle(self) -> Self {
        match self {
            Self::Min => Self::Max,
            Self::Max => Self::Min,
        }
    }
}

#[derive(Debug)]
enum TuiState {
    Setup { field: SetupField },
    Guessing,
    Won,
    /// Shown until the next setup key press.
    Failed,
}

/// The guess currently on screen, copied out of the session snapshot.
#[derive(Debug, Clone, Copy)]
struct GuessCard {
    guess: i64,
    range: SearchRange,
    original: SearchRange,
    guess_count: u32,
    max_expected_guesses: u32,
    start_timestamp_ms: i64,
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    state: &'a TuiState,
    min_input: &'a str,
    max_input: &'a str,
    card: Option<&'a GuessCard>,
    elapsed: &'a str,
    history: &'a [GuessRecord],
    summary: Option<&'a PerformanceSummary>,
    message: &'a str,
    error_message: &'a str,
    status: &'a str,
}

/// Type one character into a bound field. A prefilled field is replaced by
/// the first character typed into it.
fn type_into_bound(input: &mut String, overwrite: &mut bool, c: char) {
    if std::mem::take(overwrite) {
        input.clear();
    }
    if c.is_ascii_digit() && input.len() < MAX_BOUND_DIGITS {
        input.push(c);
    } else if c == '-' && input.is_empty() {
        input.push(c);
    }
}

fn feedback_marker(feedback: Feedback) -> (&'static str, Style) {
    match feedback {
        Feedback::TooLow => ("^ too low", INFO_STYLE),
        Feedback::TooHigh => ("v too high", ERROR_STYLE),
        Feedback::Correct => ("* correct", SUCCESS_STYLE),
    }
}

/// Main TUI interface component.
///
/// Manages terminal rendering, input handling, and game state display.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    clock: SystemClock,
    state: TuiState,
    min_input: String,
    max_input: String,
    /// The active bound field still holds its prefilled value.
    overwrite: bool,
    card: Option<GuessCard>,
    history: Vec<GuessRecord>,
    summary: Option<PerformanceSummary>,
    message: String,
    error_message: String,
    status: String,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete: raw mode, alternate screen, cursor hidden");

        Ok(Self {
            terminal,
            clock: SystemClock,
            state: TuiState::Setup {
                field: SetupField::Min,
            },
            min_input: String::new(),
            max_input: String::new(),
            overwrite: false,
            card: None,
            history: Vec::new(),
            summary: None,
            message: String::new(),
            error_message: String::new(),
            status: "Ready to start".to_string(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn elapsed_display(&self) -> String {
        match (&self.state, self.card, self.summary.as_ref()) {
            (TuiState::Won, _, Some(summary)) => format_elapsed(summary.elapsed_seconds),
            (TuiState::Guessing, Some(card), _) => format_elapsed(elapsed_seconds(
                self.clock.now_ms(),
                card.start_timestamp_ms,
            )),
            _ => String::new(),
        }
    }

    /// Draw the current UI state to the terminal.
    ///
    /// Returns an error if rendering fails.
    fn draw(&mut self) -> Result<(), io::Error> {
        let elapsed = self.elapsed_display();
        let ctx = RenderContext {
            state: &self.state,
            min_input: &self.min_input,
            max_input: &self.max_input,
            card: self.card.as_ref(),
            elapsed: &elapsed,
            history: &self.history,
            summary: self.summary.as_ref(),
            message: &self.message,
            error_message: &self.error_message,
            status: &self.status,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    /// Log and handle draw errors appropriately
    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    /// Render the complete UI layout using the provided context.
    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(10),   // Main panel
                Constraint::Length(4), // Messages
                Constraint::Length(3), // Status line
                Constraint::Length(3), // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0]);
        match ctx.state {
            TuiState::Setup { field } => Self::render_setup(f, chunks[1], ctx, *field),
            TuiState::Guessing | TuiState::Failed => Self::render_game(f, chunks[1], ctx),
            TuiState::Won => Self::render_won(f, chunks[1], ctx),
        }
        Self::render_messages(f, chunks[2], ctx.message, ctx.error_message);
        Self::render_status(f, chunks[3], ctx.status);
        Self::render_instructions(f, chunks[4], ctx.state);
    }

    fn render_title(f: &mut Frame, area: Rect) {
        let title = Paragraph::new("NUMBER GUESSER")
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_setup(f: &mut Frame, area: Rect, ctx: &RenderContext, field: SetupField) {
        let input_style = |active: bool| {
            if active {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            }
        };

        let mut lines = vec![
            Line::from(Span::styled("Think of a number in a range:", HEADER_STYLE)),
            Line::from(""),
            Line::from(vec![
                Span::raw("  Minimum: "),
                Span::styled(
                    format!(" {:<width$} ", ctx.min_input, width = MAX_BOUND_DIGITS),
                    input_style(field == SetupField::Min),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::raw("  Maximum: "),
                Span::styled(
                    format!(" {:<width$} ", ctx.max_input, width = MAX_BOUND_DIGITS),
                    input_style(field == SetupField::Max),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled("Quick start:", INFO_STYLE)),
        ];
        for difficulty in Difficulty::ALL {
            let range = difficulty.range();
            let key = difficulty.to_string().chars().next().unwrap_or('?');
            lines.push(Line::from(format!(
                "  {}: {difficulty} ({range})",
                key.to_ascii_uppercase()
            )));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("New Game").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_game(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let mut lines = Vec::new();
        if let Some(card) = ctx.card {
            lines.push(Line::from(""));
            lines.push(
                Line::from(vec![Span::raw("Is your number   "), Span::styled(
                    format!("  {}  ", card.guess),
                    GUESS_STYLE,
                ), Span::raw("   ?")])
                .alignment(Alignment::Center),
            );
            lines.push(Line::from(""));
            lines.push(Line::from(format!("  Range:      {}", card.range)));
            lines.push(Line::from(format!("  Started as: {}", card.original)));
            lines.push(Line::from(format!(
                "  Guess:      {} (max {})",
                card.guess_count, card.max_expected_guesses
            )));
            lines.push(Line::from(format!("  Time:       {}", ctx.elapsed)));
        }
        let card = Paragraph::new(lines)
            .block(Block::default().title("Guess").borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        f.render_widget(card, columns[0]);

        Self::render_history(f, columns[1], ctx.history);
    }

    fn render_history(f: &mut Frame, area: Rect, history: &[GuessRecord]) {
        let lines: Vec<Line> = history
            .iter()
            .rev()
            .take(MAX_HISTORY_DISPLAY)
            .map(|record| {
                let (label, style) = feedback_marker(record.feedback);
                Line::from(vec![
                    Span::raw(format!("  #{:<3} {:>6}  ", record.sequence_number, record.value)),
                    Span::styled(label, style),
                ])
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("History").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_won(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let mut lines = Vec::new();
        if let Some(summary) = ctx.summary {
            lines.push(Line::from(Span::styled(
                format!("Found it! Your number is {}.", summary.number),
                SUCCESS_STYLE,
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "  Guesses: {}   Time: {}",
                summary.total_guesses, ctx.elapsed
            )));
            lines.push(Line::from(Span::styled(
                format!("  {}", summary.efficiency_line()),
                INFO_STYLE,
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "  Time per guess:  {}",
                format_time_per_guess(summary.time_per_guess_seconds)
            )));
            lines.push(Line::from(format!("  Average speed:   {}", summary.speed_rating)));
            lines.push(Line::from(format!(
                "  Time efficiency: {} ({}%)",
                summary.time_efficiency_rating, summary.time_efficiency_percent
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                summary.message.to_string(),
                MESSAGE_STYLE,
            )));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Result").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, columns[0]);

        Self::render_history(f, columns[1], ctx.history);
    }

    fn render_messages(f: &mut Frame, area: Rect, message: &str, error_message: &str) {
        let mut lines = Vec::new();
        if !message.is_empty() {
            lines.push(Line::from(vec![Span::styled(message, MESSAGE_STYLE)]));
        }
        if !error_message.is_empty() {
            lines.push(Line::from(vec![Span::styled(error_message, ERROR_STYLE)]));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Information").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, state: &TuiState) {
        let text = match state {
            TuiState::Setup { .. } => {
                "Digits: Type bound | TAB: Switch field | ENTER: Start | E/M/H: Quick start | ESC: Quit"
            }
            TuiState::Guessing => {
                "UP/U: Too low | DOWN/D: Too high | ENTER/C: Correct | R: Reset | ESC: Quit"
            }
            TuiState::Won => "P/ENTER: Play again | N: New game | ESC: Quit",
            TuiState::Failed => "Any key: Back to setup | ESC: Quit",
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let status_text = if status.is_empty() { "Ready" } else { status };
        let paragraph = Paragraph::new(status_text)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    /// Wait up to one poll interval for a key press.
    ///
    /// Non-key events, key releases and garbage characters from escape
    /// sequences are swallowed.
    fn next_key(&mut self) -> Result<Option<KeyEvent>, io::Error> {
        if !event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }

        let Event::Key(key) = event::read()? else {
            debug_log!("next_key() - Ignoring non-key event");
            return Ok(None);
        };

        // Only process Press events, ignore Release and Repeat to avoid double input
        if key.kind != event::KeyEventKind::Press {
            return Ok(None);
        }

        if let KeyCode::Char(c) = key.code
            && (c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD)
        {
            debug_log!("next_key() - Ignoring invalid character: {:?}", c);
            return Ok(None);
        }

        if key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
        {
            debug_log!("next_key() - Ignoring key with modifier: {:?}", key.modifiers);
            return Ok(None);
        }

        debug_log!("next_key() - code={:?}", key.code);
        Ok(Some(key))
    }

    /// Redraw and read keys until `handle` produces something.
    ///
    /// Drawing or input failures are treated as a request to quit.
    fn read_until<T>(
        &mut self,
        on_failure: T,
        mut handle: impl FnMut(&mut Self, KeyEvent) -> Option<T>,
    ) -> T {
        loop {
            if self.draw().is_err() {
                info_log!("read_until() - Draw failed, quitting");
                return on_failure;
            }
            match self.next_key() {
                Ok(Some(key)) => {
                    if let Some(value) = handle(self, key) {
                        return value;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    info_log!("read_until() - Input error: {}", e);
                    return on_failure;
                }
            }
        }
    }

    fn handle_setup_input(&mut self, key: KeyEvent) -> Option<SetupInput> {
        let TuiState::Setup { field } = self.state else {
            if key.code == KeyCode::Esc {
                return Some(SetupInput::Exit);
            }
            self.state = TuiState::Setup {
                field: SetupField::Min,
            };
            self.error_message.clear();
            return None;
        };
        self.error_message.clear();

        let input = match field {
            SetupField::Min => &mut self.min_input,
            SetupField::Max => &mut self.max_input,
        };

        match key.code {
            KeyCode::Esc => return Some(SetupInput::Exit),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                type_into_bound(input, &mut self.overwrite, c);
            }
            KeyCode::Backspace => {
                self.overwrite = false;
                input.pop();
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.overwrite = true;
                self.state = TuiState::Setup {
                    field: field.toggle(),
                };
            }
            KeyCode::Char(c) => {
                if let Some(difficulty) = Difficulty::from_name(&c.to_string()) {
                    let range = difficulty.range();
                    self.min_input = range.low.to_string();
                    self.max_input = range.high.to_string();
                    return Some(SetupInput::Start {
                        low: range.low,
                        high: range.high,
                    });
                }
            }
            KeyCode::Enter => {
                match (self.min_input.parse::<i64>(), self.max_input.parse::<i64>()) {
                    (Ok(low), Ok(high)) => return Some(SetupInput::Start { low, high }),
                    _ => {
                        self.error_message =
                            "Please enter valid range values. Minimum must be less than maximum."
                                .to_string();
                    }
                }
            }
            _ => {
                debug_log!("handle_setup_input() - Ignoring key: {:?}", key.code);
            }
        }
        None
    }

    fn handle_guess_input(key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Up | KeyCode::Char('u' | 'U' | 'l' | 'L') => {
                Some(UserAction::Feedback(Feedback::TooLow))
            }
            KeyCode::Down | KeyCode::Char('d' | 'D' | 'h' | 'H') => {
                Some(UserAction::Feedback(Feedback::TooHigh))
            }
            KeyCode::Enter | KeyCode::Char('c' | 'C') => {
                Some(UserAction::Feedback(Feedback::Correct))
            }
            KeyCode::Char('r' | 'R') => Some(UserAction::Reset),
            KeyCode::Esc => Some(UserAction::Exit),
            _ => None,
        }
    }

    fn handle_won_input(key: KeyEvent) -> Option<EndAction> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('p' | 'P') => Some(EndAction::PlayAgain),
            KeyCode::Char('n' | 'N') => Some(EndAction::NewGame),
            KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(EndAction::Exit),
            _ => None,
        }
    }
}

impl GameInterface for TuiInterface {
    fn read_setup(&mut self, defaults: SearchRange) -> Option<SetupInput> {
        // A failed board stays up until the first key press.
        if !matches!(self.state, TuiState::Failed) {
            self.state = TuiState::Setup {
                field: SetupField::Min,
            };
            self.card = None;
            self.history.clear();
        }
        self.summary = None;
        self.min_input = defaults.low.to_string();
        self.max_input = defaults.high.to_string();
        self.overwrite = true;
        self.status = "Choose a range and press ENTER".to_string();

        let input = self.read_until(SetupInput::Exit, Self::handle_setup_input);
        info_log!("read_setup() - {:?}", input);
        Some(input)
    }

    fn display_guess(&mut self, view: &GuessView<'_>) {
        self.state = TuiState::Guessing;
        self.card = Some(GuessCard {
            guess: view.guess,
            range: view.range,
            original: view.original,
            guess_count: view.guess_count,
            max_expected_guesses: view.max_expected_guesses,
            start_timestamp_ms: view.start_timestamp_ms,
        });
        self.history = view.history.to_vec();
        self.summary = None;
        self.message = format!("Guess number {}: {}", view.guess_count, view.guess);
        self.error_message.clear();
        self.status = format!("Searching {} - {} left", view.range, view.range.len());
        self.draw_or_log();
    }

    fn read_action(&mut self, _view: &GuessView<'_>) -> Option<UserAction> {
        let action = self.read_until(UserAction::Exit, |_, key| Self::handle_guess_input(key));
        debug_log!("read_action() - {:?}", action);
        Some(action)
    }

    fn display_error(&mut self, error: &GameError) {
        self.error_message = match error {
            GameError::InconsistentFeedback { .. } => {
                "That cannot be correct! Please check your responses.".to_string()
            }
            other => other.to_string(),
        };
        self.draw_or_log();
    }

    fn display_won(&mut self, summary: &PerformanceSummary, history: &[GuessRecord]) {
        self.state = TuiState::Won;
        self.summary = Some(summary.clone());
        self.history = history.to_vec();
        self.message = format!(
            "Found {} in {} tries in {}.",
            summary.number,
            summary.total_guesses,
            format_elapsed(summary.elapsed_seconds)
        );
        self.error_message.clear();
        self.status = "Game won".to_string();
        self.draw_or_log();
    }

    fn display_failed(&mut self, range: SearchRange) {
        self.state = TuiState::Failed;
        self.message.clear();
        self.error_message = format!(
            "Something went wrong! Please check your responses and try again. (no number left in {range})"
        );
        self.status = "Game failed".to_string();
        self.draw_or_log();
    }

    fn read_end_action(&mut self) -> Option<EndAction> {
        let action = self.read_until(EndAction::Exit, |_, key| Self::handle_won_input(key));
        Some(action)
    }

    fn display_exit_message(&mut self) {
        self.message = "Exiting...".to_string();
        self.status = "Exiting application...".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
