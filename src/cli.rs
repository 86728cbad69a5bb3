use crate::difficulty::Difficulty;
use crate::engine::{Feedback, SearchRange};
use crate::error::GameError;
use crate::game_loop::{EndAction, GameInterface, GuessView, SetupInput, UserAction};
use crate::logging::{LogTarget, default_log_path};
use crate::metrics::{PerformanceSummary, format_elapsed, format_time_per_guess};
use crate::session::GuessRecord;
use chrono::{DateTime, Local};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;

/// Think of a number; the program finds it by binary search.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Lowest number you may pick (overrides the preset)
    #[arg(long)]
    pub min: Option<i64>,

    /// Highest number you may pick (overrides the preset)
    #[arg(long)]
    pub max: Option<i64>,

    /// Preset range: easy 1-100, medium 1-1000, hard 1-10000
    #[arg(short = 'd', long = "difficulty", value_enum)]
    pub difficulty: Option<Difficulty>,

    /// Use the full-screen terminal interface
    #[arg(long)]
    pub tui: bool,

    /// Log file for the full-screen interface
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Range offered at setup: the preset, with `--min`/`--max` applied on top.
    pub fn default_range(&self) -> SearchRange {
        let preset = self.difficulty.unwrap_or_default().range();
        SearchRange::new(
            self.min.unwrap_or(preset.low),
            self.max.unwrap_or(preset.high),
        )
    }

    pub fn log_target(&self) -> LogTarget {
        if !self.tui {
            return LogTarget::Stderr;
        }
        self.log_file
            .clone()
            .or_else(default_log_path)
            .map_or(LogTarget::Stderr, LogTarget::File)
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

// UI Input/Output functions

fn is_exit(input: &str) -> bool {
    matches!(input, "exit" | "quit" | "q")
}

/// Empty input keeps the defaults; also accepts a preset name, `LOW HIGH`,
/// `LOW-HIGH` or `LOW..HIGH`.
pub fn parse_setup(input: &str, defaults: SearchRange) -> Option<SetupInput> {
    let input = input.trim().to_ascii_lowercase();
    if input.is_empty() {
        return Some(SetupInput::Start {
            low: defaults.low,
            high: defaults.high,
        });
    }
    if is_exit(&input) {
        return Some(SetupInput::Exit);
    }
    if let Some(difficulty) = Difficulty::from_name(&input) {
        let range = difficulty.range();
        return Some(SetupInput::Start {
            low: range.low,
            high: range.high,
        });
    }

    let normalized = input.replace("..", " ").replace(',', " ");
    let mut words: Vec<&str> = normalized.split_whitespace().collect();
    if let &[word] = words.as_slice()
        && let Some((low, high)) = word.split_once('-')
        && !low.is_empty()
    {
        words = vec![low, high];
    }
    let mut parts = words.into_iter().map(str::parse::<i64>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(low)), Some(Ok(high)), None) => Some(SetupInput::Start { low, high }),
        _ => None,
    }
}

/// `l`/`u` (go higher), `h`/`d` (go lower), `c`/`y` (found it), `reset`, `exit`.
pub fn parse_action(input: &str) -> Option<UserAction> {
    let input = input.trim().to_ascii_lowercase();
    match input.as_str() {
        "l" | "low" | "too low" | "u" | "up" | "+" => Some(UserAction::Feedback(Feedback::TooLow)),
        "h" | "high" | "too high" | "d" | "down" | "-" => {
            Some(UserAction::Feedback(Feedback::TooHigh))
        }
        "c" | "correct" | "y" | "yes" | "=" => Some(UserAction::Feedback(Feedback::Correct)),
        "r" | "reset" | "new" => Some(UserAction::Reset),
        other if is_exit(other) => Some(UserAction::Exit),
        _ => None,
    }
}

pub fn parse_end_action(input: &str) -> Option<EndAction> {
    let input = input.trim().to_ascii_lowercase();
    match input.as_str() {
        "p" | "play" | "again" | "y" | "yes" => Some(EndAction::PlayAgain),
        "n" | "new" => Some(EndAction::NewGame),
        other if is_exit(other) => Some(EndAction::Exit),
        _ => None,
    }
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || "--:--:--".to_string(),
        |dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string(),
    )
}

pub fn format_history_entry(record: &GuessRecord) -> String {
    format!(
        "#{:<3} {:>6}  {:<9} {}",
        record.sequence_number,
        record.value,
        record.feedback.label(),
        format_timestamp(record.timestamp_ms)
    )
}

pub fn display_history<'a>(records: impl Iterator<Item = &'a GuessRecord>) {
    for record in records {
        println!("  {}", format_history_entry(record));
    }
}

pub fn display_guess(view: &GuessView<'_>) {
    println!(
        "\nGuess {} (max {}): is your number {}?   [range {}]",
        view.guess_count, view.max_expected_guesses, view.guess, view.range
    );
}

pub fn display_summary(summary: &PerformanceSummary) {
    println!("\nFound it! Your number is {}.", summary.number);
    println!(
        "Guesses: {}   Time: {}",
        summary.total_guesses,
        format_elapsed(summary.elapsed_seconds)
    );
    println!("{}", summary.efficiency_line());
    println!(
        "Time per guess: {}   Speed: {}   Time efficiency: {}",
        format_time_per_guess(summary.time_per_guess_seconds),
        summary.speed_rating,
        summary.time_efficiency_rating
    );
    println!("{}", summary.message);
}

/// CLI implementation of the GameInterface trait
/// This struct wraps a BufRead reader and implements the game interface for CLI interaction
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// `None` at end of input or on a read error.
    fn read_line(&mut self) -> Option<String> {
        let mut input = String::new();
        match self.reader.read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input),
        }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn read_setup(&mut self, defaults: SearchRange) -> Option<SetupInput> {
        println!(
            "\nThink of a number. Enter a range (e.g. '1 100'), a preset ({}), \
             press ENTER for {defaults}, or 'exit':",
            Difficulty::ALL.map(|d| d.to_string()).join("/")
        );
        let Some(line) = self.read_line() else {
            return Some(SetupInput::Exit);
        };
        let parsed = parse_setup(&line, defaults);
        if parsed.is_none() {
            println!("Invalid range. Enter two numbers, minimum first.");
        }
        parsed
    }

    fn display_guess(&mut self, view: &GuessView<'_>) {
        display_guess(view);
    }

    fn read_action(&mut self, _view: &GuessView<'_>) -> Option<UserAction> {
        println!("Answer: (l)ow, (h)igh, (c)orrect, 'reset' or 'exit'");
        let Some(line) = self.read_line() else {
            return Some(UserAction::Exit);
        };
        let parsed = parse_action(&line);
        if parsed.is_none() {
            println!("Please answer l, h or c.");
        }
        parsed
    }

    fn display_error(&mut self, error: &GameError) {
        match error {
            GameError::InconsistentFeedback { .. } => {
                println!("That cannot be correct! Please check your responses. ({error})");
            }
            _ => println!("Error: {error}"),
        }
    }

    fn display_won(&mut self, summary: &PerformanceSummary, history: &[GuessRecord]) {
        display_summary(summary);
        println!("History (latest first):");
        display_history(history.iter().rev());
    }

    fn display_failed(&mut self, range: SearchRange) {
        println!(
            "Something went wrong! Please check your responses and try again. (no number left in {range})"
        );
    }

    fn read_end_action(&mut self) -> Option<EndAction> {
        println!("\n(p)lay again, (n)ew game or 'exit'?");
        let Some(line) = self.read_line() else {
            return Some(EndAction::Exit);
        };
        parse_end_action(&line)
    }

    fn display_exit_message(&mut self) {
        println!("Exiting.");
    }
}
