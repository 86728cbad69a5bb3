//! Performance metrics derived when a game is won.
//!
//! A [`PerformanceSummary`] is a pure function of guess count, the fixed
//! worst-case guess budget and elapsed time. It is recomputed, never updated.

use std::fmt;

/// Expected seconds per guess for a well-paced game.
pub const EXPECTED_SECONDS_PER_GUESS: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EfficiencyTier {
    /// Found on the first guess, whatever the percentage says.
    Perfect,
    Excellent,
    Good,
    Success,
}

impl EfficiencyTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Success => "Success",
        }
    }
}

impl fmt::Display for EfficiencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rating by seconds per guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedRating {
    Lightning,
    VeryFast,
    Fast,
    Good,
    Moderate,
}

impl SpeedRating {
    pub fn from_seconds_per_guess(seconds: f64) -> Self {
        if seconds < 10.0 {
            Self::Lightning
        } else if seconds < 20.0 {
            Self::VeryFast
        } else if seconds < 30.0 {
            Self::Fast
        } else if seconds < 60.0 {
            Self::Good
        } else {
            Self::Moderate
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Lightning => "Lightning Fast",
            Self::VeryFast => "Very Fast",
            Self::Fast => "Fast",
            Self::Good => "Good",
            Self::Moderate => "Moderate",
        }
    }
}

impl fmt::Display for SpeedRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rating of total time against `max_expected_guesses * 15` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeEfficiencyRating {
    Excellent,
    Great,
    Good,
    Average,
    Slow,
}

impl TimeEfficiencyRating {
    pub fn from_elapsed(elapsed_seconds: f64, expected_total: f64) -> Self {
        if elapsed_seconds <= expected_total * 0.3 {
            Self::Excellent
        } else if elapsed_seconds <= expected_total * 0.5 {
            Self::Great
        } else if elapsed_seconds <= expected_total * 0.7 {
            Self::Good
        } else if elapsed_seconds <= expected_total {
            Self::Average
        } else {
            Self::Slow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Great => "Great",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Slow => "Slow",
        }
    }
}

impl fmt::Display for TimeEfficiencyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The single closing message, picked in priority order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompletionMessage {
    Outstanding { guesses: u32 },
    FastDecisions { seconds_per_guess: f64 },
    GoodTiming { elapsed_seconds: u64 },
    Completed { elapsed_seconds: u64 },
}

impl fmt::Display for CompletionMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outstanding { guesses } => write!(
                f,
                "Outstanding performance! You responded quickly and the number was found efficiently in just {guesses} guesses!"
            ),
            Self::FastDecisions { seconds_per_guess } => write!(
                f,
                "Great speed! You made quick decisions with an average of {seconds_per_guess:.2} seconds per guess."
            ),
            Self::GoodTiming { elapsed_seconds } => write!(
                f,
                "Good timing! The search completed in {elapsed_seconds} seconds."
            ),
            Self::Completed { elapsed_seconds } => write!(
                f,
                "Took your time! The game completed successfully in {elapsed_seconds} seconds."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub number: i64,
    pub total_guesses: u32,
    pub elapsed_seconds: u64,
    pub max_expected_guesses: u32,
    /// Not clamped: may go negative when the budget is exceeded.
    pub guess_efficiency_percent: i64,
    pub efficiency_tier: EfficiencyTier,
    /// Rounded to two decimal places.
    pub time_per_guess_seconds: f64,
    pub speed_rating: SpeedRating,
    pub time_efficiency_percent: i64,
    pub time_efficiency_rating: TimeEfficiencyRating,
    pub message: CompletionMessage,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[allow(clippy::cast_possible_truncation)]
fn percent(numerator: f64, denominator: f64) -> i64 {
    (numerator / denominator * 100.0).round() as i64
}

#[allow(clippy::cast_precision_loss)]
impl PerformanceSummary {
    pub fn compute(
        number: i64,
        guess_count: u32,
        max_expected_guesses: u32,
        elapsed_seconds: u64,
    ) -> Self {
        let guesses = guess_count.max(1);
        let max = f64::from(max_expected_guesses.max(1));
        let count = f64::from(guesses);
        let elapsed = elapsed_seconds as f64;

        let half_budget = (max * 0.5).ceil();
        let three_quarter_budget = (max * 0.75).ceil();

        let efficiency_tier = if guesses == 1 {
            EfficiencyTier::Perfect
        } else if count <= half_budget {
            EfficiencyTier::Excellent
        } else if count <= three_quarter_budget {
            EfficiencyTier::Good
        } else {
            EfficiencyTier::Success
        };

        let time_per_guess_seconds = round2(elapsed / count);
        let expected_total = max * EXPECTED_SECONDS_PER_GUESS;

        let message = if time_per_guess_seconds < 10.0 && count <= half_budget {
            CompletionMessage::Outstanding { guesses }
        } else if time_per_guess_seconds < 20.0 {
            CompletionMessage::FastDecisions {
                seconds_per_guess: time_per_guess_seconds,
            }
        } else if elapsed < expected_total * 0.7 {
            CompletionMessage::GoodTiming { elapsed_seconds }
        } else {
            CompletionMessage::Completed { elapsed_seconds }
        };

        Self {
            number,
            total_guesses: guesses,
            elapsed_seconds,
            max_expected_guesses,
            guess_efficiency_percent: percent(max - count, max),
            efficiency_tier,
            time_per_guess_seconds,
            speed_rating: SpeedRating::from_seconds_per_guess(time_per_guess_seconds),
            time_efficiency_percent: percent(expected_total - elapsed, expected_total),
            time_efficiency_rating: TimeEfficiencyRating::from_elapsed(elapsed, expected_total),
            message,
        }
    }

    /// One-line description of how the guess count compares to the budget.
    pub fn efficiency_line(&self) -> String {
        match self.efficiency_tier {
            EfficiencyTier::Perfect => "Perfect! First try!".to_string(),
            EfficiencyTier::Excellent | EfficiencyTier::Good => format!(
                "{}! {}% more efficient than worst case!",
                self.efficiency_tier, self.guess_efficiency_percent
            ),
            EfficiencyTier::Success => format!(
                "Success! Found in {} guesses (max: {})",
                self.total_guesses, self.max_expected_guesses
            ),
        }
    }
}

/// `"{m}m {s}s"` from one minute up, `"{s}s"` below.
pub fn format_elapsed(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_time_per_guess(seconds: f64) -> String {
    if seconds < 1.0 {
        "< 1s".to_string()
    } else if seconds < 60.0 {
        format!("{}s", seconds.round() as u64)
    } else {
        let minutes = (seconds / 60.0).floor() as u64;
        let rest = (seconds % 60.0).round() as u64;
        format!("{minutes}m {rest}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_guess_is_always_perfect() {
        let summary = PerformanceSummary::compute(50, 1, 8, 3);
        assert_eq!(summary.efficiency_tier, EfficiencyTier::Perfect);
        assert_eq!(summary.guess_efficiency_percent, 88);
        assert_eq!(summary.efficiency_line(), "Perfect! First try!");
    }

    #[test]
    fn test_tiers_follow_budget_fractions() {
        // max 4: half budget 2, three-quarter budget 3
        assert_eq!(
            PerformanceSummary::compute(1, 2, 4, 0).efficiency_tier,
            EfficiencyTier::Excellent
        );
        assert_eq!(
            PerformanceSummary::compute(1, 3, 4, 0).efficiency_tier,
            EfficiencyTier::Good
        );
        assert_eq!(
            PerformanceSummary::compute(1, 4, 4, 0).efficiency_tier,
            EfficiencyTier::Success
        );
    }

    #[test]
    fn test_efficiency_percent_is_not_clamped() {
        let summary = PerformanceSummary::compute(7, 10, 8, 0);
        assert_eq!(summary.guess_efficiency_percent, -25);
        assert_eq!(
            summary.efficiency_line(),
            "Success! Found in 10 guesses (max: 8)"
        );
    }

    #[test]
    fn test_good_tier_line_includes_percent() {
        let summary = PerformanceSummary::compute(1, 3, 4, 12);
        assert_eq!(summary.guess_efficiency_percent, 25);
        assert_eq!(
            summary.efficiency_line(),
            "Good! 25% more efficient than worst case!"
        );
    }

    #[test]
    fn test_time_per_guess_rounds_to_two_places() {
        let summary = PerformanceSummary::compute(1, 3, 8, 10);
        assert!((summary.time_per_guess_seconds - 3.33).abs() < f64::EPSILON);
    }

    #[test]
    fn test_speed_rating_thresholds() {
        assert_eq!(SpeedRating::from_seconds_per_guess(9.99), SpeedRating::Lightning);
        assert_eq!(SpeedRating::from_seconds_per_guess(10.0), SpeedRating::VeryFast);
        assert_eq!(SpeedRating::from_seconds_per_guess(20.0), SpeedRating::Fast);
        assert_eq!(SpeedRating::from_seconds_per_guess(30.0), SpeedRating::Good);
        assert_eq!(SpeedRating::from_seconds_per_guess(60.0), SpeedRating::Moderate);
    }

    #[test]
    fn test_time_efficiency_thresholds() {
        // max 8 → expected total 120s
        let rate = |elapsed| PerformanceSummary::compute(1, 4, 8, elapsed).time_efficiency_rating;
        assert_eq!(rate(30), TimeEfficiencyRating::Excellent);
        assert_eq!(rate(37), TimeEfficiencyRating::Great);
        assert_eq!(rate(60), TimeEfficiencyRating::Great);
        assert_eq!(rate(80), TimeEfficiencyRating::Good);
        assert_eq!(rate(120), TimeEfficiencyRating::Average);
        assert_eq!(rate(121), TimeEfficiencyRating::Slow);
    }

    #[test]
    fn test_time_efficiency_percent() {
        assert_eq!(PerformanceSummary::compute(1, 4, 8, 30).time_efficiency_percent, 75);
        assert_eq!(PerformanceSummary::compute(1, 4, 8, 240).time_efficiency_percent, -100);
    }

    #[test]
    fn test_message_priority() {
        // quick and within half budget
        let summary = PerformanceSummary::compute(1, 3, 8, 6);
        assert_eq!(summary.message, CompletionMessage::Outstanding { guesses: 3 });

        // quick but over half budget
        let summary = PerformanceSummary::compute(1, 6, 8, 60);
        assert_eq!(
            summary.message,
            CompletionMessage::FastDecisions {
                seconds_per_guess: 10.0
            }
        );

        // slow per guess, total under 70% of 120s
        let summary = PerformanceSummary::compute(1, 2, 8, 80);
        assert_eq!(
            summary.message,
            CompletionMessage::GoodTiming { elapsed_seconds: 80 }
        );

        let summary = PerformanceSummary::compute(1, 2, 8, 200);
        assert_eq!(
            summary.message,
            CompletionMessage::Completed { elapsed_seconds: 200 }
        );
    }

    #[test]
    fn test_message_text() {
        let message = CompletionMessage::FastDecisions {
            seconds_per_guess: 12.5,
        };
        assert!(message.to_string().contains("12.50 seconds per guess"));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0s");
        assert_eq!(format_elapsed(59), "59s");
        assert_eq!(format_elapsed(61), "1m 1s");
        assert_eq!(format_elapsed(600), "10m 0s");
    }

    #[test]
    fn test_format_time_per_guess() {
        assert_eq!(format_time_per_guess(0.5), "< 1s");
        assert_eq!(format_time_per_guess(4.4), "4s");
        assert_eq!(format_time_per_guess(59.4), "59s");
        assert_eq!(format_time_per_guess(75.0), "1m 15s");
    }
}
