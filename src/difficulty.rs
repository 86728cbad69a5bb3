use crate::engine::SearchRange;
use clap::ValueEnum;
use std::fmt;

/// Preset ranges offered at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn range(self) -> SearchRange {
        match self {
            Self::Easy => SearchRange::new(1, 100),
            Self::Medium => SearchRange::new(1, 1000),
            Self::Hard => SearchRange::new(1, 10000),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" | "e" => Some(Self::Easy),
            "medium" | "m" => Some(Self::Medium),
            "hard" | "h" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        };
        f.write_str(name)
    }
}
