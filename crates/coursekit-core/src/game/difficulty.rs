//! Memory-match difficulty tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Symbols dealt onto the board, in the order tiers draw them.
pub const SYMBOLS: [&str; 18] = [
    "🍎", "🍌", "🍇", "🍓", "🍒", "🍑", "🍍", "🥝", "🍉", "🍋", "🥥", "🍐", "🥕", "🌽", "🥦",
    "🍄", "🌶", "🥑",
];

/// One of the four fixed presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Score multiplier keeping leaderboards comparable across tiers.
    pub fn multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
            Difficulty::Expert => 3.0,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "EASY"),
            Difficulty::Medium => write!(f, "MEDIUM"),
            Difficulty::Hard => write!(f, "HARD"),
            Difficulty::Expert => write!(f, "EXPERT"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "expert" => Ok(Difficulty::Expert),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: usize,
    pub cols: usize,
}

impl GridSize {
    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Everything needed to deal and score a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub difficulty: Difficulty,
    /// Allotted time in seconds.
    pub time_limit: u32,
    pub grid: GridSize,
    /// Distinct symbols to pair; one pair per symbol.
    pub symbols: Vec<String>,
}

impl DifficultyConfig {
    pub fn for_tier(difficulty: Difficulty) -> Self {
        let (pairs, rows, cols, time_limit) = match difficulty {
            Difficulty::Easy => (6, 3, 4, 180),
            Difficulty::Medium => (8, 4, 4, 150),
            Difficulty::Hard => (12, 4, 6, 120),
            Difficulty::Expert => (18, 6, 6, 90),
        };
        Self {
            difficulty,
            time_limit,
            grid: GridSize { rows, cols },
            symbols: SYMBOLS[..pairs].iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn pairs(&self) -> usize {
        self.symbols.len()
    }
}
