//! Memory-match scoring and display stats.
//!
//! ```text
//! score = round(pairs * 100 * time_bonus * accuracy_bonus * tier_multiplier)
//! ```
//!
//! Both bonuses are clamped to `[0.5, 2.0]`, so a slow or sloppy clear still
//! scores and a fast, perfect one is capped.

use serde::{Deserialize, Serialize};

use super::difficulty::{Difficulty, DifficultyConfig};
use super::state::GameState;

const BONUS_MIN: f64 = 0.5;
const BONUS_MAX: f64 = 2.0;
const POINTS_PER_PAIR: f64 = 100.0;

/// Speed bonus relative to the tier's time limit.
pub fn time_bonus(time_elapsed: u32, time_limit: u32) -> f64 {
    let ratio = if time_limit == 0 {
        f64::INFINITY
    } else {
        f64::from(time_elapsed) / f64::from(time_limit)
    };
    (2.0 - ratio).clamp(BONUS_MIN, BONUS_MAX)
}

/// Efficiency bonus relative to the minimum of one move per pair.
pub fn accuracy_bonus(total_pairs: u32, moves: u32) -> f64 {
    if moves == 0 {
        return BONUS_MAX;
    }
    (f64::from(total_pairs) / f64::from(moves) * 1.5).clamp(BONUS_MIN, BONUS_MAX)
}

/// Final score for a cleared board, 0 before completion.
pub fn calculate_score(state: &GameState, config: &DifficultyConfig) -> u32 {
    if !state.is_complete {
        return 0;
    }
    let base = f64::from(state.matched_pairs) * POINTS_PER_PAIR;
    let score = base
        * time_bonus(state.time_elapsed, config.time_limit)
        * accuracy_bonus(state.total_pairs, state.moves)
        * config.difficulty.multiplier();
    score.round() as u32
}

/// Display-ready summary of a game in progress or finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub moves: u32,
    pub time_elapsed: u32,
    /// Matched pairs per move, as a whole percentage.
    pub accuracy: u32,
    pub time_remaining: u32,
    pub difficulty: Difficulty,
    pub matched_pairs: u32,
    pub total_pairs: u32,
}

pub fn get_game_stats(state: &GameState, config: &DifficultyConfig) -> GameStats {
    let accuracy = if state.moves == 0 {
        0
    } else {
        (100.0 * f64::from(state.matched_pairs) / f64::from(state.moves)).round() as u32
    };
    GameStats {
        moves: state.moves,
        time_elapsed: state.time_elapsed,
        accuracy,
        time_remaining: config.time_limit.saturating_sub(state.time_elapsed),
        difficulty: config.difficulty,
        matched_pairs: state.matched_pairs,
        total_pairs: state.total_pairs,
    }
}
