//! Memory-match game engine.
//!
//! A pure state machine: the caller owns the clock and feeds in input events,
//! the engine hands back new [`GameState`] values.

pub mod difficulty;
pub mod scoring;
pub mod session;
pub mod state;

pub use difficulty::{Difficulty, DifficultyConfig, GridSize};
pub use scoring::{calculate_score, get_game_stats, GameStats};
pub use session::{GameSession, GameSessions};
pub use state::{initialize_game, Card, GameState};
