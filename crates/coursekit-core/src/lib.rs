//! coursekit-core: quiz grading and memory-match game engines.
//!
//! This crate holds the pure grading logic, the memory-match state machine,
//! and the async seams the surrounding application plugs storage into.

pub mod engine;
pub mod error;
pub mod game;
pub mod grading;
pub mod model;
pub mod parser;
pub mod report;
pub mod statistics;
pub mod traits;

pub use error::GradingError;
