//! coursekit-store: collaborators behind the grading seams.
//!
//! An in-memory question bank, a JSON-lines statistics journal, and the
//! TOML configuration shared by the CLI.

pub mod config;
pub mod error;
pub mod journal;
pub mod memory;

pub use config::{load_config, CoursekitConfig};
pub use error::StoreError;
pub use journal::StatsJournal;
pub use memory::InMemoryQuestionBank;
