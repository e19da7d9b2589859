//! Store error types.

use thiserror::Error;

/// Errors raised by the statistics journal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A journal line could not be decoded.
    #[error("malformed journal entry at line {line}: {message}")]
    Journal { line: usize, message: String },

    /// Reading or writing the journal failed.
    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),
}
