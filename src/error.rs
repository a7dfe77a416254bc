//! Error types for teibody library.

use std::io;
use thiserror::Error;

/// Result type alias for teibody operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while rebuilding a document body.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The upstream labeler produced a tag this crate does not know.
    ///
    /// This is a contract breach with the labeler, not a data-quality issue.
    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    /// Token and label sequences have different lengths.
    #[error("Label count mismatch: {tokens} tokens but {labels} labels")]
    LabelCountMismatch {
        /// Number of tokens supplied
        tokens: usize,
        /// Number of labels supplied
        labels: usize,
    },

    /// The sentence boundary detector failed.
    #[error("Sentence detection error: {0}")]
    SentenceDetection(String),

    /// The bibliography marker matcher failed.
    #[error("Citation matching error: {0}")]
    CitationMatch(String),

    /// Relabeling a note's tokens failed.
    #[error("Note labeling error: {0}")]
    NoteLabeling(String),

    /// Error during rendering (TEI, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
