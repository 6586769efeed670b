//! Error types shared across the core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The file collaborator could not produce rows for a source.
    #[error("Failed to read {path}: {message}")]
    SourceRead { path: String, message: String },

    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    EmptyInput(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("The exam session has already finished")]
    SessionFinished,

    #[error("Question {index} is out of range (exam has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },
}

impl CoreError {
    pub fn source_read(path: impl Into<String>, message: impl ToString) -> Self {
        CoreError::SourceRead {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
