//! Error types for fixture generation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No type satisfies the schema at {path}")]
    EmptyType { path: String },

    #[error("Enum at {path} has no values left after merging")]
    EmptyEnum { path: String },

    #[error("Cannot synthesize pattern {pattern:?} at {path}: {message}")]
    InvalidPattern {
        path: String,
        pattern: String,
        message: String,
    },
}
