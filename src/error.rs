//! Error types for fupboard-core

use thiserror::Error;

/// Main error type for the fupboard-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error for raw event documents
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A template pattern failed to compile
    #[error("invalid template pattern {name}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type alias for fupboard-core
pub type Result<T> = std::result::Result<T, Error>;
