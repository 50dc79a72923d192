//! Error types for the research pipeline.

use scout_search::SearchError;

/// Top-level error type for Scout.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Source discovery error.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Language model backend error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Pipeline coordination error.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ScoutError>;
