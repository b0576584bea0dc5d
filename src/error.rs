//! Error types shared by every word-morph operation.
//!
//! Per-request failures (`NotFound`, `InvalidArgument`) never touch the shared
//! vocabulary table; `Load` and `Config` only happen at startup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MorphError {
    /// Query word is absent from the vocabulary (after case folding)
    #[error("word '{0}' not found in vocabulary")]
    NotFound(String),

    /// Out-of-range count, stride, threshold, letter class, POS filter, etc.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Embedding table or oracle data could not be read
    #[error("load error: {0}")]
    Load(String),

    /// Configuration file could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// Output could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MorphError>;

impl MorphError {
    pub fn not_found<S: Into<String>>(word: S) -> Self {
        MorphError::NotFound(word.into())
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        MorphError::InvalidArgument(msg.into())
    }

    pub fn load<S: Into<String>>(msg: S) -> Self {
        MorphError::Load(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        MorphError::Config(msg.into())
    }

    /// True when the failure means "no such word", as opposed to a bad request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MorphError::NotFound(_))
    }

    /// Short machine-readable code, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            MorphError::NotFound(_) => "word_not_found",
            MorphError::InvalidArgument(_) => "invalid_parameters",
            MorphError::Load(_) => "load_error",
            MorphError::Config(_) => "config_error",
            MorphError::Json(_) => "internal_error",
        }
    }
}
