// src/error.rs

//! Unified error handling for the crawler and classifier.

use std::fmt;

use thiserror::Error;

/// Result type alias for catcrawl operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// A resource URL could not be tokenized
    #[error("Malformed resource URL '{0}'")]
    MalformedUrl(String),

    /// A single catalog or document could not be fetched or parsed
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },

    /// Persisted cache state was unreadable as the expected structure
    #[error("Corrupt cache state in {path}: {message}")]
    CacheCorrupt { path: String, message: String },

    /// A literal value did not parse under its assigned date classification
    #[error("Unparseable date '{literal}': {message}")]
    UnparseableDate { literal: String, message: String },

    /// A mutation was attempted on a cache opened read-only
    #[error("Cache '{0}' is read-only")]
    ReadOnly(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a corrupt-cache error.
    pub fn cache_corrupt(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::CacheCorrupt {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create an unparseable-date error.
    pub fn unparseable_date(literal: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::UnparseableDate {
            literal: literal.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
