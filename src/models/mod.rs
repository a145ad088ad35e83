// src/models/mod.rs

//! Domain models for the catalog crawler and URL classifier.

mod config;
mod url;

// Re-export all public types
pub use config::{CacheConfig, Config, CrawlerConfig, GroupingConfig};
pub use url::{lexemes, signature, signature_string, Lexeme, ParsedUrl};
