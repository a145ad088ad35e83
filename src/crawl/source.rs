// src/crawl/source.rs

//! Catalog document sources.
//!
//! The crawler pulls catalog bodies through the [`CatalogSource`] trait so
//! that tests and cache replays can run without a network.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{AppError, Result};

/// Anything that can produce the body of a catalog document by URL.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches catalog documents over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP status {status}")));
        }
        Ok(response.text().await?)
    }
}

/// Serves catalog documents from an in-memory map. Used by tests and by
/// replays of a completed crawl's document store.
#[derive(Debug, Default)]
pub struct MemorySource {
    docs: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document body under its URL.
    pub fn insert(&mut self, url: &str, body: &str) {
        self.docs.insert(url.to_string(), body.to_string());
    }
}

#[async_trait]
impl CatalogSource for MemorySource {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.docs
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "not present in source"))
    }
}
