// src/crawl/crawler.rs

//! Resumable, cycle-safe catalog traversal.
//!
//! The crawler keeps a LIFO frontier of catalog URLs. A child reference is
//! marked visited at the moment it is pushed, not when it is fetched, so a
//! catalog graph with cycles or diamond links is still traversed exactly
//! once. The frontier itself can be persisted and restored, which makes an
//! interrupted crawl resumable without refetching anything.

use std::fs;
use std::path::Path;

use chrono::Utc;

use crate::cache::ResponseCache;
use crate::error::{AppError, Result};

use super::catalog;
use super::source::CatalogSource;

pub struct CatalogCrawler<'a> {
    source: &'a dyn CatalogSource,
    cache: ResponseCache,
    frontier: Vec<String>,
    fetch_failures: usize,
}

impl<'a> CatalogCrawler<'a> {
    /// Start a fresh crawl from a seed catalog.
    pub fn new(seed: &str, source: &'a dyn CatalogSource, mut cache: ResponseCache) -> Result<Self> {
        let mut frontier = Vec::new();
        if cache.is_visited(seed) {
            log::info!("Seed '{seed}' already visited, nothing to crawl");
        } else {
            cache.set_last_visited(seed, 0)?;
            frontier.push(seed.to_string());
        }

        Ok(Self {
            source,
            cache,
            frontier,
            fetch_failures: 0,
        })
    }

    /// Resume a crawl from a persisted frontier.
    ///
    /// A missing state file means the previous crawl ran to completion, so
    /// the frontier starts empty. A state file that exists but cannot be
    /// read or parsed is fatal.
    pub fn resume(
        state_path: impl AsRef<Path>,
        source: &'a dyn CatalogSource,
        cache: ResponseCache,
    ) -> Result<Self> {
        let state_path = state_path.as_ref();
        let frontier = match fs::read_to_string(state_path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| AppError::cache_corrupt(state_path.display().to_string(), e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No frontier state at {}, starting empty", state_path.display());
                Vec::new()
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        log::info!("Resumed crawl with {} pending catalogs", frontier.len());

        Ok(Self {
            source,
            cache,
            frontier,
            fetch_failures: 0,
        })
    }

    /// Pull the next catalog off the frontier.
    ///
    /// Fetches its body, stores it in the cache, and pushes any previously
    /// unseen child catalog references. Returns the catalog's URL, or
    /// `None` once the frontier is exhausted. A fetch failure is logged
    /// and counted but does not stop the traversal.
    pub async fn next_catalog(&mut self) -> Option<String> {
        let url = self.frontier.pop()?;

        let body = match self.source.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Failed to fetch catalog '{url}': {e}");
                self.fetch_failures += 1;
                return Some(url);
            }
        };

        if let Err(e) = self.record_fetched(&url, &body) {
            log::warn!("Failed to record catalog '{url}': {e}");
        }

        Some(url)
    }

    fn record_fetched(&mut self, url: &str, body: &str) -> Result<()> {
        self.cache.set_last_visited(url, Utc::now().timestamp())?;
        self.cache.set_cached_response(url, body)?;

        for child in catalog::child_catalog_refs(url, body) {
            if self.cache.is_visited(&child) {
                log::debug!("Already seen '{child}', not queueing");
                continue;
            }
            self.cache.set_last_visited(&child, 0)?;
            self.frontier.push(child);
        }

        Ok(())
    }

    /// Number of catalogs still waiting on the frontier.
    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    /// Fetch failures seen so far.
    pub fn fetch_failures(&self) -> usize {
        self.fetch_failures
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Persist the unvisited frontier and the cache. After this, `resume`
    /// continues the crawl from exactly this point.
    pub fn save_state(&self, state_path: impl AsRef<Path>) -> Result<()> {
        let state_path = state_path.as_ref();
        if let Some(parent) = state_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        crate::cache::write_json_atomic(state_path, &self.frontier)?;
        self.cache.save()?;
        Ok(())
    }
}
