// src/crawl/retriever.rs

//! Cached metadata-document retrieval.
//!
//! Wraps an HTTP client with a [`ResponseCache`] and issues conditional
//! requests: once a document has been fetched, later requests carry
//! `If-Modified-Since` with the cached visit time, and a `304 Not
//! Modified` answer is served from the cache instead of the wire.

use chrono::{DateTime, Utc};
use reqwest::header::IF_MODIFIED_SINCE;
use reqwest::StatusCode;

use crate::cache::ResponseCache;
use crate::error::{AppError, Result};

pub struct DocRetriever<'a> {
    client: &'a reqwest::Client,
    cache: ResponseCache,
}

impl<'a> DocRetriever<'a> {
    pub fn new(client: &'a reqwest::Client, cache: ResponseCache) -> Self {
        Self { client, cache }
    }

    /// Fetch a document, conditionally.
    ///
    /// `200` stores the fresh body and visit time; `304` refreshes the
    /// visit time and replays the cached body; anything else is an error.
    pub async fn fetch(&mut self, url: &str) -> Result<String> {
        let mut request = self.client.get(url);

        let last_visited = self.cache.last_visited(url);
        if last_visited > 0 {
            if let Some(stamp) = http_date(last_visited) {
                request = request.header(IF_MODIFIED_SINCE, stamp);
            }
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                self.cache.set_last_visited(url, Utc::now().timestamp())?;
                self.cache.set_cached_response(url, &body)?;
                Ok(body)
            }
            StatusCode::NOT_MODIFIED => {
                log::debug!("'{url}' not modified, serving cached body");
                let body = self
                    .cache
                    .cached_response(url)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        AppError::fetch(url, "server said not modified but cache has no body")
                    })?;
                self.cache.set_last_visited(url, Utc::now().timestamp())?;
                Ok(body)
            }
            status => Err(AppError::fetch(url, format!("unexpected HTTP status {status}"))),
        }
    }

    /// Record a URL as inventoried without fetching it. The visit time
    /// stays zero so a later `fetch` issues an unconditional request.
    pub fn record_visited(&mut self, url: &str) -> Result<()> {
        if !self.cache.is_visited(url) {
            self.cache.set_last_visited(url, 0)?;
        }
        Ok(())
    }

    /// The cached body for a URL, if any.
    pub fn cached_doc(&self, url: &str) -> Option<&str> {
        self.cache.cached_response(url)
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn save(&self) -> Result<()> {
        self.cache.save()
    }
}

/// Format an epoch timestamp as an RFC 7231 HTTP date.
fn http_date(epoch_secs: i64) -> Option<String> {
    let stamp = DateTime::<Utc>::from_timestamp(epoch_secs, 0)?;
    Some(stamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}
