// src/cache/mod.rs

//! Persistent response cache.
//!
//! Maps a URL to the epoch time it was last visited and, optionally, to a
//! cached copy of the document body. The visited map alone is sufficient
//! to resume a crawl; the document store lets a later pass re-process
//! responses without any network access. Both maps persist as JSON files
//! under a namespaced basename, so independent crawls shard by namespace
//! instead of sharing one map.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// Access mode for a cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Mutations allowed; state is persisted by `save()`.
    ReadWrite,
    /// Every mutator fails with a `ReadOnly` error.
    ReadOnly,
}

/// Visited-set and document store for one crawl namespace.
pub struct ResponseCache {
    dir: PathBuf,
    namespace: String,
    read_only: bool,
    visited: HashMap<String, i64>,
    responses: HashMap<String, String>,
}

impl ResponseCache {
    /// Open a cache, restoring any previously persisted state.
    ///
    /// A missing state file is an empty cache; a file that exists but
    /// cannot be parsed is fatal, because crawling with an inaccurate
    /// visited set risks re-crawling forever.
    pub fn open(dir: impl Into<PathBuf>, namespace: &str, mode: CacheMode) -> Result<Self> {
        let dir = dir.into();
        let mut cache = Self {
            dir,
            namespace: namespace.to_string(),
            read_only: mode == CacheMode::ReadOnly,
            visited: HashMap::new(),
            responses: HashMap::new(),
        };

        cache.visited = restore_map(&cache.visited_path())?;
        cache.responses = restore_map(&cache.responses_path())?;

        log::debug!(
            "Opened cache '{}': {} visited, {} cached responses",
            namespace,
            cache.visited.len(),
            cache.responses.len()
        );

        Ok(cache)
    }

    fn visited_path(&self) -> PathBuf {
        self.dir.join(format!("{}_visited.json", self.namespace))
    }

    fn responses_path(&self) -> PathBuf {
        self.dir.join(format!("{}_responses.json", self.namespace))
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            Err(AppError::ReadOnly(self.namespace.clone()))
        } else {
            Ok(())
        }
    }

    /// When was this URL last visited, in epoch seconds? Zero means never
    /// fetched (the URL may still be inventoried in the visited set).
    pub fn last_visited(&self, url: &str) -> i64 {
        self.visited.get(url).copied().unwrap_or(0)
    }

    /// Has this URL been recorded at all?
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains_key(url)
    }

    /// Record or update the last-visited time for a URL.
    pub fn set_last_visited(&mut self, url: &str, epoch_secs: i64) -> Result<()> {
        self.check_writable()?;
        self.visited.insert(url.to_string(), epoch_secs);
        Ok(())
    }

    /// The cached document body for a URL, if one was stored.
    pub fn cached_response(&self, url: &str) -> Option<&str> {
        self.responses.get(url).map(String::as_str)
    }

    /// Store a document body under its URL.
    pub fn set_cached_response(&mut self, url: &str, body: &str) -> Result<()> {
        self.check_writable()?;
        self.responses.insert(url.to_string(), body.to_string());
        Ok(())
    }

    /// Snapshot of all visited URLs, in unspecified order.
    pub fn visited_keys(&self) -> Vec<String> {
        self.visited.keys().cloned().collect()
    }

    /// Snapshot of all URLs with a stored body, in unspecified order.
    pub fn response_keys(&self) -> Vec<String> {
        self.responses.keys().cloned().collect()
    }

    /// Number of visited entries.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Persist both maps. Skipped (with a debug log) for read-only
    /// instances, which have nothing new to write.
    pub fn save(&self) -> Result<()> {
        if self.read_only {
            log::debug!("Cache '{}' is read-only, skipping save", self.namespace);
            return Ok(());
        }

        fs::create_dir_all(&self.dir)?;
        write_json_atomic(&self.visited_path(), &self.visited)?;
        write_json_atomic(&self.responses_path(), &self.responses)?;

        log::debug!(
            "Saved cache '{}': {} visited, {} cached responses",
            self.namespace,
            self.visited.len(),
            self.responses.len()
        );

        Ok(())
    }
}

/// Read a persisted map, treating a missing file as empty and a
/// malformed file as a fatal corruption.
fn restore_map<V: serde::de::DeserializeOwned>(path: &Path) -> Result<HashMap<String, V>> {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)
            .map_err(|e| AppError::cache_corrupt(path.display().to_string(), e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(e) => Err(AppError::Io(e)),
    }
}

/// Write JSON to a temp file, then rename into place.
pub(crate) fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    let tmp = path.with_extension("tmp");

    let mut file = fs::File::create(&tmp)?;
    file.write_all(&bytes)?;
    file.flush()?;
    drop(file);

    fs::rename(&tmp, path)?;
    Ok(())
}
