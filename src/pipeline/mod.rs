// src/pipeline/mod.rs

//! End-to-end pipelines wiring the crawler and classifier together.

pub mod classify;
pub mod crawl;

use std::path::Path;

use crate::cache::{CacheMode, ResponseCache};
use crate::error::Result;
use crate::models::Config;

pub use classify::{run_classify, ClassifyReport, GroupReport};
pub use crawl::{run_crawl, CrawlStats};

/// The catalog-document cache for this configuration.
pub fn open_catalog_cache(
    config: &Config,
    storage_dir: &Path,
    read_only: bool,
) -> Result<ResponseCache> {
    open_cache(config, storage_dir, "catalogs", read_only)
}

/// The metadata-document cache for this configuration.
pub fn open_doc_cache(
    config: &Config,
    storage_dir: &Path,
    read_only: bool,
) -> Result<ResponseCache> {
    open_cache(config, storage_dir, "docs", read_only)
}

fn open_cache(
    config: &Config,
    storage_dir: &Path,
    kind: &str,
    read_only: bool,
) -> Result<ResponseCache> {
    let mode = if read_only {
        CacheMode::ReadOnly
    } else {
        CacheMode::ReadWrite
    };
    ResponseCache::open(
        storage_dir.join(&config.cache.dir),
        &format!("{}_{kind}", config.cache.namespace),
        mode,
    )
}
