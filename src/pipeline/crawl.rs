// src/pipeline/crawl.rs

//! Catalog crawling pipeline.
//!
//! Drives the crawler over every reachable catalog, derives the
//! companion metadata-document URL for each dataset, and records it in
//! the document cache. With `fetch_bodies` off this is a pure inventory
//! pass; with it on, bodies are fetched conditionally as they are found.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::crawl::{catalog, CatalogCrawler, CatalogSource, DocRetriever};
use crate::error::{AppError, Result};
use crate::models::Config;
use crate::utils::http;

#[derive(Debug, Clone, Serialize)]
pub struct CrawlStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub catalogs_visited: usize,
    pub datasets_found: usize,
    pub fetch_failures: usize,
}

/// Run a crawl from `seed`, or resume a previously interrupted one.
pub async fn run_crawl(
    config: &Config,
    storage_dir: &Path,
    source: &dyn CatalogSource,
    seed: Option<&str>,
    resume: bool,
) -> Result<CrawlStats> {
    let start_time = Utc::now();

    let cache_dir = storage_dir.join(&config.cache.dir);
    let namespace = &config.cache.namespace;
    let frontier_path = cache_dir.join(format!("{namespace}_frontier.json"));

    let catalog_cache = super::open_catalog_cache(config, storage_dir, false)?;
    let doc_cache = super::open_doc_cache(config, storage_dir, false)?;

    let mut crawler = if resume {
        CatalogCrawler::resume(&frontier_path, source, catalog_cache)?
    } else {
        let seed = seed.ok_or_else(|| {
            AppError::config("a seed catalog URL is required unless resuming")
        })?;
        CatalogCrawler::new(seed, source, catalog_cache)?
    };

    let client = http::create_client(&config.crawler)?;
    let mut retriever = DocRetriever::new(&client, doc_cache);

    let mut catalogs_visited = 0;
    let mut datasets_found = 0;
    let mut fetch_failures = 0;

    while let Some(url) = crawler.next_catalog().await {
        catalogs_visited += 1;
        log::info!("[{catalogs_visited}] {url} ({} pending)", crawler.pending());

        let access_urls = match crawler.cache().cached_response(&url) {
            Some(body) => catalog::dataset_access_urls(&url, body, &config.crawler.service),
            None => Vec::new(),
        };

        for access in access_urls {
            let doc_url = format!("{access}{}", config.crawler.metadata_suffix);
            datasets_found += 1;

            if config.crawler.fetch_bodies {
                if let Err(e) = retriever.fetch(&doc_url).await {
                    log::warn!("Failed to fetch '{doc_url}': {e}");
                    fetch_failures += 1;
                }
            } else {
                retriever.record_visited(&doc_url)?;
            }
        }

        if config.crawler.request_delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(
                config.crawler.request_delay_ms,
            ))
            .await;
        }
    }

    crawler.save_state(&frontier_path)?;
    retriever.save()?;

    let stats = CrawlStats {
        start_time,
        end_time: Utc::now(),
        catalogs_visited,
        datasets_found,
        fetch_failures: fetch_failures + crawler.fetch_failures(),
    };

    log::info!(
        "Crawl complete: {} catalogs, {} datasets, {} failures",
        stats.catalogs_visited,
        stats.datasets_found,
        stats.fetch_failures
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheMode, ResponseCache};
    use crate::crawl::MemorySource;
    use tempfile::TempDir;

    const ROOT: &str = r#"
        <catalog>
          <service name="dap" serviceType="OPeNDAP" base="/opendap/"></service>
          <catalogRef xlink:href="sub/catalog.xml"></catalogRef>
          <dataset name="a" urlPath="sat/a_20180101.nc" serviceName="dap"></dataset>
        </catalog>
    "#;

    const SUB: &str = r#"
        <catalog>
          <service name="dap" serviceType="OPeNDAP" base="/opendap/"></service>
          <dataset name="b" urlPath="sat/a_20180102.nc" serviceName="dap"></dataset>
        </catalog>
    "#;

    fn source() -> MemorySource {
        let mut source = MemorySource::new();
        source.insert("http://x.org/thredds/catalog.xml", ROOT);
        source.insert("http://x.org/thredds/sub/catalog.xml", SUB);
        source
    }

    #[tokio::test]
    async fn test_inventory_pass_records_doc_urls_without_fetching() {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        let source = source();

        let stats = run_crawl(
            &config,
            tmp.path(),
            &source,
            Some("http://x.org/thredds/catalog.xml"),
            false,
        )
        .await
        .unwrap();

        assert_eq!(stats.catalogs_visited, 2);
        assert_eq!(stats.datasets_found, 2);
        assert_eq!(stats.fetch_failures, 0);

        let docs = ResponseCache::open(
            tmp.path().join(&config.cache.dir),
            &format!("{}_docs", config.cache.namespace),
            CacheMode::ReadOnly,
        )
        .unwrap();
        assert!(docs.is_visited("http://x.org/opendap/sat/a_20180101.nc.ddx"));
        assert!(docs.is_visited("http://x.org/opendap/sat/a_20180102.nc.ddx"));
        // Inventoried, never fetched
        assert_eq!(
            docs.last_visited("http://x.org/opendap/sat/a_20180101.nc.ddx"),
            0
        );
    }

    #[tokio::test]
    async fn test_second_run_skips_visited_catalogs() {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        let source = source();

        run_crawl(
            &config,
            tmp.path(),
            &source,
            Some("http://x.org/thredds/catalog.xml"),
            false,
        )
        .await
        .unwrap();

        let stats = run_crawl(
            &config,
            tmp.path(),
            &source,
            Some("http://x.org/thredds/catalog.xml"),
            false,
        )
        .await
        .unwrap();

        assert_eq!(stats.catalogs_visited, 0);
    }

    #[tokio::test]
    async fn test_crawl_without_seed_or_resume_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        let source = MemorySource::new();

        let result = run_crawl(&config, tmp.path(), &source, None, false).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_resume_with_no_state_crawls_nothing() {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        let source = source();

        let stats = run_crawl(&config, tmp.path(), &source, None, true)
            .await
            .unwrap();
        assert_eq!(stats.catalogs_visited, 0);
    }
}
