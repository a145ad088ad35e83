// src/crawl/mod.rs

//! Catalog traversal and document retrieval.

pub mod catalog;
pub mod crawler;
pub mod retriever;
pub mod source;

pub use catalog::{child_catalog_refs, collect_services, dataset_access_urls, Service};
pub use crawler::CatalogCrawler;
pub use retriever::DocRetriever;
pub use source::{CatalogSource, HttpSource, MemorySource};
