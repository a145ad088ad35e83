// src/lib.rs

//! catcrawl Library
//!
//! Crawls THREDDS-style dataset catalogs and recognizes when many
//! individually-named resources form a single time-series dataset.

pub mod cache;
pub mod classify;
pub mod crawl;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod utils;
