// src/pipeline/classify.rs

//! Classification pipeline.
//!
//! Reads the inventoried document URLs out of a completed crawl's cache,
//! clusters them into signature groups, runs date inference, and writes
//! the group report consumed by downstream aggregation tooling.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::classify::{ClassifySummary, GroupMember, UrlClassifier, UrlGroup};
use crate::error::Result;
use crate::models::Config;

#[derive(Debug, Serialize)]
pub struct GroupReport {
    pub signature: String,
    pub member_count: usize,
    pub date_varying: bool,
    /// Chronologically sorted members, present for date-varying groups.
    pub members: Vec<GroupMember>,
    pub date_range: Option<(NaiveDateTime, NaiveDateTime)>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyReport {
    pub summary: ClassifySummary,
    pub groups: Vec<GroupReport>,
}

/// Classify every URL inventoried by a previous crawl and write the
/// group report to `groups.json` under the storage directory.
///
/// The cache is opened read-only: classification is a pure consumer of
/// crawl state.
pub fn run_classify(config: &Config, storage_dir: &Path) -> Result<ClassifyReport> {
    let doc_cache = super::open_doc_cache(config, storage_dir, true)?;

    let mut classifier = UrlClassifier::new(&config.grouping);
    let summary = classifier.classify_all(doc_cache.visited_keys());

    let groups = classifier.groups().iter().map(report_for).collect();
    let report = ClassifyReport { summary, groups };

    let report_path = storage_dir.join("groups.json");
    crate::cache::write_json_atomic(&report_path, &report)?;
    log::info!("Wrote group report to {}", report_path.display());

    Ok(report)
}

fn report_for(group: &UrlGroup) -> GroupReport {
    let mut members = Vec::new();
    let mut date_range = None;
    let mut date_varying = group.is_date_varying();

    if date_varying {
        match group.sorted_members() {
            Some(Ok(sorted)) => {
                date_range = sorted
                    .first()
                    .zip(sorted.last())
                    .map(|(first, last)| (first.date, last.date));
                members = sorted;
            }
            Some(Err(e)) => {
                // The classifier matched on shape but a member's literal
                // does not parse as an actual date.
                log::warn!(
                    "Group '{}' has unparseable member dates: {e}",
                    group.signature_string()
                );
                date_varying = false;
            }
            None => {}
        }
    }

    GroupReport {
        signature: group.signature_string(),
        member_count: group.len(),
        date_varying,
        members,
        date_range,
    }
}
