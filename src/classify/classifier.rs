// src/classify/classifier.rs

//! Batch classification of crawled URLs into groups.

use crate::models::{signature, GroupingConfig, ParsedUrl};

use super::date;
use super::group::UrlGroup;

/// Counters describing one classification run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ClassifySummary {
    pub processed: usize,
    pub skipped: usize,
    pub groups: usize,
    pub date_varying: usize,
}

pub struct UrlClassifier {
    include_host: bool,
    min_group_size: usize,
    groups: Vec<UrlGroup>,
}

impl UrlClassifier {
    pub fn new(config: &GroupingConfig) -> Self {
        Self {
            include_host: config.include_host,
            min_group_size: config.min_group_size,
            groups: Vec::new(),
        }
    }

    /// Consume a batch of URLs: tokenize, cluster by signature, then run
    /// date inference over every group that is large enough.
    ///
    /// A URL that fails to parse is logged and skipped; it never aborts
    /// the batch.
    pub fn classify_all(&mut self, urls: impl IntoIterator<Item = String>) -> ClassifySummary {
        let mut summary = ClassifySummary::default();

        for url in urls {
            match ParsedUrl::parse(&url) {
                Ok(parsed) => {
                    self.insert(parsed);
                    summary.processed += 1;
                }
                Err(e) => {
                    log::warn!("Skipping '{url}': {e}");
                    summary.skipped += 1;
                }
            }
        }

        for group in &mut self.groups {
            if group.len() < self.min_group_size {
                continue;
            }
            for eq in group.equivalences_mut() {
                let parts = date::classify(eq);
                eq.set_date_parts(parts);
            }
        }

        summary.groups = self.groups.len();
        summary.date_varying = self.groups.iter().filter(|g| g.is_date_varying()).count();

        log::info!(
            "Classified {} URLs ({} skipped) into {} groups, {} date-varying",
            summary.processed,
            summary.skipped,
            summary.groups,
            summary.date_varying
        );

        summary
    }

    // Linear scan is fine at catalog sizes; groups number in the
    // hundreds, not millions.
    fn insert(&mut self, parsed: ParsedUrl) {
        let sig = signature(&parsed, self.include_host);
        match self.groups.iter_mut().find(|g| g.matches(&sig)) {
            Some(group) => group.add(parsed),
            None => self.groups.push(UrlGroup::new(parsed, sig)),
        }
    }

    pub fn groups(&self) -> &[UrlGroup] {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> UrlClassifier {
        UrlClassifier::new(&GroupingConfig::default())
    }

    #[test]
    fn test_scenario_three_daily_granules() {
        let mut c = classifier();
        let summary = c.classify_all(
            [
                "http://x.org/data/sat_20180101.nc.ddx",
                "http://x.org/data/sat_20180102.nc.ddx",
                "http://x.org/data/sat_20180103.nc.ddx",
            ]
            .map(String::from),
        );

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.groups, 1);
        assert_eq!(summary.date_varying, 1);

        let group = &c.groups()[0];
        assert!(group.signature_string().contains("dddddddd"));

        let members = group.sorted_members().unwrap().unwrap();
        assert_eq!(members[0].date.date().to_string(), "2018-01-01");
        assert_eq!(members[2].date.date().to_string(), "2018-01-03");
    }

    #[test]
    fn test_malformed_urls_skipped_not_fatal() {
        let mut c = classifier();
        let summary = c.classify_all(
            [
                "http://x.org/data/sat_20180101.nc.ddx",
                "garbage",
                "http://x.org/data/sat_20180102.nc.ddx",
            ]
            .map(String::from),
        );

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.groups, 1);
    }

    #[test]
    fn test_distinct_signatures_form_distinct_groups() {
        let mut c = classifier();
        c.classify_all(
            [
                "http://x.org/data/sat_20180101.nc",
                "http://x.org/data/sat_20180102.nc",
                "http://x.org/other/report.txt",
            ]
            .map(String::from),
        );

        assert_eq!(c.groups().len(), 2);
    }

    #[test]
    fn test_singleton_group_gets_no_date_inference() {
        let mut c = classifier();
        let summary =
            c.classify_all(["http://x.org/data/sat_20180101.nc".to_string()]);

        assert_eq!(summary.groups, 1);
        assert_eq!(summary.date_varying, 0);
    }

    #[test]
    fn test_host_in_signature_splits_servers() {
        let mut c = UrlClassifier::new(&GroupingConfig {
            include_host: true,
            min_group_size: 2,
        });
        c.classify_all(
            [
                "http://a.org/data/sat_20180101.nc",
                "http://b.org/data/sat_20180101.nc",
            ]
            .map(String::from),
        );

        assert_eq!(c.groups().len(), 2);
    }
}
