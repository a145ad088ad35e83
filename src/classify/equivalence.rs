// src/classify/equivalence.rs

//! Per-position value histograms.
//!
//! An equivalence tracks, for one component position within a group, every
//! literal value observed there and how often. The date classifier reads
//! these histograms to decide whether a position encodes calendar fields.

use std::collections::BTreeMap;

use crate::models::Lexeme;

use super::date::DatePart;

#[derive(Debug, Clone)]
pub struct Equivalence {
    position: usize,
    pattern: String,
    is_pattern: bool,
    total_members: usize,
    histogram: BTreeMap<String, usize>,
    date_parts: Vec<DatePart>,
}

impl Equivalence {
    pub fn new(position: usize, template: &Lexeme) -> Self {
        Self {
            position,
            pattern: template.value().to_string(),
            is_pattern: template.is_pattern(),
            total_members: 0,
            histogram: BTreeMap::new(),
            date_parts: Vec::new(),
        }
    }

    /// Record one observed literal value at this position.
    pub fn add(&mut self, literal: &str) {
        self.total_members += 1;
        *self.histogram.entry(literal.to_string()).or_insert(0) += 1;
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The template lexeme value, e.g. `dddddddd` or a literal string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_pattern(&self) -> bool {
        self.is_pattern
    }

    /// Count of resources that contributed a value.
    pub fn total_members(&self) -> usize {
        self.total_members
    }

    /// Number of distinct literal values observed.
    pub fn distinct_values(&self) -> usize {
        self.histogram.len()
    }

    /// Observed literal values in lexical order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.histogram.keys().map(String::as_str)
    }

    /// How many times one literal value was observed.
    pub fn count_of(&self, literal: &str) -> usize {
        self.histogram.get(literal).copied().unwrap_or(0)
    }

    pub fn date_parts(&self) -> &[DatePart] {
        &self.date_parts
    }

    pub fn set_date_parts(&mut self, parts: Vec<DatePart>) {
        self.date_parts = parts;
    }

    pub fn has_date_parts(&self) -> bool {
        !self.date_parts.is_empty()
    }
}
