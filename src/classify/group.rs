// src/classify/group.rs

//! Signature-equal URL groups.
//!
//! A group holds every resource URL sharing one structural signature,
//! plus one [`Equivalence`] per component position. Once the date
//! classifier has run over the equivalences, a group with exactly one
//! date-bearing position is *date-varying* and its members can be listed
//! in chronological order.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::models::{lexemes, signature_string, Lexeme, ParsedUrl};

use super::date_string::DateString;
use super::equivalence::Equivalence;

/// One member of a date-varying group, ready for downstream aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct GroupMember {
    pub url: String,
    pub date: NaiveDateTime,
    pub filename: String,
}

pub struct UrlGroup {
    signature: Vec<Lexeme>,
    members: Vec<ParsedUrl>,
    equivalences: Vec<Equivalence>,
}

impl UrlGroup {
    /// Create a group from its first member. The member's lexemes become
    /// the equivalence templates.
    pub fn new(parsed: ParsedUrl, signature: Vec<Lexeme>) -> Self {
        let equivalences = lexemes(&parsed)
            .iter()
            .enumerate()
            .map(|(position, template)| Equivalence::new(position, template))
            .collect();

        let mut group = Self {
            signature,
            members: Vec::new(),
            equivalences,
        };
        group.add(parsed);
        group
    }

    /// Add a member, feeding its literal component values into the
    /// per-position equivalences.
    pub fn add(&mut self, parsed: ParsedUrl) {
        for eq in &mut self.equivalences {
            eq.add(&parsed.components()[eq.position()]);
        }
        self.members.push(parsed);
    }

    pub fn matches(&self, signature: &[Lexeme]) -> bool {
        self.signature == signature
    }

    pub fn signature_string(&self) -> String {
        signature_string(&self.signature)
    }

    pub fn members(&self) -> &[ParsedUrl] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn equivalences(&self) -> &[Equivalence] {
        &self.equivalences
    }

    pub fn equivalences_mut(&mut self) -> &mut [Equivalence] {
        &mut self.equivalences
    }

    /// The single date-bearing position, when exactly one position
    /// classified. Zero or several date-bearing positions leave the
    /// group unclassified.
    pub fn date_equivalence(&self) -> Option<&Equivalence> {
        let mut found = None;
        for eq in &self.equivalences {
            if eq.has_date_parts() {
                if found.is_some() {
                    return None;
                }
                found = Some(eq);
            }
        }
        found
    }

    pub fn is_date_varying(&self) -> bool {
        self.date_equivalence().is_some()
    }

    /// Members in ascending date order, each paired with its parsed
    /// calendar instant. `None` when the group is not date-varying; a
    /// member whose literal fails to parse is an error.
    pub fn sorted_members(&self) -> Option<Result<Vec<GroupMember>>> {
        let date_eq = self.date_equivalence()?;
        Some(self.sort_by_date(date_eq))
    }

    fn sort_by_date(&self, date_eq: &Equivalence) -> Result<Vec<GroupMember>> {
        let mut dated: Vec<(DateString, &ParsedUrl)> = Vec::with_capacity(self.members.len());
        for parsed in &self.members {
            let literal = &parsed.components()[date_eq.position()];
            let date = DateString::parse(literal, date_eq.date_parts())?;
            dated.push((date, parsed));
        }

        dated.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(dated
            .into_iter()
            .map(|(date, parsed)| GroupMember {
                url: parsed.url().to_string(),
                date: date.instant(),
                filename: parsed.leaf().to_string(),
            })
            .collect())
    }

    /// Earliest and latest member instants, for date-varying groups.
    pub fn date_range(&self) -> Option<Result<(NaiveDateTime, NaiveDateTime)>> {
        let members = match self.sorted_members()? {
            Ok(members) => members,
            Err(e) => return Some(Err(e)),
        };
        let first = members.first()?;
        let last = members.last()?;
        Some(Ok((first.date, last.date)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::date;
    use crate::models::signature;

    fn build_group(urls: &[&str]) -> UrlGroup {
        let mut iter = urls.iter();
        let first = ParsedUrl::parse(iter.next().unwrap()).unwrap();
        let sig = signature(&first, false);
        let mut group = UrlGroup::new(first, sig);
        for url in iter {
            group.add(ParsedUrl::parse(url).unwrap());
        }
        group
    }

    fn classify_group(group: &mut UrlGroup) {
        for eq in group.equivalences_mut() {
            let parts = date::classify(eq);
            eq.set_date_parts(parts);
        }
    }

    #[test]
    fn test_equivalences_track_all_members() {
        let group = build_group(&[
            "http://x.org/data/sat_20180101.nc.ddx",
            "http://x.org/data/sat_20180102.nc.ddx",
        ]);

        assert_eq!(group.len(), 2);
        for eq in group.equivalences() {
            assert_eq!(eq.total_members(), 2);
        }
        // components: data / sat / 20180101 / nc / ddx
        assert_eq!(group.equivalences()[2].distinct_values(), 2);
    }

    #[test]
    fn test_sorted_members_ascend_by_date() {
        let mut group = build_group(&[
            "http://x.org/data/sat_20180103.nc.ddx",
            "http://x.org/data/sat_20180101.nc.ddx",
            "http://x.org/data/sat_20180102.nc.ddx",
        ]);
        classify_group(&mut group);

        assert!(group.is_date_varying());
        let members = group.sorted_members().unwrap().unwrap();
        let urls: Vec<&str> = members.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "http://x.org/data/sat_20180101.nc.ddx",
                "http://x.org/data/sat_20180102.nc.ddx",
                "http://x.org/data/sat_20180103.nc.ddx",
            ]
        );
        assert_eq!(members[0].filename, "sat_20180101.nc.ddx");

        let (min, max) = group.date_range().unwrap().unwrap();
        assert_eq!(min.date().to_string(), "2018-01-01");
        assert_eq!(max.date().to_string(), "2018-01-03");
    }

    #[test]
    fn test_group_without_dates_is_unclassified() {
        let mut group = build_group(&[
            "http://x.org/data/alpha.nc",
            "http://x.org/data/alpha.nc",
        ]);
        classify_group(&mut group);

        assert!(!group.is_date_varying());
        assert!(group.sorted_members().is_none());
    }

    #[test]
    fn test_two_date_positions_leave_group_unclassified() {
        // Year and 8-digit date both classify, so no single position wins
        let mut group = build_group(&[
            "http://x.org/2017/sat_20170101.nc",
            "http://x.org/2018/sat_20180101.nc",
        ]);
        classify_group(&mut group);

        assert!(!group.is_date_varying());
    }
}
