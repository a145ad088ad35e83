// src/classify/date.rs

//! Calendar-field inference over equivalence histograms.
//!
//! Decides whether the values observed at one component position encode
//! calendar fields. Candidate shapes are tested in a fixed priority
//! order; the first shape whose pattern matches and whose range check
//! passes on every observed value wins, and later shapes are never
//! consulted. An 8-digit field that could be read as `yyyymmdd` or as
//! something else therefore always classifies as the earlier shape.
//!
//! The two 11-digit shapes share one length guard and differ only in
//! priority; the second is shadowed by the first. Both are kept, in this
//! order, because reordering them would silently change how existing
//! catalogs classify.

use std::fmt;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::equivalence::Equivalence;

const MINIMUM_YEAR: i32 = 1970;

/// Three-letter English month abbreviations, lowercase.
pub const MONTH_ABBREVIATIONS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// A calendar field a component position can encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePart {
    Year,
    /// Two-digit year, expanded with a century pivot when parsed.
    Year2,
    Month,
    /// Single-digit month written without a leading zero.
    Month1,
    Day,
    DayOfYear,
    Hour,
    Minute,
    Second,
}

impl fmt::Display for DatePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatePart::Year => "year",
            DatePart::Year2 => "year2",
            DatePart::Month => "month",
            DatePart::Month1 => "month1",
            DatePart::Day => "day",
            DatePart::DayOfYear => "day_of_year",
            DatePart::Hour => "hour",
            DatePart::Minute => "minute",
            DatePart::Second => "second",
        };
        f.write_str(name)
    }
}

/// Classify one equivalence: which calendar fields, if any, does this
/// position encode? Returns an empty set when no shape matches.
pub fn classify(eq: &Equivalence) -> Vec<DatePart> {
    if !eq.is_pattern() {
        return Vec::new();
    }

    let current_year = Utc::now().year();

    if is_year(eq, current_year) {
        vec![DatePart::Year]
    } else if is_day_of_year(eq) {
        vec![DatePart::DayOfYear]
    } else if is_day(eq) {
        vec![DatePart::Day]
    } else if is_month(eq) {
        vec![DatePart::Month]
    } else if is_month1(eq) {
        vec![DatePart::Month1]
    } else if is_year_month_day(eq, current_year) {
        vec![DatePart::Year, DatePart::Month, DatePart::Day]
    } else if is_year_daynum_time(eq, current_year) {
        vec![
            DatePart::Year,
            DatePart::DayOfYear,
            DatePart::Hour,
            DatePart::Minute,
            DatePart::Second,
        ]
    } else if is_year_daynum(eq, current_year) {
        vec![DatePart::Year, DatePart::DayOfYear]
    } else if is_year2_daynum_time(eq, current_year) {
        vec![
            DatePart::Year2,
            DatePart::DayOfYear,
            DatePart::Hour,
            DatePart::Minute,
            DatePart::Second,
        ]
    } else if is_year2_daynum(eq, current_year) {
        vec![DatePart::Year2, DatePart::DayOfYear]
    } else if is_year_month(eq, current_year) {
        vec![DatePart::Year, DatePart::Month]
    } else if is_day_monthname_year(eq, current_year) {
        vec![DatePart::Day, DatePart::Month, DatePart::Year]
    } else if is_day_monthname_year_time(eq, current_year) {
        vec![
            DatePart::Day,
            DatePart::Month,
            DatePart::Year,
            DatePart::Hour,
            DatePart::Minute,
        ]
    } else {
        Vec::new()
    }
}

/// All observed values satisfy the check.
fn all_values(eq: &Equivalence, check: impl Fn(&str) -> bool) -> bool {
    eq.values().all(|v| check(v))
}

fn in_range(value: &str, low: i32, high: i32) -> bool {
    value
        .parse::<i32>()
        .is_ok_and(|n| n >= low && n <= high)
}

fn slice_in_range(value: &str, range: std::ops::Range<usize>, low: i32, high: i32) -> bool {
    value
        .get(range)
        .is_some_and(|s| in_range(s, low, high))
}

fn valid_year(value: &str, current_year: i32) -> bool {
    in_range(value, MINIMUM_YEAR, current_year)
}

/// A two-digit year is valid when the century pivot (`<70` reads as
/// 20xx, otherwise 19xx) lands it inside `[1970, current year]`.
fn valid_year2(value: &str, current_year: i32) -> bool {
    value
        .parse::<i32>()
        .is_ok_and(|n| n >= 70 || n <= current_year % 100)
}

fn valid_month_name(value: &str) -> bool {
    MONTH_ABBREVIATIONS.contains(&value.to_ascii_lowercase().as_str())
}

fn is_year(eq: &Equivalence, current_year: i32) -> bool {
    eq.pattern() == "dddd" && all_values(eq, |v| valid_year(v, current_year))
}

fn is_day_of_year(eq: &Equivalence) -> bool {
    eq.pattern() == "ddd"
        && (eq.distinct_values() == 366 || eq.distinct_values() == 365)
        && all_values(eq, |v| in_range(v, 0, 366))
}

fn is_day(eq: &Equivalence) -> bool {
    eq.pattern() == "dd"
        && eq.distinct_values() == 31
        && all_values(eq, |v| in_range(v, 0, 31))
}

fn is_month(eq: &Equivalence) -> bool {
    eq.pattern() == "dd"
        && (eq.distinct_values() == 12 || eq.distinct_values() == 3)
        && all_values(eq, |v| in_range(v, 0, 12))
}

fn is_month1(eq: &Equivalence) -> bool {
    eq.pattern() == "d"
        && (eq.distinct_values() == 10 || eq.distinct_values() == 9)
        && all_values(eq, |v| in_range(v, 0, 12))
}

fn is_year_month_day(eq: &Equivalence, current_year: i32) -> bool {
    eq.pattern() == "dddddddd"
        && all_values(eq, |v| {
            v.get(0..4).is_some_and(|y| valid_year(y, current_year))
                && slice_in_range(v, 4..6, 0, 12)
                && slice_in_range(v, 6..8, 0, 31)
        })
}

fn is_year_daynum_time(eq: &Equivalence, current_year: i32) -> bool {
    eq.pattern() == "ddddddddddddd"
        && all_values(eq, |v| {
            v.get(0..4).is_some_and(|y| valid_year(y, current_year))
                && slice_in_range(v, 4..7, 0, 366)
                && slice_in_range(v, 7..9, 0, 23)
                && slice_in_range(v, 9..11, 0, 59)
                && slice_in_range(v, 11..13, 0, 59)
        })
}

fn is_year_daynum(eq: &Equivalence, current_year: i32) -> bool {
    eq.pattern() == "ddddddd"
        && all_values(eq, |v| {
            v.get(0..4).is_some_and(|y| valid_year(y, current_year))
                && slice_in_range(v, 4..7, 0, 366)
        })
}

fn is_year2_daynum_time(eq: &Equivalence, current_year: i32) -> bool {
    eq.pattern() == "ddddddddddd"
        && all_values(eq, |v| {
            v.get(0..2).is_some_and(|y| valid_year2(y, current_year))
                && slice_in_range(v, 2..5, 0, 366)
                && slice_in_range(v, 5..7, 0, 23)
                && slice_in_range(v, 7..9, 0, 59)
                && slice_in_range(v, 9..11, 0, 59)
        })
}

// Shadowed by is_year2_daynum_time: same length guard, lower priority.
fn is_year2_daynum(eq: &Equivalence, current_year: i32) -> bool {
    eq.pattern() == "ddddddddddd"
        && all_values(eq, |v| {
            v.get(0..2).is_some_and(|y| valid_year2(y, current_year))
                && slice_in_range(v, 2..4, 0, 366)
        })
}

fn is_year_month(eq: &Equivalence, current_year: i32) -> bool {
    eq.pattern() == "dddddd"
        && all_values(eq, |v| {
            v.get(0..4).is_some_and(|y| valid_year(y, current_year))
                && slice_in_range(v, 4..6, 0, 12)
        })
}

fn is_day_monthname_year(eq: &Equivalence, current_year: i32) -> bool {
    eq.pattern() == "ddcccdddd"
        && all_values(eq, |v| {
            slice_in_range(v, 0..2, 0, 31)
                && v.get(2..5).is_some_and(valid_month_name)
                && v.get(5..9).is_some_and(|y| valid_year(y, current_year))
        })
}

fn is_day_monthname_year_time(eq: &Equivalence, current_year: i32) -> bool {
    eq.pattern() == "ddcccdddddddd"
        && all_values(eq, |v| {
            slice_in_range(v, 0..2, 0, 31)
                && v.get(2..5).is_some_and(valid_month_name)
                && v.get(5..9).is_some_and(|y| valid_year(y, current_year))
                && slice_in_range(v, 9..11, 0, 23)
                && slice_in_range(v, 11..13, 0, 59)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lexeme;

    fn equivalence(pattern: &str, is_pattern: bool, values: &[&str]) -> Equivalence {
        let template = Lexeme::new(pattern, is_pattern);
        let mut eq = Equivalence::new(0, &template);
        for v in values {
            eq.add(v);
        }
        eq
    }

    #[test]
    fn test_four_digit_year_in_range() {
        let eq = equivalence("dddd", true, &["1998", "2005", "2019"]);
        assert_eq!(classify(&eq), vec![DatePart::Year]);
    }

    #[test]
    fn test_four_digit_year_out_of_range_rejected() {
        // One value below the epoch floor disqualifies the whole position
        let eq = equivalence("dddd", true, &["1998", "1901"]);
        assert!(classify(&eq).is_empty());
    }

    #[test]
    fn test_literal_position_never_classifies() {
        let eq = equivalence("2018", false, &["2018"]);
        assert!(classify(&eq).is_empty());
    }

    #[test]
    fn test_two_digit_day_needs_31_distinct_values() {
        let days: Vec<String> = (1..=31).map(|d| format!("{d:02}")).collect();
        let refs: Vec<&str> = days.iter().map(String::as_str).collect();
        let eq = equivalence("dd", true, &refs);
        assert_eq!(classify(&eq), vec![DatePart::Day]);
    }

    #[test]
    fn test_two_digit_month_with_12_distinct_values() {
        let months: Vec<String> = (1..=12).map(|m| format!("{m:02}")).collect();
        let refs: Vec<&str> = months.iter().map(String::as_str).collect();
        let eq = equivalence("dd", true, &refs);
        assert_eq!(classify(&eq), vec![DatePart::Month]);
    }

    #[test]
    fn test_two_digit_field_with_other_cardinality_unclassified() {
        let eq = equivalence("dd", true, &["01", "02", "03", "04"]);
        assert!(classify(&eq).is_empty());
    }

    #[test]
    fn test_eight_digits_classify_as_year_month_day() {
        let eq = equivalence("dddddddd", true, &["20180101", "20181231"]);
        assert_eq!(
            classify(&eq),
            vec![DatePart::Year, DatePart::Month, DatePart::Day]
        );
    }

    #[test]
    fn test_eight_digits_with_bad_month_rejected() {
        let eq = equivalence("dddddddd", true, &["20181301"]);
        assert!(classify(&eq).is_empty());
    }

    #[test]
    fn test_seven_digits_classify_as_year_daynum() {
        let eq = equivalence("ddddddd", true, &["2018001", "2018366"]);
        assert_eq!(classify(&eq), vec![DatePart::Year, DatePart::DayOfYear]);
    }

    #[test]
    fn test_thirteen_digits_classify_with_time() {
        let eq = equivalence("ddddddddddddd", true, &["2018001123059"]);
        assert_eq!(
            classify(&eq),
            vec![
                DatePart::Year,
                DatePart::DayOfYear,
                DatePart::Hour,
                DatePart::Minute,
                DatePart::Second,
            ]
        );
    }

    #[test]
    fn test_eleven_digits_always_take_the_time_shape() {
        // Both 11-digit shapes guard on the same length; the time-bearing
        // one is earlier in the priority order and must win.
        let eq = equivalence("ddddddddddd", true, &["18001123059"]);
        assert_eq!(
            classify(&eq),
            vec![
                DatePart::Year2,
                DatePart::DayOfYear,
                DatePart::Hour,
                DatePart::Minute,
                DatePart::Second,
            ]
        );
    }

    #[test]
    fn test_six_digits_classify_as_year_month() {
        let eq = equivalence("dddddd", true, &["201801", "201812"]);
        assert_eq!(classify(&eq), vec![DatePart::Year, DatePart::Month]);
    }

    #[test]
    fn test_day_monthname_year_shape() {
        let eq = equivalence("ddcccdddd", true, &["02jan2011", "15DEC2010"]);
        assert_eq!(
            classify(&eq),
            vec![DatePart::Day, DatePart::Month, DatePart::Year]
        );
    }

    #[test]
    fn test_day_monthname_year_bad_abbreviation_rejected() {
        let eq = equivalence("ddcccdddd", true, &["02xyz2011"]);
        assert!(classify(&eq).is_empty());
    }

    #[test]
    fn test_priority_year_beats_composite_reading() {
        // A 4-digit field inside the year range is a year, never anything
        // later in the list.
        let eq = equivalence("dddd", true, &["2018"]);
        assert_eq!(classify(&eq), vec![DatePart::Year]);
    }
}
