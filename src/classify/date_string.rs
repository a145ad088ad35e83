// src/classify/date_string.rs

//! Turning classified literals back into calendar instants.
//!
//! The classifier only records which fields a position encodes; this
//! module slices the literal into those fields and builds a comparable
//! instant. Extraction is positional: year (4 digits, or 2 with a
//! century pivot), then day-of-year (3), month (2, or 1 when the total
//! literal length is odd), day (2), then hour/minute/second (2 each).
//! Literals carrying a 3-letter month name use the `ddmonyyyy[hhmm]`
//! layout instead.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{AppError, Result};

use super::date::{DatePart, MONTH_ABBREVIATIONS};

/// Fields missing from a DatePart set default to the start of their
/// range: January, day 1, midnight. A set without any year defaults to
/// 1970, which keeps members of a day-only group comparable.
const DEFAULT_YEAR: i32 = 1970;

/// A literal date field paired with the calendar instant it denotes.
/// Ordered by instant, with the literal text as tie-breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateString {
    text: String,
    instant: NaiveDateTime,
}

impl DateString {
    /// Parse a literal according to the date parts assigned to its
    /// position.
    pub fn parse(literal: &str, parts: &[DatePart]) -> Result<Self> {
        let instant = if literal.bytes().any(|b| b.is_ascii_alphabetic()) {
            parse_month_name_layout(literal)?
        } else {
            parse_numeric_layout(literal, parts)?
        };

        Ok(Self {
            text: literal.to_string(),
            instant,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn instant(&self) -> NaiveDateTime {
        self.instant
    }
}

impl Ord for DateString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant
            .cmp(&other.instant)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for DateString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct FieldCursor<'a> {
    literal: &'a str,
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    fn new(literal: &'a str) -> Self {
        Self { literal, pos: 0 }
    }

    fn take(&mut self, width: usize) -> Result<&'a str> {
        let end = self.pos + width;
        let field = self.literal.get(self.pos..end).ok_or_else(|| {
            AppError::unparseable_date(
                self.literal,
                format!("expected {width} more characters at offset {}", self.pos),
            )
        })?;
        self.pos = end;
        Ok(field)
    }

    fn take_number(&mut self, width: usize) -> Result<u32> {
        let field = self.take(width)?;
        field.parse().map_err(|_| {
            AppError::unparseable_date(self.literal, format!("'{field}' is not a number"))
        })
    }
}

fn parse_numeric_layout(literal: &str, parts: &[DatePart]) -> Result<NaiveDateTime> {
    let mut cursor = FieldCursor::new(literal);

    let year = if parts.contains(&DatePart::Year) {
        cursor.take_number(4)? as i32
    } else if parts.contains(&DatePart::Year2) {
        expand_year2(cursor.take_number(2)?)
    } else {
        DEFAULT_YEAR
    };

    let date = if parts.contains(&DatePart::DayOfYear) {
        let daynum = cursor.take_number(3)?;
        NaiveDate::from_yo_opt(year, daynum).ok_or_else(|| {
            AppError::unparseable_date(literal, format!("day {daynum} not in year {year}"))
        })?
    } else {
        let month = if parts.contains(&DatePart::Month) {
            // With the single/double-digit distinction erased by
            // classification, literal length parity is the only signal
            // left for the field's width.
            let width = if literal.len() % 2 == 1 { 1 } else { 2 };
            cursor.take_number(width)?
        } else if parts.contains(&DatePart::Month1) {
            cursor.take_number(1)?
        } else {
            1
        };

        let day = if parts.contains(&DatePart::Day) {
            cursor.take_number(2)?
        } else {
            1
        };

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            AppError::unparseable_date(literal, format!("no such date {year}-{month}-{day}"))
        })?
    };

    let time = parse_time(&mut cursor, literal, parts)?;
    Ok(date.and_time(time))
}

/// `ddmonyyyy`, optionally followed by `hhmm`.
fn parse_month_name_layout(literal: &str) -> Result<NaiveDateTime> {
    let mut cursor = FieldCursor::new(literal);

    let day = cursor.take_number(2)?;
    let name = cursor.take(3)?.to_ascii_lowercase();
    let month = MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
        .ok_or_else(|| {
            AppError::unparseable_date(literal, format!("'{name}' is not a month abbreviation"))
        })?;
    let year = cursor.take_number(4)? as i32;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AppError::unparseable_date(literal, format!("no such date {year}-{month}-{day}"))
    })?;

    let time = if literal.len() > 9 {
        let hour = cursor.take_number(2)?;
        let minute = cursor.take_number(2)?;
        NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            AppError::unparseable_date(literal, format!("no such time {hour}:{minute}"))
        })?
    } else {
        NaiveTime::MIN
    };

    Ok(date.and_time(time))
}

fn parse_time(cursor: &mut FieldCursor, literal: &str, parts: &[DatePart]) -> Result<NaiveTime> {
    let hour = if parts.contains(&DatePart::Hour) {
        cursor.take_number(2)?
    } else {
        0
    };
    let minute = if parts.contains(&DatePart::Minute) {
        cursor.take_number(2)?
    } else {
        0
    };
    let second = if parts.contains(&DatePart::Second) {
        cursor.take_number(2)?
    } else {
        0
    };

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
        AppError::unparseable_date(literal, format!("no such time {hour}:{minute}:{second}"))
    })
}

fn expand_year2(value: u32) -> i32 {
    if value < 70 {
        2000 + value as i32
    } else {
        1900 + value as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_yyyymmdd_round_trip() {
        let parts = [DatePart::Year, DatePart::Month, DatePart::Day];
        let date = DateString::parse("20180315", &parts).unwrap();
        assert_eq!(
            date.instant().date(),
            NaiveDate::from_ymd_opt(2018, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_year_daynum() {
        let parts = [DatePart::Year, DatePart::DayOfYear];
        let date = DateString::parse("2018032", &parts).unwrap();
        assert_eq!(
            date.instant().date(),
            NaiveDate::from_ymd_opt(2018, 2, 1).unwrap()
        );
    }

    #[test]
    fn test_year2_pivot() {
        let parts = [DatePart::Year2, DatePart::DayOfYear];
        let low = DateString::parse("18001", &parts).unwrap();
        let high = DateString::parse("85001", &parts).unwrap();
        assert_eq!(low.instant().date().year(), 2018);
        assert_eq!(high.instant().date().year(), 1985);
    }

    #[test]
    fn test_month_width_follows_literal_parity() {
        // Even length: 4-digit year + 2-digit month
        let parts = [DatePart::Year, DatePart::Month];
        let even = DateString::parse("201803", &parts).unwrap();
        assert_eq!(even.instant().date().month(), 3);

        // Odd length: the month consumed only one digit
        let odd = DateString::parse("20183", &parts).unwrap();
        assert_eq!(odd.instant().date().month(), 3);
    }

    #[test]
    fn test_thirteen_digit_timestamp() {
        let parts = [
            DatePart::Year,
            DatePart::DayOfYear,
            DatePart::Hour,
            DatePart::Minute,
            DatePart::Second,
        ];
        let date = DateString::parse("2018032123059", &parts).unwrap();
        assert_eq!(
            date.instant(),
            NaiveDate::from_ymd_opt(2018, 2, 1)
                .unwrap()
                .and_hms_opt(12, 30, 59)
                .unwrap()
        );
    }

    #[test]
    fn test_month_name_layout() {
        let parts = [DatePart::Day, DatePart::Month, DatePart::Year];
        let date = DateString::parse("02jan2011", &parts).unwrap();
        assert_eq!(
            date.instant().date(),
            NaiveDate::from_ymd_opt(2011, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_bad_month_is_unparseable() {
        let parts = [DatePart::Year, DatePart::Month, DatePart::Day];
        let result = DateString::parse("20181301", &parts);
        assert!(matches!(result, Err(AppError::UnparseableDate { .. })));
    }

    #[test]
    fn test_truncated_literal_is_unparseable() {
        let parts = [DatePart::Year, DatePart::Month, DatePart::Day];
        let result = DateString::parse("2018", &parts);
        assert!(matches!(result, Err(AppError::UnparseableDate { .. })));
    }

    #[test]
    fn test_ordering_by_instant() {
        let parts = [DatePart::Year, DatePart::Month, DatePart::Day];
        let a = DateString::parse("20180101", &parts).unwrap();
        let b = DateString::parse("20180102", &parts).unwrap();
        assert!(a < b);
    }
}
