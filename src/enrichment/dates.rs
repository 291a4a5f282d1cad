use crate::error::{AppError, Result};
use crate::models::CANONICAL_DATE_FORMAT;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// Formats with a textual month, tried after the numeric forms
const TEXTUAL_DATE_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%d-%B-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %y",
    "%d-%b-%y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Parses raw creation dates day-first and measures their age against a
/// fixed processing instant.
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    now: NaiveDateTime,
}

impl DateNormalizer {
    /// Normalizer anchored at `now`
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Normalizer anchored at the current local time
    pub fn at_current_time() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// Processing instant used for elapsed-day computation
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Canonical `DD/MM/YYYY` date and whole days elapsed.
    ///
    /// Unparsable input yields `(None, None)`.
    pub fn normalize(&self, raw: &str) -> (Option<String>, Option<i64>) {
        match self.normalize_date(raw) {
            Some((date, days)) => (
                Some(date.format(CANONICAL_DATE_FORMAT).to_string()),
                Some(days),
            ),
            None => (None, None),
        }
    }

    /// Parsed calendar date and whole days elapsed (floored)
    pub fn normalize_date(&self, raw: &str) -> Option<(NaiveDate, i64)> {
        let parsed = parse_day_first(raw)?;
        let elapsed = (self.now - parsed).num_seconds().div_euclid(SECONDS_PER_DAY);
        Some((parsed.date(), elapsed))
    }
}

/// Parse a date (with optional time) preferring day-first interpretation.
///
/// Numeric dates with `/`, `-` or `.` separators are read as `DD MM YYYY`
/// unless the first field has four digits (`YYYY MM DD`). A day-first
/// reading that is not a valid calendar date is retried month-first only
/// when the second field cannot be a month.
pub fn parse_day_first(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    parse_numeric_date_time(raw)
        .or_else(|| parse_textual_date(raw).map(|d| d.and_time(NaiveTime::MIN)))
}

fn parse_numeric_date_time(raw: &str) -> Option<NaiveDateTime> {
    let (date_part, time_part) = match raw.split_once(|c: char| c == 'T' || c.is_whitespace()) {
        Some((date, time)) => (date, Some(time.trim())),
        None => (raw, None),
    };

    let date = parse_numeric_date(date_part)?;
    let time = match time_part {
        Some(t) if !t.is_empty() => parse_time(t)?,
        _ => NaiveTime::MIN,
    };

    Some(date.and_time(time))
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

fn parse_numeric_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split(['/', '-', '.']).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let third: u32 = parts[2].parse().ok()?;

    if parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(first as i32, second, third);
    }

    let year = match parts[2].len() {
        4 => third as i32,
        1 | 2 => expand_two_digit_year(third),
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, second, first).or_else(|| {
        if second > 12 {
            NaiveDate::from_ymd_opt(year, first, second)
        } else {
            None
        }
    })
}

fn parse_textual_date(raw: &str) -> Option<NaiveDate> {
    TEXTUAL_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Two-digit years resolve to the century that keeps them within fifty
/// years of the current year
fn expand_two_digit_year(year: u32) -> i32 {
    let current = Local::now().year();
    let century = current - current.rem_euclid(100);
    let candidate = century + year as i32;
    if candidate > current + 50 {
        candidate - 100
    } else {
        candidate
    }
}

/// Inclusive creation-date window applied before enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Build a range from optional raw bounds.
    ///
    /// A range applies only when both bounds are given; an unparsable bound
    /// is a validation error.
    pub fn from_bounds(from: Option<&str>, to: Option<&str>) -> Result<Option<Self>> {
        let (from, to) = match (non_blank(from), non_blank(to)) {
            (Some(from), Some(to)) => (from, to),
            (None, None) => return Ok(None),
            (from, to) => {
                tracing::warn!(
                    from_date = ?from,
                    to_date = ?to,
                    "Only one date bound supplied; date range ignored"
                );
                return Ok(None);
            }
        };

        let parse = |label: &str, raw: &str| {
            parse_day_first(raw)
                .map(|dt| dt.date())
                .ok_or_else(|| AppError::Validation(format!("Invalid {}: '{}'", label, raw)))
        };

        Ok(Some(Self::new(parse("from_date", from)?, parse("to_date", to)?)))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
