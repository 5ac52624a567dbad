//! Timestamp parsing and ISO week assignment.

use crate::config::TimestampFormats;
use crate::constants::SPREADSHEET_SERIAL_RANGE;
use crate::models::WeekStamp;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

/// Parses export timestamps: primary format first, then lenient fallbacks
#[derive(Debug, Clone)]
pub struct TimestampParser {
    primary: String,
    fallbacks: Vec<String>,
    date_fallbacks: Vec<String>,
    spreadsheet_serials: bool,
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self::new(&TimestampFormats::default())
    }
}

impl TimestampParser {
    pub fn new(formats: &TimestampFormats) -> Self {
        Self {
            primary: formats.primary.clone(),
            fallbacks: formats.fallbacks.clone(),
            date_fallbacks: formats.date_fallbacks.clone(),
            spreadsheet_serials: formats.spreadsheet_serials,
        }
    }

    /// Parse a timestamp cell, `None` when no format applies
    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, &self.primary) {
            return Some(parsed);
        }

        self.parse_lenient(text)
    }

    /// Date-only view of a timestamp cell
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        self.parse(text).map(|parsed| parsed.date())
    }

    fn parse_lenient(&self, text: &str) -> Option<NaiveDateTime> {
        for format in &self.fallbacks {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
                return Some(parsed);
            }
        }

        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Some(parsed.naive_local());
        }

        for format in &self.date_fallbacks {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        if self.spreadsheet_serials {
            return parse_spreadsheet_serial(text);
        }

        None
    }
}

/// Days since 1899-12-30; the fractional part is the time of day
fn parse_spreadsheet_serial(text: &str) -> Option<NaiveDateTime> {
    let serial: f64 = text.replace(',', ".").parse().ok()?;
    let (low, high) = SPREADSHEET_SERIAL_RANGE;
    if !(low..=high).contains(&serial) {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::seconds(seconds))
}

/// ISO year and week of a date
///
/// The ISO year differs from the calendar year around new year, so the two
/// always travel together.
pub fn iso_week_of(date: NaiveDate) -> WeekStamp {
    let iso = date.iso_week();
    WeekStamp::iso(iso.year(), iso.week())
}

/// A row together with its parsed start date and week key
#[derive(Debug, Clone, PartialEq)]
pub struct Dated<R> {
    pub row: R,
    /// `None` only under the unresolved sentinel
    pub date: Option<NaiveDate>,
    pub week: WeekStamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekAssignment<R> {
    pub rows: Vec<Dated<R>>,
    /// Rows dropped because their timestamp could not be parsed
    pub dropped: usize,
    /// Every timestamp failed and all rows carry `WeekStamp::Unresolved`
    pub sentinel_applied: bool,
}

/// Attach a week key to every row
///
/// Rows whose timestamp cannot be parsed are dropped. When no row at all
/// can be parsed, every row is kept with `WeekStamp::Unresolved` instead.
pub fn assign<R, F>(rows: Vec<R>, parser: &TimestampParser, timestamp: F) -> WeekAssignment<R>
where
    F: Fn(&R) -> &str,
{
    let dates: Vec<Option<NaiveDate>> = rows
        .iter()
        .map(|row| parser.parse_date(timestamp(row)))
        .collect();

    let parsed = dates.iter().filter(|date| date.is_some()).count();

    if parsed == 0 && !rows.is_empty() {
        warn!(
            "No timestamp in {} rows could be parsed, assigning the unresolved week to all rows",
            rows.len()
        );
        let rows = rows
            .into_iter()
            .map(|row| Dated {
                row,
                date: None,
                week: WeekStamp::Unresolved,
            })
            .collect();
        return WeekAssignment {
            rows,
            dropped: 0,
            sentinel_applied: true,
        };
    }

    let dropped = rows.len() - parsed;
    if dropped > 0 {
        warn!("Dropped {} rows with unparseable timestamps", dropped);
    }

    let rows: Vec<Dated<R>> = rows
        .into_iter()
        .zip(dates)
        .filter_map(|(row, date)| {
            date.map(|date| Dated {
                row,
                date: Some(date),
                week: iso_week_of(date),
            })
        })
        .collect();

    debug!("Assigned weeks to {} rows", rows.len());

    WeekAssignment {
        rows,
        dropped,
        sentinel_applied: false,
    }
}
