//! Compact calendar date/time tokens (`YYYYMMDD[THHMMSS[Z]]`).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 2100;

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: f64 = 86400.0;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})(?:T(\d{2})(\d{2})(\d{2})Z?)?$").expect("valid regex")
});

/// A parsed date or date-time. Instants are naive and treated as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TemporalInstant {
    pub datetime: NaiveDateTime,
    pub is_all_day: bool,
}

impl TemporalInstant {
    pub fn epoch_seconds(&self) -> i64 {
        self.datetime.and_utc().timestamp()
    }

    /// `YYYY-MM-DD`
    pub fn display_date(&self) -> String {
        self.datetime.format("%Y-%m-%d").to_string()
    }

    /// `HH:MM`, absent for all-day values.
    pub fn display_time(&self) -> Option<String> {
        (!self.is_all_day).then(|| self.datetime.format("%H:%M").to_string())
    }
}

impl Serialize for TemporalInstant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("TemporalInstant", 4)?;
        s.serialize_field("epoch_seconds", &self.epoch_seconds())?;
        s.serialize_field("date", &self.display_date())?;
        s.serialize_field("time", &self.display_time())?;
        s.serialize_field("is_all_day", &self.is_all_day)?;
        s.end()
    }
}

/// Parse a date token, tolerating a leading `KEY:` or `KEY;PARAM=..:` prefix.
///
/// Returns `None` for anything that does not match the pattern or falls
/// outside the supported calendar range.
pub fn parse(token: &str) -> Option<TemporalInstant> {
    let token = token.rsplit(':').next().unwrap_or(token).trim();
    let caps = TOKEN_RE.captures(token)?;

    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps[1].parse::<i32>().ok()?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?;

    let (time, is_all_day) = match (field(4), field(5), field(6)) {
        (Some(h), Some(m), Some(s)) => (NaiveTime::from_hms_opt(h, m, s)?, false),
        _ => (NaiveTime::from_hms_opt(0, 0, 0)?, true),
    };

    Some(TemporalInstant { datetime: date.and_time(time), is_all_day })
}

/// Unit a duration is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Hours,
    Days,
}

/// Length of an event.
///
/// All-day spans (either end without time) count whole days, rounded up.
/// Timed spans are fractional hours and may be negative when the end precedes
/// the start.
pub fn duration(start: &TemporalInstant, end: &TemporalInstant) -> (f64, DurationUnit) {
    let seconds = (end.epoch_seconds() - start.epoch_seconds()) as f64;
    if start.is_all_day || end.is_all_day {
        ((seconds / SECONDS_PER_DAY).ceil(), DurationUnit::Days)
    } else {
        (seconds / SECONDS_PER_HOUR, DurationUnit::Hours)
    }
}
