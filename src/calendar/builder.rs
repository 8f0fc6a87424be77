//! Normalized calendar records and batch aggregates.

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

use super::assembler::{assemble_events, RawEvent};
use super::resolver::{contains_keyword, ResolutionSource, Roster, LEAVE_KEYWORDS, REMOTE_KEYWORDS};
use super::temporal::{self, DurationUnit, TemporalInstant};
use crate::source::{read_text, SourceError};

static TICKET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)TICKET\s*#\s*(\d+)").expect("valid regex"));

pub const LEAVE_NOTE: &str = "Leave";
pub const REMOTE_NOTE: &str = "Remote work";

/// One calendar event in normalized form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarRecord {
    pub responsible_party: String,
    pub resolved_by: ResolutionSource,
    pub counterpart: String,
    pub summary: String,
    pub location: String,
    pub start: Option<TemporalInstant>,
    pub end: Option<TemporalInstant>,
    /// Absent when either endpoint is missing or malformed.
    pub duration: Option<f64>,
    pub duration_unit: Option<DurationUnit>,
    pub notes: String,
    pub is_all_day: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    Ok,
    FileNotFound,
    Unreadable,
}

/// All records of one calendar file plus aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarBatchResult {
    pub records: Vec<CalendarRecord>,
    /// Sum of every known duration, regardless of unit.
    pub total_duration: f64,
    pub total_hours: f64,
    pub total_days: f64,
    pub distinct_responsible_parties: BTreeSet<String>,
    pub distinct_counterparts: BTreeSet<String>,
    pub distinct_locations: BTreeSet<String>,
    pub parse_status: ParseStatus,
    pub error: Option<String>,
}

impl CalendarBatchResult {
    fn empty(parse_status: ParseStatus, error: Option<String>) -> Self {
        Self {
            records: Vec::new(),
            total_duration: 0.0,
            total_hours: 0.0,
            total_days: 0.0,
            distinct_responsible_parties: BTreeSet::new(),
            distinct_counterparts: BTreeSet::new(),
            distinct_locations: BTreeSet::new(),
            parse_status,
            error,
        }
    }

    fn push(&mut self, record: CalendarRecord, unassigned: &str) {
        if let (Some(duration), Some(unit)) = (record.duration, record.duration_unit) {
            self.total_duration += duration;
            match unit {
                DurationUnit::Hours => self.total_hours += duration,
                DurationUnit::Days => self.total_days += duration,
            }
        }
        if record.responsible_party != unassigned {
            self.distinct_responsible_parties.insert(record.responsible_party.clone());
        }
        if !record.counterpart.is_empty() {
            self.distinct_counterparts.insert(record.counterpart.clone());
        }
        if !record.location.is_empty() {
            self.distinct_locations.insert(record.location.clone());
        }
        self.records.push(record);
    }
}

/// Client or event label: the summary up to its first `-`.
pub fn counterpart(summary: &str) -> String {
    summary.split('-').next().unwrap_or_default().trim().to_string()
}

/// Free-text notes, by priority: description, leave, ticket number, remote
/// work.
pub fn derive_notes(summary: &str, description: &str) -> String {
    if !description.trim().is_empty() {
        return description.trim().to_string();
    }
    if contains_keyword(summary, LEAVE_KEYWORDS) {
        return LEAVE_NOTE.to_string();
    }
    if let Some(caps) = TICKET_RE.captures(summary) {
        return format!("Ticket #{}", &caps[1]);
    }
    if contains_keyword(summary, REMOTE_KEYWORDS) {
        return REMOTE_NOTE.to_string();
    }
    String::new()
}

fn parse_endpoint(event: &RawEvent, name: &str) -> Option<TemporalInstant> {
    let token = event.get(name)?;
    let instant = temporal::parse(token);
    if instant.is_none() {
        debug!("Skipping malformed {} value {:?}", name, token);
    }
    instant
}

/// Turn one raw event into a record.
pub fn build_record(event: &RawEvent, roster: &Roster) -> CalendarRecord {
    let summary = event.text("SUMMARY");
    let description = event.text("DESCRIPTION");

    let start = parse_endpoint(event, "DTSTART");
    let end = parse_endpoint(event, "DTEND");

    let (duration, duration_unit) = match (&start, &end) {
        (Some(start), Some(end)) => {
            let (value, unit) = temporal::duration(start, end);
            (Some(value), Some(unit))
        }
        _ => (None, None),
    };

    let is_all_day = [start, end].iter().flatten().any(|i| i.is_all_day);
    let resolution = roster.resolve(&event.attendees, summary);

    CalendarRecord {
        responsible_party: resolution.party,
        resolved_by: resolution.source,
        counterpart: counterpart(summary),
        summary: summary.to_string(),
        location: event.text("LOCATION").to_string(),
        start,
        end,
        duration,
        duration_unit,
        notes: derive_notes(summary, description),
        is_all_day,
    }
}

/// Parse calendar text into records and aggregates.
pub fn parse_calendar_text(text: &str, roster: &Roster) -> CalendarBatchResult {
    let mut batch = CalendarBatchResult::empty(ParseStatus::Ok, None);
    for event in assemble_events(text) {
        batch.push(build_record(&event, roster), roster.unassigned());
    }

    info!(
        "Parsed {} calendar events ({} people, {} counterparts)",
        batch.records.len(),
        batch.distinct_responsible_parties.len(),
        batch.distinct_counterparts.len()
    );
    batch
}

/// Parse the calendar file at `path`.
///
/// A missing file yields an empty batch with [`ParseStatus::FileNotFound`]
/// and the parser is never invoked.
pub fn parse_calendar_file(path: &Path, roster: &Roster) -> CalendarBatchResult {
    match read_text(path) {
        Ok(source) => {
            debug!("Decoded {} as {}", path.display(), source.charset);
            parse_calendar_text(&source.text, roster)
        }
        Err(e @ SourceError::NotFound(_)) => {
            CalendarBatchResult::empty(ParseStatus::FileNotFound, Some(e.to_string()))
        }
        Err(e) => {
            warn!("Calendar file {} unreadable: {}", path.display(), e);
            CalendarBatchResult::empty(ParseStatus::Unreadable, Some(e.to_string()))
        }
    }
}
