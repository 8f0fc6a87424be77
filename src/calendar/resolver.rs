//! Attribution of calendar events to a responsible person.
//!
//! Stages are tried in order of trust and the first one that produces a
//! name wins:
//!
//! 1. the first attendee, unless it is a placeholder such as a room,
//! 2. a known technician's full name appearing in the summary,
//! 3. a first name found in a leave request summary, expanded to a full name,
//! 4. otherwise the unassigned label.

use log::debug;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::CalendarConfig;

pub const UNASSIGNED: &str = "Unassigned";

pub const DEFAULT_TECHNICIANS: &[&str] = &[
    "Alex Ferrario",
    "Gabriele De Palma",
    "Matteo Signo",
    "Davide Cestone",
    "Marco Birocchi",
    "Matteo Di Salvo",
    "Arlind Hoxha",
    "Nicole Caiola",
];

// "Matteo" is left out on purpose: two technicians share it.
pub const DEFAULT_FIRST_NAMES: &[(&str, &str)] = &[
    ("alex", "Alex Ferrario"),
    ("gabriele", "Gabriele De Palma"),
    ("davide", "Davide Cestone"),
    ("marco", "Marco Birocchi"),
    ("arlind", "Arlind Hoxha"),
    ("nicole", "Nicole Caiola"),
];

pub const DEFAULT_PLACEHOLDER_ATTENDEES: &[&str] =
    &["ATTENDEE", "Sala Riunioni", "Meeting Room", "Resource"];

pub const LEAVE_KEYWORDS: &[&str] = &["ferie", "permesso", "congedo"];
pub const REMOTE_KEYWORDS: &[&str] = &["smart working", "smartworking", "remote"];

/// Case-insensitive keyword containment.
pub fn contains_keyword(text: &str, keywords: &[&str]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|k| text.contains(k))
}

/// Which stage attributed the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Attendee,
    Roster,
    LeaveRequest,
    Unassigned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub party: String,
    pub source: ResolutionSource,
}

/// Known people and placeholder labels, fixed for the lifetime of a parse.
#[derive(Debug, Clone)]
pub struct Roster {
    technicians: Vec<String>,
    first_names: BTreeMap<String, String>,
    first_name_re: Option<Regex>,
    placeholders: Vec<String>,
    unassigned: String,
}

impl Roster {
    pub fn from_config(config: &CalendarConfig) -> Self {
        let first_names: BTreeMap<String, String> = config
            .first_names
            .iter()
            .map(|(first, full)| (first.trim().to_lowercase(), full.clone()))
            .filter(|(first, _)| !first.is_empty())
            .collect();

        let first_name_re = if first_names.is_empty() {
            None
        } else {
            let alternation =
                first_names.keys().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
            Regex::new(&format!(r"(?i)\b({})\b", alternation)).ok()
        };

        Self {
            technicians: config.technicians.clone(),
            first_names,
            first_name_re,
            placeholders: config.placeholder_attendees.clone(),
            unassigned: config.unassigned_label.clone(),
        }
    }

    pub fn unassigned(&self) -> &str {
        &self.unassigned
    }

    pub fn is_placeholder(&self, name: &str) -> bool {
        self.placeholders.iter().any(|p| p.eq_ignore_ascii_case(name.trim()))
    }

    /// Attribute an event from its attendees and summary.
    pub fn resolve(&self, attendees: &[String], summary: &str) -> Resolution {
        const STAGES: &[(ResolutionSource, Stage)] = &[
            (ResolutionSource::Attendee, from_attendee),
            (ResolutionSource::Roster, from_roster),
            (ResolutionSource::LeaveRequest, from_leave_request),
        ];

        STAGES
            .iter()
            .find_map(|(source, stage)| {
                stage(self, attendees, summary)
                    .filter(|party| !party.trim().is_empty())
                    .map(|party| Resolution { party, source: *source })
            })
            .unwrap_or_else(|| Resolution {
                party: self.unassigned.clone(),
                source: ResolutionSource::Unassigned,
            })
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::from_config(&CalendarConfig::default())
    }
}

type Stage = fn(&Roster, &[String], &str) -> Option<String>;

fn from_attendee(roster: &Roster, attendees: &[String], _summary: &str) -> Option<String> {
    let first = attendees.first()?.trim();
    if first.is_empty() || roster.is_placeholder(first) {
        debug!("Ignoring placeholder attendee {:?}", first);
        return None;
    }
    Some(first.to_string())
}

fn from_roster(roster: &Roster, _attendees: &[String], summary: &str) -> Option<String> {
    let summary = summary.to_lowercase();
    roster
        .technicians
        .iter()
        .find(|name| !name.trim().is_empty() && summary.contains(&name.to_lowercase()))
        .cloned()
}

fn from_leave_request(roster: &Roster, _attendees: &[String], summary: &str) -> Option<String> {
    if !contains_keyword(summary, LEAVE_KEYWORDS) {
        return None;
    }
    let caps = roster.first_name_re.as_ref()?.captures(summary)?;
    roster.first_names.get(&caps[1].to_lowercase()).cloned()
}
