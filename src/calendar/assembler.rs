//! Groups calendar properties into per-event records.

use log::debug;
use std::collections::BTreeMap;

use super::unfold::{parse_property, unfold, Property};

/// Parse state of one `BEGIN:VEVENT` ... `END:VEVENT` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    /// Single-valued properties, last occurrence wins.
    pub properties: BTreeMap<String, String>,
    /// Common names of ATTENDEE lines, in source order.
    pub attendees: Vec<String>,
    /// Full ATTENDEE lines, kept for diagnostics.
    pub raw_attendees: Vec<String>,
}

impl RawEvent {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.attendees.is_empty() && self.raw_attendees.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Property value, or the empty string when absent.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    fn apply(&mut self, property: Property) {
        match property {
            Property::Attendee { name, raw } => {
                if let Some(name) = name {
                    self.attendees.push(name);
                }
                self.raw_attendees.push(raw);
            }
            Property::Field { name, value } => {
                self.properties.insert(name, value);
            }
        }
    }
}

enum State {
    Outside,
    InEvent {
        event: RawEvent,
        /// Depth of nested components such as VALARM.
        nested: usize,
    },
}

fn component(line: &str, keyword: &str) -> Option<String> {
    let (head, name) = line.split_once(':')?;
    head.eq_ignore_ascii_case(keyword).then(|| name.trim().to_ascii_uppercase())
}

/// Split calendar text into events, in source order.
///
/// Blocks still open at end of input are dropped. Properties of components
/// nested inside an event (alarms) do not leak into the event.
pub fn assemble_events(text: &str) -> Vec<RawEvent> {
    let mut events = Vec::new();
    let mut state = State::Outside;

    for line in unfold(text) {
        let begin = component(&line, "BEGIN");
        let end = component(&line, "END");

        state = match state {
            State::Outside => match begin.as_deref() {
                Some("VEVENT") => State::InEvent { event: RawEvent::default(), nested: 0 },
                _ => State::Outside,
            },
            State::InEvent { mut event, nested } => {
                if let Some(name) = begin {
                    if name == "VEVENT" {
                        debug!("Discarding unterminated event block");
                        State::InEvent { event: RawEvent::default(), nested: 0 }
                    } else {
                        State::InEvent { event, nested: nested + 1 }
                    }
                } else if let Some(name) = end {
                    if nested > 0 {
                        State::InEvent { event, nested: nested - 1 }
                    } else if name == "VEVENT" {
                        if !event.is_empty() {
                            events.push(event);
                        }
                        State::Outside
                    } else {
                        State::InEvent { event, nested }
                    }
                } else {
                    if nested == 0 {
                        if let Some(property) = parse_property(&line) {
                            event.apply(property);
                        }
                    }
                    State::InEvent { event, nested }
                }
            }
        };
    }

    if let State::InEvent { .. } = state {
        debug!("Dropping event block left open at end of input");
    }

    debug!("Assembled {} events", events.len());
    events
}
