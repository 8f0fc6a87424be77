//! Logical line reconstruction and property parsing for calendar text.

use std::iter::Peekable;
use std::str::Lines;

/// Iterator over logical lines: physical lines that start with whitespace are
/// appended (trimmed) to the line before them.
pub struct Unfold<'a> {
    lines: Peekable<Lines<'a>>,
}

pub fn unfold(text: &str) -> Unfold<'_> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Unfold { lines: text.lines().peekable() }
}

fn is_continuation(line: &str) -> bool {
    line.starts_with(|c: char| c.is_whitespace())
}

impl Iterator for Unfold<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        // A continuation with nothing before it has no property to extend.
        let first = loop {
            let line = self.lines.next()?;
            if !is_continuation(line) && !line.trim().is_empty() {
                break line;
            }
        };

        let mut logical = first.trim().to_string();
        while let Some(next) = self.lines.peek() {
            if !is_continuation(next) {
                break;
            }
            logical.push_str(next.trim());
            self.lines.next();
        }
        Some(logical)
    }
}

/// One parsed content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// An ATTENDEE line. `name` is its common name when one was present.
    Attendee { name: Option<String>, raw: String },
    /// Any other property, with parameters removed from the name.
    Field { name: String, value: String },
}

/// Byte offset of the first `:` that is not inside double quotes.
fn value_separator(line: &str) -> Option<usize> {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ':' if !quoted => return Some(i),
            _ => {}
        }
    }
    None
}

/// Extract the `CN=` parameter from a parameter list or value.
pub fn common_name(text: &str) -> Option<String> {
    let start = text.to_ascii_uppercase().find("CN=")? + 3;
    let rest = &text[start..];

    let name = match rest.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next().unwrap_or_default(),
        None => rest.split([';', ':']).next().unwrap_or_default(),
    };

    let name = name.trim().trim_matches('"').trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Parse a logical line. Lines without a `:` carry no property.
pub fn parse_property(line: &str) -> Option<Property> {
    let split = value_separator(line)?;
    let (name_part, value) = (&line[..split], &line[split + 1..]);

    if name_part.to_ascii_uppercase().starts_with("ATTENDEE") {
        let name = common_name(name_part).or_else(|| common_name(value));
        return Some(Property::Attendee { name, raw: line.to_string() });
    }

    let name = name_part.split(';').next().unwrap_or(name_part).trim().to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }

    Some(Property::Field { name, value: value.trim().to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unfold_continuation() {
        let text = "DESCRIPTION:Controllo\n  server\n\tcompleto\nSUMMARY:Acme";
        let lines: Vec<String> = unfold(text).collect();
        assert_eq!(lines, vec!["DESCRIPTION:Controlloservercompleto", "SUMMARY:Acme"]);
    }

    #[test]
    fn test_unfold_crlf_blank_and_bom() {
        let text = "\u{feff}BEGIN:VEVENT\r\n\r\nSUMMARY:Acme\r\n END\r\nEND:VEVENT\r\n";
        let lines: Vec<String> = unfold(text).collect();
        assert_eq!(lines, vec!["BEGIN:VEVENT", "SUMMARY:AcmeEND", "END:VEVENT"]);
    }

    #[test]
    fn test_unfold_leading_orphan_continuation() {
        let lines: Vec<String> = unfold("  orphan\nSUMMARY:x").collect();
        assert_eq!(lines, vec!["SUMMARY:x"]);
    }

    #[test]
    fn test_parse_field_strips_parameters() {
        assert_eq!(
            parse_property("DTSTART;TZID=Europe/Rome:20250801T090000"),
            Some(Property::Field {
                name: "DTSTART".to_string(),
                value: "20250801T090000".to_string()
            })
        );
    }

    #[test]
    fn test_parse_field_value_keeps_colons() {
        assert_eq!(
            parse_property("DESCRIPTION:Call at 10:30"),
            Some(Property::Field {
                name: "DESCRIPTION".to_string(),
                value: "Call at 10:30".to_string()
            })
        );
    }

    #[test]
    fn test_parse_attendee_quoted_cn() {
        let line = "ATTENDEE;CN=\"Jane Roe\";ROLE=REQ-PARTICIPANT:mailto:jane@example.com";
        assert_eq!(
            parse_property(line),
            Some(Property::Attendee { name: Some("Jane Roe".to_string()), raw: line.to_string() })
        );
    }

    #[test]
    fn test_parse_attendee_unquoted_and_missing_cn() {
        assert_eq!(common_name("ATTENDEE;CN=Alex Ferrario;RSVP=TRUE"), Some("Alex Ferrario".to_string()));
        assert_eq!(common_name("ATTENDEE;CN=Mario"), Some("Mario".to_string()));
        match parse_property("ATTENDEE:mailto:x@example.com") {
            Some(Property::Attendee { name, .. }) => assert_eq!(name, None),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_quoted_colon_in_cn() {
        match parse_property("ATTENDEE;CN=\"Roe: Jane\":mailto:x") {
            Some(Property::Attendee { name, .. }) => assert_eq!(name.as_deref(), Some("Roe: Jane")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_lowercase_attendee() {
        let line = "attendee;cn=Jane Roe:mailto:x";
        assert_eq!(
            parse_property(line),
            Some(Property::Attendee { name: Some("Jane Roe".to_string()), raw: line.to_string() })
        );
    }

    #[test]
    fn test_line_without_colon() {
        assert_eq!(parse_property("garbage"), None);
    }
}
