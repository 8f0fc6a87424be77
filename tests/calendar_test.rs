use anyhow::Result;
use ducktape_ingest::calendar::{
    parse_calendar_file, parse_calendar_text, DurationUnit, ParseStatus, ResolutionSource, Roster,
};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

const OUTLOOK_EXPORT: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Microsoft Corporation//Outlook 16.0 MIMEDIR//EN\r\n\
BEGIN:VEVENT\r\n\
ATTENDEE;CN=\"Jane Roe\";RSVP=TRUE:mailto:jane@example.com\r\n\
SUMMARY:Acme - ticket\r\n\
DTSTART:20250801T090000\r\n\
DTEND:20250801T110000\r\n\
LOCATION:Milano\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Ferie Davide\r\n\
DTSTART;VALUE=DATE:20250801\r\n\
DTEND;VALUE=DATE:20250803\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
ATTENDEE;CN=Sala Riunioni:mailto:room@example.com\r\n\
SUMMARY:Beta Spa - intervento Marco Birocchi TICKET#8812\r\n\
DTSTART:20250804T140000\r\n\
DTEND:20250804T153000\r\n\
LOCATION:Roma\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Riunione\r\n\
DESCRIPTION:Allineamento settimanale con il\r\n\x20 team tecnico\r\n\
DTSTART:20250805T100000\r\n\
DTEND:garbage\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:never closed\r\n\
END:VCALENDAR\r\n";

#[test]
fn test_attendee_block() {
    let text = "BEGIN:VEVENT\n\
                ATTENDEE;CN=\"Jane Roe\":mailto:x\n\
                SUMMARY:Acme - ticket\n\
                DTSTART:20250801T090000\n\
                DTEND:20250801T110000\n\
                END:VEVENT\n";
    let batch = parse_calendar_text(text, &Roster::default());
    assert_eq!(batch.records.len(), 1);

    let record = &batch.records[0];
    assert_eq!(record.responsible_party, "Jane Roe");
    assert_eq!(record.counterpart, "Acme");
    assert!(!record.is_all_day);
    assert_eq!(record.duration, Some(2.0));
}

#[test]
fn test_all_day_block() {
    let text = "BEGIN:VEVENT\nSUMMARY:Ponte\nDTSTART:20250801\nDTEND:20250803\nEND:VEVENT\n";
    let batch = parse_calendar_text(text, &Roster::default());
    let record = &batch.records[0];
    assert!(record.is_all_day);
    assert_eq!(record.duration, Some(2.0));
    assert_eq!(record.duration_unit, Some(DurationUnit::Days));
    assert_eq!(batch.total_days, 2.0);
}

#[test]
fn test_continuation_line_joins_value() {
    let text = "BEGIN:VEVENT\nSUMMARY:Acme\nDESCRIPTION:Sostituzione\n  disco\nEND:VEVENT\n";
    let batch = parse_calendar_text(text, &Roster::default());
    assert_eq!(batch.records[0].notes, "Sostituzionedisco");
}

#[test]
fn test_outlook_export() {
    let batch = parse_calendar_text(OUTLOOK_EXPORT, &Roster::default());
    assert_eq!(batch.parse_status, ParseStatus::Ok);
    assert_eq!(batch.records.len(), 4);

    let parties: Vec<&str> =
        batch.records.iter().map(|r| r.responsible_party.as_str()).collect();
    assert_eq!(parties, vec!["Jane Roe", "Davide Cestone", "Marco Birocchi", "Unassigned"]);

    let sources: Vec<ResolutionSource> = batch.records.iter().map(|r| r.resolved_by).collect();
    assert_eq!(
        sources,
        vec![
            ResolutionSource::Attendee,
            ResolutionSource::LeaveRequest,
            ResolutionSource::Roster,
            ResolutionSource::Unassigned
        ]
    );

    let notes: Vec<&str> = batch.records.iter().map(|r| r.notes.as_str()).collect();
    assert_eq!(
        notes,
        vec!["", "Leave", "Ticket #8812", "Allineamento settimanale con ilteam tecnico"]
    );

    assert_eq!(batch.records[2].counterpart, "Beta Spa");
    assert_eq!(batch.records[2].duration, Some(1.5));
    assert_eq!(batch.records[3].duration, None);
    assert!(batch.records[3].start.is_some());
    assert!(batch.records[3].end.is_none());

    assert_eq!(batch.total_hours, 3.5);
    assert_eq!(batch.total_days, 2.0);
    assert_eq!(batch.total_duration, 5.5);
    assert_eq!(batch.distinct_responsible_parties.len(), 3);
    assert!(!batch.distinct_responsible_parties.contains("Unassigned"));
    assert_eq!(
        batch.distinct_locations.iter().cloned().collect::<Vec<_>>(),
        vec!["Milano".to_string(), "Roma".to_string()]
    );
    assert_eq!(batch.distinct_counterparts.len(), 4);
}

#[test]
fn test_calendar_file_windows1252() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        b"BEGIN:VEVENT\nSUMMARY:Caff\xE8 Rossi - visita\nDTSTART:20250801T090000\nDTEND:20250801T093000\nEND:VEVENT\n",
    )?;

    let batch = parse_calendar_file(file.path(), &Roster::default());
    assert_eq!(batch.parse_status, ParseStatus::Ok);
    assert_eq!(batch.records[0].counterpart, "Caffè Rossi");
    assert_eq!(batch.records[0].duration, Some(0.5));
    Ok(())
}

#[test]
fn test_calendar_file_missing() {
    let batch =
        parse_calendar_file(std::path::Path::new("/no/such/calendario.ics"), &Roster::default());
    assert_eq!(batch.parse_status, ParseStatus::FileNotFound);
    assert!(batch.records.is_empty());
    assert_eq!(batch.total_duration, 0.0);
}

#[test]
fn test_batch_serializes_to_json() -> Result<()> {
    let batch = parse_calendar_text(OUTLOOK_EXPORT, &Roster::default());
    let json = serde_json::to_value(&batch)?;
    assert_eq!(json["parse_status"], "ok");
    assert_eq!(json["records"][0]["start"]["date"], "2025-08-01");
    assert_eq!(json["records"][0]["start"]["time"], "09:00");
    assert_eq!(json["records"][1]["duration_unit"], "days");
    Ok(())
}
