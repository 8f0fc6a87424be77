//! File-level access for CSV exports and calendar text.

use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::encoding::{decode_auto, Charset};

/// Why a source file could not be turned into text.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Cannot read {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error("No header line in {}", .0.display())]
    EmptyHeader(PathBuf),
}

/// Lines containing these markers are pivot-table summaries, not data.
const SUMMARY_MARKERS: &[&str] = &["Somma di Ore", "Etichette"];
const TOTAL_MARKER: &str = "Totale";

/// Decoded contents of a file.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub text: String,
    pub charset: Charset,
}

/// First row of a CSV export, split into cells.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvHeader {
    pub cells: Vec<String>,
    pub delimiter: char,
    pub charset: Charset,
}

/// A whole CSV export with summary rows filtered out.
#[derive(Debug, Clone, Serialize)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub delimiter: char,
    pub encoding: Charset,
}

/// Read and decode a file, distinguishing absence from other failures.
pub fn read_text(path: &Path) -> Result<SourceText, SourceError> {
    if !path.exists() {
        warn!("Source file {} does not exist", path.display());
        return Err(SourceError::NotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|e| {
        warn!("Failed to read {}: {}", path.display(), e);
        SourceError::Unreadable { path: path.to_path_buf(), reason: e.to_string() }
    })?;

    let (text, charset) = decode_auto(&bytes);
    Ok(SourceText { text, charset })
}

/// Pick `;` when it outnumbers `,` in `line`, otherwise `,`.
pub fn select_delimiter(line: &str) -> char {
    let commas = line.matches(',').count();
    let semicolons = line.matches(';').count();
    if semicolons > commas { ';' } else { ',' }
}

/// Split one delimited line into cells, honouring quotes.
pub fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter as u8)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(|c| c.to_string()).collect(),
        Some(Err(e)) => {
            debug!("CSV split failed ({}), falling back to plain split", e);
            line.split(delimiter).map(|c| c.to_string()).collect()
        }
        None => Vec::new(),
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(|l| l.trim_end_matches('\r')).find(|l| !l.trim().is_empty())
}

/// Read the header row of a CSV file.
pub fn read_header(path: &Path) -> Result<CsvHeader, SourceError> {
    let source = read_text(path)?;
    let line = first_line(&source.text).ok_or_else(|| SourceError::EmptyHeader(path.to_path_buf()))?;

    let delimiter = select_delimiter(line);
    debug!("Using delimiter {:?} for {}", delimiter, path.display());

    let cells = split_line(line, delimiter);
    if cells.iter().all(|c| c.trim().is_empty()) {
        return Err(SourceError::EmptyHeader(path.to_path_buf()));
    }

    Ok(CsvHeader { cells, delimiter, charset: source.charset })
}

fn is_summary_row(row: &[String]) -> bool {
    row.iter().any(|cell| SUMMARY_MARKERS.iter().any(|m| cell.contains(m)))
        || row.get(1).is_some_and(|cell| cell.contains(TOTAL_MARKER))
}

/// Read a whole CSV export. Rows are padded or truncated to the header width.
pub fn read_table(path: &Path) -> Result<CsvTable, SourceError> {
    let source = read_text(path)?;
    let line = first_line(&source.text).ok_or_else(|| SourceError::EmptyHeader(path.to_path_buf()))?;
    let delimiter = select_delimiter(line);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter as u8)
        .from_reader(source.text.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(Ok(record)) => record.iter().map(|c| c.to_string()).collect(),
        Some(Err(e)) => {
            return Err(SourceError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
        None => return Err(SourceError::EmptyHeader(path.to_path_buf())),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping malformed CSV row: {}", e);
                continue;
            }
        };

        let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        if row.iter().all(|c| c.trim().is_empty()) || is_summary_row(&row) {
            continue;
        }
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(CsvTable { headers, rows, delimiter, encoding: source.charset })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_select_delimiter() {
        assert_eq!(select_delimiter("a;b;c"), ';');
        assert_eq!(select_delimiter("a,b,c"), ',');
        assert_eq!(select_delimiter("a;b,c"), ',');
        assert_eq!(select_delimiter("single"), ',');
    }

    #[test]
    fn test_split_line_quotes() {
        assert_eq!(split_line("\"Cognome, Nome\";Data", ';'), vec!["Cognome, Nome", "Data"]);
        assert_eq!(split_line("\"a,b\",c", ','), vec!["a,b", "c"]);
    }

    #[test]
    fn test_read_header_semicolon_bom() {
        let file = write_temp(b"\xEF\xBB\xBFDipendente;Ora ingresso;Data\n1;2;3\n");
        let header = read_header(file.path()).unwrap();
        assert_eq!(header.delimiter, ';');
        assert_eq!(header.cells, vec!["Dipendente", "Ora ingresso", "Data"]);
        assert_eq!(header.charset, Charset::Utf8);
    }

    #[test]
    fn test_read_header_missing_file() {
        let err = read_header(Path::new("/nonexistent/dir/none.csv")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn test_read_header_empty_file() {
        let file = write_temp(b"\n\n");
        assert!(matches!(read_header(file.path()), Err(SourceError::EmptyHeader(_))));
    }

    #[test]
    fn test_read_table_filters_summary_rows() {
        let content = "Tecnico,Totale ore,Veicolo\n\
                       Alex,3,Clio\n\
                       Somma di Ore,10,\n\
                       Davide,Totale,\n\
                       Marco,2\n";
        let file = write_temp(content.as_bytes());
        let table = read_table(file.path()).unwrap();
        assert_eq!(table.headers, vec!["Tecnico", "Totale ore", "Veicolo"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["Alex".to_string(), "3".to_string(), "Clio".to_string()],
                vec!["Marco".to_string(), "2".to_string(), String::new()],
            ]
        );
    }
}
