//! Column name canonicalization.
//!
//! Every comparison between an expected column and a header cell goes through
//! [`normalize`] first, so that `"\u{feff} ID  Ticket "` and `"id ticket"`
//! compare equal.

const BOM: char = '\u{feff}';

/// Canonicalize a column name or raw header cell for comparison.
///
/// Strips a leading byte-order mark, lowercases, drops every character that is
/// neither alphanumeric nor whitespace and collapses whitespace runs into a
/// single space. The result carries no leading or trailing whitespace.
pub fn normalize(name: &str) -> String {
    let name = name.strip_prefix(BOM).unwrap_or(name);

    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize every cell of a header row, preserving order.
pub fn normalize_header<S: AsRef<str>>(header: &[S]) -> Vec<String> {
    header.iter().map(|cell| normalize(cell.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("  ID   Ticket "), "id ticket");
        assert_eq!(normalize("Data-Utilizzo."), "datautilizzo");
        assert_eq!(normalize("Ora (ingresso)"), "ora ingresso");
    }

    #[test]
    fn test_normalize_strips_bom() {
        assert_eq!(normalize("\u{feff}Dipendente"), "dipendente");
    }

    #[test]
    fn test_normalize_keeps_accented_letters() {
        assert_eq!(normalize("Tipologia Attività"), "tipologia attività");
    }

    #[test]
    fn test_normalize_punctuation_only() {
        assert_eq!(normalize(" -- "), "");
        assert_eq!(normalize("a - b"), "a b");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "\u{feff}Session ID",
            "  Creato\tda ",
            "Km.",
            "Ore lavoro (h)",
            "ÉVÉNEMENT",
            "",
            "a  -  b",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_normalize_header_preserves_order() {
        let header = ["B", " A "];
        assert_eq!(normalize_header(&header), vec!["b".to_string(), "a".to_string()]);
    }
}
