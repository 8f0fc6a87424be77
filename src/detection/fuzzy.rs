//! Fuzzy equivalence between column names.

use super::normalize::normalize;

/// Concept groups whose members denote the same column meaning.
///
/// Two names are equivalent under a group when each of them contains at least
/// one token of that group.
pub const SYNONYM_GROUPS: &[(&str, &[&str])] = &[
    ("id", &["id", "identificativo", "codice"]),
    ("ticket", &["ticket", "richiesta"]),
    ("tecnico", &["tecnico", "operatore", "creato da"]),
    ("data", &["data", "date", "giorno"]),
    ("ora", &["ora", "orario", "time"]),
    ("durata", &["durata", "duration", "tempo"]),
    ("cliente", &["cliente", "azienda", "client"]),
    ("auto", &["auto", "veicolo", "macchina"]),
    ("permesso", &["permesso", "ferie", "congedo"]),
];

/// How two column names were found to be equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Substring,
    Synonym(&'static str),
}

/// Decide whether two column names denote the same concept.
///
/// Symmetric in its arguments. Names that normalize to the empty string never
/// match.
pub fn matches(a: &str, b: &str) -> bool {
    match_kind(a, b).is_some()
}

/// Like [`matches`], but reports which rule succeeded first.
pub fn match_kind(a: &str, b: &str) -> Option<MatchKind> {
    let a = normalize(a);
    let b = normalize(b);
    match_normalized(&a, &b)
}

/// Comparison on names that are already normalized.
pub(crate) fn match_normalized(a: &str, b: &str) -> Option<MatchKind> {
    if a.is_empty() || b.is_empty() {
        return None;
    }

    if a == b {
        return Some(MatchKind::Exact);
    }

    if a.contains(b) || b.contains(a) {
        return Some(MatchKind::Substring);
    }

    SYNONYM_GROUPS
        .iter()
        .find(|(_, tokens)| {
            tokens.iter().any(|t| a.contains(t)) && tokens.iter().any(|t| b.contains(t))
        })
        .map(|(concept, _)| MatchKind::Synonym(concept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("ID Ticket", "id ticket" ; "exact after normalization")]
    #[test_case("Data", "Data utilizzo" ; "substring")]
    #[test_case("Creato da", "Tecnico" ; "tecnico synonym")]
    #[test_case("Codice", "Session ID" ; "id synonym")]
    #[test_case("Azienda", "Cliente" ; "cliente synonym")]
    #[test_case("Durata", "Duration" ; "durata synonym")]
    #[test_case("Start time", "Ora ingresso" ; "ora synonym")]
    #[test_case("Ferie", "Tipo permesso" ; "permesso synonym")]
    fn test_matching_pairs(a: &str, b: &str) {
        assert!(matches(a, b));
        assert!(matches(b, a));
    }

    #[test_case("Nome", "Dipendente")]
    #[test_case("Valore", "Tipo permesso")]
    #[test_case("Km", "Veicolo")]
    #[test_case("Group", "Participants")]
    fn test_unrelated_pairs(a: &str, b: &str) {
        assert!(!matches(a, b));
    }

    #[test]
    fn test_match_kind_order() {
        assert_eq!(match_kind("Durata", "durata"), Some(MatchKind::Exact));
        assert_eq!(match_kind("Data", "Data fine"), Some(MatchKind::Substring));
        assert_eq!(match_kind("Veicolo", "Macchina"), Some(MatchKind::Synonym("auto")));
    }

    #[test]
    fn test_empty_never_matches() {
        assert!(!matches("", "Data"));
        assert!(!matches("---", "Data"));
        assert!(!matches("", ""));
    }

    #[test]
    fn test_symmetry_over_sample() {
        let names = [
            "ID Ticket",
            "Creato da",
            "Tipologia attività",
            "Durata",
            "Session ID",
            "Tecnico",
            "Cliente",
            "Data utilizzo",
            "Veicolo",
            "Nome",
            "Valore",
            "Note",
            "Start time",
            "Group",
            "",
        ];
        for a in names {
            for b in names {
                assert_eq!(matches(a, b), matches(b, a), "asymmetric: {:?} / {:?}", a, b);
            }
        }
    }
}
