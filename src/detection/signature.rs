//! Known CSV column signatures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::normalize::normalize;

/// Problems found while assembling a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Signature '{0}' has no required columns")]
    NoRequiredColumns(String),
    #[error("Signature '{type_id}' has column '{column}' with no letters or digits")]
    BlankColumn { type_id: String, column: String },
    #[error("Signature '{0}' is defined more than once")]
    DuplicateType(String),
}

/// A named rule set identifying one CSV export type by its header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub type_id: String,
    #[serde(alias = "required")]
    pub required_columns: Vec<String>,
    #[serde(default, alias = "optional")]
    pub optional_columns: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl Signature {
    pub fn new(type_id: &str, required: &[&str], optional: &[&str], description: &str) -> Self {
        Self {
            type_id: type_id.to_string(),
            required_columns: required.iter().map(|c| c.to_string()).collect(),
            optional_columns: optional.iter().map(|c| c.to_string()).collect(),
            description: description.to_string(),
        }
    }
}

/// Read-only view of a signature, used for "supported types" listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeInfo {
    pub type_id: String,
    pub description: String,
    pub required_columns: Vec<String>,
    pub optional_columns: Vec<String>,
}

/// Immutable set of signatures, iterated in definition order.
#[derive(Debug, Clone)]
pub struct SignatureRegistry {
    signatures: Vec<Signature>,
}

impl SignatureRegistry {
    /// Build a registry, rejecting signatures without required columns,
    /// columns that normalize to nothing and duplicate type ids.
    pub fn new(signatures: Vec<Signature>) -> Result<Self, SignatureError> {
        for (i, sig) in signatures.iter().enumerate() {
            if sig.required_columns.is_empty() {
                return Err(SignatureError::NoRequiredColumns(sig.type_id.clone()));
            }
            let mut columns = sig.required_columns.iter().chain(&sig.optional_columns);
            if let Some(column) = columns.find(|c| normalize(c).is_empty()) {
                return Err(SignatureError::BlankColumn {
                    type_id: sig.type_id.clone(),
                    column: column.clone(),
                });
            }
            if signatures[..i].iter().any(|other| other.type_id == sig.type_id) {
                return Err(SignatureError::DuplicateType(sig.type_id.clone()));
            }
        }
        Ok(Self { signatures })
    }

    /// The built-in registry extended with additional signatures.
    pub fn with_extra(extra: Vec<Signature>) -> Result<Self, SignatureError> {
        let mut signatures = builtin_signatures();
        signatures.extend(extra);
        Self::new(signatures)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.signatures.iter()
    }

    pub fn get(&self, type_id: &str) -> Option<&Signature> {
        self.signatures.iter().find(|s| s.type_id == type_id)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Description and column lists of every registered type.
    pub fn supported_types(&self) -> Vec<TypeInfo> {
        self.signatures
            .iter()
            .map(|s| TypeInfo {
                type_id: s.type_id.clone(),
                description: s.description.clone(),
                required_columns: s.required_columns.clone(),
                optional_columns: s.optional_columns.clone(),
            })
            .collect()
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self { signatures: builtin_signatures() }
    }
}

// Date columns are optional everywhere: a bare "Data" column is too generic
// to identify a type on its own.
fn builtin_signatures() -> Vec<Signature> {
    vec![
        Signature::new(
            "attivita.csv",
            &["ID Ticket", "Creato da", "Tipologia attività"],
            &["Durata", "Descrizione", "Azienda", "Contratto"],
            "Technician activity reports",
        ),
        Signature::new(
            "timbrature.csv",
            &["Dipendente", "Ora ingresso"],
            &["Data", "Ora uscita", "Pause", "Ore lavoro"],
            "Attendance clock-in records",
        ),
        Signature::new(
            "auto.csv",
            &["Tecnico", "Veicolo"],
            &["Data utilizzo", "Km", "Destinazione", "Note"],
            "Company vehicle usage",
        ),
        Signature::new(
            "teamviewer_bait.csv",
            &["Session ID", "Tecnico", "Cliente"],
            &["Durata", "Start time", "End time"],
            "Individual TeamViewer sessions",
        ),
        Signature::new(
            "teamviewer_gruppo.csv",
            &["Session ID", "Group"],
            &["Participants", "Duration"],
            "Group TeamViewer sessions",
        ),
        Signature::new(
            "permessi.csv",
            &["Dipendente", "Tipo permesso"],
            &["Data inizio", "Data fine", "Stato", "Note"],
            "Leave and permit requests",
        ),
        Signature::new(
            "calendario.csv",
            &["Evento"],
            &["Data", "Ora", "Tecnico", "Cliente", "Descrizione"],
            "Appointment calendar",
        ),
    ]
}
