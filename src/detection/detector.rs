//! Header scoring against the signature registry.

use log::debug;
use serde::Serialize;

use super::fuzzy::match_normalized;
use super::normalize::{normalize, normalize_header};
use super::signature::{Signature, SignatureRegistry};
use crate::config::DetectionConfig;

/// Share of the confidence earned by required-column coverage.
pub const REQUIRED_WEIGHT: f64 = 70.0;
/// Share of the confidence earned by optional-column coverage.
pub const OPTIONAL_WEIGHT: f64 = 30.0;

/// Confidence of one candidate type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeScore {
    pub type_id: String,
    pub confidence: f64,
}

/// An expected column paired with the header cell that satisfied it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMatch {
    pub expected: String,
    pub found: String,
    pub position: usize,
}

/// Column-level breakdown for the winning signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchDetail {
    pub required_matches: Vec<ColumnMatch>,
    pub optional_matches: Vec<ColumnMatch>,
    pub unmatched_required: Vec<String>,
    pub unmatched_optional: Vec<String>,
    /// Header cells that satisfied none of the winning signature's columns.
    pub extra_columns: Vec<String>,
}

/// Outcome of classifying one header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub success: bool,
    pub detected_type: Option<String>,
    pub description: Option<String>,
    pub confidence: f64,
    /// Every type scoring above zero, best first. Ties keep registry order.
    pub scores: Vec<TypeScore>,
    pub raw_header: Vec<String>,
    pub normalized_header: Vec<String>,
    pub encoding: String,
    pub delimiter: Option<char>,
    pub match_detail: Option<MatchDetail>,
    pub error: Option<String>,
}

impl DetectionResult {
    /// A negative result for a header that could not be obtained.
    pub fn failed(encoding: &str, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            detected_type: None,
            description: None,
            confidence: 0.0,
            scores: Vec::new(),
            raw_header: Vec::new(),
            normalized_header: Vec::new(),
            encoding: encoding.to_string(),
            delimiter: None,
            match_detail: None,
            error: Some(reason.into()),
        }
    }

    pub fn score_of(&self, type_id: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.type_id == type_id).map(|s| s.confidence)
    }

    pub fn band(&self, config: &DetectionConfig) -> ConfidenceBand {
        ConfidenceBand::classify(self.confidence, config)
    }
}

/// Advisory routing bands. The detector never acts on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    AutoAccept,
    NeedsConfirmation,
    ManualMapping,
}

impl ConfidenceBand {
    pub fn classify(confidence: f64, config: &DetectionConfig) -> Self {
        if confidence >= config.auto_accept_threshold {
            ConfidenceBand::AutoAccept
        } else if confidence >= config.confirm_threshold {
            ConfidenceBand::NeedsConfirmation
        } else {
            ConfidenceBand::ManualMapping
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBand::AutoAccept => "automatic",
            ConfidenceBand::NeedsConfirmation => "needs confirmation",
            ConfidenceBand::ManualMapping => "manual mapping",
        }
    }
}

/// Per-column scan result: the expected name and the first header position
/// satisfying it.
struct ColumnScan<'a> {
    expected: &'a str,
    position: Option<usize>,
}

fn scan_columns<'a>(columns: &'a [String], normalized_header: &[String]) -> Vec<ColumnScan<'a>> {
    columns
        .iter()
        .map(|expected| {
            let wanted = normalize(expected);
            let position =
                normalized_header.iter().position(|cell| match_normalized(cell, &wanted).is_some());
            ColumnScan { expected, position }
        })
        .collect()
}

fn hits(scan: &[ColumnScan<'_>]) -> usize {
    scan.iter().filter(|c| c.position.is_some()).count()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Confidence of `signature` for an already-normalized header.
pub fn score_signature(signature: &Signature, normalized_header: &[String]) -> f64 {
    let required = scan_columns(&signature.required_columns, normalized_header);
    let required_hits = hits(&required);
    if required_hits == 0 || required.is_empty() {
        return 0.0;
    }

    let optional = scan_columns(&signature.optional_columns, normalized_header);
    let required_score = required_hits as f64 / required.len() as f64 * REQUIRED_WEIGHT;
    let optional_score = if optional.is_empty() {
        0.0
    } else {
        hits(&optional) as f64 / optional.len() as f64 * OPTIONAL_WEIGHT
    };

    round1(required_score + optional_score)
}

fn match_detail(
    signature: &Signature,
    raw_header: &[String],
    normalized_header: &[String],
) -> MatchDetail {
    let mut detail = MatchDetail::default();
    let mut used = vec![false; raw_header.len()];

    for (scan, matches, unmatched) in [
        (
            scan_columns(&signature.required_columns, normalized_header),
            &mut detail.required_matches,
            &mut detail.unmatched_required,
        ),
        (
            scan_columns(&signature.optional_columns, normalized_header),
            &mut detail.optional_matches,
            &mut detail.unmatched_optional,
        ),
    ] {
        for column in scan {
            match column.position {
                Some(position) => {
                    used[position] = true;
                    matches.push(ColumnMatch {
                        expected: column.expected.to_string(),
                        found: raw_header[position].clone(),
                        position,
                    });
                }
                None => unmatched.push(column.expected.to_string()),
            }
        }
    }

    detail.extra_columns = raw_header
        .iter()
        .zip(used)
        .filter(|(_, used)| !used)
        .map(|(cell, _)| cell.clone())
        .collect();

    detail
}

/// Classify a header row against every signature in `registry`.
///
/// The encoding and delimiter fields are left for the caller to fill in; use
/// [`crate::detection::detect_file`] to classify a file on disk.
pub fn detect<S: AsRef<str>>(header: &[S], registry: &SignatureRegistry) -> DetectionResult {
    let raw_header: Vec<String> = header.iter().map(|c| c.as_ref().to_string()).collect();

    if raw_header.iter().all(|c| normalize(c).is_empty()) {
        let mut result = DetectionResult::failed("UTF-8", "Header is empty");
        result.raw_header = raw_header;
        return result;
    }

    let normalized_header = normalize_header(&raw_header);

    let mut scores: Vec<TypeScore> = registry
        .iter()
        .filter_map(|signature| {
            let confidence = score_signature(signature, &normalized_header);
            debug!("Signature {} scored {:.1}", signature.type_id, confidence);
            (confidence > 0.0)
                .then(|| TypeScore { type_id: signature.type_id.clone(), confidence })
        })
        .collect();

    // sort_by is stable, so equal scores keep registry order
    scores.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let winner = scores.first().and_then(|best| registry.get(&best.type_id));

    let (detected_type, description, confidence, match_detail) = match winner {
        Some(signature) => (
            Some(signature.type_id.clone()),
            Some(signature.description.clone()),
            scores[0].confidence,
            Some(match_detail(signature, &raw_header, &normalized_header)),
        ),
        None => (None, None, 0.0, None),
    };

    let success = detected_type.is_some();
    DetectionResult {
        success,
        detected_type,
        description,
        confidence,
        scores,
        raw_header,
        normalized_header,
        encoding: "UTF-8".to_string(),
        delimiter: None,
        match_detail,
        error: (!success).then(|| "No signature shares a required column with the header".to_string()),
    }
}
