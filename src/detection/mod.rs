//! CSV type detection from header signatures.
//!
//! Exports arrive with arbitrary file names, so the type of a CSV file is
//! recovered from its header row alone: each registered [`Signature`] is
//! scored by how many of its required and optional columns the header
//! covers, and the best-scoring type wins.

use log::{info, warn};
use std::path::Path;

mod detector;
mod fuzzy;
mod normalize;
mod signature;

pub use detector::*;
pub use fuzzy::{match_kind, matches, MatchKind, SYNONYM_GROUPS};
pub use normalize::{normalize, normalize_header};
pub use signature::*;

use crate::encoding::Charset;
use crate::source::read_header;

/// Classify the CSV file at `path`.
///
/// Never fails: a missing or unreadable file produces a result with
/// `success == false` and the reason in `error`.
pub fn detect_file(path: &Path, registry: &SignatureRegistry) -> DetectionResult {
    let header = match read_header(path) {
        Ok(header) => header,
        Err(e) => {
            warn!("Cannot detect type of {}: {}", path.display(), e);
            return DetectionResult::failed(Charset::Utf8.name(), e.to_string());
        }
    };

    let mut result = detect(&header.cells, registry);
    result.encoding = header.charset.name().to_string();
    result.delimiter = Some(header.delimiter);

    match &result.detected_type {
        Some(type_id) => {
            info!("{} detected as {} ({:.1}%)", path.display(), type_id, result.confidence)
        }
        None => info!("{} matches no known CSV type", path.display()),
    }

    result
}

