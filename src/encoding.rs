//! Charset detection and decoding for exported files.
//!
//! Upstream tools write a mix of UTF-8, UTF-16 and Windows single-byte
//! codepages. Detection only picks among those candidates and falls back to
//! UTF-8 when there is nothing to go on.

use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use serde::Serialize;
use std::fmt;

const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Bytes with no mapping in Windows-1252.
const CP1252_UNDEFINED: &[u8] = &[0x81, 0x8D, 0x8F, 0x90, 0x9D];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Charset {
    Utf8,
    Utf16Le,
    Utf16Be,
    Windows1252,
    Iso8859_1,
}

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Windows1252 => "Windows-1252",
            Charset::Iso8859_1 => "ISO-8859-1",
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the charset of `bytes` from the supported candidates.
pub fn detect_encoding(bytes: &[u8]) -> Charset {
    if bytes.starts_with(UTF16_LE_BOM) {
        return Charset::Utf16Le;
    }
    if bytes.starts_with(UTF16_BE_BOM) {
        return Charset::Utf16Be;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return Charset::Utf8;
    }
    if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
        return Charset::Iso8859_1;
    }
    Charset::Windows1252
}

/// Decode `bytes` as `charset`, dropping any byte-order mark.
///
/// Malformed sequences are replaced rather than rejected.
pub fn decode(bytes: &[u8], charset: Charset) -> String {
    let text = match charset {
        Charset::Utf8 => UTF_8.decode(bytes).0.into_owned(),
        Charset::Utf16Le => UTF_16LE.decode(bytes).0.into_owned(),
        Charset::Utf16Be => UTF_16BE.decode(bytes).0.into_owned(),
        Charset::Windows1252 => WINDOWS_1252.decode(bytes).0.into_owned(),
        Charset::Iso8859_1 => encoding_rs::mem::decode_latin1(bytes).into_owned(),
    };

    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Detect and decode in one step.
pub fn decode_auto(bytes: &[u8]) -> (String, Charset) {
    let charset = detect_encoding(bytes);
    log::debug!("Detected encoding {}", charset);
    (decode(bytes, charset), charset)
}
