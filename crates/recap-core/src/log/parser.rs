//! Record log parser.
//!
//! Data lines are split on exactly two tab characters (three fields). The
//! payload is decoded into a typed [`Record`] only if the registry requires
//! its kind; otherwise it is kept as [`Record::Opaque`] after a JSON syntax
//! check.

use tracing::warn;

use super::HEADER_PREFIX;
use crate::record::{OpaqueRecord, Record, RecordKind, TimedRecord};
use crate::registry::DecodeRegistry;

/// The record log format version understood by this build.
pub const CURRENT_VERSION: u32 = 1;

const FIELD_COUNT: usize = 3;

/// Errors that can occur while parsing one record log line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Line has the wrong number of tab-separated fields.
    #[error("expected {expected} tab-separated fields, found {found}")]
    FieldCount { found: usize, expected: usize },

    /// The `time_ms` field is not a valid i64.
    #[error("invalid time_ms (not i64): '{0}'")]
    InvalidTimestamp(String),

    /// The kind is not a known dotted record kind.
    #[error("unknown record kind: '{0}'")]
    UnknownKind(String),

    /// The data field is not valid JSON.
    #[error("invalid data JSON: {0}")]
    InvalidDataJson(String),

    /// The data JSON does not match the schema for its kind.
    #[error("data schema mismatch for {kind}: {details}")]
    DataSchemaMismatch { kind: String, details: String },

    /// The log was written by a newer format version.
    #[error("record log version mismatch: {0}")]
    VersionMismatch(String),
}

/// The result of parsing one line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// A comment line, `#` prefix included.
    Comment(String),
    Blank,
    Record(Box<TimedRecord>),
}

/// Detect the format version from a header line.
///
/// # Errors
///
/// Returns a human-readable message if the header is malformed or names a
/// version newer than [`CURRENT_VERSION`].
pub fn detect_version(first_line: &str) -> Result<u32, String> {
    let line = first_line.trim();
    let Some(version_str) = line.strip_prefix(HEADER_PREFIX) else {
        return Err(format!(
            "invalid record log header: expected '{HEADER_PREFIX}N', got '{line}'"
        ));
    };
    let version: u32 = version_str.parse().map_err(|_| {
        format!("invalid version number '{version_str}' in record log header")
    })?;
    if version > CURRENT_VERSION {
        return Err(format!(
            "record log version {version} is newer than this build of recap \
             (supports up to v{CURRENT_VERSION}); upgrade recap to read it"
        ));
    }
    Ok(version)
}

/// Parse a single record log line.
///
/// # Errors
///
/// Returns a [`ParseError`] variant for each validation failure.
pub fn parse_line(line: &str, registry: &DecodeRegistry) -> Result<ParsedLine, ParseError> {
    let trimmed = line.trim_end_matches('\n').trim_end_matches('\r');

    if trimmed.starts_with('#') {
        return Ok(ParsedLine::Comment(trimmed.to_string()));
    }
    if trimmed.trim().is_empty() {
        return Ok(ParsedLine::Blank);
    }

    let fields: Vec<&str> = trimmed.split('\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::FieldCount {
            found: fields.len(),
            expected: FIELD_COUNT,
        });
    }

    let time: i64 = fields[0]
        .parse()
        .map_err(|_| ParseError::InvalidTimestamp(fields[0].to_string()))?;

    let kind: RecordKind = fields[1]
        .parse()
        .map_err(|_| ParseError::UnknownKind(fields[1].to_string()))?;

    let value: serde_json::Value = serde_json::from_str(fields[2])
        .map_err(|e| ParseError::InvalidDataJson(e.to_string()))?;

    let record = if registry.requires(kind) {
        Record::from_value(kind, value).map_err(|e| ParseError::DataSchemaMismatch {
            kind: kind.to_string(),
            details: e.source.to_string(),
        })?
    } else {
        Record::Opaque(OpaqueRecord { kind, data: value })
    };

    Ok(ParsedLine::Record(Box::new(TimedRecord::new(time, record))))
}

/// Parse a whole record log, skipping comments and blanks.
///
/// Unknown kinds are skipped with a warning so that logs from newer writers
/// stay readable. If a header line is present its version is checked first.
///
/// # Errors
///
/// Returns `(line_number, ParseError)` for the first malformed line. Line
/// numbers are 1-indexed.
pub fn parse_lines(
    input: &str,
    registry: &DecodeRegistry,
) -> Result<Vec<TimedRecord>, (usize, ParseError)> {
    let mut records = Vec::new();
    let mut version_checked = false;

    for (i, line) in input.lines().enumerate() {
        let line_no = i + 1;

        if !version_checked && line.trim_start().starts_with(HEADER_PREFIX) {
            version_checked = true;
            if let Err(msg) = detect_version(line) {
                return Err((line_no, ParseError::VersionMismatch(msg)));
            }
            continue;
        }

        match parse_line(line, registry) {
            Ok(ParsedLine::Record(record)) => records.push(*record),
            Ok(ParsedLine::Comment(_) | ParsedLine::Blank) => {}
            Err(ParseError::UnknownKind(raw)) => {
                warn!(line = line_no, kind = %raw, "skipping line with unknown record kind");
            }
            Err(e) => return Err((line_no, e)),
        }
    }
    Ok(records)
}
