//! Record log writer.
//!
//! Payloads are written as compact JSON on a single line; the same record
//! always serializes to the same bytes.

use super::{FIELD_COMMENT, LOG_HEADER};
use crate::record::TimedRecord;

/// Errors that can occur while writing records.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The serialized JSON payload contained a literal newline.
    #[error("JSON payload contains a literal newline; records must fit on one line")]
    NewlineInPayload,

    /// Failed to serialize the payload to JSON.
    #[error("failed to serialize record data: {0}")]
    SerializeData(#[from] serde_json::Error),
}

/// Header block (header plus field comment) for a new record log.
#[must_use]
pub fn log_header() -> String {
    format!("{LOG_HEADER}\n{FIELD_COMMENT}\n")
}

/// Serialize one record to a log line, without trailing newline.
///
/// # Errors
///
/// Returns [`WriteError::NewlineInPayload`] if the JSON contains a newline,
/// or [`WriteError::SerializeData`] if the payload fails to serialize.
pub fn to_log_line(record: &TimedRecord) -> Result<String, WriteError> {
    let data_json = serde_json::to_string(&record.record)?;
    if data_json.contains('\n') {
        return Err(WriteError::NewlineInPayload);
    }
    Ok(format!("{}\t{}\t{}", record.time, record.kind(), data_json))
}

/// Like [`to_log_line`], with a trailing newline.
///
/// # Errors
///
/// Same as [`to_log_line`].
pub fn write_line(record: &TimedRecord) -> Result<String, WriteError> {
    let mut line = to_log_line(record)?;
    line.push('\n');
    Ok(line)
}

/// Serialize a full log: header block followed by one line per record.
///
/// # Errors
///
/// Same as [`to_log_line`], for the first record that fails.
pub fn write_log<'a>(
    records: impl IntoIterator<Item = &'a TimedRecord>,
) -> Result<String, WriteError> {
    let mut out = log_header();
    for record in records {
        out.push_str(&write_line(record)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::parser::{ParsedLine, parse_line, parse_lines};
    use crate::record::{ChatData, OpaqueRecord, Record, RecordKind, SetSlotData};
    use crate::registry::DecodeRegistry;

    fn chat(time: i64, message: &str) -> TimedRecord {
        TimedRecord::new(
            time,
            Record::Chat(ChatData {
                message: message.to_string(),
                position: 1,
            }),
        )
    }

    #[test]
    fn header_block_has_two_lines() {
        let header = log_header();
        assert_eq!(header.lines().count(), 2);
        assert!(header.starts_with(LOG_HEADER));
    }

    #[test]
    fn line_layout() {
        let line = to_log_line(&chat(12, "hi")).expect("write");
        assert_eq!(line, "12\tchat.message\t{\"message\":\"hi\",\"position\":1}");
        assert!(write_line(&chat(12, "hi")).expect("write").ends_with('\n'));
    }

    #[test]
    fn embedded_newline_is_escaped() {
        // serde_json escapes control characters, so a newline in a string
        // never reaches the line.
        let line = to_log_line(&chat(1, "two\nlines")).expect("write");
        assert!(!line.contains('\n'));
        let parsed = parse_line(&line, &DecodeRegistry::decode_all()).expect("parse");
        assert_eq!(parsed, ParsedLine::Record(Box::new(chat(1, "two\nlines"))));
    }

    #[test]
    fn opaque_payload_written_verbatim() {
        let record = TimedRecord::new(
            5,
            Record::Opaque(OpaqueRecord {
                kind: RecordKind::PluginMessage,
                data: serde_json::json!({"channel": "x", "unknown": [1, 2]}),
            }),
        );
        let line = to_log_line(&record).expect("write");
        assert!(line.starts_with("5\tplugin.message\t"));
        assert!(line.contains("\"unknown\":[1,2]"));
    }

    #[test]
    fn written_log_reads_back() {
        let records = vec![
            chat(0, "a"),
            TimedRecord::new(
                3,
                Record::SetSlot(SetSlotData {
                    window_id: 0,
                    slot: 36,
                    item: None,
                }),
            ),
        ];
        let text = write_log(&records).expect("write");
        let back = parse_lines(&text, &DecodeRegistry::decode_all()).expect("parse");
        assert_eq!(back, records);
    }
}
