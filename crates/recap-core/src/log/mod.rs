//! Line-oriented record log.
//!
//! A record log is a text file with one record per line:
//!
//! ```text
//! # recap record log v1
//! # fields: time_ms \t kind \t data
//! 0	session.join	{"entity_id":1,...}
//! 250	entity.movement	{"entity_id":7,"kind":"position","dx":0.5,...}
//! ```
//!
//! The kind is an external tag: payload JSON never carries it. Lines
//! starting with `#` are comments and blank lines are ignored.

pub mod parser;
pub mod writer;

pub use parser::{CURRENT_VERSION, ParseError, ParsedLine, detect_version, parse_line, parse_lines};
pub use writer::{WriteError, log_header, to_log_line, write_line, write_log};

/// The header line written at the top of every record log.
pub const LOG_HEADER: &str = "# recap record log v1";

/// The field comment line that follows the header.
pub const FIELD_COMMENT: &str = "# fields: time_ms \\t kind \\t data";

/// Header prefix used for version detection.
pub(crate) const HEADER_PREFIX: &str = "# recap record log v";
