pub mod squash;
pub mod stats;
pub mod verify;

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use recap_core::log::{ParseError, parse_lines};
use recap_core::{DecodeRegistry, ErrorCode, TimedRecord};

use crate::output::{CliError, OutputMode, render_error};

/// Path argument meaning "read standard input".
pub const STDIN_PATH: &str = "-";

/// Read a whole input file, or stdin for `-`.
fn read_input(path: &Path, output: OutputMode) -> anyhow::Result<String> {
    if path.as_os_str() == STDIN_PATH {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    if !path.exists() {
        render_error(
            output,
            &CliError::from_code(ErrorCode::InputNotFound, path.display()),
        )?;
        anyhow::bail!("input not found: {}", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read and parse a record log, decoding the kinds `registry` requires.
pub fn load_records(
    path: &Path,
    registry: &DecodeRegistry,
    output: OutputMode,
) -> anyhow::Result<Vec<TimedRecord>> {
    let text = read_input(path, output)?;
    match parse_lines(&text, registry) {
        Ok(records) => {
            tracing::debug!(path = %path.display(), records = records.len(), "record log loaded");
            Ok(records)
        }
        Err((line_no, err)) => {
            let code = match err {
                ParseError::VersionMismatch(_) => ErrorCode::UnsupportedLogVersion,
                _ => ErrorCode::LogParseFailed,
            };
            render_error(
                output,
                &CliError::from_code(code, format!("{}:{line_no}: {err}", path.display())),
            )?;
            anyhow::bail!("{}:{line_no}: {err}", path.display());
        }
    }
}
