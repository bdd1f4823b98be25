//! `recap verify`: check that a squashed log replays to the same state as
//! its source.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use recap_core::{ErrorCode, RecapConfig, ReplayView, Squasher};
use serde::Serialize;

use super::load_records;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render, render_error};

/// Arguments for `recap verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// The unsquashed recording.
    pub original: PathBuf,

    /// The squashed log to check against it.
    pub squashed: PathBuf,
}

/// Per-log view summary.
#[derive(Debug, Serialize)]
pub struct ViewSummary {
    pub records: usize,
    pub entities: usize,
    pub chunks: usize,
    pub teams: usize,
    pub digest: String,
}

impl ViewSummary {
    fn new(records: usize, view: &ReplayView) -> Self {
        Self {
            records,
            entities: view.entities.len(),
            chunks: view.chunks.len(),
            teams: view.teams.len(),
            digest: view.digest(),
        }
    }
}

/// Report payload for `recap verify`.
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub matched: bool,
    pub original: ViewSummary,
    pub squashed: ViewSummary,
}

/// Execute `recap verify`.
pub fn run_verify(
    args: &VerifyArgs,
    _config: &RecapConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let registry = Squasher::registry();
    let original = load_records(&args.original, &registry, output)?;
    let squashed = load_records(&args.squashed, &registry, output)?;

    let expected = ReplayView::replay(&original);
    let actual = ReplayView::replay(&squashed);
    let report = VerifyReport {
        matched: expected.matches(&actual),
        original: ViewSummary::new(original.len(), &expected),
        squashed: ViewSummary::new(squashed.len(), &actual),
    };
    tracing::info!(matched = report.matched, "verification finished");

    if !report.matched {
        render_error(
            output,
            &CliError::from_code(
                ErrorCode::VerificationFailed,
                format!(
                    "{} ({}) vs {} ({})",
                    args.original.display(),
                    report.original.digest,
                    args.squashed.display(),
                    report.squashed.digest
                ),
            ),
        )?;
        anyhow::bail!("{} does not replay to the state of {}", args.squashed.display(), args.original.display());
    }

    render(output, &report, render_verify_human)
}

fn render_verify_human(report: &VerifyReport, pretty: bool, w: &mut dyn Write) -> io::Result<()> {
    if !pretty {
        writeln!(w, "matched {}", report.matched)?;
        writeln!(w, "digest {}", report.squashed.digest)?;
        return Ok(());
    }

    pretty_section(w, "Verification")?;
    pretty_kv(w, "result", if report.matched { "match" } else { "MISMATCH" })?;
    for (label, side) in [("original", &report.original), ("squashed", &report.squashed)] {
        pretty_kv(
            w,
            label,
            format!(
                "{} records, {} entities, {} chunks, {} teams",
                side.records, side.entities, side.chunks, side.teams
            ),
        )?;
    }
    pretty_kv(w, "digest", &report.squashed.digest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_report_names_digest() {
        let view = ReplayView::new();
        let report = VerifyReport {
            matched: true,
            original: ViewSummary::new(3, &view),
            squashed: ViewSummary::new(0, &view),
        };
        let mut buf = Vec::new();
        render_verify_human(&report, false, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, format!("matched true\ndigest {}\n", view.digest()));
    }

    #[test]
    fn summary_counts_view_contents() {
        let summary = ViewSummary::new(7, &ReplayView::new());
        assert_eq!(summary.records, 7);
        assert_eq!(summary.entities, 0);
        assert!(summary.digest.starts_with("blake3:"));
    }
}
