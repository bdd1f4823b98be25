//! `recap squash`: fold a record log into its minimal equivalent.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use recap_core::log::write_log;
use recap_core::{
    ErrorCode, RecapConfig, ReplayView, SquashConfig, SquashReport, Squasher, squash,
};
use serde::Serialize;

use super::load_records;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render, render_error, render_into};

/// Arguments for `recap squash`.
#[derive(Args, Debug)]
pub struct SquashArgs {
    /// Record log to squash (`-` reads stdin).
    pub input: PathBuf,

    /// Write the squashed log here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Timestamp stamped on team and map records (defaults to the last record).
    #[arg(long, value_name = "MS")]
    pub end_time: Option<i64>,

    /// Skip replaying both logs to check they reach the same state.
    #[arg(long)]
    pub no_verify: bool,

    /// Keep particle records instead of dropping them.
    #[arg(long)]
    pub keep_particles: bool,

    /// Keep transaction-confirm records instead of dropping them.
    #[arg(long)]
    pub keep_confirms: bool,
}

impl SquashArgs {
    fn squash_config(&self, base: &SquashConfig) -> SquashConfig {
        SquashConfig {
            drop_particles: base.drop_particles && !self.keep_particles,
            drop_transaction_confirms: base.drop_transaction_confirms && !self.keep_confirms,
        }
    }
}

/// Report payload for `recap squash`.
#[derive(Debug, Serialize)]
pub struct SquashSummary {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub end_time: i64,
    #[serde(flatten)]
    pub report: SquashReport,
    /// `None` when verification was skipped.
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Execute `recap squash`.
pub fn run_squash(
    args: &SquashArgs,
    config: &RecapConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let records = load_records(&args.input, &Squasher::registry(), output)?;
    let last_time = records.iter().map(|r| r.time).max().unwrap_or(0);
    let end_time = args.end_time.unwrap_or(last_time);
    if end_time < last_time {
        render_error(
            output,
            &CliError::from_code(
                ErrorCode::InvalidEndTime,
                format!("--end-time {end_time} is before the last record at {last_time}"),
            ),
        )?;
        anyhow::bail!("end time {end_time} precedes last record at {last_time}");
    }

    let squash_config = args.squash_config(&config.squash);
    let verify = config.output.verify && !args.no_verify;
    tracing::debug!(?squash_config, verify, end_time, "squashing");

    let (squashed, report) = squash(records.iter().cloned(), end_time, &squash_config);

    let (verified, digest) = if verify {
        let expected = ReplayView::replay(&records);
        let actual = ReplayView::replay(&squashed);
        if !expected.matches(&actual) {
            render_error(
                output,
                &CliError::from_code(
                    ErrorCode::VerificationFailed,
                    format!("original {} vs squashed {}", expected.digest(), actual.digest()),
                ),
            )?;
            anyhow::bail!("squashed log does not replay to the original state");
        }
        (Some(true), Some(actual.digest()))
    } else {
        (None, None)
    };

    let text = write_log(&squashed).map_err(|e| {
        let _ = render_error(output, &CliError::from_code(ErrorCode::LogWriteFailed, &e));
        anyhow::Error::new(e)
    })?;

    let summary = SquashSummary {
        input: args.input.display().to_string(),
        output: args.output.as_ref().map(|p| p.display().to_string()),
        end_time,
        report,
        verified,
        digest,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            render(output, &summary, render_summary_human)
        }
        None => {
            // The log owns stdout; the summary goes to stderr.
            io::stdout()
                .lock()
                .write_all(text.as_bytes())
                .context("Failed to write squashed log to stdout")?;
            let stderr = io::stderr();
            let mut err = stderr.lock();
            render_into(output, &summary, &mut err, render_summary_human)
        }
    }
}

fn render_summary_human(
    summary: &SquashSummary,
    pretty: bool,
    w: &mut dyn Write,
) -> io::Result<()> {
    let report = &summary.report;
    let verified = match summary.verified {
        Some(true) => "ok",
        Some(false) => "MISMATCH",
        None => "skipped",
    };

    if !pretty {
        writeln!(w, "consumed {}", report.records_consumed)?;
        writeln!(w, "emitted {}", report.records_emitted)?;
        writeln!(w, "dropped {}", report.dropped())?;
        writeln!(w, "verified {verified}")?;
        return Ok(());
    }

    pretty_section(w, &format!("Squashed {}", summary.input))?;
    if let Some(path) = &summary.output {
        pretty_kv(w, "output", path)?;
    }
    pretty_kv(w, "end time", summary.end_time.to_string())?;
    pretty_kv(
        w,
        "records",
        format!("{} -> {}", report.records_consumed, report.records_emitted),
    )?;
    pretty_kv(
        w,
        "dropped",
        format!(
            "{} (particles {}, confirms {}, orphan blocks {})",
            report.dropped(),
            report.particles_dropped,
            report.confirms_dropped,
            report.orphan_block_changes
        ),
    )?;
    pretty_kv(w, "opaque passed", report.opaque_passed.to_string())?;
    pretty_kv(w, "respawns", report.respawns.to_string())?;
    pretty_kv(
        w,
        "tracked",
        format!(
            "{} entities, {} chunks, {} teams",
            report.entities_tracked, report.chunks_tracked, report.teams_tracked
        ),
    )?;
    pretty_kv(w, "verified", verified)?;
    if let Some(digest) = &summary.digest {
        pretty_kv(w, "digest", digest)?;
    }
    Ok(())
}
