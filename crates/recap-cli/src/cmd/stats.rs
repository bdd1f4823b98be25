//! `recap stats`: summarize a record log without squashing it.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use recap_core::{DecodeRegistry, RecapConfig, TimedRecord};
use serde::Serialize;

use super::load_records;
use crate::output::{OutputMode, pretty_kv, pretty_section, render};

/// Arguments for `recap stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Record log to inspect (`-` reads stdin).
    pub input: PathBuf,
}

/// Report payload for `recap stats`.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct LogStats {
    pub records: usize,
    pub first_time: Option<i64>,
    pub last_time: Option<i64>,
    pub duration_ms: i64,
    pub by_kind: BTreeMap<String, usize>,
    pub by_domain: BTreeMap<String, usize>,
}

impl LogStats {
    fn collect(records: &[TimedRecord]) -> Self {
        let mut stats = Self {
            records: records.len(),
            ..Self::default()
        };
        for timed in records {
            stats.first_time = Some(stats.first_time.map_or(timed.time, |t| t.min(timed.time)));
            stats.last_time = Some(stats.last_time.map_or(timed.time, |t| t.max(timed.time)));
            let kind = timed.kind();
            *stats.by_kind.entry(kind.to_string()).or_default() += 1;
            *stats.by_domain.entry(kind.domain().to_string()).or_default() += 1;
        }
        if let (Some(first), Some(last)) = (stats.first_time, stats.last_time) {
            stats.duration_ms = last - first;
        }
        stats
    }
}

/// Execute `recap stats`.
///
/// Payloads are left undecoded; only the kind and timestamp of each line
/// are needed.
pub fn run_stats(args: &StatsArgs, _config: &RecapConfig, output: OutputMode) -> anyhow::Result<()> {
    let records = load_records(&args.input, &DecodeRegistry::new(), output)?;
    let stats = LogStats::collect(&records);
    render(output, &stats, |stats, pretty, w| {
        render_stats_human(&args.input.display().to_string(), stats, pretty, w)
    })
}

fn render_stats_human(
    input: &str,
    stats: &LogStats,
    pretty: bool,
    w: &mut dyn Write,
) -> io::Result<()> {
    if !pretty {
        writeln!(w, "records {}", stats.records)?;
        writeln!(w, "duration_ms {}", stats.duration_ms)?;
        for (kind, count) in &stats.by_kind {
            writeln!(w, "kind {kind} {count}")?;
        }
        return Ok(());
    }

    pretty_section(w, &format!("Record log {input}"))?;
    pretty_kv(w, "records", stats.records.to_string())?;
    if let (Some(first), Some(last)) = (stats.first_time, stats.last_time) {
        pretty_kv(w, "time span", format!("{first} .. {last} ms"))?;
    }
    pretty_kv(w, "duration", format!("{} ms", stats.duration_ms))?;
    writeln!(w)?;

    pretty_section(w, "By domain")?;
    for (domain, count) in &stats.by_domain {
        pretty_kv(w, domain, count.to_string())?;
    }
    writeln!(w)?;

    pretty_section(w, "By kind")?;
    for (kind, count) in &stats.by_kind {
        pretty_kv(w, kind, count.to_string())?;
    }
    Ok(())
}
