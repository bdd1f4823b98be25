#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use recap_core::config::{self, RecapConfig};
use recap_core::ErrorCode;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "recap: squash recorded game sessions into replayable snapshots",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json and the FORMAT env var).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Read settings from this file instead of ./recap.toml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Squash a record log",
        long_about = "Fold a record log into the shortest log that replays to the same client state.",
        after_help = "EXAMPLES:\n    # Squash a recording into a snapshot file\n    recap squash session.log -o snapshot.log\n\n    # Squash up to a later timestamp, stamping teams and maps there\n    recap squash session.log -o snapshot.log --end-time 60000\n\n    # Read from stdin, write to stdout\n    cat session.log | recap squash - > snapshot.log\n\n    # Emit a machine-readable report\n    recap squash session.log -o snapshot.log --json"
    )]
    Squash(cmd::squash::SquashArgs),

    #[command(
        about = "Summarize a record log",
        long_about = "Count records per kind and per domain and report the covered time span.",
        after_help = "EXAMPLES:\n    # Show record counts\n    recap stats session.log\n\n    # Emit machine-readable output\n    recap stats session.log --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        about = "Check a squashed log against its source",
        long_about = "Replay both logs and compare the resulting client state.",
        after_help = "EXAMPLES:\n    # Verify a snapshot\n    recap verify session.log snapshot.log\n\n    # Emit machine-readable output\n    recap verify session.log snapshot.log --json"
    )]
    Verify(cmd::verify::VerifyArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("RECAP_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "recap=debug,info"
        } else {
            "recap=info,warn"
        })
    });

    let format = env::var("RECAP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout may carry a squashed log; diagnostics stay on stderr.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(path: Option<&PathBuf>, output: OutputMode) -> anyhow::Result<RecapConfig> {
    let loaded = match path {
        Some(path) if !path.exists() => {
            render_error(
                output,
                &CliError::from_code(ErrorCode::InputNotFound, path.display()),
            )?;
            anyhow::bail!("config file not found: {}", path.display());
        }
        Some(path) => config::load_config(path),
        None => config::load_from_dir(&env::current_dir()?),
    };
    loaded.or_else(|e| {
        render_error(
            output,
            &CliError::from_code(ErrorCode::ConfigParseError, format!("{e:#}")),
        )?;
        Err(e)
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    let config = load_config(cli.config.as_ref(), output)?;

    match cli.command {
        Commands::Squash(ref args) => cmd::squash::run_squash(args, &config, output),
        Commands::Stats(ref args) => cmd::stats::run_stats(args, &config, output),
        Commands::Verify(ref args) => cmd::verify::run_verify(args, &config, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_before_subcommand() {
        let cli = Cli::parse_from(["recap", "--json", "stats", "in.log"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Stats(_)));
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["recap", "stats", "in.log", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn format_flag_parses_value_enum() {
        let cli = Cli::parse_from(["recap", "--format", "text", "stats", "in.log"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert_eq!(cli.output_mode(), OutputMode::Text);
    }

    #[test]
    fn squash_flags_parse() {
        let cli = Cli::parse_from([
            "recap",
            "squash",
            "in.log",
            "-o",
            "out.log",
            "--end-time",
            "500",
            "--no-verify",
            "--keep-particles",
        ]);
        let Commands::Squash(args) = cli.command else {
            panic!("expected squash");
        };
        assert_eq!(args.output, Some(PathBuf::from("out.log")));
        assert_eq!(args.end_time, Some(500));
        assert!(args.no_verify);
        assert!(args.keep_particles);
        assert!(!args.keep_confirms);
    }

    #[test]
    fn verify_takes_two_paths() {
        let cli = Cli::parse_from(["recap", "verify", "a.log", "b.log"]);
        let Commands::Verify(args) = cli.command else {
            panic!("expected verify");
        };
        assert_eq!(args.original, PathBuf::from("a.log"));
        assert_eq!(args.squashed, PathBuf::from("b.log"));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["recap", "stats", "in.log", "--config", "alt.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
    }

    #[test]
    fn verify_rejects_single_path() {
        assert!(Cli::try_parse_from(["recap", "verify", "a.log"]).is_err());
    }

    #[test]
    fn missing_config_file_in_dir_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config::load_from_dir(dir.path()).expect("defaults");
        assert!(config.output.verify);
    }
}
