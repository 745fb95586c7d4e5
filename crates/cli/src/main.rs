// katilim - participation-index approval table builder

mod exit_codes;
mod fetch;
mod logging;
mod pipeline;
mod report;
mod snapshots;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use katilim_config::{ConfigError, Settings};
use katilim_recon::RunContext;

use exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_SUCCESS};
use fetch::HttpTableSource;
use logging::TracingSink;
use report::RunReport;

#[derive(Parser)]
#[command(name = "katilim")]
#[command(about = "Build the BIST participation-index approval table")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape both universes, reconcile, refresh index snapshots
    #[command(after_help = "\
Examples:
  katilim run
  katilim run --config katilim.toml --json
  katilim run --data-dir /srv/katilim/data --skip-snapshots
  KATILIM_DATA_DIR=/srv/katilim/data katilim run
  RUST_LOG=debug katilim run")]
    Run {
        /// Settings file (default: ./katilim.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Artifact directory, overrides `data_dir` from settings
        #[arg(long, env = "KATILIM_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Do not refresh the index snapshot CSVs
        #[arg(long)]
        skip_snapshots: bool,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  katilim-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            data_dir,
            skip_snapshots,
            json,
        } => cmd_run(config, data_dir, skip_snapshots, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Read { .. } => Some("check the --config path".to_string()),
            ConfigError::Parse { .. } => Some("settings must be valid TOML".to_string()),
            ConfigError::Validation(_) => None,
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// run
// ============================================================================

fn cmd_run(
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    skip_snapshots: bool,
    json: bool,
) -> Result<(), CliError> {
    let mut settings = Settings::load(config.as_deref()).map_err(CliError::config)?;
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }

    logging::init(&settings.logging.filter);

    let source = HttpTableSource::new(&settings.http)
        .map_err(|e| CliError::general(e.to_string()))?;

    let mut approval_sink = TracingSink::new("approval");
    let (approval, run_at) = {
        let mut ctx = RunContext::new(&mut approval_sink);
        let report = pipeline::run_approval(&mut ctx, &settings, &source);
        (report, ctx.run_at())
    };

    let mut snapshot_sink = TracingSink::new("snapshots");
    let snapshots = if skip_snapshots || !settings.snapshots.enabled {
        tracing::info!("index snapshots skipped");
        Vec::new()
    } else {
        let mut ctx = RunContext::at(&mut snapshot_sink, run_at);
        snapshots::refresh_snapshots(&mut ctx, &settings, &source)
    };

    let report = RunReport {
        run_at: run_at.to_rfc3339(),
        data_dir: settings.data_dir.clone(),
        approval,
        snapshots,
    };

    let failures = report.failures();
    let warnings = approval_sink.warnings() + snapshot_sink.warnings();
    if failures > 0 {
        tracing::warn!(failures, warnings, "run finished with failures");
    } else {
        tracing::info!(warnings, "run finished");
    }

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| {
            CliError::general(format!("cannot serialize run report: {e}"))
                .with_hint("artifacts on disk are complete; only the report failed")
        })?;
        println!("{}", out);
    }

    Ok(())
}
