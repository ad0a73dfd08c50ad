//! testbloat CLI - ranks JavaScript tests by body length

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Diagnostics go to stderr; stdout carries only the report

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use testbloat_core::config::{self, Overrides};
use testbloat_core::{get_large_tests_with_config, render_json, render_text, validate_inputs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "testbloat")]
#[command(about = "Find JavaScript tests with unusually large bodies")]
#[command(version)]
struct Cli {
    /// Directory to scan for test files
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Minimum body length, in lines, to report (overrides config file)
    #[arg(long, allow_negative_numbers = true)]
    min_lines: Option<i64>,

    /// Show only top N results (overrides config file)
    #[arg(long, allow_negative_numbers = true)]
    top: Option<i64>,

    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Path to config file (default: auto-discover in the scanned directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Warn about unreadable test files instead of failing
    #[arg(long)]
    skip_unreadable: bool,

    /// Scan files one at a time instead of on the thread pool
    #[arg(long)]
    sequential: bool,

    /// Log discovery and scan progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "warn" });

    // Bad arguments are reported even when the config file is broken
    validate_inputs(&cli.path, cli.min_lines.unwrap_or(0), cli.top.unwrap_or(0))?;

    let mut settings = config::load(&cli.path, cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(config_path) = &settings.config_path {
        tracing::info!("Using config: {}", config_path.display());
    }

    settings.apply(&Overrides {
        min_lines: cli.min_lines,
        top: cli.top,
        skip_unreadable: cli.skip_unreadable,
        sequential: cli.sequential,
    });
    let (min_lines, top) = settings.thresholds();

    let report = get_large_tests_with_config(&cli.path, min_lines, top, &settings)?;

    match cli.format {
        OutputFormat::Text => {
            print!("{}", render_text(&report));
        }
        OutputFormat::Json => {
            println!("{}", render_json(&report));
        }
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
