//! Command-line arguments for the `neighbot` binary.

use std::path::PathBuf;

use clap::Parser;

/// Chat bot that bridges chat platforms to an LLM with per-channel memory.
#[derive(Debug, Parser)]
#[command(name = "neighbot", version, about, long_about = None)]
pub struct Cli {
    /// Configuration directory holding main.json and data/.
    /// The CONFIG_DIR environment variable takes precedence.
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Detailed output (-v for debug, -vv for trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long)]
    pub otel: bool,
}
