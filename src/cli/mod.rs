//! Command-line interface definitions.

pub mod output;
pub mod run;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// carryscan - Cross-exchange funding-rate arbitrage scanner.
#[derive(Parser, Debug)]
#[command(name = "carryscan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan for perpetual-perpetual funding pairings across venues
    PerpPerp(ScanArgs),

    /// Scan for futures-spot basis pairings across venues
    PerpSpot(ScanArgs),

    /// List the built-in venues and their effective fee schedules
    Venues(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the scan subcommands.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override the funding-rate materiality threshold (fraction)
    #[arg(long)]
    pub min_rate: Option<Decimal>,

    /// Show at most this many rows
    #[arg(long)]
    pub limit: Option<usize>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}
