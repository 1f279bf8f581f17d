//! SA-CCR CLI - command-line operations for the exposure engine.
//!
//! # Commands
//!
//! - `saccr validate --portfolio <file>` - run only S1 and print diagnostics
//! - `saccr run --portfolio <file>` - run the full S1-S5 pipeline and write reports
//! - `saccr check` - print the default pipeline configuration
//!
//! # Architecture
//!
//! This crate is the operational entry point for `saccr_core`: it owns
//! fixture loading, CSV report writing, and the `clap` command surface,
//! while every SA-CCR calculation lives in `saccr_core`.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod fixture;

pub use error::{CliError, Result};

/// SA-CCR exposure-at-default and capital-charge engine CLI.
#[derive(Parser)]
#[command(name = "saccr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run only the validator (S1) and print its diagnostics.
    Validate {
        /// Path to a JSON portfolio fixture.
        #[arg(short, long)]
        portfolio: String,
    },

    /// Run the full S1-S5 pipeline and write the trade-detail and
    /// summary reports as CSV.
    Run {
        /// Path to a JSON portfolio fixture.
        #[arg(short, long)]
        portfolio: String,

        /// Valuation date (YYYY-MM-DD); defaults to a fixed fallback date.
        #[arg(short, long)]
        date: Option<String>,

        /// Trade-detail report output path.
        #[arg(long, default_value = "trade_detail.csv")]
        detail_out: String,

        /// Summary report output path.
        #[arg(long, default_value = "summary.csv")]
        summary_out: String,
    },

    /// Print the default pipeline configuration.
    Check,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Validate { portfolio } => commands::validate::run(&portfolio),
        Commands::Run { portfolio, date, detail_out, summary_out } => commands::run::run(&portfolio, date.as_deref(), &detail_out, &summary_out),
        Commands::Check => commands::check::run(),
    }
}
