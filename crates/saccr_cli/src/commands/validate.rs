//! Validate command implementation.
//!
//! Runs only S1 (the validator) and prints every diagnostic it raises,
//! without running classification or aggregation.

use tracing::info;

use saccr_core::config::PipelineConfig;
use saccr_core::validator;

use crate::error::Result;
use crate::fixture;

/// Runs the validate command.
pub fn run(portfolio: &str) -> Result<()> {
    info!("Loading portfolio from {portfolio}");
    let mut loaded = fixture::load(portfolio)?;
    let config = PipelineConfig::default();

    let diagnostics = validator::validate(&loaded.trades, &mut loaded.stores, &config).map_err(saccr_core::PipelineError::from)?;
    info!("{} diagnostic(s) raised", diagnostics.len());
    for diag in &diagnostics {
        println!("[{:?}] {} / {}: {}", diag.severity, diag.subject, diag.action, diag.detail);
    }

    Ok(())
}
