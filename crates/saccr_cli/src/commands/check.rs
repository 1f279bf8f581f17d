//! Check command implementation.
//!
//! Prints the default pipeline configuration, as a quick sanity check
//! that the CLI binary and its `saccr_core` dependency are wired up.

use saccr_core::config::PipelineConfig;

use crate::error::Result;

/// Runs the check command.
pub fn run() -> Result<()> {
    let config = PipelineConfig::default();
    println!("saccr_core defaults:");
    println!("  base currency: {}", config.base_currency);
    println!("  alpha: {}", config.alpha);
    println!("  large netting set trade count: {}", config.large_netting_set_trade_count);
    println!("  default counterparty risk weight: {}", config.defaults.cpty_saccr_rw);
    println!("  default MPOR (weeks): {}", config.defaults.netting_set_mpor_weeks);
    Ok(())
}
