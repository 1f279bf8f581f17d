//! Run command implementation.
//!
//! Loads a JSON portfolio fixture, runs the full S1-S5 pipeline, and
//! writes the trade-detail and summary reports as CSV.

use chrono::NaiveDate;
use tracing::info;

use saccr_core::config::PipelineConfig;
use saccr_core::market::{InMemoryBucketMapper, InMemoryMarket, InMemoryNameMapper, InMemoryReferenceData};
use saccr_core::pipeline::{emit_reports, run_pipeline, PipelineCollaborators};
use saccr_core::report::CsvSink;

use crate::error::Result;
use crate::fixture;

/// Runs the run command: load, price, report.
pub fn run(portfolio: &str, valuation_date: Option<&str>, detail_out: &str, summary_out: &str) -> Result<()> {
    info!("Loading portfolio from {portfolio}");
    let mut loaded = fixture::load(portfolio)?;

    let mut market = InMemoryMarket::new();
    for ((from, to), rate) in loaded.fx_rates.iter() {
        market = market.with_fx_rate(*from, *to, *rate);
    }

    let name_mapper = InMemoryNameMapper::new();
    let bucket_mapper = InMemoryBucketMapper::new();
    let reference_data = InMemoryReferenceData::new();
    let collaborators = PipelineCollaborators { market: &market, name_mapper: &name_mapper, bucket_mapper: &bucket_mapper, reference_data: &reference_data };

    let config = PipelineConfig::default();
    let date = match valuation_date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| crate::error::CliError::InvalidArgument(e.to_string()))?,
        None => NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid fallback date"),
    };

    let output = run_pipeline(&loaded.trades, &mut loaded.stores, &collaborators, &config, date)?;
    info!("{} diagnostic(s) raised, portfolio CC = {}", output.diagnostics.len(), output.aggregation.portfolio_cc);
    for diag in &output.diagnostics {
        println!("[{:?}] {} / {}: {}", diag.severity, diag.subject, diag.action, diag.detail);
    }

    let detail_file = std::fs::File::create(detail_out)?;
    let mut detail_sink = CsvSink::new(detail_file);
    let summary_file = std::fs::File::create(summary_out)?;
    let mut summary_sink = CsvSink::new(summary_file);

    emit_reports(&output, &mut loaded.stores, &market, &config, &mut detail_sink, &mut summary_sink)?;
    detail_sink.flush()?;
    summary_sink.flush()?;

    info!("Wrote {detail_out} and {summary_out}");
    Ok(())
}
