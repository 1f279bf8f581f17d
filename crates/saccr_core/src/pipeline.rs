//! Top-level orchestration: runs S1 through S5 in sequence.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::aggregate::{self, AggregationResult};
use crate::classify;
use crate::collateral::{self, ResolvedCollateral};
use crate::config::PipelineConfig;
use crate::diagnostics::Diagnostic;
use crate::error::PipelineError;
use crate::ids::NettingSetId;
use crate::market::{BucketMapper, Market, NameMapper, ReferenceData};
use crate::record::TradeRecord;
use crate::report::{self, SummaryRow, TradeDetailRow};
use crate::store::InputStores;
use crate::trade::TradeView;
use crate::validator;

/// Every collaborator the pipeline needs beyond the trade portfolio and
/// the input stores, bundled so [`run_pipeline`] takes one argument per
/// concern rather than a long flat parameter list.
pub struct PipelineCollaborators<'a> {
    /// Market data.
    pub market: &'a dyn Market,
    /// SIMM name mapper.
    pub name_mapper: &'a dyn NameMapper,
    /// SIMM bucket mapper.
    pub bucket_mapper: &'a dyn BucketMapper,
    /// Reference-data lookup.
    pub reference_data: &'a dyn ReferenceData,
}

/// Everything a single `run_pipeline` call produces.
pub struct PipelineOutput {
    /// Per-trade classified records (trade-detail report source).
    pub records: Vec<TradeRecord>,
    /// Netting-set/asset-class/hedging-set/portfolio aggregation.
    pub aggregation: AggregationResult,
    /// Resolved collateral per netting set.
    pub collateral: HashMap<NettingSetId, ResolvedCollateral>,
    /// Every diagnostic raised by S1 and S2, in stage order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs S1 (validate) → S2 (classify) → S3 (resolve collateral) → S4
/// (aggregate) over `trades` and `stores`, mutating `stores` in place
/// with S1's substituted defaults.
pub fn run_pipeline(
    trades: &[Box<dyn TradeView>],
    stores: &mut InputStores,
    collaborators: &PipelineCollaborators<'_>,
    config: &PipelineConfig,
    valuation_date: NaiveDate,
) -> Result<PipelineOutput, PipelineError> {
    let mut diagnostics = validator::validate(trades, stores, config)?;

    let classify_result = classify::classify_trades(
        trades,
        collaborators.market,
        collaborators.name_mapper,
        collaborators.bucket_mapper,
        collaborators.reference_data,
        stores,
        config,
        valuation_date,
    );
    diagnostics.extend(classify_result.diagnostics);

    let mut npv_by_netting_set: HashMap<NettingSetId, f64> = HashMap::new();
    for record in &classify_result.records {
        *npv_by_netting_set.entry(record.netting_set_id.clone()).or_insert(0.0) += record.npv_base_ccy;
    }

    let collateral = collateral::resolve_collateral(stores, collaborators.market, &npv_by_netting_set, config.base_currency)?;

    let aggregation = aggregate::aggregate(&classify_result.records, stores, &collateral, &classify_result.basis_hedging_sets, config)?;

    Ok(PipelineOutput { records: classify_result.records, aggregation, collateral, diagnostics })
}

/// Emits the trade-detail and summary reports for a finished pipeline
/// run, and back-fills `stores`'s collateral balances from the
/// resolved amounts.
pub fn emit_reports(
    output: &PipelineOutput,
    stores: &mut InputStores,
    market: &dyn Market,
    config: &PipelineConfig,
    detail_sink: &mut dyn report::ReportSink<TradeDetailRow>,
    summary_sink: &mut dyn report::ReportSink<SummaryRow>,
) -> Result<(), PipelineError> {
    report::emit_trade_detail(&output.records, detail_sink)?;
    report::emit_summary(&output.aggregation, summary_sink)?;
    report::combine_collateral_balances(stores, &output.collateral, config.base_currency, |from, to| market.fx_rate(from, to).unwrap_or(1.0));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CurrencyCode;
    use crate::market::{InMemoryBucketMapper, InMemoryMarket, InMemoryNameMapper, InMemoryReferenceData};
    use crate::report::VecSink;

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    #[test]
    fn empty_portfolio_runs_end_to_end() {
        let trades: Vec<Box<dyn TradeView>> = Vec::new();
        let mut stores = InputStores::new();
        let market = InMemoryMarket::new().with_fx_rate(usd(), usd(), 1.0);
        let name_mapper = InMemoryNameMapper::new();
        let bucket_mapper = InMemoryBucketMapper::new();
        let reference_data = InMemoryReferenceData::new();
        let collaborators = PipelineCollaborators { market: &market, name_mapper: &name_mapper, bucket_mapper: &bucket_mapper, reference_data: &reference_data };
        let config = PipelineConfig::default();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        let output = run_pipeline(&trades, &mut stores, &collaborators, &config, date).unwrap();
        assert_eq!(output.aggregation.portfolio_cc, 0.0);

        let mut detail_sink = VecSink::new();
        let mut summary_sink = VecSink::new();
        emit_reports(&output, &mut stores, &market, &config, &mut detail_sink, &mut summary_sink).unwrap();
        assert!(detail_sink.rows.is_empty());
        assert_eq!(summary_sink.rows.len(), 1);
    }
}
