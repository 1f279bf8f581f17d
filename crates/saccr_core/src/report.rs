//! S5 — the report emitter.
//!
//! Produces the trade-detail report, the hierarchical summary report,
//! and the combined-collateral-balances back-fill, each written through
//! a [`ReportSink`].

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::AggregationResult;
use crate::collateral::ResolvedCollateral;
use crate::error::ReportError;
use crate::ids::{CurrencyCode, NettingSetId};
use crate::record::{AssetClass, TradeRecord};
use crate::store::{CollateralBalance, InputStores};

/// A sink that accepts report rows, one report at a time.
///
/// A column-oriented collaborator: `saccr_core` only writes through
/// this trait and never owns the underlying file, buffer, or table.
pub trait ReportSink<T: Serialize> {
    /// Writes one row.
    fn write_row(&mut self, row: &T) -> Result<(), ReportError>;
}

/// One row of the trade-detail report.
#[derive(Clone, Debug, Serialize)]
pub struct TradeDetailRow {
    /// Trade id.
    pub trade_id: String,
    /// Trade type, as a string tag.
    pub trade_type: String,
    /// Netting set id.
    pub netting_set_id: String,
    /// Asset class.
    pub asset_class: String,
    /// Hedging set.
    pub hedging_set: String,
    /// Hedging subset.
    pub hedging_subset: String,
    /// NPV in base currency.
    pub npv_base_ccy: f64,
    /// Supervisory duration.
    pub supervisory_duration: f64,
    /// Supervisory delta.
    pub delta: f64,
    /// Adjusted notional `d`.
    pub adjusted_notional: f64,
    /// Maturity factor.
    pub maturity_factor: f64,
    /// Maturity, in years.
    pub maturity_years: f64,
    /// Start time S, in years.
    pub start_years: f64,
    /// End time E, in years.
    pub end_years: f64,
    /// Latest option expiry T, in years.
    pub latest_expiry_years: f64,
    /// Price observation 1.
    pub price1: f64,
    /// Price observation 2.
    pub price2: f64,
    /// Strike/option reference price.
    pub strike: f64,
}

impl From<&TradeRecord> for TradeDetailRow {
    fn from(r: &TradeRecord) -> Self {
        Self {
            trade_id: r.trade_id.to_string(),
            trade_type: format!("{:?}", r.trade_type),
            netting_set_id: r.netting_set_id.to_string(),
            asset_class: format!("{:?}", r.asset_class),
            hedging_set: r.hedging_set.clone(),
            hedging_subset: r.hedging_subset.clone(),
            npv_base_ccy: r.npv_base_ccy,
            supervisory_duration: r.supervisory_duration,
            delta: r.delta,
            adjusted_notional: r.effective_notional,
            maturity_factor: r.maturity_factor,
            maturity_years: r.t_maturity,
            start_years: r.m_start,
            end_years: r.s_end,
            latest_expiry_years: r.e_latest,
            price1: r.price1,
            price2: r.price2,
            strike: r.strike,
        }
    }
}

/// One row of the hierarchical summary report.
#[derive(Clone, Debug, Serialize)]
pub struct SummaryRow {
    /// Level tag: `"All"`, `"NettingSet"`, `"AssetClass"`, or `"HedgingSet"`.
    pub level: String,
    /// Netting set id, empty at the "All" level.
    pub netting_set_id: String,
    /// Asset class, empty above the asset-class level.
    pub asset_class: String,
    /// Hedging set, empty above the hedging-set level.
    pub hedging_set: String,
    /// Add-on at this level, where applicable.
    pub add_on: f64,
    /// NPV at this level, where applicable.
    pub npv: f64,
    /// Replacement cost (netting-set level only).
    pub rc: f64,
    /// PFE (netting-set level only).
    pub pfe: f64,
    /// EAD (netting-set level only).
    pub ead: f64,
    /// Capital charge.
    pub cc: f64,
}

/// Emits the trade-detail report via `sink`.
pub fn emit_trade_detail(records: &[TradeRecord], sink: &mut dyn ReportSink<TradeDetailRow>) -> Result<(), ReportError> {
    for record in records {
        sink.write_row(&TradeDetailRow::from(record))?;
    }
    Ok(())
}

/// Emits the hierarchical summary report via `sink`.
pub fn emit_summary(aggregation: &AggregationResult, sink: &mut dyn ReportSink<SummaryRow>) -> Result<(), ReportError> {
    sink.write_row(&SummaryRow {
        level: "All".to_string(),
        netting_set_id: String::new(),
        asset_class: String::new(),
        hedging_set: String::new(),
        add_on: 0.0,
        npv: 0.0,
        rc: 0.0,
        pfe: 0.0,
        ead: 0.0,
        cc: aggregation.portfolio_cc,
    })?;

    let mut netting_set_ids: Vec<&NettingSetId> = aggregation.netting_sets.keys().collect();
    netting_set_ids.sort_by_key(|id| id.to_string());

    for ns in netting_set_ids {
        let agg = &aggregation.netting_sets[ns];
        sink.write_row(&SummaryRow {
            level: "NettingSet".to_string(),
            netting_set_id: ns.to_string(),
            asset_class: String::new(),
            hedging_set: String::new(),
            add_on: agg.add_on,
            npv: agg.npv,
            rc: agg.rc,
            pfe: agg.pfe,
            ead: agg.ead,
            cc: agg.cc,
        })?;

        let mut classes: Vec<&AssetClass> = agg.add_on_by_asset_class.keys().collect();
        classes.sort_by_key(|c| format!("{c:?}"));
        for ac in classes {
            sink.write_row(&SummaryRow {
                level: "AssetClass".to_string(),
                netting_set_id: ns.to_string(),
                asset_class: format!("{ac:?}"),
                hedging_set: String::new(),
                add_on: agg.add_on_by_asset_class.get(ac).copied().unwrap_or(0.0),
                npv: agg.npv_by_asset_class.get(ac).copied().unwrap_or(0.0),
                rc: 0.0,
                pfe: 0.0,
                ead: 0.0,
                cc: 0.0,
            })?;

            let mut hedging_sets: Vec<&String> =
                agg.add_on_by_hedging_set.keys().filter(|(hs_ac, _)| hs_ac == ac).map(|(_, hs)| hs).collect();
            hedging_sets.sort();
            for hs in hedging_sets {
                sink.write_row(&SummaryRow {
                    level: "HedgingSet".to_string(),
                    netting_set_id: ns.to_string(),
                    asset_class: format!("{ac:?}"),
                    hedging_set: hs.clone(),
                    add_on: agg.add_on_by_hedging_set.get(&(*ac, hs.clone())).copied().unwrap_or(0.0),
                    npv: agg.npv_by_hedging_set.get(&(*ac, hs.clone())).copied().unwrap_or(0.0),
                    rc: 0.0,
                    pfe: 0.0,
                    ead: 0.0,
                    cc: 0.0,
                })?;
            }
        }
    }

    Ok(())
}

/// Merges the resolved collateral back into the user-balance store.
///
/// `resolved` amounts are expressed in `base_currency`.
/// If a netting set already has a user balance, null IM/VM are
/// back-filled from the resolved amount, converted into the user
/// balance's currency. Otherwise the calculated balance is copied and
/// its VM overwritten with the resolved VM.
pub fn combine_collateral_balances(
    stores: &mut InputStores,
    resolved: &HashMap<NettingSetId, ResolvedCollateral>,
    base_currency: CurrencyCode,
    fx_rate: impl Fn(CurrencyCode, CurrencyCode) -> f64,
) {
    for (ns, r) in resolved {
        let csa_ccy = stores.netting_sets.get(ns).map(|d| d.csa_currency).unwrap_or(base_currency);

        if let Some(existing) = stores.collateral_balances.get_mut(ns) {
            let balance_ccy = existing.currency.unwrap_or(csa_ccy);
            let rate = fx_rate(base_currency, balance_ccy);
            if existing.im.is_none() {
                existing.im = Some(r.im * rate);
            }
            if existing.vm.is_none() {
                existing.vm = Some(r.vm * rate);
            }
        } else if let Some(calculated) = stores.calculated_balances.get(ns).cloned() {
            let mut merged = calculated;
            merged.vm = Some(r.vm * fx_rate(base_currency, merged.currency.unwrap_or(base_currency)));
            stores.collateral_balances.insert(ns.clone(), merged);
        } else {
            stores.collateral_balances.insert(ns.clone(), CollateralBalance { currency: Some(base_currency), im: Some(r.im), vm: Some(r.vm) });
        }
    }
}

/// An in-memory sink, useful for tests and for callers that post-process
/// rows before writing them out.
#[derive(Debug, Default)]
pub struct VecSink<T> {
    /// Rows written so far.
    pub rows: Vec<T>,
}

impl<T> VecSink<T> {
    /// An empty sink.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Serialize + Clone> ReportSink<T> for VecSink<T> {
    fn write_row(&mut self, row: &T) -> Result<(), ReportError> {
        self.rows.push(row.clone());
        Ok(())
    }
}

/// A CSV sink backed by any `std::io::Write`, using `csv`'s serde support.
pub struct CsvSink<W: std::io::Write> {
    writer: csv::Writer<W>,
}

impl<W: std::io::Write> CsvSink<W> {
    /// Wraps `writer` in a new CSV sink.
    pub fn new(writer: W) -> Self {
        Self { writer: csv::Writer::from_writer(writer) }
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<(), ReportError> {
        self.writer.flush().map_err(|e| ReportError::Sink(e.to_string()))
    }
}

impl<T: Serialize, W: std::io::Write> ReportSink<T> for CsvSink<W> {
    fn write_row(&mut self, row: &T) -> Result<(), ReportError> {
        self.writer.serialize(row).map_err(|e| ReportError::Sink(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_report_has_all_row_for_empty_portfolio() {
        let aggregation = AggregationResult::default();
        let mut sink = VecSink::new();
        emit_summary(&aggregation, &mut sink).unwrap();
        assert_eq!(sink.rows.len(), 1);
        assert_eq!(sink.rows[0].level, "All");
    }
}
