//! S4 — the aggregator.
//!
//! Runs five phases, each completing fully before the next: level-0
//! initialisation, replacement cost, hedging-set add-ons, asset-class
//! and netting-set roll-up, and finally EAD/capital charge.

use std::collections::{HashMap, HashSet};

use crate::collateral::ResolvedCollateral;
use crate::config::PipelineConfig;
use crate::error::AggregationError;
use crate::ids::{CounterpartyId, NettingSetId};
use crate::record::{AssetClass, TradeRecord};
use crate::store::InputStores;

const IR_SUPERVISORY_FACTOR: f64 = 0.005;
const FX_SUPERVISORY_FACTOR: f64 = 0.04;
const COMMODITY_SF_POWER: f64 = 0.4;
const COMMODITY_SF_OTHER: f64 = 0.18;
const COMMODITY_CORRELATION: f64 = 0.4;
const EQUITY_SF_INDEX: f64 = 0.2;
const EQUITY_SF_SINGLE: f64 = 0.32;
const EQUITY_CORRELATION_INDEX: f64 = 0.8;
const EQUITY_CORRELATION_SINGLE: f64 = 0.5;
const IR_BUCKET_CROSS_12: f64 = 1.4;
const IR_BUCKET_CROSS_13: f64 = 0.6;
const MULTIPLIER_FLOOR: f64 = 0.05;
const MULTIPLIER_SCALE: f64 = 0.95;

/// A hedging-set key: `(netting set, asset class, hedging set name)`.
pub type HedgingSetKey = (NettingSetId, AssetClass, String);
/// An asset-class key: `(netting set, asset class)`.
pub type AssetClassKey = (NettingSetId, AssetClass);

/// Per-netting-set aggregation results.
#[derive(Clone, Debug, Default)]
pub struct NettingSetAggregate {
    /// Sum of classified-trade NPVs, base currency.
    pub npv: f64,
    /// Sum of `max(NPV, 0)` across trades (gross NPV).
    pub gross_npv: f64,
    /// Replacement cost.
    pub rc: f64,
    /// Netting-set-level add-on.
    pub add_on: f64,
    /// PFE multiplier.
    pub multiplier: f64,
    /// Potential future exposure.
    pub pfe: f64,
    /// Exposure at default.
    pub ead: f64,
    /// Risk weight used for the capital charge.
    pub risk_weight: f64,
    /// Capital charge.
    pub cc: f64,
    /// Add-on per asset class.
    pub add_on_by_asset_class: HashMap<AssetClass, f64>,
    /// NPV per asset class.
    pub npv_by_asset_class: HashMap<AssetClass, f64>,
    /// Add-on per hedging set, keyed by `(asset class, hedging set name)`
    /// so a report can nest hedging-set rows under their asset class.
    pub add_on_by_hedging_set: HashMap<(AssetClass, String), f64>,
    /// NPV per hedging set, keyed the same way.
    pub npv_by_hedging_set: HashMap<(AssetClass, String), f64>,
}

/// The result of running S4 over a whole portfolio.
#[derive(Clone, Debug, Default)]
pub struct AggregationResult {
    /// Per-netting-set results.
    pub netting_sets: HashMap<NettingSetId, NettingSetAggregate>,
    /// Sum of every netting set's capital charge.
    pub portfolio_cc: f64,
}

/// Runs S4 over the classified trade records.
pub fn aggregate(
    records: &[TradeRecord],
    stores: &InputStores,
    collateral: &HashMap<NettingSetId, ResolvedCollateral>,
    basis_hedging_sets: &HashSet<String>,
    config: &PipelineConfig,
) -> Result<AggregationResult, AggregationError> {
    let mut result = AggregationResult::default();

    // Phase A: level-0 initialisation.
    for ns in stores.netting_sets.keys() {
        result.netting_sets.insert(ns.clone(), NettingSetAggregate::default());
    }
    let mut first_counterparty: HashMap<NettingSetId, CounterpartyId> = HashMap::new();
    for record in records {
        let agg = result.netting_sets.entry(record.netting_set_id.clone()).or_default();
        agg.npv += record.npv_base_ccy;
        agg.gross_npv += record.npv_base_ccy.max(0.0);
        *agg.npv_by_asset_class.entry(record.asset_class).or_insert(0.0) += record.npv_base_ccy;
        *agg.npv_by_hedging_set.entry((record.asset_class, record.hedging_set.clone())).or_insert(0.0) += record.npv_base_ccy;
        first_counterparty.entry(record.netting_set_id.clone()).or_insert_with(|| record.counterparty_id.clone());
    }

    // Phase B: replacement cost.
    for (ns, agg) in result.netting_sets.iter_mut() {
        let c = collateral.get(ns).copied().unwrap_or_default();
        let nica = c.iah + c.im;
        let collateral_sum = c.vm + nica;
        agg.rc = (agg.npv - collateral_sum).max((c.th + c.mta - nica).max(0.0));
    }

    // Phase C: hedging-set add-ons.
    let mut by_hedging_set: HashMap<HedgingSetKey, Vec<&TradeRecord>> = HashMap::new();
    for record in records {
        by_hedging_set.entry((record.netting_set_id.clone(), record.asset_class, record.hedging_set.clone())).or_default().push(record);
    }

    for ((ns, asset_class, hs), trades) in &by_hedging_set {
        let mut add_on = match asset_class {
            AssetClass::Ir | AssetClass::Credit => ir_add_on(trades),
            AssetClass::Fx => fx_add_on(trades),
            AssetClass::Commodity => commodity_add_on(trades),
            AssetClass::Equity => equity_add_on(trades),
            AssetClass::None => return Err(AggregationError::UnknownAssetClass { netting_set: ns.clone() }),
        };
        if basis_hedging_sets.contains(hs) {
            add_on *= 0.5;
        }
        let agg = result.netting_sets.entry(ns.clone()).or_default();
        *agg.add_on_by_hedging_set.entry((*asset_class, hs.clone())).or_insert(0.0) += add_on;
        *agg.add_on_by_asset_class.entry(*asset_class).or_insert(0.0) += add_on;
    }

    // Phase D: asset-class and netting-set roll-up.
    for agg in result.netting_sets.values_mut() {
        agg.add_on = agg.add_on_by_asset_class.values().sum();
    }

    // Phase E: EAD and capital charge.
    for (ns, agg) in result.netting_sets.iter_mut() {
        let c = collateral.get(ns).copied().unwrap_or_default();
        let nica = c.iah + c.im;
        let collateral_sum = c.vm + nica;
        let a = agg.add_on;
        agg.multiplier = if a <= 0.0 {
            1.0
        } else {
            (MULTIPLIER_FLOOR + (1.0 - MULTIPLIER_FLOOR) * f64::exp((agg.npv - collateral_sum) / (2.0 * MULTIPLIER_SCALE * a))).min(1.0)
        };
        agg.pfe = agg.multiplier * a;
        agg.ead = config.alpha * (agg.rc + agg.pfe);

        let rw = match first_counterparty.get(ns).and_then(|c| stores.counterparties.get(c)) {
            Some(info) => info.saccr_rw,
            None if stores.counterparties.is_empty() => return Err(AggregationError::MissingRiskWeight { netting_set: ns.clone() }),
            // A netting set with no trades has no trade-derived counterparty;
            // its EAD is zero regardless, so the default risk weight is used.
            None => config.defaults.cpty_saccr_rw,
        };
        agg.risk_weight = rw;
        agg.cc = agg.ead * rw;
        result.portfolio_cc += agg.cc;
    }

    Ok(result)
}

fn ir_add_on(trades: &[&TradeRecord]) -> f64 {
    let mut d1 = 0.0;
    let mut d2 = 0.0;
    let mut d3 = 0.0;
    for t in trades {
        let e = t.delta * t.effective_notional * t.maturity_factor;
        if t.t_maturity < 1.0 {
            d1 += e;
        } else if t.t_maturity <= 5.0 {
            d2 += e;
        } else {
            d3 += e;
        }
    }
    let en = (d1 * d1 + d2 * d2 + d3 * d3 + IR_BUCKET_CROSS_12 * (d1 * d2 + d2 * d3) + IR_BUCKET_CROSS_13 * d1 * d3).sqrt();
    IR_SUPERVISORY_FACTOR * en
}

fn fx_add_on(trades: &[&TradeRecord]) -> f64 {
    let en: f64 = trades.iter().map(|t| t.delta * t.effective_notional * t.maturity_factor).sum();
    FX_SUPERVISORY_FACTOR * en.abs()
}

fn commodity_add_on(trades: &[&TradeRecord]) -> f64 {
    let mut by_subset: HashMap<String, f64> = HashMap::new();
    for t in trades {
        *by_subset.entry(t.hedging_subset.clone()).or_insert(0.0) += t.delta * t.effective_notional * t.maturity_factor;
    }
    let t_j: Vec<f64> = by_subset
        .iter()
        .map(|(subset, en)| {
            let sf = if subset == "Power" { COMMODITY_SF_POWER } else { COMMODITY_SF_OTHER };
            sf * en
        })
        .collect();
    let sum_t: f64 = t_j.iter().sum();
    let sum_t_sq: f64 = t_j.iter().map(|t| t * t).sum();
    let rho = COMMODITY_CORRELATION;
    ((rho * sum_t).powi(2) + (1.0 - rho * rho) * sum_t_sq).sqrt()
}

fn equity_add_on(trades: &[&TradeRecord]) -> f64 {
    let mut by_subset: HashMap<String, (f64, bool)> = HashMap::new();
    for t in trades {
        let entry = by_subset.entry(t.hedging_subset.clone()).or_insert((0.0, t.is_equity_index));
        entry.0 += t.delta * t.effective_notional * t.maturity_factor;
        entry.1 = t.is_equity_index;
    }
    let mut weighted_sum = 0.0;
    let mut unweighted_sum_sq = 0.0;
    for (en, is_index) in by_subset.values() {
        let sf = if *is_index { EQUITY_SF_INDEX } else { EQUITY_SF_SINGLE };
        let rho = if *is_index { EQUITY_CORRELATION_INDEX } else { EQUITY_CORRELATION_SINGLE };
        let t_j = sf * en;
        weighted_sum += rho * t_j;
        unweighted_sum_sq += (1.0 - rho * rho) * t_j * t_j;
    }
    (weighted_sum.powi(2) + unweighted_sum_sq).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CounterpartyId, CurrencyCode, TradeId};
    use crate::store::{CounterpartyInfo, NettingSetDefinition};
    use crate::trade::TradeType;

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    fn ir_trade(ns: &NettingSetId, cpty: &CounterpartyId, delta: f64, notional: f64, m: f64) -> TradeRecord {
        TradeRecord {
            trade_id: TradeId::new("T1"),
            trade_type: TradeType::Swap,
            netting_set_id: ns.clone(),
            counterparty_id: cpty.clone(),
            npv_base_ccy: 0.0,
            asset_class: AssetClass::Ir,
            hedging_set: "EUR".to_string(),
            hedging_subset: String::new(),
            m_start: 0.0,
            s_end: m,
            e_latest: m,
            t_maturity: m,
            maturity_factor: 1.0,
            notional,
            price1: 0.0,
            price2: 0.0,
            strike: 0.0,
            delta,
            supervisory_duration: 1.0,
            effective_notional: notional,
            is_equity_index: false,
        }
    }

    #[test]
    fn empty_portfolio_has_zero_everything() {
        let stores = InputStores::new();
        let collateral = HashMap::new();
        let basis = HashSet::new();
        let config = PipelineConfig::default();
        let result = aggregate(&[], &stores, &collateral, &basis, &config).unwrap();
        assert_eq!(result.portfolio_cc, 0.0);
    }

    #[test]
    fn single_ir_swap_matches_scenario_a_shape() {
        let ns = NettingSetId::new("CP1");
        let cpty = CounterpartyId::new("CP1");
        let mut stores = InputStores::new();
        stores.netting_sets.insert(ns.clone(), NettingSetDefinition::uncollateralised(usd()));
        stores.counterparties.insert(cpty.clone(), CounterpartyInfo::default_with_rw(1.0));

        let sd = (f64::exp(-0.05 * 0.0) - f64::exp(-0.05 * 10.0)) / 0.05;
        let notional = 100_000_000.0;
        let records = vec![ir_trade(&ns, &cpty, -1.0, sd * notional, 10.0)];

        let collateral = HashMap::new();
        let basis = HashSet::new();
        let config = PipelineConfig::default();
        let result = aggregate(&records, &stores, &collateral, &basis, &config).unwrap();
        let agg = result.netting_sets.get(&ns).unwrap();
        assert!(agg.add_on > 3.9e6 && agg.add_on < 3.95e6, "add_on={}", agg.add_on);
        assert_eq!(agg.rc, 0.0);
        assert!((agg.ead - config.alpha * agg.add_on).abs() < 1.0);
    }
}
