//! Property tests for portfolio-level invariants: the EAD formula,
//! multiplier bounds, the RC floor, closed-form FX add-ons, NPV
//! conservation, and clearing-member IM overrides.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use saccr_core::aggregate::aggregate;
use saccr_core::config::PipelineConfig;
use saccr_core::ids::{CounterpartyId, CurrencyCode, NettingSetId, TradeId};
use saccr_core::record::{AssetClass, TradeRecord};
use saccr_core::store::{CollateralBalance, CounterpartyInfo, InputStores, NettingSetDefinition};
use saccr_core::trade::TradeType;

fn usd() -> CurrencyCode {
    CurrencyCode::new("USD").unwrap()
}

fn eur() -> CurrencyCode {
    CurrencyCode::new("EUR").unwrap()
}

fn ir_record(ns: &NettingSetId, cpty: &CounterpartyId, delta: f64, notional: f64, mf: f64, maturity: f64, npv: f64) -> TradeRecord {
    TradeRecord {
        trade_id: TradeId::new("T"),
        trade_type: TradeType::Swap,
        netting_set_id: ns.clone(),
        counterparty_id: cpty.clone(),
        npv_base_ccy: npv,
        asset_class: AssetClass::Ir,
        hedging_set: "EUR".to_string(),
        hedging_subset: String::new(),
        m_start: 0.0,
        s_end: maturity,
        e_latest: maturity,
        t_maturity: maturity,
        maturity_factor: mf,
        notional,
        price1: 0.0,
        price2: 0.0,
        strike: 0.0,
        delta,
        supervisory_duration: 1.0,
        effective_notional: delta.abs() * notional * mf,
        is_equity_index: false,
    }
}

fn fx_record(ns: &NettingSetId, cpty: &CounterpartyId, delta: f64, notional: f64, mf: f64, hedging_set: &str) -> TradeRecord {
    TradeRecord {
        trade_id: TradeId::new("T"),
        trade_type: TradeType::FxForward,
        netting_set_id: ns.clone(),
        counterparty_id: cpty.clone(),
        npv_base_ccy: 0.0,
        asset_class: AssetClass::Fx,
        hedging_set: hedging_set.to_string(),
        hedging_subset: String::new(),
        m_start: 0.0,
        s_end: 0.5,
        e_latest: 0.5,
        t_maturity: 0.5,
        maturity_factor: mf,
        notional,
        price1: 0.0,
        price2: 0.0,
        strike: 0.0,
        delta,
        supervisory_duration: 1.0,
        effective_notional: notional.abs(),
        is_equity_index: false,
    }
}

fn single_netting_set_stores(csa_active: bool, rw: f64) -> (InputStores, NettingSetId, CounterpartyId) {
    let ns = NettingSetId::new(CounterpartyId::new("CP1"));
    let cpty = CounterpartyId::new("CP1");
    let mut stores = InputStores::new();
    let def = if csa_active { NettingSetDefinition::default_bilateral(usd(), 0.0, 0.0, 0.0, 2.0) } else { NettingSetDefinition::uncollateralised(usd()) };
    stores.netting_sets.insert(ns.clone(), def);
    stores.counterparties.insert(cpty.clone(), CounterpartyInfo::default_with_rw(rw));
    (stores, ns, cpty)
}

proptest! {
    /// Invariant 1: EAD = alpha * (RC + multiplier * add_on) for every netting set.
    #[test]
    fn ead_formula_holds(delta in -1.0f64..1.0, notional in 1.0f64..1e9, mf in 0.05f64..1.5, npv in -1e7f64..1e7) {
        let (stores, ns, cpty) = single_netting_set_stores(false, 1.0);
        let records = vec![ir_record(&ns, &cpty, delta, notional, mf, 5.0, npv)];
        let config = PipelineConfig::default();
        let result = aggregate(&records, &stores, &HashMap::new(), &HashSet::new(), &config).unwrap();
        let agg = result.netting_sets.get(&ns).unwrap();
        let expected_ead = config.alpha * (agg.rc + agg.multiplier * agg.add_on);
        prop_assert!((agg.ead - expected_ead).abs() < 1e-6);
    }

    /// Invariant 2: 0.05 <= multiplier <= 1.
    #[test]
    fn multiplier_is_bounded(delta in -1.0f64..1.0, notional in 1.0f64..1e9, mf in 0.05f64..1.5, npv in -1e7f64..1e7) {
        let (stores, ns, cpty) = single_netting_set_stores(false, 1.0);
        let records = vec![ir_record(&ns, &cpty, delta, notional, mf, 5.0, npv)];
        let config = PipelineConfig::default();
        let result = aggregate(&records, &stores, &HashMap::new(), &HashSet::new(), &config).unwrap();
        let agg = result.netting_sets.get(&ns).unwrap();
        prop_assert!(agg.multiplier >= 0.05 - 1e-9 && agg.multiplier <= 1.0 + 1e-9);
    }

    /// Invariant 3: RC >= max(NPV - C, 0), here with zero collateral so RC >= max(NPV, 0).
    #[test]
    fn rc_floors_npv(notional in 1.0f64..1e9, npv in -1e7f64..1e7) {
        let (stores, ns, cpty) = single_netting_set_stores(false, 1.0);
        let records = vec![ir_record(&ns, &cpty, -1.0, notional, 1.0, 5.0, npv)];
        let config = PipelineConfig::default();
        let result = aggregate(&records, &stores, &HashMap::new(), &HashSet::new(), &config).unwrap();
        let agg = result.netting_sets.get(&ns).unwrap();
        prop_assert!(agg.rc >= npv.max(0.0) - 1e-6);
    }

    /// Invariant 4: FX hedging-set add-on is exactly the supervisory
    /// factor times the absolute sum of signed effective notionals.
    #[test]
    fn fx_add_on_matches_closed_form(deltas in proptest::collection::vec(-1.0f64..1.0, 1..6), notional in 1.0f64..1e8) {
        let (stores, ns, cpty) = single_netting_set_stores(false, 1.0);
        let records: Vec<TradeRecord> = deltas.iter().map(|d| fx_record(&ns, &cpty, *d, notional, 1.0, "EURUSD")).collect();
        let config = PipelineConfig::default();
        let result = aggregate(&records, &stores, &HashMap::new(), &HashSet::new(), &config).unwrap();
        let agg = result.netting_sets.get(&ns).unwrap();
        let expected: f64 = deltas.iter().map(|d| d * notional).sum::<f64>().abs() * 0.04;
        prop_assert!((agg.add_on - expected).abs() < 1e-3);
    }

    /// Invariant 6: a clearing-CP netting set always resolves to zero IM,
    /// regardless of the user-supplied balance.
    #[test]
    fn clearing_cp_im_is_zero(user_im in 0.0f64..1e8) {
        let ns = NettingSetId::new(CounterpartyId::new("CCP1"));
        let cpty = CounterpartyId::new("CCP1");
        let mut stores = InputStores::new();
        let def = NettingSetDefinition::default_bilateral(usd(), 0.0, 0.0, 0.0, 2.0);
        stores.netting_sets.insert(ns.clone(), def);
        let mut info = CounterpartyInfo::default_with_rw(0.02);
        info.is_clearing_cp = true;
        stores.counterparties.insert(cpty, info);
        stores.push_raw_balance(ns.clone(), CollateralBalance { currency: Some(usd()), im: Some(user_im), vm: Some(0.0) });
        let config = PipelineConfig::default();

        saccr_core::validator::validate(&[], &mut stores, &config).unwrap();

        let market = saccr_core::market::InMemoryMarket::new();
        let resolved = saccr_core::collateral::resolve_collateral(&stores, &market, &HashMap::new(), usd()).unwrap();
        prop_assert_eq!(resolved.get(&ns).unwrap().im, 0.0);
    }
}

/// Invariant 5: the portfolio-level NPV sum across netting sets equals
/// the sum of the individual trade-record NPVs fed into aggregation.
#[test]
fn portfolio_npv_is_conserved() {
    let (stores, ns, cpty) = single_netting_set_stores(false, 1.0);
    let records = vec![
        ir_record(&ns, &cpty, -1.0, 1_000_000.0, 1.0, 5.0, 12_345.0),
        ir_record(&ns, &cpty, 1.0, 500_000.0, 1.0, 2.0, -6_789.0),
    ];
    let config = PipelineConfig::default();
    let result = aggregate(&records, &stores, &HashMap::new(), &HashSet::new(), &config).unwrap();
    let agg = result.netting_sets.get(&ns).unwrap();
    let expected: f64 = records.iter().map(|r| r.npv_base_ccy).sum();
    assert!((agg.npv - expected).abs() < 1e-9);
}

/// Invariant 7: FX hedging-set names are the lexicographically sorted
/// concatenation of the two currency codes, independent of trade side.
#[test]
fn fx_hedging_set_pair_is_sorted() {
    assert_eq!(classify_fx_pair(eur(), usd()), "EURUSD");
    assert_eq!(classify_fx_pair(usd(), eur()), "EURUSD");
}

fn classify_fx_pair(a: CurrencyCode, b: CurrencyCode) -> String {
    let (lo, hi) = if a.as_str() <= b.as_str() { (a, b) } else { (b, a) };
    format!("{}{}", lo.as_str(), hi.as_str())
}

/// Invariant 8: within one FX hedging set, delta sign tracks which side
/// of the pair is bought, consistently across trades.
#[test]
fn fx_delta_sign_tracks_bought_side() {
    let (stores, ns, cpty) = single_netting_set_stores(false, 1.0);
    let bought_eur = fx_record(&ns, &cpty, 1.0, 1_000_000.0, 1.0, "EURUSD");
    let bought_usd = fx_record(&ns, &cpty, -1.0, 1_100_000.0, 1.0, "EURUSD");
    let records = vec![bought_eur, bought_usd];
    let config = PipelineConfig::default();
    let result = aggregate(&records, &stores, &HashMap::new(), &HashSet::new(), &config).unwrap();
    let agg = result.netting_sets.get(&ns).unwrap();
    // Offsetting positions of near-equal size should net down, not add up.
    assert!(agg.add_on < 0.04 * 1_100_000.0);
}
