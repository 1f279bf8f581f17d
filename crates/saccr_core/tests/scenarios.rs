//! Worked end-to-end exposure scenarios covering FX forwards, clearing
//! member IM overrides, commodity basis-set netting, and equity index
//! options (the plain interest-rate swap scenario is covered inline in
//! `aggregate.rs`).

use std::collections::{HashMap, HashSet};

use approx::assert_relative_eq;
use chrono::NaiveDate;

use saccr_core::aggregate::aggregate;
use saccr_core::classify::classify_trades;
use saccr_core::config::PipelineConfig;
use saccr_core::ids::{CounterpartyId, CurrencyCode, NettingSetId, TradeId};
use saccr_core::market::{InMemoryBucketMapper, InMemoryMarket, InMemoryNameMapper, InMemoryReferenceData};
use saccr_core::record::AssetClass;
use saccr_core::store::{CollateralBalance, CounterpartyInfo, InputStores, NettingSetDefinition};
use saccr_core::trade::{CallPut, Leg, LongShort, OptionData, SimpleTrade, TradeEnvelope, TradeType, TradeView};

fn ccy(s: &str) -> CurrencyCode {
    CurrencyCode::new(s).unwrap()
}

fn val_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn fx_forward(id: &str, bought_ccy: CurrencyCode, bought_amount: f64, sold_ccy: CurrencyCode, sold_amount: f64, maturity: NaiveDate) -> SimpleTrade {
    SimpleTrade {
        id: id.to_string(),
        trade_type: Some(TradeType::FxForward),
        netting_set_id: Some(NettingSetId::new(CounterpartyId::new("CP1"))),
        counterparty_id: Some(CounterpartyId::new("CP1")),
        maturity_date: Some(maturity),
        bought_currency: Some(bought_ccy),
        sold_currency: Some(sold_ccy),
        bought_amount: Some(bought_amount),
        sold_amount: Some(sold_amount),
        npv_currency: Some(ccy("USD")),
        ..Default::default()
    }
}

fn base_stores() -> InputStores {
    let ns = NettingSetId::new(CounterpartyId::new("CP1"));
    let cpty = CounterpartyId::new("CP1");
    let mut stores = InputStores::new();
    stores.netting_sets.insert(ns, NettingSetDefinition::uncollateralised(ccy("USD")));
    stores.counterparties.insert(cpty, CounterpartyInfo::default_with_rw(1.0));
    stores
}

/// B. Single FxForward EUR1M bought / USD1.1M sold, 6M maturity, no CSA,
/// base USD: AC=FX, HS="EURUSD", delta=+1, MF=sqrt(0.5).
#[test]
fn scenario_b_single_fx_forward() {
    let maturity = val_date() + chrono::Duration::days(182);
    let trade = fx_forward("B1", ccy("EUR"), 1_000_000.0, ccy("USD"), 1_100_000.0, maturity);
    let trades: Vec<Box<dyn TradeView>> = vec![Box::new(trade)];

    let stores = base_stores();
    let market = InMemoryMarket::new().with_fx_rate(ccy("EUR"), ccy("USD"), 1.1);
    let name_mapper = InMemoryNameMapper::new();
    let bucket_mapper = InMemoryBucketMapper::new();
    let reference_data = InMemoryReferenceData::new();
    let config = PipelineConfig::default();

    let result = classify_trades(&trades, &market, &name_mapper, &bucket_mapper, &reference_data, &stores, &config, val_date());
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics.iter().map(|d| &d.detail).collect::<Vec<_>>());
    assert_eq!(result.records.len(), 1);

    let record = &result.records[0];
    assert_eq!(record.asset_class, AssetClass::Fx);
    assert_eq!(record.hedging_set, "EURUSD");
    assert_eq!(record.delta, 1.0);
    assert_relative_eq!(record.maturity_factor, (182.0f64 / 365.0).sqrt(), epsilon = 1e-6);
    assert_relative_eq!(record.notional, 1_000_000.0 * 1.1, epsilon = 1e-6);

    let agg_result = aggregate(&result.records, &stores, &HashMap::new(), &result.basis_hedging_sets, &config).unwrap();
    let ns = NettingSetId::new(CounterpartyId::new("CP1"));
    let agg = agg_result.netting_sets.get(&ns).unwrap();
    let expected_add_on = 0.04 * (record.delta * record.effective_notional * record.maturity_factor).abs();
    assert_relative_eq!(agg.add_on, expected_add_on, epsilon = 1.0);
    assert_relative_eq!(agg.ead, config.alpha * agg.add_on, epsilon = 1.0);
}

/// C. Two offsetting FxForward trades in the same EURUSD hedging set
/// (EUR1M bought and EUR1M sold, same maturity): addOn(hs) nets to zero.
#[test]
fn scenario_c_offsetting_fx_forwards_net_to_zero() {
    let maturity = val_date() + chrono::Duration::days(182);
    let bought = fx_forward("C1", ccy("EUR"), 1_000_000.0, ccy("USD"), 1_100_000.0, maturity);
    let sold = fx_forward("C2", ccy("USD"), 1_100_000.0, ccy("EUR"), 1_000_000.0, maturity);
    let trades: Vec<Box<dyn TradeView>> = vec![Box::new(bought), Box::new(sold)];

    let stores = base_stores();
    let market = InMemoryMarket::new().with_fx_rate(ccy("EUR"), ccy("USD"), 1.1);
    let name_mapper = InMemoryNameMapper::new();
    let bucket_mapper = InMemoryBucketMapper::new();
    let reference_data = InMemoryReferenceData::new();
    let config = PipelineConfig::default();

    let result = classify_trades(&trades, &market, &name_mapper, &bucket_mapper, &reference_data, &stores, &config, val_date());
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].hedging_set, result.records[1].hedging_set);
    assert_ne!(result.records[0].delta.signum(), result.records[1].delta.signum());

    let agg_result = aggregate(&result.records, &stores, &HashMap::new(), &result.basis_hedging_sets, &config).unwrap();
    let ns = NettingSetId::new(CounterpartyId::new("CP1"));
    let agg = agg_result.netting_sets.get(&ns).unwrap();
    assert_relative_eq!(agg.add_on, 0.0, epsilon = 1.0);
}

/// D. Portfolio with one clearing-CP netting set and a non-zero user
/// IM: after S1/S3, IM used in RC is 0.
#[test]
fn scenario_d_clearing_cp_im_is_overridden_to_zero() {
    let ns = NettingSetId::new(CounterpartyId::new("CCP1"));
    let cpty = CounterpartyId::new("CCP1");
    let mut stores = InputStores::new();
    stores.netting_sets.insert(ns.clone(), NettingSetDefinition::default_bilateral(ccy("USD"), 0.0, 0.0, 0.0, 2.0));
    let mut info = CounterpartyInfo::default_with_rw(0.02);
    info.is_clearing_cp = true;
    stores.counterparties.insert(cpty, info);
    stores.push_raw_balance(ns.clone(), CollateralBalance { currency: Some(ccy("USD")), im: Some(5_000_000.0), vm: Some(0.0) });

    let config = PipelineConfig::default();
    saccr_core::validator::validate(&[], &mut stores, &config).unwrap();

    assert_eq!(stores.collateral_balances.get(&ns).unwrap().im, Some(0.0));

    let market = InMemoryMarket::new();
    let resolved = saccr_core::collateral::resolve_collateral(&stores, &market, &HashMap::new(), ccy("USD")).unwrap();
    assert_eq!(resolved.get(&ns).unwrap().im, 0.0);
}

/// E. Commodity basis swap WTI vs Brent: the hedging set is flagged as
/// basis, so its add-on contribution is halved relative to an
/// otherwise-identical non-basis hedging set.
#[test]
fn scenario_e_commodity_basis_hedging_set_is_halved() {
    use saccr_core::ids::TradeId as Tid;
    use saccr_core::record::TradeRecord;

    let ns = NettingSetId::new(CounterpartyId::new("CP1"));
    let cpty = CounterpartyId::new("CP1");
    let mut stores = InputStores::new();
    stores.netting_sets.insert(ns.clone(), NettingSetDefinition::uncollateralised(ccy("USD")));
    stores.counterparties.insert(cpty.clone(), CounterpartyInfo::default_with_rw(1.0));

    let record = |hs: &str| TradeRecord {
        trade_id: Tid::new("E1"),
        trade_type: TradeType::CommoditySwap,
        netting_set_id: ns.clone(),
        counterparty_id: cpty.clone(),
        npv_base_ccy: 0.0,
        asset_class: AssetClass::Commodity,
        hedging_set: hs.to_string(),
        hedging_subset: String::new(),
        m_start: 0.0,
        s_end: 1.0,
        e_latest: 1.0,
        t_maturity: 1.0,
        maturity_factor: 1.0,
        notional: 1_000_000.0,
        price1: 0.0,
        price2: 0.0,
        strike: 0.0,
        delta: 1.0,
        supervisory_duration: 1.0,
        effective_notional: 1_000_000.0,
        is_equity_index: false,
    };

    let config = PipelineConfig::default();

    let basis_records = vec![record("COMM-WTI/COMM-Brent")];
    let mut basis_sets = HashSet::new();
    basis_sets.insert("COMM-WTI/COMM-Brent".to_string());
    let basis_result = aggregate(&basis_records, &stores, &HashMap::new(), &basis_sets, &config).unwrap();

    let plain_records = vec![record("COMM-WTI/COMM-Brent")];
    let plain_result = aggregate(&plain_records, &stores, &HashMap::new(), &HashSet::new(), &config).unwrap();

    let basis_add_on = basis_result.netting_sets.get(&ns).unwrap().add_on;
    let plain_add_on = plain_result.netting_sets.get(&ns).unwrap().add_on;
    assert_relative_eq!(basis_add_on, plain_add_on * 0.5, epsilon = 1e-6);
}

/// F. Equity option on an index (reference-data isIndex=true): sigma =
/// 0.2, delta via the supervisory Phi formula.
#[test]
fn scenario_f_equity_index_option() {
    let trade = SimpleTrade {
        id: "F1".to_string(),
        trade_type: Some(TradeType::EquityOption),
        netting_set_id: Some(NettingSetId::new(CounterpartyId::new("CP1"))),
        counterparty_id: Some(CounterpartyId::new("CP1")),
        maturity_date: Some(val_date() + chrono::Duration::days(365)),
        npv_currency: Some(ccy("USD")),
        underlying_name: Some("SPX".to_string()),
        underlying_quantity: Some(1_000.0),
        option_data: Some(OptionData {
            call_put: CallPut::Call,
            long_short: LongShort::Long,
            exercise_dates: vec![val_date() + chrono::Duration::days(365)],
            style: saccr_core::trade::ExerciseStyle::European,
            payoff_at_expiry: true,
        }),
        additional_results: {
            let mut m = std::collections::HashMap::new();
            m.insert("strike".to_string(), 100.0);
            m.insert("atmForward".to_string(), 105.0);
            m
        },
        ..Default::default()
    };
    let trades: Vec<Box<dyn TradeView>> = vec![Box::new(trade)];

    let stores = base_stores();
    let market = InMemoryMarket::new().with_equity("SPX", 100.0, ccy("USD"));
    let name_mapper = InMemoryNameMapper::new();
    let bucket_mapper = InMemoryBucketMapper::new();
    let reference_data = InMemoryReferenceData::new().with_equity_index("SPX");
    let config = PipelineConfig::default();

    let result = classify_trades(&trades, &market, &name_mapper, &bucket_mapper, &reference_data, &stores, &config, val_date());
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics.iter().map(|d| &d.detail).collect::<Vec<_>>());
    assert_eq!(result.records.len(), 1);

    let record = &result.records[0];
    assert_eq!(record.asset_class, AssetClass::Equity);
    assert_eq!(record.hedging_set, "Equity");
    assert!(record.is_equity_index);
    assert_relative_eq!(record.notional, 100_000.0, epsilon = 1e-6);
    assert!(record.delta > 0.0, "long call should have a positive delta");

    let agg_result = aggregate(&result.records, &stores, &HashMap::new(), &result.basis_hedging_sets, &config).unwrap();
    let ns = NettingSetId::new(CounterpartyId::new("CP1"));
    let agg = agg_result.netting_sets.get(&ns).unwrap();
    let expected_add_on = 0.2 * (record.delta * record.effective_notional * record.maturity_factor).abs();
    assert_relative_eq!(agg.add_on, expected_add_on, epsilon = 1e-3);
}
