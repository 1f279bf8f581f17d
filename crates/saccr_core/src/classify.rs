//! S2 — the trade classifier.
//!
//! Maps each [`TradeView`] to an asset class, a hedging set and subset,
//! a maturity factor, a supervisory delta, and an adjusted notional,
//! producing one [`TradeRecord`] per classifiable trade.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::config::PipelineConfig;
use crate::diagnostics::{Diagnostic, DiagnosticCategory, Severity};
use crate::error::ClassifyError;
use crate::ids::{CounterpartyId, CurrencyCode, NettingSetId, TradeId};
use crate::market::{BucketMapper, Market, NameMapper, ReferenceData};
use crate::math::{act_act_isda, phi};
use crate::record::{AssetClass, TradeRecord};
use crate::store::InputStores;
use crate::trade::{CallPut, Leg, LongShort, OptionData, TradeType, TradeView, UnderlyingAssetClass};

/// Regions a commodity qualifier may carry as a trailing word; stripping
/// one collapses e.g. "Coal Americas" and "Coal Europe" onto "Coal".
const COMMODITY_REGIONS: &[&str] = &["Americas", "Europe", "Africa", "Australia", "Asia", "APAC", "EMEA"];

const SIGMA_IR: f64 = 0.5;
const SIGMA_FX: f64 = 0.15;
const SIGMA_EQUITY_INDEX: f64 = 0.2;
const SIGMA_EQUITY_SINGLE: f64 = 0.32;

const SUPERVISORY_DURATION_FLOOR_YEARS: f64 = 2.0 / 52.0;
const LARGE_NETTING_SET_MPOR_WEEKS: f64 = 4.0;

/// The outcome of classifying a single trade.
pub enum ClassifyOutcome {
    /// Successfully classified.
    Classified(TradeRecord),
    /// Trade type not supported; excluded, non-fatal.
    Unsupported(Diagnostic),
}

/// The accumulated result of classifying a whole portfolio.
pub struct ClassifyResult {
    /// One record per successfully classified trade.
    pub records: Vec<TradeRecord>,
    /// Hedging-set names whose add-on must be halved in S4 because they
    /// reference a basis between two risk factors of the same class.
    pub basis_hedging_sets: HashSet<String>,
    /// Diagnostics raised along the way.
    pub diagnostics: Vec<Diagnostic>,
}

/// Classifies every trade in `trades`.
#[allow(clippy::too_many_arguments)]
pub fn classify_trades(
    trades: &[Box<dyn TradeView>],
    market: &dyn Market,
    name_mapper: &dyn NameMapper,
    bucket_mapper: &dyn BucketMapper,
    reference_data: &dyn ReferenceData,
    stores: &InputStores,
    config: &PipelineConfig,
    valuation_date: NaiveDate,
) -> ClassifyResult {
    let mut trade_count_by_netting_set: HashMap<NettingSetId, usize> = HashMap::new();
    for trade in trades {
        *trade_count_by_netting_set.entry(trade.envelope().netting_set_id).or_insert(0) += 1;
    }

    let mut result = ClassifyResult { records: Vec::new(), basis_hedging_sets: HashSet::new(), diagnostics: Vec::new() };

    for trade in trades {
        match classify_one(trade.as_ref(), market, name_mapper, bucket_mapper, reference_data, stores, config, valuation_date, &trade_count_by_netting_set, &mut result.basis_hedging_sets) {
            Ok(ClassifyOutcome::Classified(record)) => result.records.push(record),
            Ok(ClassifyOutcome::Unsupported(diag)) => result.diagnostics.push(diag),
            Err(err) => {
                let diag = Diagnostic::new(Severity::Error, DiagnosticCategory::DeltaError, trade.id().to_string(), "classify trade", err.to_string());
                result.diagnostics.push(diag);
            }
        }
    }

    result
}

#[allow(clippy::too_many_arguments)]
fn classify_one(
    trade: &dyn TradeView,
    market: &dyn Market,
    name_mapper: &dyn NameMapper,
    bucket_mapper: &dyn BucketMapper,
    reference_data: &dyn ReferenceData,
    stores: &InputStores,
    config: &PipelineConfig,
    valuation_date: NaiveDate,
    trade_count_by_netting_set: &HashMap<NettingSetId, usize>,
    basis_hedging_sets: &mut HashSet<String>,
) -> Result<ClassifyOutcome, ClassifyError> {
    let trade_type = trade.trade_type();
    if trade_type == TradeType::Failed {
        return Ok(ClassifyOutcome::Unsupported(Diagnostic::new(
            Severity::Warning,
            DiagnosticCategory::TradeUnsupported,
            trade.id().to_string(),
            "classify trade",
            "trade type is not in the supported set",
        )));
    }

    let envelope = trade.envelope();
    let legs = trade.legs();
    let distinct_ccys: HashSet<CurrencyCode> = legs.iter().map(|l| l.currency).collect();

    let mut asset_class = base_asset_class(trade_type);
    if matches!(trade_type, TradeType::Swap | TradeType::Swaption) && distinct_ccys.len() >= 2 {
        asset_class = AssetClass::Fx;
    }
    if asset_class == AssetClass::Commodity && distinct_ccys.len() >= 2 {
        return Err(ClassifyError::CommodityCrossCurrency { trade: trade.id() });
    }

    // NPV: base-currency conversion.
    let npv_ccy = trade.npv_currency();
    let npv_own = trade.npv();
    let npv_base = npv_own * market.fx_rate(npv_ccy, config.base_currency).unwrap_or(1.0);

    let maturity = trade.maturity_date();
    let m_years = act_act_isda(valuation_date, maturity).max(0.0);

    let netting_set_count = trade_count_by_netting_set.get(&envelope.netting_set_id).copied().unwrap_or(0);
    let is_clearing_cp = stores.counterparties.get(&envelope.counterparty_id).map(|c| c.is_clearing_cp).unwrap_or(false);
    let csa_active = stores.netting_sets.get(&envelope.netting_set_id).map(|d| d.csa_active).unwrap_or(false);
    let mpor_weeks = stores.netting_sets.get(&envelope.netting_set_id).map(|d| d.mpor_weeks).unwrap_or(config.defaults.netting_set_mpor_weeks);

    let maturity_factor = if csa_active {
        let weeks = if netting_set_count > config.large_netting_set_trade_count && !is_clearing_cp {
            LARGE_NETTING_SET_MPOR_WEEKS
        } else {
            mpor_weeks
        };
        1.5 * (weeks / 52.0).sqrt()
    } else {
        (m_years.max(SUPERVISORY_DURATION_FLOOR_YEARS).min(1.0)).sqrt()
    };

    let (s_start, e_end, supervisory_duration) = if matches!(asset_class, AssetClass::Ir | AssetClass::Credit) {
        let first_flow = legs.iter().filter_map(|l| l.first_flow_date()).filter(|d| *d > valuation_date).min();
        let last_flow = legs.iter().filter_map(|l| l.last_flow_date()).max();
        let s = first_flow.map(|d| act_act_isda(valuation_date, d)).unwrap_or(0.0);
        let e = last_flow.map(|d| act_act_isda(valuation_date, d)).unwrap_or(0.0);
        let sd = (f64::exp(-0.05 * s) - f64::exp(-0.05 * e)) / 0.05;
        (s, e, sd)
    } else {
        (0.0, 0.0, 1.0)
    };

    let latest_expiry = latest_option_expiry(trade, valuation_date);

    let (hedging_set, hedging_subset, is_equity_index) =
        hedging_set_and_subset(trade, asset_class, legs, name_mapper, bucket_mapper, reference_data, basis_hedging_sets);

    let first_risk_factor = first_risk_factor(asset_class, &hedging_set, &hedging_subset);

    if asset_class == AssetClass::Ir && hedging_set.contains("BASIS") {
        return Err(ClassifyError::DeltaError { trade: trade.id(), detail: "IR basis swaps/swaptions are not supported for delta computation".to_string() });
    }

    let t_for_delta = latest_expiry.unwrap_or(0.0);
    let (delta, price1, price2, strike) =
        compute_delta(trade, trade_type, asset_class, &first_risk_factor, market, config.base_currency, valuation_date, maturity, t_for_delta, is_equity_index)?;

    let mut notional = adjusted_notional_raw(trade, trade_type, asset_class, &first_risk_factor, market, config.base_currency, valuation_date).unwrap_or(0.0);
    let mut override_delta_sign: Option<f64> = None;

    if trade_type == TradeType::CommoditySwap && notional < 0.0 {
        override_delta_sign = Some(notional.signum());
        notional = notional.abs();
    }

    let delta = override_delta_sign.unwrap_or(delta);

    let effective_notional = if matches!(asset_class, AssetClass::Ir | AssetClass::Credit) {
        supervisory_duration * notional.abs()
    } else {
        notional.abs()
    };

    let record = TradeRecord {
        trade_id: trade.id(),
        trade_type,
        netting_set_id: envelope.netting_set_id,
        counterparty_id: envelope.counterparty_id,
        npv_base_ccy: npv_base,
        asset_class,
        hedging_set,
        hedging_subset,
        m_start: s_start,
        s_end: e_end,
        e_latest: latest_expiry.unwrap_or(e_end.max(m_years)),
        t_maturity: m_years,
        maturity_factor,
        notional: notional.abs(),
        price1,
        price2,
        strike,
        delta,
        supervisory_duration,
        effective_notional,
        is_equity_index,
    };

    Ok(ClassifyOutcome::Classified(record))
}

fn base_asset_class(trade_type: TradeType) -> AssetClass {
    match trade_type {
        TradeType::Swap | TradeType::Swaption => AssetClass::Ir,
        TradeType::FxForward | TradeType::FxOption | TradeType::FxBarrierOption | TradeType::FxTouchOption => AssetClass::Fx,
        TradeType::CommodityForward | TradeType::CommoditySwap => AssetClass::Commodity,
        TradeType::EquityOption | TradeType::TotalReturnSwap => AssetClass::Equity,
        TradeType::Failed => AssetClass::None,
    }
}

fn latest_option_expiry(trade: &dyn TradeView, valuation_date: NaiveDate) -> Option<f64> {
    if let Some(opt) = trade.option_data() {
        return opt.latest_exercise_date().map(|d| act_act_isda(valuation_date, d).max(0.0));
    }
    if trade.trade_type() == TradeType::TotalReturnSwap {
        if let Some(opt) = trade.underlying_option() {
            return opt.latest_exercise_date().map(|d| act_act_isda(valuation_date, d).max(0.0));
        }
    }
    None
}

fn tenor_of(index: &str) -> &str {
    index.rsplit('-').next().unwrap_or(index)
}

fn collapse_region(qualifier: &str) -> String {
    for region in COMMODITY_REGIONS {
        if let Some(stripped) = qualifier.strip_suffix(&format!(" {region}")) {
            return stripped.to_string();
        }
    }
    qualifier.to_string()
}

fn fx_pair_hedging_set(a: CurrencyCode, b: CurrencyCode) -> String {
    let (lo, hi) = if a.as_str() <= b.as_str() { (a, b) } else { (b, a) };
    format!("{}{}", lo.as_str(), hi.as_str())
}

fn hedging_set_and_subset(
    trade: &dyn TradeView,
    asset_class: AssetClass,
    legs: &[Leg],
    name_mapper: &dyn NameMapper,
    bucket_mapper: &dyn BucketMapper,
    reference_data: &dyn ReferenceData,
    basis_hedging_sets: &mut HashSet<String>,
) -> (String, String, bool) {
    match asset_class {
        AssetClass::Fx => {
            let (a, b) = fx_currency_pair(trade, legs);
            (fx_pair_hedging_set(a, b), String::new(), false)
        }
        AssetClass::Ir | AssetClass::Credit => {
            let ccy = legs.first().map(|l| l.currency).unwrap_or_else(|| CurrencyCode::new("USD").unwrap());
            let inf = trade.underlyings(UnderlyingAssetClass::Inf);
            let ir = trade.underlyings(UnderlyingAssetClass::Ir);
            if !inf.is_empty() {
                let hs = format!("{}-BASIS-IBOR-INFLATION", ccy);
                basis_hedging_sets.insert(hs.clone());
                (hs, String::new(), false)
            } else if ir.len() == 2 {
                let hs = if ir.iter().any(|i| i == "USD-SIFMA") {
                    "USD-BASIS-BMA".to_string()
                } else {
                    let mut tenors: Vec<&str> = ir.iter().map(|i| tenor_of(i)).collect();
                    tenors.sort_unstable();
                    format!("{}-BASIS-{}-{}", ccy, tenors[0], tenors[1])
                };
                basis_hedging_sets.insert(hs.clone());
                (hs, String::new(), false)
            } else {
                (ccy.to_string(), String::new(), false)
            }
        }
        AssetClass::Commodity => {
            let underlyings = trade.underlyings(UnderlyingAssetClass::Com);
            if underlyings.len() >= 2 {
                let hs = format!("{}/{}", underlyings[0], underlyings[1]);
                let q0 = name_mapper.qualifier(&underlyings[0]);
                let q1 = name_mapper.qualifier(&underlyings[1]);
                let subset = if bucket_mapper.bucket(&q0) == "Power" || bucket_mapper.bucket(&q1) == "Power" { "Power".to_string() } else { String::new() };
                basis_hedging_sets.insert(hs.clone());
                (hs, subset, false)
            } else if let Some(name) = underlyings.first().cloned().or_else(|| trade.underlying_name().map(String::from)) {
                let qualifier = name_mapper.qualifier(&name);
                let bucket = bucket_mapper.bucket(&qualifier);
                (bucket, collapse_region(&qualifier), false)
            } else {
                (String::new(), String::new(), false)
            }
        }
        AssetClass::Equity => {
            let name = trade.underlying_name().map(str::to_string).unwrap_or_default();
            let is_index = reference_data.is_equity_index(&name);
            ("Equity".to_string(), name, is_index)
        }
        AssetClass::None => (String::new(), String::new(), false),
    }
}

fn fx_currency_pair(trade: &dyn TradeView, legs: &[Leg]) -> (CurrencyCode, CurrencyCode) {
    if matches!(trade.trade_type(), TradeType::Swap) {
        let mut it = legs.iter().map(|l| l.currency);
        let a = it.next().unwrap_or_else(|| CurrencyCode::new("USD").unwrap());
        let b = it.find(|c| *c != a).unwrap_or(a);
        (a, b)
    } else if trade.trade_type() == TradeType::FxForward {
        let a = trade.bought_currency().unwrap_or_else(|| CurrencyCode::new("USD").unwrap());
        let b = trade.sold_currency().unwrap_or(a);
        (a, b)
    } else {
        let a = trade.bought_currency().unwrap_or_else(|| CurrencyCode::new("USD").unwrap());
        let b = trade.sold_currency().unwrap_or(a);
        (a, b)
    }
}

fn first_risk_factor(asset_class: AssetClass, hedging_set: &str, hedging_subset: &str) -> String {
    match asset_class {
        AssetClass::Fx => hedging_set.chars().take(3).collect(),
        AssetClass::Ir | AssetClass::Credit => String::new(),
        AssetClass::Equity | AssetClass::Commodity => {
            if hedging_set.contains('/') {
                hedging_set.to_string()
            } else {
                hedging_subset.to_string()
            }
        }
        AssetClass::None => String::new(),
    }
}

/// Replicates the source `phi(P, K, T, sigma, callPut)`: the degenerate
/// `T ≈ 0` limit returns `sign(callPut · ln(P/K))` instead of `Φ(0)`.
fn supervisory_option_phi(p: f64, k: f64, t: f64, sigma: f64, call_put: f64) -> Result<f64, String> {
    if k.abs() < 1e-12 {
        return Err("strike is zero".to_string());
    }
    if sigma.abs() < 1e-12 {
        return Err("supervisory volatility is zero".to_string());
    }
    if t.abs() < 1e-9 {
        let x = call_put * (p / k).ln();
        return Ok(if x > 0.0 { 1.0 } else { -1.0 });
    }
    let x = call_put * ((p / k).ln() + 0.5 * sigma * sigma * t) / (sigma * t.sqrt());
    Ok(phi(x))
}

fn call_put_sign(data: &OptionData) -> f64 {
    match data.call_put {
        CallPut::Call => 1.0,
        CallPut::Put => -1.0,
    }
}

fn bought_sold_sign(data: &OptionData) -> f64 {
    match data.long_short {
        LongShort::Long => 1.0,
        LongShort::Short => -1.0,
    }
}

/// Computes (delta, price1, price2, strike).
#[allow(clippy::too_many_arguments)]
fn compute_delta(
    trade: &dyn TradeView,
    trade_type: TradeType,
    asset_class: AssetClass,
    first_risk_factor: &str,
    market: &dyn Market,
    base_ccy: CurrencyCode,
    valuation_date: NaiveDate,
    maturity: NaiveDate,
    t_for_delta: f64,
    is_equity_index: bool,
) -> Result<(f64, f64, f64, f64), ClassifyError> {
    match trade_type {
        TradeType::Swap if asset_class == AssetClass::Fx => {
            let leg = trade.legs().iter().find(|l| l.currency.as_str() == first_risk_factor);
            let sign = leg.map(|l| if l.payer { -1.0 } else { 1.0 }).unwrap_or(1.0);
            Ok((sign, 0.0, 0.0, 0.0))
        }
        TradeType::Swap => {
            let floating = trade.legs().iter().find(|l| l.floating);
            let sign = floating.map(|l| if l.payer { -1.0 } else { 1.0 }).unwrap_or(1.0);
            Ok((sign, 0.0, 0.0, 0.0))
        }
        TradeType::FxForward => {
            let bought = trade.bought_currency().unwrap_or_else(|| CurrencyCode::new("USD").unwrap());
            let sign = if bought.as_str() == first_risk_factor { 1.0 } else { -1.0 };
            Ok((sign, 0.0, 0.0, 0.0))
        }
        TradeType::Swaption => {
            let strike = trade.additional_result("strike").ok_or_else(|| ClassifyError::BadOption { trade: trade.id(), detail: "missing strike".to_string() })?;
            let price = trade.additional_result("atmForward").ok_or_else(|| ClassifyError::BadOption { trade: trade.id(), detail: "missing atmForward".to_string() })?;
            let opt = trade.option_data().ok_or_else(|| ClassifyError::BadOption { trade: trade.id(), detail: "missing option data".to_string() })?;
            let call_put = call_put_sign(opt);
            let multiplier = call_put * bought_sold_sign(opt);
            let base = supervisory_option_phi(price, strike, t_for_delta, SIGMA_IR, call_put).map_err(|detail| ClassifyError::BadOption { trade: trade.id(), detail })?;
            Ok((base * multiplier, price, 0.0, strike))
        }
        TradeType::FxOption | TradeType::FxBarrierOption | TradeType::FxTouchOption => {
            let orig_bought = trade.bought_currency().unwrap_or_else(|| CurrencyCode::new("USD").unwrap());
            let orig_sold = trade.sold_currency().unwrap_or(orig_bought);
            let flip = orig_bought.as_str() != first_risk_factor;
            let (bought, sold) = if flip { (orig_sold, orig_bought) } else { (orig_bought, orig_sold) };

            let maturity_t = act_act_isda(valuation_date, maturity).max(0.0);
            let disc1near = market.discount_factor(bought, 0.0).unwrap_or(1.0);
            let disc1far = market.discount_factor(bought, maturity_t).unwrap_or(1.0);
            let disc2near = market.discount_factor(sold, 0.0).unwrap_or(1.0);
            let disc2far = market.discount_factor(sold, maturity_t).unwrap_or(1.0);
            let fx = market.fx_rate(bought, sold).unwrap_or(1.0);
            let price = disc1near / disc1far * disc2far / disc2near * fx;

            let strike = if trade_type == TradeType::FxOption {
                trade.additional_result("strike")
            } else {
                trade.additional_result("strike").or_else(|| trade.barrier_levels().first().copied())
            }
            .ok_or_else(|| ClassifyError::BadOption { trade: trade.id(), detail: "missing strike/barrier level".to_string() })?;

            let opt = trade.option_data().ok_or_else(|| ClassifyError::BadOption { trade: trade.id(), detail: "missing option data".to_string() })?;
            let mut call_put = call_put_sign(opt);
            if flip {
                call_put *= -1.0;
            }
            let multiplier = call_put * bought_sold_sign(opt);
            let base = supervisory_option_phi(price, strike, t_for_delta, SIGMA_FX, call_put).map_err(|detail| ClassifyError::BadOption { trade: trade.id(), detail })?;
            Ok((base * multiplier, price, 0.0, strike))
        }
        TradeType::EquityOption => {
            let strike = trade.additional_result("strike").ok_or_else(|| ClassifyError::BadOption { trade: trade.id(), detail: "missing strike".to_string() })?;
            let price = trade.additional_result("atmForward").or_else(|| trade.additional_result("forward")).ok_or_else(|| ClassifyError::BadOption { trade: trade.id(), detail: "missing forward/atmForward".to_string() })?;
            let opt = trade.option_data().ok_or_else(|| ClassifyError::BadOption { trade: trade.id(), detail: "missing option data".to_string() })?;
            let call_put = call_put_sign(opt);
            let multiplier = call_put * bought_sold_sign(opt);
            let sigma = if is_equity_index { SIGMA_EQUITY_INDEX } else { SIGMA_EQUITY_SINGLE };
            let base = supervisory_option_phi(price, strike, t_for_delta, sigma, call_put).map_err(|detail| ClassifyError::BadOption { trade: trade.id(), detail })?;
            let spot = trade
                .underlying_name()
                .and_then(|name| {
                    let fixing = market.equity_fixing(name, valuation_date)?;
                    let ccy = market.equity_currency(name).unwrap_or(base_ccy);
                    Some(fixing * market.fx_rate(ccy, base_ccy).unwrap_or(1.0))
                })
                .unwrap_or(price);
            Ok((base * multiplier, spot, price, strike))
        }
        TradeType::CommoditySwap => {
            let underlyings = trade.underlyings(UnderlyingAssetClass::Com);
            let legs = trade.legs();
            let both_floating = legs.len() == 2 && legs.iter().all(|l| l.floating);
            let leg = if both_floating && underlyings.len() == 2 {
                legs.iter().find(|l| l.index_names.iter().any(|n| n == &underlyings[0])).or_else(|| legs.first())
            } else {
                legs.iter().find(|l| l.floating).or_else(|| legs.first())
            };
            let sign = leg.map(|l| if l.payer { -1.0 } else { 1.0 }).unwrap_or(1.0);
            Ok((sign, 0.0, 0.0, 0.0))
        }
        TradeType::CommodityForward => {
            let sign = trade.position_sign().unwrap_or(1.0).signum();
            let quantity = trade.underlying_quantity().unwrap_or(0.0);
            let notional = quantity.abs() * market.fx_rate(trade.npv_currency(), base_ccy).unwrap_or(1.0);
            let price1 = if quantity.abs() > 1e-12 { notional / quantity.abs() } else { 0.0 };
            Ok((if sign >= 0.0 { 1.0 } else { -1.0 }, price1, 0.0, 0.0))
        }
        TradeType::TotalReturnSwap => {
            let return_payer = trade.trs_return_leg_payer().unwrap_or(false);
            let base_sign = if return_payer { -1.0 } else { 1.0 };
            if let Some(opt) = trade.underlying_option() {
                let strike = trade.additional_result("strike").ok_or_else(|| ClassifyError::BadOption { trade: trade.id(), detail: "missing underlying option strike".to_string() })?;
                let price = trade.additional_result("atmForward").or_else(|| trade.additional_result("forward")).ok_or_else(|| ClassifyError::BadOption { trade: trade.id(), detail: "missing underlying option price".to_string() })?;
                let call_put = call_put_sign(opt);
                let sigma = if is_equity_index { SIGMA_EQUITY_INDEX } else { SIGMA_EQUITY_SINGLE };
                let phi_val = supervisory_option_phi(price, strike, t_for_delta, sigma, call_put).map_err(|detail| ClassifyError::BadOption { trade: trade.id(), detail })?;
                Ok((base_sign * phi_val, price, 0.0, strike))
            } else {
                Ok((base_sign, 0.0, 0.0, 0.0))
            }
        }
        TradeType::Failed => unreachable!("Failed trades are rejected before delta computation"),
    }
}

fn time_weighted_average_notional(leg: &Leg, valuation_date: NaiveDate) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for cf in &leg.cashflows {
        let start = cf.accrual_start.max(valuation_date);
        if start >= cf.accrual_end {
            continue;
        }
        let weight = act_act_isda(start, cf.accrual_end);
        weighted += weight * cf.notional;
        total_weight += weight;
    }
    if total_weight > 0.0 {
        weighted / total_weight
    } else {
        0.0
    }
}

fn adjusted_notional_raw(trade: &dyn TradeView, trade_type: TradeType, asset_class: AssetClass, first_risk_factor: &str, market: &dyn Market, base_ccy: CurrencyCode, valuation_date: NaiveDate) -> Option<f64> {
    match trade_type {
        TradeType::FxForward | TradeType::FxOption | TradeType::FxBarrierOption => {
            let bought_ccy = trade.bought_currency()?;
            let sold_ccy = trade.sold_currency()?;
            let bought = trade.bought_amount().unwrap_or(0.0).abs() * if bought_ccy == base_ccy { 0.0 } else { market.fx_rate(bought_ccy, base_ccy).unwrap_or(1.0) };
            let sold = trade.sold_amount().unwrap_or(0.0).abs() * if sold_ccy == base_ccy { 0.0 } else { market.fx_rate(sold_ccy, base_ccy).unwrap_or(1.0) };
            Some(bought.max(sold))
        }
        TradeType::FxTouchOption => {
            let (ccy, amount) = trade.touch_payoff()?;
            Some(amount.abs() * market.fx_rate(ccy, base_ccy).unwrap_or(1.0))
        }
        TradeType::EquityOption => {
            let name = trade.underlying_name()?;
            let spot = market.equity_fixing(name, valuation_date)?;
            let ccy = market.equity_currency(name).unwrap_or(base_ccy);
            let quantity = trade.underlying_quantity().unwrap_or(0.0);
            Some((quantity * spot).abs() * market.fx_rate(ccy, base_ccy).unwrap_or(1.0))
        }
        TradeType::TotalReturnSwap => {
            let name = trade.underlying_name()?;
            let spot = market.equity_fixing(name, valuation_date)?;
            let ccy = market.equity_currency(name).unwrap_or(base_ccy);
            let quantity = trade.underlying_quantity().unwrap_or(0.0);
            Some((quantity * spot).abs() * market.fx_rate(ccy, base_ccy).unwrap_or(1.0))
        }
        TradeType::CommodityForward => {
            let ccy = trade.npv_currency();
            Some(trade.underlying_quantity().unwrap_or(0.0).abs() * market.fx_rate(ccy, base_ccy).unwrap_or(1.0))
        }
        TradeType::CommoditySwap => {
            let is_basis = first_risk_factor.contains('/');
            let tokens: Vec<&str> = first_risk_factor.splitn(2, '/').collect();
            let mut sum = 0.0;
            for leg in trade.legs() {
                if !leg.floating {
                    continue;
                }
                let avg = time_weighted_average_notional(leg, valuation_date);
                let fx = market.fx_rate(leg.currency, base_ccy).unwrap_or(1.0);
                let mut sign = if leg.payer { -1.0 } else { 1.0 };
                if is_basis && tokens.len() == 2 {
                    let comm_name = leg.index_names.first().map(String::as_str).unwrap_or("");
                    let short_first_risk_factor = (comm_name == tokens[0] && leg.payer) || (comm_name == tokens[1] && !leg.payer);
                    if short_first_risk_factor {
                        sign *= -1.0;
                    }
                }
                sum += avg * fx * sign;
            }
            Some(sum)
        }
        TradeType::Swap | TradeType::Swaption => {
            let mut best: f64 = 0.0;
            for leg in trade.legs() {
                if asset_class == AssetClass::Fx && leg.currency == base_ccy {
                    continue;
                }
                let avg = time_weighted_average_notional(leg, valuation_date).abs();
                let fx = market.fx_rate(leg.currency, base_ccy).unwrap_or(1.0);
                best = best.max(avg * fx);
            }
            Some(best)
        }
        TradeType::Failed => None,
    }
}
