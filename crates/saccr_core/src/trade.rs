//! The external trade model boundary.
//!
//! `saccr_core` never owns a trade; it only reads through [`TradeView`].
//! Production callers plug in their own polymorphic trade library that
//! supplies cash-flow legs, option data, and pricing results such as
//! `atmForward`/`strike`. [`SimpleTrade`] is a concrete, in-memory
//! implementation used by tests and by `saccr_cli` fixtures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::{CounterpartyId, CurrencyCode, NettingSetId, TradeId};

/// The closed set of trade types the classifier understands.
///
/// Any type outside this set is `Failed` at ingestion or rejected by S2
/// as [`crate::classify::ClassifyOutcome::Skip`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    /// Interest rate (or cross-currency) swap.
    Swap,
    /// Swaption.
    Swaption,
    /// FX forward / FX swap.
    FxForward,
    /// Vanilla FX option.
    FxOption,
    /// FX barrier option.
    FxBarrierOption,
    /// FX touch/digital option.
    FxTouchOption,
    /// Commodity forward.
    CommodityForward,
    /// Commodity swap.
    CommoditySwap,
    /// Equity option.
    EquityOption,
    /// Total return swap.
    TotalReturnSwap,
    /// A trade that failed upstream processing (pricing, schedule
    /// generation, ...); always rejected by the classifier.
    Failed,
}

/// Call or put.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallPut {
    /// Call option.
    Call,
    /// Put option.
    Put,
}

/// Long or short position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LongShort {
    /// Bought the option.
    Long,
    /// Sold the option.
    Short,
}

/// Option exercise style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseStyle {
    /// Single exercise date at expiry.
    European,
    /// Exercisable at any time up to expiry.
    American,
    /// Exercisable on a discrete set of dates.
    Bermudan,
}

/// Option-specific data exposed by option-bearing trades.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptionData {
    /// Call or put.
    pub call_put: CallPut,
    /// Long (bought) or short (sold).
    pub long_short: LongShort,
    /// Exercise dates (one entry for European).
    pub exercise_dates: Vec<NaiveDate>,
    /// Exercise style.
    pub style: ExerciseStyle,
    /// Whether the payoff settles at expiry (vs. immediately on exercise).
    pub payoff_at_expiry: bool,
}

impl OptionData {
    /// The latest exercise date, used as the option's latest expiry time.
    pub fn latest_exercise_date(&self) -> Option<NaiveDate> {
        self.exercise_dates.iter().max().copied()
    }
}

/// A single cash-flow / coupon within a leg.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cashflow {
    /// Accrual period start date.
    pub accrual_start: NaiveDate,
    /// Accrual period end date.
    pub accrual_end: NaiveDate,
    /// Coupon notional, in the leg's currency.
    pub notional: f64,
    /// Commodity periodic quantity (commodity legs only).
    pub commodity_quantity: Option<f64>,
    /// Commodity gearing (commodity legs only).
    pub commodity_gearing: Option<f64>,
    /// Commodity spread (commodity legs only).
    pub commodity_spread: Option<f64>,
    /// Commodity fixing/current price, when already observed.
    pub commodity_fixing: Option<f64>,
}

impl Cashflow {
    /// A plain interest-rate-style coupon with no commodity payload.
    pub fn rate(accrual_start: NaiveDate, accrual_end: NaiveDate, notional: f64) -> Self {
        Self {
            accrual_start,
            accrual_end,
            notional,
            commodity_quantity: None,
            commodity_gearing: None,
            commodity_spread: None,
            commodity_fixing: None,
        }
    }
}

/// A single leg of a trade.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Leg {
    /// Leg currency.
    pub currency: CurrencyCode,
    /// `true` if this leg is paid by the reporting entity.
    pub payer: bool,
    /// `true` if this leg pays a floating (index-linked) rate, `false`
    /// for a fixed leg. Drives the IR/commodity floating-leg delta rule.
    pub floating: bool,
    /// The leg's cash-flow sequence, in chronological order.
    pub cashflows: Vec<Cashflow>,
    /// Underlying index name(s) referenced by this leg (e.g. "USD-LIBOR-3M",
    /// "EUR-HICP"), used by the IR/inflation-basis hedging-set rule.
    pub index_names: Vec<String>,
}

impl Leg {
    /// The first flow's accrual start date, i.e. when the leg begins.
    pub fn first_flow_date(&self) -> Option<NaiveDate> {
        self.cashflows.iter().map(|c| c.accrual_start).min()
    }

    /// The last flow's accrual end date, i.e. when the leg matures.
    pub fn last_flow_date(&self) -> Option<NaiveDate> {
        self.cashflows.iter().map(|c| c.accrual_end).max()
    }
}

/// Netting-set/counterparty envelope every trade carries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TradeEnvelope {
    /// Netting set this trade belongs to.
    pub netting_set_id: NettingSetId,
    /// Counterparty this trade is with.
    pub counterparty_id: CounterpartyId,
}

/// Asset-class partition of underlying index/name references, used by
/// the IR/inflation-basis and commodity-basis hedging-set rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnderlyingAssetClass {
    /// Interest-rate underlyings (index names).
    Ir,
    /// Inflation underlyings.
    Inf,
    /// Commodity underlyings.
    Com,
    /// Equity underlyings.
    Eq,
}

/// Read-only view onto a single trade, supplied by the external trade
/// library. `saccr_core` never constructs or mutates a trade; it only
/// classifies what this trait exposes.
pub trait TradeView {
    /// Unique trade identifier.
    fn id(&self) -> TradeId;

    /// Trade type tag.
    fn trade_type(&self) -> TradeType;

    /// Netting-set/counterparty envelope.
    fn envelope(&self) -> TradeEnvelope;

    /// The trade's legs, in a stable order.
    fn legs(&self) -> &[Leg];

    /// Trade maturity date.
    fn maturity_date(&self) -> NaiveDate;

    /// NPV in the trade's own currency.
    fn npv(&self) -> f64;

    /// Currency the trade's own NPV is expressed in.
    fn npv_currency(&self) -> CurrencyCode;

    /// Additional scalar pricing results keyed by name (e.g. `"strike"`,
    /// `"atmForward"`, `"forward"`).
    fn additional_result(&self, key: &str) -> Option<f64>;

    /// Barrier/touch levels, for barrier/touch option trades.
    fn barrier_levels(&self) -> &[f64];

    /// Underlying index/name references for one asset class.
    fn underlyings(&self, asset_class: UnderlyingAssetClass) -> &[String];

    /// Option data, for option-bearing trade types.
    fn option_data(&self) -> Option<&OptionData>;

    /// For a total return swap referencing an equity-option position,
    /// the underlying option's data and its supervisory delta sign
    /// contribution; `None` for every other trade type.
    fn underlying_option(&self) -> Option<&OptionData> {
        None
    }

    /// `true` if the return leg of a TRS is a payer leg (we pay total
    /// return, i.e. we are short the underlying). Irrelevant outside TRS.
    fn trs_return_leg_payer(&self) -> Option<bool> {
        None
    }

    /// Equity/commodity underlying name for single-underlying trades
    /// (equity option, TRS, commodity forward).
    fn underlying_name(&self) -> Option<&str> {
        None
    }

    /// Quantity of the underlying (equity option / commodity forward),
    /// signed positive for long positions.
    fn underlying_quantity(&self) -> Option<f64> {
        None
    }

    /// Bought currency, for FX trades.
    fn bought_currency(&self) -> Option<CurrencyCode> {
        None
    }

    /// Sold currency, for FX trades.
    fn sold_currency(&self) -> Option<CurrencyCode> {
        None
    }

    /// Bought amount, for FX trades.
    fn bought_amount(&self) -> Option<f64> {
        None
    }

    /// Sold amount, for FX trades.
    fn sold_amount(&self) -> Option<f64> {
        None
    }

    /// Payoff currency and amount, for FX touch options.
    fn touch_payoff(&self) -> Option<(CurrencyCode, f64)> {
        None
    }

    /// Position sign for a commodity forward/position: `1.0` long, `-1.0` short.
    fn position_sign(&self) -> Option<f64> {
        None
    }
}

/// A simple, fully in-memory [`TradeView`] implementation for tests and
/// fixture-driven CLI runs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimpleTrade {
    /// Trade id.
    pub id: String,
    /// Trade type.
    pub trade_type: Option<TradeType>,
    /// Netting-set id.
    pub netting_set_id: Option<NettingSetId>,
    /// Counterparty id.
    pub counterparty_id: Option<CounterpartyId>,
    /// Legs.
    pub legs: Vec<Leg>,
    /// Maturity date.
    pub maturity_date: Option<NaiveDate>,
    /// Own-currency NPV.
    pub npv: f64,
    /// Own NPV currency.
    pub npv_currency: Option<CurrencyCode>,
    /// Additional scalar results.
    pub additional_results: std::collections::HashMap<String, f64>,
    /// Barrier/touch levels.
    pub barrier_levels: Vec<f64>,
    /// IR underlyings.
    pub ir_underlyings: Vec<String>,
    /// Inflation underlyings.
    pub inf_underlyings: Vec<String>,
    /// Commodity underlyings.
    pub com_underlyings: Vec<String>,
    /// Equity underlyings.
    pub eq_underlyings: Vec<String>,
    /// Option data, if option-bearing.
    pub option_data: Option<OptionData>,
    /// Underlying option, for TRS-on-equity-option trades.
    pub underlying_option: Option<OptionData>,
    /// TRS return-leg payer flag.
    pub trs_return_leg_payer: Option<bool>,
    /// Single underlying name.
    pub underlying_name: Option<String>,
    /// Single underlying quantity.
    pub underlying_quantity: Option<f64>,
    /// Bought currency (FX trades).
    pub bought_currency: Option<CurrencyCode>,
    /// Sold currency (FX trades).
    pub sold_currency: Option<CurrencyCode>,
    /// Bought amount (FX trades).
    pub bought_amount: Option<f64>,
    /// Sold amount (FX trades).
    pub sold_amount: Option<f64>,
    /// Touch payoff currency/amount.
    pub touch_payoff: Option<(CurrencyCode, f64)>,
    /// Position sign (commodity forward).
    pub position_sign: Option<f64>,
}

impl TradeView for SimpleTrade {
    fn id(&self) -> TradeId {
        TradeId::new(self.id.clone())
    }

    fn trade_type(&self) -> TradeType {
        self.trade_type.unwrap_or(TradeType::Failed)
    }

    fn envelope(&self) -> TradeEnvelope {
        TradeEnvelope {
            netting_set_id: self
                .netting_set_id
                .clone()
                .unwrap_or_else(|| NettingSetId::new(CounterpartyId::new("DEFAULT"))),
            counterparty_id: self
                .counterparty_id
                .clone()
                .unwrap_or_else(|| CounterpartyId::new("DEFAULT")),
        }
    }

    fn legs(&self) -> &[Leg] {
        &self.legs
    }

    fn maturity_date(&self) -> NaiveDate {
        self.maturity_date.unwrap_or_default()
    }

    fn npv(&self) -> f64 {
        self.npv
    }

    fn npv_currency(&self) -> CurrencyCode {
        self.npv_currency.unwrap_or_else(|| CurrencyCode::new("USD").unwrap())
    }

    fn additional_result(&self, key: &str) -> Option<f64> {
        self.additional_results.get(key).copied()
    }

    fn barrier_levels(&self) -> &[f64] {
        &self.barrier_levels
    }

    fn underlyings(&self, asset_class: UnderlyingAssetClass) -> &[String] {
        match asset_class {
            UnderlyingAssetClass::Ir => &self.ir_underlyings,
            UnderlyingAssetClass::Inf => &self.inf_underlyings,
            UnderlyingAssetClass::Com => &self.com_underlyings,
            UnderlyingAssetClass::Eq => &self.eq_underlyings,
        }
    }

    fn option_data(&self) -> Option<&OptionData> {
        self.option_data.as_ref()
    }

    fn underlying_option(&self) -> Option<&OptionData> {
        self.underlying_option.as_ref()
    }

    fn trs_return_leg_payer(&self) -> Option<bool> {
        self.trs_return_leg_payer
    }

    fn underlying_name(&self) -> Option<&str> {
        self.underlying_name.as_deref()
    }

    fn underlying_quantity(&self) -> Option<f64> {
        self.underlying_quantity
    }

    fn bought_currency(&self) -> Option<CurrencyCode> {
        self.bought_currency
    }

    fn sold_currency(&self) -> Option<CurrencyCode> {
        self.sold_currency
    }

    fn bought_amount(&self) -> Option<f64> {
        self.bought_amount
    }

    fn sold_amount(&self) -> Option<f64> {
        self.sold_amount
    }

    fn touch_payoff(&self) -> Option<(CurrencyCode, f64)> {
        self.touch_payoff
    }

    fn position_sign(&self) -> Option<f64> {
        self.position_sign
    }
}
