//! The internal per-trade record produced by S2 (the classifier) and
//! consumed by S4 (the aggregator).
//!
//! This struct is the hand-off contract between the classifier and the
//! aggregator and is never mutated after S2
//! produces it.

use serde::{Deserialize, Serialize};

use crate::ids::{CounterpartyId, NettingSetId, TradeId};

/// Regulatory asset class a trade is bucketed into.
///
/// `None` marks a trade the classifier could not place in any asset
/// class (it is dropped before aggregation; see
/// [`crate::classify::ClassifyOutcome`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// Interest rate.
    Ir,
    /// Foreign exchange.
    Fx,
    /// Credit.
    Credit,
    /// Equity.
    Equity,
    /// Commodity.
    Commodity,
    /// Not assigned.
    None,
}

/// The classifier's per-trade output: every quantity the aggregator
/// needs, already resolved to plain numbers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Source trade id.
    pub trade_id: TradeId,
    /// Source trade type, carried through for reporting.
    pub trade_type: crate::trade::TradeType,
    /// Netting set this trade belongs to.
    pub netting_set_id: NettingSetId,
    /// Counterparty this trade is with.
    pub counterparty_id: CounterpartyId,
    /// NPV converted into the pipeline's base currency.
    pub npv_base_ccy: f64,
    /// Regulatory asset class.
    pub asset_class: AssetClass,
    /// Hedging set name (e.g. an IR currency, an FX currency pair, a
    /// commodity bucket name, `"Equity"`, `"Credit"`).
    pub hedging_set: String,
    /// Hedging subset, where the asset class subdivides the hedging set
    /// (IR basis/non-basis tenor buckets, commodity subset, equity
    /// single-name/index split). Empty string when not applicable.
    pub hedging_subset: String,
    /// Start date of the exposure period, in years from today.
    pub m_start: f64,
    /// End date of the exposure period (maturity), in years from today.
    pub s_end: f64,
    /// Latest exercise date for option-bearing trades, in years from
    /// today; equal to `s_end` otherwise.
    pub e_latest: f64,
    /// Remaining maturity used in the maturity-factor formula, in years.
    pub t_maturity: f64,
    /// Maturity factor.
    pub maturity_factor: f64,
    /// Current (or, for FX trades, effective) notional in base currency.
    pub notional: f64,
    /// First price/rate observation relevant to the supervisory delta
    /// (e.g. a swap's fixed rate, an FX forward rate).
    pub price1: f64,
    /// Second price/rate observation (e.g. an option's strike).
    pub price2: f64,
    /// Strike or option reference price used in the delta formula.
    pub strike: f64,
    /// Supervisory delta, signed.
    pub delta: f64,
    /// Supervisory duration (IR/Credit only; 1.0 otherwise).
    pub supervisory_duration: f64,
    /// Adjusted notional `d`: `notional` scaled by supervisory duration
    /// for IR/Credit, unscaled otherwise. The aggregator combines this
    /// with `delta` and `maturity_factor` to form the per-trade
    /// effective notional `e_i = delta · d · MF`.
    pub effective_notional: f64,
    /// Whether the equity/commodity underlying is an index (vs single name).
    pub is_equity_index: bool,
}
