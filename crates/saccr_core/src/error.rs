//! Per-stage error types and the top-level pipeline error.
//!
//! Each stage owns a narrow `thiserror` enum describing only the fatal
//! conditions it can raise; non-fatal conditions are [`crate::diagnostics::Diagnostic`]s,
//! not errors. [`PipelineError`] unifies them for callers that run the
//! whole S1→S5 pipeline in one call.

use crate::ids::{CounterpartyId, NettingSetId, TradeId};

/// Fatal errors raised by the validator (S1).
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Check 11: a trade lacks a matching entry in one of the three stores.
    #[error("trade {trade} has no matching entry in the {store} store")]
    MissingStoreEntry {
        /// The offending trade.
        trade: TradeId,
        /// Which store was missing an entry ("netting-set", "counterparty", "collateral").
        store: &'static str,
    },
}

/// Fatal errors raised by the classifier (S2) for a single trade.
///
/// [`DeltaError`](ClassifyError::DeltaError) and [`BadOption`](ClassifyError::BadOption)
/// exclude only the offending trade; they never abort the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// An unsupported basis/option combination (Bermudan swaption,
    /// cross-currency swaption, IR basis swaption).
    #[error("trade {trade}: unsupported delta combination: {detail}")]
    DeltaError {
        /// The offending trade.
        trade: TradeId,
        /// What combination was rejected.
        detail: String,
    },
    /// The option-delta inputs (price, strike, vol, or time) were missing
    /// or degenerate.
    #[error("trade {trade}: bad option inputs: {detail}")]
    BadOption {
        /// The offending trade.
        trade: TradeId,
        /// Which input was missing/degenerate.
        detail: String,
    },
    /// Commodity trade referencing more than one settlement currency.
    #[error("trade {trade}: commodity trades cannot be cross-currency")]
    CommodityCrossCurrency {
        /// The offending trade.
        trade: TradeId,
    },
}

/// Fatal errors raised by the collateral resolver (S3).
#[derive(Debug, thiserror::Error)]
pub enum CollateralError {
    /// `calculate-IM=false` but no user IM balance was supplied.
    #[error("netting set {netting_set}: calculate-IM is false but no user IM balance is present")]
    MissingUserIm {
        /// The affected netting set.
        netting_set: NettingSetId,
    },
    /// `calculate-VM=false` but no user VM balance was supplied.
    #[error("netting set {netting_set}: calculate-VM is false but no user VM balance is present")]
    MissingUserVm {
        /// The affected netting set.
        netting_set: NettingSetId,
    },
    /// A resolved collateral quantity (IM, VM, IAH, MTA, TH) is missing
    /// after every fallback has been exhausted.
    #[error("netting set {netting_set}: collateral quantity '{quantity}' could not be resolved")]
    UnresolvedQuantity {
        /// The affected netting set.
        netting_set: NettingSetId,
        /// Which quantity (e.g. "IM", "VM").
        quantity: &'static str,
    },
}

/// Fatal errors raised by the aggregator (S4).
#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    /// A trade record carries an asset class the aggregator has no
    /// handler for.
    #[error("netting set {netting_set}: unknown asset class encountered during aggregation")]
    UnknownAssetClass {
        /// The affected netting set.
        netting_set: NettingSetId,
    },
    /// A resolved collateral quantity required for Phase B/E was missing.
    #[error("netting set {netting_set}: missing resolved collateral for replacement cost")]
    MissingCollateral {
        /// The affected netting set.
        netting_set: NettingSetId,
    },
    /// No counterparty could be found to source the risk weight from.
    #[error("netting set {netting_set}: no counterparty found for risk-weight lookup")]
    MissingRiskWeight {
        /// The affected netting set.
        netting_set: NettingSetId,
    },
}

/// Errors raised by the report emitter (S5).
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The underlying sink failed to accept a row.
    #[error("report sink failed: {0}")]
    Sink(String),
}

/// Top-level error unifying every stage, for callers that run the whole
/// pipeline via [`crate::pipeline::run_pipeline`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// S1 failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// S2 failed for a trade whose error was fatal at the pipeline level
    /// (only raised if the caller opts into treating trade-level
    /// classify errors as aborting; by default they are isolated).
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    /// S3 failed.
    #[error(transparent)]
    Collateral(#[from] CollateralError),
    /// S4 failed.
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    /// S5 failed.
    #[error(transparent)]
    Report(#[from] ReportError),
    /// A netting set definition has no associated counterparty.
    #[error("netting set {netting_set} has no counterparty; first-encountered id was {first}")]
    NettingSetCounterpartyMismatch {
        /// The affected netting set.
        netting_set: NettingSetId,
        /// The counterparty id used (first one encountered).
        first: CounterpartyId,
    },
}
