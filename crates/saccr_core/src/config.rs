//! Pipeline-wide configuration and the enumerated fallback values used
//! when an upstream store is missing a required field.

use serde::{Deserialize, Serialize};

use crate::ids::CurrencyCode;

/// Defaults substituted by the validator (S1) when a netting set,
/// collateral balance or counterparty definition is missing or
/// incomplete.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DefaultValues {
    /// Default threshold-receive for a synthesised "Bilateral" netting set.
    pub netting_set_threshold_rcv: f64,
    /// Default minimum-transfer-amount-receive.
    pub netting_set_mta_rcv: f64,
    /// Default independent-amount-held.
    pub netting_set_ia_held: f64,
    /// Default margin period of risk, in weeks.
    pub netting_set_mpor_weeks: f64,
    /// Default `calculate_im` flag for a synthesised netting set.
    pub netting_set_calculate_im: bool,
    /// Default `calculate_vm` flag for a synthesised netting set.
    pub netting_set_calculate_vm: bool,
    /// Default collateral balance currency.
    pub coll_balance_ccy: CurrencyCode,
    /// Default initial margin amount.
    pub coll_balance_im: f64,
    /// Default variation margin amount.
    pub coll_balance_vm: f64,
    /// Default counterparty id used when a netting set has no trades.
    pub cpty_id: String,
    /// Default "is central counterparty" flag.
    pub cpty_ccp: bool,
    /// Default SA-CCR risk weight.
    pub cpty_saccr_rw: f64,
}

impl Default for DefaultValues {
    fn default() -> Self {
        Self {
            netting_set_threshold_rcv: 0.0,
            netting_set_mta_rcv: 0.0,
            netting_set_ia_held: 0.0,
            netting_set_mpor_weeks: 10.0 / 5.0, // 10 business days ~ 2 weeks
            netting_set_calculate_im: true,
            netting_set_calculate_vm: true,
            coll_balance_ccy: CurrencyCode::new("USD").expect("USD is a valid code"),
            coll_balance_im: 0.0,
            coll_balance_vm: 0.0,
            cpty_id: "DEFAULT".to_string(),
            cpty_ccp: false,
            cpty_saccr_rw: 1.5,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base currency all aggregation amounts are expressed in.
    pub base_currency: CurrencyCode,
    /// Regulatory alpha multiplier applied to `(RC + PFE)`.
    pub alpha: f64,
    /// Defaults substituted by the validator.
    pub defaults: DefaultValues,
    /// Netting sets with more than this many trades force MPOR to 4
    /// weeks for margined trades (unless the counterparty is a clearing
    /// CP), per the maturity-factor rule.
    pub large_netting_set_trade_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_currency: CurrencyCode::new("USD").expect("USD is a valid code"),
            alpha: 1.4,
            defaults: DefaultValues::default(),
            large_netting_set_trade_count: 5_000,
        }
    }
}
