//! Netting-set, collateral-balance, and counterparty stores — the three
//! input stores the validator (S1) checks for consistency and the
//! downstream stages read from.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ids::{CounterpartyId, CurrencyCode, NettingSetId};

/// Credit-quality rating used for SA-CCR counterparty metadata.
///
/// This mirrors the ratings scale of the pricing side but is kept
/// independent of it: SA-CCR counterparty risk weights are driven by
/// regulatory RW, not by this rating directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditQuality {
    /// AAA.
    Aaa,
    /// AA.
    Aa,
    /// A.
    A,
    /// BBB.
    Bbb,
    /// BB.
    Bb,
    /// B.
    B,
    /// CCC and below.
    Ccc,
    /// Not rated.
    Nr,
}

impl Default for CreditQuality {
    fn default() -> Self {
        CreditQuality::Nr
    }
}

/// A netting-set definition: the CSA terms governing a netting set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NettingSetDefinition {
    /// Whether this netting set has an active CSA.
    pub csa_active: bool,
    /// CSA currency, used to resolve collateral quantities.
    pub csa_currency: CurrencyCode,
    /// Threshold-receive, in CSA currency.
    pub threshold_rcv: f64,
    /// Minimum-transfer-amount-receive, in CSA currency.
    pub mta_rcv: f64,
    /// Independent-amount-held, in CSA currency.
    pub ia_held: f64,
    /// Margin period of risk, in weeks.
    pub mpor_weeks: f64,
    /// Whether IM is calculated (e.g. via SIMM) rather than user-supplied.
    pub calculate_im: bool,
    /// Whether VM is calculated rather than user-supplied.
    pub calculate_vm: bool,
}

impl NettingSetDefinition {
    /// A netting set with no active CSA: margined quantities are unused.
    pub fn uncollateralised(csa_currency: CurrencyCode) -> Self {
        Self {
            csa_active: false,
            csa_currency,
            threshold_rcv: 0.0,
            mta_rcv: 0.0,
            ia_held: 0.0,
            mpor_weeks: 0.0,
            calculate_im: false,
            calculate_vm: false,
        }
    }

    /// The default "Bilateral" definition S1 synthesises for a trade
    /// whose netting set has no definition (check 2).
    pub fn default_bilateral(
        csa_currency: CurrencyCode,
        threshold_rcv: f64,
        mta_rcv: f64,
        ia_held: f64,
        mpor_weeks: f64,
    ) -> Self {
        Self {
            csa_active: true,
            csa_currency,
            threshold_rcv,
            mta_rcv,
            ia_held,
            mpor_weeks,
            calculate_im: true,
            calculate_vm: true,
        }
    }
}

/// A collateral balance: currency plus nullable IM/VM.
///
/// `im`/`vm` are `None` to distinguish "not supplied" from "supplied as
/// zero" — the collateral resolver's precedence rules depend on this.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CollateralBalance {
    /// Balance currency.
    pub currency: Option<CurrencyCode>,
    /// Initial margin, `None` if not supplied.
    pub im: Option<f64>,
    /// Variation margin, `None` if not supplied.
    pub vm: Option<f64>,
}

/// Counterparty metadata relevant to SA-CCR.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CounterpartyInfo {
    /// Whether this counterparty is a central clearing counterparty.
    pub is_clearing_cp: bool,
    /// Credit quality.
    pub credit_quality: CreditQuality,
    /// SA-CCR risk weight, expected in `[0, 1.5]`.
    pub saccr_rw: f64,
}

impl CounterpartyInfo {
    /// The default counterparty S1 synthesises when none is supplied
    /// (check 7): not a clearing CP, unrated, default risk weight.
    pub fn default_with_rw(saccr_rw: f64) -> Self {
        Self {
            is_clearing_cp: false,
            credit_quality: CreditQuality::Nr,
            saccr_rw,
        }
    }
}

/// The three input stores plus the "defaulted" markers S1 produces.
///
/// Keeping the defaulted-IM/VM markers as separate sets — rather than a
/// flag alongside the balance — lets S3 tell a user-supplied zero from a
/// validator-substituted default, which the collateral precedence rules
/// depend on.
#[derive(Clone, Debug, Default)]
pub struct InputStores {
    /// Netting-set definitions.
    pub netting_sets: HashMap<NettingSetId, NettingSetDefinition>,
    /// Raw user-supplied collateral-balance entries, in arrival order;
    /// more than one entry for the same netting set triggers check 4.
    pub raw_collateral_balances: HashMap<NettingSetId, Vec<CollateralBalance>>,
    /// User-supplied collateral balances, resolved to "first entry wins".
    pub collateral_balances: HashMap<NettingSetId, CollateralBalance>,
    /// Calculated (e.g. SIMM) collateral balances.
    pub calculated_balances: HashMap<NettingSetId, CollateralBalance>,
    /// Counterparty metadata.
    pub counterparties: HashMap<CounterpartyId, CounterpartyInfo>,
    /// Netting sets whose IM balance was synthesised by S1 (check 5),
    /// not supplied by the user.
    pub defaulted_im: HashSet<NettingSetId>,
    /// Netting sets whose VM balance was synthesised by S1 (check 5 or 6).
    pub defaulted_vm: HashSet<NettingSetId>,
}

impl InputStores {
    /// An empty set of stores.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if every one of the three input stores is empty (check 1).
    pub fn is_empty(&self) -> bool {
        self.netting_sets.is_empty() && self.raw_collateral_balances.is_empty() && self.counterparties.is_empty()
    }

    /// Registers a raw user-supplied balance entry for a netting set.
    pub fn push_raw_balance(&mut self, netting_set: NettingSetId, balance: CollateralBalance) {
        self.raw_collateral_balances.entry(netting_set).or_default().push(balance);
    }
}
