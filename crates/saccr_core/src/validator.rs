//! S1 — the validator.
//!
//! Runs eleven consistency checks over the input stores in order,
//! mutating the three input stores with defaults where gaps are found
//! and emitting a [`Diagnostic`] for every substitution. Only check 11
//! (every trade has matching entries in all three stores) can fail the
//! pipeline outright.

use std::collections::HashSet;

use crate::config::PipelineConfig;
use crate::diagnostics::{Diagnostic, DiagnosticCategory, Severity};
use crate::error::ValidationError;
use crate::ids::{CounterpartyId, NettingSetId};
use crate::store::{CollateralBalance, CounterpartyInfo, InputStores, NettingSetDefinition};
use crate::trade::TradeView;

/// Runs S1 against `stores`, using `trades` to discover every
/// netting-set and counterparty reference that needs a store entry.
///
/// Returns the diagnostics raised along the way; fails only on check 11.
pub fn validate(
    trades: &[Box<dyn TradeView>],
    stores: &mut InputStores,
    config: &PipelineConfig,
) -> Result<Vec<Diagnostic>, ValidationError> {
    let mut diags = Vec::new();

    // Check 1: top-level informational note if every store starts empty.
    if stores.is_empty() && !trades.is_empty() {
        diags.push(Diagnostic::new(
            Severity::Info,
            DiagnosticCategory::ConfigMissing,
            "portfolio",
            "validate inputs",
            "netting-set, collateral and counterparty stores are all empty; proceeding with defaults",
        ));
    }

    // Check 2: synthesise a default Bilateral netting-set definition for
    // every trade whose netting set has no definition.
    let mut first_counterparty: std::collections::HashMap<NettingSetId, CounterpartyId> = std::collections::HashMap::new();
    for trade in trades {
        let envelope = trade.envelope();
        first_counterparty.entry(envelope.netting_set_id.clone()).or_insert_with(|| envelope.counterparty_id.clone());

        if !stores.netting_sets.contains_key(&envelope.netting_set_id) {
            stores.netting_sets.insert(
                envelope.netting_set_id.clone(),
                NettingSetDefinition::default_bilateral(
                    config.base_currency,
                    config.defaults.netting_set_threshold_rcv,
                    config.defaults.netting_set_mta_rcv,
                    config.defaults.netting_set_ia_held,
                    config.defaults.netting_set_mpor_weeks,
                ),
            );
            diags.push(Diagnostic::new(
                Severity::Info,
                DiagnosticCategory::ConfigMissing,
                envelope.netting_set_id.to_string(),
                "resolve netting-set definition",
                "no definition found; substituted a default Bilateral netting set",
            ));
        }
    }

    // Check 4: resolve "first entry wins" across raw balance entries,
    // warning on duplicates, before check 3 can inspect the winner.
    for (ns, entries) in &stores.raw_collateral_balances {
        if entries.len() > 1 {
            diags.push(Diagnostic::new(
                Severity::Warning,
                DiagnosticCategory::ConfigInconsistent,
                ns.to_string(),
                "resolve collateral balance",
                format!("{} collateral-balance entries found; using the first", entries.len()),
            ));
        }
    }
    let winners: Vec<(NettingSetId, CollateralBalance)> = stores
        .raw_collateral_balances
        .iter()
        .filter_map(|(ns, entries)| entries.first().map(|b| (ns.clone(), b.clone())))
        .collect();
    for (ns, balance) in winners {
        stores.collateral_balances.insert(ns, balance);
    }

    // Check 3: warn when a CSA-active netting set calculates IM/VM but a
    // user balance also carries a non-null value for the same quantity.
    for (ns, def) in &stores.netting_sets {
        if !def.csa_active {
            continue;
        }
        if let Some(balance) = stores.collateral_balances.get(ns) {
            if def.calculate_im && balance.im.is_some() {
                diags.push(Diagnostic::new(
                    Severity::Warning,
                    DiagnosticCategory::ConfigInconsistent,
                    ns.to_string(),
                    "resolve IM",
                    "calculate-IM is true but a user IM balance is present; the supplied amount overrides the calculated one",
                ));
            }
            if def.calculate_vm && balance.vm.is_some() {
                diags.push(Diagnostic::new(
                    Severity::Warning,
                    DiagnosticCategory::ConfigInconsistent,
                    ns.to_string(),
                    "resolve VM",
                    "calculate-VM is true but a user VM balance is present; the supplied amount overrides the calculated one",
                ));
            }
        }
    }

    // Check 5: for every trade's netting set, if CSA is active and
    // neither the user nor the calculated store has an entry, create a
    // default balance and mark both quantities as defaulted.
    let netting_set_ids: HashSet<NettingSetId> = trades.iter().map(|t| t.envelope().netting_set_id).collect();
    for ns in &netting_set_ids {
        let csa_active = stores.netting_sets.get(ns).map(|d| d.csa_active).unwrap_or(false);
        if !csa_active {
            continue;
        }
        let has_user = stores.collateral_balances.contains_key(ns);
        let has_calc = stores.calculated_balances.contains_key(ns);
        if !has_user && !has_calc {
            stores.collateral_balances.insert(
                ns.clone(),
                CollateralBalance {
                    currency: Some(config.defaults.coll_balance_ccy),
                    im: Some(config.defaults.coll_balance_im),
                    vm: Some(config.defaults.coll_balance_vm),
                },
            );
            stores.defaulted_im.insert(ns.clone());
            stores.defaulted_vm.insert(ns.clone());
            diags.push(Diagnostic::new(
                Severity::Info,
                DiagnosticCategory::ConfigMissing,
                ns.to_string(),
                "resolve collateral balance",
                "no user or calculated balance found; substituted the default balance",
            ));
        }
    }

    // Check 6: for every netting set (trades or not), if CSA is active,
    // VM is null, and calculate-VM is false, substitute the default VM.
    for (ns, def) in stores.netting_sets.clone() {
        if !def.csa_active || def.calculate_vm {
            continue;
        }
        let vm_present = stores.collateral_balances.get(&ns).and_then(|b| b.vm).is_some();
        if !vm_present {
            let entry = stores.collateral_balances.entry(ns.clone()).or_default();
            entry.vm = Some(config.defaults.coll_balance_vm);
            stores.defaulted_vm.insert(ns.clone());
            diags.push(Diagnostic::new(
                Severity::Info,
                DiagnosticCategory::ConfigMissing,
                ns.to_string(),
                "resolve VM",
                "calculate-VM is false and no VM was supplied; substituted the default VM",
            ));
        }
    }

    // Check 7: default counterparty for every trade whose counterparty
    // is missing from the store.
    for trade in trades {
        let cpty = trade.envelope().counterparty_id;
        if !stores.counterparties.contains_key(&cpty) {
            stores.counterparties.insert(cpty.clone(), CounterpartyInfo::default_with_rw(config.defaults.cpty_saccr_rw));
            diags.push(Diagnostic::new(
                Severity::Info,
                DiagnosticCategory::ConfigMissing,
                cpty.to_string(),
                "resolve counterparty",
                "no counterparty record found; substituted a default counterparty",
            ));
        }
    }

    // Check 8: ensure the default counterparty id exists for netting
    // sets with no trades (here: any netting set present in the store
    // but with no first-encountered counterparty).
    let default_cpty = CounterpartyId::new(config.defaults.cpty_id.clone());
    let has_tradeless_netting_sets = stores.netting_sets.keys().any(|ns| !first_counterparty.contains_key(ns));
    if has_tradeless_netting_sets && !stores.counterparties.contains_key(&default_cpty) {
        stores.counterparties.insert(default_cpty.clone(), CounterpartyInfo::default_with_rw(config.defaults.cpty_saccr_rw));
        diags.push(Diagnostic::new(
            Severity::Info,
            DiagnosticCategory::ConfigMissing,
            default_cpty.to_string(),
            "resolve default counterparty",
            "inserted the default counterparty for netting sets with no trades",
        ));
    }

    // Check 9: warn on out-of-range risk weights; the value is still used.
    for (cpty, info) in &stores.counterparties {
        if !(0.0..=1.5).contains(&info.saccr_rw) {
            diags.push(Diagnostic::new(
                Severity::Warning,
                DiagnosticCategory::ConfigInconsistent,
                cpty.to_string(),
                "validate SA-CCR risk weight",
                format!("risk weight {} is outside [0, 1.5]", info.saccr_rw),
            ));
        }
    }

    // Check 10: force IM=0 for clearing-CP netting sets, in both balance stores.
    for (ns, cpty) in &first_counterparty {
        let is_clearing = stores.counterparties.get(cpty).map(|c| c.is_clearing_cp).unwrap_or(false);
        if !is_clearing {
            continue;
        }
        if let Some(balance) = stores.collateral_balances.get_mut(ns) {
            balance.im = Some(0.0);
        }
        if let Some(balance) = stores.calculated_balances.get_mut(ns) {
            balance.im = Some(0.0);
        }
    }

    // Check 11: every trade must have matching entries in all three stores.
    for trade in trades {
        let envelope = trade.envelope();
        if !stores.netting_sets.contains_key(&envelope.netting_set_id) {
            return Err(ValidationError::MissingStoreEntry { trade: trade.id(), store: "netting-set" });
        }
        if !stores.counterparties.contains_key(&envelope.counterparty_id) {
            return Err(ValidationError::MissingStoreEntry { trade: trade.id(), store: "counterparty" });
        }
    }

    Ok(diags)
}
