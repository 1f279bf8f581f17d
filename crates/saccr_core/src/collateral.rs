//! S3 — the collateral resolver.
//!
//! Resolves, per netting set, the five base-currency collateral
//! quantities the aggregator needs: IM, VM, independent-amount-held,
//! minimum-transfer-amount, and threshold.

use std::collections::HashMap;

use crate::error::CollateralError;
use crate::ids::{CurrencyCode, NettingSetId};
use crate::market::Market;
use crate::store::InputStores;

/// Resolved, base-currency collateral quantities for one netting set.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResolvedCollateral {
    /// Initial margin.
    pub im: f64,
    /// Variation margin.
    pub vm: f64,
    /// Independent amount held.
    pub iah: f64,
    /// Minimum transfer amount.
    pub mta: f64,
    /// Threshold.
    pub th: f64,
}

/// Resolves collateral for every netting set in `stores`.
///
/// `npv_by_netting_set` is the sum of classified-trade NPVs per netting
/// set (already in base currency), used as the VM fallback when
/// calculate-VM is true and no usable user balance is present.
///
/// Every amount resolved here is converted into `base_currency`, never
/// into the netting set's own CSA currency — the CSA currency is only
/// the *source* currency a raw balance/threshold is quoted in.
pub fn resolve_collateral(
    stores: &InputStores,
    market: &dyn Market,
    npv_by_netting_set: &HashMap<NettingSetId, f64>,
    base_currency: CurrencyCode,
) -> Result<HashMap<NettingSetId, ResolvedCollateral>, CollateralError> {
    let mut resolved = HashMap::new();

    for (ns, def) in &stores.netting_sets {
        if !def.csa_active {
            resolved.insert(ns.clone(), ResolvedCollateral::default());
            continue;
        }

        let user_balance = stores.collateral_balances.get(ns);
        let calc_balance = stores.calculated_balances.get(ns);
        let im_defaulted = stores.defaulted_im.contains(ns);
        let vm_defaulted = stores.defaulted_vm.contains(ns);

        let im = if def.calculate_im {
            match user_balance.and_then(|b| b.im.map(|v| (b, v))) {
                Some((b, v)) if !im_defaulted => v * fx(market, b.currency.unwrap_or(def.csa_currency), base_currency),
                _ => match calc_balance.and_then(|b| b.im.map(|v| (b, v))) {
                    Some((b, v)) => v * fx(market, b.currency.unwrap_or(def.csa_currency), base_currency),
                    None => 0.0,
                },
            }
        } else {
            let balance = user_balance.ok_or(CollateralError::MissingUserIm { netting_set: ns.clone() })?;
            let v = balance.im.ok_or(CollateralError::MissingUserIm { netting_set: ns.clone() })?;
            v * fx(market, balance.currency.unwrap_or(def.csa_currency), base_currency)
        };

        let vm = if def.calculate_vm {
            match user_balance.and_then(|b| b.vm.map(|v| (b, v))) {
                Some((b, v)) if !vm_defaulted => v * fx(market, b.currency.unwrap_or(def.csa_currency), base_currency),
                _ => npv_by_netting_set.get(ns).copied().unwrap_or(0.0),
            }
        } else {
            let balance = user_balance.ok_or(CollateralError::MissingUserVm { netting_set: ns.clone() })?;
            let v = balance.vm.ok_or(CollateralError::MissingUserVm { netting_set: ns.clone() })?;
            v * fx(market, balance.currency.unwrap_or(def.csa_currency), base_currency)
        };

        let csa_fx = fx(market, def.csa_currency, base_currency);
        resolved.insert(
            ns.clone(),
            ResolvedCollateral {
                im,
                vm,
                iah: def.ia_held * csa_fx,
                mta: def.mta_rcv * csa_fx,
                th: def.threshold_rcv * csa_fx,
            },
        );
    }

    Ok(resolved)
}

fn fx(market: &dyn Market, from: crate::ids::CurrencyCode, to: crate::ids::CurrencyCode) -> f64 {
    market.fx_rate(from, to).unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CurrencyCode;
    use crate::market::InMemoryMarket;
    use crate::store::{CollateralBalance, NettingSetDefinition};

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    #[test]
    fn uncollateralised_netting_set_resolves_to_zero() {
        let mut stores = InputStores::new();
        let ns = NettingSetId::new("CP1");
        stores.netting_sets.insert(ns.clone(), NettingSetDefinition::uncollateralised(usd()));
        let market = InMemoryMarket::new();
        let resolved = resolve_collateral(&stores, &market, &HashMap::new(), usd()).unwrap();
        let r = resolved.get(&ns).unwrap();
        assert_eq!(r.im, 0.0);
        assert_eq!(r.vm, 0.0);
    }

    #[test]
    fn user_im_wins_when_not_defaulted() {
        let mut stores = InputStores::new();
        let ns = NettingSetId::new("CP1");
        let mut def = NettingSetDefinition::default_bilateral(usd(), 0.0, 0.0, 0.0, 1.0);
        def.calculate_im = true;
        stores.netting_sets.insert(ns.clone(), def);
        stores.collateral_balances.insert(ns.clone(), CollateralBalance { currency: Some(usd()), im: Some(5.0), vm: Some(0.0) });
        let market = InMemoryMarket::new();
        let resolved = resolve_collateral(&stores, &market, &HashMap::new(), usd()).unwrap();
        assert_eq!(resolved.get(&ns).unwrap().im, 5.0);
    }

    #[test]
    fn calculate_im_false_requires_user_balance() {
        let mut stores = InputStores::new();
        let ns = NettingSetId::new("CP1");
        let mut def = NettingSetDefinition::default_bilateral(usd(), 0.0, 0.0, 0.0, 1.0);
        def.calculate_im = false;
        stores.netting_sets.insert(ns.clone(), def);
        let market = InMemoryMarket::new();
        assert!(resolve_collateral(&stores, &market, &HashMap::new(), usd()).is_err());
    }
}
