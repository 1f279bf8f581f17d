//! JSON portfolio fixtures for fixture-driven CLI runs.
//!
//! JSON object keys must be strings, so the netting-set/collateral/
//! counterparty stores — keyed by structured ids — are represented as
//! arrays of `{id, ...}` entries here and folded into the stores' real
//! `HashMap`s on load, rather than forcing `saccr_core`'s stores
//! themselves into a JSON-friendly shape.

use std::collections::HashMap;

use serde::Deserialize;

use saccr_core::ids::{CounterpartyId, CurrencyCode, NettingSetId};
use saccr_core::store::{CollateralBalance, CounterpartyInfo, InputStores, NettingSetDefinition};
use saccr_core::trade::{SimpleTrade, TradeView};

use crate::error::{CliError, Result};

/// One netting-set-definition entry.
#[derive(Deserialize)]
struct NettingSetEntry {
    id: NettingSetId,
    #[serde(flatten)]
    def: NettingSetDefinition,
}

/// One collateral-balance entry.
#[derive(Deserialize)]
struct CollateralEntry {
    id: NettingSetId,
    #[serde(flatten)]
    balance: CollateralBalance,
}

/// One counterparty entry.
#[derive(Deserialize)]
struct CounterpartyEntry {
    id: CounterpartyId,
    #[serde(flatten)]
    info: CounterpartyInfo,
}

/// One FX quote: `1 from = rate to`.
#[derive(Deserialize)]
struct FxRateEntry {
    from: CurrencyCode,
    to: CurrencyCode,
    rate: f64,
}

/// The on-disk shape of a fixture-driven portfolio file.
#[derive(Deserialize)]
struct PortfolioFile {
    trades: Vec<SimpleTrade>,
    #[serde(default)]
    netting_sets: Vec<NettingSetEntry>,
    #[serde(default)]
    collateral_balances: Vec<CollateralEntry>,
    #[serde(default)]
    calculated_balances: Vec<CollateralEntry>,
    #[serde(default)]
    counterparties: Vec<CounterpartyEntry>,
    #[serde(default)]
    fx_rates: Vec<FxRateEntry>,
}

/// A loaded portfolio: trades, input stores, and the FX quotes to seed
/// an in-memory market with.
pub struct Portfolio {
    /// Trades, upcast to `TradeView`.
    pub trades: Vec<Box<dyn TradeView>>,
    /// Netting-set/collateral/counterparty stores.
    pub stores: InputStores,
    /// FX quotes from the fixture file, `(from, to) -> rate`.
    pub fx_rates: HashMap<(CurrencyCode, CurrencyCode), f64>,
}

/// Loads a portfolio fixture from a JSON file at `path`.
pub fn load(path: &str) -> Result<Portfolio> {
    if !std::path::Path::new(path).exists() {
        return Err(CliError::FileNotFound(path.to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    let file: PortfolioFile = serde_json::from_str(&raw)?;

    let trades: Vec<Box<dyn TradeView>> = file.trades.into_iter().map(|t| Box::new(t) as Box<dyn TradeView>).collect();

    let mut stores = InputStores::new();
    for entry in file.netting_sets {
        stores.netting_sets.insert(entry.id, entry.def);
    }
    for entry in file.collateral_balances {
        stores.push_raw_balance(entry.id, entry.balance);
    }
    for entry in file.calculated_balances {
        stores.calculated_balances.insert(entry.id, entry.balance);
    }
    for entry in file.counterparties {
        stores.counterparties.insert(entry.id, entry.info);
    }

    let mut fx_rates = HashMap::new();
    for quote in file.fx_rates {
        fx_rates.insert((quote.from, quote.to), quote.rate);
    }

    Ok(Portfolio { trades, stores, fx_rates })
}
