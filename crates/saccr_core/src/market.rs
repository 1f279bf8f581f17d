//! External collaborator traits: market data, SIMM name/bucket mapping
//! and reference data.
//!
//! These are deliberately out of scope for this crate: it never owns a
//! market-data service, a SIMM name/bucket mapping service, or a
//! reference-data service. `saccr_core` depends only on the trait; a production
//! caller supplies its own market-data service, a real SIMM name/bucket
//! mapper, and a reference-data lookup. The `InMemory*` implementations
//! below exist for tests and for `saccr_cli` fixtures.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::ids::CurrencyCode;

/// Market data required by the classifier and collateral resolver: FX
/// conversion, discount factors, and equity fixings.
pub trait Market {
    /// Spot FX rate to convert one unit of `from` into `to`.
    fn fx_rate(&self, from: CurrencyCode, to: CurrencyCode) -> Option<f64>;

    /// Discount factor for `ccy` at year-fraction `t`.
    fn discount_factor(&self, ccy: CurrencyCode, t: f64) -> Option<f64>;

    /// Equity fixing for a named underlying on a given date.
    fn equity_fixing(&self, name: &str, date: NaiveDate) -> Option<f64>;

    /// Currency an equity underlying is quoted in.
    fn equity_currency(&self, name: &str) -> Option<CurrencyCode>;
}

/// SIMM name mapper: collapses raw commodity/equity index names (e.g.
/// `"Brent"`, `"WTI"`) onto a canonical qualifier (e.g. `"Crude oil"`).
pub trait NameMapper {
    /// Maps a raw commodity/equity name to its SIMM qualifier.
    fn qualifier(&self, name: &str) -> String;
}

/// SIMM bucket mapper: maps a commodity qualifier to its regulatory
/// bucket (used to select the commodity hedging set).
pub trait BucketMapper {
    /// Maps a qualifier to its bucket identifier.
    fn bucket(&self, qualifier: &str) -> String;
}

/// Reference-data lookup for equity underlyings.
pub trait ReferenceData {
    /// Whether the named equity underlying is an index (vs single name).
    fn is_equity_index(&self, name: &str) -> bool;
}

/// A simple in-memory market built from explicit quote tables.
///
/// FX rates are stored as `(from, to) -> rate`; `fx_rate` also derives
/// the inverse and same-currency (rate = 1) cases automatically.
#[derive(Clone, Debug, Default)]
pub struct InMemoryMarket {
    fx_rates: HashMap<(CurrencyCode, CurrencyCode), f64>,
    discount_curves: HashMap<CurrencyCode, Vec<(f64, f64)>>,
    equity_fixings: HashMap<String, f64>,
    equity_currencies: HashMap<String, CurrencyCode>,
}

impl InMemoryMarket {
    /// Creates an empty market.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an FX quote `1 from = rate to`.
    pub fn with_fx_rate(mut self, from: CurrencyCode, to: CurrencyCode, rate: f64) -> Self {
        self.fx_rates.insert((from, to), rate);
        self
    }

    /// Registers a flat discount factor for a currency (ignores `t`).
    pub fn with_flat_discount(mut self, ccy: CurrencyCode, df: f64) -> Self {
        self.discount_curves.insert(ccy, vec![(0.0, df)]);
        self
    }

    /// Registers an equity fixing and its quote currency.
    pub fn with_equity(mut self, name: impl Into<String>, fixing: f64, ccy: CurrencyCode) -> Self {
        let name = name.into();
        self.equity_fixings.insert(name.clone(), fixing);
        self.equity_currencies.insert(name, ccy);
        self
    }
}

impl Market for InMemoryMarket {
    fn fx_rate(&self, from: CurrencyCode, to: CurrencyCode) -> Option<f64> {
        if from == to {
            return Some(1.0);
        }
        if let Some(r) = self.fx_rates.get(&(from, to)) {
            return Some(*r);
        }
        self.fx_rates.get(&(to, from)).map(|r| 1.0 / r)
    }

    fn discount_factor(&self, ccy: CurrencyCode, _t: f64) -> Option<f64> {
        self.discount_curves.get(&ccy).and_then(|c| c.first()).map(|(_, df)| *df)
    }

    fn equity_fixing(&self, name: &str, _date: NaiveDate) -> Option<f64> {
        self.equity_fixings.get(name).copied()
    }

    fn equity_currency(&self, name: &str) -> Option<CurrencyCode> {
        self.equity_currencies.get(name).copied()
    }
}

/// A name mapper backed by an explicit table, falling back to the
/// identity mapping (the raw name is its own qualifier).
#[derive(Clone, Debug, Default)]
pub struct InMemoryNameMapper {
    table: HashMap<String, String>,
}

impl InMemoryNameMapper {
    /// Creates a new mapper with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name -> qualifier`.
    pub fn with_mapping(mut self, name: impl Into<String>, qualifier: impl Into<String>) -> Self {
        self.table.insert(name.into(), qualifier.into());
        self
    }
}

impl NameMapper for InMemoryNameMapper {
    fn qualifier(&self, name: &str) -> String {
        self.table.get(name).cloned().unwrap_or_else(|| name.to_string())
    }
}

/// A bucket mapper backed by an explicit qualifier-to-bucket table.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBucketMapper {
    table: HashMap<String, String>,
}

impl InMemoryBucketMapper {
    /// Creates a new mapper with no entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `qualifier -> bucket`.
    pub fn with_bucket(mut self, qualifier: impl Into<String>, bucket: impl Into<String>) -> Self {
        self.table.insert(qualifier.into(), bucket.into());
        self
    }
}

impl BucketMapper for InMemoryBucketMapper {
    fn bucket(&self, qualifier: &str) -> String {
        self.table.get(qualifier).cloned().unwrap_or_default()
    }
}

/// A reference-data lookup backed by an explicit equity-index set.
#[derive(Clone, Debug, Default)]
pub struct InMemoryReferenceData {
    equity_indices: std::collections::HashSet<String>,
}

impl InMemoryReferenceData {
    /// Creates an empty reference-data set (nothing is an index).
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags `name` as an equity index.
    pub fn with_equity_index(mut self, name: impl Into<String>) -> Self {
        self.equity_indices.insert(name.into());
        self
    }
}

impl ReferenceData for InMemoryReferenceData {
    fn is_equity_index(&self, name: &str) -> bool {
        self.equity_indices.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ccy(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[test]
    fn fx_rate_same_currency_is_one() {
        let m = InMemoryMarket::new();
        assert_eq!(m.fx_rate(ccy("USD"), ccy("USD")), Some(1.0));
    }

    #[test]
    fn fx_rate_inverts_when_only_reverse_quote_known() {
        let m = InMemoryMarket::new().with_fx_rate(ccy("EUR"), ccy("USD"), 1.1);
        assert_eq!(m.fx_rate(ccy("USD"), ccy("EUR")), Some(1.0 / 1.1));
    }

    #[test]
    fn name_mapper_falls_back_to_identity() {
        let m = InMemoryNameMapper::new().with_mapping("Brent", "Crude oil");
        assert_eq!(m.qualifier("Brent"), "Crude oil");
        assert_eq!(m.qualifier("Unknown"), "Unknown");
    }
}
