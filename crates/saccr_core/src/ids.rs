//! Identifiers used throughout the SA-CCR pipeline.
//!
//! Trades, counterparties and netting sets are addressed by small,
//! `Clone`-cheap newtypes rather than raw `String`s so that the many
//! `BTreeMap`/`HashMap` keys built up during aggregation stay
//! self-describing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A trade identifier, as assigned by the upstream trade store.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeId(String);

impl TradeId {
    /// Creates a new trade id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TradeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A counterparty identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CounterpartyId(String);

impl CounterpartyId {
    /// Creates a new counterparty id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterpartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CounterpartyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A netting set identifier.
///
/// Composite of the counterparty plus an optional ISDA master agreement
/// reference. Two netting sets with the same counterparty but different
/// agreements are distinct, per the data model's identifier rule:
/// equality is compared over every component, never just the counterparty.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NettingSetId {
    /// Counterparty this netting set belongs to.
    pub counterparty: CounterpartyId,
    /// Legal agreement reference (e.g. an ISDA Master Agreement id).
    pub agreement: Option<String>,
    /// Master agreement type (e.g. "ISDA").
    pub master_agreement_type: Option<String>,
    /// Master agreement subtype (e.g. "1992", "2002").
    pub master_agreement_subtype: Option<String>,
}

impl NettingSetId {
    /// Creates a netting set id with no agreement qualifiers.
    pub fn new(counterparty: impl Into<CounterpartyId>) -> Self {
        Self {
            counterparty: counterparty.into(),
            agreement: None,
            master_agreement_type: None,
            master_agreement_subtype: None,
        }
    }

    /// Creates a fully-qualified netting set id.
    pub fn with_agreement(
        counterparty: impl Into<CounterpartyId>,
        agreement: impl Into<String>,
        master_agreement_type: impl Into<String>,
        master_agreement_subtype: impl Into<String>,
    ) -> Self {
        Self {
            counterparty: counterparty.into(),
            agreement: Some(agreement.into()),
            master_agreement_type: Some(master_agreement_type.into()),
            master_agreement_subtype: Some(master_agreement_subtype.into()),
        }
    }
}

impl fmt::Display for NettingSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.counterparty)?;
        if let Some(a) = &self.agreement {
            write!(f, "/{a}")?;
        }
        Ok(())
    }
}

/// ISO 4217-style three-letter currency code.
///
/// Stored as a fixed `[u8; 3]` rather than a heap `String` so that it
/// stays `Copy` in the hot aggregation loops (effective-notional sums,
/// FX conversion per coupon), while remaining an open, runtime-populated
/// domain — unlike a closed currency enum, any alphabetic three-letter
/// code round-trips through `FromStr`/`Display`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

/// Error returned when a string cannot be parsed as a [`CurrencyCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid currency code: {0:?}")]
pub struct InvalidCurrencyCode(pub String);

impl CurrencyCode {
    /// Constructs a currency code from a 3-letter ASCII alphabetic string.
    pub fn new(code: &str) -> Result<Self, InvalidCurrencyCode> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(InvalidCurrencyCode(code.to_string()));
        }
        let mut upper = [0u8; 3];
        for (i, b) in bytes.iter().enumerate() {
            upper[i] = b.to_ascii_uppercase();
        }
        Ok(Self(upper))
    }

    /// Returns the 3-letter code as a string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("currency code is always valid ASCII")
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = InvalidCurrencyCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = InvalidCurrencyCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn netting_set_id_equality_requires_all_components() {
        let a = NettingSetId::new(CounterpartyId::new("CP1"));
        let b = NettingSetId::with_agreement(CounterpartyId::new("CP1"), "AGR1", "ISDA", "1992");
        assert_ne!(a, b);
    }

    #[test]
    fn currency_code_roundtrip_and_uppercases() {
        let c = CurrencyCode::new("eur").unwrap();
        assert_eq!(c.as_str(), "EUR");
        assert_eq!(c, CurrencyCode::new("EUR").unwrap());
    }

    #[test]
    fn currency_code_rejects_non_alpha3() {
        assert!(CurrencyCode::new("US1").is_err());
        assert!(CurrencyCode::new("USDD").is_err());
    }
}
