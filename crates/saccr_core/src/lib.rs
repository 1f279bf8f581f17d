//! # saccr_core
//!
//! Standardised Approach for Counterparty Credit Risk (SA-CCR) exposure
//! and capital-charge engine for OTC derivative netting sets.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    pipeline                      │
//! │  S1 validate → S2 classify → S3 resolve          │
//! │  collateral → S4 aggregate → S5 report           │
//! └─────────────────────────────────────────────────┘
//!       │            │            │          │
//!   validator     classify   collateral  aggregate
//!   (checks 1-11)  (hedging   (IM/VM       (RC, add-on,
//!                  sets, MF,   fallback)    multiplier,
//!                  delta, SD)               EAD, CC)
//!                       │
//!                    record (TradeRecord)
//!                       │
//!                trade / market / store / config / ids
//! ```
//!
//! `trade` defines the `TradeView` trait every upstream trade
//! representation must implement; `market`/`store`/`config` are the
//! boundary collaborators (market data, input stores, pipeline
//! configuration) the pipeline depends on only through traits and plain
//! data, never a concrete production integration.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use saccr_core::ids::CurrencyCode;
//! use saccr_core::market::{InMemoryBucketMapper, InMemoryMarket, InMemoryNameMapper, InMemoryReferenceData};
//! use saccr_core::pipeline::{run_pipeline, PipelineCollaborators};
//! use saccr_core::store::InputStores;
//! use saccr_core::trade::TradeView;
//! use saccr_core::PipelineConfig;
//!
//! let trades: Vec<Box<dyn TradeView>> = Vec::new();
//! let mut stores = InputStores::new();
//! let market = InMemoryMarket::new();
//! let name_mapper = InMemoryNameMapper::new();
//! let bucket_mapper = InMemoryBucketMapper::new();
//! let reference_data = InMemoryReferenceData::new();
//! let collaborators = PipelineCollaborators {
//!     market: &market,
//!     name_mapper: &name_mapper,
//!     bucket_mapper: &bucket_mapper,
//!     reference_data: &reference_data,
//! };
//! let config = PipelineConfig::default();
//! let valuation_date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
//!
//! let output = run_pipeline(&trades, &mut stores, &collaborators, &config, valuation_date).unwrap();
//! assert_eq!(output.aggregation.portfolio_cc, 0.0);
//! ```

#![warn(missing_docs)]

pub mod aggregate;
pub mod classify;
pub mod collateral;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod market;
pub mod math;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod store;
pub mod trade;
pub mod validator;

pub use config::{DefaultValues, PipelineConfig};
pub use diagnostics::{Diagnostic, DiagnosticCategory, Severity};
pub use error::PipelineError;
pub use ids::{CounterpartyId, CurrencyCode, NettingSetId, TradeId};
pub use pipeline::{run_pipeline, PipelineCollaborators, PipelineOutput};
pub use record::{AssetClass, TradeRecord};
