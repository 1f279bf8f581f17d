//! Structured diagnostics emitted by every pipeline stage.
//!
//! Every non-fatal condition described in the validator, classifier and
//! collateral-resolver stages produces one [`Diagnostic`]: it is both
//! pushed onto the stage's output vector (so callers can inspect and
//! filter programmatically) and emitted as a `tracing` event with the
//! same fields, so operators get it in the log stream for free.

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic, mirroring the three channels a structured
/// message can be filtered on downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// A default was substituted for a missing configuration value.
    Info,
    /// A value was overridden, or a non-canonical input was accepted.
    Warning,
    /// An inconsistency was found; the trade or netting set it concerns
    /// may be unusable even though the pipeline as a whole continues.
    Error,
}

/// Coarse category for a diagnostic, used for filtering and routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    /// A required configuration key was absent; a default was substituted.
    ConfigMissing,
    /// Configuration was present but internally inconsistent.
    ConfigInconsistent,
    /// A trade's type is not in the supported set.
    TradeUnsupported,
    /// Notional computation failed for a trade.
    NotionalError,
    /// Supervisory delta computation failed for a trade.
    DeltaError,
    /// A resolved aggregation input was missing.
    AggregationError,
}

/// A single structured diagnostic.
///
/// Every log message carries `source = "SA-CCR"`, a `category`, a
/// `subject` (trade, netting-set, or counterparty id), an `action`
/// describing what was being attempted, and free-text `detail`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity channel.
    pub severity: Severity,
    /// Always `"SA-CCR"` for diagnostics raised by this engine.
    pub source: &'static str,
    /// Coarse category, for programmatic filtering.
    pub category: DiagnosticCategory,
    /// The trade id / netting-set id / counterparty id this concerns.
    pub subject: String,
    /// What was being attempted when the condition was found.
    pub action: String,
    /// Free-text detail.
    pub detail: String,
}

impl Diagnostic {
    /// Constructs a diagnostic and emits the matching `tracing` event.
    pub fn new(
        severity: Severity,
        category: DiagnosticCategory,
        subject: impl Into<String>,
        action: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let diag = Self {
            severity,
            source: "SA-CCR",
            category,
            subject: subject.into(),
            action: action.into(),
            detail: detail.into(),
        };
        diag.emit();
        diag
    }

    fn emit(&self) {
        match self.severity {
            Severity::Info => tracing::info!(
                source = self.source,
                category = ?self.category,
                subject = %self.subject,
                action = %self.action,
                detail = %self.detail,
                "SA-CCR diagnostic"
            ),
            Severity::Warning => tracing::warn!(
                source = self.source,
                category = ?self.category,
                subject = %self.subject,
                action = %self.action,
                detail = %self.detail,
                "SA-CCR diagnostic"
            ),
            Severity::Error => tracing::error!(
                source = self.source,
                category = ?self.category,
                subject = %self.subject,
                action = %self.action,
                detail = %self.detail,
                "SA-CCR diagnostic"
            ),
        }
    }
}
