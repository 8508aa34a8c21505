//! Error types and retry classification for the history crate.
//!
//! This module provides:
//! - [`HistoryError`]: The main error enum for planning, fetching and as-of resolution
//! - [`InvalidRequestKind`]: Why the consistency validator rejected a query
//! - [`RetryClass`]: Classification for determining retry behavior
//!
//! "No data" is never an error here. The fetch port returns an empty sequence
//! and the last-known-value resolver returns
//! [`LastKnown::NotFound`](crate::last_known::LastKnown::NotFound).

mod retry;

pub use retry::RetryClass;

use std::fmt;

use thiserror::Error;

use crate::models::{SecurityType, Symbol, TickType};

/// Reasons a query shape is rejected before any data is requested.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InvalidRequestKind {
    /// Tick resolution combined with a bar-count or duration window.
    TickResolutionRequiresExplicitWindow,

    /// A single bar-shaped data kind requested at tick resolution.
    TickResolutionIncompatibleWithTypedBarApi,

    /// No symbols in the query.
    EmptyQuery,

    /// Start after end, or an empty bar-count/duration window.
    InvalidTimeRange,
}

impl fmt::Display for InvalidRequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Errors that can occur during history operations.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The query shape is meaningless. Surfaced before any fetch happens.
    #[error("Invalid request ({kind}): {reason}")]
    InvalidRequest {
        kind: InvalidRequestKind,
        reason: String,
    },

    /// The requested tick type does not exist for the symbol's security type.
    #[error("Unsupported tick type {tick_type} for {symbol} ({security_type})")]
    UnsupportedTickType {
        symbol: Symbol,
        security_type: SecurityType,
        tick_type: TickType,
    },

    /// The security lookup has no metadata for the symbol.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(Symbol),

    /// The market-hours calendar reports no trading for the symbol,
    /// so a bar-count or duration window cannot be placed.
    #[error("No trading hours found for {0}")]
    NoTradingHours(Symbol),

    /// The history provider failed.
    #[error("Source unavailable: {provider} - {message}")]
    SourceUnavailable { provider: String, message: String },

    /// The caller's cancellation token or timeout fired.
    #[error("Cancelled")]
    Cancelled,

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl HistoryError {
    pub(crate) fn invalid(kind: InvalidRequestKind, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            kind,
            reason: reason.into(),
        }
    }

    /// The validator sub-kind, if this is an invalid-request error.
    pub fn invalid_kind(&self) -> Option<InvalidRequestKind> {
        match self {
            Self::InvalidRequest { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use quantlab_history::errors::{HistoryError, RetryClass};
    ///
    /// let error = HistoryError::SourceUnavailable {
    ///     provider: "LOCAL_DISK".to_string(),
    ///     message: "cache offline".to_string(),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::Transient);
    ///
    /// assert_eq!(HistoryError::Cancelled.retry_class(), RetryClass::Aborted);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Caller-programming errors and missing metadata
            Self::InvalidRequest { .. }
            | Self::UnsupportedTickType { .. }
            | Self::UnknownSymbol(_)
            | Self::NoTradingHours(_)
            | Self::Config(_) => RetryClass::Never,

            Self::SourceUnavailable { .. } => RetryClass::Transient,

            Self::Cancelled => RetryClass::Aborted,
        }
    }
}
