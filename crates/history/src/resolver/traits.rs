//! Collaborator traits for symbol metadata and trading hours.
//!
//! Both are read-only and shared across threads; planning calls them
//! synchronously.

use chrono::{DateTime, Utc};

use crate::errors::HistoryError;
use crate::models::{SecurityMetadata, Symbol};

/// Resolves a symbol to its static metadata.
pub trait SecurityLookup: Send + Sync {
    /// Returns the metadata for `symbol`, or [`HistoryError::UnknownSymbol`].
    fn lookup(&self, symbol: &Symbol) -> Result<SecurityMetadata, HistoryError>;
}

/// Answers trading-hours questions for a symbol.
pub trait MarketHoursCalendar: Send + Sync {
    /// Whether the symbol trades at `instant`.
    fn is_open(&self, symbol: &Symbol, instant: DateTime<Utc>, extended_hours: bool) -> bool;

    /// Whether the symbol trades at any point within `[start, end)`.
    fn is_open_during(
        &self,
        symbol: &Symbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        extended_hours: bool,
    ) -> bool;

    /// End of the most recent trading interval at or before `before`
    /// (`before` itself while trading). `None` when no trading is known.
    fn previous_close(
        &self,
        symbol: &Symbol,
        before: DateTime<Utc>,
        extended_hours: bool,
    ) -> Option<DateTime<Utc>>;
}
