//! In-memory security database.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;

use crate::calendar::ExchangeHours;
use crate::errors::HistoryError;
use crate::models::{SecurityMetadata, Symbol};

use super::traits::{MarketHoursCalendar, SecurityLookup};

#[derive(Clone, Debug)]
struct SecurityEntry {
    metadata: SecurityMetadata,
    hours: Arc<ExchangeHours>,
}

/// Symbol metadata and exchange hours held in memory.
///
/// Implements both [`SecurityLookup`] and [`MarketHoursCalendar`]. Symbols
/// that were never registered are unknown to the lookup and always closed
/// to the calendar.
#[derive(Clone, Debug, Default)]
pub struct SecurityDatabase {
    entries: HashMap<Symbol, SecurityEntry>,
}

impl SecurityDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a symbol.
    pub fn insert(&mut self, symbol: Symbol, metadata: SecurityMetadata, hours: Arc<ExchangeHours>) {
        self.entries
            .insert(symbol, SecurityEntry { metadata, hours });
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_security(
        mut self,
        symbol: impl Into<Symbol>,
        metadata: SecurityMetadata,
        hours: Arc<ExchangeHours>,
    ) -> Self {
        self.insert(symbol.into(), metadata, hours);
        self
    }

    pub fn hours(&self, symbol: &Symbol) -> Option<&ExchangeHours> {
        self.entries.get(symbol).map(|e| e.hours.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SecurityLookup for SecurityDatabase {
    fn lookup(&self, symbol: &Symbol) -> Result<SecurityMetadata, HistoryError> {
        self.entries
            .get(symbol)
            .map(|e| e.metadata.clone())
            .ok_or_else(|| {
                debug!("No security metadata for '{}'", symbol);
                HistoryError::UnknownSymbol(symbol.clone())
            })
    }
}

impl MarketHoursCalendar for SecurityDatabase {
    fn is_open(&self, symbol: &Symbol, instant: DateTime<Utc>, extended_hours: bool) -> bool {
        self.hours(symbol)
            .is_some_and(|h| h.is_open(instant, extended_hours))
    }

    fn is_open_during(
        &self,
        symbol: &Symbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        extended_hours: bool,
    ) -> bool {
        self.hours(symbol)
            .is_some_and(|h| h.is_open_during(start, end, extended_hours))
    }

    fn previous_close(
        &self,
        symbol: &Symbol,
        before: DateTime<Utc>,
        extended_hours: bool,
    ) -> Option<DateTime<Utc>> {
        self.hours(symbol)?.previous_close(before, extended_hours)
    }
}
