//! Resolution and tick-type catalog.
//!
//! Static lookup tables keyed by [`SecurityType`] and [`Resolution`]:
//!
//! | Security type | Tick types | Primary price |
//! |---------------|------------|---------------|
//! | Equity | Trade, Quote | Trade |
//! | Option, FutureOption, IndexOption | Trade, Quote, OpenInterest | Quote |
//! | Future | Trade, Quote, OpenInterest | Trade |
//! | Forex, Cfd | Quote | Quote |
//! | Crypto, CryptoFuture | Trade, Quote | Trade |
//! | Index | Trade | Trade |
//! | Base (custom data) | Trade | Trade |
//!
//! Rows can be replaced at runtime with [`Catalog::with_tick_types`].

use std::collections::HashMap;

use crate::models::{Resolution, SecurityType, TickType};

const TRADE_QUOTE: &[TickType] = &[TickType::Trade, TickType::Quote];
const TRADE_QUOTE_OI: &[TickType] = &[TickType::Trade, TickType::Quote, TickType::OpenInterest];
const QUOTE_ONLY: &[TickType] = &[TickType::Quote];
const TRADE_ONLY: &[TickType] = &[TickType::Trade];

fn static_tick_types(security_type: SecurityType) -> &'static [TickType] {
    match security_type {
        SecurityType::Equity | SecurityType::Crypto | SecurityType::CryptoFuture => TRADE_QUOTE,
        SecurityType::Option
        | SecurityType::FutureOption
        | SecurityType::IndexOption
        | SecurityType::Future => TRADE_QUOTE_OI,
        SecurityType::Forex | SecurityType::Cfd => QUOTE_ONLY,
        SecurityType::Index | SecurityType::Base => TRADE_ONLY,
    }
}

/// Tick-type catalog with optional per-security-type overrides.
///
/// Immutable once built; safe to share between threads.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    overrides: HashMap<SecurityType, Vec<TickType>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tick-type row for a security type.
    ///
    /// The row is stored in canonical order (Trade, Quote, OpenInterest)
    /// without duplicates.
    pub fn with_tick_types(mut self, security_type: SecurityType, tick_types: &[TickType]) -> Self {
        let mut row = tick_types.to_vec();
        row.sort();
        row.dedup();
        self.overrides.insert(security_type, row);
        self
    }

    /// All tick types valid for a security type, in canonical order.
    pub fn tick_types(&self, security_type: SecurityType) -> &[TickType] {
        self.overrides
            .get(&security_type)
            .map(Vec::as_slice)
            .unwrap_or_else(|| static_tick_types(security_type))
    }

    pub fn supports(&self, security_type: SecurityType, tick_type: TickType) -> bool {
        self.tick_types(security_type).contains(&tick_type)
    }

    /// Tick types for an untyped query: the catalog row without OpenInterest.
    ///
    /// Open interest is only ever planned when asked for explicitly.
    pub fn default_tick_types(&self, security_type: SecurityType) -> Vec<TickType> {
        self.tick_types(security_type)
            .iter()
            .copied()
            .filter(|t| *t != TickType::OpenInterest)
            .collect()
    }

    /// The tick type a live subscription treats as its price source.
    pub fn primary_tick_type(&self, security_type: SecurityType) -> TickType {
        match security_type {
            SecurityType::Option
            | SecurityType::FutureOption
            | SecurityType::IndexOption
            | SecurityType::Forex
            | SecurityType::Cfd => TickType::Quote,
            SecurityType::Equity
            | SecurityType::Future
            | SecurityType::Index
            | SecurityType::Crypto
            | SecurityType::CryptoFuture
            | SecurityType::Base => TickType::Trade,
        }
    }

    /// Price sources in preference order: the primary type, then the other of
    /// Trade/Quote, restricted to what the catalog row contains.
    pub fn price_tick_types(&self, security_type: SecurityType) -> Vec<TickType> {
        let primary = self.primary_tick_type(security_type);
        let secondary = match primary {
            TickType::Quote => TickType::Trade,
            _ => TickType::Quote,
        };
        [primary, secondary]
            .into_iter()
            .filter(|t| self.supports(security_type, *t))
            .collect()
    }

    /// Whether prices of this asset class are subject to corporate-action adjustment.
    pub fn supports_adjustment(&self, security_type: SecurityType) -> bool {
        matches!(security_type, SecurityType::Equity)
    }

    /// Fill-forward resolution implied by a data resolution.
    pub fn fill_forward_default(&self, resolution: Resolution) -> Option<Resolution> {
        match resolution {
            Resolution::Tick => None,
            Resolution::Second | Resolution::Minute | Resolution::Hour | Resolution::Daily => {
                Some(resolution)
            }
        }
    }
}
