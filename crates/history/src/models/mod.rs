//! History data models
//!
//! This module contains the core data types for history operations:
//! - `types` - Identifiers (Symbol, ProviderId)
//! - `resolution` - Data granularity (Resolution)
//! - `security` - Asset classes and per-symbol metadata (SecurityType, SecurityMetadata)
//! - `tick_type` - Observation kinds (TickType, DataKind)
//! - `request` - Caller queries and planned requests (Query, HistoryWindow, ConcreteRequest)
//! - `observation` - Returned data (Observation, TradeBar, QuoteBar, Tick, OpenInterest)

mod observation;
mod request;
mod resolution;
mod security;
mod tick_type;
mod types;

pub use observation::{Bar, Observation, OpenInterest, QuoteBar, Tick, TradeBar};
pub use request::{ConcreteRequest, DataNormalizationMode, HistoryWindow, Query};
pub use resolution::Resolution;
pub use security::{SecurityMetadata, SecurityType};
pub use tick_type::{DataKind, TickType};
pub use types::{ProviderId, Symbol};
