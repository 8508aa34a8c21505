//! QuantLab History Crate
//!
//! Historical data access for a backtesting and live-trading engine.
//!
//! # Overview
//!
//! The history crate covers:
//! - Planning: turning a caller's query into concrete per-tick-type requests
//! - Validation: rejecting meaningless queries before any data is fetched
//! - As-of resolution: finding the last recorded value at or before an instant
//!
//! Storage, decoding and aggregation live behind the [`HistoryProvider`] trait.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |      Query       |  (symbols, window, resolution, data kind)
//! +------------------+
//!          |
//!          v
//! +------------------+     +-------------------------------------+
//! |  RequestPlanner  | <-- | SecurityLookup, MarketHoursCalendar |
//! +------------------+     +-------------------------------------+
//!          |
//!          v
//! +------------------+
//! | ConcreteRequest  |  (one per symbol and tick type)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | HistoryProvider  |  (local files, cache, vendor API)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |   Observation    |  (trade bar, quote bar, tick, open interest)
//! +------------------+
//! ```
//!
//! [`LastKnownResolver`] drives the same pipeline backwards in doubling
//! windows until every wanted tick type has a value or the lookback floor is
//! reached.
//!
//! # Core Types
//!
//! - [`Query`] - A caller's request before planning
//! - [`ConcreteRequest`] - A fully defaulted request handed to providers
//! - [`Observation`] - A time-stamped value returned by providers
//! - [`Catalog`] - Tick types valid for each security type
//! - [`AsOfSnapshot`] - Last-known values for a symbol at an instant

pub mod calendar;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod last_known;
pub mod models;
pub mod planner;
pub mod provider;
pub mod resolver;
pub mod service;
pub mod time_utils;

pub use models::{
    Bar, ConcreteRequest, DataKind, DataNormalizationMode, HistoryWindow, Observation,
    OpenInterest, ProviderId, Query, QuoteBar, Resolution, SecurityMetadata, SecurityType, Symbol,
    Tick, TickType, TradeBar,
};

pub use calendar::{ExchangeHours, MarketSegment, SegmentState};
pub use catalog::Catalog;
pub use config::{HistoryConfig, LastKnownConfig, PlannerConfig};
pub use errors::{HistoryError, InvalidRequestKind, RetryClass};
pub use last_known::{AsOfSnapshot, LastKnown, LastKnownResolver, WantedTypes};
pub use planner::{QueryValidator, RequestPlanner};
pub use provider::{HistoryProvider, InMemoryProvider};
pub use resolver::{MarketHoursCalendar, SecurityDatabase, SecurityLookup};
pub use service::{FilterConfig, HistoryService, ObservationFilter, RejectReason};

pub use tokio_util::sync::CancellationToken;
