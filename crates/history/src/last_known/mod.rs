//! Last-known-value resolution.
//!
//! Finds the most recent recorded observation at or before an instant by
//! searching backwards in doubling windows:
//!
//! ```text
//!   floor                                                      as_of
//!     │◀──────────── 8d ────────────┤◀──── 4d ────┤◀─ 2d ─┤◀1d─┤
//!     │          window 4           │  window 3   │ win 2 │ w1 │
//! ```
//!
//! Each window is planned through the [`RequestPlanner`](crate::planner::RequestPlanner)
//! with `now = as_of`, so nothing after the instant is ever requested. The
//! floor is the configured maximum lookback, raised to the listing date when
//! one is known. When the market is closed at the instant, the first window
//! reaches back past the previous close.

mod snapshot;

pub use snapshot::{AsOfSnapshot, LastKnown, WantedTypes};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::config::LastKnownConfig;
use crate::errors::HistoryError;
use crate::models::{
    ConcreteRequest, DataKind, Observation, Query, SecurityMetadata, Symbol, TickType,
};
use crate::service::{HistoryService, ObservationFilter};

/// Resolves the last known value of a symbol at an instant.
pub struct LastKnownResolver {
    service: Arc<HistoryService>,
    config: LastKnownConfig,
    filter: ObservationFilter,
}

impl LastKnownResolver {
    pub fn new(service: Arc<HistoryService>) -> Self {
        Self::with_config(service, LastKnownConfig::default())
    }

    pub fn with_config(service: Arc<HistoryService>, config: LastKnownConfig) -> Self {
        Self {
            service,
            config,
            filter: ObservationFilter::recorded_only(),
        }
    }

    pub fn config(&self) -> &LastKnownConfig {
        &self.config
    }

    /// Resolve the latest observations for `symbol` at or before `as_of`.
    ///
    /// Fill-forward copies and observations failing the sanity checks are
    /// never returned. A tick type with nothing recorded back to the floor is
    /// reported as [`LastKnown::NotFound`]; that is not an error.
    ///
    /// # Errors
    ///
    /// - [`HistoryError::UnknownSymbol`] when the lookup has no metadata
    /// - [`HistoryError::UnsupportedTickType`] for `WantedTypes::Only` with a
    ///   type the catalog does not list
    /// - [`HistoryError::SourceUnavailable`] from the provider, unretried
    /// - [`HistoryError::Cancelled`] when `cancel` fires or the configured
    ///   timeout elapses
    pub async fn resolve_as_of(
        &self,
        symbol: &Symbol,
        as_of: DateTime<Utc>,
        wanted: WantedTypes,
        cancel: &CancellationToken,
    ) -> Result<AsOfSnapshot, HistoryError> {
        let search = self.search(symbol, as_of, wanted, cancel);
        match self.config.timeout() {
            Some(limit) => match tokio::time::timeout(limit, search).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        "Last-known search for '{}' timed out after {:?}",
                        symbol, limit
                    );
                    Err(HistoryError::Cancelled)
                }
            },
            None => search.await,
        }
    }

    /// Resolve several symbols one after another.
    ///
    /// Stops at the first error.
    pub async fn resolve_many(
        &self,
        symbols: &[Symbol],
        as_of: DateTime<Utc>,
        wanted: WantedTypes,
        cancel: &CancellationToken,
    ) -> Result<Vec<AsOfSnapshot>, HistoryError> {
        let mut snapshots = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            snapshots.push(self.resolve_as_of(symbol, as_of, wanted, cancel).await?);
        }
        Ok(snapshots)
    }

    async fn search(
        &self,
        symbol: &Symbol,
        as_of: DateTime<Utc>,
        wanted: WantedTypes,
        cancel: &CancellationToken,
    ) -> Result<AsOfSnapshot, HistoryError> {
        let metadata = self.service.planner().security(symbol)?;
        let candidates = self.candidates(symbol, &metadata, wanted)?;
        let first_only = wanted == WantedTypes::Primary;
        let floor = self.floor(&metadata, as_of);

        let mut found: HashMap<TickType, Observation> = HashMap::new();
        let mut windows = 0usize;

        if floor <= as_of && !candidates.is_empty() {
            let mut lookback = self.first_lookback(symbol, as_of);
            let mut window_end = as_of;
            loop {
                // In first-only mode the fallback types keep being searched
                // until the primary type turns up or the floor is reached.
                let primary_found = candidates.first().is_some_and(|t| found.contains_key(t));
                let pending: Vec<TickType> = candidates
                    .iter()
                    .copied()
                    .filter(|t| !found.contains_key(t))
                    .collect();
                if pending.is_empty() || (first_only && primary_found) {
                    break;
                }

                let window_start = as_of
                    .checked_sub_signed(lookback)
                    .map_or(floor, |start| start.max(floor));
                debug!(
                    "Searching '{}' for {:?} in [{}, {}]",
                    symbol, pending, window_start, window_end
                );

                let requests = self.plan_window(symbol, &pending, window_start, window_end, as_of)?;
                let observations = self.service.fetch(&requests, cancel).await?;
                windows += 1;

                for tick_type in pending {
                    if let Some(latest) = self.latest(&observations, symbol, tick_type, as_of) {
                        found.insert(tick_type, latest.clone());
                    }
                }

                if window_start <= floor {
                    break;
                }
                window_end = window_start;
                lookback = (lookback + lookback).min(as_of.signed_duration_since(floor));
            }
        }

        let values = assemble(&candidates, found, first_only);
        let resolved = values.iter().filter(|(_, v)| v.is_found()).count();
        if resolved == 0 {
            info!(
                "No value recorded for '{}' between {} and {}",
                symbol, floor, as_of
            );
        } else {
            debug!(
                "Resolved {}/{} tick types for '{}' at {} in {} windows",
                resolved,
                values.len(),
                symbol,
                as_of,
                windows
            );
        }

        Ok(AsOfSnapshot {
            symbol: symbol.clone(),
            as_of,
            values,
        })
    }

    fn candidates(
        &self,
        symbol: &Symbol,
        metadata: &SecurityMetadata,
        wanted: WantedTypes,
    ) -> Result<Vec<TickType>, HistoryError> {
        let catalog = self.service.planner().catalog();
        let security_type = metadata.security_type;
        match wanted {
            WantedTypes::Primary => Ok(catalog.price_tick_types(security_type)),
            WantedTypes::All => Ok(catalog.tick_types(security_type).to_vec()),
            WantedTypes::Only(tick_type) if catalog.supports(security_type, tick_type) => {
                Ok(vec![tick_type])
            }
            WantedTypes::Only(tick_type) => Err(HistoryError::UnsupportedTickType {
                symbol: symbol.clone(),
                security_type,
                tick_type,
            }),
        }
    }

    /// Span of the first window.
    ///
    /// When the market is closed at `as_of`, the window is stretched back to
    /// the previous close so it covers the last session rather than closed
    /// hours.
    fn first_lookback(&self, symbol: &Symbol, as_of: DateTime<Utc>) -> Duration {
        let initial = self.config.initial_lookback();
        let planner = self.service.planner();
        let extended = planner.config().extended_market_hours;
        match planner.calendar().previous_close(symbol, as_of, extended) {
            Some(close) if close < as_of => as_of.signed_duration_since(close) + initial,
            _ => initial,
        }
    }

    /// Earliest instant the search may reach.
    fn floor(&self, metadata: &SecurityMetadata, as_of: DateTime<Utc>) -> DateTime<Utc> {
        let cap = as_of
            .checked_sub_signed(self.config.max_lookback())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        metadata
            .listing_date
            .map_or(cap, |listed| cap.max(listed))
    }

    /// One typed, non-filled range query per pending tick type.
    fn plan_window(
        &self,
        symbol: &Symbol,
        pending: &[TickType],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<ConcreteRequest>, HistoryError> {
        let mut requests = Vec::with_capacity(pending.len());
        for tick_type in pending {
            let query = Query::range([symbol.clone()], start, end)
                .with_resolution(self.config.resolution)
                .with_data_kind(DataKind::for_tick_type(*tick_type))
                .with_fill_forward(false);
            requests.extend(self.service.planner().plan(&query, as_of)?);
        }
        Ok(requests)
    }

    fn latest<'a>(
        &self,
        observations: &'a [Observation],
        symbol: &Symbol,
        tick_type: TickType,
        as_of: DateTime<Utc>,
    ) -> Option<&'a Observation> {
        observations
            .iter()
            .filter(|o| {
                o.symbol() == symbol && o.tick_type() == tick_type && o.end_time() <= as_of
            })
            .filter(|o| match self.filter.check(o) {
                Ok(()) => true,
                Err(reason) => {
                    debug!(
                        "Skipping {} for '{}' at {}: {}",
                        tick_type,
                        symbol,
                        o.end_time(),
                        reason
                    );
                    false
                }
            })
            .max_by_key(|o| o.end_time())
    }
}

/// Order the outcome by candidate preference.
///
/// In first-only mode a single entry is produced: the primary type when it
/// was found anywhere above the floor, otherwise the next type that was, or
/// the primary type as not found.
fn assemble(
    candidates: &[TickType],
    mut found: HashMap<TickType, Observation>,
    first_only: bool,
) -> Vec<(TickType, LastKnown)> {
    if first_only {
        let hit = candidates
            .iter()
            .find_map(|t| found.remove(t).map(|o| (*t, LastKnown::Found(o))));
        return match (hit, candidates.first()) {
            (Some(entry), _) => vec![entry],
            (None, Some(primary)) => vec![(*primary, LastKnown::NotFound)],
            (None, None) => Vec::new(),
        };
    }

    candidates
        .iter()
        .map(|t| {
            let value = found.remove(t).map_or(LastKnown::NotFound, LastKnown::Found);
            (*t, value)
        })
        .collect()
}
