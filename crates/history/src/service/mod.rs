//! History service facade.
//!
//! Ties the planner to a provider:
//!
//! ```text
//! Query ──▶ RequestPlanner::plan ──▶ HistoryProvider::fetch ──▶ ObservationFilter ──▶ sorted
//!              │ (fails fast,              │ (one call,
//!              │  no fetch)                │  cancellable)
//!              ▼                           ▼
//!         HistoryError               HistoryError
//! ```

mod filter;

pub use filter::{FilterConfig, ObservationFilter, RejectReason};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::errors::{HistoryError, RetryClass};
use crate::models::{ConcreteRequest, Observation, Query};
use crate::planner::RequestPlanner;
use crate::provider::HistoryProvider;

/// Plans queries and fetches them from a single provider.
pub struct HistoryService {
    planner: Arc<RequestPlanner>,
    provider: Arc<dyn HistoryProvider>,
    filter: ObservationFilter,
}

impl HistoryService {
    pub fn new(planner: Arc<RequestPlanner>, provider: Arc<dyn HistoryProvider>) -> Self {
        Self::with_filter(planner, provider, ObservationFilter::new())
    }

    pub fn with_filter(
        planner: Arc<RequestPlanner>,
        provider: Arc<dyn HistoryProvider>,
        filter: ObservationFilter,
    ) -> Self {
        Self {
            planner,
            provider,
            filter,
        }
    }

    pub fn planner(&self) -> &RequestPlanner {
        &self.planner
    }

    pub fn provider(&self) -> &dyn HistoryProvider {
        self.provider.as_ref()
    }

    /// Plan a query and fetch its observations.
    ///
    /// Invalid queries are rejected before the provider is contacted. The
    /// result holds only observations that belong to a planned request and
    /// pass the filter, ordered by end time.
    pub async fn history(
        &self,
        query: &Query,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Observation>, HistoryError> {
        let requests = self.planner.plan(query, now)?;
        let observations = self.fetch(&requests, cancel).await?;

        let (mut accepted, rejected) = self.filter.filter_batch(observations);
        for (observation, reason) in &rejected {
            debug!(
                "Dropping {} observation for '{}' at {}: {}",
                observation.tick_type(),
                observation.symbol(),
                observation.end_time(),
                reason
            );
        }
        if !rejected.is_empty() {
            warn!(
                "Provider '{}' returned {} invalid observations",
                self.provider.id(),
                rejected.len()
            );
        }

        accepted.sort_by_key(Observation::end_time);
        Ok(accepted)
    }

    /// Execute planned requests with one provider call.
    ///
    /// Observations that no request asked for are dropped. An empty request
    /// list returns immediately without contacting the provider.
    pub(crate) async fn fetch(
        &self,
        requests: &[ConcreteRequest],
        cancel: &CancellationToken,
    ) -> Result<Vec<Observation>, HistoryError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        if cancel.is_cancelled() {
            return Err(HistoryError::Cancelled);
        }

        let provider_id = self.provider.id();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(HistoryError::Cancelled),
            result = self.provider.fetch(requests) => result,
        };

        match result {
            Ok(observations) => {
                let total = observations.len();
                let kept: Vec<Observation> = observations
                    .into_iter()
                    .filter(|o| requested(requests, o))
                    .collect();
                if kept.len() < total {
                    debug!(
                        "Provider '{}' returned {} observations outside the requests",
                        provider_id,
                        total - kept.len()
                    );
                }
                Ok(kept)
            }
            Err(e) => {
                match e.retry_class() {
                    RetryClass::Never => {
                        info!("Provider '{}' rejected requests: {}", provider_id, e);
                    }
                    RetryClass::Transient => {
                        warn!("Provider '{}' unavailable: {}", provider_id, e);
                    }
                    RetryClass::Aborted => {
                        debug!("Fetch from '{}' cancelled", provider_id);
                    }
                }
                Err(e)
            }
        }
    }
}

fn requested(requests: &[ConcreteRequest], observation: &Observation) -> bool {
    requests.iter().any(|r| {
        r.symbol == *observation.symbol()
            && r.tick_type == observation.tick_type()
            && r.covers(observation.end_time())
    })
}
