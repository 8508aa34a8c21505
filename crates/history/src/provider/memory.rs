//! In-memory history provider.

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;

use crate::errors::HistoryError;
use crate::models::{ConcreteRequest, Observation, Symbol};

use super::traits::HistoryProvider;

/// Serves observations held in memory.
///
/// Useful for replaying captured data and for tests. A request matches an
/// observation when symbol and tick type agree, the end time lies in the
/// request window, and the shape fits the resolution: tick requests get
/// ticks, bar requests get bars. Open interest matches either.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProvider {
    observations: HashMap<Symbol, Vec<Observation>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observation, keeping each symbol's series sorted by end time.
    pub fn insert(&mut self, observation: Observation) {
        let series = self
            .observations
            .entry(observation.symbol().clone())
            .or_default();
        let position = series.partition_point(|o| o.end_time() <= observation.end_time());
        series.insert(position, observation);
    }

    pub fn with_observations(mut self, observations: impl IntoIterator<Item = Observation>) -> Self {
        for observation in observations {
            self.insert(observation);
        }
        self
    }

    fn matches(request: &ConcreteRequest, observation: &Observation) -> bool {
        let shape_fits = match observation {
            Observation::Tick(_) => request.resolution.is_tick(),
            Observation::TradeBar(_) | Observation::QuoteBar(_) => !request.resolution.is_tick(),
            Observation::OpenInterest(_) => true,
        };
        shape_fits
            && observation.tick_type() == request.tick_type
            && request.covers(observation.end_time())
    }
}

#[async_trait]
impl HistoryProvider for InMemoryProvider {
    fn id(&self) -> &'static str {
        "IN_MEMORY"
    }

    async fn fetch(&self, requests: &[ConcreteRequest]) -> Result<Vec<Observation>, HistoryError> {
        let mut result = Vec::new();
        for request in requests {
            let Some(series) = self.observations.get(&request.symbol) else {
                continue;
            };
            result.extend(
                series
                    .iter()
                    .filter(|o| Self::matches(request, o))
                    .cloned(),
            );
        }
        // Per-symbol series are sorted; merge across requests by end time
        result.sort_by_key(|o| o.end_time());
        debug!(
            "In-memory provider served {} observations for {} requests",
            result.len(),
            requests.len()
        );
        Ok(result)
    }
}
