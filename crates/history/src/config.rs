//! Configuration for planning and as-of resolution.
//!
//! Every struct has a `Default` and deserializes with missing fields filled
//! from that default, so a partial JSON document is enough.

use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::HistoryError;
use crate::models::Resolution;

/// Default lookback for the first as-of window.
const DEFAULT_INITIAL_LOOKBACK_DAYS: u32 = 1;

/// Default hard cap for as-of searches (about five years).
const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 1826;

/// Request planner defaults applied when a query leaves a setting unspecified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Resolution used when a query does not name one.
    pub default_resolution: Resolution,
    /// Whether pre/post-market data is included by default.
    pub extended_market_hours: bool,
    /// Whether bars are filled forward by default.
    pub fill_forward: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_resolution: Resolution::Minute,
            extended_market_hours: false,
            fill_forward: true,
        }
    }
}

/// Last-known-value resolver configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastKnownConfig {
    /// Bar resolution used for the backward search. Must not be tick.
    pub resolution: Resolution,
    /// Calendar days covered by the first window, ending at the as-of
    /// instant. When the market is closed at that instant the window also
    /// reaches back past the previous close, so it always holds the last
    /// trading session.
    pub initial_lookback_days: u32,
    /// Windows stop doubling once they reach this span.
    pub max_lookback_days: u32,
    /// Whole-search timeout; `None` waits for the provider indefinitely.
    pub timeout_ms: Option<u64>,
}

impl LastKnownConfig {
    pub fn initial_lookback(&self) -> Duration {
        Duration::days(i64::from(self.initial_lookback_days.max(1)))
    }

    pub fn max_lookback(&self) -> Duration {
        Duration::days(i64::from(
            self.max_lookback_days.max(self.initial_lookback_days).max(1),
        ))
    }

    pub fn timeout(&self) -> Option<StdDuration> {
        self.timeout_ms.map(StdDuration::from_millis)
    }
}

impl Default for LastKnownConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::Minute,
            initial_lookback_days: DEFAULT_INITIAL_LOOKBACK_DAYS,
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
            timeout_ms: None,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub planner: PlannerConfig,
    pub last_known: LastKnownConfig,
}

impl HistoryConfig {
    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, HistoryError> {
        Ok(serde_json::from_str(json)?)
    }
}
