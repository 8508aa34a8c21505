use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Time granularity of historical data.
///
/// Variants are declared from finest to coarsest, so `Ord` compares granularity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resolution {
    Tick,
    Second,
    #[default]
    Minute,
    Hour,
    Daily,
}

impl Resolution {
    /// Length of one bar, or `None` for tick data which has no bar period.
    pub fn step(&self) -> Option<Duration> {
        match self {
            Self::Tick => None,
            Self::Second => Some(Duration::seconds(1)),
            Self::Minute => Some(Duration::minutes(1)),
            Self::Hour => Some(Duration::hours(1)),
            Self::Daily => Some(Duration::days(1)),
        }
    }

    pub fn is_tick(&self) -> bool {
        matches!(self, Self::Tick)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tick => "Tick",
            Self::Second => "Second",
            Self::Minute => "Minute",
            Self::Hour => "Hour",
            Self::Daily => "Daily",
        };
        f.write_str(name)
    }
}
