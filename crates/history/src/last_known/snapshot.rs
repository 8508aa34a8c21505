//! As-of result types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Observation, Symbol, TickType};

/// Which tick types an as-of search should resolve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WantedTypes {
    /// One price: the security's primary price type, falling back to the
    /// other of trade/quote.
    #[default]
    Primary,
    /// Every tick type the catalog lists, open interest included.
    All,
    /// A single named tick type.
    Only(TickType),
}

/// Outcome for one tick type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "observation", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LastKnown {
    Found(Observation),
    /// Nothing recorded between the lookback bound and the as-of instant.
    NotFound,
}

impl LastKnown {
    pub fn observation(&self) -> Option<&Observation> {
        match self {
            Self::Found(observation) => Some(observation),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Most recent observations for a symbol at an instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsOfSnapshot {
    pub symbol: Symbol,
    pub as_of: DateTime<Utc>,
    /// One entry per resolved tick type, in canonical order.
    pub values: Vec<(TickType, LastKnown)>,
}

impl AsOfSnapshot {
    pub fn get(&self, tick_type: TickType) -> Option<&LastKnown> {
        self.values
            .iter()
            .find(|(t, _)| *t == tick_type)
            .map(|(_, value)| value)
    }

    /// Found observations in entry order.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.values.iter().filter_map(|(_, value)| value.observation())
    }

    /// Representative price of the first found observation.
    pub fn price(&self) -> Option<Decimal> {
        self.observations().find_map(Observation::price)
    }

    /// True when no entry was found.
    pub fn is_not_found(&self) -> bool {
        self.values.iter().all(|(_, value)| !value.is_found())
    }
}
