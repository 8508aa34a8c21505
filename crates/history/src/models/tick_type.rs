use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic kind of an observation.
///
/// Declaration order is the canonical emission order: Trade, Quote, OpenInterest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TickType {
    Trade,
    Quote,
    OpenInterest,
}

impl fmt::Display for TickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Explicit data kind a caller can ask for instead of the default multi-type slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataKind {
    TradeBar,
    QuoteBar,
    OpenInterest,
}

impl DataKind {
    pub fn tick_type(&self) -> TickType {
        match self {
            Self::TradeBar => TickType::Trade,
            Self::QuoteBar => TickType::Quote,
            Self::OpenInterest => TickType::OpenInterest,
        }
    }

    /// Bar-shaped kinds cannot be produced from a tick stream without aggregation.
    pub fn is_bar(&self) -> bool {
        matches!(self, Self::TradeBar | Self::QuoteBar)
    }

    pub fn for_tick_type(tick_type: TickType) -> Self {
        match tick_type {
            TickType::Trade => Self::TradeBar,
            TickType::Quote => Self::QuoteBar,
            TickType::OpenInterest => Self::OpenInterest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let mut types = vec![TickType::OpenInterest, TickType::Trade, TickType::Quote];
        types.sort();
        assert_eq!(
            types,
            vec![TickType::Trade, TickType::Quote, TickType::OpenInterest]
        );
    }

    #[test]
    fn test_data_kind_mapping() {
        for tick_type in [TickType::Trade, TickType::Quote, TickType::OpenInterest] {
            assert_eq!(DataKind::for_tick_type(tick_type).tick_type(), tick_type);
        }
        assert!(DataKind::TradeBar.is_bar());
        assert!(DataKind::QuoteBar.is_bar());
        assert!(!DataKind::OpenInterest.is_bar());
    }
}
