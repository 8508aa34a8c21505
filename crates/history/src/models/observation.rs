use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tick_type::TickType;
use super::types::Symbol;

/// Open/high/low/close of one side of a quote bar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Bar {
    pub fn new(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }
}

/// Aggregated trade activity over `[time, end_time)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeBar {
    pub symbol: Symbol,
    pub time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,

    /// Repeated from an earlier bar to fill a gap, not recorded activity.
    #[serde(default)]
    pub is_fill_forward: bool,
}

/// Aggregated bid/ask activity over `[time, end_time)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteBar {
    pub symbol: Symbol,
    pub time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<Bar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<Bar>,
    pub last_bid_size: Decimal,
    pub last_ask_size: Decimal,
    #[serde(default)]
    pub is_fill_forward: bool,
}

impl QuoteBar {
    /// Mid close when both sides exist, otherwise the close of the side present.
    pub fn close(&self) -> Option<Decimal> {
        match (&self.bid, &self.ask) {
            (Some(bid), Some(ask)) => Some((bid.close + ask.close) / Decimal::TWO),
            (Some(bid), None) => Some(bid.close),
            (None, Some(ask)) => Some(ask.close),
            (None, None) => None,
        }
    }
}

/// A single trade or quote print.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: Symbol,
    pub time: DateTime<Utc>,
    pub tick_type: TickType,
    /// Trade price, or mid price for quote ticks.
    pub value: Decimal,
    pub quantity: Decimal,
    pub bid_price: Decimal,
    pub ask_price: Decimal,
    pub bid_size: Decimal,
    pub ask_size: Decimal,
}

/// Open interest reported at `time`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInterest {
    pub symbol: Symbol,
    pub time: DateTime<Utc>,
    pub value: Decimal,
}

/// A time-stamped value for one symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Observation {
    TradeBar(TradeBar),
    QuoteBar(QuoteBar),
    Tick(Tick),
    OpenInterest(OpenInterest),
}

impl Observation {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Self::TradeBar(bar) => &bar.symbol,
            Self::QuoteBar(bar) => &bar.symbol,
            Self::Tick(tick) => &tick.symbol,
            Self::OpenInterest(oi) => &oi.symbol,
        }
    }

    /// Instant at which the observation became known. Ticks and open interest
    /// are point-in-time, so their end time is their time.
    pub fn end_time(&self) -> DateTime<Utc> {
        match self {
            Self::TradeBar(bar) => bar.end_time,
            Self::QuoteBar(bar) => bar.end_time,
            Self::Tick(tick) => tick.time,
            Self::OpenInterest(oi) => oi.time,
        }
    }

    pub fn tick_type(&self) -> TickType {
        match self {
            Self::TradeBar(_) => TickType::Trade,
            Self::QuoteBar(_) => TickType::Quote,
            Self::Tick(tick) => tick.tick_type,
            Self::OpenInterest(_) => TickType::OpenInterest,
        }
    }

    /// The representative value: close, mid close, tick value or open interest.
    pub fn price(&self) -> Option<Decimal> {
        match self {
            Self::TradeBar(bar) => Some(bar.close),
            Self::QuoteBar(bar) => bar.close(),
            Self::Tick(tick) => Some(tick.value),
            Self::OpenInterest(oi) => Some(oi.value),
        }
    }

    pub fn is_fill_forward(&self) -> bool {
        match self {
            Self::TradeBar(bar) => bar.is_fill_forward,
            Self::QuoteBar(bar) => bar.is_fill_forward,
            Self::Tick(_) | Self::OpenInterest(_) => false,
        }
    }
}
