//! Observation sanity checks.
//!
//! Screens observations returned by a provider:
//! - fill-forward copies (optional, they mask gaps)
//! - non-positive prices
//! - OHLC invariants (high >= low)
//! - negative open interest or volume

use std::fmt;

use rust_decimal::Decimal;

use crate::models::{Bar, Observation};

/// Why an observation was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RejectReason {
    FillForward,
    MissingPrice,
    NonPositivePrice,
    HighBelowLow,
    NegativeQuantity,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FillForward => "fill-forward copy",
            Self::MissingPrice => "no price",
            Self::NonPositivePrice => "non-positive price",
            Self::HighBelowLow => "high below low",
            Self::NegativeQuantity => "negative volume or open interest",
        };
        f.write_str(text)
    }
}

/// Filter configuration.
#[derive(Clone, Debug)]
pub struct FilterConfig {
    /// Whether to reject bars repeated to fill a gap.
    pub reject_fill_forward: bool,
    /// Whether to reject zero or negative prices.
    pub reject_non_positive_prices: bool,
    /// Whether to reject bars where high < low.
    pub reject_invalid_ohlc: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            reject_fill_forward: false,
            reject_non_positive_prices: true,
            reject_invalid_ohlc: true,
        }
    }
}

/// Observation filter.
#[derive(Clone, Debug, Default)]
pub struct ObservationFilter {
    config: FilterConfig,
}

impl ObservationFilter {
    /// Filter with default configuration; fill-forward bars pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter for as-of searches: only recorded observations pass.
    pub fn recorded_only() -> Self {
        Self::with_config(FilterConfig {
            reject_fill_forward: true,
            ..Default::default()
        })
    }

    pub fn with_config(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Check one observation.
    pub fn check(&self, observation: &Observation) -> Result<(), RejectReason> {
        if self.config.reject_fill_forward && observation.is_fill_forward() {
            return Err(RejectReason::FillForward);
        }

        match observation {
            Observation::TradeBar(bar) => {
                if bar.volume < Decimal::ZERO {
                    return Err(RejectReason::NegativeQuantity);
                }
                self.check_ohlc(bar.open, bar.high, bar.low, bar.close)
            }
            Observation::QuoteBar(bar) => {
                if bar.bid.is_none() && bar.ask.is_none() {
                    return Err(RejectReason::MissingPrice);
                }
                for side in [&bar.bid, &bar.ask].into_iter().flatten() {
                    self.check_side(side)?;
                }
                Ok(())
            }
            Observation::Tick(tick) => self.check_price(tick.value),
            Observation::OpenInterest(oi) if oi.value < Decimal::ZERO => {
                Err(RejectReason::NegativeQuantity)
            }
            Observation::OpenInterest(_) => Ok(()),
        }
    }

    /// Split a batch into accepted observations and rejected ones with reasons.
    pub fn filter_batch(
        &self,
        observations: Vec<Observation>,
    ) -> (Vec<Observation>, Vec<(Observation, RejectReason)>) {
        let mut accepted = Vec::with_capacity(observations.len());
        let mut rejected = Vec::new();
        for observation in observations {
            match self.check(&observation) {
                Ok(()) => accepted.push(observation),
                Err(reason) => rejected.push((observation, reason)),
            }
        }
        (accepted, rejected)
    }

    fn check_side(&self, side: &Bar) -> Result<(), RejectReason> {
        self.check_ohlc(side.open, side.high, side.low, side.close)
    }

    fn check_ohlc(
        &self,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> Result<(), RejectReason> {
        if self.config.reject_invalid_ohlc && high < low {
            return Err(RejectReason::HighBelowLow);
        }
        for price in [open, high, low, close] {
            self.check_price(price)?;
        }
        Ok(())
    }

    fn check_price(&self, price: Decimal) -> Result<(), RejectReason> {
        if self.config.reject_non_positive_prices && price <= Decimal::ZERO {
            return Err(RejectReason::NonPositivePrice);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    use crate::models::{OpenInterest, QuoteBar, TradeBar};

    fn trade_bar(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> TradeBar {
        let time = Utc.with_ymd_and_hms(2024, 1, 5, 20, 59, 0).unwrap();
        TradeBar {
            symbol: "SPY".into(),
            time,
            end_time: time + Duration::minutes(1),
            open,
            high,
            low,
            close,
            volume: dec!(1000),
            is_fill_forward: false,
        }
    }

    fn quote_bar(bid: Option<Bar>, ask: Option<Bar>) -> Observation {
        let time = Utc.with_ymd_and_hms(2024, 1, 5, 20, 59, 0).unwrap();
        Observation::QuoteBar(QuoteBar {
            symbol: "SPY_C470".into(),
            time,
            end_time: time + Duration::minutes(1),
            bid,
            ask,
            last_bid_size: dec!(5),
            last_ask_size: dec!(5),
            is_fill_forward: false,
        })
    }

    #[test]
    fn test_valid_trade_bar() {
        let filter = ObservationFilter::new();
        let bar = trade_bar(dec!(100), dec!(105), dec!(95), dec!(102));
        assert_eq!(filter.check(&Observation::TradeBar(bar)), Ok(()));
    }

    #[test]
    fn test_high_below_low_rejected() {
        let filter = ObservationFilter::new();
        let bar = trade_bar(dec!(100), dec!(90), dec!(95), dec!(100));
        assert_eq!(
            filter.check(&Observation::TradeBar(bar)),
            Err(RejectReason::HighBelowLow)
        );
    }

    #[test]
    fn test_zero_price_rejected() {
        let filter = ObservationFilter::new();
        let bar = trade_bar(dec!(0), dec!(0), dec!(0), dec!(0));
        assert_eq!(
            filter.check(&Observation::TradeBar(bar)),
            Err(RejectReason::NonPositivePrice)
        );
    }

    #[test]
    fn test_fill_forward_only_rejected_when_configured() {
        let mut bar = trade_bar(dec!(100), dec!(105), dec!(95), dec!(102));
        bar.is_fill_forward = true;
        let observation = Observation::TradeBar(bar);

        assert_eq!(ObservationFilter::new().check(&observation), Ok(()));
        assert_eq!(
            ObservationFilter::recorded_only().check(&observation),
            Err(RejectReason::FillForward)
        );
    }

    #[test]
    fn test_quote_bar_sides() {
        let filter = ObservationFilter::new();
        let good = Bar::new(dec!(1.0), dec!(1.2), dec!(0.9), dec!(1.1));
        let bad = Bar::new(dec!(1.0), dec!(0.8), dec!(0.9), dec!(1.1));

        assert_eq!(filter.check(&quote_bar(Some(good.clone()), None)), Ok(()));
        assert_eq!(
            filter.check(&quote_bar(Some(good), Some(bad))),
            Err(RejectReason::HighBelowLow)
        );
        assert_eq!(
            filter.check(&quote_bar(None, None)),
            Err(RejectReason::MissingPrice)
        );
    }

    #[test]
    fn test_open_interest_zero_allowed() {
        let filter = ObservationFilter::new();
        let time = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let zero = Observation::OpenInterest(OpenInterest {
            symbol: "ES".into(),
            time,
            value: dec!(0),
        });
        let negative = Observation::OpenInterest(OpenInterest {
            symbol: "ES".into(),
            time,
            value: dec!(-1),
        });
        assert_eq!(filter.check(&zero), Ok(()));
        assert_eq!(filter.check(&negative), Err(RejectReason::NegativeQuantity));
    }

    #[test]
    fn test_custom_config_allows_non_positive() {
        let filter = ObservationFilter::with_config(FilterConfig {
            reject_non_positive_prices: false,
            ..Default::default()
        });
        let bar = trade_bar(dec!(-1), dec!(0), dec!(-2), dec!(-1));
        assert_eq!(filter.check(&Observation::TradeBar(bar)), Ok(()));
    }

    #[test]
    fn test_batch() {
        let filter = ObservationFilter::new();
        let batch = vec![
            Observation::TradeBar(trade_bar(dec!(100), dec!(105), dec!(95), dec!(102))),
            Observation::TradeBar(trade_bar(dec!(100), dec!(90), dec!(95), dec!(100))),
            Observation::TradeBar(trade_bar(dec!(200), dec!(205), dec!(195), dec!(202))),
        ];
        let (accepted, rejected) = filter.filter_batch(batch);
        assert_eq!(accepted.len(), 2);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].1, RejectReason::HighBelowLow);
    }
}
