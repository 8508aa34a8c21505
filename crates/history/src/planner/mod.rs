//! Request planning.
//!
//! Expands a [`Query`] into concrete, per-tick-type requests:
//!
//! ```text
//! Query ──▶ QueryValidator ──▶ SecurityLookup ──▶ Catalog ──▶ window ──▶ defaults
//!                                                                         │
//!                                                    Vec<ConcreteRequest> ◀┘
//! ```
//!
//! Planning is pure computation over injected metadata. It performs no I/O
//! and keeps no state between calls, so planning the same query twice with
//! the same `now` yields identical requests.

mod validator;
mod window;

pub use validator::QueryValidator;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::catalog::Catalog;
use crate::config::PlannerConfig;
use crate::errors::{HistoryError, InvalidRequestKind};
use crate::models::{
    ConcreteRequest, DataKind, DataNormalizationMode, HistoryWindow, Query, Resolution,
    SecurityMetadata, Symbol, TickType,
};
use crate::resolver::{MarketHoursCalendar, SecurityLookup};

/// Turns queries into concrete requests.
pub struct RequestPlanner {
    lookup: Arc<dyn SecurityLookup>,
    calendar: Arc<dyn MarketHoursCalendar>,
    catalog: Catalog,
    config: PlannerConfig,
    validator: QueryValidator,
}

impl RequestPlanner {
    /// Create a planner with the default catalog and configuration.
    pub fn new(lookup: Arc<dyn SecurityLookup>, calendar: Arc<dyn MarketHoursCalendar>) -> Self {
        Self::with_config(lookup, calendar, Catalog::new(), PlannerConfig::default())
    }

    /// Create a planner with a custom catalog and configuration.
    pub fn with_config(
        lookup: Arc<dyn SecurityLookup>,
        calendar: Arc<dyn MarketHoursCalendar>,
        catalog: Catalog,
        config: PlannerConfig,
    ) -> Self {
        let validator = QueryValidator::new(config.default_resolution);
        Self {
            lookup,
            calendar,
            catalog,
            config,
            validator,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn calendar(&self) -> &dyn MarketHoursCalendar {
        self.calendar.as_ref()
    }

    /// Metadata for a symbol from the injected lookup.
    pub fn security(&self, symbol: &Symbol) -> Result<SecurityMetadata, HistoryError> {
        self.lookup.lookup(symbol)
    }

    /// Run the consistency validator without planning.
    pub fn validate(&self, query: &Query) -> Result<(), HistoryError> {
        self.validator.validate(query)
    }

    /// Plan a query.
    ///
    /// `now` is the current algorithm time: bar-count and duration windows end
    /// at it, and explicit windows are clamped to it.
    ///
    /// Requests are ordered by symbol as supplied, then Trade, Quote,
    /// OpenInterest.
    pub fn plan(
        &self,
        query: &Query,
        now: DateTime<Utc>,
    ) -> Result<Vec<ConcreteRequest>, HistoryError> {
        self.validator.validate(query)?;

        let resolution = query.resolution().unwrap_or(self.config.default_resolution);
        let extended = query
            .extended_market_hours()
            .unwrap_or(self.config.extended_market_hours);
        let fill_forward_resolution = self.fill_forward_resolution(query, resolution);

        let mut requests = Vec::new();
        for symbol in query.symbols() {
            let metadata = self.lookup.lookup(symbol)?;
            let tick_types = self.tick_types(symbol, &metadata, query.data_kind())?;
            if tick_types.is_empty() {
                warn!(
                    "No default tick types for '{}' ({}), nothing to plan",
                    symbol, metadata.security_type
                );
                continue;
            }

            let (start, end) =
                self.window_bounds(symbol, &metadata, query.window(), resolution, extended, now)?;
            let normalization = self.normalization(symbol, &metadata, query.normalization());
            let data_tz = metadata.data_time_zone;

            for tick_type in tick_types {
                requests.push(ConcreteRequest {
                    symbol: symbol.clone(),
                    security_type: metadata.security_type,
                    resolution,
                    tick_type,
                    start: start.with_timezone(&data_tz),
                    end: end.with_timezone(&data_tz),
                    exchange_time_zone: metadata.exchange_time_zone,
                    fill_forward_resolution,
                    normalization,
                    extended_market_hours: extended,
                    is_custom_data: metadata.is_custom_data(),
                });
            }
        }

        debug!(
            "Planned {} requests for {} symbols at {} resolution",
            requests.len(),
            query.symbols().len(),
            resolution
        );
        Ok(requests)
    }

    /// Fill-forward never applies to ticks and always matches the data resolution.
    fn fill_forward_resolution(&self, query: &Query, resolution: Resolution) -> Option<Resolution> {
        let enabled = query.fill_forward().unwrap_or(self.config.fill_forward);
        if enabled {
            self.catalog.fill_forward_default(resolution)
        } else {
            None
        }
    }

    fn tick_types(
        &self,
        symbol: &Symbol,
        metadata: &SecurityMetadata,
        data_kind: Option<DataKind>,
    ) -> Result<Vec<TickType>, HistoryError> {
        match data_kind {
            Some(kind) => {
                let tick_type = kind.tick_type();
                if !self.catalog.supports(metadata.security_type, tick_type) {
                    return Err(HistoryError::UnsupportedTickType {
                        symbol: symbol.clone(),
                        security_type: metadata.security_type,
                        tick_type,
                    });
                }
                Ok(vec![tick_type])
            }
            None => Ok(self.catalog.default_tick_types(metadata.security_type)),
        }
    }

    fn window_bounds(
        &self,
        symbol: &Symbol,
        metadata: &SecurityMetadata,
        window: &HistoryWindow,
        resolution: Resolution,
        extended: bool,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), HistoryError> {
        let (step, count) = match (window, resolution.step()) {
            (HistoryWindow::Range { start, end }, _) => {
                let clamped_end = (*end).min(now);
                if clamped_end < *end {
                    debug!(
                        "Clamped end of window for '{}' from {} to {}",
                        symbol, end, clamped_end
                    );
                }
                return Ok(((*start).min(clamped_end), clamped_end));
            }
            (_, None) => {
                return Err(HistoryError::invalid(
                    InvalidRequestKind::TickResolutionRequiresExplicitWindow,
                    "tick data must be requested with explicit start and end times",
                ));
            }
            (HistoryWindow::BarCount(count), Some(step)) => (step, *count),
            (HistoryWindow::Span(span), Some(step)) => (step, window::bars_for_span(*span, step)),
        };

        let start = window::start_for_bars(
            self.calendar.as_ref(),
            symbol,
            metadata.exchange_time_zone,
            step,
            count,
            extended,
            now,
        )?;
        Ok((start, now))
    }

    fn normalization(
        &self,
        symbol: &Symbol,
        metadata: &SecurityMetadata,
        requested: Option<DataNormalizationMode>,
    ) -> DataNormalizationMode {
        let adjustable = self.catalog.supports_adjustment(metadata.security_type);
        match requested {
            None if adjustable => DataNormalizationMode::Adjusted,
            None | Some(DataNormalizationMode::Raw) => DataNormalizationMode::Raw,
            Some(mode) if adjustable => mode,
            Some(mode) => {
                warn!(
                    "{:?} normalization does not apply to '{}' ({}), using Raw",
                    mode, symbol, metadata.security_type
                );
                DataNormalizationMode::Raw
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::Tz;

    use crate::calendar::ExchangeHours;
    use crate::models::SecurityType;
    use crate::resolver::SecurityDatabase;

    const NY: Tz = chrono_tz::America::New_York;

    fn ny(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        NY.with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn planner_with(config: PlannerConfig) -> RequestPlanner {
        let equity_hours = Arc::new(ExchangeHours::us_equity());
        let option_hours = Arc::new(ExchangeHours::us_equity_options());
        let db = Arc::new(
            SecurityDatabase::new()
                .with_security(
                    "SPY",
                    SecurityMetadata::new(SecurityType::Equity, NY),
                    equity_hours.clone(),
                )
                .with_security(
                    "AAPL",
                    SecurityMetadata::new(SecurityType::Equity, NY),
                    equity_hours,
                )
                .with_security(
                    "SPY_C470",
                    SecurityMetadata::new(SecurityType::Option, NY),
                    option_hours,
                )
                .with_security(
                    "EURUSD",
                    SecurityMetadata::new(SecurityType::Forex, chrono_tz::UTC),
                    Arc::new(ExchangeHours::always_open(chrono_tz::UTC)),
                )
                .with_security(
                    "BTCUSD",
                    SecurityMetadata::new(SecurityType::Crypto, chrono_tz::UTC),
                    Arc::new(ExchangeHours::always_open(chrono_tz::UTC)),
                ),
        );
        RequestPlanner::with_config(db.clone(), db, Catalog::new(), config)
    }

    fn planner() -> RequestPlanner {
        planner_with(PlannerConfig::default())
    }

    fn now() -> DateTime<Utc> {
        ny(2024, 1, 10, 12, 0)
    }

    #[test]
    fn test_generic_equity_query_yields_trade_and_quote() {
        let query = Query::bars(["SPY".into()], 10, Resolution::Minute);
        let requests = planner().plan(&query, now()).unwrap();

        let types: Vec<_> = requests.iter().map(|r| r.tick_type).collect();
        assert_eq!(types, vec![TickType::Trade, TickType::Quote]);
        for request in &requests {
            assert_eq!(request.fill_forward_resolution, Some(Resolution::Minute));
            assert_eq!(request.normalization, DataNormalizationMode::Adjusted);
            assert!(!request.extended_market_hours);
            assert!(!request.is_custom_data);
            assert_eq!(request.end_utc(), now());
            assert_eq!(request.start_utc(), ny(2024, 1, 10, 11, 50));
        }
    }

    #[test]
    fn test_symbol_order_preserved() {
        let query = Query::bars(["SPY".into(), "AAPL".into()], 1, Resolution::Daily);
        let requests = planner().plan(&query, now()).unwrap();
        let pairs: Vec<_> = requests
            .iter()
            .map(|r| (r.symbol.as_str().to_string(), r.tick_type))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("SPY".to_string(), TickType::Trade),
                ("SPY".to_string(), TickType::Quote),
                ("AAPL".to_string(), TickType::Trade),
                ("AAPL".to_string(), TickType::Quote),
            ]
        );
    }

    #[test]
    fn test_generic_option_query_excludes_open_interest() {
        let query = Query::range(["SPY_C470".into()], ny(2024, 1, 2, 0, 0), ny(2024, 1, 9, 0, 0))
            .with_resolution(Resolution::Minute);
        let requests = planner().plan(&query, now()).unwrap();
        assert!(requests
            .iter()
            .all(|r| r.tick_type != TickType::OpenInterest));
        assert_eq!(requests.len(), 2);
    }

    #[test]
    fn test_explicit_open_interest_query() {
        let query = Query::range(["SPY_C470".into()], ny(2024, 1, 2, 0, 0), ny(2024, 1, 9, 0, 0))
            .with_resolution(Resolution::Daily)
            .with_data_kind(DataKind::OpenInterest);
        let requests = planner().plan(&query, now()).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tick_type, TickType::OpenInterest);
        assert_eq!(requests[0].normalization, DataNormalizationMode::Raw);
    }

    #[test]
    fn test_unsupported_tick_type() {
        let query = Query::bars(["SPY".into()], 5, Resolution::Daily)
            .with_data_kind(DataKind::OpenInterest);
        match planner().plan(&query, now()) {
            Err(HistoryError::UnsupportedTickType {
                security_type,
                tick_type,
                ..
            }) => {
                assert_eq!(security_type, SecurityType::Equity);
                assert_eq!(tick_type, TickType::OpenInterest);
            }
            other => panic!("Expected UnsupportedTickType, got {:?}", other),
        }
    }

    #[test]
    fn test_forex_defaults_to_quote_only() {
        let query = Query::bars(["EURUSD".into()], 5, Resolution::Hour);
        let requests = planner().plan(&query, now()).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tick_type, TickType::Quote);
        assert_eq!(requests[0].normalization, DataNormalizationMode::Raw);
        assert_eq!(requests[0].start_utc(), now() - Duration::hours(5));
    }

    #[test]
    fn test_tick_resolution_never_fills_forward() {
        let query = Query::range(["SPY".into()], ny(2024, 1, 9, 9, 30), ny(2024, 1, 9, 10, 0))
            .with_resolution(Resolution::Tick)
            .with_fill_forward(true);
        let requests = planner().plan(&query, now()).unwrap();
        assert!(!requests.is_empty());
        assert!(requests.iter().all(|r| r.fill_forward_resolution.is_none()));
    }

    #[test]
    fn test_fill_forward_disabled() {
        let query =
            Query::bars(["SPY".into()], 5, Resolution::Minute).with_fill_forward(false);
        let requests = planner().plan(&query, now()).unwrap();
        assert!(requests.iter().all(|r| r.fill_forward_resolution.is_none()));
    }

    #[test]
    fn test_tick_window_forms() {
        let planner = planner();
        let bars = Query::bars(["SPY".into()], 5, Resolution::Tick);
        assert_eq!(
            planner.plan(&bars, now()).unwrap_err().invalid_kind(),
            Some(InvalidRequestKind::TickResolutionRequiresExplicitWindow)
        );

        let range = Query::range(["SPY".into()], now() - Duration::minutes(5), now())
            .with_resolution(Resolution::Tick);
        assert!(planner.plan(&range, now()).is_ok());
    }

    #[test]
    fn test_default_resolution_from_config() {
        let planner = planner_with(PlannerConfig {
            default_resolution: Resolution::Hour,
            ..Default::default()
        });
        let query = Query::range(["SPY".into()], ny(2024, 1, 9, 0, 0), ny(2024, 1, 10, 0, 0));
        let requests = planner.plan(&query, now()).unwrap();
        assert!(requests.iter().all(|r| r.resolution == Resolution::Hour));
        assert!(requests
            .iter()
            .all(|r| r.fill_forward_resolution == Some(Resolution::Hour)));
    }

    #[test]
    fn test_extended_hours_override() {
        let query = Query::bars(["SPY".into()], 5, Resolution::Minute)
            .with_extended_market_hours(true);
        let requests = planner().plan(&query, ny(2024, 1, 10, 9, 32)).unwrap();
        assert!(requests.iter().all(|r| r.extended_market_hours));
        assert_eq!(requests[0].start_utc(), ny(2024, 1, 10, 9, 27));
    }

    #[test]
    fn test_explicit_normalization() {
        let planner = planner();
        let query = Query::bars(["SPY".into()], 5, Resolution::Daily)
            .with_normalization(DataNormalizationMode::SplitAdjusted);
        let requests = planner.plan(&query, now()).unwrap();
        assert!(requests
            .iter()
            .all(|r| r.normalization == DataNormalizationMode::SplitAdjusted));

        let query = Query::bars(["BTCUSD".into()], 5, Resolution::Daily)
            .with_normalization(DataNormalizationMode::Adjusted);
        let requests = planner.plan(&query, now()).unwrap();
        assert!(requests
            .iter()
            .all(|r| r.normalization == DataNormalizationMode::Raw));
    }

    #[test]
    fn test_window_clamped_to_now() {
        let query = Query::range(["SPY".into()], ny(2024, 1, 9, 0, 0), ny(2024, 1, 12, 0, 0));
        let requests = planner().plan(&query, now()).unwrap();
        assert_eq!(requests[0].end_utc(), now());
        assert_eq!(requests[0].start_utc(), ny(2024, 1, 9, 0, 0));

        let future = Query::range(["SPY".into()], ny(2024, 1, 11, 0, 0), ny(2024, 1, 12, 0, 0));
        let requests = planner().plan(&future, now()).unwrap();
        assert_eq!(requests[0].start_utc(), now());
        assert_eq!(requests[0].end_utc(), now());
    }

    #[test]
    fn test_times_in_data_time_zone() {
        let query = Query::bars(["SPY".into()], 1, Resolution::Minute);
        let requests = planner().plan(&query, now()).unwrap();
        assert_eq!(requests[0].data_time_zone(), NY);
        assert_eq!(requests[0].exchange_time_zone, NY);
        assert_eq!(requests[0].end.format("%H:%M").to_string(), "12:00");
    }

    #[test]
    fn test_span_window_counts_trading_time() {
        // Two hours of trading time from Wednesday 10:30 reaches into Tuesday
        let query = Query::span(["SPY".into()], Duration::hours(2), Resolution::Minute);
        let requests = planner().plan(&query, ny(2024, 1, 10, 10, 30)).unwrap();
        assert_eq!(requests[0].start_utc(), ny(2024, 1, 9, 15, 0));
    }

    #[test]
    fn test_lookback_window_without_bar_step() {
        let planner = planner();
        let symbol = Symbol::from("SPY");
        let metadata = planner.security(&symbol).unwrap();

        for window in [HistoryWindow::BarCount(5), HistoryWindow::Span(Duration::hours(1))] {
            let err = planner
                .window_bounds(&symbol, &metadata, &window, Resolution::Tick, false, now())
                .unwrap_err();
            assert_eq!(
                err.invalid_kind(),
                Some(InvalidRequestKind::TickResolutionRequiresExplicitWindow)
            );
        }

        let range = HistoryWindow::Range {
            start: now() - Duration::hours(1),
            end: now(),
        };
        let (start, end) = planner
            .window_bounds(&symbol, &metadata, &range, Resolution::Tick, false, now())
            .unwrap();
        assert_eq!((start, end), (now() - Duration::hours(1), now()));
    }

    #[test]
    fn test_unknown_symbol() {
        let query = Query::bars(["NOPE".into()], 5, Resolution::Daily);
        assert!(matches!(
            planner().plan(&query, now()),
            Err(HistoryError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_custom_data_flag() {
        let db = Arc::new(SecurityDatabase::new().with_security(
            "WEATHER",
            SecurityMetadata::new(SecurityType::Base, chrono_tz::UTC),
            Arc::new(ExchangeHours::always_open(chrono_tz::UTC)),
        ));
        let planner = RequestPlanner::new(db.clone(), db);
        let query = Query::bars(["WEATHER".into()], 3, Resolution::Daily);
        let requests = planner.plan(&query, now()).unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].is_custom_data);
        assert_eq!(requests[0].tick_type, TickType::Trade);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let planner = planner();
        let query = Query::bars(["SPY".into(), "SPY_C470".into()], 50, Resolution::Minute);
        let first = planner.plan(&query, now()).unwrap();
        let second = planner.plan(&query, now()).unwrap();
        assert_eq!(first, second);
    }
}
