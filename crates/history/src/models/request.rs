use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::resolution::Resolution;
use super::security::SecurityType;
use super::tick_type::{DataKind, TickType};
use super::types::Symbol;

/// How historical prices are adjusted for corporate actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataNormalizationMode {
    Raw,
    Adjusted,
    SplitAdjusted,
    TotalReturn,
}

/// The time extent of a history query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryWindow {
    /// Explicit instants, both inclusive.
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// The last `n` trading bars before "now".
    BarCount(u32),
    /// The last span of trading time before "now".
    Span(Duration),
}

impl HistoryWindow {
    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Range { .. })
    }
}

/// A caller's historical data request, before planning.
///
/// Built once through the constructors and `with_*` methods, then handed to
/// the planner by reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    symbols: Vec<Symbol>,
    window: HistoryWindow,
    resolution: Option<Resolution>,
    data_kind: Option<DataKind>,
    fill_forward: Option<bool>,
    extended_market_hours: Option<bool>,
    normalization: Option<DataNormalizationMode>,
}

impl Query {
    fn with_window(symbols: impl IntoIterator<Item = Symbol>, window: HistoryWindow) -> Self {
        Self {
            symbols: symbols.into_iter().collect(),
            window,
            resolution: None,
            data_kind: None,
            fill_forward: None,
            extended_market_hours: None,
            normalization: None,
        }
    }

    /// Data between two instants.
    pub fn range(
        symbols: impl IntoIterator<Item = Symbol>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self::with_window(symbols, HistoryWindow::Range { start, end })
    }

    /// The last `count` trading bars at `resolution`.
    pub fn bars(
        symbols: impl IntoIterator<Item = Symbol>,
        count: u32,
        resolution: Resolution,
    ) -> Self {
        Self::with_window(symbols, HistoryWindow::BarCount(count)).with_resolution(resolution)
    }

    /// The last `span` of trading time at `resolution`.
    pub fn span(
        symbols: impl IntoIterator<Item = Symbol>,
        span: Duration,
        resolution: Resolution,
    ) -> Self {
        Self::with_window(symbols, HistoryWindow::Span(span)).with_resolution(resolution)
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Restrict the result to a single data kind.
    pub fn with_data_kind(mut self, data_kind: DataKind) -> Self {
        self.data_kind = Some(data_kind);
        self
    }

    pub fn with_fill_forward(mut self, fill_forward: bool) -> Self {
        self.fill_forward = Some(fill_forward);
        self
    }

    pub fn with_extended_market_hours(mut self, extended: bool) -> Self {
        self.extended_market_hours = Some(extended);
        self
    }

    pub fn with_normalization(mut self, mode: DataNormalizationMode) -> Self {
        self.normalization = Some(mode);
        self
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn window(&self) -> &HistoryWindow {
        &self.window
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn data_kind(&self) -> Option<DataKind> {
        self.data_kind
    }

    pub fn fill_forward(&self) -> Option<bool> {
        self.fill_forward
    }

    pub fn extended_market_hours(&self) -> Option<bool> {
        self.extended_market_hours
    }

    pub fn normalization(&self) -> Option<DataNormalizationMode> {
        self.normalization
    }
}

/// One fully-resolved subscription unit handed to a
/// [`HistoryProvider`](crate::provider::HistoryProvider).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcreteRequest {
    pub symbol: Symbol,
    pub security_type: SecurityType,
    pub resolution: Resolution,
    pub tick_type: TickType,

    /// Inclusive start, in the data time zone.
    pub start: DateTime<Tz>,

    /// Inclusive end, in the data time zone.
    pub end: DateTime<Tz>,

    pub exchange_time_zone: Tz,

    /// `None` means raw data without fill-forward.
    pub fill_forward_resolution: Option<Resolution>,

    pub normalization: DataNormalizationMode,
    pub extended_market_hours: bool,
    pub is_custom_data: bool,
}

impl ConcreteRequest {
    pub fn data_time_zone(&self) -> Tz {
        self.start.timezone()
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    /// Whether an observation ending at `end_time` falls inside this request's window.
    pub fn covers(&self, end_time: DateTime<Utc>) -> bool {
        self.start_utc() <= end_time && end_time <= self.end_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bars_sets_resolution() {
        let query = Query::bars([Symbol::new("SPY")], 10, Resolution::Minute);
        assert_eq!(query.resolution(), Some(Resolution::Minute));
        assert_eq!(query.window(), &HistoryWindow::BarCount(10));
        assert!(!query.window().is_explicit());
    }

    #[test]
    fn test_builder_keeps_symbol_order() {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let query = Query::range(["SPY".into(), "AAPL".into(), "IBM".into()], start, end)
            .with_data_kind(DataKind::TradeBar)
            .with_fill_forward(false);

        let names: Vec<_> = query.symbols().iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["SPY", "AAPL", "IBM"]);
        assert_eq!(query.data_kind(), Some(DataKind::TradeBar));
        assert_eq!(query.fill_forward(), Some(false));
        assert!(query.window().is_explicit());
    }

    #[test]
    fn test_request_covers_is_inclusive() {
        let tz = chrono_tz::America::New_York;
        let start = tz.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
        let end = tz.with_ymd_and_hms(2024, 1, 2, 16, 0, 0).unwrap();
        let request = ConcreteRequest {
            symbol: "SPY".into(),
            security_type: SecurityType::Equity,
            resolution: Resolution::Minute,
            tick_type: TickType::Trade,
            start,
            end,
            exchange_time_zone: tz,
            fill_forward_resolution: Some(Resolution::Minute),
            normalization: DataNormalizationMode::Adjusted,
            extended_market_hours: false,
            is_custom_data: false,
        };

        assert_eq!(request.data_time_zone(), tz);
        assert!(request.covers(start.with_timezone(&Utc)));
        assert!(request.covers(end.with_timezone(&Utc)));
        assert!(!request.covers(end.with_timezone(&Utc) + Duration::seconds(1)));
    }
}
