//! Query consistency validation.
//!
//! Rejects query shapes that cannot be planned:
//! - empty symbol sets
//! - tick resolution with a bar-count or duration window
//! - a bar-shaped data kind at tick resolution
//! - inverted or empty time windows

use chrono::Duration;
use log::debug;

use crate::errors::{HistoryError, InvalidRequestKind};
use crate::models::{HistoryWindow, Query, Resolution};

/// Query validator.
///
/// Pure and stateless apart from the resolution assumed for queries that do
/// not name one.
#[derive(Clone, Debug)]
pub struct QueryValidator {
    default_resolution: Resolution,
}

impl QueryValidator {
    pub fn new(default_resolution: Resolution) -> Self {
        Self { default_resolution }
    }

    /// Validate a query.
    ///
    /// Returns the first violated rule as
    /// [`HistoryError::InvalidRequest`] with its specific kind.
    pub fn validate(&self, query: &Query) -> Result<(), HistoryError> {
        let result = self.check(query);
        if let Err(e) = &result {
            debug!("Query rejected: {}", e);
        }
        result
    }

    fn check(&self, query: &Query) -> Result<(), HistoryError> {
        if query.symbols().is_empty() {
            return Err(HistoryError::invalid(
                InvalidRequestKind::EmptyQuery,
                "query names no symbols",
            ));
        }

        let resolution = query.resolution().unwrap_or(self.default_resolution);

        if resolution.is_tick() {
            if !query.window().is_explicit() {
                return Err(HistoryError::invalid(
                    InvalidRequestKind::TickResolutionRequiresExplicitWindow,
                    "tick data must be requested with explicit start and end times",
                ));
            }
            if let Some(kind) = query.data_kind().filter(|k| k.is_bar()) {
                return Err(HistoryError::invalid(
                    InvalidRequestKind::TickResolutionIncompatibleWithTypedBarApi,
                    format!("{:?} cannot be produced at tick resolution", kind),
                ));
            }
        }

        match query.window() {
            HistoryWindow::Range { start, end } if start > end => Err(HistoryError::invalid(
                InvalidRequestKind::InvalidTimeRange,
                format!("start {} is after end {}", start, end),
            )),
            HistoryWindow::BarCount(0) => Err(HistoryError::invalid(
                InvalidRequestKind::InvalidTimeRange,
                "bar count must be positive",
            )),
            HistoryWindow::Span(span) if *span <= Duration::zero() => Err(HistoryError::invalid(
                InvalidRequestKind::InvalidTimeRange,
                format!("span must be positive, got {}", span),
            )),
            _ => Ok(()),
        }
    }
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::new(Resolution::Minute)
    }
}
