//! Backward walk over trading time for bar-count and duration windows.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::errors::HistoryError;
use crate::models::Symbol;
use crate::resolver::MarketHoursCalendar;
use crate::time_utils::{ceil_local, floor_local, local_to_utc, utc_to_local};

/// Number of bars of `step` needed to cover `span` of trading time (at least one).
pub(crate) fn bars_for_span(span: Duration, step: Duration) -> u32 {
    let span_ms = span.num_milliseconds().max(1);
    let step_ms = step.num_milliseconds().max(1);
    let bars = (span_ms + step_ms - 1) / step_ms;
    u32::try_from(bars).unwrap_or(u32::MAX)
}

/// Start instant such that `[start, now]` holds `count` complete trading bars.
///
/// Bars are aligned to `step` on the exchange's wall clock (daily bars start
/// at local midnight). The in-progress bar containing `now` is not counted.
/// Closed stretches (nights, weekends, holidays) are skipped in one jump
/// using the calendar's previous close.
pub(crate) fn start_for_bars(
    calendar: &dyn MarketHoursCalendar,
    symbol: &Symbol,
    exchange_tz: Tz,
    step: Duration,
    count: u32,
    extended_hours: bool,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, HistoryError> {
    let mut current = floor_local(utc_to_local(exchange_tz, now), step);
    let mut found = 0u32;

    while found < count {
        let previous = current - step;
        let bar_start = local_to_utc(exchange_tz, previous);
        let bar_end = local_to_utc(exchange_tz, current);

        if calendar.is_open_during(symbol, bar_start, bar_end, extended_hours) {
            found += 1;
            current = previous;
            continue;
        }

        let close = calendar
            .previous_close(symbol, bar_start, extended_hours)
            .ok_or_else(|| HistoryError::NoTradingHours(symbol.clone()))?;
        let resume = ceil_local(utc_to_local(exchange_tz, close), step);
        current = if resume < current { resume } else { previous };
    }

    Ok(local_to_utc(exchange_tz, current))
}
