//! Exchange trading hours.
//!
//! [`ExchangeHours`] describes a weekly schedule of market segments in the
//! exchange's own time zone, plus holidays and early closes. All queries take
//! and return UTC instants; the schedule is evaluated on the local wall clock.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::time_utils::{local_to_utc, utc_to_local};

/// How far back `previous_close` scans before giving up.
const MAX_SCAN_DAYS: u64 = 366;

const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Trading state of a market segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SegmentState {
    PreMarket,
    Market,
    PostMarket,
}

/// A contiguous trading segment within one local day.
///
/// An `end` of 00:00 means the segment runs to midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSegment {
    pub state: SegmentState,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl MarketSegment {
    pub fn new(state: SegmentState, start: NaiveTime, end: NaiveTime) -> Self {
        Self { state, start, end }
    }

    fn is_included(&self, extended_hours: bool) -> bool {
        extended_hours || self.state == SegmentState::Market
    }
}

/// Weekly trading schedule of an exchange.
#[derive(Clone, Debug)]
pub struct ExchangeHours {
    time_zone: Tz,
    sessions: HashMap<Weekday, Vec<MarketSegment>>,
    holidays: HashSet<NaiveDate>,
    early_closes: HashMap<NaiveDate, NaiveTime>,
}

impl ExchangeHours {
    /// An exchange that is never open until sessions are added.
    pub fn new(time_zone: Tz) -> Self {
        Self {
            time_zone,
            sessions: HashMap::new(),
            holidays: HashSet::new(),
            early_closes: HashMap::new(),
        }
    }

    /// US equities: 04:00-09:30 pre-market, 09:30-16:00 regular,
    /// 16:00-20:00 post-market, Monday to Friday, New York time.
    pub fn us_equity() -> Self {
        let segments = vec![
            MarketSegment::new(SegmentState::PreMarket, hm(4, 0), hm(9, 30)),
            MarketSegment::new(SegmentState::Market, hm(9, 30), hm(16, 0)),
            MarketSegment::new(SegmentState::PostMarket, hm(16, 0), hm(20, 0)),
        ];
        WEEKDAYS.iter().fold(
            Self::new(chrono_tz::America::New_York),
            |hours, day| hours.with_session(*day, segments.clone()),
        )
    }

    /// US listed options: regular session only.
    pub fn us_equity_options() -> Self {
        let segments = vec![MarketSegment::new(
            SegmentState::Market,
            hm(9, 30),
            hm(16, 0),
        )];
        WEEKDAYS.iter().fold(
            Self::new(chrono_tz::America::New_York),
            |hours, day| hours.with_session(*day, segments.clone()),
        )
    }

    /// Open around the clock, every day (crypto venues, custom data).
    pub fn always_open(time_zone: Tz) -> Self {
        let segments = vec![MarketSegment::new(
            SegmentState::Market,
            NaiveTime::MIN,
            NaiveTime::MIN,
        )];
        ALL_DAYS.iter().fold(Self::new(time_zone), |hours, day| {
            hours.with_session(*day, segments.clone())
        })
    }

    pub fn with_session(mut self, weekday: Weekday, segments: Vec<MarketSegment>) -> Self {
        self.sessions.insert(weekday, segments);
        self
    }

    pub fn with_holiday(mut self, date: NaiveDate) -> Self {
        self.holidays.insert(date);
        self
    }

    /// Trading stops at `close` (local time) on `date`, whatever the segments say.
    pub fn with_early_close(mut self, date: NaiveDate, close: NaiveTime) -> Self {
        self.early_closes.insert(date, close);
        self
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Merged open intervals for a local date, in ascending order.
    fn open_intervals(
        &self,
        date: NaiveDate,
        extended_hours: bool,
    ) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        if self.holidays.contains(&date) {
            return Vec::new();
        }
        let Some(segments) = self.sessions.get(&date.weekday()) else {
            return Vec::new();
        };

        let cutoff = self.early_closes.get(&date).map(|t| date.and_time(*t));
        let mut intervals: Vec<(NaiveDateTime, NaiveDateTime)> = segments
            .iter()
            .filter(|s| s.is_included(extended_hours))
            .filter_map(|s| {
                let start = date.and_time(s.start);
                let mut end = if s.end == NaiveTime::MIN {
                    date.checked_add_days(Days::new(1))?.and_time(NaiveTime::MIN)
                } else {
                    date.and_time(s.end)
                };
                if let Some(cutoff) = cutoff {
                    end = end.min(cutoff);
                }
                (start < end).then_some((start, end))
            })
            .collect();

        intervals.sort();
        let mut merged: Vec<(NaiveDateTime, NaiveDateTime)> = Vec::with_capacity(intervals.len());
        for (start, end) in intervals {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        merged
    }

    /// Whether the exchange is trading at `instant`.
    pub fn is_open(&self, instant: DateTime<Utc>, extended_hours: bool) -> bool {
        let local = utc_to_local(self.time_zone, instant);
        self.open_intervals(local.date(), extended_hours)
            .iter()
            .any(|(start, end)| *start <= local && local < *end)
    }

    /// Whether the exchange trades at any point within `[start, end)`.
    pub fn is_open_during(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        extended_hours: bool,
    ) -> bool {
        if end <= start {
            return false;
        }
        let local_start = utc_to_local(self.time_zone, start);
        let local_end = utc_to_local(self.time_zone, end);

        let mut date = local_start.date();
        while date <= local_end.date() {
            let overlaps = self
                .open_intervals(date, extended_hours)
                .iter()
                .any(|(open, close)| *open < local_end && local_start < *close);
            if overlaps {
                return true;
            }
            match date.checked_add_days(Days::new(1)) {
                Some(next) => date = next,
                None => break,
            }
        }
        false
    }

    /// The end of the most recent trading interval at or before `before`.
    ///
    /// Returns `before` itself when the exchange is open at that instant, and
    /// `None` when no trading is found within the scan horizon.
    pub fn previous_close(
        &self,
        before: DateTime<Utc>,
        extended_hours: bool,
    ) -> Option<DateTime<Utc>> {
        let local = utc_to_local(self.time_zone, before);
        for offset in 0..=MAX_SCAN_DAYS {
            let date = local.date().checked_sub_days(Days::new(offset))?;
            let intervals = self.open_intervals(date, extended_hours);
            for (start, end) in intervals.iter().rev() {
                if *start > local {
                    continue;
                }
                if *end > local {
                    return Some(before);
                }
                return Some(local_to_utc(self.time_zone, *end));
            }
        }
        None
    }
}
