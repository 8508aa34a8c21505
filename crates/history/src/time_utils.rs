use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

const SECONDS_PER_DAY: i64 = 86_400;

/// Wall-clock time of a UTC instant in the given time zone.
pub fn utc_to_local(tz: Tz, instant: DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// Converts an exchange wall-clock time back to a UTC instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times
/// inside a DST gap never existed on the wall clock and resolve to the first
/// instant after the gap.
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local)),
    }
}

/// Rounds a wall-clock time down to a multiple of `step` counted from local
/// midnight. Steps of a day or longer round to midnight.
pub fn floor_local(local: NaiveDateTime, step: Duration) -> NaiveDateTime {
    let midnight = local.date().and_time(NaiveTime::MIN);
    let step_secs = step.num_seconds();
    if step_secs <= 0 {
        return local;
    }
    if step_secs >= SECONDS_PER_DAY {
        return midnight;
    }
    let elapsed = (local - midnight).num_seconds();
    midnight + Duration::seconds(elapsed - elapsed % step_secs)
}

/// Rounds a wall-clock time up to a multiple of `step` counted from local midnight.
pub fn ceil_local(local: NaiveDateTime, step: Duration) -> NaiveDateTime {
    let floored = floor_local(local, step);
    if floored == local {
        local
    } else {
        floored + step
    }
}
