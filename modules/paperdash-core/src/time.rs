//! Pure date/time conversion: proleptic-Gregorian day counting, ISO-8601
//! parse-to-local, and six-week calendar grid generation.
//!
//! Nothing in this module reads the ambient clock. The render pass samples
//! wall-clock time exactly once at the top level and threads it through as a
//! parameter, so a pass can never observe two different "now" values.

use std::sync::LazyLock;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use regex::Regex;
use tracing::trace;

use crate::error::{PaperdashError, Result};

/// Day offset of a civil date from 1970-01-01, proleptic Gregorian.
///
/// Howard Hinnant's era decomposition: the year is shifted back one when the
/// month is January or February so every leap day lands at the end of a
/// 400-year era, which makes the day-of-year expressible as the linear
/// `(153m' + 2) / 5` ramp with no per-month table.
pub fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = year as i64 - (month <= 2) as i64;
    let m = month as i64;
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400; // [0, 399]
    let doy = (153 * (m + if m > 2 { -3 } else { 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`]: day offset back to (year, month, day).
pub fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + (month <= 2) as i64;
    (year as i32, month, day)
}

/// Seconds since the Unix epoch for broken-down UTC fields.
///
/// Months outside 1..=12 roll the year over and out-of-range days/hours/
/// minutes/seconds extend linearly, matching the classic `timegm` contract.
/// This is the conversion the explicit-offset parse branch runs on; it never
/// consults the host timezone machinery.
pub fn utc_from_fields(year: i32, month: i64, day: i64, hour: i64, minute: i64, second: i64) -> i64 {
    let (year, month) = normalize_month(year, month);
    let days = days_from_civil(year, month, 1) + (day - 1);
    86_400 * days + 3_600 * hour + 60 * minute + second
}

fn normalize_month(year: i32, month: i64) -> (i32, u32) {
    if month > 12 {
        (year + ((month - 1) / 12) as i32, ((month - 1) % 12 + 1) as u32)
    } else if month < 1 {
        let borrow = (12 - month) / 12;
        (year - borrow as i32, (month + 12 * borrow) as u32)
    } else {
        (year, month as u32)
    }
}

// Field scan for `YYYY-MM-DD[Thh:mm:ss[.fff]][Z|±hh:mm]`. Groups 4-6 only
// match as a unit, group 7 grabs whatever single character follows the
// seconds, and the offset digits 8-9 only count when both are present:
// the same progressive-match behavior the upstream producers were tested
// against.
static ISO_FIELDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)-(\d+)-(\d+)(?:T(\d+):(\d+):(\d+(?:\.\d+)?)(?:(.)(?:(\d+):(\d+))?)?)?")
        .expect("valid timestamp regex")
});

/// Parse an ISO-8601 timestamp into an absolute instant.
///
/// - Date-only input yields local midnight of that date (all-day sources).
/// - Date-time without an offset marker is wall-clock local time.
/// - `Z` or `±hh:mm` input converts through [`utc_from_fields`], with the
///   stated offset subtracted for `+` and added for `-` ("offset from UTC").
///   Any other trailing marker is tolerated: logged at trace level, offset
///   treated as zero.
///
/// Errors on input with fewer than three date fields; callers recover with
/// the Unix epoch, which downstream logic treats as "invalid".
pub fn parse_iso_to_local<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let unparsable = || PaperdashError::UnparsableTimestamp(input.to_string());
    let caps = ISO_FIELDS.captures(input.trim_start()).ok_or_else(unparsable)?;

    let year: i32 = caps[1].parse().map_err(|_| unparsable())?;
    let month: i64 = caps[2].parse().map_err(|_| unparsable())?;
    let day: i64 = caps[3].parse().map_err(|_| unparsable())?;

    let Some(hour_match) = caps.get(4) else {
        // Date-only: local midnight.
        let naive = naive_from_fields(year, month, day, 0, 0, 0).ok_or_else(unparsable)?;
        return Ok(resolve_local(tz, naive));
    };

    let hour: i64 = hour_match.as_str().parse().map_err(|_| unparsable())?;
    let minute: i64 = caps[5].parse().map_err(|_| unparsable())?;
    // Fractional seconds are accepted and truncated.
    let second: i64 = caps[6]
        .split('.')
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(unparsable)?;

    let Some(marker) = caps.get(7) else {
        // No offset marker: the fields are local wall-clock time.
        let naive =
            naive_from_fields(year, month, day, hour, minute, second).ok_or_else(unparsable)?;
        return Ok(resolve_local(tz, naive));
    };

    let explicit = match (caps.get(8), caps.get(9)) {
        (Some(oh), Some(om)) => {
            let hours: i64 = oh.as_str().parse().map_err(|_| unparsable())?;
            let minutes: i64 = om.as_str().parse().map_err(|_| unparsable())?;
            (hours * 60 + minutes) * 60
        }
        // A bare marker (or a truncated offset) contributes nothing.
        _ => 0,
    };
    let skew = match marker.as_str() {
        "+" => -explicit,
        "-" => explicit,
        "Z" => 0,
        other => {
            trace!(input, marker = other, "Unknown timezone marker, treating offset as zero");
            0
        }
    };

    let instant = utc_from_fields(year, month, day, hour, minute, second) + skew;
    DateTime::from_timestamp(instant, 0).ok_or_else(unparsable)
}

// Normalized broken-down fields as a naive datetime, via the day-count
// routine so out-of-range components roll over instead of failing.
fn naive_from_fields(
    year: i32,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(utc_from_fields(year, month, day, hour, minute, second), 0)
        .map(|dt| dt.naive_utc())
}

/// Map a local wall-clock time onto an absolute instant.
///
/// DST folds take the earlier of the two candidate instants. Wall-clock times
/// a DST transition skipped entirely probe forward hour by hour so a
/// nonexistent local midnight still yields exactly one day boundary.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(first, _) => first.with_timezone(&Utc),
        LocalResult::None => {
            for hours in 1..=3 {
                match tz.from_local_datetime(&(naive + Duration::hours(hours))) {
                    LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                        return dt.with_timezone(&Utc);
                    }
                    LocalResult::None => {}
                }
            }
            naive.and_utc()
        }
    }
}

/// The 43 midnight boundaries of a six-week month view.
///
/// Day `i` spans `[bounds[i], bounds[i+1])`. The first day is the most recent
/// week-start on or before the 1st of the month containing `now`.
#[derive(Debug, Clone)]
pub struct CalendarGrid {
    bounds: Vec<DateTime<Utc>>,
}

impl CalendarGrid {
    /// Number of day cells in the view (6 weeks of 7 days).
    pub const DAYS: usize = 42;

    pub fn bounds(&self) -> &[DateTime<Utc>] {
        &self.bounds
    }

    /// Half-open span of day cell `index` (0..42).
    pub fn day_span(&self, index: usize) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.bounds[index], self.bounds[index + 1])
    }

    /// Index of the day cell containing `instant`, if any. Only cells that
    /// still have a full successor span qualify, so the caller can always
    /// read a "tomorrow" boundary too.
    pub fn day_index_of(&self, instant: DateTime<Utc>) -> Option<usize> {
        (0..self.bounds.len().saturating_sub(2))
            .find(|&i| self.bounds[i] <= instant && instant < self.bounds[i + 1])
    }
}

/// Build the six-week grid around `now`.
///
/// The arithmetic walks back from today's day-of-year to the week-start
/// preceding the 1st of the month; the resulting start offset may be zero or
/// negative (or run past the end of the year at the far edge), and plain date
/// arithmetic from January 1st rolls it into the right month, with no month
/// length tables involved.
pub fn calendar_grid<Tz: TimeZone>(now: &DateTime<Tz>, first_weekday: Weekday) -> CalendarGrid {
    let tz = now.timezone();
    let weekday = (now.weekday().num_days_from_monday() as i64
        - first_weekday.num_days_from_monday() as i64)
        .rem_euclid(7);
    let day_of_month = now.day() as i64;
    let month_start_weekday = (weekday - (day_of_month - 1)).rem_euclid(7);
    // 1-based day-of-year of the grid's first cell.
    let start = now.ordinal() as i64 - (day_of_month - 1) - month_start_weekday;

    let january_first =
        NaiveDate::from_ymd_opt(now.year(), 1, 1).expect("January 1st is a valid date");
    let mut bounds = Vec::with_capacity(CalendarGrid::DAYS + 1);
    for i in 0..=CalendarGrid::DAYS as i64 {
        let date = january_first + Duration::days(start + i - 1);
        bounds.push(resolve_local(&tz, date.and_time(NaiveTime::MIN)));
    }
    CalendarGrid { bounds }
}
