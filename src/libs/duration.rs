//! Elapsed-hours arithmetic for time entries.
//!
//! Hours are decimal values carried at four places. All rounding goes through
//! [`round_hours`], which rounds half away from zero.

use chrono::{DateTime, Utc};

const SECONDS_PER_HOUR: f64 = 3600.0;
const HOURS_SCALE: f64 = 10_000.0;

/// Rounds a decimal hour value to four places, half away from zero.
pub fn round_hours(hours: f64) -> f64 {
    (hours * HOURS_SCALE).round() / HOURS_SCALE
}

/// Converts hours to an integer count of ten-thousandths.
///
/// Sums over these units are exact, which keeps report totals consistent
/// with each other regardless of summation order.
pub fn hours_to_units(hours: f64) -> i64 {
    (hours * HOURS_SCALE).round() as i64
}

pub fn units_to_hours(units: i64) -> f64 {
    units as f64 / HOURS_SCALE
}

/// Hours between two instants, rounded to four places. Negative spans clamp to zero.
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let seconds = (to - from).num_seconds();
    round_hours(seconds as f64 / SECONDS_PER_HOUR).max(0.0)
}

/// Timing fields the calculator needs from an entry.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub paused: bool,
    pub paused_at: Option<DateTime<Utc>>,
    pub paused_hours: f64,
}

/// Computes the pause-free hours of an entry.
///
/// A paused entry is frozen at its pause instant. An unfinished, unpaused
/// entry runs up to `now`. Clock skew never produces a negative result.
pub fn duration(timing: &Timing, now: DateTime<Utc>) -> f64 {
    let effective_end = if timing.paused {
        timing.paused_at.unwrap_or(now)
    } else {
        timing.end.unwrap_or(now)
    };

    let seconds = (effective_end - timing.start).num_seconds();
    let hours = round_hours(seconds as f64 / SECONDS_PER_HOUR - timing.paused_hours);

    hours.max(0.0)
}

/// Length of the pause interval that is open at `at`, in hours.
pub fn open_pause_hours(paused_at: Option<DateTime<Utc>>, at: DateTime<Utc>) -> f64 {
    paused_at.map_or(0.0, |paused_at| hours_between(paused_at, at))
}
