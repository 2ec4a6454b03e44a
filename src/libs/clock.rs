//! Clock and timezone normalization.
//!
//! Every component receives "now" through the [`Clock`] port and the user's
//! zone through the [`Timezone`] port, so tests can pin both. Wall-clock
//! projections are always truncated to whole seconds before they are stored.

use crate::libs::error::{LedgerError, LedgerResult};
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Used by tests and by replay tooling that needs deterministic timestamps.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { current: Mutex::new(start) }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock() = instant;
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut current = self.current.lock();
        *current += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock()
    }
}

/// Resolves the user's configured IANA zone.
pub trait Timezone {
    fn zone(&self) -> Tz;
}

impl Timezone for Tz {
    fn zone(&self) -> Tz {
        *self
    }
}

/// Parses an IANA zone name such as `Europe/Berlin`.
pub fn parse_zone(name: &str) -> LedgerResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| LedgerError::InvalidInput(format!("unknown time zone '{}'", name)))
}

/// Drops sub-second precision from an instant.
pub fn truncate(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(0)
}

/// Wall-clock projection of `instant` in `tz`, truncated to whole seconds.
pub fn to_local(instant: DateTime<Utc>, tz: &impl Timezone) -> NaiveDateTime {
    instant.with_timezone(&tz.zone()).naive_local().trunc_subsecs(0)
}

/// Local calendar date of `instant` in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: &impl Timezone) -> NaiveDate {
    instant.with_timezone(&tz.zone()).date_naive()
}

/// Resolves a local wall-clock time back to an instant.
///
/// Ambiguous times (clocks turned back) resolve to the earlier instant.
/// Times skipped by a DST jump do not exist and are rejected.
pub fn from_local(local: NaiveDateTime, tz: &impl Timezone) -> LedgerResult<DateTime<Utc>> {
    match tz.zone().from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(LedgerError::InvalidInput(format!(
            "{} does not exist in time zone {}",
            local,
            tz.zone().name()
        ))),
    }
}
