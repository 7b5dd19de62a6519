//! Injected time source
//!
//! Analytics never read the wall clock directly; "today" and the current hour
//! come from a [`Clock`] handed to the engine.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

/// The moment the engine evaluates against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Now {
    pub date: NaiveDate,
    /// Hour of day, 0-23
    pub hour: u32,
}

impl Now {
    /// Hours past 23 are clamped to 23, so `Now::new(d, 30)` evaluates as the
    /// last hour of `d`. Use [`Now::from_datetime`] when the hour comes from a
    /// real timestamp.
    pub fn new(date: NaiveDate, hour: u32) -> Self {
        Self { date, hour: hour.min(23) }
    }

    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self {
            date: dt.date(),
            hour: dt.hour(),
        }
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Now;
}

/// Server-local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Now {
        Now::from_datetime(Local::now().naive_local())
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Now);

impl Clock for FixedClock {
    fn now(&self) -> Now {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_is_clamped_to_last_hour_of_day() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(Now::new(day, 30), Now::new(day, 23));
        assert_eq!(Now::new(day, 30).date, day);
        assert_eq!(Now::new(day, 7).hour, 7);
    }

    #[test]
    fn test_fixed_clock_and_from_datetime() {
        let dt = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap().and_hms_opt(18, 45, 0).unwrap();
        let now = Now::from_datetime(dt);
        assert_eq!(now.hour, 18);
        assert_eq!(FixedClock(now).now(), now);
    }
}
