//! Time source for ids, timestamps and day boundaries.

use chrono::{DateTime, Duration, Local, NaiveDate, SecondsFormat, Utc};
use std::sync::Mutex;

/// Supplies wall-clock time to the store.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    /// Calendar day used for rollover, completion dates and streaks.
    fn today(&self) -> NaiveDate;

    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// RFC 3339 timestamp with millisecond precision.
    fn now_rfc3339(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// System clock; days follow the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Hand-driven clock; days follow UTC.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Starts at midnight UTC of `day`.
    pub fn at_day(day: NaiveDate) -> Self {
        Self::new(day.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned lock still holds a valid timestamp.
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }

    fn today(&self) -> NaiveDate {
        self.lock().date_naive()
    }
}
