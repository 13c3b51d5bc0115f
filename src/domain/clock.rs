//! Calendar source
//!
//! Expiry math is done in whole local days, so the only thing the engine
//! needs from a clock is "today".

use chrono::{Days, Local, NaiveDate};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// Date `days` after today. Negative offsets clamp to today.
    fn days_from_today(&self, days: i64) -> NaiveDate {
        let today = self.today();
        today
            .checked_add_days(Days::new(days.max(0) as u64))
            .unwrap_or(today)
    }
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Pinned date, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Signed number of days from `today` until `date`.
pub fn days_until(today: NaiveDate, date: NaiveDate) -> i64 {
    (date - today).num_days()
}
