//! Source of "today" for the circulation engine

use std::sync::atomic::{AtomicI32, Ordering};

use chrono::{Datelike, Duration, Local, NaiveDate};

/// Calendar date provider.
///
/// All circulation dates (loan, due, return) are whole calendar days, so the
/// clock only ever hands out a `NaiveDate`.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a date that can be moved by hand (demos, tests, replays)
#[derive(Debug)]
pub struct ManualClock {
    days_from_ce: AtomicI32,
}

impl ManualClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            days_from_ce: AtomicI32::new(date.num_days_from_ce()),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        self.days_from_ce
            .store(date.num_days_from_ce(), Ordering::SeqCst);
    }

    pub fn advance(&self, days: i64) {
        let next = self.today() + Duration::days(days);
        self.set(next);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        let days = self.days_from_ce.load(Ordering::SeqCst);
        // Only ever stored from a valid NaiveDate
        NaiveDate::from_num_days_from_ce_opt(days).unwrap_or(NaiveDate::MIN)
    }
}
