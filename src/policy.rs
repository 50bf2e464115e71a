//! Circulation rules: loan period, renewals and overdue fines

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::config::CirculationConfig;

/// Linear per-day fine, optionally capped per loan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinePolicy {
    pub daily_rate: Decimal,
    pub max_fine: Option<Decimal>,
}

impl FinePolicy {
    pub fn new(daily_rate: Decimal) -> Self {
        Self {
            daily_rate,
            max_fine: None,
        }
    }

    pub fn with_cap(mut self, max_fine: Decimal) -> Self {
        self.max_fine = Some(max_fine);
        self
    }

    /// Whole calendar days past `due_date`, zero when `on` is on or before it
    pub fn overdue_days(due_date: NaiveDate, on: NaiveDate) -> i64 {
        (on - due_date).num_days().max(0)
    }

    /// Fine owed for a loan due on `due_date` and returned on `returned_on`
    pub fn fine_for(&self, due_date: NaiveDate, returned_on: NaiveDate) -> Decimal {
        let days = Self::overdue_days(due_date, returned_on);
        if days == 0 {
            return Decimal::ZERO;
        }

        let fine = self.daily_rate * Decimal::from(days);
        let fine = match self.max_fine {
            Some(cap) if fine > cap => cap,
            _ => fine,
        };
        fine.max(Decimal::ZERO)
    }
}

impl Default for FinePolicy {
    fn default() -> Self {
        Self::new(Decimal::new(50, 2))
    }
}

/// Rules applied by the circulation engine
#[derive(Debug, Clone)]
pub struct LoanPolicy {
    pub loan_period_days: u32,
    pub max_renewals: u32,
    pub require_active_member: bool,
    pub fines: FinePolicy,
}

impl LoanPolicy {
    /// `start` plus one loan period, saturating at the last representable date
    pub fn due_date_from(&self, start: NaiveDate) -> NaiveDate {
        start
            .checked_add_signed(Duration::days(i64::from(self.loan_period_days)))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl Default for LoanPolicy {
    fn default() -> Self {
        LoanPolicy::from(&CirculationConfig::default())
    }
}

impl From<&CirculationConfig> for LoanPolicy {
    fn from(config: &CirculationConfig) -> Self {
        Self {
            loan_period_days: config.loan_period_days,
            max_renewals: config.max_renewals,
            require_active_member: config.require_active_member,
            fines: FinePolicy {
                daily_rate: config.daily_fine,
                max_fine: config.max_fine,
            },
        }
    }
}
