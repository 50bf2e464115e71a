//! Dashboard and report projections

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::loan::LoanDetails;

/// Headline counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Sum of copies across the catalog
    pub total_books: u64,
    pub available_copies: u64,
    pub active_loans: usize,
    pub overdue_loans: usize,
    pub total_members: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEntry {
    pub category: String,
    pub loans: usize,
}

/// Loans issued and returned in one calendar month (`YYYY-MM`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEntry {
    pub month: String,
    pub loans: usize,
    pub returns: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub dashboard: Dashboard,
    /// Fines settled on returned loans
    pub fines_collected: Decimal,
    /// Fines accrued so far on open overdue loans
    pub fines_outstanding: Decimal,
    pub loans_by_category: Vec<CategoryEntry>,
    pub loans_by_month: Vec<MonthlyEntry>,
}

/// A member's circulation at a glance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLoans {
    pub open: Vec<LoanDetails>,
    pub returned: Vec<LoanDetails>,
    pub fines_paid: Decimal,
    pub fines_due: Decimal,
}
