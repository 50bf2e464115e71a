//! Loan (circulation record) model and related types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::book::{Book, BookShort};
use super::id::{BookId, LoanId, MemberId};
use super::member::{Member, MemberShort};
use crate::policy::FinePolicy;

/// Loan lifecycle label.
///
/// `Overdue` is only a stored label (demo data, or the opt-in sweep); whether a
/// loan is actually late is always derived, see [`Loan::is_overdue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Active,
    Overdue,
    Returned,
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Overdue => "OVERDUE",
            LoanStatus::Returned => "RETURNED",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub fine: Decimal,
    #[serde(default)]
    pub renewals: u32,
}

impl Loan {
    /// Fresh loan as created by an issue
    pub(crate) fn open(
        book_id: BookId,
        member_id: MemberId,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: LoanId::new(),
            book_id,
            member_id,
            loan_date,
            due_date,
            return_date: None,
            status: LoanStatus::Active,
            fine: Decimal::ZERO,
            renewals: 0,
        }
    }

    /// Open loans still hold a copy of their book
    pub fn is_open(&self) -> bool {
        self.status != LoanStatus::Returned
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && (self.status == LoanStatus::Overdue || today > self.due_date)
    }

    /// Days late as of `today` for open loans, or as of the return date
    pub fn overdue_days(&self, today: NaiveDate) -> i64 {
        let end = self.return_date.unwrap_or(today);
        FinePolicy::overdue_days(self.due_date, end)
    }

    /// Fine owed if the loan were returned `today`; the settled fine once returned
    pub fn accrued_fine(&self, today: NaiveDate, fines: &FinePolicy) -> Decimal {
        if self.is_open() {
            fines.fine_for(self.due_date, today)
        } else {
            self.fine
        }
    }

    /// Copy of this loan closed on `today` with its fine settled
    pub(crate) fn returned(&self, today: NaiveDate, fines: &FinePolicy) -> Loan {
        Loan {
            status: LoanStatus::Returned,
            return_date: Some(today),
            fine: fines.fine_for(self.due_date, today),
            ..self.clone()
        }
    }

    /// Copy of this loan with a new due date
    pub(crate) fn renewed(&self, due_date: NaiveDate) -> Loan {
        Loan {
            due_date,
            status: LoanStatus::Active,
            renewals: self.renewals + 1,
            ..self.clone()
        }
    }
}

/// Issue request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoan {
    pub book_id: BookId,
    pub member_id: MemberId,
}

/// Loan joined with its book and member for display.
///
/// Joins are `None` when the referenced record no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    pub id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub renewals: u32,
    pub book: Option<BookShort>,
    pub member: Option<MemberShort>,
    pub is_overdue: bool,
    pub overdue_days: i64,
    pub accrued_fine: Decimal,
}

impl LoanDetails {
    pub fn new(
        loan: &Loan,
        book: Option<&Book>,
        member: Option<&Member>,
        today: NaiveDate,
        fines: &FinePolicy,
    ) -> Self {
        Self {
            id: loan.id,
            book_id: loan.book_id,
            member_id: loan.member_id,
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            return_date: loan.return_date,
            status: loan.status,
            renewals: loan.renewals,
            book: book.map(BookShort::from),
            member: member.map(MemberShort::from),
            is_overdue: loan.is_overdue(today),
            overdue_days: loan.overdue_days(today),
            accrued_fine: loan.accrued_fine(today, fines),
        }
    }

    pub fn book_title(&self) -> &str {
        self.book
            .as_ref()
            .map(|b| b.title.as_str())
            .unwrap_or("Unknown Book")
    }

    pub fn member_name(&self) -> &str {
        self.member
            .as_ref()
            .map(|m| m.name.as_str())
            .unwrap_or("Unknown Member")
    }
}
