//! Read-only projections: loan views, dashboard and reports.
//!
//! Everything here is recomputed from a fresh copy of the ledger on each call.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    clock::Clock,
    error::AppResult,
    models::{
        stats::{CategoryEntry, MonthlyEntry},
        BookId, Dashboard, Loan, LoanDetails, MemberId, MemberLoans, Report,
    },
    policy::LoanPolicy,
    repository::{LibraryState, Repository},
};

/// Default size of the recent activity feed
pub const RECENT_ACTIVITY: usize = 5;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    policy: LoanPolicy,
    clock: Arc<dyn Clock>,
}

impl StatsService {
    pub fn new(repository: Repository, policy: LoanPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            policy,
            clock,
        }
    }

    fn details(&self, state: &LibraryState, loan: &Loan, today: NaiveDate) -> LoanDetails {
        LoanDetails::new(
            loan,
            state.books.get(&loan.book_id),
            state.members.get(&loan.member_id),
            today,
            &self.policy.fines,
        )
    }

    fn details_where(&self, state: &LibraryState, keep: impl Fn(&Loan) -> bool) -> Vec<LoanDetails> {
        let today = self.clock.today();
        state
            .loans
            .values()
            .filter(|l| keep(l))
            .map(|l| self.details(state, l, today))
            .collect()
    }

    /// Open loans in issue order
    pub async fn active_loans(&self) -> Vec<LoanDetails> {
        let state = self.repository.snapshot().await;
        self.details_where(&state, Loan::is_open)
    }

    /// Returned loans, most recent return first
    pub async fn history(&self) -> Vec<LoanDetails> {
        let state = self.repository.snapshot().await;
        let mut history = self.details_where(&state, |l| !l.is_open());
        history.sort_by(|a, b| b.return_date.cmp(&a.return_date));
        history
    }

    /// Open loans that are past due as of today
    pub async fn overdue_loans(&self) -> Vec<LoanDetails> {
        let state = self.repository.snapshot().await;
        let today = self.clock.today();
        self.details_where(&state, |l| l.is_overdue(today))
    }

    /// The last `limit` loans issued, newest first
    pub async fn recent_activity(&self, limit: usize) -> Vec<LoanDetails> {
        let state = self.repository.snapshot().await;
        let today = self.clock.today();
        state
            .loans
            .values()
            .rev()
            .take(limit)
            .map(|l| self.details(&state, l, today))
            .collect()
    }

    /// Loans of one member, split into open and returned
    pub async fn member_loans(&self, member_id: MemberId) -> AppResult<MemberLoans> {
        // Unknown members are an error here, unlike dangling loan references
        self.repository.members.get_by_id(member_id).await?;

        let state = self.repository.snapshot().await;
        let loans = self.details_where(&state, |l| l.member_id == member_id);
        let (open, returned): (Vec<_>, Vec<_>) =
            loans.into_iter().partition(|d| d.return_date.is_none());

        Ok(MemberLoans {
            fines_paid: returned.iter().map(|d| d.accrued_fine).sum(),
            fines_due: open.iter().map(|d| d.accrued_fine).sum(),
            open,
            returned,
        })
    }

    /// Every loan of one book, open and returned
    pub async fn book_loans(&self, book_id: BookId) -> AppResult<Vec<LoanDetails>> {
        self.repository.books.get_by_id(book_id).await?;

        let state = self.repository.snapshot().await;
        Ok(self.details_where(&state, |l| l.book_id == book_id))
    }

    fn dashboard_of(state: &LibraryState, today: NaiveDate) -> Dashboard {
        Dashboard {
            total_books: state.books.values().map(|b| u64::from(b.quantity)).sum(),
            available_copies: state.books.values().map(|b| u64::from(b.available)).sum(),
            active_loans: state.loans.values().filter(|l| l.is_open()).count(),
            overdue_loans: state.loans.values().filter(|l| l.is_overdue(today)).count(),
            total_members: state.members.len(),
        }
    }

    pub async fn dashboard(&self) -> Dashboard {
        let today = self.clock.today();
        self.repository
            .ledger
            .read(|state| Self::dashboard_of(state, today))
            .await
    }

    /// Fines, loans per category and loans per month
    pub async fn report(&self) -> Report {
        let state = self.repository.snapshot().await;
        let today = self.clock.today();
        let fines = &self.policy.fines;

        let mut fines_collected = Decimal::ZERO;
        let mut fines_outstanding = Decimal::ZERO;
        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_month: BTreeMap<String, (usize, usize)> = BTreeMap::new();

        for loan in state.loans.values() {
            if loan.is_open() {
                fines_outstanding += loan.accrued_fine(today, fines);
            } else {
                fines_collected += loan.fine;
            }

            let category = state
                .books
                .get(&loan.book_id)
                .map(|b| b.category.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            *by_category.entry(category).or_default() += 1;

            by_month
                .entry(loan.loan_date.format("%Y-%m").to_string())
                .or_default()
                .0 += 1;
            if let Some(returned) = loan.return_date {
                by_month
                    .entry(returned.format("%Y-%m").to_string())
                    .or_default()
                    .1 += 1;
            }
        }

        let mut loans_by_category: Vec<CategoryEntry> = by_category
            .into_iter()
            .map(|(category, loans)| CategoryEntry { category, loans })
            .collect();
        loans_by_category.sort_by(|a, b| b.loans.cmp(&a.loans).then(a.category.cmp(&b.category)));

        Report {
            dashboard: Self::dashboard_of(&state, today),
            fines_collected,
            fines_outstanding,
            loans_by_category,
            loans_by_month: by_month
                .into_iter()
                .map(|(month, (loans, returns))| MonthlyEntry {
                    month,
                    loans,
                    returns,
                })
                .collect(),
        }
    }
}
