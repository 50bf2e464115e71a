//! Loan management service

use std::sync::Arc;

use crate::{
    clock::Clock,
    error::AppResult,
    models::{BookId, CreateLoan, Loan, LoanId, MemberId},
    policy::LoanPolicy,
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    policy: LoanPolicy,
    clock: Arc<dyn Clock>,
}

impl LoansService {
    pub fn new(repository: Repository, policy: LoanPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    pub async fn list_loans(&self) -> Vec<Loan> {
        self.repository.loans.list().await
    }

    pub async fn get_loan(&self, id: LoanId) -> AppResult<Loan> {
        self.repository.loans.get_by_id(id).await
    }

    /// Issue a copy of `book_id` to `member_id`, due one loan period from today
    pub async fn issue_loan(&self, book_id: BookId, member_id: MemberId) -> AppResult<Loan> {
        let today = self.clock.today();
        let loan = self
            .repository
            .loans
            .create(book_id, member_id, today, &self.policy)
            .await?;
        tracing::info!(
            "Loan issued: id={} book={} member={} due={}",
            loan.id,
            loan.book_id,
            loan.member_id,
            loan.due_date
        );
        Ok(loan)
    }

    pub async fn create_loan(&self, request: CreateLoan) -> AppResult<Loan> {
        self.issue_loan(request.book_id, request.member_id).await
    }

    /// Return a loan. Returning an unknown or already returned loan is a
    /// no-op and yields `None`.
    pub async fn return_loan(&self, id: LoanId) -> AppResult<Option<Loan>> {
        let today = self.clock.today();
        let returned = self
            .repository
            .loans
            .return_loan(id, today, &self.policy.fines)
            .await?;

        match &returned {
            Some(loan) => tracing::info!(
                "Loan returned: id={} on {} fine={}",
                loan.id,
                today,
                loan.fine
            ),
            None => tracing::debug!("Return of loan {} ignored: unknown or already returned", id),
        }
        Ok(returned)
    }

    /// Renew an open, on-time loan
    pub async fn renew_loan(&self, id: LoanId) -> AppResult<Loan> {
        let loan = self
            .repository
            .loans
            .renew(id, self.clock.today(), &self.policy)
            .await?;
        tracing::info!(
            "Loan renewed: id={} due={} renewals={}",
            loan.id,
            loan.due_date,
            loan.renewals
        );
        Ok(loan)
    }

    /// Relabel late ACTIVE loans as OVERDUE. Fines and availability are untouched.
    pub async fn sweep_overdue(&self) -> AppResult<usize> {
        let marked = self
            .repository
            .loans
            .mark_overdue(self.clock.today())
            .await?;
        if marked > 0 {
            tracing::info!("Overdue sweep: {} loans marked OVERDUE", marked);
        }
        Ok(marked)
    }
}
