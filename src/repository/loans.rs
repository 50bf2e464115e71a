//! Loans repository: the circulation writes and the availability they carry

use chrono::NaiveDate;

use super::{Collection, Ledger};
use crate::{
    error::{AppError, AppResult},
    models::{BookId, Loan, LoanId, LoanStatus, MemberId},
    policy::{FinePolicy, LoanPolicy},
};

#[derive(Clone)]
pub struct LoansRepository {
    ledger: Ledger,
}

impl LoansRepository {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// All loans in issue order
    pub async fn list(&self) -> Vec<Loan> {
        self.ledger
            .read(|state| state.loans.values().cloned().collect())
            .await
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: LoanId) -> AppResult<Loan> {
        self.ledger
            .read(|state| state.loans.get(&id).cloned())
            .await
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Create a loan and take one copy off the shelf, as one write
    pub async fn create(
        &self,
        book_id: BookId,
        member_id: MemberId,
        today: NaiveDate,
        policy: &LoanPolicy,
    ) -> AppResult<Loan> {
        let due_date = policy.due_date_from(today);
        let require_active_member = policy.require_active_member;

        self.ledger
            .commit(&[Collection::Loans, Collection::Books], move |state| {
                let book = state
                    .books
                    .get(&book_id)
                    .ok_or_else(|| AppError::BookUnavailable(format!("Book {} does not exist", book_id)))?;
                let checked_out = book.checked_out().ok_or_else(|| {
                    AppError::BookUnavailable(format!("No copies of \"{}\" left", book.title))
                })?;

                if require_active_member {
                    let member = state.members.get(&member_id).ok_or_else(|| {
                        AppError::NotFound(format!("Member with id {} not found", member_id))
                    })?;
                    if !member.is_active() {
                        return Err(AppError::MemberSuspended(format!(
                            "Member {} is suspended",
                            member.name
                        )));
                    }
                }

                let loan = Loan::open(book_id, member_id, today, due_date);
                if state.loans.contains_key(&loan.id) {
                    return Err(AppError::Internal(format!("Loan id {} already in use", loan.id)));
                }

                state.books.insert(book_id, checked_out);
                state.loans.insert(loan.id, loan.clone());
                Ok(loan)
            })
            .await
    }

    /// Close a loan, settle its fine and put the copy back on the shelf.
    ///
    /// Returns `None` without writing anything when the loan is unknown or
    /// already returned.
    pub async fn return_loan(
        &self,
        loan_id: LoanId,
        today: NaiveDate,
        fines: &FinePolicy,
    ) -> AppResult<Option<Loan>> {
        self.ledger
            .commit_if(&[Collection::Loans, Collection::Books], move |state| {
                let Some(loan) = state.loans.get(&loan_id) else {
                    return Ok(None);
                };
                if !loan.is_open() {
                    return Ok(None);
                }

                let returned = loan.returned(today, fines);
                match state.books.get(&returned.book_id) {
                    Some(book) => {
                        if book.available >= book.quantity {
                            tracing::warn!(
                                "Book {} already has every copy on the shelf; availability left at {}",
                                book.id,
                                book.available
                            );
                        }
                        let checked_in = book.checked_in();
                        state.books.insert(checked_in.id, checked_in);
                    }
                    None => tracing::warn!(
                        "Loan {} refers to removed book {}; no availability to restore",
                        loan_id,
                        returned.book_id
                    ),
                }

                state.loans.insert(loan_id, returned.clone());
                Ok(Some(returned))
            })
            .await
    }

    /// Push the due date of an open, on-time loan one loan period past `today`
    pub async fn renew(
        &self,
        loan_id: LoanId,
        today: NaiveDate,
        policy: &LoanPolicy,
    ) -> AppResult<Loan> {
        let due_date = policy.due_date_from(today);
        let max_renewals = policy.max_renewals;

        self.ledger
            .commit(&[Collection::Loans], move |state| {
                let loan = state
                    .loans
                    .get(&loan_id)
                    .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

                if !loan.is_open() {
                    return Err(AppError::BusinessRule("Cannot renew a returned loan".to_string()));
                }
                if loan.is_overdue(today) {
                    return Err(AppError::BusinessRule(
                        "Cannot renew an overdue loan; return it first".to_string(),
                    ));
                }
                if loan.renewals >= max_renewals {
                    return Err(AppError::BusinessRule(format!(
                        "Maximum renewals reached ({}/{})",
                        loan.renewals, max_renewals
                    )));
                }

                let renewed = loan.renewed(due_date.max(loan.due_date));
                state.loans.insert(loan_id, renewed.clone());
                Ok(renewed)
            })
            .await
    }

    /// Label every late ACTIVE loan as OVERDUE; returns how many changed
    pub async fn mark_overdue(&self, today: NaiveDate) -> AppResult<usize> {
        let marked = self
            .ledger
            .commit_if(&[Collection::Loans], move |state| {
                let mut marked = 0;
                for loan in state.loans.values_mut() {
                    if loan.status == LoanStatus::Active && today > loan.due_date {
                        loan.status = LoanStatus::Overdue;
                        marked += 1;
                    }
                }
                Ok((marked > 0).then_some(marked))
            })
            .await?;

        Ok(marked.unwrap_or(0))
    }
}
