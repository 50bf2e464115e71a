//! Issue / return / renew lifecycle

use librasync::{
    models::{CreateLoan, LoanId, LoanStatus, MemberId, MemberStatus},
    AppConfig, AppError,
};
use rust_decimal::Decimal;

use crate::{date, Harness};

#[tokio::test]
async fn test_issue_until_no_copies_left() {
    let h = Harness::new(date(2023, 10, 1));
    let book = h.add_book("Clean Code", "Technology", 3).await;
    let member = h.add_member("John Doe").await;

    let loan = h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    assert_eq!(h.available(&book).await, 2);
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.loan_date, date(2023, 10, 1));
    assert_eq!(loan.due_date, date(2023, 10, 15));
    assert_eq!(loan.fine, Decimal::ZERO);

    h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    assert_eq!(h.available(&book).await, 0);

    let err = h
        .services
        .loans
        .issue_loan(book.id, member.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BookUnavailable(_)));
    assert_eq!(h.services.loans.list_loans().await.len(), 3);
    h.assert_consistent().await;
}

#[tokio::test]
async fn test_issue_unknown_book_is_unavailable() {
    let h = Harness::new(date(2023, 10, 1));
    let member = h.add_member("John Doe").await;

    let err = h
        .services
        .loans
        .issue_loan(librasync::models::BookId::new(), member.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BookUnavailable(_)));
    assert!(h.services.loans.list_loans().await.is_empty());
}

#[tokio::test]
async fn test_late_return_charges_fine() {
    let h = Harness::new(date(2023, 10, 1));
    let book = h.add_book("The Great Gatsby", "Fiction", 2).await;
    let member = h.add_member("Jane Smith").await;

    let loan = h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    assert_eq!(loan.due_date, date(2023, 10, 15));

    h.clock.set(date(2023, 10, 20));
    let returned = h.services.loans.return_loan(loan.id).await.unwrap().unwrap();

    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(returned.return_date, Some(date(2023, 10, 20)));
    assert_eq!(returned.fine, Decimal::new(250, 2));
    assert_eq!(h.available(&book).await, 2);
    h.assert_consistent().await;
}

#[tokio::test]
async fn test_return_on_due_date_is_free() {
    let h = Harness::new(date(2023, 10, 1));
    let book = h.add_book("1984", "Fiction", 1).await;
    let member = h.add_member("Jane Smith").await;

    let loan = h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    h.clock.set(loan.due_date);
    let returned = h.services.loans.return_loan(loan.id).await.unwrap().unwrap();

    assert_eq!(returned.fine, Decimal::ZERO);
    assert_eq!(returned.return_date, Some(date(2023, 10, 15)));
}

#[tokio::test]
async fn test_return_is_idempotent() {
    let h = Harness::new(date(2023, 10, 1));
    let book = h.add_book("Sapiens", "History", 2).await;
    let member = h.add_member("John Doe").await;
    let loan = h.services.loans.issue_loan(book.id, member.id).await.unwrap();

    h.clock.advance(20);
    assert!(h.services.loans.return_loan(loan.id).await.unwrap().is_some());
    let after_first = h.repository.snapshot().await;

    h.clock.advance(10);
    assert!(h.services.loans.return_loan(loan.id).await.unwrap().is_none());
    let after_second = h.repository.snapshot().await;

    assert_eq!(after_first, after_second);
    assert_eq!(h.available(&book).await, 2);
}

#[tokio::test]
async fn test_return_unknown_loan_is_noop() {
    let h = Harness::new(date(2023, 10, 1));
    h.add_book("Sapiens", "History", 2).await;
    let before = h.repository.snapshot().await;

    let result = h.services.loans.return_loan(LoanId::new()).await.unwrap();

    assert!(result.is_none());
    assert_eq!(before, h.repository.snapshot().await);
}

#[tokio::test]
async fn test_issue_then_return_conserves_availability() {
    let h = Harness::new(date(2024, 2, 1));
    let book = h.add_book("Introduction to Algorithms", "Education", 2).await;
    let member = h.add_member("John Doe").await;
    let before = h.available(&book).await;

    let loan = h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    h.services.loans.return_loan(loan.id).await.unwrap();

    assert_eq!(h.available(&book).await, before);
    h.assert_consistent().await;
}

#[tokio::test]
async fn test_suspended_member_cannot_borrow() {
    let h = Harness::new(date(2024, 2, 1));
    let book = h.add_book("1984", "Fiction", 3).await;
    let member = h.add_member("Bob Johnson").await;
    h.services
        .members
        .set_member_status(member.id, MemberStatus::Suspended)
        .await
        .unwrap();

    let err = h
        .services
        .loans
        .issue_loan(book.id, member.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MemberSuspended(_)));
    assert_eq!(h.available(&book).await, 3);

    let err = h
        .services
        .loans
        .issue_loan(book.id, MemberId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(h.services.loans.list_loans().await.is_empty());
}

#[tokio::test]
async fn test_member_check_can_be_disabled() {
    let mut config = AppConfig::default();
    config.circulation.require_active_member = false;
    let h = Harness::with_config(config, date(2024, 2, 1));
    let book = h.add_book("1984", "Fiction", 1).await;

    let loan = h
        .services
        .loans
        .issue_loan(book.id, MemberId::new())
        .await
        .unwrap();
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(h.available(&book).await, 0);
}

#[tokio::test]
async fn test_custom_fine_policy() {
    let mut config = AppConfig::default();
    config.circulation.loan_period_days = 7;
    config.circulation.daily_fine = Decimal::new(25, 2);
    config.circulation.max_fine = Some(Decimal::new(200, 2));
    let h = Harness::with_config(config, date(2024, 1, 1));
    let book = h.add_book("Clean Code", "Technology", 1).await;
    let member = h.add_member("Jane Smith").await;

    let loan = h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    assert_eq!(loan.due_date, date(2024, 1, 8));

    h.clock.set(date(2024, 3, 1));
    let returned = h.services.loans.return_loan(loan.id).await.unwrap().unwrap();
    assert_eq!(returned.fine, Decimal::new(200, 2));
}

#[tokio::test]
async fn test_renew_loan() {
    let h = Harness::new(date(2024, 1, 1));
    let book = h.add_book("Sapiens", "History", 1).await;
    let member = h.add_member("John Doe").await;
    let loan = h.services.loans.issue_loan(book.id, member.id).await.unwrap();

    h.clock.set(date(2024, 1, 10));
    let renewed = h.services.loans.renew_loan(loan.id).await.unwrap();
    assert_eq!(renewed.due_date, date(2024, 1, 24));
    assert_eq!(renewed.renewals, 1);

    h.services.loans.renew_loan(loan.id).await.unwrap();
    let err = h.services.loans.renew_loan(loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    // Renewals never touch availability
    assert_eq!(h.available(&book).await, 0);
}

#[tokio::test]
async fn test_cannot_renew_overdue_or_returned_loan() {
    let h = Harness::new(date(2024, 1, 1));
    let book = h.add_book("Sapiens", "History", 2).await;
    let member = h.add_member("John Doe").await;
    let late = h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    let done = h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    h.services.loans.return_loan(done.id).await.unwrap();

    h.clock.set(date(2024, 2, 1));
    assert!(matches!(
        h.services.loans.renew_loan(late.id).await.unwrap_err(),
        AppError::BusinessRule(_)
    ));
    assert!(matches!(
        h.services.loans.renew_loan(done.id).await.unwrap_err(),
        AppError::BusinessRule(_)
    ));
    assert!(matches!(
        h.services.loans.renew_loan(LoanId::new()).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_overdue_sweep_only_relabels() {
    let h = Harness::new(date(2024, 1, 1));
    let book = h.add_book("1984", "Fiction", 3).await;
    let member = h.add_member("John Doe").await;
    let first = h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    h.clock.set(date(2024, 1, 10));
    let second = h.services.loans.issue_loan(book.id, member.id).await.unwrap();

    h.clock.set(date(2024, 1, 16));
    assert_eq!(h.services.loans.sweep_overdue().await.unwrap(), 1);
    assert_eq!(h.services.loans.sweep_overdue().await.unwrap(), 0);

    let first = h.services.loans.get_loan(first.id).await.unwrap();
    let second = h.services.loans.get_loan(second.id).await.unwrap();
    assert_eq!(first.status, LoanStatus::Overdue);
    assert_eq!(first.fine, Decimal::ZERO);
    assert_eq!(second.status, LoanStatus::Active);
    assert_eq!(h.available(&book).await, 1);

    // An OVERDUE loan returns like any open loan
    let returned = h.services.loans.return_loan(first.id).await.unwrap().unwrap();
    assert_eq!(returned.fine, Decimal::new(50, 2));
    assert_eq!(h.available(&book).await, 2);
    h.assert_consistent().await;
}

#[tokio::test]
async fn test_fine_grows_with_lateness() {
    let h = Harness::new(date(2023, 10, 1));
    let book = h.add_book("1984", "Fiction", 10).await;
    let member = h.add_member("John Doe").await;

    let mut loans = Vec::new();
    for _ in 0..6 {
        loans.push(h.services.loans.issue_loan(book.id, member.id).await.unwrap());
    }

    let mut previous = Decimal::ZERO;
    for (offset, loan) in loans.iter().enumerate() {
        h.clock.set(date(2023, 10, 13 + offset as u32 * 2));
        let fine = h
            .services
            .loans
            .return_loan(loan.id)
            .await
            .unwrap()
            .unwrap()
            .fine;
        assert!(fine >= previous);
        previous = fine;
    }

    assert_eq!(previous, Decimal::new(400, 2));
    h.assert_consistent().await;
}

#[tokio::test]
async fn test_negative_daily_fine_never_charges() {
    let mut config = AppConfig::default();
    config.circulation.daily_fine = Decimal::new(-50, 2);

    let rejected = librasync::Library::open(
        config.clone(),
        std::sync::Arc::new(librasync::clock::ManualClock::new(date(2023, 10, 1))),
    )
    .await;
    assert!(matches!(rejected, Err(AppError::Validation(_))));

    // Services built around the check still never charge below zero
    let h = Harness::with_config(config, date(2023, 10, 1));
    let book = h.add_book("1984", "Fiction", 1).await;
    let member = h.add_member("John Doe").await;
    let loan = h.services.loans.issue_loan(book.id, member.id).await.unwrap();

    h.clock.set(date(2023, 10, 20));
    let returned = h.services.loans.return_loan(loan.id).await.unwrap().unwrap();
    assert_eq!(returned.fine, Decimal::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issues_never_oversell() {
    let h = Harness::new(date(2024, 1, 1));
    let book = h.add_book("Clean Code", "Technology", 5).await;
    let member = h.add_member("John Doe").await;

    let mut handles = Vec::new();
    for _ in 0..50 {
        let loans = h.services.loans.clone();
        handles.push(tokio::spawn(async move {
            loans.issue_loan(book.id, member.id).await
        }));
    }

    let mut issued = 0;
    let mut unavailable = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => issued += 1,
            Err(AppError::BookUnavailable(_)) => unavailable += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(issued, 5);
    assert_eq!(unavailable, 45);
    assert_eq!(h.available(&book).await, 0);
    assert_eq!(h.services.loans.list_loans().await.len(), 5);
    h.assert_consistent().await;
}

#[tokio::test]
async fn test_create_loan_request() {
    let h = Harness::new(date(2024, 1, 1));
    let book = h.add_book("Sapiens", "History", 2).await;
    let member = h.add_member("Jane Smith").await;

    let request: CreateLoan = serde_json::from_value(serde_json::json!({
        "bookId": book.id,
        "memberId": member.id,
    }))
    .unwrap();
    let loan = h.services.loans.create_loan(request).await.unwrap();

    assert_eq!(loan.book_id, book.id);
    assert_eq!(loan.member_id, member.id);
    assert_eq!(
        loan.due_date,
        h.services.loans.policy().due_date_from(date(2024, 1, 1))
    );

    let book = h.services.catalog.get_book(book.id).await.unwrap();
    assert_eq!(book.on_loan(), 1);
    assert!(book.is_available());
}
