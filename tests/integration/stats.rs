//! Dashboards, loan views and reports

use librasync::{models::MemberId, AppError};
use rust_decimal::Decimal;

use crate::{date, Harness};

#[tokio::test]
async fn test_dashboard_counts() {
    let h = Harness::new(date(2023, 10, 1));
    let gatsby = h.add_book("The Great Gatsby", "Fiction", 5).await;
    let code = h.add_book("Clean Code", "Technology", 3).await;
    let john = h.add_member("John Doe").await;
    let jane = h.add_member("Jane Smith").await;

    h.services.loans.issue_loan(gatsby.id, john.id).await.unwrap();
    h.clock.set(date(2023, 10, 10));
    h.services.loans.issue_loan(code.id, jane.id).await.unwrap();
    let returned = h.services.loans.issue_loan(code.id, john.id).await.unwrap();
    h.services.loans.return_loan(returned.id).await.unwrap();

    h.clock.set(date(2023, 10, 20));
    let dashboard = h.services.stats.dashboard().await;
    assert_eq!(dashboard.total_books, 8);
    assert_eq!(dashboard.available_copies, 6);
    assert_eq!(dashboard.active_loans, 2);
    assert_eq!(dashboard.overdue_loans, 1);
    assert_eq!(dashboard.total_members, 2);
}

#[tokio::test]
async fn test_loan_views() {
    let h = Harness::new(date(2023, 10, 1));
    let book = h.add_book("1984", "Fiction", 4).await;
    let member = h.add_member("John Doe").await;

    let first = h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    let second = h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    let third = h.services.loans.issue_loan(book.id, member.id).await.unwrap();

    h.clock.set(date(2023, 10, 5));
    h.services.loans.return_loan(second.id).await.unwrap();
    h.clock.set(date(2023, 10, 8));
    h.services.loans.return_loan(first.id).await.unwrap();

    let history = h.services.stats.history().await;
    let order: Vec<_> = history.iter().map(|d| d.id).collect();
    assert_eq!(order, vec![first.id, second.id]);

    let active = h.services.stats.active_loans().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, third.id);
    assert_eq!(active[0].book_title(), "1984");
    assert_eq!(active[0].member_name(), "John Doe");
    assert!(!active[0].is_overdue);

    h.clock.set(date(2023, 10, 18));
    let overdue = h.services.stats.overdue_loans().await;
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].overdue_days, 3);
    assert_eq!(overdue[0].accrued_fine, Decimal::new(150, 2));

    let recent = h.services.stats.recent_activity(2).await;
    let order: Vec<_> = recent.iter().map(|d| d.id).collect();
    assert_eq!(order, vec![third.id, second.id]);
}

#[tokio::test]
async fn test_member_and_book_loans() {
    let h = Harness::new(date(2023, 10, 1));
    let book = h.add_book("Sapiens", "History", 3).await;
    let other = h.add_book("Clean Code", "Technology", 1).await;
    let member = h.add_member("Jane Smith").await;

    let late = h.services.loans.issue_loan(book.id, member.id).await.unwrap();
    h.services.loans.issue_loan(other.id, member.id).await.unwrap();
    h.clock.set(date(2023, 10, 20));
    h.services.loans.return_loan(late.id).await.unwrap();

    h.clock.set(date(2023, 10, 17));
    let summary = h.services.stats.member_loans(member.id).await.unwrap();
    assert_eq!(summary.returned.len(), 1);
    assert_eq!(summary.open.len(), 1);
    assert_eq!(summary.fines_paid, Decimal::new(250, 2));
    assert_eq!(summary.fines_due, Decimal::new(100, 2));

    let history = h.services.stats.book_loans(book.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, late.id);

    assert!(matches!(
        h.services.stats.member_loans(MemberId::new()).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_report() {
    let h = Harness::new(date(2023, 9, 25));
    let fiction = h.add_book("1984", "Fiction", 5).await;
    let history = h.add_book("Sapiens", "History", 5).await;
    let member = h.add_member("John Doe").await;

    let late = h.services.loans.issue_loan(fiction.id, member.id).await.unwrap();
    h.services.loans.issue_loan(history.id, member.id).await.unwrap();
    h.clock.set(date(2023, 10, 12));
    h.services.loans.issue_loan(fiction.id, member.id).await.unwrap();
    h.services.loans.return_loan(late.id).await.unwrap();

    // Both September loans fell due on 10-09
    let report = h.services.stats.report().await;
    assert_eq!(report.fines_collected, Decimal::new(150, 2));
    assert_eq!(report.fines_outstanding, Decimal::new(150, 2));

    assert_eq!(report.loans_by_category[0].category, "Fiction");
    assert_eq!(report.loans_by_category[0].loans, 2);
    assert_eq!(report.loans_by_category[1].category, "History");

    let months: Vec<_> = report
        .loans_by_month
        .iter()
        .map(|m| (m.month.as_str(), m.loans, m.returns))
        .collect();
    assert_eq!(months, vec![("2023-09", 2, 0), ("2023-10", 1, 1)]);
    assert_eq!(report.dashboard, h.services.stats.dashboard().await);
}
