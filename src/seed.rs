//! Demo data for an empty ledger

use chrono::{Duration, NaiveDate};

use crate::{
    models::{
        Book, BookId, Loan, LoanStatus, Member, MemberId, MemberStatus, Role, User, UserId,
    },
    policy::LoanPolicy,
    repository::LibraryState,
};

fn user(username: &str, name: &str, role: Role, email: &str, bio: &str) -> User {
    User {
        id: UserId::new(),
        username: username.to_string(),
        name: name.to_string(),
        role,
        avatar_url: None,
        email: Some(email.to_string()),
        bio: Some(bio.to_string()),
        password_hash: None,
    }
}

fn book(title: &str, author: &str, isbn: &str, category: &str, quantity: u32) -> Book {
    Book {
        id: BookId::new(),
        title: title.to_string(),
        author: author.to_string(),
        isbn: isbn.to_string(),
        category: category.to_string(),
        quantity,
        available: quantity,
        cover_url: None,
    }
}

fn member(name: &str, email: &str, phone: &str, join_date: NaiveDate, status: MemberStatus) -> Member {
    Member {
        id: MemberId::new(),
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        join_date,
        status,
    }
}

/// Staff accounts, catalog, roster and a few loans dated around `today`.
///
/// Availability is derived from the open loans, so the returned state always
/// satisfies `available = quantity - open loans`.
pub fn demo_state(today: NaiveDate, policy: &LoanPolicy) -> LibraryState {
    let days = Duration::days;

    let users = vec![
        user(
            "admin",
            "Alice Admin",
            Role::Admin,
            "admin@librasync.com",
            "Administrator of the LibraSync system.",
        ),
        user(
            "lib",
            "Larry Librarian",
            Role::Librarian,
            "librarian@librasync.com",
            "Dedicated to organizing knowledge.",
        ),
    ];

    let books = vec![
        book("The Great Gatsby", "F. Scott Fitzgerald", "9780743273565", "Fiction", 5),
        book("Clean Code", "Robert C. Martin", "9780132350884", "Technology", 3),
        book("1984", "George Orwell", "9780451524935", "Fiction", 10),
        book("Introduction to Algorithms", "Cormen et al.", "9780262033848", "Education", 2),
        book("Sapiens", "Yuval Noah Harari", "9780062316097", "History", 6),
    ];

    let members = vec![
        member("John Doe", "john@example.com", "555-0101", today - days(280), MemberStatus::Active),
        member("Jane Smith", "jane@example.com", "555-0102", today - days(220), MemberStatus::Active),
        member("Bob Johnson", "bob@example.com", "555-0103", today - days(350), MemberStatus::Suspended),
    ];

    let issued = |book: &Book, member: &Member, loan_date: NaiveDate| {
        Loan::open(book.id, member.id, loan_date, policy.due_date_from(loan_date))
    };

    let period = days(i64::from(policy.loan_period_days));

    // Fell due six days ago, whatever the loan period
    let mut overdue = issued(&books[0], &members[0], today - period - days(6));
    if overdue.is_overdue(today) {
        overdue.status = LoanStatus::Overdue;
    }

    // Came back three days late, a week ago
    let returned_late = issued(&books[2], &members[1], today - period - days(10));
    let returned_on = returned_late.due_date + days(3);
    let returned_late = returned_late.returned(returned_on, &policy.fines);

    let loans = vec![
        returned_late,
        overdue,
        issued(&books[1], &members[1], today - days(9)),
        issued(&books[4], &members[0], today - days(7)),
    ];

    let mut state = LibraryState::from_parts(users, books, members, loans);
    let on_loan: Vec<(BookId, u32)> = state
        .books
        .keys()
        .map(|&id| (id, state.open_loans_for_book(id)))
        .collect();
    for (id, open) in on_loan {
        if let Some(book) = state.books.get_mut(&id) {
            book.available = book.quantity - open;
        }
    }
    state
}
