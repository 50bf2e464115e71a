//! In-memory ledger contents

use indexmap::IndexMap;

use crate::models::{Book, BookId, Loan, LoanId, Member, MemberId, User, UserId};

/// Every collection the ledger owns, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryState {
    pub users: IndexMap<UserId, User>,
    pub books: IndexMap<BookId, Book>,
    pub members: IndexMap<MemberId, Member>,
    pub loans: IndexMap<LoanId, Loan>,
}

/// A book whose `available` disagrees with its open loans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityDrift {
    pub book_id: BookId,
    pub expected: i64,
    pub actual: u32,
}

impl LibraryState {
    pub fn from_parts(
        users: Vec<User>,
        books: Vec<Book>,
        members: Vec<Member>,
        loans: Vec<Loan>,
    ) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            books: books.into_iter().map(|b| (b.id, b)).collect(),
            members: members.into_iter().map(|m| (m.id, m)).collect(),
            loans: loans.into_iter().map(|l| (l.id, l)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.books.is_empty()
            && self.members.is_empty()
            && self.loans.is_empty()
    }

    pub fn open_loans_for_book(&self, book_id: BookId) -> u32 {
        let open = self
            .loans
            .values()
            .filter(|l| l.book_id == book_id && l.is_open())
            .count();
        u32::try_from(open).unwrap_or(u32::MAX)
    }

    pub fn open_loans_for_member(&self, member_id: MemberId) -> u32 {
        let open = self
            .loans
            .values()
            .filter(|l| l.member_id == member_id && l.is_open())
            .count();
        u32::try_from(open).unwrap_or(u32::MAX)
    }

    /// Books breaking `available = quantity - open loans`
    pub fn availability_drift(&self) -> Vec<AvailabilityDrift> {
        self.books
            .values()
            .filter_map(|book| {
                let expected =
                    i64::from(book.quantity) - i64::from(self.open_loans_for_book(book.id));
                if expected != i64::from(book.available) || book.available > book.quantity {
                    Some(AvailabilityDrift {
                        book_id: book.id,
                        expected,
                        actual: book.available,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}
