//! Data models for LibraSync

pub mod book;
pub mod id;
pub mod loan;
pub mod member;
pub mod stats;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookShort, CreateBook, UpdateBook};
pub use id::{BookId, LoanId, MemberId, UserId};
pub use loan::{CreateLoan, Loan, LoanDetails, LoanStatus};
pub use member::{Member, MemberShort, MemberStatus, RegisterMember};
pub use stats::{Dashboard, MemberLoans, Report};
pub use user::{CreateUser, Role, UpdateProfile, User, UserProfile};
