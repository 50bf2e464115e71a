//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::id::BookId;

/// Catalog entry with its copy counts.
///
/// `available` is never written by callers: it starts at `quantity` and only
/// the circulation engine moves it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub quantity: u32,
    pub available: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl Book {
    /// Copies currently tied to open loans
    pub fn on_loan(&self) -> u32 {
        self.quantity.saturating_sub(self.available)
    }

    pub fn is_available(&self) -> bool {
        self.available > 0
    }

    /// Copy of this book with one fewer copy on the shelf
    pub(crate) fn checked_out(&self) -> Option<Book> {
        let available = self.available.checked_sub(1)?;
        Some(Book {
            available,
            ..self.clone()
        })
    }

    /// Copy of this book with one more copy on the shelf, never above `quantity`
    pub(crate) fn checked_in(&self) -> Book {
        Book {
            available: (self.available + 1).min(self.quantity),
            ..self.clone()
        }
    }

    /// Case-insensitive title/author match, or ISBN substring
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.author.to_lowercase().contains(&needle)
            || self.isbn.contains(term.trim())
    }
}

/// Short book representation for joins and lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookShort {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
}

impl From<&Book> for BookShort {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            category: book.category.clone(),
        }
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub quantity: u32,
    pub cover_url: Option<String>,
}

impl CreateBook {
    pub(crate) fn into_book(self) -> Book {
        Book {
            id: BookId::new(),
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            category: self.category.trim().to_string(),
            quantity: self.quantity,
            available: self.quantity,
            cover_url: self.cover_url,
        }
    }
}

/// Update book request. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u32>,
    pub cover_url: Option<String>,
}
