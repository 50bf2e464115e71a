//! Books repository

use super::{Collection, Ledger};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookId, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    ledger: Ledger,
}

impl BooksRepository {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// All books in catalog order
    pub async fn list(&self) -> Vec<Book> {
        self.ledger
            .read(|state| state.books.values().cloned().collect())
            .await
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: BookId) -> AppResult<Book> {
        self.ledger
            .read(|state| state.books.get(&id).cloned())
            .await
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn search(&self, term: &str) -> Vec<Book> {
        self.ledger
            .read(|state| {
                state
                    .books
                    .values()
                    .filter(|b| b.matches(term))
                    .cloned()
                    .collect()
            })
            .await
    }

    /// Add a catalog entry with every copy on the shelf
    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        let book = book.into_book();
        self.ledger
            .commit(&[Collection::Books], move |state| {
                if state.books.contains_key(&book.id) {
                    return Err(AppError::Internal(format!("Book id {} already in use", book.id)));
                }
                state.books.insert(book.id, book.clone());
                Ok(book)
            })
            .await
    }

    /// Edit a catalog entry.
    ///
    /// A quantity change moves `available` by the same amount; a quantity below
    /// the number of copies on loan is rejected.
    pub async fn update(&self, id: BookId, changes: UpdateBook) -> AppResult<Book> {
        self.ledger
            .commit(&[Collection::Books], move |state| {
                let current = state
                    .books
                    .get(&id)
                    .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

                let on_loan = state.open_loans_for_book(id);
                let quantity = changes.quantity.unwrap_or(current.quantity);
                if quantity < on_loan {
                    return Err(AppError::Validation(format!(
                        "Quantity {} is below the {} copies currently on loan",
                        quantity, on_loan
                    )));
                }

                let updated = Book {
                    id,
                    title: changes.title.unwrap_or_else(|| current.title.clone()),
                    author: changes.author.unwrap_or_else(|| current.author.clone()),
                    isbn: changes.isbn.unwrap_or_else(|| current.isbn.clone()),
                    category: changes.category.unwrap_or_else(|| current.category.clone()),
                    quantity,
                    available: quantity - on_loan,
                    cover_url: changes.cover_url.or_else(|| current.cover_url.clone()),
                };
                state.books.insert(id, updated.clone());
                Ok(updated)
            })
            .await
    }

    /// Remove a catalog entry that has no open loans
    pub async fn delete(&self, id: BookId) -> AppResult<Book> {
        self.ledger
            .commit(&[Collection::Books], move |state| {
                if !state.books.contains_key(&id) {
                    return Err(AppError::NotFound(format!("Book with id {} not found", id)));
                }
                let on_loan = state.open_loans_for_book(id);
                if on_loan > 0 {
                    return Err(AppError::Conflict(format!(
                        "Book {} has {} copies on loan",
                        id, on_loan
                    )));
                }
                state
                    .books
                    .shift_remove(&id)
                    .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
            })
            .await
    }
}
