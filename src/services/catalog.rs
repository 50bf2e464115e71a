//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookId, CreateBook, UpdateBook, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self) -> Vec<Book> {
        self.repository.books.list().await
    }

    pub async fn get_book(&self, id: BookId) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Title/author (case-insensitive) or ISBN substring search
    pub async fn search_books(&self, term: &str) -> Vec<Book> {
        self.repository.books.search(term).await
    }

    /// Add a catalog entry; every copy starts on the shelf.
    /// Duplicate ISBNs are accepted.
    pub async fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        let created = self.repository.books.create(book).await?;
        tracing::info!(
            "Catalog add: \"{}\" id={} ({} copies)",
            created.title,
            created.id,
            created.quantity
        );
        Ok(created)
    }

    /// Update an existing entry
    pub async fn update_book(&self, id: BookId, changes: UpdateBook) -> AppResult<Book> {
        changes.validate()?;
        let updated = self.repository.books.update(id, changes).await?;
        tracing::info!(
            "Catalog update: id={} quantity={} available={}",
            updated.id,
            updated.quantity,
            updated.available
        );
        Ok(updated)
    }

    /// Remove an entry. Administrators only; refused while copies are on loan.
    pub async fn remove_book(&self, actor: &User, id: BookId) -> AppResult<()> {
        if !actor.role.can_delete_books() {
            return Err(AppError::Authorization(format!(
                "{} ({}) may not remove catalog entries",
                actor.username, actor.role
            )));
        }

        let removed = self.repository.books.delete(id).await?;
        tracing::info!(
            "Catalog remove: \"{}\" id={} by {}",
            removed.title,
            removed.id,
            actor.username
        );
        Ok(())
    }
}
