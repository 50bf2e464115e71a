//! Integration tests for the LibraSync services

mod circulation;
mod stats;

use std::sync::Arc;

use chrono::NaiveDate;
use librasync::{
    clock::ManualClock,
    models::{Book, CreateBook, Member, RegisterMember},
    repository::Repository,
    services::Services,
    AppConfig,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Services over an empty in-memory ledger, with a hand-driven clock
pub struct Harness {
    pub services: Services,
    pub repository: Repository,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(today: NaiveDate) -> Self {
        Self::with_config(AppConfig::default(), today)
    }

    pub fn with_config(config: AppConfig, today: NaiveDate) -> Self {
        let repository = Repository::in_memory();
        let clock = Arc::new(ManualClock::new(today));
        let services = Services::new(repository.clone(), &config, clock.clone());
        Self {
            services,
            repository,
            clock,
        }
    }

    pub async fn add_book(&self, title: &str, category: &str, quantity: u32) -> Book {
        self.services
            .catalog
            .add_book(CreateBook {
                title: title.to_string(),
                author: "Test Author".to_string(),
                isbn: "9780000000000".to_string(),
                category: category.to_string(),
                quantity,
                cover_url: None,
            })
            .await
            .expect("Failed to add book")
    }

    pub async fn add_member(&self, name: &str) -> Member {
        self.services
            .members
            .register_member(RegisterMember {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
                phone: "555-0100".to_string(),
            })
            .await
            .expect("Failed to register member")
    }

    pub async fn available(&self, book: &Book) -> u32 {
        self.services
            .catalog
            .get_book(book.id)
            .await
            .expect("Book should exist")
            .available
    }

    /// `available = quantity - open loans` and `available <= quantity` for every book
    pub async fn assert_consistent(&self) {
        let state = self.repository.snapshot().await;
        assert!(
            state.availability_drift().is_empty(),
            "availability drift: {:?}",
            state.availability_drift()
        );
        for book in state.books.values() {
            assert!(book.available <= book.quantity);
        }
    }
}
