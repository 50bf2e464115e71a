//! LibraSync library circulation core
//!
//! An in-memory ledger of books, members, loans and staff accounts with
//! optional JSON snapshots. Presentation layers drive it through
//! [`services::Services`]: catalog and roster edits, issuing and returning
//! loans (with overdue fines), and read-only dashboards and reports.

use std::sync::Arc;

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod seed;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use clock::Clock;
use policy::LoanPolicy;
use repository::{Repository, SnapshotStore};
use services::Services;

/// Application state handed to presentation layers
#[derive(Clone)]
pub struct Library {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
}

impl Library {
    /// Open the ledger described by `config`, seeding demo data into an empty
    /// ledger and running the overdue sweep when configured to.
    pub async fn open(config: AppConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let snapshots = match config.storage.data_dir.clone() {
            Some(dir) => SnapshotStore::new(dir),
            None => SnapshotStore::in_memory(),
        };
        let repository = Repository::open(snapshots).await?;

        if config.seed.demo_data && repository.is_empty().await {
            let policy = LoanPolicy::from(&config.circulation);
            repository
                .replace_all(seed::demo_state(clock.today(), &policy))
                .await?;
            tracing::info!("Empty ledger seeded with demo data");
        }

        let services = Services::new(repository, &config, clock);

        if config.circulation.overdue_sweep {
            services.loans.sweep_overdue().await?;
        }

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
