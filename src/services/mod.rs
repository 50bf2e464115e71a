//! Business logic services

pub mod catalog;
pub mod loans;
pub mod members;
pub mod stats;
pub mod users;

use std::sync::Arc;

use crate::{clock::Clock, config::AppConfig, policy::LoanPolicy, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let policy = LoanPolicy::from(&config.circulation);
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            members: members::MembersService::new(repository.clone(), clock.clone()),
            loans: loans::LoansService::new(repository.clone(), policy.clone(), clock.clone()),
            users: users::UsersService::new(repository.clone(), config.auth.clone()),
            stats: stats::StatsService::new(repository, policy, clock),
        }
    }
}
