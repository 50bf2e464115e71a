//! Staff users repository

use super::{Collection, Ledger};
use crate::{
    error::{AppError, AppResult},
    models::{User, UserId},
};

#[derive(Clone)]
pub struct UsersRepository {
    ledger: Ledger,
}

impl UsersRepository {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub async fn list(&self) -> Vec<User> {
        self.ledger
            .read(|state| state.users.values().cloned().collect())
            .await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: UserId) -> AppResult<User> {
        self.ledger
            .read(|state| state.users.get(&id).cloned())
            .await
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Exact username lookup
    pub async fn get_by_username(&self, username: &str) -> Option<User> {
        self.ledger
            .read(|state| {
                state
                    .users
                    .values()
                    .find(|u| u.username == username)
                    .cloned()
            })
            .await
    }

    /// Insert a new account; usernames are unique
    pub async fn create(&self, user: User) -> AppResult<User> {
        self.ledger
            .commit(&[Collection::Users], move |state| {
                if state.users.values().any(|u| u.username == user.username) {
                    return Err(AppError::Conflict(format!(
                        "Username {} is already taken",
                        user.username
                    )));
                }
                if state.users.contains_key(&user.id) {
                    return Err(AppError::Internal(format!("User id {} already in use", user.id)));
                }
                state.users.insert(user.id, user.clone());
                Ok(user)
            })
            .await
    }

    /// Rewrite a stored account in one write
    pub async fn modify(
        &self,
        id: UserId,
        f: impl FnOnce(&User) -> User,
    ) -> AppResult<User> {
        self.ledger
            .commit(&[Collection::Users], move |state| {
                let slot = state
                    .users
                    .get_mut(&id)
                    .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;
                let updated = User { id, ..f(slot) };
                *slot = updated.clone();
                Ok(updated)
            })
            .await
    }
}
