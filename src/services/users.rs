//! Staff authentication and profile service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateProfile, User, UserProfile},
    models::UserId,
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate a staff member by username.
    ///
    /// Accounts with a stored hash are checked with Argon2. Accounts without one
    /// only get in when `allow_passwordless_login` is set, which is meant for
    /// demo data and is logged on every use.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<User> {
        let invalid = || AppError::Authentication("Invalid credentials".to_string());

        let user = self
            .repository
            .users
            .get_by_username(username.trim())
            .await
            .ok_or_else(invalid)?;

        match user.password_hash {
            Some(_) => {
                if !self.verify_password(&user, password)? {
                    return Err(invalid());
                }
            }
            None if self.config.allow_passwordless_login => {
                tracing::warn!(
                    "User {} logged in without a password check (no password set)",
                    user.username
                );
            }
            None => return Err(invalid()),
        }

        tracing::info!("User {} logged in", user.username);
        Ok(user)
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        if let Some(ref hash) = user.password_hash {
            let parsed_hash = PasswordHash::new(hash)
                .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
            return Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok());
        }

        Ok(false)
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    pub async fn list_users(&self) -> Vec<UserProfile> {
        self.repository
            .users
            .list()
            .await
            .iter()
            .map(UserProfile::from)
            .collect()
    }

    pub async fn get_user(&self, id: UserId) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Provision a staff account
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()?;

        let password_hash = match user.password.as_deref() {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        let created = self
            .repository
            .users
            .create(User {
                id: UserId::new(),
                username: user.username.trim().to_string(),
                name: user.name,
                role: user.role,
                avatar_url: user.avatar_url,
                email: user.email,
                bio: user.bio,
                password_hash,
            })
            .await?;

        tracing::info!("User created: {} ({})", created.username, created.role);
        Ok(created)
    }

    /// Edit name, email, avatar or bio
    pub async fn update_profile(&self, id: UserId, profile: UpdateProfile) -> AppResult<User> {
        profile.validate()?;
        let updated = self
            .repository
            .users
            .modify(id, move |user| profile.apply(user))
            .await?;
        tracing::info!("Profile updated: {}", updated.username);
        Ok(updated)
    }

    pub async fn set_password(&self, id: UserId, password: &str) -> AppResult<()> {
        if password.len() < 4 {
            return Err(AppError::Validation(
                "Password must be at least 4 characters".to_string(),
            ));
        }

        let password_hash = self.hash_password(password)?;
        self.repository
            .users
            .modify(id, move |user| User {
                password_hash: Some(password_hash),
                ..user.clone()
            })
            .await?;
        tracing::info!("Password changed for {}", id);
        Ok(())
    }
}
