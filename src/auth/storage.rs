//! Persistence capabilities the authentication service depends on.
//!
//! Each trait is a narrow port; a single adapter usually implements all of
//! them, but the service takes them separately so tests can substitute one
//! capability at a time. Every operation must be atomic on its own; the
//! service never locks around them.

use super::error::StorageError;
use super::models::{App, User};
use async_trait::async_trait;
use std::sync::Arc;

/// Creates users.
#[async_trait]
pub trait UserSaver: Send + Sync {
    /// Persist a new user and return its id.
    ///
    /// Fails with [`StorageError::UserExists`] when the email is taken.
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<i64, StorageError>;
}

/// Reads users and their role flag.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Fails with [`StorageError::UserNotFound`] when no user has `email`.
    async fn user(&self, email: &str) -> Result<User, StorageError>;

    /// Fails with [`StorageError::UserNotFound`] when `user_id` does not resolve.
    async fn is_admin(&self, user_id: i64) -> Result<bool, StorageError>;
}

/// Reads client apps.
#[async_trait]
pub trait AppProvider: Send + Sync {
    /// Fails with [`StorageError::AppNotFound`] when `app_id` does not resolve.
    async fn app(&self, app_id: i64) -> Result<App, StorageError>;
}

#[async_trait]
impl<T: UserSaver + ?Sized> UserSaver for Arc<T> {
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<i64, StorageError> {
        (**self).save_user(email, pass_hash).await
    }
}

#[async_trait]
impl<T: UserProvider + ?Sized> UserProvider for Arc<T> {
    async fn user(&self, email: &str) -> Result<User, StorageError> {
        (**self).user(email).await
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, StorageError> {
        (**self).is_admin(user_id).await
    }
}

#[async_trait]
impl<T: AppProvider + ?Sized> AppProvider for Arc<T> {
    async fn app(&self, app_id: i64) -> Result<App, StorageError> {
        (**self).app(app_id).await
    }
}
