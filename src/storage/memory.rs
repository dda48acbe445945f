//! In-process storage backed by `tokio` locks.
//!
//! Used by the test suite and by embedders that do not need durability.

use crate::auth::{App, AppProvider, StorageError, User, UserProvider, UserSaver};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Users {
    next_id: i64,
    by_email: HashMap<String, i64>,
    by_id: HashMap<i64, UserRow>,
}

#[derive(Debug)]
struct UserRow {
    email: String,
    pass_hash: Vec<u8>,
    is_admin: bool,
}

#[derive(Debug)]
struct AppRow {
    name: String,
    secret: Vec<u8>,
}

/// Cheap to clone; clones share the same data.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    users: Arc<RwLock<Users>>,
    apps: Arc<RwLock<HashMap<i64, AppRow>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision (or replace) an app.
    pub async fn insert_app(&self, id: i64, name: impl Into<String>, secret: impl Into<Vec<u8>>) {
        self.apps.write().await.insert(
            id,
            AppRow {
                name: name.into(),
                secret: secret.into(),
            },
        );
    }

    /// Set the admin flag of an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UserNotFound`] if `user_id` does not resolve.
    pub async fn set_admin(&self, user_id: i64, is_admin: bool) -> Result<(), StorageError> {
        let mut users = self.users.write().await;
        let row = users
            .by_id
            .get_mut(&user_id)
            .ok_or(StorageError::UserNotFound)?;
        row.is_admin = is_admin;
        Ok(())
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.by_id.len()
    }
}

#[async_trait]
impl UserSaver for MemoryStorage {
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<i64, StorageError> {
        // Check and insert under one write lock.
        let mut users = self.users.write().await;
        if users.by_email.contains_key(email) {
            return Err(StorageError::UserExists);
        }

        users.next_id += 1;
        let id = users.next_id;
        users.by_email.insert(email.to_string(), id);
        users.by_id.insert(
            id,
            UserRow {
                email: email.to_string(),
                pass_hash: pass_hash.to_vec(),
                is_admin: false,
            },
        );

        Ok(id)
    }
}

#[async_trait]
impl UserProvider for MemoryStorage {
    async fn user(&self, email: &str) -> Result<User, StorageError> {
        let users = self.users.read().await;
        let id = *users.by_email.get(email).ok_or(StorageError::UserNotFound)?;
        let row = users.by_id.get(&id).ok_or(StorageError::UserNotFound)?;

        Ok(User {
            id,
            email: row.email.clone(),
            pass_hash: row.pass_hash.clone(),
        })
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, StorageError> {
        self.users
            .read()
            .await
            .by_id
            .get(&user_id)
            .map(|row| row.is_admin)
            .ok_or(StorageError::UserNotFound)
    }
}

#[async_trait]
impl AppProvider for MemoryStorage {
    async fn app(&self, app_id: i64) -> Result<App, StorageError> {
        self.apps
            .read()
            .await
            .get(&app_id)
            .map(|row| App::new(app_id, row.name.clone(), row.secret.clone()))
            .ok_or(StorageError::AppNotFound)
    }
}
