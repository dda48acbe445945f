use super::error::{Error, StorageError};
use super::password::PasswordHasher;
use super::storage::{AppProvider, UserProvider, UserSaver};
use super::token::TokenIssuer;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Operations exposed to the transport layer.
#[async_trait]
pub trait Auth: Send + Sync {
    /// Authenticate `email`/`password` and issue a token scoped to `app_id`.
    async fn login(&self, email: &str, password: &str, app_id: i64) -> Result<String, Error>;

    /// Register a new user and return its id.
    async fn register_new_user(&self, email: &str, password: &str) -> Result<i64, Error>;

    /// Whether `user_id` holds the admin flag.
    async fn is_admin(&self, user_id: i64) -> Result<bool, Error>;
}

/// Authentication service wired to its storage capabilities.
#[derive(Debug)]
pub struct AuthService<S, P, A> {
    user_saver: S,
    user_provider: P,
    app_provider: A,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    token_ttl: Duration,
}

impl<S, P, A> AuthService<S, P, A>
where
    S: UserSaver,
    P: UserProvider,
    A: AppProvider,
{
    #[must_use]
    pub const fn new(
        user_saver: S,
        user_provider: P,
        app_provider: A,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
        token_ttl: Duration,
    ) -> Self {
        Self {
            user_saver,
            user_provider,
            app_provider,
            hasher,
            issuer,
            token_ttl,
        }
    }

    #[must_use]
    pub const fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }
}

#[async_trait]
impl<S, P, A> Auth for AuthService<S, P, A>
where
    S: UserSaver,
    P: UserProvider,
    A: AppProvider,
{
    #[instrument(name = "auth.login", skip(self, password))]
    async fn login(&self, email: &str, password: &str, app_id: i64) -> Result<String, Error> {
        let app = match self.app_provider.app(app_id).await {
            Ok(app) => app,
            Err(StorageError::AppNotFound) => {
                warn!("app not found");
                return Err(Error::AppNotFound);
            }
            Err(e) => return Err(Error::internal("failed to get app", e)),
        };

        let user = match self.user_provider.user(email).await {
            Ok(user) => user,
            Err(StorageError::UserNotFound) => {
                // Same cost as a wrong password so the two cases look alike.
                self.hasher
                    .verify_dummy_async(password)
                    .await
                    .map_err(|e| Error::internal("failed to verify password", e))?;
                warn!("user not found");
                return Err(Error::InvalidCredentials);
            }
            Err(e) => return Err(Error::internal("failed to get user", e)),
        };

        let valid = self
            .hasher
            .verify_async(user.pass_hash, password)
            .await
            .map_err(|e| Error::internal("failed to verify password", e))?;
        if !valid {
            warn!("invalid credentials");
            return Err(Error::InvalidCredentials);
        }

        let token = self
            .issuer
            .issue(user.id, app.id, app.secret(), self.token_ttl)?;

        info!(user_id = user.id, "user logged in successfully");

        Ok(token)
    }

    #[instrument(name = "auth.register_new_user", skip(self, password))]
    async fn register_new_user(&self, email: &str, password: &str) -> Result<i64, Error> {
        let pass_hash = self
            .hasher
            .hash_async(password)
            .await
            .map_err(|e| Error::internal("failed to generate password hash", e))?;

        let user_id = match self.user_saver.save_user(email, &pass_hash).await {
            Ok(id) => id,
            Err(StorageError::UserExists) => {
                warn!("user already exists");
                return Err(Error::UserExists);
            }
            Err(e) => return Err(Error::internal("failed to save user", e)),
        };

        info!(user_id, "user registered");

        Ok(user_id)
    }

    #[instrument(name = "auth.is_admin", skip(self))]
    async fn is_admin(&self, user_id: i64) -> Result<bool, Error> {
        let is_admin = match self.user_provider.is_admin(user_id).await {
            Ok(is_admin) => is_admin,
            Err(StorageError::UserNotFound) => {
                warn!("user not found");
                return Err(Error::UserNotFound);
            }
            Err(e) => return Err(Error::internal("failed to check admin flag", e)),
        };

        info!(is_admin, "checked if user is admin");

        Ok(is_admin)
    }
}
