use thiserror::Error;

/// Errors returned by the authentication service.
///
/// The named variants are part of the public contract and are safe to show to
/// callers. `Internal` carries the operator-facing context chain but always
/// displays as a fixed message.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user already exists")]
    UserExists,
    #[error("user not found")]
    UserNotFound,
    #[error("app not found")]
    AppNotFound,
    #[error("invalid token")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl Error {
    /// Wrap any failure as an internal error with the given context.
    pub fn internal<E>(context: &'static str, err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Internal(err.into().context(context))
    }

    /// `true` for the opaque internal class.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Failures reported by storage adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("user already exists")]
    UserExists,
    #[error("user not found")]
    UserNotFound,
    #[error("app not found")]
    AppNotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
