//! Authentication core: password hashing, app-scoped tokens, and the service
//! that ties them to storage.
//!
//! ## Login
//!
//! A login resolves the app first, then the user, then checks the password.
//! An unknown email and a wrong password both end in
//! [`Error::InvalidCredentials`] after the same amount of hashing work, so a
//! caller cannot tell which one happened.
//!
//! ## Tokens
//!
//! Tokens are HS256 JWTs signed with the app's own secret and carry the app id
//! as a claim. A token is only meaningful for the app that issued it.
//!
//! ## Registration
//!
//! Email uniqueness is enforced by the storage adapter inside `save_user`; the
//! service relays [`Error::UserExists`] and does no locking of its own.

mod error;
mod models;
pub mod password;
mod service;
mod storage;
pub mod token;

pub use error::{Error, StorageError};
pub use models::{App, User};
pub use password::{HashParams, PasswordHasher};
pub use service::{Auth, AuthService};
pub use storage::{AppProvider, UserProvider, UserSaver};
pub use token::TokenIssuer;
