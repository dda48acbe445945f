//! # SSO (Single Sign-On Authentication)
//!
//! `sso` registers users, authenticates them against a registered client
//! application and answers whether a user holds the administrator role.
//!
//! ## Login
//!
//! A successful login returns a signed token (HS256 JWT) bound to the
//! application that was named in the request. The token is signed with that
//! application's own secret, so a token minted for one application never
//! verifies against another.
//!
//! Wrong passwords and unknown emails are reported the same way so callers
//! cannot tell which accounts exist.
//!
//! ## Passwords
//!
//! Passwords are stored as Argon2id hashes in PHC string format. Hashing runs
//! on the blocking thread pool.
//!
//! ## Storage
//!
//! Persistence sits behind the [`auth::UserSaver`], [`auth::UserProvider`] and
//! [`auth::AppProvider`] traits. [`storage::PgStorage`] is the production
//! adapter and [`storage::MemoryStorage`] backs tests.

pub mod api;
pub mod auth;
pub mod cli;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // non-git build
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }
}
