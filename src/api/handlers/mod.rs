//! HTTP handlers and shared request validation.

pub mod error;
pub mod health;
pub mod is_admin;
pub mod user_login;
pub mod user_register;

pub use error::{ApiError, ErrorResponse};

use regex::Regex;

/// Lightweight email sanity check applied before registration.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("alice@example.com"));
        assert!(valid_email("Alice.Smith+sso@mail.example.org"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("alice@localhost"));
        assert!(!valid_email("alice @example.com"));
        assert!(!valid_email(""));
    }
}
