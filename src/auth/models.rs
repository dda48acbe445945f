use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;

/// Registered end-user as returned by storage.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub pass_hash: Vec<u8>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("pass_hash", &"[REDACTED]")
            .finish()
    }
}

/// Client application; its secret signs every token issued for it.
#[derive(Debug)]
pub struct App {
    pub id: i64,
    pub name: String,
    secret: SecretSlice<u8>,
}

impl App {
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, secret: Vec<u8>) -> Self {
        Self {
            id,
            name: name.into(),
            secret: SecretSlice::from(secret),
        }
    }

    #[must_use]
    pub fn secret(&self) -> &[u8] {
        self.secret.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let user = User {
            id: 1,
            email: "alice@example.com".to_string(),
            pass_hash: b"$argon2id$v=19$secret".to_vec(),
        };
        let printed = format!("{user:?}");
        assert!(printed.contains("alice@example.com"));
        assert!(!printed.contains("argon2id"));

        let app = App::new(7, "billing", b"app-signing-secret".to_vec());
        let printed = format!("{app:?}");
        assert!(printed.contains("billing"));
        assert!(!printed.contains("app-signing-secret"));
        assert_eq!(app.secret(), b"app-signing-secret");
    }
}
