//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`)
//! so the salt and the cost parameters travel with the hash. Verification
//! re-derives the hash with the embedded parameters and compares in constant
//! time.

use anyhow::{Context, Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use std::{fmt, sync::Arc};

// Never matches a real password; used to burn the same CPU time when a login
// names an unknown email.
const DUMMY_PASSWORD: &str = "sso-dummy-password-for-timing-equalization";

/// Argon2 cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    // OWASP baseline for Argon2id: 19 MiB, 2 iterations, 1 lane.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// One-way password hasher. Cheap to clone.
#[derive(Clone, Debug)]
pub struct PasswordHasher {
    inner: Arc<Inner>,
}

struct Inner {
    argon2: Argon2<'static>,
    dummy_hash: Vec<u8>,
}

impl fmt::Debug for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Build a hasher with the given cost parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if Argon2 rejects the parameters or cannot derive the
    /// dummy hash used for unknown emails.
    pub fn new(params: HashParams) -> Result<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        // Derived with the configured cost so a dummy verify matches a real one.
        let dummy_hash =
            hash_with(&argon2, DUMMY_PASSWORD).context("failed to derive dummy hash")?;

        Ok(Self {
            inner: Arc::new(Inner { argon2, dummy_hash }),
        })
    }

    /// Hash `password` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns an error if Argon2 fails to derive the hash.
    pub fn hash(&self, password: &str) -> Result<Vec<u8>> {
        hash_with(&self.inner.argon2, password)
    }

    /// Check `password` against a stored hash. Malformed hashes never match.
    #[must_use]
    pub fn verify(&self, hash: &[u8], password: &str) -> bool {
        let Ok(encoded) = std::str::from_utf8(hash) else {
            return false;
        };
        let Ok(parsed) = PasswordHash::new(encoded) else {
            return false;
        };

        self.inner
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Run a full verification against a throwaway hash and discard the result.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(&self.inner.dummy_hash, password);
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails or the blocking task panics.
    pub async fn hash_async(&self, password: &str) -> Result<Vec<u8>> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("password hashing task failed")?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error only if the blocking task panics.
    pub async fn verify_async(&self, hash: Vec<u8>, password: &str) -> Result<bool> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .context("password verification task failed")
    }

    /// [`verify_dummy`](Self::verify_dummy) on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error only if the blocking task panics.
    pub async fn verify_dummy_async(&self, password: &str) -> Result<()> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&password))
            .await
            .context("dummy verification task failed")
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<Vec<u8>> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash password: {e}"))?;

    Ok(hash.to_string().into_bytes())
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    // Minimum Argon2 memory keeps the suite fast.
    PasswordHasher::new(HashParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap_or_else(|e| panic!("test hasher: {e}"))
}
