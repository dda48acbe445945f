//! App-scoped bearer tokens.
//!
//! Tokens are compact JWTs signed with HMAC-SHA256 under the secret of the app
//! they were issued for. Validation is stateless: a token is accepted when the
//! signature verifies against the app's secret, its `app_id` claim names that
//! app, and `exp` is still in the future.
//!
//! `iat` and `exp` are NumericDates with millisecond precision (fractional
//! seconds), so a token is valid exactly on `[iat, iat + ttl)`.

use super::error::Error;
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const ALG: &str = "HS256";
const TYP: &str = "JWT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALG.to_string(),
            typ: TYP.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub sub: i64,
    pub app_id: i64,
    pub iat: f64,
    pub exp: f64,
}

/// Issues and validates tokens. Holds only the clock-skew policy; secrets are
/// passed per call because they belong to the app.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenIssuer {
    leeway: Duration,
}

impl TokenIssuer {
    /// Strict expiry check.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            leeway: Duration::ZERO,
        }
    }

    /// Accept tokens up to `leeway` past their expiry.
    #[must_use]
    pub const fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Issue a token for `user_id` in `app_id` valid for `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the clock is before the epoch or encoding
    /// fails.
    pub fn issue(
        &self,
        user_id: i64,
        app_id: i64,
        secret: &[u8],
        ttl: Duration,
    ) -> Result<String, Error> {
        self.issue_at(user_id, app_id, secret, ttl, now()?)
    }

    /// [`issue`](Self::issue) with an explicit issue time (duration since the
    /// Unix epoch).
    ///
    /// # Errors
    ///
    /// Returns an internal error if the times overflow or encoding fails.
    pub fn issue_at(
        &self,
        user_id: i64,
        app_id: i64,
        secret: &[u8],
        ttl: Duration,
        issued_at: Duration,
    ) -> Result<String, Error> {
        let expires_at = issued_at.checked_add(ttl).ok_or_else(|| {
            Error::internal("token expiry overflow", anyhow::anyhow!("ttl {ttl:?}"))
        })?;

        let claims = TokenClaims {
            sub: user_id,
            app_id,
            iat: numeric_date(unix_millis(issued_at)?),
            exp: numeric_date(unix_millis(expires_at)?),
        };

        sign(&TokenHeader::hs256(), &claims, secret)
    }

    /// Validate `token` for `app_id` and return the user id it was issued to.
    ///
    /// # Errors
    ///
    /// `TokenInvalid` for anything structurally or cryptographically wrong,
    /// `TokenExpired` once `exp` has passed.
    pub fn parse(&self, token: &str, app_id: i64, secret: &[u8]) -> Result<i64, Error> {
        self.parse_at(token, app_id, secret, now()?)
    }

    /// [`parse`](Self::parse) with an explicit validation time.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    pub fn parse_at(
        &self,
        token: &str,
        app_id: i64,
        secret: &[u8],
        now: Duration,
    ) -> Result<i64, Error> {
        let claims = verify(token, secret)?;

        if claims.app_id != app_id {
            return Err(Error::TokenInvalid);
        }

        let expires_at = numeric_date_millis(claims.exp).ok_or(Error::TokenInvalid)?;
        let now = unix_millis(now.saturating_sub(self.leeway))?;
        if expires_at <= now {
            return Err(Error::TokenExpired);
        }

        Ok(claims.sub)
    }
}

fn sign<C: Serialize>(header: &TokenHeader, claims: &C, secret: &[u8]) -> Result<String, Error> {
    let header_b64 = b64e_json(header)?;
    let claims_b64 = b64e_json(claims)?;
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| Error::internal("failed to initialize token signer", anyhow::anyhow!(e)))?;
    mac.update(signing_input.as_bytes());
    let signature_b64 = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature_b64}"))
}

fn verify(token: &str, secret: &[u8]) -> Result<TokenClaims, Error> {
    let mut parts = token.split('.');
    let header_b64 = parts.next().ok_or(Error::TokenInvalid)?;
    let claims_b64 = parts.next().ok_or(Error::TokenInvalid)?;
    let sig_b64 = parts.next().ok_or(Error::TokenInvalid)?;
    if parts.next().is_some() {
        return Err(Error::TokenInvalid);
    }

    let header: TokenHeader = b64d_json(header_b64)?;
    if header.alg != ALG {
        return Err(Error::TokenInvalid);
    }

    let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| Error::TokenInvalid)?;
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| Error::internal("failed to initialize token verifier", anyhow::anyhow!(e)))?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(claims_b64.as_bytes());
    // verify_slice compares in constant time
    mac.verify_slice(&signature).map_err(|_| Error::TokenInvalid)?;

    b64d_json(claims_b64)
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value).map_err(|e| Error::internal("failed to encode token", e))?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| Error::TokenInvalid)?;
    serde_json::from_slice(&bytes).map_err(|_| Error::TokenInvalid)
}

fn now() -> Result<Duration, Error> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::internal("system clock is before the Unix epoch", e))
}

fn unix_millis(at: Duration) -> Result<i64, Error> {
    i64::try_from(at.as_millis()).map_err(|e| Error::internal("timestamp out of range", e))
}

// Millisecond timestamps stay well below 2^53, so the conversion is exact.
#[allow(clippy::cast_precision_loss)]
fn numeric_date(millis: i64) -> f64 {
    millis as f64 / 1000.0
}

#[allow(clippy::cast_possible_truncation)]
fn numeric_date_millis(date: f64) -> Option<i64> {
    let millis = (date * 1000.0).round();
    if millis.is_finite() && millis.abs() < 9.0e15 {
        Some(millis as i64)
    } else {
        None
    }
}
