//! Signed password-reset tokens.
//!
//! A token is `base64url(email) . expiry_unix . base64url(hmac)` where the
//! MAC is HMAC-SHA256 over `email:expiry_unix` keyed with the session
//! secret. Tokens are self-contained: verification needs no database row.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// How long an issued reset token stays valid.
const TOKEN_TTL_MINUTES: i64 = 60;

/// Errors from reset-token verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResetTokenError {
    /// Token does not have the expected three-part shape.
    #[error("malformed reset token")]
    Malformed,

    /// Token has passed its expiry time.
    #[error("reset token expired")]
    Expired,

    /// The MAC does not match the payload.
    #[error("invalid reset token signature")]
    InvalidSignature,
}

/// Issues and verifies signed password-reset tokens.
#[derive(Clone)]
pub struct ResetTokenService {
    key: Vec<u8>,
}

impl ResetTokenService {
    /// Create a token service keyed with the application secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: secret.expose_secret().as_bytes().to_vec(),
        }
    }

    /// Issue a token for this email, valid for one hour.
    #[must_use]
    pub fn issue(&self, email: &str) -> String {
        self.issue_at(email, Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES))
    }

    /// Verify a token and return the email it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`ResetTokenError`] when the token is malformed, expired, or
    /// carries a bad signature.
    pub fn verify(&self, token: &str) -> Result<String, ResetTokenError> {
        let mut parts = token.splitn(3, '.');
        let (Some(email_b64), Some(expiry_raw), Some(mac_b64)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(ResetTokenError::Malformed);
        };

        let email_bytes = URL_SAFE_NO_PAD
            .decode(email_b64)
            .map_err(|_| ResetTokenError::Malformed)?;
        let email = String::from_utf8(email_bytes).map_err(|_| ResetTokenError::Malformed)?;
        let expiry_unix: i64 = expiry_raw.parse().map_err(|_| ResetTokenError::Malformed)?;
        let mac_bytes = URL_SAFE_NO_PAD
            .decode(mac_b64)
            .map_err(|_| ResetTokenError::Malformed)?;

        // Signature first: an attacker must not learn whether a forged
        // payload would otherwise have been accepted.
        let mut mac = self.keyed_mac();
        mac.update(payload(&email, expiry_unix).as_bytes());
        mac.verify_slice(&mac_bytes)
            .map_err(|_| ResetTokenError::InvalidSignature)?;

        if Utc::now().timestamp() > expiry_unix {
            return Err(ResetTokenError::Expired);
        }

        Ok(email)
    }

    fn issue_at(&self, email: &str, expires_at: DateTime<Utc>) -> String {
        let expiry_unix = expires_at.timestamp();
        let mut mac = self.keyed_mac();
        mac.update(payload(email, expiry_unix).as_bytes());
        let signature = mac.finalize().into_bytes();

        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(email.as_bytes()),
            expiry_unix,
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    fn keyed_mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        #[allow(clippy::expect_used)]
        HmacSha256::new_from_slice(&self.key).expect("HMAC key of any length is valid")
    }
}

fn payload(email: &str, expiry_unix: i64) -> String {
    format!("{email}:{expiry_unix}")
}
