//! Time-bounded signed tokens for identity, email verification and password reset.
//!
//! Tokens are self-contained HS256 assertions; nothing is persisted. Identity and
//! email-verification tokens are signed with the process-wide shared secret.
//! Password-reset tokens are signed with a per-account secret derived from the
//! shared secret and the account's current password hash, so a successful reset
//! invalidates every previously issued reset token without a revocation list.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identity tokens are valid for three days.
pub const IDENTITY_TOKEN_TTL_SECONDS: i64 = 3 * 24 * 60 * 60;

/// Reset tokens are valid for twenty minutes.
pub const RESET_TOKEN_TTL_SECONDS: i64 = 20 * 60;

/// Claims carried by identity and email-verification tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by password-reset tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Per-account signing secret for reset tokens: shared secret plus the
/// account's current password hash. Once the password changes the old
/// secret is gone and outstanding reset tokens stop verifying.
#[must_use]
pub fn reset_secret(shared_secret: &str, password_hash: &str) -> String {
    format!("{shared_secret}{password_hash}")
}

/// Issue an identity token for the given subject.
///
/// # Errors
///
/// Returns an error if signing fails.
pub fn issue_identity_token(secret: &str, subject: &str, ttl_seconds: i64) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = IdentityClaims {
        sub: subject.to_string(),
        iat: now,
        exp: now + ttl_seconds,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("failed to sign identity token")
}

/// Issue a password-reset token bound to the subject and email.
///
/// # Errors
///
/// Returns an error if signing fails.
pub fn issue_reset_token(
    secret: &str,
    subject: &str,
    email: &str,
    ttl_seconds: i64,
) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = ResetClaims {
        sub: subject.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + ttl_seconds,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("failed to sign reset token")
}

/// Verify an identity token. `None` means the token is invalid: bad
/// signature, malformed, or expired. Claims are never trusted before the
/// signature check passes.
#[must_use]
pub fn verify_identity_token(secret: &str, token: &str) -> Option<IdentityClaims> {
    match decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    ) {
        Ok(data) => Some(data.claims),
        Err(err) => {
            debug!("identity token rejected: {err}");
            None
        }
    }
}

/// Verify a password-reset token against a per-account derived secret.
#[must_use]
pub fn verify_reset_token(secret: &str, token: &str) -> Option<ResetClaims> {
    match decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    ) {
        Ok(data) => Some(data.claims),
        Err(err) => {
            debug!("reset token rejected: {err}");
            None
        }
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // No leeway: an expired token is expired.
    validation.leeway = 0;
    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn identity_token_round_trips() -> Result<()> {
        let token = issue_identity_token("secret", "account-1", IDENTITY_TOKEN_TTL_SECONDS)?;
        let claims = verify_identity_token("secret", &token);
        assert_eq!(claims.map(|c| c.sub), Some("account-1".to_string()));
        Ok(())
    }

    #[test]
    fn identity_token_rejects_wrong_secret() -> Result<()> {
        let token = issue_identity_token("secret", "account-1", IDENTITY_TOKEN_TTL_SECONDS)?;
        assert!(verify_identity_token("other", &token).is_none());
        Ok(())
    }

    #[test]
    fn identity_token_rejects_garbage() {
        assert!(verify_identity_token("secret", "not.a.token").is_none());
        assert!(verify_identity_token("secret", "").is_none());
    }

    #[test]
    fn expired_identity_token_is_invalid() -> Result<()> {
        let token = issue_identity_token("secret", "account-1", -60)?;
        assert!(verify_identity_token("secret", &token).is_none());
        Ok(())
    }

    #[test]
    fn reset_token_round_trips_with_derived_secret() -> Result<()> {
        let secret = reset_secret("shared", "$2b$10$hash");
        let token = issue_reset_token(&secret, "account-1", "a@b.com", RESET_TOKEN_TTL_SECONDS)?;
        let claims = verify_reset_token(&secret, &token).expect("token should verify");
        assert_eq!(claims.sub, "account-1");
        assert_eq!(claims.email, "a@b.com");
        Ok(())
    }

    #[test]
    fn reset_token_stops_verifying_once_hash_changes() -> Result<()> {
        let old = reset_secret("shared", "$2b$10$old-hash");
        let token = issue_reset_token(&old, "account-1", "a@b.com", RESET_TOKEN_TTL_SECONDS)?;

        let new = reset_secret("shared", "$2b$10$new-hash");
        assert!(verify_reset_token(&new, &token).is_none());
        assert!(verify_reset_token(&old, &token).is_some());
        Ok(())
    }

    #[test]
    fn expired_reset_token_is_invalid() -> Result<()> {
        let secret = reset_secret("shared", "$2b$10$hash");
        let token = issue_reset_token(&secret, "account-1", "a@b.com", -1)?;
        assert!(verify_reset_token(&secret, &token).is_none());
        Ok(())
    }
}
