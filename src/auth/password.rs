//! One-way salted password hashing.

use anyhow::{Context, Result};

/// Cost factor for bcrypt, balancing brute-force resistance against login latency.
const HASH_COST: u32 = 10;

/// Hash a plaintext password with a per-call random salt.
///
/// # Errors
///
/// Returns an error if the underlying hash routine fails.
pub fn hash_password(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, HASH_COST).context("failed to hash password")
}

/// Compare a plaintext password against a stored hash.
///
/// A malformed hash is treated as a non-match rather than an error.
#[must_use]
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}
