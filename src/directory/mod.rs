//! Persistent store of clinic-staff accounts.
//!
//! The account workflow only talks to the [`UserDirectory`] trait; the store
//! behind it owns persistence and uniqueness enforcement. [`postgres`] is the
//! production backend, [`memory`] a process-local backend for local dev and
//! workflow tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryDirectory;
pub use postgres::PgDirectory;

/// Staff role, a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Nurse,
    Admin,
}

impl Role {
    /// Parse the wire form; anything outside the closed set is rejected.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "doctor" => Some(Self::Doctor),
            "nurse" => Some(Self::Nurse),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Nurse => "nurse",
            Self::Admin => "admin",
        }
    }
}

/// A persisted clinic-staff account.
///
/// `email` is stored normalized (trimmed, lowercased) and is unique across the
/// directory. `password_hash` never leaves the hasher/directory boundary.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub profile_photo_url: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating an account. `verified` always starts false.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub profile_photo_url: String,
}

/// Outcome of an account insert. The store's uniqueness constraint is the
/// authoritative guard: a rejection at write time surfaces here as `Conflict`
/// even when a pre-check raced and passed.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(Account),
    Conflict,
}

/// Narrow interface the account workflow consumes.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up an account by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    /// Insert a new, unverified account.
    async fn create(&self, fields: NewAccount) -> Result<CreateOutcome>;

    /// Persist mutated fields (`password_hash`, `verified`, photo URL) in place.
    async fn save(&self, account: &Account) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_closed_set_only() {
        assert_eq!(Role::parse("doctor"), Some(Role::Doctor));
        assert_eq!(Role::parse("nurse"), Some(Role::Nurse));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("surgeon"), None);
        assert_eq!(Role::parse("Doctor"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn role_round_trips_through_wire_form() {
        for role in [Role::Doctor, Role::Nurse, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }
}
