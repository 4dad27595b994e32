//! In-memory account directory for local dev and workflow tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Account, CreateOutcome, NewAccount, UserDirectory};

/// Process-local directory with the same uniqueness behavior as the
/// Postgres backend. Not durable; every restart starts empty.
#[derive(Default)]
pub struct MemoryDirectory {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn create(&self, fields: NewAccount) -> Result<CreateOutcome> {
        let mut accounts = self.accounts.lock().await;
        if accounts.values().any(|a| a.email == fields.email) {
            return Ok(CreateOutcome::Conflict);
        }
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email: fields.email,
            username: fields.username,
            password_hash: fields.password_hash,
            role: fields.role,
            profile_photo_url: fields.profile_photo_url,
            verified: false,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(account.id, account.clone());
        Ok(CreateOutcome::Created(account))
    }

    async fn save(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.lock().await;
        let mut updated = account.clone();
        updated.updated_at = Utc::now();
        accounts.insert(updated.id, updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Role;
    use anyhow::Result;

    fn fields(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            username: "siyabonga".to_string(),
            password_hash: "$2b$10$hash".to_string(),
            role: Role::Doctor,
            profile_photo_url: String::new(),
        }
    }

    #[tokio::test]
    async fn create_starts_unverified_and_is_findable() -> Result<()> {
        let directory = MemoryDirectory::new();
        let CreateOutcome::Created(account) = directory.create(fields("a@b.com")).await? else {
            panic!("expected creation");
        };
        assert!(!account.verified);

        let by_email = directory.find_by_email("a@b.com").await?;
        assert_eq!(by_email.map(|a| a.id), Some(account.id));

        let by_id = directory.find_by_id(account.id).await?;
        assert_eq!(by_id.map(|a| a.email), Some("a@b.com".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> Result<()> {
        let directory = MemoryDirectory::new();
        assert!(matches!(
            directory.create(fields("a@b.com")).await?,
            CreateOutcome::Created(_)
        ));
        assert!(matches!(
            directory.create(fields("a@b.com")).await?,
            CreateOutcome::Conflict
        ));
        Ok(())
    }

    #[tokio::test]
    async fn save_updates_in_place() -> Result<()> {
        let directory = MemoryDirectory::new();
        let CreateOutcome::Created(mut account) = directory.create(fields("a@b.com")).await? else {
            panic!("expected creation");
        };

        account.verified = true;
        account.password_hash = "$2b$10$other".to_string();
        directory.save(&account).await?;

        let stored = directory
            .find_by_id(account.id)
            .await?
            .expect("account should exist");
        assert!(stored.verified);
        assert_eq!(stored.password_hash, "$2b$10$other");
        Ok(())
    }
}
