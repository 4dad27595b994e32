//! Postgres-backed account directory.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE accounts (
//!     id UUID PRIMARY KEY,
//!     email TEXT NOT NULL UNIQUE,
//!     username TEXT NOT NULL,
//!     password_hash TEXT NOT NULL,
//!     role TEXT NOT NULL,
//!     profile_photo_url TEXT NOT NULL DEFAULT '',
//!     verified BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::{Account, CreateOutcome, NewAccount, Role, UserDirectory};

const ACCOUNT_COLUMNS: &str =
    "id, email, username, password_hash, role, profile_photo_url, verified, created_at, updated_at";

#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account> {
    let role: String = row.get("role");
    let role = Role::parse(&role).ok_or_else(|| anyhow!("unknown role in directory: {role}"))?;
    Ok(Account {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        role,
        profile_photo_url: row.get("profile_photo_url"),
        verified: row.get("verified"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl UserDirectory for PgDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up account by email")?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up account by id")?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn create(&self, fields: NewAccount) -> Result<CreateOutcome> {
        let query = format!(
            "INSERT INTO accounts \
                (id, email, username, password_hash, role, profile_photo_url, verified) \
             VALUES ($1, $2, $3, $4, $5, $6, FALSE) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&fields.email)
            .bind(&fields.username)
            .bind(&fields.password_hash)
            .bind(fields.role.as_str())
            .bind(&fields.profile_photo_url)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(CreateOutcome::Created(account_from_row(&row)?)),
            // The unique index on email is the authoritative guard against
            // concurrent registrations that both pass the pre-check.
            Err(err) if is_unique_violation(&err) => Ok(CreateOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert account"),
        }
    }

    async fn save(&self, account: &Account) -> Result<()> {
        let query = "UPDATE accounts \
             SET password_hash = $2, profile_photo_url = $3, verified = $4, updated_at = NOW() \
             WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(account.id)
            .bind(&account.password_hash)
            .bind(&account.profile_photo_url)
            .bind(account.verified)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to save account")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("account {} no longer exists", account.id));
        }
        Ok(())
    }
}
