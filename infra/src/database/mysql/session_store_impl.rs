//! MySQL implementation of the SessionStore trait.
//!
//! Families live in `refresh_families`, one row each, with the head token id
//! in `current_token_id`. Every minted token is appended to `refresh_tokens`.
//! Rotation is a conditional `UPDATE ... WHERE current_token_id = ?`: the row
//! count tells whether this caller won the swap.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

use rserve_core::domain::entities::{RefreshRecord, Role};
use rserve_core::errors::StoreError;
use rserve_core::repositories::SessionStore;

use crate::backend_error;

const RECORD_COLUMNS: &str = r#"
    t.token_id, t.family_id, t.parent_token_id, t.issued_at, t.expires_at,
    f.subject, f.role, f.family_created_at, f.revoked
"#;

/// MySQL implementation of SessionStore
pub struct MySqlSessionStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlSessionStore {
    /// Create a new MySQL session store
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn parse_uuid(value: &str, column: &str) -> Result<Uuid, StoreError> {
        Uuid::parse_str(value).map_err(|e| backend_error(&format!("Invalid UUID in {}", column), e))
    }

    /// Convert a joined token/family row to a RefreshRecord
    fn row_to_record(row: &MySqlRow) -> Result<RefreshRecord, StoreError> {
        let get_err = |column: &str, e: sqlx::Error| backend_error(&format!("Failed to get {}", column), e);

        let token_id: String = row.try_get("token_id").map_err(|e| get_err("token_id", e))?;
        let family_id: String = row.try_get("family_id").map_err(|e| get_err("family_id", e))?;
        let parent: Option<String> = row
            .try_get("parent_token_id")
            .map_err(|e| get_err("parent_token_id", e))?;
        let role: String = row.try_get("role").map_err(|e| get_err("role", e))?;

        Ok(RefreshRecord {
            family_id: Self::parse_uuid(&family_id, "family_id")?,
            token_id: Self::parse_uuid(&token_id, "token_id")?,
            subject: row.try_get("subject").map_err(|e| get_err("subject", e))?,
            role: role
                .parse::<Role>()
                .map_err(|e| backend_error("Invalid role", e))?,
            family_created_at: row
                .try_get::<DateTime<Utc>, _>("family_created_at")
                .map_err(|e| get_err("family_created_at", e))?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(|e| get_err("issued_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| get_err("expires_at", e))?,
            revoked: row.try_get("revoked").map_err(|e| get_err("revoked", e))?,
            parent_token_id: parent
                .as_deref()
                .map(|p| Self::parse_uuid(p, "parent_token_id"))
                .transpose()?,
        })
    }

    async fn begin(&self) -> Result<Transaction<'static, MySql>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| backend_error("Failed to begin transaction", e))
    }

    async fn insert_token(
        tx: &mut Transaction<'static, MySql>,
        record: &RefreshRecord,
    ) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                token_id, family_id, parent_token_id, issued_at, expires_at
            ) VALUES (?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(record.token_id.to_string())
            .bind(record.family_id.to_string())
            .bind(record.parent_token_id.map(|p| p.to_string()))
            .bind(record.issued_at)
            .bind(record.expires_at)
            .execute(&mut **tx)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db) if db.is_unique_violation() => StoreError::DuplicateTokenId {
                    token_id: record.token_id,
                },
                _ => backend_error("Failed to insert refresh token", e),
            })?;

        Ok(())
    }

    async fn family_exists(&self, family_id: Uuid) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM refresh_families WHERE family_id = ?")
            .bind(family_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend_error("Failed to check family existence", e))?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl SessionStore for MySqlSessionStore {
    async fn create(&self, record: RefreshRecord) -> Result<RefreshRecord, StoreError> {
        let mut tx = self.begin().await?;

        let query = r#"
            INSERT INTO refresh_families (
                family_id, subject, role, current_token_id, family_created_at, expires_at, revoked
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(record.family_id.to_string())
            .bind(&record.subject)
            .bind(record.role.as_str())
            .bind(record.token_id.to_string())
            .bind(record.family_created_at)
            .bind(record.expires_at)
            .bind(record.revoked)
            .execute(&mut *tx)
            .await
            .map_err(|e| backend_error("Failed to insert refresh family", e))?;

        Self::insert_token(&mut tx, &record).await?;

        tx.commit()
            .await
            .map_err(|e| backend_error("Failed to commit refresh family", e))?;

        Ok(record)
    }

    async fn lookup(&self, family_id: Uuid) -> Result<RefreshRecord, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM refresh_families f
            JOIN refresh_tokens t ON t.token_id = f.current_token_id
            WHERE f.family_id = ?
            LIMIT 1
            "#,
            RECORD_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(family_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend_error("Failed to look up refresh family", e))?;

        match row {
            Some(row) => Self::row_to_record(&row),
            None => Err(StoreError::NotFound { family_id }),
        }
    }

    async fn history(&self, family_id: Uuid) -> Result<Vec<RefreshRecord>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM refresh_tokens t
            JOIN refresh_families f ON f.family_id = t.family_id
            WHERE t.family_id = ?
            ORDER BY t.seq ASC
            "#,
            RECORD_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(family_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend_error("Failed to load family history", e))?;

        if rows.is_empty() {
            return Err(StoreError::NotFound { family_id });
        }

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn rotate(
        &self,
        family_id: Uuid,
        old_token_id: Uuid,
        next: RefreshRecord,
    ) -> Result<RefreshRecord, StoreError> {
        if next.family_id != family_id {
            return Err(StoreError::Conflict { family_id });
        }

        let mut tx = self.begin().await?;

        let query = r#"
            UPDATE refresh_families
            SET current_token_id = ?, expires_at = ?
            WHERE family_id = ? AND current_token_id = ? AND revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(next.token_id.to_string())
            .bind(next.expires_at)
            .bind(family_id.to_string())
            .bind(old_token_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| backend_error("Failed to rotate refresh family", e))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| backend_error("Failed to roll back rotation", e))?;
            debug!(%family_id, "Rotation lost the compare-and-swap");
            return if self.family_exists(family_id).await? {
                Err(StoreError::Conflict { family_id })
            } else {
                Err(StoreError::NotFound { family_id })
            };
        }

        let mut next = next;
        next.parent_token_id = Some(old_token_id);
        Self::insert_token(&mut tx, &next).await?;

        tx.commit()
            .await
            .map_err(|e| backend_error("Failed to commit rotation", e))?;

        Ok(next)
    }

    async fn revoke(&self, family_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE refresh_families SET revoked = TRUE WHERE family_id = ? AND revoked = FALSE",
        )
        .bind(family_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| backend_error("Failed to revoke refresh family", e))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if self.family_exists(family_id).await? {
            Ok(false)
        } else {
            Err(StoreError::NotFound { family_id })
        }
    }

    async fn is_revoked(&self, family_id: Uuid) -> Result<bool, StoreError> {
        let revoked: Option<bool> =
            sqlx::query_scalar("SELECT revoked FROM refresh_families WHERE family_id = ?")
                .bind(family_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| backend_error("Failed to read revocation flag", e))?;

        revoked.ok_or(StoreError::NotFound { family_id })
    }

    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError> {
        let result = sqlx::query(
            "UPDATE refresh_families SET revoked = TRUE WHERE subject = ? AND revoked = FALSE",
        )
        .bind(subject)
        .execute(&self.pool)
        .await
        .map_err(|e| backend_error("Failed to revoke subject families", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        // refresh_tokens rows go with their family (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM refresh_families WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| backend_error("Failed to delete expired families", e))?;

        Ok(result.rows_affected() as usize)
    }
}
