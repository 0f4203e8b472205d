//! MySQL implementation of the AccountRepository trait.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};

use rserve_core::domain::entities::{Account, Role};
use rserve_core::errors::DomainError;
use rserve_core::repositories::AccountRepository;

/// Reads dashboard accounts from `admin_accounts`
pub struct MySqlAccountRepository {
    pool: MySqlPool,
}

impl MySqlAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for MySqlAccountRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, DomainError> {
        let query = r#"
            SELECT restaurant_id, hashed_pw, role
            FROM admin_accounts
            WHERE restaurant_id = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find account: {}", e),
            })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let role: String = row.try_get("role").map_err(|e| DomainError::Internal {
            message: format!("Failed to get role: {}", e),
        })?;

        Ok(Some(Account {
            id: row.try_get("restaurant_id").map_err(|e| DomainError::Internal {
                message: format!("Failed to get restaurant_id: {}", e),
            })?,
            password_hash: row.try_get("hashed_pw").map_err(|e| DomainError::Internal {
                message: format!("Failed to get hashed_pw: {}", e),
            })?,
            role: role
                .parse::<Role>()
                .map_err(|message| DomainError::Internal { message })?,
        }))
    }
}
