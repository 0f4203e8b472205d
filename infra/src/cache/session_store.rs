//! Redis implementation of the SessionStore trait.
//!
//! Layout under the configured prefix:
//! - `family:<id>` hash: `head`, `revoked`, `subject`, `record` (head as JSON)
//! - `family:<id>:history` list of every record as JSON, oldest first
//! - `token:<id>` marker so a token id is never minted twice
//! - `subject:<subject>` set of family ids, for revoke-all
//!
//! Create, rotate and revoke run as Lua scripts so each one is atomic on the
//! server. Family keys carry `EXPIREAT` of the family expiry, so Redis drops
//! expired families on its own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use tracing::debug;
use uuid::Uuid;

use rserve_core::domain::entities::RefreshRecord;
use rserve_core::errors::StoreError;
use rserve_core::repositories::SessionStore;

use rserve_shared::config::CacheConfig;

use super::redis_client::RedisClient;
use crate::backend_error;

// KEYS: family, history, token marker, subject index
// ARGV: family id, token id, record json, expire-at, subject
const CREATE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[3]) == 1 then return -2 end
if redis.call('EXISTS', KEYS[1]) == 1 then return -3 end
redis.call('HSET', KEYS[1], 'head', ARGV[2], 'revoked', '0', 'subject', ARGV[5], 'record', ARGV[3])
redis.call('RPUSH', KEYS[2], ARGV[3])
redis.call('SET', KEYS[3], ARGV[1])
redis.call('SADD', KEYS[4], ARGV[1])
redis.call('EXPIREAT', KEYS[1], ARGV[4])
redis.call('EXPIREAT', KEYS[2], ARGV[4])
redis.call('EXPIREAT', KEYS[3], ARGV[4])
return 1
"#;

// KEYS: family, history, new token marker
// ARGV: old token id, new token id, record json, expire-at, family id
const ROTATE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then return 0 end
if redis.call('HGET', KEYS[1], 'revoked') == '1' then return -1 end
if redis.call('HGET', KEYS[1], 'head') ~= ARGV[1] then return -1 end
if redis.call('EXISTS', KEYS[3]) == 1 then return -2 end
redis.call('HSET', KEYS[1], 'head', ARGV[2], 'record', ARGV[3])
redis.call('RPUSH', KEYS[2], ARGV[3])
redis.call('SET', KEYS[3], ARGV[5])
redis.call('EXPIREAT', KEYS[1], ARGV[4])
redis.call('EXPIREAT', KEYS[2], ARGV[4])
redis.call('EXPIREAT', KEYS[3], ARGV[4])
return 1
"#;

// KEYS: family
const REVOKE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then return 0 end
if redis.call('HGET', KEYS[1], 'revoked') == '1' then return 1 end
redis.call('HSET', KEYS[1], 'revoked', '1')
return 2
"#;

/// Key names of one store
#[derive(Debug, Clone)]
pub(crate) struct SessionKeys {
    config: CacheConfig,
}

impl SessionKeys {
    pub(crate) fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    pub(crate) fn family(&self, family_id: Uuid) -> String {
        self.config.key(&["family", &family_id.to_string()])
    }

    pub(crate) fn history(&self, family_id: Uuid) -> String {
        self.config.key(&["family", &family_id.to_string(), "history"])
    }

    pub(crate) fn token(&self, token_id: Uuid) -> String {
        self.config.key(&["token", &token_id.to_string()])
    }

    pub(crate) fn subject(&self, subject: &str) -> String {
        self.config.key(&["subject", subject])
    }

    pub(crate) fn subject_pattern(&self) -> String {
        self.config.key(&["subject", "*"])
    }
}

/// Redis implementation of SessionStore
pub struct RedisSessionStore {
    client: RedisClient,
    keys: SessionKeys,
    create_script: Script,
    rotate_script: Script,
    revoke_script: Script,
}

impl RedisSessionStore {
    pub fn new(client: RedisClient) -> Self {
        let keys = SessionKeys::new(client.config().clone());
        Self {
            client,
            keys,
            create_script: Script::new(CREATE_SCRIPT),
            rotate_script: Script::new(ROTATE_SCRIPT),
            revoke_script: Script::new(REVOKE_SCRIPT),
        }
    }

    fn conn(&self) -> ConnectionManager {
        self.client.get_connection()
    }

    fn encode(record: &RefreshRecord) -> Result<String, StoreError> {
        serde_json::to_string(record).map_err(|e| backend_error("Failed to serialize record", e))
    }

    fn decode(json: &str, revoked: bool) -> Result<RefreshRecord, StoreError> {
        let mut record: RefreshRecord =
            serde_json::from_str(json).map_err(|e| backend_error("Failed to parse record", e))?;
        record.revoked = revoked;
        Ok(record)
    }

    /// Runs the revoke script: 0 = unknown, 1 = already revoked, 2 = revoked now
    async fn run_revoke(&self, family_id: Uuid) -> Result<i64, StoreError> {
        let mut conn = self.conn();
        self.revoke_script
            .key(self.keys.family(family_id))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| backend_error("Failed to revoke refresh family", e))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, record: RefreshRecord) -> Result<RefreshRecord, StoreError> {
        let json = Self::encode(&record)?;
        let mut conn = self.conn();

        let outcome: i64 = self
            .create_script
            .key(self.keys.family(record.family_id))
            .key(self.keys.history(record.family_id))
            .key(self.keys.token(record.token_id))
            .key(self.keys.subject(&record.subject))
            .arg(record.family_id.to_string())
            .arg(record.token_id.to_string())
            .arg(json)
            .arg(record.expires_at.timestamp())
            .arg(&record.subject)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| backend_error("Failed to create refresh family", e))?;

        match outcome {
            1 => Ok(record),
            -2 => Err(StoreError::DuplicateTokenId {
                token_id: record.token_id,
            }),
            _ => Err(StoreError::Backend {
                message: format!("family {} already exists", record.family_id),
            }),
        }
    }

    async fn lookup(&self, family_id: Uuid) -> Result<RefreshRecord, StoreError> {
        let mut conn = self.conn();
        let (record, revoked): (Option<String>, Option<String>) = redis::cmd("HMGET")
            .arg(self.keys.family(family_id))
            .arg("record")
            .arg("revoked")
            .query_async(&mut conn)
            .await
            .map_err(|e| backend_error("Failed to look up refresh family", e))?;

        match record {
            Some(json) => Self::decode(&json, revoked.as_deref() == Some("1")),
            None => Err(StoreError::NotFound { family_id }),
        }
    }

    async fn history(&self, family_id: Uuid) -> Result<Vec<RefreshRecord>, StoreError> {
        let revoked = self.is_revoked(family_id).await?;

        let mut conn = self.conn();
        let entries: Vec<String> = conn
            .lrange(self.keys.history(family_id), 0, -1)
            .await
            .map_err(|e| backend_error("Failed to load family history", e))?;

        entries
            .iter()
            .map(|json| Self::decode(json, revoked))
            .collect()
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

        let mut next = next;
        next.parent_token_id = Some(old_token_id);
        let json = Self::encode(&next)?;
        let mut conn = self.conn();

        let outcome: i64 = self
            .rotate_script
            .key(self.keys.family(family_id))
            .key(self.keys.history(family_id))
            .key(self.keys.token(next.token_id))
            .arg(old_token_id.to_string())
            .arg(next.token_id.to_string())
            .arg(json)
            .arg(next.expires_at.timestamp())
            .arg(family_id.to_string())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| backend_error("Failed to rotate refresh family", e))?;

        match outcome {
            1 => Ok(next),
            0 => Err(StoreError::NotFound { family_id }),
            -2 => Err(StoreError::DuplicateTokenId {
                token_id: next.token_id,
            }),
            _ => {
                debug!(%family_id, "Rotation lost the compare-and-swap");
                Err(StoreError::Conflict { family_id })
            }
        }
    }

    async fn revoke(&self, family_id: Uuid) -> Result<bool, StoreError> {
        match self.run_revoke(family_id).await? {
            0 => Err(StoreError::NotFound { family_id }),
            2 => Ok(true),
            _ => Ok(false),
        }
    }

    async fn is_revoked(&self, family_id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.conn();
        let revoked: Option<String> = conn
            .hget(self.keys.family(family_id), "revoked")
            .await
            .map_err(|e| backend_error("Failed to read revocation flag", e))?;

        revoked
            .map(|flag| flag == "1")
            .ok_or(StoreError::NotFound { family_id })
    }

    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError> {
        let index = self.keys.subject(subject);
        let mut conn = self.conn();
        let members: Vec<String> = conn
            .smembers(&index)
            .await
            .map_err(|e| backend_error("Failed to read subject index", e))?;

        let mut count = 0;
        for member in members {
            let Ok(family_id) = Uuid::parse_str(&member) else {
                continue;
            };
            match self.run_revoke(family_id).await? {
                2 => count += 1,
                0 => {
                    // family expired; drop it from the index
                    let _: () = conn
                        .srem(&index, &member)
                        .await
                        .map_err(|e| backend_error("Failed to prune subject index", e))?;
                }
                _ => {}
            }
        }

        Ok(count)
    }

    /// Families expire through `EXPIREAT`; this only prunes subject indexes of
    /// families Redis already dropped and returns how many entries went.
    async fn delete_expired(&self, _now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut conn = self.conn();
        let pattern = self.keys.subject_pattern();

        let mut index_keys: Vec<String> = Vec::new();
        {
            let mut iter = conn
                .scan_match::<_, String>(&pattern)
                .await
                .map_err(|e| backend_error("Failed to scan subject indexes", e))?;
            while let Some(key) = iter.next_item().await {
                index_keys.push(key);
            }
        }

        let mut pruned = 0;
        for index in index_keys {
            let members: Vec<String> = conn
                .smembers(&index)
                .await
                .map_err(|e| backend_error("Failed to read subject index", e))?;

            for member in members {
                let Ok(family_id) = Uuid::parse_str(&member) else {
                    continue;
                };
                let exists: bool = conn
                    .exists(self.keys.family(family_id))
                    .await
                    .map_err(|e| backend_error("Failed to check family", e))?;
                if !exists {
                    let _: () = conn
                        .srem(&index, &member)
                        .await
                        .map_err(|e| backend_error("Failed to prune subject index", e))?;
                    pruned += 1;
                }
            }
        }

        Ok(pruned)
    }
}
