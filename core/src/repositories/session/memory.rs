//! In-process session store.
//!
//! Every operation takes one mutex over the whole family map, which makes
//! `rotate` trivially linearizable. Suitable for a single server instance and
//! for tests; sessions do not survive a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::token::RefreshRecord;
use crate::errors::StoreError;

use super::trait_::SessionStore;

#[derive(Debug)]
struct Family {
    /// Oldest first; the last entry is the head
    records: Vec<RefreshRecord>,
    revoked: bool,
}

impl Family {
    fn head(&self) -> Option<&RefreshRecord> {
        self.records.last()
    }
}

#[derive(Debug, Default)]
struct State {
    families: HashMap<Uuid, Family>,
    /// Token ids of the families currently held
    issued_token_ids: HashSet<Uuid>,
}

/// Session store kept in process memory
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    state: Mutex<State>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of families currently held
    pub async fn family_count(&self) -> usize {
        self.state.lock().await.families.len()
    }

    /// Number of token ids held for duplicate detection
    pub async fn token_id_count(&self) -> usize {
        self.state.lock().await.issued_token_ids.len()
    }
}

fn with_flag(record: &RefreshRecord, revoked: bool) -> RefreshRecord {
    let mut record = record.clone();
    record.revoked = revoked;
    record
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, record: RefreshRecord) -> Result<RefreshRecord, StoreError> {
        let mut state = self.state.lock().await;

        if !state.issued_token_ids.insert(record.token_id) {
            return Err(StoreError::DuplicateTokenId {
                token_id: record.token_id,
            });
        }
        if state.families.contains_key(&record.family_id) {
            return Err(StoreError::Backend {
                message: format!("family {} already exists", record.family_id),
            });
        }

        state.families.insert(
            record.family_id,
            Family {
                records: vec![record.clone()],
                revoked: record.revoked,
            },
        );
        Ok(record)
    }

    async fn lookup(&self, family_id: Uuid) -> Result<RefreshRecord, StoreError> {
        let state = self.state.lock().await;
        let family = state
            .families
            .get(&family_id)
            .ok_or(StoreError::NotFound { family_id })?;
        family
            .head()
            .map(|head| with_flag(head, family.revoked))
            .ok_or(StoreError::NotFound { family_id })
    }

    async fn history(&self, family_id: Uuid) -> Result<Vec<RefreshRecord>, StoreError> {
        let state = self.state.lock().await;
        let family = state
            .families
            .get(&family_id)
            .ok_or(StoreError::NotFound { family_id })?;
        Ok(family
            .records
            .iter()
            .map(|record| with_flag(record, family.revoked))
            .collect())
    }

    async fn rotate(
        &self,
        family_id: Uuid,
        old_token_id: Uuid,
        next: RefreshRecord,
    ) -> Result<RefreshRecord, StoreError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let family = state
            .families
            .get_mut(&family_id)
            .ok_or(StoreError::NotFound { family_id })?;

        let head_matches = family.head().map(|head| head.token_id) == Some(old_token_id);
        if family.revoked || !head_matches || next.family_id != family_id {
            return Err(StoreError::Conflict { family_id });
        }
        if !state.issued_token_ids.insert(next.token_id) {
            return Err(StoreError::DuplicateTokenId {
                token_id: next.token_id,
            });
        }

        let mut next = next;
        next.parent_token_id = Some(old_token_id);
        family.records.push(next.clone());
        Ok(next)
    }

    async fn revoke(&self, family_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let family = state
            .families
            .get_mut(&family_id)
            .ok_or(StoreError::NotFound { family_id })?;

        let newly_revoked = !family.revoked;
        family.revoked = true;
        for record in family.records.iter_mut() {
            record.revoked = true;
        }
        Ok(newly_revoked)
    }

    async fn is_revoked(&self, family_id: Uuid) -> Result<bool, StoreError> {
        let state = self.state.lock().await;
        state
            .families
            .get(&family_id)
            .map(|family| family.revoked)
            .ok_or(StoreError::NotFound { family_id })
    }

    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError> {
        let mut state = self.state.lock().await;
        let mut count = 0;

        for family in state.families.values_mut() {
            let owned = family.head().map(|head| head.subject == subject).unwrap_or(false);
            if owned && !family.revoked {
                family.revoked = true;
                for record in family.records.iter_mut() {
                    record.revoked = true;
                }
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let expired: Vec<Uuid> = state
            .families
            .iter()
            .filter(|(_, family)| family.head().map(|head| head.is_expired_at(now)).unwrap_or(true))
            .map(|(family_id, _)| *family_id)
            .collect();

        for family_id in &expired {
            if let Some(family) = state.families.remove(family_id) {
                for record in &family.records {
                    state.issued_token_ids.remove(&record.token_id);
                }
            }
        }

        Ok(expired.len())
    }
}
