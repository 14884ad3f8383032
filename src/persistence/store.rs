use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::model::{OwnerId, Record, MANAGED_FIELDS};
use crate::error::{Error, ErrorContext};
use crate::Result;

/// Owner-scoped record storage.
///
/// Every operation takes the caller's [`OwnerId`]. A record that belongs to
/// someone else is indistinguishable from one that does not exist.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Store `draft` as a new record. The store assigns `id`, owner and
    /// creation time, ignoring whatever the draft carried.
    async fn create_record(&self, owner: &OwnerId, draft: R) -> Result<R>;

    /// Apply a shallow JSON patch: top-level fields in `patch` replace the
    /// record's. `id`, `user_id` and `created_at` cannot be patched.
    async fn update_record(&self, owner: &OwnerId, id: Uuid, patch: Value) -> Result<R>;

    async fn delete_record(&self, owner: &OwnerId, id: Uuid) -> Result<bool>;

    async fn get_record(&self, owner: &OwnerId, id: Uuid) -> Result<Option<R>>;

    /// All of `owner`'s records, oldest first.
    async fn list_records(&self, owner: &OwnerId) -> Result<Vec<R>>;
}

/// Merge `patch` into `record`'s JSON form and decode the result.
pub fn apply_patch<R: Record>(record: &R, patch: Value) -> Result<R> {
    let Value::Object(patch) = patch else {
        return Err(Error::validation_with_context(
            "record patch must be a JSON object",
            ErrorContext::new().with_source(R::COLLECTION),
        ));
    };
    if let Some(field) = patch.keys().find(|k| MANAGED_FIELDS.contains(&k.as_str())) {
        return Err(Error::validation_with_context(
            format!("field '{}' is managed by the store", field),
            ErrorContext::new()
                .with_field_path(format!("{}.{}", R::COLLECTION, field))
                .with_source(R::COLLECTION),
        ));
    }

    let mut current = serde_json::to_value(record)?;
    if let Value::Object(ref mut fields) = current {
        fields.extend(patch);
    }
    serde_json::from_value(current).map_err(|e| {
        Error::validation_with_context(
            format!("patch does not fit the record: {}", e),
            ErrorContext::new().with_source(R::COLLECTION),
        )
    })
}

pub(crate) fn not_found<R: Record>(id: Uuid) -> Error {
    Error::validation_with_context(
        format!("{} record {} not found", R::COLLECTION, id),
        ErrorContext::new()
            .with_field_path(format!("{}.id", R::COLLECTION))
            .with_source("persistence"),
    )
}

/// In-process [`RecordStore`], for tests and offline use.
pub struct MemoryRecordStore<R> {
    records: RwLock<HashMap<Uuid, R>>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> MemoryRecordStore<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            _marker: PhantomData,
        }
    }

    /// Number of records across all owners.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<R: Record> Default for MemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryRecordStore<R> {
    async fn create_record(&self, owner: &OwnerId, mut draft: R) -> Result<R> {
        let id = Uuid::new_v4();
        draft.assign(id, owner.clone(), Utc::now());
        self.records.write().await.insert(id, draft.clone());
        debug!(collection = R::COLLECTION, %id, owner = %owner, "record created");
        Ok(draft)
    }

    async fn update_record(&self, owner: &OwnerId, id: Uuid, patch: Value) -> Result<R> {
        let mut records = self.records.write().await;
        let existing = records
            .get(&id)
            .filter(|r| r.owner() == owner)
            .ok_or_else(|| not_found::<R>(id))?;
        let mut updated = apply_patch(existing, patch)?;
        updated.touch(Utc::now());
        records.insert(id, updated.clone());
        debug!(collection = R::COLLECTION, %id, "record updated");
        Ok(updated)
    }

    async fn delete_record(&self, owner: &OwnerId, id: Uuid) -> Result<bool> {
        let mut records = self.records.write().await;
        if records.get(&id).is_some_and(|r| r.owner() == owner) {
            records.remove(&id);
            debug!(collection = R::COLLECTION, %id, "record deleted");
            return Ok(true);
        }
        Ok(false)
    }

    async fn get_record(&self, owner: &OwnerId, id: Uuid) -> Result<Option<R>> {
        Ok(self
            .records
            .read()
            .await
            .get(&id)
            .filter(|r| r.owner() == owner)
            .cloned())
    }

    async fn list_records(&self, owner: &OwnerId) -> Result<Vec<R>> {
        let mut owned: Vec<R> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.owner() == owner)
            .cloned()
            .collect();
        owned.sort_by_key(|r| (r.created_at(), r.id()));
        Ok(owned)
    }
}
