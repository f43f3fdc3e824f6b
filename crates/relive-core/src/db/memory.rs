//! In-memory document store (primarily for tests and offline runs).

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::{DocumentStore, EntryUpdate};
use crate::models::{DateKey, EntryRecord};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct MemoryDocuments {
    documents: BTreeMap<(String, DateKey), EntryRecord>,
    writes: usize,
    fail_writes: bool,
}

/// Document store kept in process memory with Firestore merge semantics.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<Mutex<MemoryDocuments>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` as-is, bypassing merge and write counting.
    pub async fn insert(&self, user_id: &str, date: DateKey, record: EntryRecord) {
        self.inner
            .lock()
            .await
            .documents
            .insert((user_id.to_string(), date), record);
    }

    /// Number of successful merge writes so far.
    pub async fn writes(&self) -> usize {
        self.inner.lock().await.writes
    }

    /// Make every write fail (or succeed again).
    pub async fn fail_writes(&self, fail: bool) {
        self.inner.lock().await.fail_writes = fail;
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, user_id: &str, date: DateKey) -> Result<Option<EntryRecord>> {
        Ok(self
            .inner
            .lock()
            .await
            .documents
            .get(&(user_id.to_string(), date))
            .cloned())
    }

    async fn set_merge(&self, user_id: &str, date: DateKey, update: &EntryUpdate) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.fail_writes {
            return Err(Error::DocumentStore(format!(
                "{date}: simulated write failure"
            )));
        }

        let record = inner
            .documents
            .entry((user_id.to_string(), date))
            .or_default();
        update.clone().merge_into(record);
        inner.writes += 1;
        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<(DateKey, EntryRecord)>> {
        let inner = self.inner.lock().await;
        // Ordering by updatedAt leaves out documents that never had one.
        let mut entries: Vec<(DateKey, EntryRecord)> = inner
            .documents
            .iter()
            .filter(|((owner, _), record)| owner == user_id && record.updated_at.is_some())
            .map(|((_, date), record)| (*date, record.clone()))
            .collect();
        entries.sort_by(|(_, a), (_, b)| b.updated_at.cmp(&a.updated_at));
        Ok(entries)
    }

    async fn list_range(
        &self,
        user_id: &str,
        from: DateKey,
        to: DateKey,
    ) -> Result<Vec<(DateKey, EntryRecord)>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .documents
            .iter()
            .filter(|((owner, date), _)| owner == user_id && (from..=to).contains(date))
            .map(|((_, date), record)| (*date, record.clone()))
            .collect())
    }
}
