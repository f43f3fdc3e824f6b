//! Document storage for entry metadata
//!
//! Every document lives at `users/{user_id}/entries/{date}`. Writes merge into
//! the existing document; the last write wins.

mod entries;
mod firestore;
mod memory;

use std::future::Future;

use crate::models::{DateKey, EntryRecord, Mood};
use crate::Result;

pub use entries::{transform_for_read, EntryRepository};
pub use firestore::FirestoreStore;
pub use memory::MemoryDocumentStore;

/// Fields to write into an entry document.
///
/// `None` leaves the stored field untouched. `updated_at` is stamped by
/// [`EntryRepository::save`] and overrides whatever the caller set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryUpdate {
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
    pub mood: Option<Option<Mood>>,
    pub is_favorite: Option<bool>,
    pub images: Option<Vec<String>>,
    pub audio_notes: Option<Vec<String>>,
    pub updated_at: Option<String>,
}

impl EntryUpdate {
    /// Update that only flips the favorite flag.
    #[must_use]
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::default()
        }
    }

    /// Apply this update on top of `record`.
    pub fn merge_into(self, record: &mut EntryRecord) {
        if let Some(text) = self.text {
            record.text = text;
        }
        if let Some(tags) = self.tags {
            record.tags = tags;
        }
        if let Some(mood) = self.mood {
            record.mood = mood;
        }
        if let Some(is_favorite) = self.is_favorite {
            record.is_favorite = is_favorite;
        }
        if let Some(images) = self.images {
            record.images = images;
        }
        if let Some(audio_notes) = self.audio_notes {
            record.audio_notes = audio_notes;
        }
        if let Some(updated_at) = self.updated_at {
            record.updated_at = Some(updated_at);
        }
    }
}

impl From<EntryRecord> for EntryUpdate {
    fn from(record: EntryRecord) -> Self {
        Self {
            text: Some(record.text),
            tags: Some(record.tags),
            mood: Some(record.mood),
            is_favorite: Some(record.is_favorite),
            images: Some(record.images),
            audio_notes: Some(record.audio_notes),
            updated_at: record.updated_at,
        }
    }
}

/// Per-user document store for journal entries.
pub trait DocumentStore {
    /// Fetch one entry; `None` when no document exists for that day.
    fn get(
        &self,
        user_id: &str,
        date: DateKey,
    ) -> impl Future<Output = Result<Option<EntryRecord>>> + Send;

    /// Merge `update` into the document for `date`, creating it if needed.
    fn set_merge(
        &self,
        user_id: &str,
        date: DateKey,
        update: &EntryUpdate,
    ) -> impl Future<Output = Result<()>> + Send;

    /// All entries, most recently updated first.
    fn list(&self, user_id: &str)
        -> impl Future<Output = Result<Vec<(DateKey, EntryRecord)>>> + Send;

    /// Entries whose date lies in `from..=to`, oldest first.
    fn list_range(
        &self,
        user_id: &str,
        from: DateKey,
        to: DateKey,
    ) -> impl Future<Output = Result<Vec<(DateKey, EntryRecord)>>> + Send;
}
