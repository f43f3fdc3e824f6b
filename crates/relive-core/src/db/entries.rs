//! Entry repository: user-scoped reads and writes on top of the stores.

use super::{DocumentStore, EntryUpdate};
use crate::auth::AuthState;
use crate::models::{is_local_handle, DateKey, EntryRecord};
use crate::storage::{resolve_signed_url, ObjectStore};
use crate::util::iso_timestamp_now;
use crate::{Error, Result};

/// Reads and writes the signed-in user's entries.
pub struct EntryRepository<'a, D, S> {
    documents: &'a D,
    objects: &'a S,
    bucket: &'a str,
    auth: &'a AuthState,
}

impl<'a, D, S> EntryRepository<'a, D, S>
where
    D: DocumentStore + Sync,
    S: ObjectStore + Sync,
{
    pub const fn new(documents: &'a D, objects: &'a S, bucket: &'a str, auth: &'a AuthState) -> Self {
        Self {
            documents,
            objects,
            bucket,
            auth,
        }
    }

    /// One day's entry with media paths swapped for signed URLs.
    ///
    /// A path that cannot be signed is kept as stored.
    pub async fn get(&self, date: DateKey) -> Result<Option<EntryRecord>> {
        let user_id = self.auth.require_user()?;
        let Some(record) = self.documents.get(user_id, date).await? else {
            return Ok(None);
        };
        Ok(Some(transform_for_read(self.objects, self.bucket, record).await))
    }

    /// Every entry, most recently updated first. Media are left as stored.
    pub async fn list(&self) -> Result<Vec<(DateKey, EntryRecord)>> {
        let user_id = self.auth.require_user()?;
        self.documents.list(user_id).await
    }

    /// Entries between `from` and `to` inclusive, oldest first. Media are left
    /// as stored.
    pub async fn list_range(&self, from: DateKey, to: DateKey) -> Result<Vec<(DateKey, EntryRecord)>> {
        let user_id = self.auth.require_user()?;
        if from > to {
            return Err(Error::InvalidInput(format!(
                "Range start {from} is after end {to}"
            )));
        }
        self.documents.list_range(user_id, from, to).await
    }

    /// Merge `update` into the day's document and stamp `updatedAt`.
    pub async fn save(&self, date: DateKey, update: EntryUpdate) -> Result<()> {
        let user_id = self.auth.require_user()?;
        let update = EntryUpdate {
            updated_at: Some(iso_timestamp_now()),
            ..update
        };
        self.documents.set_merge(user_id, date, &update).await?;
        tracing::info!(%date, "Saved entry");
        Ok(())
    }
}

/// Swap stored media paths for displayable URLs, one at a time.
///
/// URLs and data URIs pass through; local audio handles are never signed.
pub async fn transform_for_read<S: ObjectStore + Sync>(
    objects: &S,
    bucket: &str,
    mut record: EntryRecord,
) -> EntryRecord {
    let mut images = Vec::with_capacity(record.images.len());
    for image in record.images {
        let resolved = resolve_signed_url(objects, &image, bucket).await;
        images.push(resolved.unwrap_or(image));
    }

    let mut audio_notes = Vec::with_capacity(record.audio_notes.len());
    for audio in record.audio_notes {
        if is_local_handle(&audio) {
            audio_notes.push(audio);
            continue;
        }
        let resolved = resolve_signed_url(objects, &audio, bucket).await;
        audio_notes.push(resolved.unwrap_or(audio));
    }

    record.images = images;
    record.audio_notes = audio_notes;
    record
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::MemoryDocumentStore;
    use crate::storage::{extract_path, MemoryObjectStore};

    fn day() -> DateKey {
        DateKey::from_ymd(2024, 3, 15).unwrap()
    }

    #[tokio::test]
    async fn get_resolves_paths_and_keeps_the_rest() {
        let documents = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::new();
        let auth = AuthState::signed_in("uid", "token");
        documents
            .insert("uid", day(), EntryRecord {
                images: vec![
                    "uid/images/1_a".to_string(),
                    "https://cdn.example.com/legacy.jpg".to_string(),
                ],
                audio_notes: vec![
                    "uid/audio/1_b.webm".to_string(),
                    "blob:https://app/1234".to_string(),
                ],
                ..Default::default()
            })
            .await;

        let repo = EntryRepository::new(&documents, &objects, "uploads", &auth);
        let record = repo.get(day()).await.unwrap().unwrap();

        assert_eq!(extract_path(&record.images[0]).as_deref(), Some("uid/images/1_a"));
        assert_eq!(record.images[1], "https://cdn.example.com/legacy.jpg");
        assert_eq!(extract_path(&record.audio_notes[0]).as_deref(), Some("uid/audio/1_b.webm"));
        assert_eq!(record.audio_notes[1], "blob:https://app/1234");
        assert_eq!(objects.signing_requests().await, 2);
    }

    #[tokio::test]
    async fn get_falls_back_to_path_when_signing_fails() {
        let documents = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::new();
        objects.fail_signing(true).await;
        let auth = AuthState::signed_in("uid", "token");
        documents
            .insert("uid", day(), EntryRecord {
                images: vec!["uid/images/1_a".to_string()],
                ..Default::default()
            })
            .await;

        let repo = EntryRepository::new(&documents, &objects, "uploads", &auth);
        let record = repo.get(day()).await.unwrap().unwrap();
        assert_eq!(record.images, vec!["uid/images/1_a"]);
    }

    #[tokio::test]
    async fn get_missing_entry_is_none() {
        let documents = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::new();
        let auth = AuthState::signed_in("uid", "token");
        let repo = EntryRepository::new(&documents, &objects, "uploads", &auth);
        assert_eq!(repo.get(day()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_does_not_sign_media() {
        let documents = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::new();
        let auth = AuthState::signed_in("uid", "token");
        documents
            .insert("uid", day(), EntryRecord {
                images: vec!["uid/images/1_a".to_string()],
                updated_at: Some("2024-03-15T10:00:00.000Z".to_string()),
                ..Default::default()
            })
            .await;

        let repo = EntryRepository::new(&documents, &objects, "uploads", &auth);
        let entries = repo.list().await.unwrap();
        assert_eq!(entries[0].1.images, vec!["uid/images/1_a"]);
        assert_eq!(objects.signing_requests().await, 0);
    }

    #[tokio::test]
    async fn save_stamps_updated_at() {
        let documents = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::new();
        let auth = AuthState::signed_in("uid", "token");
        let repo = EntryRepository::new(&documents, &objects, "uploads", &auth);

        repo.save(day(), EntryUpdate {
            text: Some("hello".to_string()),
            updated_at: Some("stale".to_string()),
            ..EntryUpdate::default()
        })
        .await
        .unwrap();

        let record = documents.get("uid", day()).await.unwrap().unwrap();
        assert_eq!(record.text, "hello");
        let stamp = record.updated_at.unwrap();
        assert_ne!(stamp, "stale");
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[tokio::test]
    async fn signed_out_calls_fail_without_touching_stores() {
        let documents = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::new();
        let auth = AuthState::SignedOut;
        let repo = EntryRepository::new(&documents, &objects, "uploads", &auth);

        assert!(matches!(repo.get(day()).await, Err(Error::AuthRequired)));
        assert!(matches!(repo.list().await, Err(Error::AuthRequired)));
        assert!(matches!(
            repo.save(day(), EntryUpdate::favorite(true)).await,
            Err(Error::AuthRequired)
        ));
        assert_eq!(documents.writes().await, 0);
    }

    #[tokio::test]
    async fn reversed_range_is_rejected() {
        let documents = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::new();
        let auth = AuthState::signed_in("uid", "token");
        let repo = EntryRepository::new(&documents, &objects, "uploads", &auth);
        let err = repo.list_range(day(), day().previous()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
