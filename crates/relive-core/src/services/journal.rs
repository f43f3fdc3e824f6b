//! Journal service: one handle over both stores for the signed-in user.

use crate::auth::AuthState;
use crate::config::ReliveConfig;
use crate::db::{DocumentStore, EntryRepository, EntryUpdate, FirestoreStore};
use crate::editor::EntryEditor;
use crate::models::{DateKey, EntryRecord, EntryState};
use crate::search::{self, EntrySummary};
use crate::storage::{ObjectStore, SupabaseStorage};
use crate::sync::{EntrySync, LocalMediaSource, NoLocalMedia, SyncedMedia};
use crate::Result;

/// Service wired to Firestore and Supabase Storage.
pub type ReliveJournal = JournalService<FirestoreStore, SupabaseStorage, NoLocalMedia>;

/// Entry operations for the signed-in user.
#[derive(Debug, Clone)]
pub struct JournalService<D, S, L> {
    documents: D,
    objects: S,
    local_media: L,
    bucket: String,
    auth: AuthState,
}

impl ReliveJournal {
    /// Build clients for both vendors from `config`.
    ///
    /// Succeeds while signed out; every entry operation then fails with
    /// [`crate::Error::AuthRequired`].
    pub fn from_config(config: &ReliveConfig) -> Result<Self> {
        let auth = AuthState::from(config.identity.clone());
        if !auth.is_signed_in() {
            tracing::warn!("No signed-in user configured; entry operations will fail");
        }

        Ok(Self::new(
            FirestoreStore::new(&config.firestore, auth.clone())?,
            SupabaseStorage::new(&config.supabase)?,
            NoLocalMedia,
            config.supabase.bucket.clone(),
            auth,
        ))
    }
}

impl<D, S, L> JournalService<D, S, L>
where
    D: DocumentStore + Sync,
    S: ObjectStore + Sync,
    L: LocalMediaSource + Sync,
{
    pub fn new(documents: D, objects: S, local_media: L, bucket: impl Into<String>, auth: AuthState) -> Self {
        Self {
            documents,
            objects,
            local_media,
            bucket: bucket.into(),
            auth,
        }
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn repository(&self) -> EntryRepository<'_, D, S> {
        EntryRepository::new(&self.documents, &self.objects, &self.bucket, &self.auth)
    }

    /// One day's entry with displayable media URLs.
    pub async fn get_entry(&self, date: DateKey) -> Result<Option<EntryRecord>> {
        self.repository().get(date).await
    }

    /// All entries as stored, most recently updated first.
    pub async fn list_entries(&self) -> Result<Vec<(DateKey, EntryRecord)>> {
        self.repository().list().await
    }

    /// Entries in `from..=to` as stored, oldest first.
    pub async fn list_entries_in_range(
        &self,
        from: DateKey,
        to: DateKey,
    ) -> Result<Vec<(DateKey, EntryRecord)>> {
        self.repository().list_range(from, to).await
    }

    /// Merge metadata into a day's entry without touching media.
    pub async fn save_entry(&self, date: DateKey, update: EntryUpdate) -> Result<()> {
        self.repository().save(date, update).await
    }

    /// Upload new media in `state` and persist the whole entry.
    pub async fn sync_entry(&self, date: DateKey, state: &EntryState) -> Result<SyncedMedia> {
        EntrySync::new(
            &self.documents,
            &self.objects,
            &self.local_media,
            &self.bucket,
            &self.auth,
        )
        .sync(date, state)
        .await
    }

    /// Editor loaded with the day's entry (or an empty one).
    pub async fn open_editor(&self, date: DateKey) -> Result<EntryEditor> {
        let record = self.get_entry(date).await?;
        let mut editor = EntryEditor::new();
        editor.load(record.as_ref());
        Ok(editor)
    }

    /// Sync the editor's state when it has unsaved changes or media that
    /// has not been uploaded yet. Media is compared by count for the dirty
    /// check, so a swapped photo only shows up as new content.
    ///
    /// Returns `false` when there was nothing to save.
    pub async fn save_editor(&self, date: DateKey, editor: &mut EntryEditor) -> Result<bool> {
        if !editor.is_dirty() && !editor.state().has_media_to_upload() {
            return Ok(false);
        }
        let media = self.sync_entry(date, editor.state()).await?;
        editor.apply_synced(media);
        Ok(true)
    }

    /// Text of the day before `date`, shown as context next to the editor.
    ///
    /// A missing entry or a failed read yields `None`.
    pub async fn previous_day_text(&self, date: DateKey) -> Result<Option<String>> {
        let user_id = self.auth.require_user()?;
        let previous = date.previous();
        match self.documents.get(user_id, previous).await {
            Ok(record) => Ok(record.map(|record| record.text)),
            Err(error) => {
                tracing::warn!(date = %previous, %error, "Failed to read previous day");
                Ok(None)
            }
        }
    }

    /// Timeline rows, newest date first.
    pub async fn summaries(&self, favorites_only: bool) -> Result<Vec<EntrySummary>> {
        let entries = self.list_entries().await?;
        Ok(search::summarize(&entries, favorites_only))
    }

    /// Timeline rows for a date range, newest date first.
    pub async fn summaries_in_range(
        &self,
        from: DateKey,
        to: DateKey,
        favorites_only: bool,
    ) -> Result<Vec<EntrySummary>> {
        let entries = self.list_entries_in_range(from, to).await?;
        Ok(search::summarize(&entries, favorites_only))
    }

    /// Entries matching `query`, newest date first.
    pub async fn search(&self, query: &str) -> Result<Vec<EntrySummary>> {
        let entries = self.list_entries().await?;
        Ok(search::search(&entries, query))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::MemoryDocumentStore;
    use crate::models::{MediaRef, Mood};
    use crate::storage::{extract_path, MemoryObjectStore};
    use crate::sync::MemoryMediaSource;
    use crate::Error;

    type TestJournal = JournalService<MemoryDocumentStore, MemoryObjectStore, MemoryMediaSource>;

    fn journal(auth: AuthState) -> TestJournal {
        JournalService::new(
            MemoryDocumentStore::new(),
            MemoryObjectStore::new(),
            MemoryMediaSource::new(),
            "uploads",
            auth,
        )
    }

    fn day() -> DateKey {
        DateKey::from_ymd(2024, 3, 15).unwrap()
    }

    #[tokio::test]
    async fn edit_save_and_reload_roundtrip() {
        let journal = journal(AuthState::signed_in("uid", "token"));
        let mut editor = journal.open_editor(day()).await.unwrap();
        assert!(!editor.is_dirty());

        editor.state_mut().text = "Sunny".to_string();
        editor.state_mut().mood = Some(Mood::Happy);
        editor
            .state_mut()
            .add_image(MediaRef::pending(vec![0x89, b'P', b'N', b'G'], Some("image/png")));
        assert!(journal.save_editor(day(), &mut editor).await.unwrap());
        assert!(!editor.is_dirty());
        assert!(!journal.save_editor(day(), &mut editor).await.unwrap());

        let reloaded = journal.get_entry(day()).await.unwrap().unwrap();
        assert_eq!(reloaded.text, "Sunny");
        assert_eq!(reloaded.mood, Some(Mood::Happy));
        let stored = extract_path(&reloaded.images[0]).unwrap();
        assert!(stored.starts_with("uid/images/"));
    }

    #[tokio::test]
    async fn replacing_a_photo_at_equal_count_is_saved() {
        let journal = journal(AuthState::signed_in("uid", "token"));
        let mut editor = journal.open_editor(day()).await.unwrap();
        editor
            .state_mut()
            .add_image(MediaRef::pending(vec![1, 2, 3], Some("image/png")));
        assert!(journal.save_editor(day(), &mut editor).await.unwrap());
        let before = journal.get_entry(day()).await.unwrap().unwrap();
        let old_path = extract_path(&before.images[0]).unwrap();

        let mut editor = journal.open_editor(day()).await.unwrap();
        editor.state_mut().remove_image(0);
        editor
            .state_mut()
            .add_image(MediaRef::pending(vec![4, 5, 6], Some("image/png")));
        assert!(!editor.is_dirty());
        assert!(journal.save_editor(day(), &mut editor).await.unwrap());

        let after = journal.get_entry(day()).await.unwrap().unwrap();
        assert_eq!(after.images.len(), 1);
        let new_path = extract_path(&after.images[0]).unwrap();
        assert!(new_path.starts_with("uid/images/"));
        assert_ne!(new_path, old_path);
    }

    #[tokio::test]
    async fn previous_day_text_reads_the_day_before() {
        let journal = journal(AuthState::signed_in("uid", "token"));
        journal
            .save_entry(day().previous(), EntryUpdate {
                text: Some("Yesterday's notes".to_string()),
                ..EntryUpdate::default()
            })
            .await
            .unwrap();

        assert_eq!(
            journal.previous_day_text(day()).await.unwrap().as_deref(),
            Some("Yesterday's notes")
        );
        assert_eq!(journal.previous_day_text(day().previous()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn favorite_toggle_keeps_text() {
        let journal = journal(AuthState::signed_in("uid", "token"));
        journal
            .save_entry(day(), EntryUpdate {
                text: Some("keep me".to_string()),
                ..EntryUpdate::default()
            })
            .await
            .unwrap();
        journal.save_entry(day(), EntryUpdate::favorite(true)).await.unwrap();

        let favorites = journal.summaries(true).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].preview, "keep me");
    }

    #[tokio::test]
    async fn search_covers_saved_tags() {
        let journal = journal(AuthState::signed_in("uid", "token"));
        let mut state = EntryState::default();
        state.add_tag("Hiking");
        journal.sync_entry(day(), &state).await.unwrap();

        let hits = journal.search("hik").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tags, vec!["Hiking"]);
        assert!(journal.search("swim").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn signed_out_service_rejects_every_operation() {
        let journal = journal(AuthState::SignedOut);
        assert!(matches!(journal.get_entry(day()).await, Err(Error::AuthRequired)));
        assert!(matches!(journal.summaries(false).await, Err(Error::AuthRequired)));
        assert!(matches!(
            journal.previous_day_text(day()).await,
            Err(Error::AuthRequired)
        ));
        assert!(matches!(
            journal.sync_entry(day(), &EntryState::default()).await,
            Err(Error::AuthRequired)
        ));
    }
}
