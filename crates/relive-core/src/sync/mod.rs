//! Entry synchronization: upload new media, then persist the entry.
//!
//! Media items are processed one at a time, images first. Nothing is written
//! to the document store until every upload has succeeded, so a failed sync
//! leaves the stored entry as it was (objects uploaded before the failure
//! are left behind).

use std::collections::HashMap;
use std::future::Future;

use crate::auth::AuthState;
use crate::db::{DocumentStore, EntryRepository, EntryUpdate};
use crate::models::{DateKey, EntryRecord, EntryState, MediaKind, MediaRef};
use crate::storage::{
    decode_data_uri, encode_data_uri, extension_for_content_type, extract_path, media_path,
    resolve_signed_url, ObjectStore,
};
use crate::{Error, Result};

const AUDIO_EXTENSION: &str = "webm";
const AUDIO_CONTENT_TYPE: &str = "audio/webm";

/// Reads the bytes behind a local-only media handle.
pub trait LocalMediaSource {
    fn fetch(&self, handle: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Handle source backed by a map, for tests and scripted runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryMediaSource {
    handles: HashMap<String, Vec<u8>>,
}

impl MemoryMediaSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.handles.insert(handle.into(), bytes.into());
        self
    }
}

impl LocalMediaSource for MemoryMediaSource {
    async fn fetch(&self, handle: &str) -> Result<Vec<u8>> {
        self.handles
            .get(handle)
            .cloned()
            .ok_or_else(|| Error::LocalMedia(format!("{handle} is no longer available")))
    }
}

/// Source for processes that never hold local handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocalMedia;

impl LocalMediaSource for NoLocalMedia {
    async fn fetch(&self, handle: &str) -> Result<Vec<u8>> {
        Err(Error::LocalMedia(format!(
            "{handle} cannot be read outside the session that created it"
        )))
    }
}

/// Media lists as they should be shown after a successful sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncedMedia {
    pub images: Vec<String>,
    pub audio_notes: Vec<String>,
}

struct SyncedItem {
    stored: String,
    shown: String,
}

impl SyncedItem {
    fn unchanged(value: &str) -> Self {
        Self {
            stored: extract_path(value).unwrap_or_else(|| value.to_string()),
            shown: value.to_string(),
        }
    }
}

/// Uploads an entry's new media and writes the entry document.
pub struct EntrySync<'a, D, S, L> {
    documents: &'a D,
    objects: &'a S,
    local_media: &'a L,
    bucket: &'a str,
    auth: &'a AuthState,
}

impl<'a, D, S, L> EntrySync<'a, D, S, L>
where
    D: DocumentStore + Sync,
    S: ObjectStore + Sync,
    L: LocalMediaSource + Sync,
{
    pub const fn new(
        documents: &'a D,
        objects: &'a S,
        local_media: &'a L,
        bucket: &'a str,
        auth: &'a AuthState,
    ) -> Self {
        Self {
            documents,
            objects,
            local_media,
            bucket,
            auth,
        }
    }

    /// Upload new media in `state`, persist the entry for `date`, and return
    /// the lists to display.
    pub async fn sync(&self, date: DateKey, state: &EntryState) -> Result<SyncedMedia> {
        let user_id = self.auth.require_user()?;

        let mut stored_images = Vec::with_capacity(state.images.len());
        let mut shown_images = Vec::with_capacity(state.images.len());
        for image in &state.images {
            let item = self.sync_image(user_id, image).await?;
            stored_images.push(item.stored);
            shown_images.push(item.shown);
        }

        let mut stored_audio = Vec::with_capacity(state.audio_notes.len());
        let mut shown_audio = Vec::with_capacity(state.audio_notes.len());
        for audio in &state.audio_notes {
            let item = self.sync_audio(user_id, audio).await?;
            stored_audio.push(item.stored);
            shown_audio.push(item.shown);
        }

        let record = EntryRecord {
            text: state.text.clone(),
            tags: state.tags.clone(),
            mood: state.mood,
            is_favorite: state.is_favorite,
            images: stored_images,
            audio_notes: stored_audio,
            updated_at: None,
        };
        EntryRepository::new(self.documents, self.objects, self.bucket, self.auth)
            .save(date, EntryUpdate::from(record))
            .await?;

        Ok(SyncedMedia {
            images: shown_images,
            audio_notes: shown_audio,
        })
    }

    async fn sync_image(&self, user_id: &str, image: &MediaRef) -> Result<SyncedItem> {
        match image {
            MediaRef::DataUri(uri) => {
                let decoded = decode_data_uri(uri)?;
                let extension = decoded
                    .content_type
                    .as_deref()
                    .and_then(extension_for_content_type);
                let path = media_path(user_id, MediaKind::Image, extension);
                let (stored, signed) = self
                    .upload_and_sign(&path, decoded.bytes, decoded.content_type.as_deref())
                    .await?;
                Ok(SyncedItem {
                    stored,
                    shown: signed.unwrap_or_else(|| uri.clone()),
                })
            }
            MediaRef::Pending {
                bytes,
                content_type,
            } => {
                let extension = content_type.as_deref().and_then(extension_for_content_type);
                let path = media_path(user_id, MediaKind::Image, extension);
                let (stored, signed) = self
                    .upload_and_sign(&path, bytes.clone(), content_type.as_deref())
                    .await?;
                Ok(SyncedItem {
                    stored,
                    shown: signed
                        .unwrap_or_else(|| encode_data_uri(bytes, content_type.as_deref())),
                })
            }
            MediaRef::LocalHandle(value) | MediaRef::Path(value) | MediaRef::Url(value) => {
                Ok(SyncedItem::unchanged(value))
            }
        }
    }

    async fn sync_audio(&self, user_id: &str, audio: &MediaRef) -> Result<SyncedItem> {
        let (bytes, content_type, fallback) = match audio {
            MediaRef::Pending {
                bytes,
                content_type,
            } => (
                bytes.clone(),
                content_type.clone(),
                encode_data_uri(bytes, content_type.as_deref()),
            ),
            MediaRef::LocalHandle(handle) => {
                (self.local_media.fetch(handle).await?, None, handle.clone())
            }
            MediaRef::DataUri(uri) => {
                let decoded = decode_data_uri(uri)?;
                (decoded.bytes, decoded.content_type, uri.clone())
            }
            MediaRef::Path(value) | MediaRef::Url(value) => return Ok(SyncedItem::unchanged(value)),
        };

        if bytes.is_empty() {
            return Err(Error::EmptyRecording(format!(
                "{} produced no audio data",
                audio.as_str().unwrap_or("recording")
            )));
        }

        let path = media_path(user_id, MediaKind::Audio, Some(AUDIO_EXTENSION));
        let content_type = content_type.unwrap_or_else(|| AUDIO_CONTENT_TYPE.to_string());
        let (stored, signed) = self
            .upload_and_sign(&path, bytes, Some(&content_type))
            .await?;
        Ok(SyncedItem {
            stored,
            shown: signed.unwrap_or(fallback),
        })
    }

    /// Upload to `path`; returns the canonical path and, when signing works,
    /// a displayable URL.
    async fn upload_and_sign(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(String, Option<String>)> {
        let size = bytes.len();
        let stored = self
            .objects
            .upload(self.bucket, path, bytes, content_type)
            .await?;
        tracing::debug!(path = %stored, size, "Uploaded media");

        let signed = resolve_signed_url(self.objects, &stored, self.bucket).await;
        Ok((stored, signed))
    }
}
