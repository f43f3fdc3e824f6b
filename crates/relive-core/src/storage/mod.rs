//! Object storage for journal media.
//!
//! Uploaded bytes are addressed by a canonical path inside a bucket. Paths are
//! what gets persisted; signed URLs are derived from them for display and are
//! never stored.

mod data_uri;
mod memory;
mod resolve;
mod supabase;

use std::future::Future;
use std::time::Duration;

use uuid::Uuid;

use crate::models::MediaKind;
use crate::util::unix_millis_now;
use crate::Result;

pub use data_uri::{decode_data_uri, encode_data_uri, extension_for_content_type, DecodedMedia};
pub use memory::{MemoryObjectStore, StoredObject};
pub use resolve::{extract_path, resolve_signed_url, SIGNED_URL_MARKER, SIGNED_URL_TTL};
pub use supabase::SupabaseStorage;

const RANDOM_SUFFIX_LEN: usize = 9;

/// Operations the sync workflow needs from an object store.
pub trait ObjectStore {
    /// Store `bytes` at `path`, replacing any existing object there.
    ///
    /// Returns the canonical path reported by the store.
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Issue a URL that can fetch `path` directly for `expires_in`.
    fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Build a fresh destination path for a new upload.
///
/// Shape: `{user_id}/{category}/{unix_millis}_{random}[.{extension}]`.
pub fn media_path(user_id: &str, kind: MediaKind, extension: Option<&str>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    let suffix = &random[..RANDOM_SUFFIX_LEN];
    let base = format!(
        "{user_id}/{}/{}_{suffix}",
        kind.category(),
        unix_millis_now()
    );

    match extension.map(|ext| ext.trim_start_matches('.')) {
        Some(ext) if !ext.is_empty() => format!("{base}.{ext}"),
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_path_follows_namespace_convention() {
        let path = media_path("uid-1", MediaKind::Audio, Some(".webm"));
        let parts: Vec<&str> = path.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "uid-1");
        assert_eq!(parts[1], "audio");

        let (stem, ext) = parts[2].rsplit_once('.').unwrap();
        assert_eq!(ext, "webm");
        let (millis, random) = stem.split_once('_').unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(random.len(), RANDOM_SUFFIX_LEN);
        assert!(random.chars().all(|ch| ch.is_ascii_alphanumeric()));
    }

    #[test]
    fn media_path_without_extension() {
        let path = media_path("uid-1", MediaKind::Image, None);
        assert!(path.starts_with("uid-1/images/"));
        assert!(!path.contains('.'));
    }

    #[test]
    fn media_paths_do_not_collide() {
        let first = media_path("uid", MediaKind::Image, None);
        let second = media_path("uid", MediaKind::Image, None);
        assert_ne!(first, second);
    }
}
