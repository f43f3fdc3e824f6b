//! Signed URL resolution and the reverse mapping back to storage paths.

use std::time::Duration;

use super::ObjectStore;
use crate::models::is_displayable_reference;

/// How long a signed URL stays valid.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// Segment that precedes `{bucket}/{path}` in a signed URL.
pub const SIGNED_URL_MARKER: &str = "/sign/";

/// Resolve a stored reference to something displayable.
///
/// Blank input yields `None`. Absolute URLs and data URIs come back unchanged,
/// so resolving twice is harmless. A backend failure is logged and yields
/// `None`; callers keep the original reference in that case.
pub async fn resolve_signed_url<S: ObjectStore + Sync>(
    store: &S,
    path: &str,
    bucket: &str,
) -> Option<String> {
    if path.trim().is_empty() {
        return None;
    }
    if is_displayable_reference(path) {
        return Some(path.to_string());
    }

    match store.create_signed_url(bucket, path, SIGNED_URL_TTL).await {
        Ok(url) => Some(url),
        Err(error) => {
            tracing::warn!(%bucket, %path, %error, "Failed to create signed URL");
            None
        }
    }
}

/// Recover the storage path embedded in a signed URL.
///
/// Expects `…/sign/{bucket}/{path}?{token}`. Anything else (plain paths, data
/// URIs, unrelated URLs) yields `None`, meaning "use the input verbatim".
pub fn extract_path(url: &str) -> Option<String> {
    let decoded = urlencoding::decode(url).ok()?;
    let (_, after_marker) = decoded.split_once(SIGNED_URL_MARKER)?;
    let (_bucket, path_with_token) = after_marker.split_once('/')?;
    let path = path_with_token
        .split_once('?')
        .map_or(path_with_token, |(path, _token)| path);

    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}
