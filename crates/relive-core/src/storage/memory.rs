//! In-memory object store (primarily for tests and offline runs).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::ObjectStore;
use crate::{Error, Result};

const MEMORY_STORAGE_URL: &str = "https://memory.invalid/storage/v1";

/// An object held by [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryObjects {
    objects: BTreeMap<(String, String), StoredObject>,
    upload_attempts: usize,
    signing_requests: usize,
    fail_upload_on_attempt: Option<usize>,
    fail_signing: bool,
}

/// Object store kept in process memory.
///
/// Signed URLs use the same `/object/sign/{bucket}/{path}?token=` shape as
/// Supabase so that path extraction behaves identically.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    inner: Arc<Mutex<MemoryObjects>>,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `attempt`-th upload (1-based, counted from now on) fail.
    pub async fn fail_upload_on_attempt(&self, attempt: usize) {
        let mut inner = self.inner.lock().await;
        inner.fail_upload_on_attempt = Some(inner.upload_attempts + attempt);
    }

    /// Make every signing request fail (or succeed again).
    pub async fn fail_signing(&self, fail: bool) {
        self.inner.lock().await.fail_signing = fail;
    }

    pub async fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.inner
            .lock()
            .await
            .objects
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.inner.lock().await.objects.len()
    }

    pub async fn upload_attempts(&self) -> usize {
        self.inner.lock().await.upload_attempts
    }

    pub async fn signing_requests(&self) -> usize {
        self.inner.lock().await.signing_requests
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String> {
        let mut inner = self.inner.lock().await;
        inner.upload_attempts += 1;
        if inner.fail_upload_on_attempt == Some(inner.upload_attempts) {
            return Err(Error::Upload(format!(
                "{bucket}/{path}: simulated upload failure"
            )));
        }

        let path = path.trim_matches('/').to_string();
        inner.objects.insert(
            (bucket.to_string(), path.clone()),
            StoredObject {
                bytes,
                content_type: content_type.map(ToOwned::to_owned),
            },
        );
        Ok(path)
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<String> {
        let mut inner = self.inner.lock().await;
        inner.signing_requests += 1;
        if inner.fail_signing {
            return Err(Error::Signing(format!(
                "{bucket}/{path}: simulated signing failure"
            )));
        }

        Ok(format!(
            "{MEMORY_STORAGE_URL}/object/sign/{bucket}/{path}?token=mem-{}-{}",
            inner.signing_requests,
            expires_in.as_secs()
        ))
    }
}
