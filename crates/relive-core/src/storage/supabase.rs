//! Supabase Storage client.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use super::ObjectStore;
use crate::config::SupabaseConfig;
use crate::util::error_body_summary;
use crate::{Error, Result};

/// Supabase Storage over its REST API, authenticated with the anon key.
#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    storage_url: String,
    anon_key: String,
    client: Client,
}

impl SupabaseStorage {
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let anon_key = config.anon_key.trim().to_string();
        if anon_key.is_empty() {
            return Err(Error::InvalidInput(
                "Supabase anon key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            storage_url: storage_url(&config.url),
            anon_key,
            client: Client::builder().build()?,
        })
    }

    /// Root of the storage API, e.g. `https://abc.supabase.co/storage/v1`.
    #[must_use]
    pub fn storage_url(&self) -> &str {
        &self.storage_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}

impl ObjectStore for SupabaseStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String> {
        let path = normalize_object_path(path)?;
        let url = format!(
            "{}/object/{}/{}",
            self.storage_url,
            encode_segment(bucket),
            encode_path(&path)
        );

        let mut request = self
            .authorized(self.client.post(url))
            .header("x-upsert", "true")
            .body(bytes);
        if let Some(content_type) = content_type.map(str::trim).filter(|value| !value.is_empty())
        {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }

        let response = request
            .send()
            .await
            .map_err(|error| Error::Upload(format!("{bucket}/{path}: {error}")))?;
        let response = ensure_success(response, Error::Upload).await?;
        let payload = response
            .json::<UploadResponse>()
            .await
            .map_err(|error| Error::Upload(format!("Invalid upload response: {error}")))?;

        Ok(canonical_path(bucket, &path, payload.key.as_deref()))
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<String> {
        let path = normalize_object_path(path)?;
        let url = format!(
            "{}/object/sign/{}/{}",
            self.storage_url,
            encode_segment(bucket),
            encode_path(&path)
        );

        let response = self
            .authorized(self.client.post(url))
            .json(&serde_json::json!({ "expiresIn": expires_in.as_secs() }))
            .send()
            .await
            .map_err(|error| Error::Signing(format!("{bucket}/{path}: {error}")))?;
        let response = ensure_success(response, Error::Signing).await?;
        let payload = response
            .json::<SignResponse>()
            .await
            .map_err(|error| Error::Signing(format!("Invalid sign response: {error}")))?;

        Ok(format!("{}{}", self.storage_url, payload.signed_url))
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    error: Option<String>,
    message: Option<String>,
}

async fn ensure_success(response: Response, wrap: fn(String) -> Error) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(wrap(parse_api_error(status, &body)))
}

fn parse_api_error(status: u16, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<StorageErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({status})", message.trim());
        }
    }

    error_body_summary(status, body)
}

fn storage_url(project_url: &str) -> String {
    let base = project_url.trim().trim_end_matches('/');
    if base.ends_with("/storage/v1") {
        base.to_string()
    } else {
        format!("{base}/storage/v1")
    }
}

/// Trim slashes and collapse empty segments, as the storage API does.
fn normalize_object_path(path: &str) -> Result<String> {
    let path = path
        .split('/')
        .filter(|segment| !segment.trim().is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if path.is_empty() {
        return Err(Error::InvalidInput(
            "Object path cannot be empty".to_string(),
        ));
    }
    Ok(path)
}

fn canonical_path(bucket: &str, requested: &str, reported_key: Option<&str>) -> String {
    reported_key
        .and_then(|key| key.strip_prefix(bucket))
        .and_then(|key| key.strip_prefix('/'))
        .filter(|key| !key.is_empty())
        .unwrap_or(requested)
        .to_string()
}

fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}
