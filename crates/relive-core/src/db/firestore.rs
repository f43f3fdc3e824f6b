//! Firestore REST client for entry documents.

use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{DocumentStore, EntryUpdate};
use crate::auth::AuthState;
use crate::config::FirestoreConfig;
use crate::models::{DateKey, EntryRecord, Mood};
use crate::util::error_body_summary;
use crate::{Error, Result};

const FIRESTORE_API_URL: &str = "https://firestore.googleapis.com/v1";
const USERS_COLLECTION: &str = "users";
const ENTRIES_COLLECTION: &str = "entries";

/// Entry documents in Firestore, authorized with the user's ID token.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    api_url: String,
    documents_root: String,
    auth: AuthState,
    client: Client,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig, auth: AuthState) -> Result<Self> {
        if config.project_id.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Firestore project id must not be empty".to_string(),
            ));
        }

        Ok(Self {
            api_url: FIRESTORE_API_URL.to_string(),
            documents_root: config.documents_root(),
            auth,
            client: Client::builder().build()?,
        })
    }

    /// Point the client at another endpoint, e.g. a local emulator.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    fn user_parent(&self, user_id: &str) -> String {
        format!("{}/{USERS_COLLECTION}/{user_id}", self.documents_root)
    }

    fn document_name(&self, user_id: &str, date: DateKey) -> String {
        format!("{}/{ENTRIES_COLLECTION}/{date}", self.user_parent(user_id))
    }

    fn resource_url(&self, name: &str) -> String {
        format!("{}/{}", self.api_url, encode_path(name))
    }

    fn id_token(&self) -> Result<&str> {
        Ok(self.auth.require_session()?.id_token.as_str())
    }

    async fn run_query(
        &self,
        user_id: &str,
        structured_query: Value,
    ) -> Result<Vec<(DateKey, EntryRecord)>> {
        let url = format!("{}:runQuery", self.resource_url(&self.user_parent(user_id)));
        let response = self
            .client
            .post(url)
            .bearer_auth(self.id_token()?)
            .json(&json!({ "structuredQuery": structured_query }))
            .send()
            .await
            .map_err(|error| Error::DocumentStore(format!("Query failed: {error}")))?;
        let response = ensure_success(response).await?;
        let rows = response
            .json::<Vec<QueryRow>>()
            .await
            .map_err(|error| Error::DocumentStore(format!("Invalid query response: {error}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.document)
            .filter_map(|document| {
                let id = document.name.rsplit('/').next().unwrap_or_default();
                match id.parse::<DateKey>() {
                    Ok(date) => Some((date, decode_fields(&document.fields))),
                    Err(_) => {
                        tracing::debug!(name = %document.name, "Skipping entry with non-date id");
                        None
                    }
                }
            })
            .collect())
    }
}

impl DocumentStore for FirestoreStore {
    async fn get(&self, user_id: &str, date: DateKey) -> Result<Option<EntryRecord>> {
        let url = self.resource_url(&self.document_name(user_id, date));
        let response = self
            .client
            .get(url)
            .bearer_auth(self.id_token()?)
            .send()
            .await
            .map_err(|error| Error::DocumentStore(format!("Fetch {date} failed: {error}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        let document = response
            .json::<Document>()
            .await
            .map_err(|error| Error::DocumentStore(format!("Invalid document: {error}")))?;

        Ok(Some(decode_fields(&document.fields)))
    }

    async fn set_merge(&self, user_id: &str, date: DateKey, update: &EntryUpdate) -> Result<()> {
        let (mask, fields) = encode_update(update);
        if mask.is_empty() {
            return Ok(());
        }

        let query: Vec<(&str, &str)> = mask
            .iter()
            .map(|field| ("updateMask.fieldPaths", *field))
            .collect();
        let url = self.resource_url(&self.document_name(user_id, date));
        let response = self
            .client
            .patch(url)
            .bearer_auth(self.id_token()?)
            .query(&query)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(|error| Error::DocumentStore(format!("Write {date} failed: {error}")))?;
        ensure_success(response).await?;

        tracing::debug!(%date, fields = mask.len(), "Merged entry document");
        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<(DateKey, EntryRecord)>> {
        self.run_query(
            user_id,
            json!({
                "from": [{ "collectionId": ENTRIES_COLLECTION }],
                "orderBy": [{ "field": { "fieldPath": "updatedAt" }, "direction": "DESCENDING" }],
            }),
        )
        .await
    }

    async fn list_range(
        &self,
        user_id: &str,
        from: DateKey,
        to: DateKey,
    ) -> Result<Vec<(DateKey, EntryRecord)>> {
        let bound = |op: &str, date: DateKey| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": "__name__" },
                    "op": op,
                    "value": { "referenceValue": self.document_name(user_id, date) },
                }
            })
        };

        self.run_query(
            user_id,
            json!({
                "from": [{ "collectionId": ENTRIES_COLLECTION }],
                "where": {
                    "compositeFilter": {
                        "op": "AND",
                        "filters": [
                            bound("GREATER_THAN_OR_EQUAL", from),
                            bound("LESS_THAN_OR_EQUAL", to),
                        ],
                    }
                },
                "orderBy": [{ "field": { "fieldPath": "__name__" }, "direction": "ASCENDING" }],
            }),
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: Option<GoogleError>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: Option<String>,
    status: Option<String>,
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = parse_api_error(status.as_u16(), &body);
    if matches!(status.as_u16(), 401 | 403) {
        tracing::warn!(%message, "Firestore rejected credentials");
    }
    Err(Error::DocumentStore(message))
}

fn parse_api_error(status: u16, body: &str) -> String {
    if let Ok(GoogleErrorBody {
        error: Some(error),
    }) = serde_json::from_str::<GoogleErrorBody>(body)
    {
        match (error.message, error.status) {
            (Some(message), Some(code)) => return format!("{} [{code}] ({status})", message.trim()),
            (Some(message), None) => return format!("{} ({status})", message.trim()),
            _ => {}
        }
    }

    error_body_summary(status, body)
}

fn encode_path(name: &str) -> String {
    name.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn string_array(values: &[String]) -> Value {
    let values: Vec<Value> = values.iter().map(|value| string_value(value)).collect();
    json!({ "arrayValue": { "values": values } })
}

/// Field mask and typed values for a merge write.
fn encode_update(update: &EntryUpdate) -> (Vec<&'static str>, Map<String, Value>) {
    let mut mask = Vec::new();
    let mut fields = Map::new();
    let mut put = |name: &'static str, value: Value| {
        mask.push(name);
        fields.insert(name.to_string(), value);
    };

    if let Some(text) = &update.text {
        put("text", string_value(text));
    }
    if let Some(tags) = &update.tags {
        put("tags", string_array(tags));
    }
    if let Some(mood) = &update.mood {
        put(
            "mood",
            mood.map_or_else(|| json!({ "nullValue": null }), |mood| string_value(mood.as_str())),
        );
    }
    if let Some(is_favorite) = update.is_favorite {
        put("isFavorite", json!({ "booleanValue": is_favorite }));
    }
    if let Some(images) = &update.images {
        put("images", string_array(images));
    }
    if let Some(audio_notes) = &update.audio_notes {
        put("audioNotes", string_array(audio_notes));
    }
    if let Some(updated_at) = &update.updated_at {
        put("updatedAt", string_value(updated_at));
    }

    (mask, fields)
}

fn decode_string(value: Option<&Value>) -> Option<String> {
    let value = value?;
    value
        .get("stringValue")
        .or_else(|| value.get("timestampValue"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

fn decode_strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|value| value.pointer("/arrayValue/values"))
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|value| decode_string(Some(value)))
                .collect()
        })
        .unwrap_or_default()
}

fn decode_fields(fields: &Map<String, Value>) -> EntryRecord {
    let mood = decode_string(fields.get("mood")).and_then(|raw| match raw.parse::<Mood>() {
        Ok(mood) => Some(mood),
        Err(_) => {
            tracing::warn!(mood = %raw, "Ignoring unknown mood in stored entry");
            None
        }
    });

    EntryRecord {
        text: decode_string(fields.get("text")).unwrap_or_default(),
        tags: decode_strings(fields.get("tags")),
        mood,
        is_favorite: fields
            .get("isFavorite")
            .and_then(|value| value.get("booleanValue"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
        images: decode_strings(fields.get("images")),
        audio_notes: decode_strings(fields.get("audioNotes")),
        updated_at: decode_string(fields.get("updatedAt")),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn store() -> FirestoreStore {
        FirestoreStore::new(
            &FirestoreConfig {
                project_id: "relive-demo".to_string(),
                database: "(default)".to_string(),
            },
            AuthState::signed_in("uid-1", "token"),
        )
        .unwrap()
    }

    #[test]
    fn document_name_follows_user_scoped_layout() {
        let date = DateKey::from_ymd(2024, 3, 15).unwrap();
        assert_eq!(
            store().document_name("uid-1", date),
            "projects/relive-demo/databases/(default)/documents/users/uid-1/entries/2024-03-15"
        );
    }

    #[test]
    fn resource_url_encodes_segments() {
        let url = store().resource_url("projects/p/databases/(default)/documents");
        assert_eq!(
            url,
            "https://firestore.googleapis.com/v1/projects/p/databases/%28default%29/documents"
        );
    }

    #[test]
    fn encode_update_only_masks_present_fields() {
        let (mask, fields) = encode_update(&EntryUpdate::favorite(true));
        assert_eq!(mask, vec!["isFavorite"]);
        assert_eq!(fields["isFavorite"], json!({ "booleanValue": true }));
    }

    #[test]
    fn encode_update_writes_null_mood_and_arrays() {
        let update = EntryUpdate::from(EntryRecord {
            text: "hello".to_string(),
            images: vec!["uid/images/1_a".to_string()],
            updated_at: Some("2024-03-15T10:00:00.000Z".to_string()),
            ..Default::default()
        });
        let (mask, fields) = encode_update(&update);

        assert_eq!(
            mask,
            vec!["text", "tags", "mood", "isFavorite", "images", "audioNotes", "updatedAt"]
        );
        assert_eq!(fields["mood"], json!({ "nullValue": null }));
        assert_eq!(
            fields["images"],
            json!({ "arrayValue": { "values": [{ "stringValue": "uid/images/1_a" }] } })
        );
        assert_eq!(fields["tags"], json!({ "arrayValue": { "values": [] } }));
    }

    #[test]
    fn decode_fields_reads_typed_values() {
        let fields = json!({
            "text": { "stringValue": "Walked to the lake" },
            "tags": { "arrayValue": { "values": [{ "stringValue": "travel" }] } },
            "mood": { "stringValue": "mood-2" },
            "isFavorite": { "booleanValue": true },
            "images": { "arrayValue": {} },
            "audioNotes": { "arrayValue": { "values": [{ "stringValue": "uid/audio/1_a.webm" }] } },
            "updatedAt": { "timestampValue": "2024-03-15T10:00:00Z" },
        });
        let record = decode_fields(fields.as_object().unwrap());

        assert_eq!(record.text, "Walked to the lake");
        assert_eq!(record.tags, vec!["travel"]);
        assert_eq!(record.mood, Some(Mood::Happy));
        assert!(record.is_favorite);
        assert!(record.images.is_empty());
        assert_eq!(record.audio_notes, vec!["uid/audio/1_a.webm"]);
        assert_eq!(record.updated_at.as_deref(), Some("2024-03-15T10:00:00Z"));
    }

    #[test]
    fn decode_fields_drops_unknown_mood() {
        let fields = json!({ "mood": { "stringValue": "mood-9" } });
        let record = decode_fields(fields.as_object().unwrap());
        assert_eq!(record.mood, None);
        assert_eq!(record.text, "");
    }

    #[test]
    fn parse_api_error_reads_google_error_body() {
        let body = r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            parse_api_error(403, body),
            "Missing or insufficient permissions. [PERMISSION_DENIED] (403)"
        );
        assert_eq!(parse_api_error(502, "  "), "HTTP 502");
    }

    #[tokio::test]
    async fn signed_out_store_fails_before_network() {
        let store = FirestoreStore::new(
            &FirestoreConfig {
                project_id: "relive-demo".to_string(),
                database: "(default)".to_string(),
            },
            AuthState::SignedOut,
        )
        .unwrap()
        .with_api_url("http://127.0.0.1:9");
        let err = store
            .get("uid-1", DateKey::from_ymd(2024, 3, 15).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AuthRequired));
    }

    #[tokio::test(flavor = "multi_thread")]
    #[ignore = "Requires Firestore env vars plus network access"]
    async fn firestore_merge_and_read_roundtrip() {
        let _ = dotenvy::dotenv();
        let config = crate::config::ReliveConfig::from_env().expect("config should load");
        let auth = AuthState::from(config.identity.clone());
        let user_id = auth.require_user().unwrap().to_string();
        let store = FirestoreStore::new(&config.firestore, auth).unwrap();
        let date = DateKey::from_ymd(2000, 1, 1).unwrap();

        store
            .set_merge(
                &user_id,
                date,
                &EntryUpdate {
                    text: Some("integration".to_string()),
                    ..EntryUpdate::default()
                },
            )
            .await
            .unwrap_or_else(|error| panic!("write failed: {error}"));
        let record = store.get(&user_id, date).await.unwrap().unwrap();
        assert_eq!(record.text, "integration");
    }
}
