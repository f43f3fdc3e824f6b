//! Runtime configuration for the storage backends.
//!
//! Values come from the process environment (or a `.env` file loaded by the
//! binary). Supabase holds media, Firestore holds entry metadata.

use std::env;

use crate::util::{config_value, has_http_scheme};
use crate::{Error, Result};

const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
const ENV_SUPABASE_BUCKET: &str = "SUPABASE_BUCKET";
const ENV_FIREBASE_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
const ENV_FIREBASE_DATABASE: &str = "FIREBASE_DATABASE";
const ENV_USER_ID: &str = "RELIVE_USER_ID";
const ENV_ID_TOKEN: &str = "RELIVE_ID_TOKEN";

/// Bucket used for every uploaded image and voice note.
pub const DEFAULT_MEDIA_BUCKET: &str = "uploads";
/// Firestore database id used when none is configured.
pub const DEFAULT_FIRESTORE_DATABASE: &str = "(default)";

/// Supabase Storage configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Public anon key sent as `apikey`.
    pub anon_key: String,
    /// Bucket holding journal media.
    pub bucket: String,
}

/// Firestore configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirestoreConfig {
    /// Google Cloud project id.
    pub project_id: String,
    /// Database id inside the project.
    pub database: String,
}

impl FirestoreConfig {
    /// REST root for documents of this database.
    #[must_use]
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }
}

/// Identity supplied by the external sign-in flow.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub user_id: String,
    pub id_token: String,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("IdentityConfig")
            .field("user_id", &self.user_id)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

/// Complete runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReliveConfig {
    pub supabase: SupabaseConfig,
    pub firestore: FirestoreConfig,
    /// `None` when no identity is present; store operations then fail with
    /// [`Error::AuthRequired`].
    pub identity: Option<IdentityConfig>,
}

impl ReliveConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns an error naming every missing required variable.
    pub fn from_env() -> Result<Self> {
        parse_config(|key| env::var(key).ok())
    }
}

fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> Result<ReliveConfig> {
    let value = |key: &str| config_value(lookup(key));

    let supabase_url = value(ENV_SUPABASE_URL);
    let anon_key = value(ENV_SUPABASE_ANON_KEY);
    let project_id = value(ENV_FIREBASE_PROJECT_ID);

    let mut missing = Vec::new();
    if supabase_url.is_none() {
        missing.push(ENV_SUPABASE_URL);
    }
    if anon_key.is_none() {
        missing.push(ENV_SUPABASE_ANON_KEY);
    }
    if project_id.is_none() {
        missing.push(ENV_FIREBASE_PROJECT_ID);
    }

    let (Some(supabase_url), Some(anon_key), Some(project_id)) =
        (supabase_url, anon_key, project_id)
    else {
        return Err(Error::InvalidInput(format!(
            "ReLive configuration is incomplete. Missing: {}",
            missing.join(", ")
        )));
    };

    if !has_http_scheme(&supabase_url) {
        return Err(Error::InvalidInput(format!(
            "{ENV_SUPABASE_URL} must start with http:// or https://"
        )));
    }

    let identity = match (value(ENV_USER_ID), value(ENV_ID_TOKEN)) {
        (Some(user_id), Some(id_token)) => Some(IdentityConfig { user_id, id_token }),
        (None, None) => None,
        _ => {
            return Err(Error::InvalidInput(format!(
                "{ENV_USER_ID} and {ENV_ID_TOKEN} must be set together"
            )))
        }
    };

    Ok(ReliveConfig {
        supabase: SupabaseConfig {
            url: supabase_url.trim_end_matches('/').to_string(),
            anon_key,
            bucket: value(ENV_SUPABASE_BUCKET).unwrap_or_else(|| DEFAULT_MEDIA_BUCKET.to_string()),
        },
        firestore: FirestoreConfig {
            project_id,
            database: value(ENV_FIREBASE_DATABASE)
                .unwrap_or_else(|| DEFAULT_FIRESTORE_DATABASE.to_string()),
        },
        identity,
    })
}
