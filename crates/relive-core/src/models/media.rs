//! Media reference model
//!
//! A photo or voice note is referenced in one of several representations
//! depending on where it is in its life: freshly captured, waiting to be read
//! from a local handle, persisted as a storage path, or resolved to a URL.

use std::fmt;

const DATA_URI_PREFIX: &str = "data:";
const LOCAL_HANDLE_PREFIX: &str = "blob:";

/// Kind of media an entry carries. Also the object-store path category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    /// Path segment used under the user's namespace.
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Audio => "audio",
        }
    }
}

/// One media item attached to an entry.
#[derive(Clone, PartialEq, Eq)]
pub enum MediaRef {
    /// Inline `data:` URI, not uploaded yet.
    DataUri(String),
    /// Freshly recorded bytes carried with the reference.
    Pending {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
    /// Local-only `blob:` handle whose bytes live outside this value.
    LocalHandle(String),
    /// Canonical object-store path.
    Path(String),
    /// Absolute URL: a signed URL or an external/legacy link.
    Url(String),
}

impl MediaRef {
    /// Classify a raw string by its prefix.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        if raw.starts_with(DATA_URI_PREFIX) {
            Self::DataUri(raw.to_string())
        } else if raw.starts_with(LOCAL_HANDLE_PREFIX) {
            Self::LocalHandle(raw.to_string())
        } else if crate::util::has_http_scheme(raw) {
            Self::Url(raw.to_string())
        } else {
            Self::Path(raw.to_string())
        }
    }

    /// Wrap recorded bytes as a pending upload.
    pub fn pending(bytes: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self::Pending {
            bytes: bytes.into(),
            content_type: content_type.map(ToOwned::to_owned),
        }
    }

    /// String form, when the reference has one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::DataUri(value) | Self::LocalHandle(value) | Self::Path(value) | Self::Url(value) => {
                Some(value)
            }
            Self::Pending { .. } => None,
        }
    }

    /// Whether the referenced bytes still have to be uploaded.
    #[must_use]
    pub const fn is_new_content(&self) -> bool {
        matches!(
            self,
            Self::DataUri(_) | Self::Pending { .. } | Self::LocalHandle(_)
        )
    }
}

impl From<&str> for MediaRef {
    fn from(raw: &str) -> Self {
        Self::classify(raw)
    }
}

impl From<String> for MediaRef {
    fn from(raw: String) -> Self {
        Self::classify(&raw)
    }
}

impl fmt::Debug for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataUri(value) => {
                let head: String = value.chars().take(32).collect();
                write!(f, "DataUri({head}…, {} chars)", value.len())
            }
            Self::Pending {
                bytes,
                content_type,
            } => f
                .debug_struct("Pending")
                .field("len", &bytes.len())
                .field("content_type", content_type)
                .finish(),
            Self::LocalHandle(value) => f.debug_tuple("LocalHandle").field(value).finish(),
            Self::Path(value) => f.debug_tuple("Path").field(value).finish(),
            Self::Url(value) => f.debug_tuple("Url").field(value).finish(),
        }
    }
}

/// Whether a stored string is already displayable without signing.
///
/// Absolute URLs and inline data URIs pass through the resolver untouched.
#[must_use]
pub fn is_displayable_reference(value: &str) -> bool {
    crate::util::has_http_scheme(value) || value.starts_with(DATA_URI_PREFIX)
}

/// Whether a stored audio string is a local-only handle.
#[must_use]
pub fn is_local_handle(value: &str) -> bool {
    value.starts_with(LOCAL_HANDLE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_prefix() {
        assert!(matches!(
            MediaRef::classify("data:image/png;base64,AAAA"),
            MediaRef::DataUri(_)
        ));
        assert!(matches!(
            MediaRef::classify("blob:http://localhost/abc"),
            MediaRef::LocalHandle(_)
        ));
        assert!(matches!(
            MediaRef::classify("https://x.supabase.co/storage/v1/object/sign/uploads/a?token=t"),
            MediaRef::Url(_)
        ));
        assert_eq!(
            MediaRef::classify("uid/images/1_abc"),
            MediaRef::Path("uid/images/1_abc".to_string())
        );
    }

    #[test]
    fn pending_has_no_string_form() {
        let pending = MediaRef::pending(vec![1, 2, 3], Some("audio/webm"));
        assert_eq!(pending.as_str(), None);
        assert!(pending.is_new_content());
        assert!(format!("{pending:?}").contains("len: 3"));
    }

    #[test]
    fn only_unuploaded_references_are_new_content() {
        assert!(MediaRef::classify("data:audio/webm;base64,AA").is_new_content());
        assert!(MediaRef::classify("blob:local").is_new_content());
        assert!(!MediaRef::classify("uid/audio/1_a.webm").is_new_content());
        assert!(!MediaRef::classify("https://example.com/a.png").is_new_content());
    }

    #[test]
    fn displayable_reference_covers_urls_and_data_uris() {
        assert!(is_displayable_reference("https://example.com/a.png"));
        assert!(is_displayable_reference("data:image/png;base64,AA"));
        assert!(!is_displayable_reference("uid/images/1_abc"));
        assert!(!is_displayable_reference("blob:local"));
    }
}
