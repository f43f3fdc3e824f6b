//! Small helpers shared by the config, storage and document layers.

/// Longest slice of a raw response body quoted in an error message.
const ERROR_BODY_CHARS: usize = 180;

/// A configuration value with surrounding whitespace removed. Unset and
/// blank values are both treated as missing.
pub fn config_value(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn has_http_scheme(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// One-line summary of a non-JSON error body, e.g. an HTML gateway page,
/// followed by the HTTP status.
pub fn error_body_summary(status: u16, body: &str) -> String {
    let flattened = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.is_empty() {
        return format!("HTTP {status}");
    }
    let excerpt: String = flattened.chars().take(ERROR_BODY_CHARS).collect();
    format!("{excerpt} ({status})")
}

/// Milliseconds since the epoch, used as the leading part of media paths.
pub fn unix_millis_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// `updatedAt` stamp: UTC, RFC 3339, millisecond precision.
pub fn iso_timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
