//! Inline `data:` URI decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::{Error, Result};

/// Bytes and media type carried by a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMedia {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Decode `data:[<media type>][;base64],<payload>`.
pub fn decode_data_uri(uri: &str) -> Result<DecodedMedia> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::InvalidInput("Not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::InvalidInput("Data URI has no payload separator".to_string()))?;

    let (media_type, is_base64) = header
        .strip_suffix(";base64")
        .map_or((header, false), |media_type| (media_type, true));

    let bytes = if is_base64 {
        let compact: String = payload.chars().filter(|ch| !ch.is_whitespace()).collect();
        STANDARD
            .decode(compact.as_bytes())
            .map_err(|error| Error::InvalidInput(format!("Invalid base64 in data URI: {error}")))?
    } else {
        urlencoding::decode_binary(payload.as_bytes()).into_owned()
    };

    let content_type = media_type
        .split(';')
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_ascii_lowercase);

    Ok(DecodedMedia {
        bytes,
        content_type,
    })
}

/// Encode bytes as a base64 data URI.
pub fn encode_data_uri(bytes: &[u8], content_type: Option<&str>) -> String {
    let media_type = content_type.unwrap_or("application/octet-stream");
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

/// File extension for common journal media types.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        "audio/webm" => Some("webm"),
        "audio/ogg" => Some("ogg"),
        "audio/mpeg" => Some("mp3"),
        "audio/wav" | "audio/x-wav" => Some("wav"),
        _ => None,
    }
}
