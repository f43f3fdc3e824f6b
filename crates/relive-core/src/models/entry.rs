//! Journal entry model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::media::MediaRef;
use crate::error::{Error, Result};

/// One of the five moods an entry can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "mood-1")]
    Neutral,
    #[serde(rename = "mood-2")]
    Happy,
    #[serde(rename = "mood-3")]
    Sad,
    #[serde(rename = "mood-4")]
    Surprised,
    #[serde(rename = "mood-5")]
    Calm,
}

impl Mood {
    pub const ALL: [Self; 5] = [
        Self::Neutral,
        Self::Happy,
        Self::Sad,
        Self::Surprised,
        Self::Calm,
    ];

    /// Stored identifier (`mood-1` … `mood-5`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "mood-1",
            Self::Happy => "mood-2",
            Self::Sad => "mood-3",
            Self::Surprised => "mood-4",
            Self::Calm => "mood-5",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Neutral => "😶",
            Self::Happy => "🙂",
            Self::Sad => "😔",
            Self::Surprised => "😲",
            Self::Calm => "😌",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mood| mood.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidInput(format!("Unknown mood: {s}")))
    }
}

/// Durable document shape: media are storage paths or literal URLs.
///
/// Also used as the UI-ready shape after a single-entry read, where bare paths
/// have been swapped for signed URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryRecord {
    pub text: String,
    pub tags: Vec<String>,
    pub mood: Option<Mood>,
    pub is_favorite: bool,
    pub images: Vec<String>,
    pub audio_notes: Vec<String>,
    /// Server-observed time of the last write (ISO-8601); sort order only.
    pub updated_at: Option<String>,
}

impl EntryRecord {
    /// Whether the entry holds anything worth listing.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
            || !self.tags.is_empty()
            || self.mood.is_some()
            || !self.images.is_empty()
            || !self.audio_notes.is_empty()
    }
}

/// In-memory, editable state of one day's entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryState {
    pub text: String,
    pub tags: Vec<String>,
    pub mood: Option<Mood>,
    pub is_favorite: bool,
    pub images: Vec<MediaRef>,
    pub audio_notes: Vec<MediaRef>,
}

impl EntryState {
    /// Add a tag unless it is blank or already present (exact, case-sensitive).
    ///
    /// Returns whether the tag list changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|existing| existing == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove a tag by exact match. Returns whether it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag);
        self.tags.len() != before
    }

    /// Flip the favorite flag and return the new value.
    pub fn toggle_favorite(&mut self) -> bool {
        self.is_favorite = !self.is_favorite;
        self.is_favorite
    }

    pub fn add_image(&mut self, image: MediaRef) {
        self.images.push(image);
    }

    pub fn add_audio_note(&mut self, audio: MediaRef) {
        self.audio_notes.push(audio);
    }

    /// Whether any photo or voice note still has to be uploaded.
    #[must_use]
    pub fn has_media_to_upload(&self) -> bool {
        self.images
            .iter()
            .chain(&self.audio_notes)
            .any(MediaRef::is_new_content)
    }

    /// Remove the image at `index`, if any.
    pub fn remove_image(&mut self, index: usize) -> Option<MediaRef> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    /// Remove the audio note at `index`, if any.
    pub fn remove_audio_note(&mut self, index: usize) -> Option<MediaRef> {
        (index < self.audio_notes.len()).then(|| self.audio_notes.remove(index))
    }
}

impl From<&EntryRecord> for EntryState {
    fn from(record: &EntryRecord) -> Self {
        Self {
            text: record.text.clone(),
            tags: record.tags.clone(),
            mood: record.mood,
            is_favorite: record.is_favorite,
            images: record.images.iter().map(String::as_str).map(MediaRef::classify).collect(),
            audio_notes: record
                .audio_notes
                .iter()
                .map(String::as_str)
                .map(MediaRef::classify)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn mood_round_trips_through_identifier() {
        for mood in Mood::ALL {
            assert_eq!(mood.as_str().parse::<Mood>().unwrap(), mood);
        }
        assert!("mood-6".parse::<Mood>().is_err());
    }

    #[test]
    fn record_serializes_camel_case_with_defaults() {
        let record: EntryRecord = serde_json::from_str(r#"{"text":"hi","isFavorite":true}"#).unwrap();
        assert_eq!(record.text, "hi");
        assert!(record.is_favorite);
        assert!(record.images.is_empty());
        assert_eq!(record.mood, None);

        let json = serde_json::to_value(EntryRecord {
            mood: Some(Mood::Sad),
            audio_notes: vec!["uid/audio/1_a.webm".to_string()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json["mood"], "mood-3");
        assert_eq!(json["audioNotes"][0], "uid/audio/1_a.webm");
    }

    #[test]
    fn add_tag_rejects_duplicates_and_blanks() {
        let mut state = EntryState::default();
        assert!(state.add_tag(" travel "));
        assert!(!state.add_tag("travel"));
        assert!(!state.add_tag("   "));
        assert!(state.add_tag("Travel"));
        assert_eq!(state.tags, vec!["travel", "Travel"]);
    }

    #[test]
    fn remove_tag_is_exact() {
        let mut state = EntryState::default();
        state.add_tag("work");
        assert!(!state.remove_tag("Work"));
        assert!(state.remove_tag("work"));
        assert!(state.tags.is_empty());
    }

    #[test]
    fn has_content_ignores_whitespace_text() {
        let mut record = EntryRecord {
            text: "  \n".to_string(),
            ..Default::default()
        };
        assert!(!record.has_content());
        record.mood = Some(Mood::Calm);
        assert!(record.has_content());
    }

    #[test]
    fn state_from_record_classifies_media() {
        let record = EntryRecord {
            images: vec![
                "uid/images/1_a".to_string(),
                "https://cdn.example.com/a.png".to_string(),
            ],
            ..Default::default()
        };
        let state = EntryState::from(&record);
        assert!(matches!(state.images[0], MediaRef::Path(_)));
        assert!(matches!(state.images[1], MediaRef::Url(_)));
    }

    #[test]
    fn remove_media_out_of_range_is_none() {
        let mut state = EntryState::default();
        state.add_image(MediaRef::classify("uid/images/1_a"));
        assert!(state.remove_image(3).is_none());
        assert!(state.remove_image(0).is_some());
        assert!(state.remove_audio_note(0).is_none());
    }

    #[test]
    fn media_to_upload_ignores_stored_references() {
        let mut state = EntryState::from(&EntryRecord {
            images: vec!["uid/images/1_a".to_string()],
            audio_notes: vec!["https://cdn.example.com/a.webm".to_string()],
            ..Default::default()
        });
        assert!(!state.has_media_to_upload());

        state.add_audio_note(MediaRef::pending(vec![1], Some("audio/webm")));
        assert!(state.has_media_to_upload());
    }
}
