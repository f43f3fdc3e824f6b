//! Entry summaries for list views and in-memory search over them.
//!
//! Both work on the raw list (no signed URLs); only counts of media are kept.

use serde::Serialize;

use crate::models::{DateKey, EntryRecord, Mood};

/// Longest preview line, in characters, before it is cut with `...`.
pub const PREVIEW_CHARS: usize = 150;
/// Cap on the number of search hits returned.
pub const MAX_SEARCH_RESULTS: usize = 50;

/// One row of a timeline or search result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySummary {
    pub date: DateKey,
    pub preview: String,
    pub tags: Vec<String>,
    pub mood: Option<Mood>,
    pub is_favorite: bool,
    pub image_count: usize,
    pub audio_count: usize,
    pub updated_at: Option<String>,
}

impl EntrySummary {
    #[must_use]
    pub fn from_record(date: DateKey, record: &EntryRecord) -> Self {
        Self {
            date,
            preview: preview(record),
            tags: record.tags.clone(),
            mood: record.mood,
            is_favorite: record.is_favorite,
            image_count: record.images.len(),
            audio_count: record.audio_notes.len(),
            updated_at: record.updated_at.clone(),
        }
    }
}

/// Summaries of every entry with content, newest date first.
#[must_use]
pub fn summarize(entries: &[(DateKey, EntryRecord)], favorites_only: bool) -> Vec<EntrySummary> {
    let mut summaries: Vec<EntrySummary> = entries
        .iter()
        .filter(|(_, record)| !favorites_only || record.is_favorite)
        .filter(|(_, record)| record.has_content())
        .map(|(date, record)| EntrySummary::from_record(*date, record))
        .collect();
    summaries.sort_by(|a, b| b.date.cmp(&a.date));
    summaries
}

/// Entries whose date, long-form date, tags or text contain `query`
/// (case-insensitive), newest date first.
#[must_use]
pub fn search(entries: &[(DateKey, EntryRecord)], query: &str) -> Vec<EntrySummary> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(DateKey, &EntryRecord)> = entries
        .iter()
        .filter(|(_, record)| record.has_content())
        .filter(|(date, record)| matches(*date, record, &query))
        .map(|(date, record)| (*date, record))
        .collect();
    hits.sort_by(|a, b| b.0.cmp(&a.0));

    hits.into_iter()
        .take(MAX_SEARCH_RESULTS)
        .map(|(date, record)| EntrySummary::from_record(date, record))
        .collect()
}

fn matches(date: DateKey, record: &EntryRecord, query: &str) -> bool {
    date.to_string().contains(query)
        || long_date(date).contains(query)
        || record
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(query))
        || record.text.to_lowercase().contains(query)
}

/// e.g. `friday, march 15, 2024`
fn long_date(date: DateKey) -> String {
    date.date().format("%A, %B %-d, %Y").to_string().to_lowercase()
}

fn preview(record: &EntryRecord) -> String {
    if let Some(first_line) = record.text.lines().map(str::trim).find(|line| !line.is_empty()) {
        if first_line.chars().count() > PREVIEW_CHARS {
            let cut: String = first_line.chars().take(PREVIEW_CHARS).collect();
            return format!("{cut}...");
        }
        return first_line.to_string();
    }

    if !record.images.is_empty() {
        "📷 [Image Entry]".to_string()
    } else if !record.audio_notes.is_empty() {
        "🎙 [Audio Entry]".to_string()
    } else if let Some(mood) = record.mood {
        format!("Mood: {}", mood.icon())
    } else {
        "(No text)".to_string()
    }
}
