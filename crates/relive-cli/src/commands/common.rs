use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use relive_core::config::ReliveConfig;
use relive_core::search::EntrySummary;
use relive_core::services::ReliveJournal;
use relive_core::{DateKey, EntryRecord, MediaRef};
use serde::Serialize;

use crate::error::CliError;

const LINE_PREVIEW_CHARS: usize = 40;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryItem<'a> {
    pub date: DateKey,
    #[serde(flatten)]
    pub entry: &'a EntryRecord,
    pub previous_day_text: Option<&'a str>,
}

/// Build the Firestore/Supabase journal from the environment.
pub fn open_journal() -> Result<ReliveJournal, CliError> {
    let config = ReliveConfig::from_env()?;
    Ok(ReliveJournal::from_config(&config)?)
}

/// Accepts `YYYY-MM-DD`, `today` or `yesterday`.
pub fn parse_date_arg(value: &str) -> Result<DateKey, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(DateKey::today()),
        "yesterday" => Ok(DateKey::today().previous()),
        other => other.parse::<DateKey>().map_err(|error| error.to_string()),
    }
}

/// Read a photo or voice note from disk as a pending upload.
pub fn read_media_file(path: &Path) -> Result<MediaRef, CliError> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(CliError::EmptyMediaFile(path.to_path_buf()));
    }
    let content_type = mime_guess::from_path(path).first_raw();
    Ok(MediaRef::pending(bytes, content_type))
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn format_summary_lines(summaries: &[EntrySummary]) -> Vec<String> {
    summaries
        .iter()
        .map(|summary| {
            let favorite = if summary.is_favorite { "★" } else { " " };
            let mood = summary.mood.map_or("  ", |mood| mood.icon());
            let preview = truncate(&summary.preview, LINE_PREVIEW_CHARS);
            let mut line = format!("{}  {favorite} {mood}  {preview:<40}", summary.date);

            let media = render_media_counts(summary.image_count, summary.audio_count);
            if !media.is_empty() {
                line.push_str("  ");
                line.push_str(&media);
            }
            let tags = render_tags(&summary.tags);
            if !tags.is_empty() {
                line.push_str("  ");
                line.push_str(&tags);
            }
            line.trim_end().to_string()
        })
        .collect()
}

/// Full, human-readable rendering of one entry.
pub fn format_entry(date: DateKey, entry: &EntryRecord, previous_day_text: Option<&str>) -> String {
    let mut lines = Vec::new();

    let mut heading = date.date().format("%A, %B %-d, %Y").to_string();
    if entry.is_favorite {
        heading.push_str("  ★");
    }
    if let Some(mood) = entry.mood {
        heading.push_str("  ");
        heading.push_str(mood.icon());
    }
    lines.push(heading);

    if let Some(previous) = previous_day_text.filter(|text| !text.trim().is_empty()) {
        lines.push(format!("  (yesterday) {}", truncate(previous, 80)));
    }
    lines.push(String::new());

    if entry.text.trim().is_empty() {
        lines.push("(No text)".to_string());
    } else {
        lines.push(entry.text.clone());
    }

    let tags = render_tags(&entry.tags);
    if !tags.is_empty() {
        lines.push(String::new());
        lines.push(tags);
    }

    for (index, image) in entry.images.iter().enumerate() {
        lines.push(format!("📷 {}. {image}", index + 1));
    }
    for (index, audio) in entry.audio_notes.iter().enumerate() {
        lines.push(format!("🎙 {}. {audio}", index + 1));
    }

    lines.join("\n")
}

pub fn render_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

fn render_media_counts(images: usize, audio: usize) -> String {
    match (images, audio) {
        (0, 0) => String::new(),
        (images, 0) => format!("📷{images}"),
        (0, audio) => format!("🎙{audio}"),
        (images, audio) => format!("📷{images} 🎙{audio}"),
    }
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    let first_line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_text(&buffer))
}

/// Trim trailing whitespace; blank text becomes `None`.
pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim_end();
    if trimmed.trim().is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn capture_editor_input_with_initial(initial_text: &str) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_entry_file_path();
    std::fs::write(&temp_file, initial_text)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let text = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_text(&text))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        ))),
        Err(error) => Err(CliError::EditorFailed(format!(
            "Failed to launch `{editor}`: {error}"
        ))),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_entry_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("relive-entry-{}-{now}.md", std::process::id()))
}
