use relive_core::db::DocumentStore;
use relive_core::editor::EntryEditor;
use relive_core::services::JournalService;
use relive_core::storage::ObjectStore;
use relive_core::sync::LocalMediaSource;
use relive_core::{MediaRef, Mood};

use crate::cli::WriteArgs;
use crate::commands::common::{capture_editor_input_with_initial, read_media_file, read_piped_stdin};
use crate::error::CliError;

/// Changes requested on the command line, with media already read from disk.
#[derive(Debug, Default)]
pub struct EntryEdits {
    pub text: Option<String>,
    pub tags: Vec<String>,
    pub untags: Vec<String>,
    pub mood: Option<Mood>,
    pub clear_mood: bool,
    pub favorite: Option<bool>,
    pub images: Vec<MediaRef>,
    pub audio_notes: Vec<MediaRef>,
    /// 1-based positions.
    pub remove_images: Vec<usize>,
    /// 1-based positions.
    pub remove_audio: Vec<usize>,
}

impl EntryEdits {
    /// Gather edits from `args`, reading text and media files as needed.
    pub fn collect(args: &WriteArgs, current_text: &str) -> Result<Self, CliError> {
        let text = if args.stdin {
            Some(read_piped_stdin()?.ok_or(CliError::EmptyStdin)?)
        } else if args.edit {
            Some(capture_editor_input_with_initial(current_text)?.unwrap_or_default())
        } else {
            args.text.clone()
        };

        let favorite = if args.favorite {
            Some(true)
        } else if args.unfavorite {
            Some(false)
        } else {
            None
        };

        Ok(Self {
            text,
            tags: args.tags.clone(),
            untags: args.untags.clone(),
            mood: args.mood.map(Mood::from),
            clear_mood: args.clear_mood,
            favorite,
            images: args
                .images
                .iter()
                .map(|path| read_media_file(path))
                .collect::<Result<_, _>>()?,
            audio_notes: args
                .audio
                .iter()
                .map(|path| read_media_file(path))
                .collect::<Result<_, _>>()?,
            remove_images: args.remove_images.clone(),
            remove_audio: args.remove_audio.clone(),
        })
    }
}

/// Apply `edits` to the editor's state. Removals refer to the media as loaded
/// and are checked before anything changes.
pub fn apply_edits(editor: &mut EntryEditor, edits: EntryEdits) -> Result<(), CliError> {
    let image_removals = removal_indexes("photo", &edits.remove_images, editor.state().images.len())?;
    let audio_removals =
        removal_indexes("voice note", &edits.remove_audio, editor.state().audio_notes.len())?;

    let state = editor.state_mut();
    for index in image_removals {
        state.remove_image(index);
    }
    for index in audio_removals {
        state.remove_audio_note(index);
    }

    if let Some(text) = edits.text {
        state.text = text;
    }
    for tag in &edits.tags {
        state.add_tag(tag);
    }
    for tag in &edits.untags {
        state.remove_tag(tag.trim());
    }
    if edits.clear_mood {
        state.mood = None;
    } else if let Some(mood) = edits.mood {
        state.mood = Some(mood);
    }
    if let Some(favorite) = edits.favorite {
        state.is_favorite = favorite;
    }
    for image in edits.images {
        state.add_image(image);
    }
    for audio in edits.audio_notes {
        state.add_audio_note(audio);
    }

    Ok(())
}

/// Zero-based indexes to remove, highest first so earlier ones stay valid.
fn removal_indexes(kind: &'static str, positions: &[usize], len: usize) -> Result<Vec<usize>, CliError> {
    let mut indexes = positions
        .iter()
        .map(|&position| {
            if position == 0 || position > len {
                Err(CliError::MediaIndexOutOfRange {
                    kind,
                    index: position,
                    len,
                })
            } else {
                Ok(position - 1)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    indexes.sort_unstable_by(|a, b| b.cmp(a));
    indexes.dedup();
    Ok(indexes)
}

pub async fn run_write<D, S, L>(journal: &JournalService<D, S, L>, args: &WriteArgs) -> Result<(), CliError>
where
    D: DocumentStore + Sync,
    S: ObjectStore + Sync,
    L: LocalMediaSource + Sync,
{
    let mut editor = journal.open_editor(args.date).await?;
    let edits = EntryEdits::collect(args, &editor.state().text)?;
    apply_edits(&mut editor, edits)?;

    if journal.save_editor(args.date, &mut editor).await? {
        let state = editor.state();
        tracing::debug!(
            date = %args.date,
            images = state.images.len(),
            audio_notes = state.audio_notes.len(),
            "Synced entry"
        );
        println!(
            "Saved {} ({} photos, {} voice notes)",
            args.date,
            state.images.len(),
            state.audio_notes.len()
        );
    } else {
        tracing::debug!(date = %args.date, "Entry unchanged, skipping sync");
        println!("No changes for {}", args.date);
    }

    Ok(())
}
