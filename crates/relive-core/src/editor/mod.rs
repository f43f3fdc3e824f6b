//! Editing session for one day's entry and its unsaved-changes check.

use crate::models::{EntryRecord, EntryState, MediaRef, Mood};
use crate::sync::SyncedMedia;

/// Snapshot of an entry as last loaded or saved.
///
/// Media are tracked by count only: replacing one image with another at the
/// same position does not make the entry dirty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    pub text: String,
    pub tags: Vec<String>,
    pub mood: Option<Mood>,
    pub is_favorite: bool,
    pub image_count: usize,
    pub audio_count: usize,
}

impl Baseline {
    #[must_use]
    pub fn capture(state: &EntryState) -> Self {
        Self {
            text: state.text.clone(),
            tags: state.tags.clone(),
            mood: state.mood,
            is_favorite: state.is_favorite,
            image_count: state.images.len(),
            audio_count: state.audio_notes.len(),
        }
    }
}

/// Whether `current` differs from `baseline` in a way worth saving.
///
/// Without a baseline nothing has been loaded yet, so nothing is unsaved.
#[must_use]
pub fn is_dirty(current: &EntryState, baseline: Option<&Baseline>) -> bool {
    let Some(baseline) = baseline else {
        return false;
    };

    current.text != baseline.text
        || current.mood != baseline.mood
        || current.is_favorite != baseline.is_favorite
        || current.tags.len() != baseline.tags.len()
        || current.tags != baseline.tags
        || current.images.len() != baseline.image_count
        || current.audio_notes.len() != baseline.audio_count
}

/// Editable entry plus the baseline it is compared against.
#[derive(Debug, Clone, Default)]
pub struct EntryEditor {
    state: EntryState,
    baseline: Option<Baseline>,
}

impl EntryEditor {
    /// Editor with nothing loaded; never dirty until [`Self::load`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the state with `record` and take it as the new baseline.
    ///
    /// A missing record starts an empty entry with an empty baseline.
    pub fn load(&mut self, record: Option<&EntryRecord>) {
        self.state = record.map(EntryState::from).unwrap_or_default();
        self.baseline = Some(Baseline::capture(&self.state));
    }

    #[must_use]
    pub const fn state(&self) -> &EntryState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EntryState {
        &mut self.state
    }

    #[must_use]
    pub const fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        is_dirty(&self.state, self.baseline.as_ref())
    }

    /// Whether leaving the current entry loses nothing.
    ///
    /// When this is `false` the caller should ask before discarding.
    #[must_use]
    pub fn confirm_navigation(&self) -> bool {
        !self.is_dirty()
    }

    /// Adopt the media lists returned by a successful sync and re-baseline.
    pub fn apply_synced(&mut self, media: SyncedMedia) {
        self.state.images = media.images.into_iter().map(MediaRef::from).collect();
        self.state.audio_notes = media.audio_notes.into_iter().map(MediaRef::from).collect();
        self.baseline = Some(Baseline::capture(&self.state));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn loaded(record: &EntryRecord) -> EntryEditor {
        let mut editor = EntryEditor::new();
        editor.load(Some(record));
        editor
    }

    #[test]
    fn identical_state_is_clean() {
        let mut state = EntryState {
            text: "hello".to_string(),
            ..Default::default()
        };
        state.add_tag("a");
        assert!(!is_dirty(&state, Some(&Baseline::capture(&state))));
    }

    #[test]
    fn no_baseline_is_never_dirty() {
        let state = EntryState {
            text: "typed before load finished".to_string(),
            ..Default::default()
        };
        assert!(!is_dirty(&state, None));
        assert!(EntryEditor::new().confirm_navigation());
    }

    #[test]
    fn mood_change_is_dirty_until_rebaselined() {
        let mut editor = loaded(&EntryRecord::default());
        editor.state_mut().mood = Some(Mood::Sad);
        assert!(editor.is_dirty());
        assert!(!editor.confirm_navigation());

        editor.apply_synced(SyncedMedia::default());
        assert!(!editor.is_dirty());
    }

    #[test]
    fn tag_order_matters() {
        let mut editor = loaded(&EntryRecord {
            tags: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        });
        editor.state_mut().tags = vec!["b".to_string(), "a".to_string()];
        assert!(editor.is_dirty());
    }

    #[test]
    fn duplicate_tag_does_not_dirty() {
        let mut editor = loaded(&EntryRecord {
            tags: vec!["travel".to_string()],
            ..Default::default()
        });
        assert!(!editor.state_mut().add_tag("travel"));
        assert_eq!(editor.state().tags.len(), 1);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn media_swap_at_same_count_is_not_detected() {
        let mut editor = loaded(&EntryRecord {
            images: vec!["uid/images/1_a".to_string()],
            ..Default::default()
        });
        editor.state_mut().images[0] = MediaRef::classify("uid/images/2_b");
        assert!(!editor.is_dirty());

        editor.state_mut().add_audio_note(MediaRef::pending(vec![1], None));
        assert!(editor.is_dirty());
    }

    #[test]
    fn favorite_toggle_is_dirty() {
        let mut editor = loaded(&EntryRecord::default());
        editor.state_mut().toggle_favorite();
        assert!(editor.is_dirty());
        editor.state_mut().toggle_favorite();
        assert!(!editor.is_dirty());
    }

    #[test]
    fn missing_record_loads_empty_baseline() {
        let mut editor = loaded(&EntryRecord {
            text: "yesterday".to_string(),
            ..Default::default()
        });
        editor.load(None);
        assert_eq!(editor.state(), &EntryState::default());
        assert_eq!(editor.baseline(), Some(&Baseline::default()));
        editor.state_mut().text = "new".to_string();
        assert!(editor.is_dirty());
    }

    #[test]
    fn apply_synced_replaces_media_lists() {
        let mut editor = loaded(&EntryRecord::default());
        editor
            .state_mut()
            .add_image(MediaRef::classify("data:image/png;base64,AAAA"));
        editor.apply_synced(SyncedMedia {
            images: vec!["https://x.co/object/sign/uploads/uid/images/1_a?token=t".to_string()],
            audio_notes: Vec::new(),
        });

        assert!(matches!(editor.state().images[0], MediaRef::Url(_)));
        assert_eq!(editor.baseline().map(|b| b.image_count), Some(1));
        assert!(!editor.is_dirty());
    }
}
