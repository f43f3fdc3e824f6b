//! Data models for ReLive

mod date;
mod entry;
mod media;

pub use date::DateKey;
pub use entry::{EntryRecord, EntryState, Mood};
pub use media::{is_displayable_reference, is_local_handle, MediaKind, MediaRef};
