//! Service layer shared by the CLI and other clients.

mod journal;

pub use journal::{JournalService, ReliveJournal};
