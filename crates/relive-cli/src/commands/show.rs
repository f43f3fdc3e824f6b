use relive_core::db::DocumentStore;
use relive_core::services::JournalService;
use relive_core::storage::ObjectStore;
use relive_core::sync::LocalMediaSource;
use relive_core::DateKey;

use crate::commands::common::{format_entry, EntryItem};
use crate::error::CliError;

pub async fn run_show<D, S, L>(
    journal: &JournalService<D, S, L>,
    date: DateKey,
    as_json: bool,
) -> Result<(), CliError>
where
    D: DocumentStore + Sync,
    S: ObjectStore + Sync,
    L: LocalMediaSource + Sync,
{
    let entry = journal.get_entry(date).await?;
    let previous_day_text = journal.previous_day_text(date).await?;

    match (entry, as_json) {
        (Some(entry), true) => {
            let item = EntryItem {
                date,
                entry: &entry,
                previous_day_text: previous_day_text.as_deref(),
            };
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        (Some(entry), false) => {
            println!("{}", format_entry(date, &entry, previous_day_text.as_deref()));
        }
        (None, true) => println!("null"),
        (None, false) => println!("No entry for {date}"),
    }

    Ok(())
}
