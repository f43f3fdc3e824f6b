use relive_core::db::DocumentStore;
use relive_core::search::EntrySummary;
use relive_core::services::JournalService;
use relive_core::storage::ObjectStore;
use relive_core::sync::LocalMediaSource;
use relive_core::DateKey;

use crate::commands::common::format_summary_lines;
use crate::error::CliError;

pub async fn list_summaries<D, S, L>(
    journal: &JournalService<D, S, L>,
    favorites_only: bool,
    from: Option<DateKey>,
    to: Option<DateKey>,
) -> Result<Vec<EntrySummary>, CliError>
where
    D: DocumentStore + Sync,
    S: ObjectStore + Sync,
    L: LocalMediaSource + Sync,
{
    let summaries = match from {
        Some(from) => {
            let to = to.unwrap_or_else(DateKey::today);
            journal.summaries_in_range(from, to, favorites_only).await?
        }
        None => journal.summaries(favorites_only).await?,
    };
    Ok(summaries)
}

pub async fn run_list<D, S, L>(
    journal: &JournalService<D, S, L>,
    favorites_only: bool,
    from: Option<DateKey>,
    to: Option<DateKey>,
    as_json: bool,
) -> Result<(), CliError>
where
    D: DocumentStore + Sync,
    S: ObjectStore + Sync,
    L: LocalMediaSource + Sync,
{
    let summaries = list_summaries(journal, favorites_only, from, to).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if summaries.is_empty() {
        println!("No entries yet.");
    } else {
        for line in format_summary_lines(&summaries) {
            println!("{line}");
        }
    }

    Ok(())
}
