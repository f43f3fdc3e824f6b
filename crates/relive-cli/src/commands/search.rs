use relive_core::db::DocumentStore;
use relive_core::services::JournalService;
use relive_core::storage::ObjectStore;
use relive_core::sync::LocalMediaSource;

use crate::commands::common::{format_summary_lines, normalize_search_query};
use crate::error::CliError;

pub async fn run_search<D, S, L>(
    journal: &JournalService<D, S, L>,
    query: &str,
    as_json: bool,
) -> Result<(), CliError>
where
    D: DocumentStore + Sync,
    S: ObjectStore + Sync,
    L: LocalMediaSource + Sync,
{
    let normalized_query = normalize_search_query(query)?;
    let hits = journal.search(&normalized_query).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else if hits.is_empty() {
        println!("No matches.");
    } else {
        for line in format_summary_lines(&hits) {
            println!("{line}");
        }
    }

    Ok(())
}
