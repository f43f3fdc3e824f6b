//! ReLive CLI - read and write journal entries from the terminal
//!
//! Uses the same Firestore documents and Supabase media bucket as the app.

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::open_journal;
use crate::commands::completions::run_completions;
use crate::commands::list::run_list;
use crate::commands::search::run_search;
use crate::commands::show::run_show;
use crate::commands::write::run_write;
use crate::error::CliError;

const DEFAULT_LOG_DIRECTIVE: &str = "relive=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Show { date, json }) => run_show(&open_journal()?, date, json).await?,
        Some(Commands::Write(args)) => run_write(&open_journal()?, &args).await?,
        Some(Commands::List {
            favorites,
            from,
            to,
            json,
        }) => run_list(&open_journal()?, favorites, from, to, json).await?,
        Some(Commands::Search { query, json }) => run_search(&open_journal()?, &query, json).await?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        None => {
            Cli::command().print_help().map_err(CliError::Io)?;
            println!();
        }
    }

    Ok(())
}
