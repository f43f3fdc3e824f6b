use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use relive_core::{DateKey, Mood};

use crate::commands::common::parse_date_arg;

#[derive(Parser)]
#[command(name = "relive")]
#[command(about = "Keep a daily journal with photos and voice notes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show one day's entry
    Show {
        /// Day to show: YYYY-MM-DD, `today` or `yesterday`
        #[arg(value_parser = parse_date_arg, default_value = "today")]
        date: DateKey,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create or edit a day's entry
    #[command(alias = "edit")]
    Write(WriteArgs),
    /// List entries, newest day first
    List {
        /// Only favorite entries
        #[arg(long)]
        favorites: bool,
        /// First day to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<DateKey>,
        /// Last day to include; defaults to today
        #[arg(long, value_parser = parse_date_arg, requires = "from")]
        to: Option<DateKey>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search entries by date, tag or text
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Day to write: YYYY-MM-DD, `today` or `yesterday`
    #[arg(value_parser = parse_date_arg, default_value = "today")]
    pub date: DateKey,
    /// Replace the entry text
    #[arg(long, conflicts_with_all = ["stdin", "edit"])]
    pub text: Option<String>,
    /// Read the entry text from stdin
    #[arg(long, conflicts_with = "edit")]
    pub stdin: bool,
    /// Open the entry text in $VISUAL/$EDITOR
    #[arg(long)]
    pub edit: bool,
    /// Add a tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
    /// Remove a tag (repeatable)
    #[arg(long = "untag", value_name = "TAG")]
    pub untags: Vec<String>,
    /// Set the mood
    #[arg(long, value_enum, conflicts_with = "clear_mood")]
    pub mood: Option<MoodArg>,
    /// Remove the mood
    #[arg(long)]
    pub clear_mood: bool,
    /// Mark as favorite
    #[arg(long, conflicts_with = "unfavorite")]
    pub favorite: bool,
    /// Remove the favorite mark
    #[arg(long)]
    pub unfavorite: bool,
    /// Attach a photo (repeatable)
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,
    /// Attach a voice note (repeatable)
    #[arg(long = "audio", value_name = "PATH")]
    pub audio: Vec<PathBuf>,
    /// Remove the photo at this 1-based position (repeatable)
    #[arg(long = "remove-image", value_name = "N")]
    pub remove_images: Vec<usize>,
    /// Remove the voice note at this 1-based position (repeatable)
    #[arg(long = "remove-audio", value_name = "N")]
    pub remove_audio: Vec<usize>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum MoodArg {
    Neutral,
    Happy,
    Sad,
    Surprised,
    Calm,
}

impl From<MoodArg> for Mood {
    fn from(mood: MoodArg) -> Self {
        match mood {
            MoodArg::Neutral => Self::Neutral,
            MoodArg::Happy => Self::Happy,
            MoodArg::Sad => Self::Sad,
            MoodArg::Surprised => Self::Surprised,
            MoodArg::Calm => Self::Calm,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

impl From<CompletionShell> for clap_complete::Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Self::Bash,
            CompletionShell::Zsh => Self::Zsh,
            CompletionShell::Fish => Self::Fish,
        }
    }
}
