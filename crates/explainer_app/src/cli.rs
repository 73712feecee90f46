use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(
    name = "explainer",
    version,
    about = "Fill a vocabulary deck with explanations from a local language model"
)]
pub struct Cli {
    /// RON config file. Defaults to ./explainer.ron when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, global = true, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    /// Log at debug level regardless of the configured level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Explain every entry that has both a headword and a context.
    FetchAll {
        #[command(flatten)]
        deck: DeckArgs,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Explain a single entry again.
    Regenerate {
        #[command(flatten)]
        deck: DeckArgs,
        #[command(flatten)]
        model: ModelArgs,
        /// Row number of the entry, starting at 1.
        #[arg(long)]
        entry: usize,
    },
    /// Correct the headword or context of one entry. Does not contact the model.
    Edit {
        #[command(flatten)]
        deck: DeckArgs,
        /// Row number of the entry, starting at 1.
        #[arg(long)]
        entry: usize,
        /// New headword; existing definitions are re-titled to match.
        #[arg(long)]
        selection: Option<String>,
        #[arg(long)]
        context: Option<String>,
    },
}

impl Command {
    pub fn deck_args(&self) -> &DeckArgs {
        match self {
            Command::FetchAll { deck, .. }
            | Command::Regenerate { deck, .. }
            | Command::Edit { deck, .. } => deck,
        }
    }

    pub fn model_args(&self) -> Option<&ModelArgs> {
        match self {
            Command::FetchAll { model, .. } | Command::Regenerate { model, .. } => Some(model),
            Command::Edit { .. } => None,
        }
    }
}

#[derive(Debug, Args)]
pub struct DeckArgs {
    /// Deck JSON file to read.
    #[arg(long)]
    pub deck: PathBuf,

    /// Where to write the updated deck. Defaults to overwriting `--deck`.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ModelArgs {
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the retry ceiling for this command.
    #[arg(long)]
    pub max_retries: Option<u32>,
}
