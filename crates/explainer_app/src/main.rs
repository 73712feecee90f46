mod cli;
mod config;
mod deck_file;
mod edit;
mod logging;
mod progress;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use engine_logging::engine_info;
use explainer_engine::{
    EntryStore, FetchOrchestrator, FetchOutcome, InMemoryEntryStore, OllamaClient,
    RetryController,
};
use log::LevelFilter;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;
use crate::progress::ConsoleProgress;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, source) =
        config::load(cli.config.as_deref()).context("loading configuration")?;
    apply_overrides(&mut config, &cli.command);

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        config.log_level()?
    };
    logging::initialize(cli.log, level);
    match &source {
        Some(path) => engine_info!("Loaded configuration from {:?}", path),
        None => engine_info!("No configuration file, using defaults"),
    }

    run(&cli.command, &config)
}

fn apply_overrides(config: &mut AppConfig, command: &Command) {
    let Some(args) = command.model_args() else {
        return;
    };
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(max_retries) = args.max_retries {
        match command {
            Command::FetchAll { .. } => config.fetch_all_max_retries = max_retries,
            Command::Regenerate { .. } => config.regenerate_max_retries = max_retries,
            Command::Edit { .. } => {}
        }
    }
}

fn run(command: &Command, config: &AppConfig) -> anyhow::Result<()> {
    let args = command.deck_args();
    let mut deck = deck_file::load_deck(&args.deck)?;
    let out = args.out.as_deref().unwrap_or(&args.deck);

    let target = match command {
        Command::FetchAll { .. } => None,
        Command::Regenerate { entry, .. } => Some(edit::entry_index(&deck, *entry)?),
        Command::Edit {
            entry,
            selection,
            context,
            ..
        } => {
            edit::edit_entry(&mut deck, *entry, selection.as_deref(), context.as_deref())?;
            deck_file::save_deck(out, &deck)?;
            engine_info!("Wrote {:?}", out);
            return Ok(());
        }
    };
    let total = match target {
        Some(_) => 1,
        None => deck.eligible_entries().count(),
    };

    let store = Arc::new(InMemoryEntryStore::new());
    let deck_id = store.insert_deck(deck);
    let target = match target {
        Some(row) => Some(
            store
                .get_deck(deck_id)
                .and_then(|deck| deck.entries.get(row).map(|entry| entry.id))
                .context("entry disappeared before the run started")?,
        ),
        None => None,
    };

    let client = OllamaClient::new(config.generate_settings()).context("building upstream client")?;
    let controller = RetryController::new(Arc::new(client), store.clone(), config.instructions()?)
        .with_sink(Arc::new(ConsoleProgress::new(total)));
    let orchestrator = FetchOrchestrator::new(controller);

    engine_info!("Using model {} at {}", config.model, config.endpoint);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let outcome = runtime.block_on(async {
        match target {
            Some(entry_id) => {
                orchestrator
                    .regenerate_one(deck_id, entry_id, config.regenerate_max_retries)
                    .await
            }
            None => {
                orchestrator
                    .fetch_all(deck_id, config.fetch_all_max_retries)
                    .await
            }
        }
    });

    let report = match outcome {
        FetchOutcome::Completed(report) => report,
        FetchOutcome::Skipped(reason) => {
            println!("Nothing to do: {reason}");
            return Ok(());
        }
    };
    println!(
        "{} explained, {} gave up, {} empty, out of {} eligible",
        report.applied, report.gave_up, report.empty, report.eligible
    );

    let deck = store
        .get_deck(deck_id)
        .context("deck disappeared from the store")?;
    deck_file::save_deck(out, &deck)?;
    engine_info!("Wrote {:?}", out);
    Ok(())
}
