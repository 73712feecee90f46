use engine_logging::{engine_info, engine_warn};
use explainer_core::{DeckId, Entry, EntryId};
use futures_util::future::join_all;

use crate::{
    FetchOutcome, FetchReport, FetchSession, RetryController, SessionGuard, SkipReason,
};

/// Retry ceiling for a whole-deck fetch: effectively keep trying.
pub const FETCH_ALL_MAX_RETRIES: u32 = 100;

/// Retry ceiling for an interactive single-entry regenerate.
pub const REGENERATE_MAX_RETRIES: u32 = 3;

/// Fans out one retry loop per eligible entry and owns the busy flag.
///
/// All entry futures are joined on the calling task; they interleave at
/// their network calls and never run in parallel.
pub struct FetchOrchestrator {
    controller: RetryController,
    session: FetchSession,
}

impl FetchOrchestrator {
    pub fn new(controller: RetryController) -> Self {
        Self {
            controller,
            session: FetchSession::new(),
        }
    }

    pub fn session(&self) -> &FetchSession {
        &self.session
    }

    /// Explain every eligible entry of the deck. A no-op while another run is active.
    pub async fn fetch_all(&self, deck_id: DeckId, max_retries: u32) -> FetchOutcome {
        let Some(deck) = self.controller.store().get_deck(deck_id) else {
            engine_warn!("Fetch requested for unknown deck {}", deck_id);
            return FetchOutcome::Skipped(SkipReason::DeckNotFound);
        };
        let Some(session) = self.session.try_begin() else {
            engine_info!("Fetch already running, ignoring request for deck {}", deck_id);
            return FetchOutcome::Skipped(SkipReason::Busy);
        };

        let entries: Vec<&Entry> = deck.eligible_entries().collect();
        engine_info!(
            "Fetching explanations for {} of {} entries in \"{}\"",
            entries.len(),
            deck.entries.len(),
            deck.display_name()
        );

        let report = self.run(&session, deck_id, entries, max_retries).await;
        drop(session);

        engine_info!(
            "Fetch for \"{}\" done: {} applied, {} gave up, {} empty, {} removed",
            deck.display_name(),
            report.applied,
            report.gave_up,
            report.empty,
            report.gone
        );
        FetchOutcome::Completed(report)
    }

    /// Explain a single entry. Missing or ineligible entries leave the busy flag untouched.
    pub async fn regenerate_one(
        &self,
        deck_id: DeckId,
        entry_id: EntryId,
        max_retries: u32,
    ) -> FetchOutcome {
        let Some(deck) = self.controller.store().get_deck(deck_id) else {
            engine_warn!("Regenerate requested for unknown deck {}", deck_id);
            return FetchOutcome::Skipped(SkipReason::DeckNotFound);
        };
        let Some(entry) = deck.entry(entry_id) else {
            engine_warn!("Regenerate requested for unknown entry {}", entry_id);
            return FetchOutcome::Skipped(SkipReason::EntryNotFound);
        };
        if !entry.is_eligible() {
            return FetchOutcome::Skipped(SkipReason::NotEligible);
        }
        let Some(session) = self.session.try_begin() else {
            engine_info!("Fetch already running, ignoring regenerate of \"{}\"", entry.selection);
            return FetchOutcome::Skipped(SkipReason::Busy);
        };

        let report = self.run(&session, deck_id, vec![entry], max_retries).await;
        FetchOutcome::Completed(report)
    }

    async fn run(
        &self,
        session: &SessionGuard,
        deck_id: DeckId,
        entries: Vec<&Entry>,
        max_retries: u32,
    ) -> FetchReport {
        let tasks = entries.into_iter().map(|entry| {
            let in_flight = session.track();
            async move {
                let outcome = self.controller.attempt(deck_id, entry, max_retries).await;
                drop(in_flight);
                outcome
            }
        });
        let outcomes = join_all(tasks).await;

        let mut report = FetchReport {
            eligible: outcomes.len(),
            ..FetchReport::default()
        };
        for outcome in outcomes {
            report.record(outcome);
        }
        report
    }
}
