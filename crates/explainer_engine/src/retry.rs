use std::sync::Arc;

use engine_logging::{
    engine_debug, engine_error, engine_trace, engine_warn, log_preview, MAX_LOGGED_RESPONSE,
};
use explainer_core::{build_prompt, format_explanation, parse_explanation, DeckId, Entry};

use crate::{
    apply_explanation, AttemptFailure, EntryStore, Explainer, NullSink, PipelineEvent,
    ProgressSink, TerminalOutcome,
};

/// Drives one entry to a terminal outcome.
///
/// Transport failures and unusable model output are retried back to back,
/// at most `max_retries` times. A successful response without a body ends the
/// task without a retry.
#[derive(Clone)]
pub struct RetryController {
    explainer: Arc<dyn Explainer>,
    store: Arc<dyn EntryStore>,
    instructions: Arc<str>,
    sink: Arc<dyn ProgressSink>,
}

impl RetryController {
    pub fn new(
        explainer: Arc<dyn Explainer>,
        store: Arc<dyn EntryStore>,
        instructions: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            explainer,
            store,
            instructions: instructions.into(),
            sink: Arc::new(NullSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn store(&self) -> &Arc<dyn EntryStore> {
        &self.store
    }

    pub async fn attempt(&self, deck_id: DeckId, entry: &Entry, max_retries: u32) -> TerminalOutcome {
        let prompt = build_prompt(&self.instructions, &entry.selection, &entry.context);
        let mut retries: u32 = 0;

        loop {
            let attempt = retries + 1;
            engine_trace!("Requesting \"{}\" (attempt {})", entry.selection, attempt);
            self.sink.emit(PipelineEvent::AttemptStarted {
                entry_id: entry.id,
                selection: entry.selection.clone(),
                attempt,
            });

            let failure = match self.explainer.explain(&prompt).await {
                Err(err) => AttemptFailure::Transport(err),
                Ok(None) => {
                    // Not retried, unlike every other failure.
                    engine_warn!(
                        "Empty response for \"{}\" (attempt {}), leaving entry unchanged",
                        entry.selection,
                        attempt
                    );
                    return self.finish(entry, attempt, TerminalOutcome::EmptyResponse);
                }
                Ok(Some(raw)) => match parse_explanation(&raw) {
                    Ok(explanation) => {
                        let formatted = format_explanation(&explanation);
                        let outcome =
                            if apply_explanation(self.store.as_ref(), deck_id, entry, &formatted) {
                                TerminalOutcome::Applied
                            } else {
                                TerminalOutcome::EntryGone
                            };
                        return self.finish(entry, attempt, outcome);
                    }
                    Err(err) => {
                        engine_debug!(
                            "Rejected output for \"{}\": {}",
                            entry.selection,
                            log_preview(&raw, MAX_LOGGED_RESPONSE)
                        );
                        AttemptFailure::Explanation(err)
                    }
                },
            };

            if retries >= max_retries {
                engine_error!(
                    "Giving up on \"{}\" after {} attempts: {}",
                    entry.selection,
                    attempt,
                    failure
                );
                return self.finish(entry, attempt, TerminalOutcome::GaveUp);
            }

            engine_warn!(
                "Retrying \"{}\" (attempt {}): {}",
                entry.selection,
                attempt + 1,
                failure
            );
            self.sink.emit(PipelineEvent::Retrying {
                entry_id: entry.id,
                selection: entry.selection.clone(),
                attempt,
                failure,
            });
            retries += 1;
        }
    }

    fn finish(&self, entry: &Entry, attempts: u32, outcome: TerminalOutcome) -> TerminalOutcome {
        self.sink.emit(PipelineEvent::Finished {
            entry_id: entry.id,
            selection: entry.selection.clone(),
            attempts,
            outcome,
        });
        outcome
    }
}
