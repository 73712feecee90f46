use std::sync::atomic::{AtomicUsize, Ordering};

use explainer_engine::{PipelineEvent, ProgressSink, TerminalOutcome};

/// Prints one line per finished entry to stdout.
pub struct ConsoleProgress {
    total: usize,
    finished: AtomicUsize,
}

impl ConsoleProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            finished: AtomicUsize::new(0),
        }
    }
}

impl ProgressSink for ConsoleProgress {
    fn emit(&self, event: PipelineEvent) {
        if let PipelineEvent::Finished {
            selection,
            attempts,
            outcome,
            ..
        } = event
        {
            let done = self.finished.fetch_add(1, Ordering::Relaxed) + 1;
            println!(
                "[{done}/{total}] {selection}: {status} ({attempts} attempt{plural})",
                total = self.total,
                status = describe(outcome),
                plural = if attempts == 1 { "" } else { "s" },
            );
        }
    }
}

fn describe(outcome: TerminalOutcome) -> &'static str {
    match outcome {
        TerminalOutcome::Applied => "explained",
        TerminalOutcome::GaveUp => "gave up",
        TerminalOutcome::EmptyResponse => "empty response",
        TerminalOutcome::EntryGone => "entry removed",
    }
}
