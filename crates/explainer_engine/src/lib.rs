//! Explainer engine: upstream client, retry loop and fan-out over a deck.
mod client;
mod mutator;
mod orchestrator;
mod progress;
mod retry;
mod session;
mod store;
mod types;

pub use client::{Explainer, GenerateSettings, OllamaClient};
pub use mutator::apply_explanation;
pub use orchestrator::{FetchOrchestrator, FETCH_ALL_MAX_RETRIES, REGENERATE_MAX_RETRIES};
pub use progress::{NullSink, ProgressSink};
pub use retry::RetryController;
pub use session::{FetchSession, InFlightGuard, SessionGuard};
pub use store::{EntryStore, InMemoryEntryStore, StoreEvent, Subscription};
pub use types::{
    AttemptFailure, ClientError, FailureKind, FetchOutcome, FetchReport, PipelineEvent,
    SkipReason, TerminalOutcome,
};
