use std::fmt;

use explainer_core::{EntryId, ExplanationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ClientError {}

/// Transport-level failure classes. All of them are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidEndpoint,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Why a single attempt did not produce an explanation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptFailure {
    #[error("transport failure: {0}")]
    Transport(#[from] ClientError),
    #[error(transparent)]
    Explanation(#[from] ExplanationError),
}

/// How one entry's task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalOutcome {
    /// The explanation was written to the store.
    Applied,
    /// Every attempt failed; the entry keeps its previous definition.
    GaveUp,
    /// The upstream answered without a `response` body. Not retried.
    EmptyResponse,
    /// A valid explanation arrived but the entry had been removed meanwhile.
    EntryGone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    AttemptStarted {
        entry_id: EntryId,
        selection: String,
        attempt: u32,
    },
    Retrying {
        entry_id: EntryId,
        selection: String,
        attempt: u32,
        failure: AttemptFailure,
    },
    Finished {
        entry_id: EntryId,
        selection: String,
        attempts: u32,
        outcome: TerminalOutcome,
    },
}

/// Per-outcome counts for one fetch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchReport {
    pub eligible: usize,
    pub applied: usize,
    pub gave_up: usize,
    pub empty: usize,
    pub gone: usize,
}

impl FetchReport {
    pub(crate) fn record(&mut self, outcome: TerminalOutcome) {
        match outcome {
            TerminalOutcome::Applied => self.applied += 1,
            TerminalOutcome::GaveUp => self.gave_up += 1,
            TerminalOutcome::EmptyResponse => self.empty += 1,
            TerminalOutcome::EntryGone => self.gone += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Busy,
    DeckNotFound,
    EntryNotFound,
    NotEligible,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Busy => write!(f, "a fetch is already running"),
            SkipReason::DeckNotFound => write!(f, "deck not found"),
            SkipReason::EntryNotFound => write!(f, "entry not found"),
            SkipReason::NotEligible => write!(f, "entry has no headword or context"),
        }
    }
}

/// Result of a fetch-all or regenerate request. A skip is a no-op, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Completed(FetchReport),
    Skipped(SkipReason),
}
