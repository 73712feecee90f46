use crate::PipelineEvent;

/// Receives per-entry progress while a fetch runs.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}
