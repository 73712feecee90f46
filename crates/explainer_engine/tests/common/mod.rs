#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};

use explainer_core::{Deck, Entry};
use explainer_engine::{
    ClientError, Explainer, FailureKind, PipelineEvent, ProgressSink,
};

pub const TEMPLATE: &str = "Explain the word.";

pub const VALID: &str =
    r#"Sure! {"direct_explanation":"x","simple_analogy":"y","etymology":"z"} Enjoy."#;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Empty,
    Fail(FailureKind),
}

pub fn text(raw: &str) -> Reply {
    Reply::Text(raw.to_string())
}

type CallHook = Box<dyn Fn(&str) + Send + Sync>;

/// Answers per headword from a script; the last reply of a script repeats forever.
#[derive(Default)]
pub struct FakeExplainer {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
    on_call: Option<CallHook>,
}

impl FakeExplainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, selection: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(selection.to_string(), replies.into());
        self
    }

    pub fn on_call(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_call = Some(Box::new(hook));
        self
    }

    pub fn calls_for(&self, selection: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == selection)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_reply(&self, selection: &str) -> Reply {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(selection) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Empty),
            None => Reply::Empty,
        }
    }
}

/// The prompt ends with `selection: "context"`.
fn selection_of(prompt: &str) -> String {
    let last_line = prompt.lines().last().unwrap_or_default();
    last_line
        .split_once(": \"")
        .map(|(selection, _)| selection.to_string())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl Explainer for FakeExplainer {
    async fn explain(&self, prompt: &str) -> Result<Option<String>, ClientError> {
        let selection = selection_of(prompt);
        self.calls.lock().unwrap().push(selection.clone());
        if let Some(hook) = &self.on_call {
            hook(&selection);
        }

        // Suspend like a real network call so sibling entries interleave.
        tokio::task::yield_now().await;

        match self.next_reply(&selection) {
            Reply::Text(raw) => Ok(Some(raw)),
            Reply::Empty => Ok(None),
            Reply::Fail(kind) => Err(ClientError {
                kind,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: PipelineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn deck(entries: Vec<Entry>) -> Deck {
    Deck {
        language: "English".to_string(),
        lang: "en".to_string(),
        title: Some("Sea words".to_string()),
        entries,
        ..Deck::default()
    }
}
