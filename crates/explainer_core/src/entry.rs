use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type DeckId = u64;

/// Stable key of an entry within the store. Assigned on insertion, never reused.
pub type EntryId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Definition {
    pub text: String,
    #[serde(rename = "tr", alias = "translations", default)]
    pub translations: Vec<Translation>,
}

/// One vocabulary item: a headword, the passage it was picked from, and its definitions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    #[serde(skip)]
    pub id: EntryId,
    #[serde(default)]
    pub selection: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub def: Vec<Definition>,
    /// Keys this crate does not model, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    pub fn new(selection: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            selection: selection.into(),
            context: context.into(),
            ..Self::default()
        }
    }

    /// Only entries with both a headword and a context are sent upstream.
    pub fn is_eligible(&self) -> bool {
        !self.selection.is_empty() && !self.context.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deck {
    pub language: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "words", default)]
    pub entries: Vec<Entry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Deck {
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(&self.language)
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn eligible_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| entry.is_eligible())
    }
}
