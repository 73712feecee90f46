//! Explainer core: pure data model and text transforms for the explanation pipeline.
mod entry;
mod explanation;
mod patch;
mod prompt;

pub use entry::{Deck, DeckId, Definition, Entry, EntryId, Translation};
pub use explanation::{
    format_explanation, parse_explanation, ExplanationError, ExplanationField,
    StructuredExplanation,
};
pub use patch::{EntryPatch, TRANSLATION_SEPARATOR};
pub use prompt::{build_prompt, DEFAULT_INSTRUCTIONS};
