use engine_logging::engine_debug;
use explainer_core::{DeckId, Entry, EntryPatch};

use crate::EntryStore;

/// Write a formatted explanation onto `entry` as its only definition.
///
/// Issues exactly one store update and never touches `selection` or
/// `context`. Returns `false` if the entry was removed in the meantime.
pub fn apply_explanation(
    store: &dyn EntryStore,
    deck_id: DeckId,
    entry: &Entry,
    formatted: &str,
) -> bool {
    let patch = EntryPatch::definition(&entry.selection, formatted);
    let applied = store.update_item(deck_id, entry.id, patch);
    if !applied {
        engine_debug!(
            "Entry \"{}\" (id {}) left deck {} before its explanation arrived",
            entry.selection,
            entry.id,
            deck_id
        );
    }
    applied
}
