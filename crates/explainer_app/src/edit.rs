//! Offline corrections to one entry of a deck.

use engine_logging::engine_info;
use explainer_core::{Deck, EntryPatch};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("deck has {len} entries, no row {row}")]
    NoSuchRow { row: usize, len: usize },
    #[error("nothing to change, pass --selection or --context")]
    NothingToChange,
}

/// Index of a 1-based row number, as rows are displayed.
pub fn entry_index(deck: &Deck, row: usize) -> Result<usize, EditError> {
    match row.checked_sub(1) {
        Some(index) if index < deck.entries.len() => Ok(index),
        _ => Err(EditError::NoSuchRow {
            row,
            len: deck.entries.len(),
        }),
    }
}

pub fn edit_entry(
    deck: &mut Deck,
    row: usize,
    selection: Option<&str>,
    context: Option<&str>,
) -> Result<(), EditError> {
    let index = entry_index(deck, row)?;
    let patches: Vec<EntryPatch> = [
        selection.map(|selection| EntryPatch::headword(&deck.entries[index], selection)),
        context.map(EntryPatch::context),
    ]
    .into_iter()
    .flatten()
    .collect();
    if patches.is_empty() {
        return Err(EditError::NothingToChange);
    }

    let entry = &mut deck.entries[index];
    for patch in patches {
        patch.apply_to(entry);
    }
    engine_info!("Edited row {}: {:?}", row, entry.selection);
    Ok(())
}
