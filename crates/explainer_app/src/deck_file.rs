use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use explainer_core::Deck;
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum DeckFileError {
    #[error("failed to read deck {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("deck {path:?} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write deck {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

pub fn load_deck(path: &Path) -> Result<Deck, DeckFileError> {
    let content = fs::read_to_string(path).map_err(|source| DeckFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DeckFileError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the deck as pretty JSON through a temp file in the target directory,
/// so a crash never leaves a half-written deck behind.
pub fn save_deck(path: &Path, deck: &Deck) -> Result<(), DeckFileError> {
    let content = serde_json::to_string_pretty(deck).map_err(|source| DeckFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomically(path, &content).map_err(|source| DeckFileError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomically(target: &Path, content: &str) -> io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|err| err.error)?;
    Ok(())
}
