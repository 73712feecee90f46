use crate::{Definition, Entry, Translation};

/// Separator used to split a definition string into translation items.
pub const TRANSLATION_SEPARATOR: &str = "; ";

/// Partial update of an entry. `None` leaves the field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryPatch {
    pub selection: Option<String>,
    pub context: Option<String>,
    pub def: Option<Vec<Definition>>,
}

impl EntryPatch {
    /// Replace the definition list with a single definition for `selection`.
    ///
    /// This is the only patch the explanation pipeline produces.
    pub fn definition(selection: &str, text: &str) -> Self {
        Self {
            def: Some(vec![Definition {
                text: selection.to_string(),
                translations: text
                    .split(TRANSLATION_SEPARATOR)
                    .map(|part| Translation {
                        text: part.to_string(),
                    })
                    .collect(),
            }]),
            ..Self::default()
        }
    }

    /// Rename the headword; every definition is re-titled to match.
    pub fn headword(entry: &Entry, selection: &str) -> Self {
        Self {
            selection: Some(selection.to_string()),
            def: Some(
                entry
                    .def
                    .iter()
                    .map(|definition| Definition {
                        text: selection.to_string(),
                        translations: definition.translations.clone(),
                    })
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn context(context: &str) -> Self {
        Self {
            context: Some(context.to_string()),
            ..Self::default()
        }
    }

    /// Merge the patch into `entry`, leaving unset fields as they are.
    pub fn apply_to(self, entry: &mut Entry) {
        if let Some(selection) = self.selection {
            entry.selection = selection;
        }
        if let Some(context) = self.context {
            entry.context = context;
        }
        if let Some(def) = self.def {
            entry.def = def;
        }
    }
}
