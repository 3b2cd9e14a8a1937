//! Section representation for parts-data files.
//!
//! A section is one `[Name]` block: a part slot in the game's tables. Keys keep
//! the casing they were written with but are matched case-insensitively, the
//! same way the game's own reader treats them.

use serde::Serialize;

/// Key whose value names the part in the section list.
pub const PARTS_NAME_KEY: &str = "PartsName";

/// Shown in place of the part name when a section has none.
pub const UNKNOWN_PART: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, Eq)]
/// One `key=value` line.
pub struct Entry {
    /// Key as written in the file.
    pub key: String,
    /// Value as written in the file; empty when the line had none.
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A named block of entries.
pub struct Section {
    /// Header text between the brackets.
    pub name: String,
    /// Entries in file order, unique by case-insensitive key.
    pub entries: Vec<Entry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Display string for a section paired with the section it stands for.
pub struct SectionLabel {
    /// `"<name>: <PartsName>"`, for display only.
    pub label: String,
    /// Real section name, used for every lookup.
    pub section: String,
}

/// Fold a key for case-insensitive comparison.
pub(crate) fn fold_key(key: &str) -> String {
    key.to_lowercase()
}

impl Section {
    #[must_use]
    /// Empty section with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    #[must_use]
    /// Find an entry by key, ignoring case.
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        let folded = fold_key(key);
        self.entries.iter().find(|e| fold_key(&e.key) == folded)
    }

    #[must_use]
    /// Value for `key`, ignoring case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).map(|e| e.value.as_str())
    }

    /// Overwrite the value of `key`, or append it if absent.
    ///
    /// An existing key keeps its stored casing.
    pub fn set(&mut self, key: &str, value: &str) {
        let folded = fold_key(key);
        match self.entries.iter_mut().find(|e| fold_key(&e.key) == folded) {
            Some(entry) => value.clone_into(&mut entry.value),
            None => self.entries.push(Entry {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    #[must_use]
    /// Label derived from the literal `PartsName` key.
    pub fn display_label(&self) -> String {
        let parts_name = self
            .entries
            .iter()
            .find(|e| e.key == PARTS_NAME_KEY)
            .map(|e| e.value.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN_PART);
        format!("{}: {parts_name}", self.name)
    }
}
