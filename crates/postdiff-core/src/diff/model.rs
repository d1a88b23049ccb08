//! Diff snapshot types.

use serde::{Deserialize, Serialize};

/// Record id of a token in its lexicon
pub type TokenId = u32;

/// Differences for a single token.
///
/// `remains` holds postings stored in the index that should not be there,
/// `missings` holds postings that should be stored but are not. Both are
/// flat vectors in the column's posting shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub token_id: TokenId,
    #[serde(default)]
    pub remains: Vec<u32>,
    #[serde(default)]
    pub missings: Vec<u32>,
}

impl DiffEntry {
    pub fn new(token_id: TokenId, remains: Vec<u32>, missings: Vec<u32>) -> Self {
        Self {
            token_id,
            remains,
            missings,
        }
    }
}

/// Ordered diff entries for one index column.
///
/// Order is the engine's iteration order and is kept as-is in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffCollection {
    entries: Vec<DiffEntry>,
}

impl DiffCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<DiffEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: DiffEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }
}

impl FromIterator<DiffEntry> for DiffCollection {
    fn from_iter<I: IntoIterator<Item = DiffEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DiffCollection {
    type Item = &'a DiffEntry;
    type IntoIter = std::slice::Iter<'a, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Counts gathered while a report is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// Entries emitted (always the collection's length)
    pub n_entries: usize,
    /// Postings across all `remains` arrays
    pub n_remains: usize,
    /// Postings across all `missings` arrays
    pub n_missings: usize,
    /// Tokens emitted with a null value because their key was gone
    pub n_unresolved: usize,
}
