//! In-memory catalog serving registered diff snapshots.
//!
//! Used by tests and by callers that already hold their lexicon and diff in
//! memory. It never derives a diff: [`DiffEngine::diff`] returns whatever
//! snapshot was registered for the column (an empty one if none was).

use crate::catalog::{
    pseudo_column, Catalog, ColumnInfo, DiffEngine, KeyType, ObjectKind, TableInfo, TokenTable,
    MAX_KEY_SIZE,
};
use crate::diff::{DiffCollection, TokenId};
use crate::errors::{ExError, ExErrorKind, PostDiffError, Result};
use crate::posting::ColumnFlags;
use std::cell::Cell;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct MemoryColumn {
    info: ColumnInfo,
    diff: Option<DiffCollection>,
}

#[derive(Debug, Clone)]
struct MemoryTable {
    info: TableInfo,
    keys: BTreeMap<TokenId, Vec<u8>>,
    columns: BTreeMap<String, MemoryColumn>,
}

/// Catalog held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: BTreeMap<String, MemoryTable>,
    diff_calls: Cell<usize>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table. Keyed kinds need a key type.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `kind` is not a table kind or the key type does not
    /// fit the kind.
    pub fn add_table(
        &mut self,
        name: &str,
        kind: ObjectKind,
        key_type: Option<KeyType>,
    ) -> Result<&mut Self> {
        if !kind.is_table() {
            return Err(invalid(format!("{} is not a table kind", kind)));
        }
        if kind.is_lexicon() != key_type.is_some() {
            return Err(invalid(format!(
                "table <{}> of kind {} cannot have key type {:?}",
                name, kind, key_type
            )));
        }
        self.tables.insert(
            name.to_string(),
            MemoryTable {
                info: TableInfo {
                    name: name.to_string(),
                    kind,
                    key_type,
                    max_key_size: MAX_KEY_SIZE,
                },
                keys: BTreeMap::new(),
                columns: BTreeMap::new(),
            },
        );
        Ok(self)
    }

    /// Register a lexicon (patricia trie keyed)
    ///
    /// # Errors
    ///
    /// Never for the kinds used here; kept fallible to share `add_table`.
    pub fn add_lexicon(&mut self, name: &str, key_type: KeyType) -> Result<&mut Self> {
        self.add_table(name, ObjectKind::TablePatKey, Some(key_type))
    }

    /// Lower a table's key size limit; keys already stored are not checked,
    /// so oversized keys can be planted for lookup tests.
    ///
    /// # Errors
    ///
    /// `NotFound` if the table is unknown.
    pub fn set_max_key_size(&mut self, table: &str, max_key_size: usize) -> Result<&mut Self> {
        self.table_mut(table)?.info.max_key_size = max_key_size;
        Ok(self)
    }

    /// # Errors
    ///
    /// `NotFound` if the table is unknown, `InvalidInput` if it is not a lexicon.
    pub fn insert_key(&mut self, table: &str, token_id: TokenId, key: &[u8]) -> Result<&mut Self> {
        let entry = self.table_mut(table)?;
        if !entry.info.kind.is_lexicon() {
            return Err(invalid(format!("table <{}> has no keys", table)));
        }
        entry.keys.insert(token_id, key.to_vec());
        Ok(self)
    }

    /// Drop a key, as a concurrent delete would
    ///
    /// # Errors
    ///
    /// `NotFound` if the table is unknown.
    pub fn remove_key(&mut self, table: &str, token_id: TokenId) -> Result<&mut Self> {
        self.table_mut(table)?.keys.remove(&token_id);
        Ok(self)
    }

    /// # Errors
    ///
    /// `NotFound` if the table is unknown, `InvalidInput` if `kind` is not a
    /// stored column kind.
    pub fn add_column(
        &mut self,
        table: &str,
        name: &str,
        kind: ObjectKind,
        flags: ColumnFlags,
    ) -> Result<&mut Self> {
        if !kind.is_column() || kind == ObjectKind::Accessor {
            return Err(invalid(format!("{} is not a column kind", kind)));
        }
        let entry = self.table_mut(table)?;
        entry.columns.insert(
            name.to_string(),
            MemoryColumn {
                info: ColumnInfo {
                    table: table.to_string(),
                    name: name.to_string(),
                    kind,
                    flags,
                },
                diff: None,
            },
        );
        Ok(self)
    }

    /// Register the snapshot returned for an index column
    ///
    /// # Errors
    ///
    /// `NotFound` if the table or column is unknown, `InvalidInput` if the
    /// column is not an index column.
    pub fn set_diff(
        &mut self,
        table: &str,
        column: &str,
        diff: DiffCollection,
    ) -> Result<&mut Self> {
        let entry = self
            .table_mut(table)?
            .columns
            .get_mut(column)
            .ok_or_else(|| {
                ExError::new(ExErrorKind::NotFound)
                    .with_table(table)
                    .with_column(column)
                    .with_message(format!("column <{}.{}> not registered", table, column))
            })?;
        if !entry.info.kind.is_index_column() {
            return Err(invalid(format!(
                "column <{}.{}> is {}, not an index column",
                table, column, entry.info.kind
            )));
        }
        entry.diff = Some(diff);
        Ok(self)
    }

    /// Number of times the diff engine side has been invoked
    pub fn diff_calls(&self) -> usize {
        self.diff_calls.get()
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut MemoryTable> {
        self.tables.get_mut(name).ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_table(name)
                .with_message(format!("table <{}> not registered", name))
        })
    }
}

fn invalid(message: String) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("memory_catalog")
        .with_message(message)
}

impl Catalog for MemoryCatalog {
    fn find_table(&self, name: &str) -> Result<Option<TableInfo>> {
        Ok(self.tables.get(name).map(|t| t.info.clone()))
    }

    fn find_column(&self, table: &TableInfo, name: &str) -> Result<Option<ColumnInfo>> {
        if let Some(accessor) = pseudo_column(table, name) {
            return Ok(Some(accessor));
        }
        Ok(self
            .tables
            .get(&table.name)
            .and_then(|t| t.columns.get(name))
            .map(|c| c.info.clone()))
    }

    fn open_lexicon<'a>(&'a self, table: &TableInfo) -> Result<Box<dyn TokenTable + 'a>> {
        let entry = self.tables.get(&table.name).ok_or_else(|| {
            ExError::from(PostDiffError::TableNotFound {
                table: table.name.clone(),
            })
        })?;
        let key_type = match (entry.info.kind.is_lexicon(), entry.info.key_type) {
            (true, Some(key_type)) => key_type,
            _ => {
                return Err(PostDiffError::NotALexicon {
                    table: table.name.clone(),
                    kind: entry.info.kind.to_string(),
                }
                .into())
            }
        };
        Ok(Box::new(MemoryLexicon {
            table: entry,
            key_type,
        }))
    }
}

impl DiffEngine for MemoryCatalog {
    fn diff(&self, column: &ColumnInfo) -> Result<DiffCollection> {
        self.diff_calls.set(self.diff_calls.get() + 1);
        let stored = self
            .tables
            .get(&column.table)
            .and_then(|t| t.columns.get(&column.name))
            .ok_or_else(|| {
                ExError::new(ExErrorKind::NotFound)
                    .with_op("diff")
                    .with_table(column.table.clone())
                    .with_column(column.name.clone())
                    .with_message(format!("column <{}> vanished", column.full_name()))
            })?;
        Ok(stored.diff.clone().unwrap_or_default())
    }
}

struct MemoryLexicon<'a> {
    table: &'a MemoryTable,
    key_type: KeyType,
}

impl TokenTable for MemoryLexicon<'_> {
    fn name(&self) -> &str {
        &self.table.info.name
    }

    fn key_type(&self) -> KeyType {
        self.key_type
    }

    fn max_key_size(&self) -> usize {
        self.table.info.max_key_size
    }

    fn get_key(&self, token_id: TokenId, buf: &mut [u8]) -> Result<usize> {
        let key = self.table.keys.get(&token_id).ok_or_else(|| {
            ExError::from(PostDiffError::TokenKeyMissing {
                table: self.table.info.name.clone(),
                token_id,
            })
        })?;
        if key.len() > buf.len() {
            return Err(PostDiffError::KeyTooLarge {
                table: self.table.info.name.clone(),
                token_id,
                size: key.len(),
                capacity: buf.len(),
            }
            .into());
        }
        buf[..key.len()].copy_from_slice(key);
        Ok(key.len())
    }
}
