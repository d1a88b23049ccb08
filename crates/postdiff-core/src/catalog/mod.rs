//! Catalog seam: tables, columns, lexicon keys and the diff engine.
//!
//! The report builder and the command surface only see these traits. The
//! crate ships [`memory::MemoryCatalog`]; `postdiff-store` provides a SQLite
//! backed implementation.

pub mod memory;

use crate::diff::{DiffCollection, TokenId};
use crate::errors::Result;
use crate::posting::{ColumnFlags, PostingShape};
use std::fmt;

pub use memory::MemoryCatalog;

/// Default upper bound on a lexicon key, in bytes
pub const MAX_KEY_SIZE: usize = 4096;

/// Kind of a catalog object, as reported in argument errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    TableHashKey,
    TablePatKey,
    TableDatKey,
    TableNoKey,
    ColumnFixSize,
    ColumnVarSize,
    ColumnIndex,
    /// Pseudo column such as `_key`, resolved on the fly
    Accessor,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::TableHashKey => "table:hash_key",
            ObjectKind::TablePatKey => "table:pat_key",
            ObjectKind::TableDatKey => "table:dat_key",
            ObjectKind::TableNoKey => "table:no_key",
            ObjectKind::ColumnFixSize => "column:fix_size",
            ObjectKind::ColumnVarSize => "column:var_size",
            ObjectKind::ColumnIndex => "column:index",
            ObjectKind::Accessor => "accessor",
        }
    }

    /// Parse a kind string produced by [`ObjectKind::as_str`]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "table:hash_key" => Some(ObjectKind::TableHashKey),
            "table:pat_key" => Some(ObjectKind::TablePatKey),
            "table:dat_key" => Some(ObjectKind::TableDatKey),
            "table:no_key" => Some(ObjectKind::TableNoKey),
            "column:fix_size" => Some(ObjectKind::ColumnFixSize),
            "column:var_size" => Some(ObjectKind::ColumnVarSize),
            "column:index" => Some(ObjectKind::ColumnIndex),
            "accessor" => Some(ObjectKind::Accessor),
            _ => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(
            self,
            ObjectKind::TableHashKey
                | ObjectKind::TablePatKey
                | ObjectKind::TableDatKey
                | ObjectKind::TableNoKey
        )
    }

    /// Token-keyed tables; the only tables an index column can be diffed on
    pub fn is_lexicon(&self) -> bool {
        matches!(
            self,
            ObjectKind::TableHashKey | ObjectKind::TablePatKey | ObjectKind::TableDatKey
        )
    }

    pub fn is_column(&self) -> bool {
        matches!(
            self,
            ObjectKind::ColumnFixSize
                | ObjectKind::ColumnVarSize
                | ObjectKind::ColumnIndex
                | ObjectKind::Accessor
        )
    }

    pub fn is_index_column(&self) -> bool {
        matches!(self, ObjectKind::ColumnIndex)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of a lexicon's keys; decides how a key renders in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// UTF-8 text
    ShortText,
    /// Opaque bytes, rendered as base64
    Binary,
    UInt32,
    Int32,
    UInt64,
    Int64,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::ShortText => "ShortText",
            KeyType::Binary => "Binary",
            KeyType::UInt32 => "UInt32",
            KeyType::Int32 => "Int32",
            KeyType::UInt64 => "UInt64",
            KeyType::Int64 => "Int64",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ShortText" => Some(KeyType::ShortText),
            "Binary" => Some(KeyType::Binary),
            "UInt32" => Some(KeyType::UInt32),
            "Int32" => Some(KeyType::Int32),
            "UInt64" => Some(KeyType::UInt64),
            "Int64" => Some(KeyType::Int64),
            _ => None,
        }
    }

    /// Exact key length for integer key types
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            KeyType::ShortText | KeyType::Binary => None,
            KeyType::UInt32 | KeyType::Int32 => Some(4),
            KeyType::UInt64 | KeyType::Int64 => Some(8),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved table descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub kind: ObjectKind,
    /// Key type; `None` for tables without keys
    pub key_type: Option<KeyType>,
    pub max_key_size: usize,
}

/// Resolved column descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub table: String,
    pub name: String,
    pub kind: ObjectKind,
    pub flags: ColumnFlags,
}

impl ColumnInfo {
    /// Posting tuple shape of this column
    pub fn shape(&self) -> PostingShape {
        PostingShape::from_flags(self.flags)
    }

    /// `Table.column` display name
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

/// Pseudo columns every keyed table exposes.
const PSEUDO_COLUMNS: &[&str] = &["_id", "_key", "_value"];

/// Resolve a pseudo column (`_id`, `_key`, `_value`) to an accessor descriptor.
///
/// Catalog implementations call this before looking up real columns.
pub fn pseudo_column(table: &TableInfo, name: &str) -> Option<ColumnInfo> {
    if !PSEUDO_COLUMNS.contains(&name) {
        return None;
    }
    if name == "_key" && table.key_type.is_none() {
        return None;
    }
    Some(ColumnInfo {
        table: table.name.clone(),
        name: name.to_string(),
        kind: ObjectKind::Accessor,
        flags: ColumnFlags::empty(),
    })
}

/// Point lookup of lexicon keys by token id.
pub trait TokenTable {
    /// Lexicon name, used in error context
    fn name(&self) -> &str;

    fn key_type(&self) -> KeyType;

    /// Largest key this lexicon may hold; sizes the caller's lookup buffer
    fn max_key_size(&self) -> usize;

    /// Copy the key of `token_id` into `buf` and return its exact length.
    ///
    /// # Errors
    ///
    /// - `KeyLookupFailed` if the token has no key
    /// - `KeyTooLarge` if the key does not fit in `buf` (never truncated)
    fn get_key(&self, token_id: TokenId, buf: &mut [u8]) -> Result<usize>;
}

/// Name resolution over tables and columns.
pub trait Catalog {
    /// # Errors
    ///
    /// Storage failures only; an unknown name is `Ok(None)`.
    fn find_table(&self, name: &str) -> Result<Option<TableInfo>>;

    /// # Errors
    ///
    /// Storage failures only; an unknown name is `Ok(None)`.
    fn find_column(&self, table: &TableInfo, name: &str) -> Result<Option<ColumnInfo>>;

    /// Open the key lookup side of a lexicon.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `table` is not a lexicon, or a storage failure.
    fn open_lexicon<'a>(&'a self, table: &TableInfo) -> Result<Box<dyn TokenTable + 'a>>;
}

/// Producer of diff snapshots for index columns.
pub trait DiffEngine {
    /// # Errors
    ///
    /// Engine-specific; the error's kind and message are surfaced to the caller.
    fn diff(&self, column: &ColumnInfo) -> Result<DiffCollection>;
}
