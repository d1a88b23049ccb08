#![allow(clippy::result_large_err)]

use crate::catalog::StoredDiffEngine;
use crate::db;
use crate::errors::{from_rusqlite, Result};
use postdiff_core::catalog::{
    pseudo_column, Catalog, ColumnInfo, KeyType, ObjectKind, TableInfo, TokenTable,
};
use postdiff_core::diff::TokenId;
use postdiff_core::errors::{ExError, ExErrorKind, PostDiffError};
use postdiff_core::posting::ColumnFlags;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

/// Catalog read from a migrated store connection
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Wrap a connection that already has the store schema
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open the store at `path`, creating and migrating it if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(db::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(db::open_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Mutable access, e.g. for seed import
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Diff engine over the snapshots stored alongside this catalog
    pub fn diff_engine(&self) -> StoredDiffEngine<'_> {
        StoredDiffEngine::new(&self.conn)
    }
}

fn corrupt_row(what: &str, name: &str, value: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("catalog_read")
        .with_message(format!(
            "{} <{}> has unreadable value: {}",
            what, name, value
        ))
}

impl Catalog for SqliteCatalog {
    fn find_table(&self, name: &str) -> Result<Option<TableInfo>> {
        let row: Option<(String, Option<String>, i64)> = self
            .conn
            .query_row(
                "SELECT kind, key_type, max_key_size FROM catalog_tables WHERE name = ?1",
                [name],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(from_rusqlite)?;

        let Some((kind, key_type, max_key_size)) = row else {
            return Ok(None);
        };
        let kind = ObjectKind::parse(&kind).ok_or_else(|| corrupt_row("table", name, &kind))?;
        let key_type = key_type
            .map(|k| KeyType::parse(&k).ok_or_else(|| corrupt_row("table", name, &k)))
            .transpose()?;
        let max_key_size = usize::try_from(max_key_size)
            .map_err(|_| corrupt_row("table", name, &max_key_size.to_string()))?;

        Ok(Some(TableInfo {
            name: name.to_string(),
            kind,
            key_type,
            max_key_size,
        }))
    }

    fn find_column(&self, table: &TableInfo, name: &str) -> Result<Option<ColumnInfo>> {
        if let Some(accessor) = pseudo_column(table, name) {
            return Ok(Some(accessor));
        }

        let row: Option<(String, u32)> = self
            .conn
            .query_row(
                "SELECT kind, flags FROM table_columns WHERE table_name = ?1 AND name = ?2",
                rusqlite::params![table.name, name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(from_rusqlite)?;

        let Some((kind, flags)) = row else {
            return Ok(None);
        };
        let full_name = format!("{}.{}", table.name, name);
        let kind =
            ObjectKind::parse(&kind).ok_or_else(|| corrupt_row("column", &full_name, &kind))?;

        Ok(Some(ColumnInfo {
            table: table.name.clone(),
            name: name.to_string(),
            kind,
            flags: ColumnFlags::from_bits_retain(flags),
        }))
    }

    fn open_lexicon<'a>(&'a self, table: &TableInfo) -> Result<Box<dyn TokenTable + 'a>> {
        let key_type = match (table.kind.is_lexicon(), table.key_type) {
            (true, Some(key_type)) => key_type,
            _ => {
                return Err(PostDiffError::NotALexicon {
                    table: table.name.clone(),
                    kind: table.kind.to_string(),
                }
                .into())
            }
        };
        Ok(Box::new(SqliteLexicon {
            conn: &self.conn,
            name: table.name.clone(),
            key_type,
            max_key_size: table.max_key_size,
        }))
    }
}

/// Key lookups against the `tokens` table of one lexicon
pub struct SqliteLexicon<'c> {
    conn: &'c Connection,
    name: String,
    key_type: KeyType,
    max_key_size: usize,
}

impl TokenTable for SqliteLexicon<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn key_type(&self) -> KeyType {
        self.key_type
    }

    fn max_key_size(&self) -> usize {
        self.max_key_size
    }

    fn get_key(&self, token_id: TokenId, buf: &mut [u8]) -> Result<usize> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT key FROM tokens WHERE table_name = ?1 AND token_id = ?2")
            .map_err(from_rusqlite)?;
        let key: Vec<u8> = stmt
            .query_row(rusqlite::params![self.name, token_id], |row| row.get(0))
            .optional()
            .map_err(from_rusqlite)?
            .ok_or_else(|| {
                ExError::from(PostDiffError::TokenKeyMissing {
                    table: self.name.clone(),
                    token_id,
                })
            })?;

        let Some(target) = buf.get_mut(..key.len()) else {
            return Err(PostDiffError::KeyTooLarge {
                table: self.name.clone(),
                token_id,
                size: key.len(),
                capacity: buf.len(),
            }
            .into());
        };
        target.copy_from_slice(&key);
        Ok(key.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::import_seed_str;

    const SEED: &str = r#"
schema_version: 0
tables:
  - name: Terms
    kind: table:hash_key
    key_type: ShortText
    max_key_size: 8
    tokens:
      - { id: 1, key: hello }
    columns:
      - name: index
        kind: column:index
        flags: [WITH_POSITION]
  - name: Docs
    kind: table:no_key
    columns:
      - { name: body, kind: column:var_size }
"#;

    fn catalog() -> SqliteCatalog {
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        import_seed_str(SEED, "test", catalog.connection_mut()).unwrap();
        catalog
    }

    #[test]
    fn test_find_table_and_column() {
        let catalog = catalog();
        let table = catalog.find_table("Terms").unwrap().unwrap();
        assert_eq!(table.kind, ObjectKind::TableHashKey);
        assert_eq!(table.key_type, Some(KeyType::ShortText));
        assert_eq!(table.max_key_size, 8);

        let column = catalog.find_column(&table, "index").unwrap().unwrap();
        assert_eq!(column.kind, ObjectKind::ColumnIndex);
        assert_eq!(column.flags, ColumnFlags::WITH_POSITION);

        assert!(catalog.find_table("Nope").unwrap().is_none());
        assert!(catalog.find_column(&table, "nope").unwrap().is_none());
    }

    #[test]
    fn test_pseudo_column_resolves_to_accessor() {
        let catalog = catalog();
        let table = catalog.find_table("Terms").unwrap().unwrap();
        let column = catalog.find_column(&table, "_key").unwrap().unwrap();
        assert_eq!(column.kind, ObjectKind::Accessor);
    }

    #[test]
    fn test_lexicon_lookup() {
        let catalog = catalog();
        let table = catalog.find_table("Terms").unwrap().unwrap();
        let lexicon = catalog.open_lexicon(&table).unwrap();

        let mut buf = vec![0u8; lexicon.max_key_size()];
        let len = lexicon.get_key(1, &mut buf).unwrap();
        assert_eq!(&buf[..len], b"hello");

        let err = lexicon.get_key(2, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::KeyLookupFailed);

        let err = lexicon.get_key(1, &mut buf[..2]).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::KeyTooLarge);
    }

    #[test]
    fn test_no_key_table_is_not_a_lexicon() {
        let catalog = catalog();
        let table = catalog.find_table("Docs").unwrap().unwrap();
        let err = catalog.open_lexicon(&table).map(|_| ()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidArgument);
        assert!(err.message().contains("table:no_key"));
    }
}
