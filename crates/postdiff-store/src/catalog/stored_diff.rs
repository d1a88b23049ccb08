#![allow(clippy::result_large_err)]

use crate::catalog::blob::decode_postings;
use crate::errors::{corrupt_snapshot, from_rusqlite, Result};
use postdiff_core::catalog::{ColumnInfo, DiffEngine};
use postdiff_core::diff::{DiffCollection, DiffEntry};
use postdiff_core::errors::{ExError, ExErrorKind};
use rusqlite::{Connection, OptionalExtension};

/// Serves diff snapshots stored by seed import.
///
/// An index column without stored entries has an empty diff. A column the
/// store does not know is an engine failure.
pub struct StoredDiffEngine<'c> {
    conn: &'c Connection,
}

impl<'c> StoredDiffEngine<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl DiffEngine for StoredDiffEngine<'_> {
    fn diff(&self, column: &ColumnInfo) -> Result<DiffCollection> {
        let known: Option<bool> = self
            .conn
            .query_row(
                "SELECT 1 FROM table_columns WHERE table_name = ?1 AND name = ?2",
                rusqlite::params![column.table, column.name],
                |_| Ok(true),
            )
            .optional()
            .map_err(from_rusqlite)?;
        if known.is_none() {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("load_diff")
                .with_table(column.table.clone())
                .with_column(column.name.clone())
                .with_message(format!("no stored column <{}>", column.full_name())));
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT token_id, remains, missings FROM diff_entries
                 WHERE table_name = ?1 AND column_name = ?2 ORDER BY seq",
            )
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(rusqlite::params![column.table, column.name], |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                ))
            })
            .map_err(from_rusqlite)?;

        let mut diff = DiffCollection::new();
        for row in rows {
            let (token_id, remains, missings) = row.map_err(from_rusqlite)?;
            let decode = |blob: &[u8]| {
                decode_postings(blob).map_err(|e| {
                    corrupt_snapshot(&column.table, &column.name, e.message())
                        .with_token_id(token_id)
                        .with_source(e)
                })
            };
            diff.push(DiffEntry::new(token_id, decode(&remains)?, decode(&missings)?));
        }

        tracing::debug!(
            column = %column.full_name(),
            n_entries = diff.len(),
            "stored diff loaded"
        );
        Ok(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteCatalog;
    use crate::seed::import_seed_str;
    use postdiff_core::catalog::Catalog;

    const SEED: &str = r#"
schema_version: 0
tables:
  - name: Terms
    kind: table:pat_key
    key_type: ShortText
    tokens:
      - { id: 1, key: hello }
      - { id: 2, key: world }
    columns:
      - name: index
        kind: column:index
        diff:
          - { token_id: 2, remains: [7] }
          - { token_id: 1, missings: [3, 4] }
      - name: empty
        kind: column:index
"#;

    fn catalog() -> SqliteCatalog {
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        import_seed_str(SEED, "test", catalog.connection_mut()).unwrap();
        catalog
    }

    fn column(catalog: &SqliteCatalog, name: &str) -> ColumnInfo {
        let table = catalog.find_table("Terms").unwrap().unwrap();
        catalog.find_column(&table, name).unwrap().unwrap()
    }

    #[test]
    fn test_stored_entries_come_back_in_order() {
        let catalog = catalog();
        let diff = catalog
            .diff_engine()
            .diff(&column(&catalog, "index"))
            .unwrap();
        assert_eq!(
            diff.entries(),
            &[
                DiffEntry::new(2, vec![7], vec![]),
                DiffEntry::new(1, vec![], vec![3, 4]),
            ]
        );
    }

    #[test]
    fn test_column_without_entries_has_empty_diff() {
        let catalog = catalog();
        assert!(catalog
            .diff_engine()
            .diff(&column(&catalog, "empty"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_corrupt_blob_is_persistence_error() {
        let catalog = catalog();
        catalog
            .connection()
            .execute(
                "UPDATE diff_entries SET remains = X'010203' WHERE token_id = 2",
                [],
            )
            .unwrap();

        let err = catalog
            .diff_engine()
            .diff(&column(&catalog, "index"))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert_eq!(err.token_id(), Some(2));
        assert!(err.message().contains("not a multiple of 4"));
        assert_eq!(
            err.source_error().map(|e| e.kind()),
            Some(ExErrorKind::Persistence)
        );
    }
}
