//! Seed import provenance
//!
//! Every successful import leaves a row in `seed_imports`

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use serde::Serialize;

/// One recorded seed import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedImport {
    pub seed_digest: String,
    /// File path or caller-supplied label
    pub source: String,
    pub n_tables: usize,
    /// Unix seconds
    pub imported_at: i64,
}

/// Record an import; call inside the import transaction
pub fn record_import(
    conn: &Connection,
    seed_digest: &str,
    source: &str,
    n_tables: usize,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT INTO seed_imports (seed_digest, source, n_tables, imported_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![seed_digest, source, n_tables as i64, now],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// All recorded imports, oldest first
pub fn list_imports(conn: &Connection) -> Result<Vec<SeedImport>> {
    let mut stmt = conn
        .prepare(
            "SELECT seed_digest, source, n_tables, imported_at FROM seed_imports ORDER BY id",
        )
        .map_err(from_rusqlite)?;
    let imports = stmt
        .query_map([], |row| {
            Ok(SeedImport {
                seed_digest: row.get(0)?,
                source: row.get(1)?,
                n_tables: row.get::<_, i64>(2)? as usize,
                imported_at: row.get(3)?,
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(imports)
}
