//! Seed importer orchestration
//!
//! Writes a validated seed into the catalog tables. A table named in the
//! seed replaces any stored table of the same name, so importing the same
//! seed twice leaves the same catalog behind.

#![allow(clippy::result_large_err)]

use crate::catalog::blob::encode_postings;
use crate::errors::{from_rusqlite, seed_validation, Result};
use crate::seed::format_v0::{SeedTable, SeedV0};
use crate::seed::parser::{
    column_flags, column_kind, encode_key, parse_seed_file, parse_seed_str, table_key_type,
    table_kind, table_max_key_size,
};
use crate::seed::{compute_seed_digest, provenance};
use rusqlite::{Connection, Transaction};
use std::path::Path;

/// Import a seed file into the database
///
/// Parses and validates the seed, then replaces the tables it names inside
/// one transaction and records provenance. Returns the seed digest.
pub fn import_seed(path: &Path, conn: &mut Connection) -> Result<String> {
    let seed = parse_seed_file(path)?;
    import_parsed(&seed, &path.display().to_string(), conn)
}

/// Import seed YAML held in memory; `source` labels the provenance row
pub fn import_seed_str(content: &str, source: &str, conn: &mut Connection) -> Result<String> {
    let seed = parse_seed_str(content)?;
    import_parsed(&seed, source, conn)
}

fn import_parsed(seed: &SeedV0, source: &str, conn: &mut Connection) -> Result<String> {
    let seed_digest = compute_seed_digest(seed)?;

    let tx = conn.transaction().map_err(from_rusqlite)?;
    for table in &seed.tables {
        replace_table(&tx, table)?;
    }
    provenance::record_import(&tx, &seed_digest, source, seed.tables.len())?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(
        seed_digest = %seed_digest,
        source,
        n_tables = seed.tables.len(),
        "seed imported"
    );
    Ok(seed_digest)
}

fn replace_table(tx: &Transaction, table: &SeedTable) -> Result<()> {
    for sql in [
        "DELETE FROM diff_entries WHERE table_name = ?1",
        "DELETE FROM table_columns WHERE table_name = ?1",
        "DELETE FROM tokens WHERE table_name = ?1",
        "DELETE FROM catalog_tables WHERE name = ?1",
    ] {
        tx.execute(sql, [&table.name]).map_err(from_rusqlite)?;
    }

    let kind = table_kind(table)?;
    let key_type = table_key_type(table)?;
    tx.execute(
        "INSERT INTO catalog_tables (name, kind, key_type, max_key_size) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            table.name,
            kind.as_str(),
            key_type.map(|k| k.as_str()),
            table_max_key_size(table) as i64
        ],
    )
    .map_err(from_rusqlite)?;

    if let Some(key_type) = key_type {
        let mut insert_token = tx
            .prepare("INSERT INTO tokens (table_name, token_id, key) VALUES (?1, ?2, ?3)")
            .map_err(from_rusqlite)?;
        for token in &table.tokens {
            let key = encode_key(key_type, &token.key)
                .map_err(|reason| {
                    seed_validation(&format!(
                        "Token {} of table {}: {}",
                        token.id, table.name, reason
                    ))
                })?;
            insert_token
                .execute(rusqlite::params![table.name, token.id, key])
                .map_err(from_rusqlite)?;
        }
    }

    for column in &table.columns {
        let kind = column_kind(&table.name, column)?;
        let flags = column_flags(&table.name, column)?;
        tx.execute(
            "INSERT INTO table_columns (table_name, name, kind, flags, source) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                table.name,
                column.name,
                kind.as_str(),
                flags.bits(),
                column.source
            ],
        )
        .map_err(from_rusqlite)?;

        let mut insert_entry = tx
            .prepare(
                "INSERT INTO diff_entries (table_name, column_name, seq, token_id, remains, missings)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(from_rusqlite)?;
        for (seq, entry) in column.diff.iter().flatten().enumerate() {
            insert_entry
                .execute(rusqlite::params![
                    table.name,
                    column.name,
                    seq as i64,
                    entry.token_id,
                    encode_postings(&entry.remains),
                    encode_postings(&entry.missings)
                ])
                .map_err(from_rusqlite)?;
        }
    }

    Ok(())
}
