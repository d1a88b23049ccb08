//! Seed digest canonicalization
//!
//! Computes stable SHA256 digests of seeds for reproducibility. Tables,
//! tokens, columns and flag names are sorted; diff entries keep their order
//! because it is the report order.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::seed::format_v0::{SeedColumn, SeedKey, SeedTable, SeedV0};
use postdiff_core::diff::DiffEntry;
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Serialize)]
struct CanonicalSeed<'a> {
    schema_version: u32,
    tables: Vec<CanonicalTable<'a>>,
}

#[derive(Serialize)]
struct CanonicalTable<'a> {
    name: &'a str,
    kind: &'a str,
    key_type: Option<&'a str>,
    max_key_size: Option<usize>,
    tokens: Vec<(u32, &'a SeedKey)>,
    columns: Vec<CanonicalColumn<'a>>,
}

#[derive(Serialize)]
struct CanonicalColumn<'a> {
    name: &'a str,
    kind: &'a str,
    flags: Vec<&'a str>,
    source: Option<&'a str>,
    diff: Option<&'a [DiffEntry]>,
}

/// Compute a stable digest for a seed
///
/// Returns a SHA256 hex digest of the canonicalized seed representation
pub fn compute_seed_digest(seed: &SeedV0) -> Result<String> {
    let json = serde_json::to_string(&canonicalize_seed(seed))?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}

fn canonicalize_seed(seed: &SeedV0) -> CanonicalSeed<'_> {
    let mut tables: Vec<CanonicalTable<'_>> = seed.tables.iter().map(canonicalize_table).collect();
    tables.sort_by(|a, b| a.name.cmp(b.name));

    CanonicalSeed {
        schema_version: seed.schema_version,
        tables,
    }
}

fn canonicalize_table(table: &SeedTable) -> CanonicalTable<'_> {
    let mut tokens: Vec<(u32, &SeedKey)> = table.tokens.iter().map(|t| (t.id, &t.key)).collect();
    tokens.sort_by_key(|(id, _)| *id);

    let mut columns: Vec<CanonicalColumn<'_>> =
        table.columns.iter().map(canonicalize_column).collect();
    columns.sort_by(|a, b| a.name.cmp(b.name));

    CanonicalTable {
        name: &table.name,
        kind: &table.kind,
        key_type: table.key_type.as_deref(),
        max_key_size: table.max_key_size,
        tokens,
        columns,
    }
}

fn canonicalize_column(column: &SeedColumn) -> CanonicalColumn<'_> {
    let mut flags: Vec<&str> = column.flags.iter().map(String::as_str).collect();
    flags.sort_unstable();
    flags.dedup();

    CanonicalColumn {
        name: &column.name,
        kind: &column.kind,
        flags,
        source: column.source.as_deref(),
        diff: column.diff.as_deref(),
    }
}
