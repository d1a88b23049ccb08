//! Seed parser with validation
//!
//! Parses YAML and validates table kinds, key types, token keys, column
//! flags and the shape of every stored diff snapshot

#![allow(clippy::result_large_err)]

use crate::errors::{seed_validation, Result};
use crate::seed::format_v0::{SeedColumn, SeedKey, SeedTable, SeedV0};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use postdiff_core::catalog::{KeyType, ObjectKind, MAX_KEY_SIZE};
use postdiff_core::posting::{posting_count, ColumnFlags, PostingShape};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Parse a seed file from a path
pub fn parse_seed_file(path: &Path) -> Result<SeedV0> {
    let content = fs::read_to_string(path).map_err(|e| {
        seed_validation(&format!(
            "Failed to read seed file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_seed_str(&content)
}

/// Parse a seed from a string
pub fn parse_seed_str(content: &str) -> Result<SeedV0> {
    let seed: SeedV0 = serde_yaml::from_str(content)
        .map_err(|e| seed_validation(&format!("YAML parse error: {}", e)))?;

    validate_seed(&seed)?;

    Ok(seed)
}

/// Object kind of a seed table
pub fn table_kind(table: &SeedTable) -> Result<ObjectKind> {
    match ObjectKind::parse(&table.kind) {
        Some(kind) if kind.is_table() => Ok(kind),
        _ => Err(seed_validation(&format!(
            "Table {} has unknown table kind: {}",
            table.name, table.kind
        ))),
    }
}

/// Key type of a seed table; `None` for tables without keys
pub fn table_key_type(table: &SeedTable) -> Result<Option<KeyType>> {
    table
        .key_type
        .as_deref()
        .map(|s| {
            KeyType::parse(s).ok_or_else(|| {
                seed_validation(&format!(
                    "Table {} has unknown key_type: {}",
                    table.name, s
                ))
            })
        })
        .transpose()
}

/// Key size limit of a seed table
pub fn table_max_key_size(table: &SeedTable) -> usize {
    table.max_key_size.unwrap_or(MAX_KEY_SIZE)
}

/// Object kind of a seed column
pub fn column_kind(table: &str, column: &SeedColumn) -> Result<ObjectKind> {
    match ObjectKind::parse(&column.kind) {
        Some(kind) if kind.is_column() && kind != ObjectKind::Accessor => Ok(kind),
        _ => Err(seed_validation(&format!(
            "Column {}.{} has unknown column kind: {}",
            table, column.name, column.kind
        ))),
    }
}

/// Flag set of a seed column
pub fn column_flags(table: &str, column: &SeedColumn) -> Result<ColumnFlags> {
    column.flags.iter().try_fold(ColumnFlags::empty(), |flags, name| {
        ColumnFlags::from_name(name)
            .map(|flag| flags | flag)
            .ok_or_else(|| {
                seed_validation(&format!(
                    "Column {}.{} has unknown flag: {}",
                    table, column.name, name
                ))
            })
    })
}

/// Stored bytes of a token key
pub fn encode_key(key_type: KeyType, key: &SeedKey) -> std::result::Result<Vec<u8>, String> {
    fn out_of_range<E>(_: E) -> String {
        "value out of range".to_string()
    }

    match (key_type, key) {
        (KeyType::ShortText, SeedKey::Text(text)) => Ok(text.as_bytes().to_vec()),
        (KeyType::Binary, SeedKey::Text(encoded)) => BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| format!("invalid base64: {}", e)),
        (KeyType::UInt32, SeedKey::Unsigned(v)) => {
            let v = u32::try_from(*v).map_err(out_of_range)?;
            Ok(v.to_le_bytes().to_vec())
        }
        (KeyType::Int32, SeedKey::Unsigned(v)) => {
            let v = i32::try_from(*v).map_err(out_of_range)?;
            Ok(v.to_le_bytes().to_vec())
        }
        (KeyType::Int32, SeedKey::Signed(v)) => {
            let v = i32::try_from(*v).map_err(out_of_range)?;
            Ok(v.to_le_bytes().to_vec())
        }
        (KeyType::UInt64, SeedKey::Unsigned(v)) => Ok(v.to_le_bytes().to_vec()),
        (KeyType::Int64, SeedKey::Unsigned(v)) => {
            let v = i64::try_from(*v).map_err(out_of_range)?;
            Ok(v.to_le_bytes().to_vec())
        }
        (KeyType::Int64, SeedKey::Signed(v)) => Ok(v.to_le_bytes().to_vec()),
        (KeyType::ShortText | KeyType::Binary, _) => Err("expected a string key".to_string()),
        (_, SeedKey::Text(_)) => Err("expected an integer key".to_string()),
        (KeyType::UInt32 | KeyType::UInt64, SeedKey::Signed(_)) => {
            Err("value out of range".to_string())
        }
    }
}

/// Validate a parsed seed
fn validate_seed(seed: &SeedV0) -> Result<()> {
    if seed.schema_version != 0 {
        return Err(seed_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            seed.schema_version
        )));
    }

    let mut table_names = HashSet::new();
    for table in &seed.tables {
        if table.name.is_empty() {
            return Err(seed_validation("Table name cannot be empty"));
        }
        if !table_names.insert(table.name.as_str()) {
            return Err(seed_validation(&format!("Duplicate table: {}", table.name)));
        }
        validate_table(table)?;
    }

    Ok(())
}

fn validate_table(table: &SeedTable) -> Result<()> {
    let kind = table_kind(table)?;
    let key_type = table_key_type(table)?;
    let max_key_size = table_max_key_size(table);

    match (kind.is_lexicon(), key_type) {
        (true, None) => {
            return Err(seed_validation(&format!(
                "Table {} of kind {} requires a key_type",
                table.name, kind
            )))
        }
        (false, Some(_)) => {
            return Err(seed_validation(&format!(
                "Table {} of kind {} cannot have a key_type",
                table.name, kind
            )))
        }
        _ => {}
    }
    if max_key_size == 0 || max_key_size > MAX_KEY_SIZE {
        return Err(seed_validation(&format!(
            "Table {} max_key_size must be between 1 and {}",
            table.name, MAX_KEY_SIZE
        )));
    }

    let mut token_ids = HashSet::new();
    if let Some(key_type) = key_type {
        let mut keys = HashMap::new();
        for token in &table.tokens {
            if token.id == 0 {
                return Err(seed_validation(&format!(
                    "Table {} token id 0 is reserved",
                    table.name
                )));
            }
            if !token_ids.insert(token.id) {
                return Err(seed_validation(&format!(
                    "Duplicate token id {} in table {}",
                    token.id, table.name
                )));
            }
            let bytes = encode_key(key_type, &token.key).map_err(|reason| {
                seed_validation(&format!(
                    "Token {} of table {} has an invalid {} key: {}",
                    token.id, table.name, key_type, reason
                ))
            })?;
            if bytes.len() > max_key_size {
                return Err(seed_validation(&format!(
                    "Token {} of table {} has a {} byte key, max_key_size is {}",
                    token.id,
                    table.name,
                    bytes.len(),
                    max_key_size
                )));
            }
            if let Some(other) = keys.insert(bytes, token.id) {
                return Err(seed_validation(&format!(
                    "Tokens {} and {} of table {} share a key",
                    other, token.id, table.name
                )));
            }
        }
    } else if !table.tokens.is_empty() {
        return Err(seed_validation(&format!(
            "Table {} of kind {} cannot have tokens",
            table.name, kind
        )));
    }

    let mut column_names = HashSet::new();
    for column in &table.columns {
        if column.name.is_empty() || column.name.starts_with('_') {
            return Err(seed_validation(&format!(
                "Table {} has invalid column name: {:?}",
                table.name, column.name
            )));
        }
        if !column_names.insert(column.name.as_str()) {
            return Err(seed_validation(&format!(
                "Duplicate column {}.{}",
                table.name, column.name
            )));
        }
        validate_column(table, kind, column, &token_ids)?;
    }

    Ok(())
}

fn validate_column(
    table: &SeedTable,
    table_kind: ObjectKind,
    column: &SeedColumn,
    token_ids: &HashSet<u32>,
) -> Result<()> {
    let kind = column_kind(&table.name, column)?;
    let flags = column_flags(&table.name, column)?;

    let Some(diff) = &column.diff else {
        return Ok(());
    };
    if !kind.is_index_column() || !table_kind.is_lexicon() {
        return Err(seed_validation(&format!(
            "Column {}.{} cannot have a diff: only index columns of lexicons can",
            table.name, column.name
        )));
    }

    let shape = PostingShape::from_flags(flags);
    let mut seen = HashSet::new();
    for entry in diff {
        if !token_ids.contains(&entry.token_id) {
            return Err(seed_validation(&format!(
                "Diff of {}.{} references unknown token {}",
                table.name, column.name, entry.token_id
            )));
        }
        if !seen.insert(entry.token_id) {
            return Err(seed_validation(&format!(
                "Diff of {}.{} lists token {} twice",
                table.name, column.name, entry.token_id
            )));
        }
        for (side, vector) in [("remains", &entry.remains), ("missings", &entry.missings)] {
            posting_count(vector.len(), shape).map_err(|e| {
                seed_validation(&format!(
                    "Diff of {}.{} token {} {}: {}",
                    table.name, column.name, entry.token_id, side, e
                ))
            })?;
        }
    }

    Ok(())
}
