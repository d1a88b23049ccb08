//! Seed Format v0 schema
//!
//! Defines the YAML structure for seed import:
//!
//! ```yaml
//! schema_version: 0
//! tables:
//!   - name: Terms
//!     kind: table:pat_key
//!     key_type: ShortText
//!     tokens:
//!       - { id: 1, key: hello }
//!     columns:
//!       - name: index
//!         kind: column:index
//!         flags: [WITH_SECTION, WITH_POSITION]
//!         source: Docs.body
//!         diff:
//!           - { token_id: 1, remains: [10, 1, 5], missings: [] }
//! ```

use postdiff_core::diff::DiffEntry;
use serde::{Deserialize, Serialize};

/// Top-level seed file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    #[serde(default)]
    pub tables: Vec<SeedTable>,
}

/// Table definition in seed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedTable {
    pub name: String,

    /// Object kind string, e.g. `table:pat_key`
    pub kind: String,

    /// Required for keyed tables, forbidden otherwise
    #[serde(default)]
    pub key_type: Option<String>,

    #[serde(default)]
    pub max_key_size: Option<usize>,

    #[serde(default)]
    pub tokens: Vec<SeedToken>,

    #[serde(default)]
    pub columns: Vec<SeedColumn>,
}

/// Lexicon token in seed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedToken {
    pub id: u32,
    pub key: SeedKey,
}

/// Token key as written in YAML.
///
/// Integer key types take numbers, `ShortText` takes text and `Binary`
/// takes base64 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedKey {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

/// Column definition in seed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedColumn {
    pub name: String,

    /// Object kind string, e.g. `column:index`
    pub kind: String,

    /// Flag names (`WITH_SECTION`, `WITH_WEIGHT`, `WITH_POSITION`)
    #[serde(default)]
    pub flags: Vec<String>,

    /// Indexed source column, informational only
    #[serde(default)]
    pub source: Option<String>,

    /// Diff snapshot served for this index column, in report order
    #[serde(default)]
    pub diff: Option<Vec<DiffEntry>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_seed() {
        let yaml = r#"
schema_version: 0
tables:
  - name: Terms
    kind: table:pat_key
    key_type: ShortText
    tokens:
      - { id: 1, key: hello }
"#;

        let seed: SeedV0 = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(seed.schema_version, 0);
        assert_eq!(seed.tables.len(), 1);
        assert_eq!(
            seed.tables[0].tokens[0].key,
            SeedKey::Text("hello".to_string())
        );
        assert!(seed.tables[0].columns.is_empty());
    }

    #[test]
    fn test_key_forms() {
        let yaml = r#"
- { id: 1, key: 42 }
- { id: 2, key: -3 }
- { id: 3, key: "42" }
"#;

        let tokens: Vec<SeedToken> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(tokens[0].key, SeedKey::Unsigned(42));
        assert_eq!(tokens[1].key, SeedKey::Signed(-3));
        assert_eq!(tokens[2].key, SeedKey::Text("42".to_string()));
    }

    #[test]
    fn test_diff_entries_default_missing_sides() {
        let yaml = r#"
name: index
kind: column:index
diff:
  - { token_id: 1, remains: [3] }
"#;

        let column: SeedColumn = serde_yaml::from_str(yaml).unwrap();
        let diff = column.diff.unwrap();
        assert_eq!(diff[0].remains, vec![3]);
        assert!(diff[0].missings.is_empty());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let yaml = "schema_version: 0\ntables: []\nindexes: []\n";
        assert!(serde_yaml::from_str::<SeedV0>(yaml).is_err());
    }
}
