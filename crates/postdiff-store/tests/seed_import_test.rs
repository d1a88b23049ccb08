// Integration tests for seed import into the SQLite catalog

use postdiff_core::catalog::{Catalog, DiffEngine, KeyType};
use postdiff_core::errors::ExErrorKind;
use postdiff_core::{build_report, ColumnFlags};
use postdiff_store::seed::{import_seed, import_seed_str, list_imports};
use postdiff_store::SqliteCatalog;
use serde_json::json;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn seeded_catalog(name: &str) -> SqliteCatalog {
    let mut catalog = SqliteCatalog::open_in_memory().unwrap();
    import_seed(&fixture(name), catalog.connection_mut()).unwrap();
    catalog
}

fn report_for(catalog: &SqliteCatalog, table: &str, column: &str) -> serde_json::Value {
    let table = catalog.find_table(table).unwrap().unwrap();
    let column = catalog.find_column(&table, column).unwrap().unwrap();
    let diff = catalog.diff_engine().diff(&column).unwrap();
    let lexicon = catalog.open_lexicon(&table).unwrap();
    build_report(&diff, lexicon.as_ref(), column.flags).unwrap()
}

#[test]
fn test_imported_snapshot_reports_like_the_seed() {
    let catalog = seeded_catalog("seed_terms.yaml");

    assert_eq!(
        report_for(&catalog, "Terms", "index"),
        json!({"diffs": [
            {
                "token": {"id": 1, "value": "hello"},
                "remains": [
                    {"record_id": 10, "section_id": 1, "position": 5},
                    {"record_id": 20, "section_id": 2, "position": 7}
                ],
                "missings": []
            },
            {
                "token": {"id": 3, "value": "rust"},
                "remains": [],
                "missings": [{"record_id": 4, "section_id": 1, "position": 0}]
            }
        ]})
    );
    assert_eq!(
        report_for(&catalog, "Terms", "plain"),
        json!({"diffs": [{
            "token": {"id": 2, "value": "world"},
            "remains": [],
            "missings": [{"record_id": 3}, {"record_id": 4}]
        }]})
    );
}

#[test]
fn test_integer_keys_and_weight_flag() {
    let catalog = seeded_catalog("seed_ids.yaml");
    let table = catalog.find_table("Ids").unwrap().unwrap();
    assert_eq!(table.key_type, Some(KeyType::Int64));
    let column = catalog.find_column(&table, "index").unwrap().unwrap();
    assert_eq!(column.flags, ColumnFlags::WITH_WEIGHT);

    assert_eq!(
        report_for(&catalog, "Ids", "index"),
        json!({"diffs": [{
            "token": {"id": 2, "value": 1099511627776u64},
            "remains": [{"record_id": 1}],
            "missings": []
        }]})
    );
}

#[test]
fn test_reimport_replaces_tables_and_records_provenance() {
    let mut catalog = seeded_catalog("seed_terms.yaml");
    let digest = import_seed(&fixture("seed_terms.yaml"), catalog.connection_mut()).unwrap();

    let count: i64 = catalog
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM diff_entries WHERE table_name = 'Terms'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 3);

    let imports = list_imports(catalog.connection()).unwrap();
    assert_eq!(imports.len(), 2);
    assert_eq!(imports[0].seed_digest, digest);
    assert_eq!(imports[1].n_tables, 2);
}

#[test]
fn test_reimport_with_fewer_columns_drops_old_ones() {
    let mut catalog = seeded_catalog("seed_terms.yaml");
    import_seed_str(
        r#"
schema_version: 0
tables:
  - name: Terms
    kind: table:pat_key
    key_type: ShortText
    tokens:
      - { id: 1, key: hello }
"#,
        "shrink",
        catalog.connection_mut(),
    )
    .unwrap();

    let table = catalog.find_table("Terms").unwrap().unwrap();
    assert!(catalog.find_column(&table, "index").unwrap().is_none());
    assert!(catalog.find_table("Docs").unwrap().is_some());
}

#[test]
fn test_invalid_seed_leaves_store_untouched() {
    let mut catalog = SqliteCatalog::open_in_memory().unwrap();
    let err = import_seed(
        &fixture("seed_misaligned_diff.yaml"),
        catalog.connection_mut(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);

    assert!(catalog.find_table("Terms").unwrap().is_none());
    assert!(list_imports(catalog.connection()).unwrap().is_empty());
}
