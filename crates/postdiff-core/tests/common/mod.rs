use postdiff_core::catalog::{Catalog, KeyType, MemoryCatalog, ObjectKind};
use postdiff_core::{ColumnFlags, DiffCollection, DiffEntry, TokenTable};

/// Catalog with a `Terms` lexicon holding `hello`, `world` and `rust` as
/// tokens 1..=3, an index column `Terms.index` with `flags`, and a plain
/// `Docs` table.
#[allow(dead_code)]
pub fn terms_catalog(flags: ColumnFlags) -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog.add_lexicon("Terms", KeyType::ShortText).unwrap();
    for (token_id, key) in [(1, "hello"), (2, "world"), (3, "rust")] {
        catalog
            .insert_key("Terms", token_id, key.as_bytes())
            .unwrap();
    }
    catalog
        .add_column("Terms", "index", ObjectKind::ColumnIndex, flags)
        .unwrap();
    catalog
        .add_table("Docs", ObjectKind::TableNoKey, None)
        .unwrap();
    catalog
        .add_column(
            "Docs",
            "body",
            ObjectKind::ColumnVarSize,
            ColumnFlags::empty(),
        )
        .unwrap();
    catalog
}

/// Open the `Terms` lexicon of `catalog`
#[allow(dead_code)]
pub fn terms(catalog: &MemoryCatalog) -> Box<dyn TokenTable + '_> {
    let table = catalog.find_table("Terms").unwrap().unwrap();
    catalog.open_lexicon(&table).unwrap()
}

#[allow(dead_code)]
pub fn diff(entries: Vec<(u32, Vec<u32>, Vec<u32>)>) -> DiffCollection {
    entries
        .into_iter()
        .map(|(token_id, remains, missings)| DiffEntry::new(token_id, remains, missings))
        .collect()
}
