//! SQLite-backed catalog.
//!
//! [`SqliteCatalog`] resolves tables and columns from the store and opens
//! lexicons as [`SqliteLexicon`] point-lookup handles. [`StoredDiffEngine`]
//! serves the diff snapshots that seed import stored for index columns.

pub mod blob;
mod sqlite_catalog;
mod stored_diff;

pub use sqlite_catalog::{SqliteCatalog, SqliteLexicon};
pub use stored_diff::StoredDiffEngine;
