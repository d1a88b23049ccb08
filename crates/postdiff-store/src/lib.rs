//! postdiff store - SQLite catalog, stored diff snapshots and seed import
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - `SqliteCatalog` / `SqliteLexicon` implementing the core catalog seam
//! - `StoredDiffEngine` serving diff snapshots kept in the store
//! - Seed Format v0 parser, digest and importer

pub mod catalog;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod seed;

// Re-export key types
pub use catalog::{SqliteCatalog, SqliteLexicon, StoredDiffEngine};
pub use errors::Result;
