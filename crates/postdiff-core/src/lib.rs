//! postdiff core - posting diff report building
//!
//! This crate turns a diff snapshot of an inverted index column into a
//! structured report, including:
//! - Posting tuple decoding for the four column shapes
//! - Token key lookup and rendering by lexicon key type
//! - Counted-container report writers (in-memory tree and streaming JSON)
//! - The catalog seam used to resolve tables, columns and lexicons
//! - Canonical error and logging facilities shared by the other crates

pub mod catalog;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod posting;
pub mod report;

// Re-export commonly used types
pub use catalog::{Catalog, ColumnInfo, DiffEngine, KeyType, ObjectKind, TableInfo, TokenTable};
pub use diff::{DiffCollection, DiffEntry, DiffSummary, TokenId};
pub use errors::{ExError, ExErrorKind, PostDiffError, Result};
pub use posting::{ColumnFlags, Posting, PostingShape};
pub use report::{build_report, DiffReportBuilder, MissingKeyPolicy, ReportWriter};
