//! Posting diff snapshots.
//!
//! A [`DiffCollection`] is what a diff engine hands back for one index
//! column: one [`DiffEntry`] per token whose stored postings disagree with
//! the freshly derived ones. This crate only reads collections; producing
//! them is the engine's job.

pub mod model;

pub use model::{DiffCollection, DiffEntry, DiffSummary, TokenId};
