//! Postings and their flat binary form.
//!
//! An index column stores one posting per occurrence of a token. Depending on
//! the column's flags a posting carries a record id, optionally a section id
//! and optionally a position. Diff snapshots hand postings over as a flat
//! `u32` vector of fixed-width tuples; [`codec`] converts between the two
//! forms and [`shape`] fixes the tuple layout for a column.

pub mod codec;
pub mod shape;

pub use codec::{decode, decode_into, encode, posting_count, Posting};
pub use shape::{ColumnFlags, PostingShape};
