//! Posting vectors as stored blobs: consecutive little-endian `u32`s.

use crate::errors::{corrupt_posting_blob, Result};

/// Flatten a posting vector into its stored form
pub fn encode_postings(vector: &[u32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Read a stored posting vector back
///
/// # Errors
///
/// `Persistence` if the blob is not a whole number of `u32`s.
pub fn decode_postings(blob: &[u8]) -> Result<Vec<u32>> {
    let chunks = blob.chunks_exact(4);
    if !chunks.remainder().is_empty() {
        return Err(corrupt_posting_blob(blob.len()));
    }
    Ok(chunks
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
