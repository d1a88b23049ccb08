//! Conversion between flat posting vectors and [`Posting`] records.
//!
//! A vector whose length is not a multiple of the shape's width is corrupt
//! input: decoding rejects it outright instead of dropping the tail.

use crate::errors::PostDiffError;
use crate::posting::shape::PostingShape;
use serde::{Deserialize, Serialize};

/// One occurrence of a token.
///
/// `section_id` and `position` are present exactly when the column's shape
/// carries them; absent fields are omitted when serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Posting {
    pub record_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl Posting {
    pub fn new(record_id: u32) -> Self {
        Self {
            record_id,
            section_id: None,
            position: None,
        }
    }

    pub fn with_section(mut self, section_id: u32) -> Self {
        self.section_id = Some(section_id);
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Number of fields this posting carries
    pub fn n_fields(&self) -> usize {
        1 + usize::from(self.section_id.is_some()) + usize::from(self.position.is_some())
    }
}

/// Number of postings held by a flat vector of `len` values.
///
/// # Errors
///
/// `MisalignedPostingVector` if `len` is not a multiple of the shape's width.
pub fn posting_count(len: usize, shape: PostingShape) -> Result<usize, PostDiffError> {
    let width = shape.width();
    if len % width != 0 {
        return Err(PostDiffError::MisalignedPostingVector { len, width });
    }
    Ok(len / width)
}

/// Decode a flat vector into postings, preserving order.
///
/// # Errors
///
/// `MisalignedPostingVector` if the vector does not hold whole tuples.
pub fn decode(vector: &[u32], shape: PostingShape) -> Result<Vec<Posting>, PostDiffError> {
    let mut postings = Vec::new();
    decode_into(vector, shape, &mut postings)?;
    Ok(postings)
}

/// Decode into a caller-owned buffer.
///
/// The buffer is cleared first and keeps its capacity, so a buffer reused
/// across calls only grows to the largest vector it has seen. On error the
/// buffer is left empty.
///
/// # Errors
///
/// `MisalignedPostingVector` if the vector does not hold whole tuples.
pub fn decode_into(
    vector: &[u32],
    shape: PostingShape,
    out: &mut Vec<Posting>,
) -> Result<(), PostDiffError> {
    out.clear();
    let count = posting_count(vector.len(), shape)?;
    out.reserve(count);

    let tuples = vector.chunks_exact(shape.width());
    match shape {
        PostingShape::RecordOnly => out.extend(tuples.map(|t| Posting::new(t[0]))),
        PostingShape::WithSection => {
            out.extend(tuples.map(|t| Posting::new(t[0]).with_section(t[1])))
        }
        PostingShape::WithPosition => {
            out.extend(tuples.map(|t| Posting::new(t[0]).with_position(t[1])))
        }
        PostingShape::WithSectionAndPosition => {
            out.extend(tuples.map(|t| Posting::new(t[0]).with_section(t[1]).with_position(t[2])))
        }
    }
    Ok(())
}

/// Encode postings into the flat form for `shape`.
///
/// # Errors
///
/// `PostingShapeMismatch` if a posting carries a field the shape excludes or
/// lacks one it requires.
pub fn encode(postings: &[Posting], shape: PostingShape) -> Result<Vec<u32>, PostDiffError> {
    let mut vector = Vec::with_capacity(postings.len() * shape.width());
    for (index, posting) in postings.iter().enumerate() {
        vector.push(posting.record_id);
        push_field(
            &mut vector,
            index,
            shape,
            "section_id",
            shape.has_section(),
            posting.section_id,
        )?;
        push_field(
            &mut vector,
            index,
            shape,
            "position",
            shape.has_position(),
            posting.position,
        )?;
    }
    Ok(vector)
}

fn push_field(
    vector: &mut Vec<u32>,
    index: usize,
    shape: PostingShape,
    name: &str,
    expected: bool,
    value: Option<u32>,
) -> Result<(), PostDiffError> {
    match (expected, value) {
        (true, Some(v)) => {
            vector.push(v);
            Ok(())
        }
        (false, None) => Ok(()),
        (true, None) => Err(PostDiffError::PostingShapeMismatch {
            index,
            shape: shape.to_string(),
            reason: format!("missing {}", name),
        }),
        (false, Some(_)) => Err(PostDiffError::PostingShapeMismatch {
            index,
            shape: shape.to_string(),
            reason: format!("unexpected {}", name),
        }),
    }
}
