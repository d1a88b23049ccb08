//! Column flags and the posting tuple shape they imply.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Index column flags.
    ///
    /// Bit values match the on-disk flag word of groonga index columns, so
    /// flags read from an existing catalog can be taken as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColumnFlags: u32 {
        /// Postings carry the section (source column) they came from
        const WITH_SECTION = 1 << 7;
        /// Postings carry a weight (not part of the diff tuple)
        const WITH_WEIGHT = 1 << 8;
        /// Postings carry the token position within the record
        const WITH_POSITION = 1 << 9;
    }
}

/// Layout of one posting tuple in a flat posting vector.
///
/// The four variants are every combination of the two flags that change the
/// tuple; `WITH_WEIGHT` never does. Fields are always laid out as
/// `record_id`, then `section_id`, then `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostingShape {
    RecordOnly,
    WithSection,
    WithPosition,
    WithSectionAndPosition,
}

impl PostingShape {
    /// Every shape, in width order
    pub const ALL: [PostingShape; 4] = [
        PostingShape::RecordOnly,
        PostingShape::WithSection,
        PostingShape::WithPosition,
        PostingShape::WithSectionAndPosition,
    ];

    /// Shape used by a column with the given flags
    pub fn from_flags(flags: ColumnFlags) -> Self {
        match (
            flags.contains(ColumnFlags::WITH_SECTION),
            flags.contains(ColumnFlags::WITH_POSITION),
        ) {
            (false, false) => PostingShape::RecordOnly,
            (true, false) => PostingShape::WithSection,
            (false, true) => PostingShape::WithPosition,
            (true, true) => PostingShape::WithSectionAndPosition,
        }
    }

    /// Number of `u32` values per posting
    pub const fn width(self) -> usize {
        match self {
            PostingShape::RecordOnly => 1,
            PostingShape::WithSection | PostingShape::WithPosition => 2,
            PostingShape::WithSectionAndPosition => 3,
        }
    }

    pub const fn has_section(self) -> bool {
        matches!(
            self,
            PostingShape::WithSection | PostingShape::WithSectionAndPosition
        )
    }

    pub const fn has_position(self) -> bool {
        matches!(
            self,
            PostingShape::WithPosition | PostingShape::WithSectionAndPosition
        )
    }

    /// Flags that reproduce this shape
    pub fn flags(self) -> ColumnFlags {
        let mut flags = ColumnFlags::empty();
        flags.set(ColumnFlags::WITH_SECTION, self.has_section());
        flags.set(ColumnFlags::WITH_POSITION, self.has_position());
        flags
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PostingShape::RecordOnly => "record_id",
            PostingShape::WithSection => "record_id+section_id",
            PostingShape::WithPosition => "record_id+position",
            PostingShape::WithSectionAndPosition => "record_id+section_id+position",
        }
    }
}

impl From<ColumnFlags> for PostingShape {
    fn from(flags: ColumnFlags) -> Self {
        PostingShape::from_flags(flags)
    }
}

impl fmt::Display for PostingShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
