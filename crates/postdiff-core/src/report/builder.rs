//! Posting diff report builder.
//!
//! Streams one report entry per diff entry into a [`ReportWriter`]. Decoded
//! postings and the key lookup buffer are builder-owned scratch space,
//! cleared between entries, so memory stays proportional to the largest
//! single entry rather than the whole collection.

use crate::catalog::TokenTable;
use crate::diff::{DiffCollection, DiffEntry, DiffSummary, TokenId};
use crate::errors::{ExError, ExErrorKind, PostDiffError, Result};
use crate::posting::{decode_into, ColumnFlags, Posting, PostingShape};
use crate::report::json::JsonTreeWriter;
use crate::report::key::render_key;
use crate::report::writer::ReportWriter;
use serde_json::Value;

const FIELD_DIFFS: &str = "diffs";
const FIELD_TOKEN: &str = "token";
const FIELD_REMAINS: &str = "remains";
const FIELD_MISSINGS: &str = "missings";
const FIELD_ID: &str = "id";
const FIELD_VALUE: &str = "value";
const FIELD_RECORD_ID: &str = "record_id";
const FIELD_SECTION_ID: &str = "section_id";
const FIELD_POSITION: &str = "position";

/// What to do when a diffed token no longer has a key in the lexicon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingKeyPolicy {
    /// Fail the whole build
    #[default]
    Abort,
    /// Emit the entry with `"value": null`
    MarkUnresolved,
}

/// Builds the report for one index column's diff snapshot
pub struct DiffReportBuilder<'a> {
    lexicon: &'a dyn TokenTable,
    shape: PostingShape,
    missing_keys: MissingKeyPolicy,
    key_buffer: Vec<u8>,
    remains: Vec<Posting>,
    missings: Vec<Posting>,
}

impl<'a> DiffReportBuilder<'a> {
    /// `flags` are the index column's flags; they fix the posting shape for
    /// every entry of the report.
    pub fn new(lexicon: &'a dyn TokenTable, flags: ColumnFlags) -> Self {
        Self {
            lexicon,
            shape: PostingShape::from_flags(flags),
            missing_keys: MissingKeyPolicy::default(),
            key_buffer: vec![0; lexicon.max_key_size()],
            remains: Vec::new(),
            missings: Vec::new(),
        }
    }

    pub fn with_missing_key_policy(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_keys = policy;
        self
    }

    pub fn shape(&self) -> PostingShape {
        self.shape
    }

    /// Emit `{"diffs": [...]}` for `diff`.
    ///
    /// # Errors
    ///
    /// - `DecodeFailed` if a posting vector is not a whole number of tuples
    /// - `KeyLookupFailed` if a token has no key (unless marking unresolved)
    /// - `KeyTooLarge` / `InvalidKey` if a key cannot be fetched or rendered
    /// - any writer error
    ///
    /// On error the writer holds a partial report that must be discarded.
    pub fn build(
        &mut self,
        diff: &DiffCollection,
        out: &mut dyn ReportWriter,
    ) -> Result<DiffSummary> {
        let mut summary = DiffSummary::default();

        out.open_map(1)?;
        out.key(FIELD_DIFFS)?;
        out.open_array(diff.len())?;
        for entry in diff {
            self.write_entry(entry, out, &mut summary)?;
            summary.n_entries += 1;
        }
        out.close_array()?;
        out.close_map()?;

        tracing::debug!(
            lexicon = self.lexicon.name(),
            shape = %self.shape,
            n_entries = summary.n_entries,
            n_remains = summary.n_remains,
            n_missings = summary.n_missings,
            n_unresolved = summary.n_unresolved,
            "diff report built"
        );
        Ok(summary)
    }

    fn write_entry(
        &mut self,
        entry: &DiffEntry,
        out: &mut dyn ReportWriter,
        summary: &mut DiffSummary,
    ) -> Result<()> {
        let shape = self.shape;
        let lexicon = self.lexicon;
        let token_id = entry.token_id;
        let decode = |vector: &[u32], buffer: &mut Vec<Posting>| {
            decode_into(vector, shape, buffer).map_err(|e| {
                ExError::from(e)
                    .with_table(lexicon.name())
                    .with_token_id(token_id)
            })
        };
        decode(&entry.remains, &mut self.remains)?;
        decode(&entry.missings, &mut self.missings)?;

        out.open_map(3)?;
        out.key(FIELD_TOKEN)?;
        self.write_token(token_id, out, summary)?;
        out.key(FIELD_REMAINS)?;
        write_postings(&self.remains, shape, out)?;
        out.key(FIELD_MISSINGS)?;
        write_postings(&self.missings, shape, out)?;
        out.close_map()?;

        summary.n_remains += self.remains.len();
        summary.n_missings += self.missings.len();
        Ok(())
    }

    fn write_token(
        &mut self,
        token_id: TokenId,
        out: &mut dyn ReportWriter,
        summary: &mut DiffSummary,
    ) -> Result<()> {
        out.open_map(2)?;
        out.key(FIELD_ID)?;
        out.uint(u64::from(token_id))?;
        out.key(FIELD_VALUE)?;

        match self.lexicon.get_key(token_id, &mut self.key_buffer) {
            Ok(len) => {
                let lexicon = self.lexicon;
                let Some(bytes) = self.key_buffer.get(..len) else {
                    return Err(PostDiffError::KeyTooLarge {
                        table: lexicon.name().to_string(),
                        token_id,
                        size: len,
                        capacity: self.key_buffer.len(),
                    }
                    .into());
                };
                let value = render_key(lexicon.name(), lexicon.key_type(), token_id, bytes)?;
                value.write_to(out)?;
            }
            Err(e)
                if e.kind() == ExErrorKind::KeyLookupFailed
                    && self.missing_keys == MissingKeyPolicy::MarkUnresolved =>
            {
                tracing::debug!(
                    lexicon = self.lexicon.name(),
                    token_id,
                    "token key missing, marked unresolved"
                );
                summary.n_unresolved += 1;
                out.null()?;
            }
            Err(e) => return Err(e),
        }

        out.close_map()
    }
}

fn write_postings(
    postings: &[Posting],
    shape: PostingShape,
    out: &mut dyn ReportWriter,
) -> Result<()> {
    out.open_array(postings.len())?;
    for posting in postings {
        out.open_map(shape.width())?;
        out.key(FIELD_RECORD_ID)?;
        out.uint(u64::from(posting.record_id))?;
        if let Some(section_id) = posting.section_id.filter(|_| shape.has_section()) {
            out.key(FIELD_SECTION_ID)?;
            out.uint(u64::from(section_id))?;
        }
        if let Some(position) = posting.position.filter(|_| shape.has_position()) {
            out.key(FIELD_POSITION)?;
            out.uint(u64::from(position))?;
        }
        out.close_map()?;
    }
    out.close_array()
}

/// Build the whole report in memory.
///
/// # Errors
///
/// See [`DiffReportBuilder::build`]; no partial report is returned.
pub fn build_report(
    diff: &DiffCollection,
    lexicon: &dyn TokenTable,
    flags: ColumnFlags,
) -> Result<Value> {
    let mut writer = JsonTreeWriter::new();
    DiffReportBuilder::new(lexicon, flags).build(diff, &mut writer)?;
    writer.finish()
}
