//! `index_column_diff` command with boundary logging.
//!
//! Resolves a lexicon and one of its index columns, asks the diff engine
//! for a snapshot and streams the report into a writer.
//!
//! ## Logging Ownership
//!
//! This command owns lifecycle logging for the operation:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Catalog, engine and report builder log only at debug level.

#![allow(clippy::result_large_err)]

use postdiff_core::catalog::{Catalog, DiffEngine};
use postdiff_core::diff::DiffSummary;
use postdiff_core::errors::{ExError, PostDiffError, Result};
use postdiff_core::report::{DiffReportBuilder, JsonTreeWriter, MissingKeyPolicy, ReportWriter};
use postdiff_core::{log_op_end, log_op_error, log_op_start};
use postdiff_core_types::RequestId;
use serde::Serialize;
use serde_json::Value;

const OP: &str = "index_column_diff";

/// Caller-selectable behaviour of one report build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub missing_keys: MissingKeyPolicy,
}

impl DiffOptions {
    /// Options that keep going past tokens whose key has disappeared
    pub fn mark_unresolved() -> Self {
        Self {
            missing_keys: MissingKeyPolicy::MarkUnresolved,
        }
    }
}

/// A finished in-memory report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffReport {
    pub report: Value,
    pub summary: DiffSummary,
}

/// Build the posting diff report of index column `name` of lexicon `table`.
///
/// ## Errors
///
/// - `InvalidArgument`: the table is missing or not a lexicon, or the column
///   is missing or not an index column. The diff engine is not called.
/// - The diff engine's own kind, with the message prefixed by
///   `[index-column][diff] failed to diff: <table>: <name>:` and the original
///   error kept as source.
/// - `DecodeFailed`, `KeyLookupFailed`, `KeyTooLarge`, `InvalidKey` or
///   `OutputProtocol` while building. `out` then holds a partial report that
///   must be discarded.
pub fn index_column_diff(
    catalog: &dyn Catalog,
    engine: &dyn DiffEngine,
    table: &str,
    name: &str,
    options: &DiffOptions,
    out: &mut dyn ReportWriter,
) -> Result<DiffSummary> {
    let request_id = RequestId::new();
    log_op_start!(
        OP,
        request_id = request_id.as_str(),
        table = table,
        column = name
    );
    let start = std::time::Instant::now();

    let summary = index_column_diff_impl(catalog, engine, table, name, options, out).map_err(|e| {
        log_op_error!(
            OP,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = request_id.as_str()
        );
        e
    })?;

    log_op_end!(
        OP,
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = request_id.as_str(),
        n_entries = summary.n_entries,
        n_remains = summary.n_remains,
        n_missings = summary.n_missings,
        n_unresolved = summary.n_unresolved
    );

    Ok(summary)
}

/// [`index_column_diff`] into an in-memory JSON tree.
///
/// A failed build never returns a partial tree.
///
/// ## Errors
///
/// As [`index_column_diff`].
pub fn index_column_diff_json(
    catalog: &dyn Catalog,
    engine: &dyn DiffEngine,
    table: &str,
    name: &str,
    options: &DiffOptions,
) -> Result<DiffReport> {
    let mut writer = JsonTreeWriter::new();
    let summary = index_column_diff(catalog, engine, table, name, options, &mut writer)?;
    Ok(DiffReport {
        report: writer.finish()?,
        summary,
    })
}

fn index_column_diff_impl(
    catalog: &dyn Catalog,
    engine: &dyn DiffEngine,
    table: &str,
    name: &str,
    options: &DiffOptions,
    out: &mut dyn ReportWriter,
) -> Result<DiffSummary> {
    let table_info = catalog
        .find_table(table)?
        .ok_or_else(|| PostDiffError::TableNotFound {
            table: table.to_string(),
        })?;
    if !table_info.kind.is_lexicon() || table_info.key_type.is_none() {
        return Err(PostDiffError::NotALexicon {
            table: table.to_string(),
            kind: table_info.kind.to_string(),
        }
        .into());
    }

    let column = catalog
        .find_column(&table_info, name)?
        .ok_or_else(|| PostDiffError::ColumnNotFound {
            table: table.to_string(),
            column: name.to_string(),
        })?;
    if !column.kind.is_index_column() {
        return Err(PostDiffError::NotAnIndexColumn {
            table: table.to_string(),
            column: name.to_string(),
            kind: column.kind.to_string(),
        }
        .into());
    }

    let lexicon = catalog.open_lexicon(&table_info)?;
    let diff = engine.diff(&column).map_err(|e| {
        ExError::new(e.kind())
            .with_op(OP)
            .with_table(table)
            .with_column(name)
            .with_message(format!(
                "[index-column][diff] failed to diff: <{}>: <{}>: {}",
                table,
                name,
                e.message()
            ))
            .with_source(e)
    })?;
    tracing::debug!(
        column = %column.full_name(),
        shape = %column.shape(),
        n_entries = diff.len(),
        "diff snapshot obtained"
    );

    DiffReportBuilder::new(lexicon.as_ref(), column.flags)
        .with_missing_key_policy(options.missing_keys)
        .build(&diff, out)
        .map_err(|e| e.with_column(name))
}
