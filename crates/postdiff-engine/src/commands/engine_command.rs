//! Engine-level commands.

#![allow(clippy::result_large_err)]

use crate::commands::index_column_diff::{index_column_diff_json, DiffOptions, DiffReport};
use postdiff_core::catalog::{Catalog, DiffEngine};
use postdiff_core::errors::Result;
use postdiff_store::SqliteCatalog;

/// Engine-level commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Report the posting diff of one index column
    IndexColumnDiff {
        table: String,
        name: String,
        options: DiffOptions,
    },
}

/// Result of applying an engine command
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommandResult {
    IndexColumnDiff(DiffReport),
}

/// Apply an engine command against any catalog and diff engine
pub fn apply_engine_command(
    cmd: EngineCommand,
    catalog: &dyn Catalog,
    engine: &dyn DiffEngine,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::IndexColumnDiff {
            table,
            name,
            options,
        } => index_column_diff_json(catalog, engine, &table, &name, &options)
            .map(EngineCommandResult::IndexColumnDiff),
    }
}

/// Apply an engine command against a store, serving its stored diffs
pub fn apply_stored_command(
    cmd: EngineCommand,
    catalog: &SqliteCatalog,
) -> Result<EngineCommandResult> {
    apply_engine_command(cmd, catalog, &catalog.diff_engine())
}
