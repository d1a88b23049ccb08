//! Command orchestration layer.
//!
//! Commands resolve their arguments through the catalog seam, call the diff
//! engine and own the operation's lifecycle logging.

pub mod engine_command;
pub mod index_column_diff;
pub mod response;

pub use engine_command::{
    apply_engine_command, apply_stored_command, EngineCommand, EngineCommandResult,
};
pub use index_column_diff::{index_column_diff, index_column_diff_json, DiffOptions, DiffReport};
pub use response::Response;
