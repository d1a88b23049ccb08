//! Error handling for postdiff-store
//!
//! Wraps postdiff-core ExError with store-specific helpers

use postdiff_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a seed validation error
pub fn seed_validation(reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("seed_parse")
        .with_message(reason.to_string())
}

/// Stored snapshot rows that cannot be turned back into a diff collection
pub fn corrupt_snapshot(table: &str, column: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("load_diff")
        .with_table(table)
        .with_column(column)
        .with_message(format!(
            "Stored diff of <{}.{}> is corrupt: {}",
            table, column, reason
        ))
}

/// A stored posting blob that is not a whole number of `u32`s
pub fn corrupt_posting_blob(len: usize) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("decode_postings")
        .with_message(format!(
            "posting blob of {} bytes is not a multiple of 4",
            len
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
