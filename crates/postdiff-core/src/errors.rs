use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable string code used by tests, log events and the
/// failure response, plus a numeric return code carried by the response
/// envelope header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Arguments
    InvalidArgument,
    InvalidInput,
    NotFound,

    // Decode / consistency
    DecodeFailed,
    PostingShapeMismatch,
    KeyLookupFailed,
    KeyTooLarge,
    InvalidKey,
    OutputProtocol,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    ExternalService,
    NotImplemented,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidArgument => "ERR_INVALID_ARGUMENT",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::DecodeFailed => "ERR_DECODE_FAILED",
            ExErrorKind::PostingShapeMismatch => "ERR_POSTING_SHAPE_MISMATCH",
            ExErrorKind::KeyLookupFailed => "ERR_KEY_LOOKUP_FAILED",
            ExErrorKind::KeyTooLarge => "ERR_KEY_TOO_LARGE",
            ExErrorKind::InvalidKey => "ERR_INVALID_KEY",
            ExErrorKind::OutputProtocol => "ERR_OUTPUT_PROTOCOL",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::NotImplemented => "ERR_NOT_IMPLEMENTED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Numeric return code reported in the response envelope header.
    ///
    /// Values follow the errno-like convention of the groonga command protocol:
    /// zero is success, every failure is negative.
    pub fn return_code(&self) -> i32 {
        match self {
            ExErrorKind::InvalidArgument | ExErrorKind::InvalidInput => -22,
            ExErrorKind::NotFound | ExErrorKind::KeyLookupFailed => -2,
            ExErrorKind::KeyTooLarge => -7,
            ExErrorKind::DecodeFailed
            | ExErrorKind::PostingShapeMismatch
            | ExErrorKind::InvalidKey => -74,
            ExErrorKind::OutputProtocol | ExErrorKind::Serialization => -71,
            ExErrorKind::Io | ExErrorKind::Persistence => -5,
            ExErrorKind::ExternalService => -67,
            ExErrorKind::NotImplemented => -38,
            ExErrorKind::Internal => -1,
        }
    }
}

/// Canonical structured error type
///
/// Classification plus the context a failure message needs: the operation,
/// the table/column being reported on and, for per-token failures, the token.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<String>,
    column: Option<String>,
    token_id: Option<u32>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            column: None,
            token_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table name context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add column name context
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Add token id context
    pub fn with_token_id(mut self, token_id: u32) -> Self {
        self.token_id = Some(token_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the numeric return code
    pub fn return_code(&self) -> i32 {
        self.kind.return_code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the column context, if any
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Get the token id context, if any
    pub fn token_id(&self) -> Option<u32> {
        self.token_id
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(token_id) = self.token_id {
            write!(f, " (token_id: {})", token_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain failures raised while resolving, decoding and emitting a posting diff report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PostDiffError {
    // ===== Argument Errors =====
    /// Named table does not exist
    #[error("[index-column][diff] table doesn't exist: <{table}>")]
    TableNotFound { table: String },

    /// Named table exists but is not token-keyed
    #[error("[index-column][diff] table must be lexicon: <{table}>: {kind}")]
    NotALexicon { table: String, kind: String },

    /// Named column does not exist on the table
    #[error("[index-column][diff] column doesn't exist: <{table}>: <{column}>")]
    ColumnNotFound { table: String, column: String },

    /// Named column exists but is not an inverted index
    #[error("[index-column][diff] column must be index column: <{table}>: <{column}>: {kind}")]
    NotAnIndexColumn {
        table: String,
        column: String,
        kind: String,
    },

    // ===== Decode Errors =====
    /// Flat posting vector length is not a multiple of the tuple width
    #[error("posting vector of length {len} is not a multiple of tuple width {width}")]
    MisalignedPostingVector { len: usize, width: usize },

    /// A posting's optional fields disagree with the column's shape
    #[error("posting #{index} does not match shape {shape}: {reason}")]
    PostingShapeMismatch {
        index: usize,
        shape: String,
        reason: String,
    },

    // ===== Token Key Errors =====
    /// Token id has no key in the lexicon
    #[error("token {token_id} has no key in lexicon <{table}>")]
    TokenKeyMissing { table: String, token_id: u32 },

    /// Stored key exceeds the lookup buffer
    #[error("key of token {token_id} in lexicon <{table}> is {size} bytes, buffer holds {capacity}")]
    KeyTooLarge {
        table: String,
        token_id: u32,
        size: usize,
        capacity: usize,
    },

    /// Key bytes cannot be rendered as the lexicon's key type
    #[error("key of token {token_id} in lexicon <{table}> is not a valid {key_type}: {reason}")]
    InvalidKey {
        table: String,
        token_id: u32,
        key_type: String,
        reason: String,
    },

    // ===== Output Errors =====
    /// Report writer received a member its open container did not declare
    #[error("output protocol violation: {reason}")]
    OutputProtocol { reason: String },

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from PostDiffError to ExError
///
/// Keeps the message text of the domain error and lifts its identifiers into
/// the structured context fields.
impl From<PostDiffError> for ExError {
    fn from(err: PostDiffError) -> Self {
        let message = err.to_string();
        match err {
            PostDiffError::TableNotFound { table } | PostDiffError::NotALexicon { table, .. } => {
                ExError::new(ExErrorKind::InvalidArgument)
                    .with_op("index_column_diff")
                    .with_table(table)
                    .with_message(message)
            }
            PostDiffError::ColumnNotFound { table, column }
            | PostDiffError::NotAnIndexColumn { table, column, .. } => {
                ExError::new(ExErrorKind::InvalidArgument)
                    .with_op("index_column_diff")
                    .with_table(table)
                    .with_column(column)
                    .with_message(message)
            }
            PostDiffError::MisalignedPostingVector { .. } => {
                ExError::new(ExErrorKind::DecodeFailed)
                    .with_op("decode_postings")
                    .with_message(message)
            }
            PostDiffError::PostingShapeMismatch { .. } => {
                ExError::new(ExErrorKind::PostingShapeMismatch)
                    .with_op("encode_postings")
                    .with_message(message)
            }
            PostDiffError::TokenKeyMissing { table, token_id } => {
                ExError::new(ExErrorKind::KeyLookupFailed)
                    .with_op("get_key")
                    .with_table(table)
                    .with_token_id(token_id)
                    .with_message(message)
            }
            PostDiffError::KeyTooLarge {
                table, token_id, ..
            } => ExError::new(ExErrorKind::KeyTooLarge)
                .with_op("get_key")
                .with_table(table)
                .with_token_id(token_id)
                .with_message(message),
            PostDiffError::InvalidKey {
                table, token_id, ..
            } => ExError::new(ExErrorKind::InvalidKey)
                .with_op("render_key")
                .with_table(table)
                .with_token_id(token_id)
                .with_message(message),
            PostDiffError::OutputProtocol { .. } => {
                ExError::new(ExErrorKind::OutputProtocol).with_message(message)
            }
            PostDiffError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            PostDiffError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<std::io::Error> for ExError {
    fn from(err: std::io::Error) -> Self {
        ExError::new(ExErrorKind::Io).with_message(err.to_string())
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_op_and_message() {
        let err = ExError::new(ExErrorKind::InvalidArgument)
            .with_op("index_column_diff")
            .with_message("table doesn't exist");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_INVALID_ARGUMENT]"));
        assert!(text.contains("index_column_diff"));
        assert!(text.contains("table doesn't exist"));
    }

    #[test]
    fn test_source_is_exposed_through_std_error() {
        use std::error::Error as _;

        let inner = ExError::new(ExErrorKind::Persistence).with_message("disk gone");
        let outer = ExError::new(ExErrorKind::Persistence).with_source(inner);
        assert!(outer.source().is_some());
        assert_eq!(outer.source_error().map(|e| e.message()), Some("disk gone"));
    }

    #[test]
    fn test_return_codes_are_negative() {
        for kind in [
            ExErrorKind::InvalidArgument,
            ExErrorKind::DecodeFailed,
            ExErrorKind::KeyTooLarge,
            ExErrorKind::Internal,
        ] {
            assert!(kind.return_code() < 0, "{:?}", kind);
        }
    }
}
