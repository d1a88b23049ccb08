//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across the engine, the store
//! and the CLI.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Object identifiers
pub const FIELD_TABLE: &str = "table";
pub const FIELD_COLUMN: &str = "column";
pub const FIELD_TOKEN_ID: &str = "token_id";

// Report sizes
pub const FIELD_N_ENTRIES: &str = "n_entries";
pub const FIELD_N_REMAINS: &str = "n_remains";
pub const FIELD_N_MISSINGS: &str = "n_missings";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
