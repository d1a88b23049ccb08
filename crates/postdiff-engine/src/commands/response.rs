//! Response envelope.
//!
//! Command output is wrapped as `[header, body]`:
//!
//! - success: `[[0, start_time, elapsed], body]`
//! - failure: `[[return_code, start_time, elapsed, message], null]`
//!
//! `start_time` is Unix seconds with a fractional part and `elapsed` is in
//! seconds. `return_code` is the failing error kind's negative return code.

use chrono::{DateTime, Utc};
use postdiff_core::errors::{ExError, Result};
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::time::Instant;

/// Return code of a successful command
pub const RC_SUCCESS: i32 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHeader {
    pub return_code: i32,
    pub start_time: DateTime<Utc>,
    pub elapsed: f64,
    /// Failure message; `None` on success
    pub message: Option<String>,
}

impl ResponseHeader {
    fn to_json(&self) -> Value {
        let start_time = self.start_time.timestamp() as f64
            + f64::from(self.start_time.timestamp_subsec_micros()) / 1_000_000.0;
        match &self.message {
            None => json!([self.return_code, start_time, self.elapsed]),
            Some(message) => json!([self.return_code, start_time, self.elapsed, message]),
        }
    }
}

/// A command result in its envelope
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub header: ResponseHeader,
    pub body: Option<Value>,
}

impl Response {
    pub fn success(start_time: DateTime<Utc>, elapsed: f64, body: Value) -> Self {
        Self {
            header: ResponseHeader {
                return_code: RC_SUCCESS,
                start_time,
                elapsed,
                message: None,
            },
            body: Some(body),
        }
    }

    /// Failure envelope carrying the error's return code and message
    pub fn failure(start_time: DateTime<Utc>, elapsed: f64, err: &ExError) -> Self {
        Self {
            header: ResponseHeader {
                return_code: err.return_code(),
                start_time,
                elapsed,
                message: Some(err.message().to_string()),
            },
            body: None,
        }
    }

    /// Run `command` and wrap its outcome, timing it
    pub fn capture<F>(command: F) -> Self
    where
        F: FnOnce() -> Result<Value>,
    {
        let start_time = Utc::now();
        let start = Instant::now();
        let outcome = command();
        let elapsed = start.elapsed().as_secs_f64();
        match outcome {
            Ok(body) => Self::success(start_time, elapsed, body),
            Err(err) => Self::failure(start_time, elapsed, &err),
        }
    }

    pub fn is_success(&self) -> bool {
        self.header.return_code == RC_SUCCESS
    }

    pub fn to_json(&self) -> Value {
        let body = self.body.clone().unwrap_or(Value::Null);
        json!([self.header.to_json(), body])
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
