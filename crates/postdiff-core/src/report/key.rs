//! Rendering lexicon keys for the report's `token.value` field.

use crate::catalog::KeyType;
use crate::diff::TokenId;
use crate::errors::{PostDiffError, Result};
use crate::report::writer::ReportWriter;
use base64::prelude::{Engine as _, BASE64_STANDARD};

/// A key decoded according to its lexicon's key type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValue<'a> {
    Text(&'a str),
    /// Base64 of the raw key bytes
    Binary(String),
    UInt(u64),
    Int(i64),
}

impl KeyValue<'_> {
    /// # Errors
    ///
    /// Whatever the writer reports.
    pub fn write_to(&self, out: &mut dyn ReportWriter) -> Result<()> {
        match self {
            KeyValue::Text(text) => out.text(text),
            KeyValue::Binary(encoded) => out.text(encoded),
            KeyValue::UInt(value) => out.uint(*value),
            KeyValue::Int(value) => out.int(*value),
        }
    }
}

/// Decode raw key bytes for `token_id` of `lexicon`.
///
/// # Errors
///
/// `InvalidKey` if text keys are not UTF-8 or integer keys have the wrong
/// length.
pub fn render_key<'a>(
    lexicon: &str,
    key_type: KeyType,
    token_id: TokenId,
    bytes: &'a [u8],
) -> std::result::Result<KeyValue<'a>, PostDiffError> {
    let invalid = |reason: String| PostDiffError::InvalidKey {
        table: lexicon.to_string(),
        token_id,
        key_type: key_type.to_string(),
        reason,
    };

    if let Some(width) = key_type.fixed_width() {
        if bytes.len() != width {
            return Err(invalid(format!(
                "expected {} bytes, got {}",
                width,
                bytes.len()
            )));
        }
    }

    Ok(match key_type {
        KeyType::ShortText => {
            KeyValue::Text(std::str::from_utf8(bytes).map_err(|e| invalid(e.to_string()))?)
        }
        KeyType::Binary => KeyValue::Binary(BASE64_STANDARD.encode(bytes)),
        KeyType::UInt32 => KeyValue::UInt(u64::from(u32::from_le_bytes(fixed(bytes)))),
        KeyType::Int32 => KeyValue::Int(i64::from(i32::from_le_bytes(fixed(bytes)))),
        KeyType::UInt64 => KeyValue::UInt(u64::from_le_bytes(fixed(bytes))),
        KeyType::Int64 => KeyValue::Int(i64::from_le_bytes(fixed(bytes))),
    })
}

// Length was checked against `fixed_width` above.
fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut array = [0u8; N];
    array.copy_from_slice(&bytes[..N]);
    array
}
