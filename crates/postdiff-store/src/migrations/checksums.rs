//! Migration checksums
//!
//! A migration's checksum is recorded when it is applied and compared on
//! every later open, so an edited migration file is caught instead of
//! silently diverging from databases created with the old text.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of migration SQL, with line endings normalised to `\n`
pub fn compute_checksum(sql: &str) -> String {
    let normalised = sql.replace("\r\n", "\n");
    hex::encode(Sha256::digest(normalised.as_bytes()))
}
