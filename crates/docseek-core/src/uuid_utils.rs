//! Document identifiers.
//!
//! Documents get UUIDv7 ids, so ids sort in upload order and carry their
//! creation time in the first 48 bits.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Parse a client-supplied document id.
///
/// Any string that is not a UUID is rejected as invalid input before a
/// repository is consulted.
pub fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::InvalidInput("Invalid UUID format".to_string()))
}

/// Extract the embedded timestamp from a UUIDv7.
///
/// Returns `None` if the UUID is not version 7.
pub fn extract_timestamp(uuid: &Uuid) -> Option<DateTime<Utc>> {
    if !is_v7(uuid) {
        return None;
    }
    let millis = uuid.as_bytes()[..6]
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | *b as u64);
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// Check if a UUID is version 7.
#[inline]
pub fn is_v7(uuid: &Uuid) -> bool {
    uuid.get_version_num() == 7
}
