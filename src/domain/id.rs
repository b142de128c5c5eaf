use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

const ID_LEN: usize = 24;

/// Identifier shared by every persisted record.
///
/// Twelve bytes rendered as 24 lowercase hex characters: a big-endian
/// seconds timestamp followed by eight random bytes. Ids coming from
/// callers are accepted in either case and normalised to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> Self {
        let secs = Utc::now().timestamp() as u32;
        let random = Uuid::new_v4();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&random.as_bytes()[..8]);
        RecordId(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses a caller-supplied id, naming the record kind in the error.
    pub fn parse_named(raw: &str, kind: &str) -> Result<Self, DomainError> {
        raw.parse()
            .map_err(|_| DomainError::invalid(format!("Invalid {} ID format", kind)))
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DomainError::invalid(format!("Invalid ID format: '{}'", s)));
        }
        Ok(RecordId(s.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for RecordId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
