//! Error types for board record decoding

use thiserror::Error;

/// A server line that claimed to be a board record but does not fit the grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed board record: {0}")]
pub struct MalformedRecord(pub String);

impl MalformedRecord {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
