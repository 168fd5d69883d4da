//! # Transaction Identifiers
//!
//! Every send is tagged with a transaction identifier so the receiving
//! system can process it exactly once. The format is 32 uppercase hex
//! digits, the simple form of a random UUID.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// Length of a transaction identifier in hex digits.
pub const TID_LENGTH: usize = 32;

/// Text that is not a valid transaction identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid transaction id {0:?}: expected {TID_LENGTH} hex digits")]
pub struct InvalidTransactionId(pub String);

/// A 32-hex-digit transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string().to_uppercase())
    }

    /// Parse an identifier, accepting either case.
    pub fn parse(text: &str) -> Result<Self, InvalidTransactionId> {
        if text.len() != TID_LENGTH || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidTransactionId(text.to_string()));
        }
        Ok(Self(text.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TransactionId {
    type Err = InvalidTransactionId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
