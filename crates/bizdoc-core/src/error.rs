//! # Error Types
//!
//! Core error types built with `thiserror`. Coercion errors carry the data
//! type and the offending text so that callers further up (codec, adapter)
//! only have to add the field name to produce a complete diagnostic.

use thiserror::Error;

use crate::datatype::{DataType, ValueKind};

/// Top-level error type for core operations.
#[derive(Error, Debug)]
pub enum BizdocError {
    /// A value could not be coerced to or from its wire form.
    #[error("coercion error: {0}")]
    Coercion(#[from] CoercionError),

    /// A metadata type tag was not recognized.
    #[error("unknown data type tag: {0:?}")]
    UnknownDataType(String),
}

/// Error converting between a wire string and a rich value.
///
/// Never produced by silent truncation: every variant means the conversion
/// was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// The wire text could not be parsed as the declared type.
    #[error("{data_type} text {text:?} is invalid: {reason}")]
    InvalidText {
        /// Declared type of the field.
        data_type: DataType,
        /// The text that failed to parse.
        text: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The value does not fit the declared length, precision, or range.
    #[error("{data_type} value {value} is out of range: {reason}")]
    OutOfRange {
        /// Declared type of the field.
        data_type: DataType,
        /// Rendering of the rejected value.
        value: String,
        /// Which limit was exceeded.
        reason: String,
    },

    /// The value's kind does not match the declared type.
    #[error("{data_type} expects a {expected} value, got {actual}")]
    KindMismatch {
        /// Declared type of the field.
        data_type: DataType,
        /// Kind required by the declared type.
        expected: ValueKind,
        /// Kind of the supplied value.
        actual: ValueKind,
    },
}

impl CoercionError {
    /// The declared type the failing coercion targeted.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::InvalidText { data_type, .. }
            | Self::OutOfRange { data_type, .. }
            | Self::KindMismatch { data_type, .. } => *data_type,
        }
    }
}
