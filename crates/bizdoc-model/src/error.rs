//! # Model Errors

use thiserror::Error;

use bizdoc_core::{CoercionError, DataType, ValueKind};

/// Error mutating or navigating a document or structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The segment type declares no field of that name.
    #[error("segment {segment}: unknown field {field:?}")]
    UnknownField {
        /// Segment type holding the lookup.
        segment: String,
        /// Requested field name.
        field: String,
    },

    /// The child type is not permitted under the parent segment.
    #[error("segment {parent}: unknown child segment type {segment_type:?}")]
    UnknownChild {
        /// Parent segment type.
        parent: String,
        /// Requested child type.
        segment_type: String,
    },

    /// The structure declares no member of that name.
    #[error("structure {structure}: unknown member {member:?}")]
    UnknownMember {
        /// Structure name.
        structure: String,
        /// Requested member name.
        member: String,
    },

    /// The member exists but is of a different shape (field, structure, table).
    #[error("member {member:?} is not a {expected}")]
    WrongMemberKind {
        /// Declared member name.
        member: String,
        /// Shape the caller asked for.
        expected: &'static str,
    },

    /// The value's kind does not match the field's declared type.
    #[error("field {field}: {data_type} expects a {expected} value, got {actual}")]
    TypeMismatch {
        /// Declared field name.
        field: String,
        /// Declared type.
        data_type: DataType,
        /// Kind required by the declared type.
        expected: ValueKind,
        /// Kind of the supplied value.
        actual: ValueKind,
    },

    /// Adding the child would exceed the declared maximum occurrence.
    #[error("segment {parent}: child {segment_type} may occur at most {max} times")]
    OccurrenceExceeded {
        /// Parent segment type.
        parent: String,
        /// Child segment type.
        segment_type: String,
        /// Declared maximum.
        max: u64,
    },

    /// A wire value could not be coerced to or from its declared type.
    #[error("field {field}: {source}")]
    Coercion {
        /// Declared field name.
        field: String,
        /// The underlying coercion failure.
        #[source]
        source: CoercionError,
    },

    /// A document of another IDoc type was added to a list.
    #[error("document of type {actual} does not belong to a list of {expected}")]
    SchemaMismatch {
        /// Message-type id of the list.
        expected: String,
        /// Message-type id of the document.
        actual: String,
    },
}
