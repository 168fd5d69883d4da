//! # Registry Errors

use thiserror::Error;

/// Error building or querying the metadata registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No IDoc type is registered under the key.
    #[error("unknown IDoc type: {0}")]
    UnknownIDoc(String),

    /// No function is registered under the name.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// A member refers to a structure that is not defined.
    #[error("unknown structure {name:?} referenced by {referenced_by:?}")]
    UnknownStructure {
        /// Name of the missing structure.
        name: String,
        /// Structure or function holding the reference.
        referenced_by: String,
    },

    /// A child descriptor refers to a segment type that is not defined.
    #[error("IDoc {idoc}: unknown segment type {segment_type:?} referenced by {parent:?}")]
    UnknownSegment {
        /// Message-type id of the IDoc.
        idoc: String,
        /// Missing segment type.
        segment_type: String,
        /// Segment type holding the reference.
        parent: String,
    },

    /// A segment type is reachable at two different hierarchy levels.
    #[error("IDoc {idoc}: segment type {segment_type:?} reached at levels {first} and {second}")]
    InconsistentLevel {
        /// Message-type id of the IDoc.
        idoc: String,
        /// Segment type reached twice.
        segment_type: String,
        /// Level of the first occurrence.
        first: u32,
        /// Level of the conflicting occurrence.
        second: u32,
    },

    /// The same name was defined twice in one scope.
    #[error("duplicate {kind} {name:?}")]
    Duplicate {
        /// What was duplicated (segment, field, structure, ...).
        kind: &'static str,
        /// The duplicated name.
        name: String,
    },

    /// Definitions refer to themselves.
    #[error("{kind} definitions form a cycle: {path}")]
    Cycle {
        /// What cycles (segment or structure).
        kind: &'static str,
        /// The cycle, rendered as `A -> B -> A`.
        path: String,
    },

    /// A message-type id could not be parsed.
    #[error("invalid IDoc type id {0:?}: expected five '/'-separated parts")]
    InvalidKey(String),

    /// A definition file has an extension other than yaml, yml, or json.
    #[error("unsupported definition format: {0}")]
    UnsupportedFormat(String),

    /// YAML definition could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON definition could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading a definition file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
