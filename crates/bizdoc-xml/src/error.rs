//! # Codec Errors
//!
//! Structural failures (malformed XML, unknown names, missing namespaces)
//! and value-coercion failures are both reported here. The `to_*`
//! conversions turn any of them into an absent result.

use thiserror::Error;

use bizdoc_core::CoercionError;
use bizdoc_model::ModelError;
use bizdoc_registry::RegistryError;

/// Error encoding or decoding XML.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The input is not well-formed XML or not valid UTF-8.
    #[error("malformed XML: {0}")]
    Malformed(String),

    /// An element was found where another was required.
    #[error("unexpected element {found:?}, expected {expected}")]
    UnexpectedElement {
        /// What the decoder expected at this position.
        expected: String,
        /// The element actually found.
        found: String,
    },

    /// An attribute is not a header field, a declared field, or a reserved name.
    #[error("element {element:?}: unexpected attribute {attribute:?}")]
    UnexpectedAttribute {
        /// Element carrying the attribute.
        element: String,
        /// The offending attribute.
        attribute: String,
    },

    /// No namespace declaration identifies a registered message type.
    #[error("no {kind} namespace declared under {base}")]
    MissingNamespace {
        /// `idoc` or `rfc`.
        kind: &'static str,
        /// Namespace base URI in effect.
        base: String,
    },

    /// The message type named by the namespace is not registered.
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    /// The model rejected a decoded name or value.
    #[error("model: {0}")]
    Model(#[from] ModelError),

    /// A field value could not be encoded to its wire form.
    #[error("field {field}: {source}")]
    Encode {
        /// Declared field name.
        field: String,
        /// The underlying coercion failure.
        #[source]
        source: CoercionError,
    },

    /// Writing the XML output failed.
    #[error("write failed: {0}")]
    Write(String),

    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Whether this is a value-coercion failure rather than a structural one.
    pub fn is_coercion(&self) -> bool {
        matches!(
            self,
            Self::Encode { .. } | Self::Model(ModelError::Coercion { .. })
        )
    }
}
