//! Adapter error types.

use thiserror::Error;

use bizdoc_core::{CoercionError, DataType};
use bizdoc_model::ModelError;

/// Failure reported by an external connector runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct NativeError(pub String);

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors from the producer and consumer paths.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// A field value could not be converted between its typed and wire form.
    ///
    /// No default is substituted: the whole conversion fails.
    #[error("field {field} ({data_type}): cannot convert {text:?}: {source}")]
    Field {
        /// Declared field name.
        field: String,
        /// Declared type of the field.
        data_type: DataType,
        /// The wire string or typed value that failed to convert.
        text: String,
        /// The underlying coercion failure.
        #[source]
        source: CoercionError,
    },

    /// The model rejected a segment, member, or value read from the connector.
    #[error("model: {0}")]
    Model(#[from] ModelError),

    /// The connector runtime itself failed.
    #[error("connector: {0}")]
    Native(#[from] NativeError),

    /// A function call was given a response structure as its request.
    #[error("function {function}: expected a request structure, got {actual}")]
    NotARequest {
        /// Function the structure belongs to.
        function: String,
        /// Name of the structure that was passed.
        actual: String,
    },
}
