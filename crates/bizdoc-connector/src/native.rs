//! # External Connector Interface
//!
//! The adapter drives an external connector runtime through these traits.
//! The runtime exposes native documents and parameter structures whose
//! fields are read and written as wire strings by declared name. The
//! adapter owns every conversion between wire strings and typed values.
//!
//! ## Operations
//!
//! - **create_document / create_request**: an empty native object for one
//!   message type or function
//! - **send / send_list / send_queued**: submit documents under one
//!   transaction identifier; list sends are all-or-nothing
//! - **execute**: run a function and return its native response

use bizdoc_registry::IDocTypeKey;

use crate::error::NativeError;
use crate::tid::TransactionId;

/// One segment of a native document.
pub trait NativeSegment {
    fn segment_type(&self) -> &str;

    /// Write a field's wire string.
    fn set_value(&mut self, field: &str, wire: &str) -> Result<(), NativeError>;

    /// A field's wire string, or `None` if the field was never written.
    fn value(&self, field: &str) -> Option<String>;

    /// Append a child segment and return it.
    fn add_child(&mut self, segment_type: &str) -> Result<&mut Self, NativeError>;

    fn child_count(&self) -> usize;

    fn child(&self, index: usize) -> Option<&Self>;
}

/// A native document: control record plus segment tree.
pub trait NativeDocument {
    type Segment: NativeSegment;

    /// Write a control-record field by its control name (e.g. `ARCKEY`).
    fn set_header(&mut self, control: &str, value: &str) -> Result<(), NativeError>;

    fn header(&self, control: &str) -> Option<String>;

    fn root_segment(&self) -> &Self::Segment;

    fn root_segment_mut(&mut self) -> &mut Self::Segment;
}

/// A native parameter structure, or one row of a native table.
pub trait NativeStructure {
    /// Write a scalar member's wire string.
    fn set_value(&mut self, field: &str, wire: &str) -> Result<(), NativeError>;

    /// A scalar member's wire string, or `None` if it was never written.
    fn value(&self, field: &str) -> Option<String>;

    /// A nested structure, created on first use.
    fn structure_mut(&mut self, name: &str) -> Result<&mut Self, NativeError>;

    fn structure(&self, name: &str) -> Option<&Self>;

    /// Append a row to a table member and return it.
    fn append_row(&mut self, table: &str) -> Result<&mut Self, NativeError>;

    fn row_count(&self, table: &str) -> usize;

    fn row(&self, table: &str, index: usize) -> Option<&Self>;
}

/// Connector that sends IDoc documents.
///
/// Implementations must be `Send + Sync` so one connector can serve many
/// callers behind an `Arc`.
pub trait IDocConnector: Send + Sync {
    type Document: NativeDocument;

    /// An empty native document for one IDoc type.
    fn create_document(&self, key: &IDocTypeKey) -> Result<Self::Document, NativeError>;

    /// Submit one document.
    fn send(&self, document: Self::Document, tid: &TransactionId) -> Result<(), NativeError>;

    /// Submit documents together: all are accepted or none.
    fn send_list(
        &self,
        documents: Vec<Self::Document>,
        tid: &TransactionId,
    ) -> Result<(), NativeError>;

    /// Submit documents together to a named inbound queue.
    fn send_queued(
        &self,
        documents: Vec<Self::Document>,
        queue: &str,
        tid: &TransactionId,
    ) -> Result<(), NativeError>;

    /// Human-readable name of this connector implementation.
    fn connector_name(&self) -> &str;
}

/// Connector that executes remote function calls.
pub trait FunctionConnector: Send + Sync {
    type Structure: NativeStructure;

    /// An empty native request for `function`.
    fn create_request(&self, function: &str) -> Result<Self::Structure, NativeError>;

    /// Run `function` and return its native response.
    fn execute(
        &self,
        function: &str,
        request: Self::Structure,
    ) -> Result<Self::Structure, NativeError>;
}
