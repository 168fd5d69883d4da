//! # bizdoc-connector — Native-Call Adapter
//!
//! Bridges the bizdoc model to an external connector runtime.
//!
//! - **Producer** ([`write_document`], [`write_structure`], and the
//!   `send_*` functions): walks a populated model in metadata order and
//!   writes each value as a wire string into a native object.
//! - **Consumer** ([`read_document`], [`read_structure`]): walks declared
//!   metadata and decodes each native wire string into the model.
//! - [`call_function`] runs the producer on a request, executes it, and
//!   runs the consumer on the response.
//!
//! Both paths use the same coercion rules as the XML codec, so a document
//! built from XML and one read from a connector are indistinguishable.
//! A field that fails to convert fails the whole operation with
//! [`ConnectorError::Field`]; no default is substituted.
//!
//! [`MemoryConnector`] is an in-process implementation of the connector
//! traits with a send log.

pub mod consumer;
pub mod error;
pub mod memory;
pub mod native;
pub mod producer;
pub mod tid;

pub use consumer::{call_function, read_document, read_structure};
pub use error::{ConnectorError, NativeError};
pub use memory::{MemoryConnector, MemoryDocument, MemorySegment, MemoryStructure, SentBatch};
pub use native::{FunctionConnector, IDocConnector, NativeDocument, NativeSegment, NativeStructure};
pub use producer::{
    send_document, send_document_list, send_document_list_queued, write_document, write_structure,
};
pub use tid::{InvalidTransactionId, TransactionId, TID_LENGTH};
