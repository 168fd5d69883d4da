//! # bizdoc-model — Business Document Model
//!
//! In-memory representations built and read by the XML codec and the
//! native-call adapter.
//!
//! - [`Document`] is one IDoc: a control header, a creation stamp, and a
//!   segment tree stored as an arena. [`SegmentRef`] and [`SegmentMut`] are
//!   borrowing handles into that arena.
//! - [`DocumentList`] is an ordered batch of documents of one IDoc type.
//! - [`Structure`] and [`Table`] hold a function module's request or
//!   response parameters.
//!
//! ## Invariants
//!
//! Every mutation is checked against the registry metadata the model was
//! created from:
//!
//! - a field value's kind matches the field's declared type;
//! - a child segment type is permitted under its parent, and its occurrence
//!   count never exceeds the declared maximum;
//! - the root segment has no fields and hierarchy level 0, and every other
//!   segment sits one level below its parent.
//!
//! Unset fields are absent. There is no null value.

pub mod document;
pub mod error;
pub mod header;
pub mod segment;
pub mod structure;
pub mod validate;

pub use document::{Document, DocumentList};
pub use error::ModelError;
pub use header::{
    Header, HeaderField, CREATION_DATE, CREATION_DATE_CONTROL, CREATION_TIME, CREATION_TIME_CONTROL,
};
pub use segment::{SegmentId, SegmentMut, SegmentRef};
pub use structure::{Member, Structure, Table};
pub use validate::{ValidationViolations, Violation};
