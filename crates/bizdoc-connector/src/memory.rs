//! # In-Memory Connector
//!
//! Reference implementation of the connector traits for tests and local
//! development. Native objects are plain maps of wire strings. Sends are
//! recorded in a log instead of leaving the process. Function calls are
//! answered by registered handlers.
//!
//! Conventions:
//! - a queue name of `""` is rejected, like a missing queue on a real system;
//! - executing a function with no registered handler fails.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use parking_lot::Mutex;

use bizdoc_registry::{IDocTypeKey, ROOT_SEGMENT_TYPE};

use crate::error::NativeError;
use crate::native::{
    FunctionConnector, IDocConnector, NativeDocument, NativeSegment, NativeStructure,
};
use crate::tid::TransactionId;

// ---------------------------------------------------------------------------
// Native objects
// ---------------------------------------------------------------------------

/// A native segment: wire strings by field name plus ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySegment {
    segment_type: String,
    values: BTreeMap<String, String>,
    children: Vec<MemorySegment>,
}

impl MemorySegment {
    pub fn new(segment_type: impl Into<String>) -> Self {
        Self {
            segment_type: segment_type.into(),
            ..Self::default()
        }
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn children(&self) -> &[MemorySegment] {
        &self.children
    }
}

impl NativeSegment for MemorySegment {
    fn segment_type(&self) -> &str {
        &self.segment_type
    }

    fn set_value(&mut self, field: &str, wire: &str) -> Result<(), NativeError> {
        self.values.insert(field.to_string(), wire.to_string());
        Ok(())
    }

    fn value(&self, field: &str) -> Option<String> {
        self.values.get(field).cloned()
    }

    fn add_child(&mut self, segment_type: &str) -> Result<&mut Self, NativeError> {
        self.children.push(MemorySegment::new(segment_type));
        let last = self.children.len() - 1;
        Ok(&mut self.children[last])
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index)
    }
}

/// A native document: control record by control name plus segment tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDocument {
    key: IDocTypeKey,
    header: BTreeMap<String, String>,
    root: MemorySegment,
}

impl MemoryDocument {
    pub fn new(key: IDocTypeKey) -> Self {
        Self {
            key,
            header: BTreeMap::new(),
            root: MemorySegment::new(ROOT_SEGMENT_TYPE),
        }
    }

    pub fn key(&self) -> &IDocTypeKey {
        &self.key
    }

    pub fn header_values(&self) -> &BTreeMap<String, String> {
        &self.header
    }
}

impl NativeDocument for MemoryDocument {
    type Segment = MemorySegment;

    fn set_header(&mut self, control: &str, value: &str) -> Result<(), NativeError> {
        self.header.insert(control.to_string(), value.to_string());
        Ok(())
    }

    fn header(&self, control: &str) -> Option<String> {
        self.header.get(control).cloned()
    }

    fn root_segment(&self) -> &MemorySegment {
        &self.root
    }

    fn root_segment_mut(&mut self) -> &mut MemorySegment {
        &mut self.root
    }
}

/// A native parameter structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStructure {
    values: BTreeMap<String, String>,
    structures: BTreeMap<String, MemoryStructure>,
    tables: BTreeMap<String, Vec<MemoryStructure>>,
}

impl MemoryStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl NativeStructure for MemoryStructure {
    fn set_value(&mut self, field: &str, wire: &str) -> Result<(), NativeError> {
        self.values.insert(field.to_string(), wire.to_string());
        Ok(())
    }

    fn value(&self, field: &str) -> Option<String> {
        self.values.get(field).cloned()
    }

    fn structure_mut(&mut self, name: &str) -> Result<&mut Self, NativeError> {
        Ok(self.structures.entry(name.to_string()).or_default())
    }

    fn structure(&self, name: &str) -> Option<&Self> {
        self.structures.get(name)
    }

    fn append_row(&mut self, table: &str) -> Result<&mut Self, NativeError> {
        let rows = self.tables.entry(table.to_string()).or_default();
        rows.push(MemoryStructure::default());
        let last = rows.len() - 1;
        Ok(&mut rows[last])
    }

    fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, Vec::len)
    }

    fn row(&self, table: &str, index: usize) -> Option<&Self> {
        self.tables.get(table)?.get(index)
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// One recorded send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentBatch {
    pub tid: TransactionId,
    /// Target queue for queued sends.
    pub queue: Option<String>,
    pub documents: Vec<MemoryDocument>,
}

type Handler = Box<dyn Fn(&MemoryStructure) -> Result<MemoryStructure, NativeError> + Send + Sync>;

/// In-memory connector with a send log and per-function handlers.
#[derive(Default)]
pub struct MemoryConnector {
    sent: Mutex<Vec<SentBatch>>,
    handlers: HashMap<String, Handler>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls of `function` with `handler`.
    pub fn with_handler<F>(mut self, function: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&MemoryStructure) -> Result<MemoryStructure, NativeError> + Send + Sync + 'static,
    {
        self.handlers.insert(function.into(), Box::new(handler));
        self
    }

    /// Snapshot of every send so far, oldest first.
    pub fn sent(&self) -> Vec<SentBatch> {
        self.sent.lock().clone()
    }

    /// Remove and return the send log.
    pub fn take_sent(&self) -> Vec<SentBatch> {
        std::mem::take(&mut *self.sent.lock())
    }

    fn record(&self, tid: &TransactionId, queue: Option<&str>, documents: Vec<MemoryDocument>) {
        tracing::debug!(
            tid = %tid,
            queue = ?queue,
            documents = documents.len(),
            "recorded in-memory send"
        );
        self.sent.lock().push(SentBatch {
            tid: tid.clone(),
            queue: queue.map(str::to_string),
            documents,
        });
    }
}

impl fmt::Debug for MemoryConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        functions.sort_unstable();
        f.debug_struct("MemoryConnector")
            .field("sent", &self.sent.lock().len())
            .field("functions", &functions)
            .finish()
    }
}

impl IDocConnector for MemoryConnector {
    type Document = MemoryDocument;

    fn create_document(&self, key: &IDocTypeKey) -> Result<MemoryDocument, NativeError> {
        Ok(MemoryDocument::new(key.clone()))
    }

    fn send(&self, document: MemoryDocument, tid: &TransactionId) -> Result<(), NativeError> {
        self.record(tid, None, vec![document]);
        Ok(())
    }

    fn send_list(
        &self,
        documents: Vec<MemoryDocument>,
        tid: &TransactionId,
    ) -> Result<(), NativeError> {
        self.record(tid, None, documents);
        Ok(())
    }

    fn send_queued(
        &self,
        documents: Vec<MemoryDocument>,
        queue: &str,
        tid: &TransactionId,
    ) -> Result<(), NativeError> {
        if queue.is_empty() {
            return Err(NativeError::new("queue name must not be empty"));
        }
        self.record(tid, Some(queue), documents);
        Ok(())
    }

    fn connector_name(&self) -> &str {
        "MemoryConnector"
    }
}

impl FunctionConnector for MemoryConnector {
    type Structure = MemoryStructure;

    fn create_request(&self, function: &str) -> Result<MemoryStructure, NativeError> {
        if !self.handlers.contains_key(function) {
            return Err(NativeError::new(format!("function {function} is not available")));
        }
        Ok(MemoryStructure::new())
    }

    fn execute(
        &self,
        function: &str,
        request: MemoryStructure,
    ) -> Result<MemoryStructure, NativeError> {
        let handler = self
            .handlers
            .get(function)
            .ok_or_else(|| NativeError::new(format!("function {function} is not available")))?;
        handler(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_children_keep_order() {
        let mut root = MemorySegment::new(ROOT_SEGMENT_TYPE);
        root.add_child("A").unwrap().set_value("F", "1").unwrap();
        root.add_child("B").unwrap();
        assert_eq!(root.child_count(), 2);
        assert_eq!(root.child(0).unwrap().segment_type(), "A");
        assert_eq!(root.child(0).unwrap().value("F").as_deref(), Some("1"));
        assert_eq!(root.child(1).unwrap().segment_type(), "B");
        assert!(root.child(2).is_none());
    }

    #[test]
    fn structure_tables_append_rows() {
        let mut s = MemoryStructure::new();
        s.append_row("T").unwrap().set_value("X", "1").unwrap();
        s.append_row("T").unwrap().set_value("X", "2").unwrap();
        assert_eq!(s.row_count("T"), 2);
        assert_eq!(s.row("T", 1).unwrap().value("X").as_deref(), Some("2"));
        assert_eq!(s.row_count("U"), 0);
        s.structure_mut("S").unwrap().set_value("Y", "y").unwrap();
        assert_eq!(s.structure("S").unwrap().value("Y").as_deref(), Some("y"));
    }

    #[test]
    fn queued_send_requires_queue_name() {
        let connector = MemoryConnector::new();
        let key = IDocTypeKey::new("R", "T", "", "", "");
        let tid = TransactionId::new();
        assert!(connector
            .send_queued(vec![MemoryDocument::new(key)], "", &tid)
            .is_err());
        assert!(connector.sent().is_empty());
    }

    #[test]
    fn unknown_function_is_unavailable() {
        let connector = MemoryConnector::new().with_handler("ECHO", |r| Ok(r.clone()));
        assert!(connector.create_request("ECHO").is_ok());
        assert!(connector.create_request("OTHER").is_err());
        assert!(connector.execute("OTHER", MemoryStructure::new()).is_err());
        assert!(format!("{connector:?}").contains("ECHO"));
    }
}
