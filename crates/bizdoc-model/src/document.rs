//! # Documents
//!
//! A [`Document`] owns its segments in a flat arena. Index 0 is always the
//! root. Parent and child links are [`SegmentId`]s into the same arena, so
//! there are no owning back-references.

use std::sync::Arc;

use indexmap::IndexMap;

use bizdoc_core::{CreationStamp, Value};
use bizdoc_registry::{IDocSchema, IDocTypeKey, SegmentMeta};

use crate::error::ModelError;
use crate::header::{Header, HeaderField};
use crate::segment::{SegmentId, SegmentMut, SegmentRef};

/// Arena node of one segment.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) meta: Arc<SegmentMeta>,
    pub(crate) parent: Option<SegmentId>,
    pub(crate) level: u32,
    /// Set fields, keyed by declared field name.
    pub(crate) fields: IndexMap<String, Value>,
    pub(crate) children: Vec<SegmentId>,
}

/// One IDoc instance.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) schema: Arc<IDocSchema>,
    header: Header,
    creation: CreationStamp,
    pub(crate) nodes: Vec<Node>,
}

impl Document {
    /// Create an empty document with only a root segment.
    ///
    /// The creation stamp is taken from the local clock. The header's type
    /// fields are seeded from the schema key.
    pub fn new(schema: Arc<IDocSchema>) -> Self {
        let key = schema.key();
        let mut header = Header::default();
        header.set(HeaderField::IdocType, key.idoc_type.clone());
        if !key.idoc_type_extension.is_empty() {
            header.set(HeaderField::IdocTypeExtension, key.idoc_type_extension.clone());
        }
        if !key.system_release.is_empty() {
            header.set(HeaderField::IdocSapRelease, key.system_release.clone());
        }

        let root = Node {
            meta: Arc::clone(schema.root()),
            parent: None,
            level: 0,
            fields: IndexMap::new(),
            children: Vec::new(),
        };

        Self {
            schema,
            header,
            creation: CreationStamp::now(),
            nodes: vec![root],
        }
    }

    pub fn schema(&self) -> &Arc<IDocSchema> {
        &self.schema
    }

    pub fn key(&self) -> &IDocTypeKey {
        self.schema.key()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// When this object was constructed. Never restored by decoding.
    pub fn creation(&self) -> CreationStamp {
        self.creation
    }

    pub fn root(&self) -> SegmentRef<'_> {
        SegmentRef::new(self, SegmentId::ROOT)
    }

    pub fn root_mut(&mut self) -> SegmentMut<'_> {
        SegmentMut::new(self, SegmentId::ROOT)
    }

    /// Borrow a segment by id, if it belongs to this document.
    pub fn segment(&self, id: SegmentId) -> Option<SegmentRef<'_>> {
        (id.index() < self.nodes.len()).then(|| SegmentRef::new(self, id))
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> Option<SegmentMut<'_>> {
        if id.index() < self.nodes.len() {
            Some(SegmentMut::new(self, id))
        } else {
            None
        }
    }

    /// Number of segments, root included.
    pub fn segment_count(&self) -> usize {
        self.nodes.len()
    }

    /// All segments in depth-first pre-order, root first.
    pub fn segments(&self) -> Vec<SegmentRef<'_>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![SegmentId::ROOT];
        while let Some(id) = stack.pop() {
            out.push(SegmentRef::new(self, id));
            stack.extend(self.nodes[id.index()].children.iter().rev().copied());
        }
        out
    }
}

/// An ordered batch of documents of one IDoc type.
#[derive(Debug, Clone)]
pub struct DocumentList {
    schema: Arc<IDocSchema>,
    documents: Vec<Document>,
}

impl DocumentList {
    pub fn new(schema: Arc<IDocSchema>) -> Self {
        Self {
            schema,
            documents: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<IDocSchema> {
        &self.schema
    }

    pub fn key(&self) -> &IDocTypeKey {
        self.schema.key()
    }

    /// Append a new empty document and return it.
    pub fn add(&mut self) -> &mut Document {
        self.documents.push(Document::new(Arc::clone(&self.schema)));
        let last = self.documents.len() - 1;
        &mut self.documents[last]
    }

    /// Append an existing document of the same IDoc type.
    pub fn push(&mut self, document: Document) -> Result<(), ModelError> {
        if document.key() != self.key() {
            return Err(ModelError::SchemaMismatch {
                expected: self.key().id(),
                actual: document.key().id(),
            });
        }
        self.documents.push(document);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Document> {
        self.documents.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Document> {
        self.documents.iter_mut()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl<'a> IntoIterator for &'a DocumentList {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizdoc_registry::Registry;

    const YAML: &str = r#"
idocs:
  - key: { repository: R, idoc_type: ORDERS, idoc_type_extension: ZEXT, system_release: "740" }
    root: [ { type: HEAD, max_occurrence: 2 } ]
    segments:
      - { type: HEAD, children: [ { type: ITEM, max_occurrence: 5 } ] }
      - { type: ITEM }
  - key: { repository: R, idoc_type: OTHER }
"#;

    fn schema(idoc_type: &str) -> Arc<IDocSchema> {
        let registry = Registry::from_yaml_str(YAML).unwrap();
        let key = registry
            .idoc_keys()
            .find(|k| k.idoc_type == idoc_type)
            .unwrap()
            .clone();
        registry.idoc(&key).unwrap()
    }

    #[test]
    fn new_document_seeds_header_and_root() {
        let doc = Document::new(schema("ORDERS"));
        assert_eq!(doc.header().get(HeaderField::IdocType), Some("ORDERS"));
        assert_eq!(doc.header().get(HeaderField::IdocTypeExtension), Some("ZEXT"));
        assert_eq!(doc.header().get(HeaderField::IdocSapRelease), Some("740"));
        let root = doc.root();
        assert!(root.is_root());
        assert_eq!(root.hierarchy_level(), 0);
        assert_eq!(root.field_count(), 0);
        assert!(root.parent().is_none());
        assert_eq!(doc.segment_count(), 1);
    }

    #[test]
    fn segments_are_depth_first() {
        let mut doc = Document::new(schema("ORDERS"));
        {
            let mut root = doc.root_mut();
            let mut head = root.add_child("HEAD").unwrap();
            head.add_child("ITEM").unwrap();
            head.add_child("ITEM").unwrap();
        }
        doc.root_mut().add_child("HEAD").unwrap();
        let types: Vec<&str> = doc.segments().iter().map(|s| s.segment_type()).collect();
        assert_eq!(types, vec!["ROOT", "HEAD", "ITEM", "ITEM", "HEAD"]);
    }

    #[test]
    fn list_add_appends_in_order() {
        let mut list = DocumentList::new(schema("ORDERS"));
        list.add().header_mut().set(HeaderField::IdocNumber, "1");
        list.add().header_mut().set(HeaderField::IdocNumber, "2");
        let numbers: Vec<_> = list
            .iter()
            .map(|d| d.header().get(HeaderField::IdocNumber))
            .collect();
        assert_eq!(numbers, vec![Some("1"), Some("2")]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn list_rejects_foreign_document() {
        let mut list = DocumentList::new(schema("ORDERS"));
        let other = Document::new(schema("OTHER"));
        assert!(matches!(
            list.push(other),
            Err(ModelError::SchemaMismatch { .. })
        ));
        assert!(list.push(Document::new(schema("ORDERS"))).is_ok());
    }
}
