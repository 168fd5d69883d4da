//! # Segments
//!
//! Borrowing handles into a [`Document`]'s segment arena. [`SegmentRef`] reads;
//! [`SegmentMut`] mutates and enforces the registry's field types and child
//! occurrence limits on every call.
//!
//! Names may be given in local or `/NS/LOCAL` form. They resolve against the
//! document's own namespace (see [`bizdoc_core::name`]).

use std::sync::Arc;

use indexmap::IndexMap;

use bizdoc_core::coerce;
use bizdoc_core::Value;
use bizdoc_registry::{FieldMeta, SegmentMeta};

use crate::document::{Document, Node};
use crate::error::ModelError;

/// Index of a segment within its document. The root is always [`SegmentId::ROOT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(usize);

impl SegmentId {
    pub const ROOT: SegmentId = SegmentId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Reject a value whose kind does not match the field's declared type.
pub(crate) fn check_kind(field: &FieldMeta, value: &Value) -> Result<(), ModelError> {
    let expected = field.data_type.kind();
    if value.kind() == expected {
        Ok(())
    } else {
        Err(ModelError::TypeMismatch {
            field: field.name.clone(),
            data_type: field.data_type,
            expected,
            actual: value.kind(),
        })
    }
}

/// Decode a wire string for a field. `None` means the field is unset.
pub(crate) fn decode_field(field: &FieldMeta, text: &str) -> Result<Option<Value>, ModelError> {
    coerce::decode_wire(&field.format(), text).map_err(|source| ModelError::Coercion {
        field: field.name.clone(),
        source,
    })
}

fn resolve_field<'m>(
    meta: &'m SegmentMeta,
    namespace: Option<&str>,
    name: &str,
) -> Result<&'m FieldMeta, ModelError> {
    meta.field(name, namespace)
        .ok_or_else(|| ModelError::UnknownField {
            segment: meta.segment_type.clone(),
            field: name.to_string(),
        })
}

// ─── Read handle ────────────────────────────────────────────────────

/// Read-only view of one segment.
#[derive(Debug, Clone, Copy)]
pub struct SegmentRef<'a> {
    doc: &'a Document,
    id: SegmentId,
}

impl<'a> SegmentRef<'a> {
    pub(crate) fn new(doc: &'a Document, id: SegmentId) -> Self {
        Self { doc, id }
    }

    fn node(&self) -> &'a Node {
        &self.doc.nodes[self.id.index()]
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// The owning document.
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn meta(&self) -> &'a Arc<SegmentMeta> {
        &self.node().meta
    }

    /// Declared segment type, exactly as registered.
    pub fn segment_type(&self) -> &'a str {
        &self.node().meta.segment_type
    }

    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    /// 0 for the root, parent level + 1 otherwise.
    pub fn hierarchy_level(&self) -> u32 {
        self.node().level
    }

    pub fn parent(&self) -> Option<SegmentRef<'a>> {
        self.node().parent.map(|id| SegmentRef::new(self.doc, id))
    }

    /// Value of a declared field; `None` when unset.
    ///
    /// # Errors
    ///
    /// `UnknownField` when the segment type declares no such field.
    pub fn get(&self, name: &str) -> Result<Option<&'a Value>, ModelError> {
        let node = self.node();
        let field = resolve_field(&node.meta, self.doc.schema.namespace(), name)?;
        Ok(node.fields.get(&field.name))
    }

    /// Set fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'a FieldMeta, &'a Value)> + 'a {
        let node = self.node();
        node.meta
            .fields
            .iter()
            .filter_map(move |f| node.fields.get(&f.name).map(|v| (f, v)))
    }

    /// Number of set fields.
    pub fn field_count(&self) -> usize {
        self.node().fields.len()
    }

    /// All children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = SegmentRef<'a>> + 'a {
        let doc = self.doc;
        self.node()
            .children
            .iter()
            .map(move |id| SegmentRef::new(doc, *id))
    }

    pub fn child_count(&self) -> usize {
        self.node().children.len()
    }

    pub fn child(&self, index: usize) -> Option<SegmentRef<'a>> {
        self.node()
            .children
            .get(index)
            .map(|id| SegmentRef::new(self.doc, *id))
    }

    /// Children of one type, in insertion order.
    ///
    /// # Errors
    ///
    /// `UnknownChild` when the type is not permitted under this segment.
    pub fn children_of_type(&self, name: &str) -> Result<Vec<SegmentRef<'a>>, ModelError> {
        let meta = self.meta();
        let child = meta
            .child(name, self.doc.schema.namespace())
            .ok_or_else(|| ModelError::UnknownChild {
                parent: meta.segment_type.clone(),
                segment_type: name.to_string(),
            })?;
        Ok(self
            .children()
            .filter(|c| c.segment_type() == child.segment_type)
            .collect())
    }
}

// ─── Write handle ───────────────────────────────────────────────────

/// Mutable view of one segment.
#[derive(Debug)]
pub struct SegmentMut<'a> {
    doc: &'a mut Document,
    id: SegmentId,
}

impl<'a> SegmentMut<'a> {
    pub(crate) fn new(doc: &'a mut Document, id: SegmentId) -> Self {
        Self { doc, id }
    }

    fn node_mut(&mut self) -> &mut Node {
        &mut self.doc.nodes[self.id.index()]
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Reborrow as a read handle.
    pub fn view(&self) -> SegmentRef<'_> {
        SegmentRef::new(self.doc, self.id)
    }

    /// Set a declared field.
    ///
    /// # Errors
    ///
    /// `UnknownField`, or `TypeMismatch` when the value's kind does not
    /// match the declared type.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let value = value.into();
        let meta = Arc::clone(&self.doc.nodes[self.id.index()].meta);
        let field = resolve_field(&meta, self.doc.schema.namespace(), name)?;
        check_kind(field, &value)?;
        self.node_mut().fields.insert(field.name.clone(), value);
        Ok(())
    }

    /// Set a declared field from its wire string.
    ///
    /// # Errors
    ///
    /// `UnknownField`, or `Coercion` when the text is not a valid value of
    /// the declared type. Empty text unsets fields whose type has no empty
    /// value.
    pub fn set_wire(&mut self, name: &str, text: &str) -> Result<(), ModelError> {
        let meta = Arc::clone(&self.doc.nodes[self.id.index()].meta);
        let field = resolve_field(&meta, self.doc.schema.namespace(), name)?;
        match decode_field(field, text)? {
            Some(value) => {
                self.node_mut().fields.insert(field.name.clone(), value);
            }
            None => {
                self.node_mut().fields.shift_remove(&field.name);
            }
        }
        Ok(())
    }

    /// Clear a declared field, returning its previous value.
    pub fn unset(&mut self, name: &str) -> Result<Option<Value>, ModelError> {
        let meta = Arc::clone(&self.doc.nodes[self.id.index()].meta);
        let field = resolve_field(&meta, self.doc.schema.namespace(), name)?;
        Ok(self.node_mut().fields.shift_remove(&field.name))
    }

    /// Append a child of the given type and return it.
    ///
    /// # Errors
    ///
    /// `UnknownChild` when the type is not permitted here, or
    /// `OccurrenceExceeded` when the parent already holds the declared
    /// maximum of that type.
    pub fn add_child(&mut self, name: &str) -> Result<SegmentMut<'_>, ModelError> {
        let schema = Arc::clone(&self.doc.schema);
        let parent = &self.doc.nodes[self.id.index()];
        let parent_meta = Arc::clone(&parent.meta);
        let (child, meta) =
            schema
                .child_of(&parent_meta, name)
                .ok_or_else(|| ModelError::UnknownChild {
                    parent: parent_meta.segment_type.clone(),
                    segment_type: name.to_string(),
                })?;

        let existing = parent
            .children
            .iter()
            .filter(|c| self.doc.nodes[c.index()].meta.segment_type == child.segment_type)
            .count() as u64;
        if existing >= child.max_occurrence {
            return Err(ModelError::OccurrenceExceeded {
                parent: parent_meta.segment_type.clone(),
                segment_type: child.segment_type.clone(),
                max: child.max_occurrence,
            });
        }

        let id = SegmentId(self.doc.nodes.len());
        let level = parent.level + 1;
        self.doc.nodes.push(Node {
            meta: Arc::clone(meta),
            parent: Some(self.id),
            level,
            fields: IndexMap::new(),
            children: Vec::new(),
        });
        self.node_mut().children.push(id);
        Ok(SegmentMut::new(self.doc, id))
    }

    /// Mutable handle to the child at `index`.
    pub fn child_mut(&mut self, index: usize) -> Option<SegmentMut<'_>> {
        let id = *self.doc.nodes[self.id.index()].children.get(index)?;
        Some(SegmentMut::new(self.doc, id))
    }
}
