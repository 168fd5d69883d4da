//! # Compiled Metadata
//!
//! The read-only metadata graph produced by [`Registry`](crate::Registry)
//! compilation. Every lookup by name goes through
//! [`bizdoc_core::name::resolve`] so that local and qualified forms resolve
//! the same way everywhere.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use bizdoc_core::name;
use bizdoc_core::{DataType, FieldFormat};

use crate::key::IDocTypeKey;

/// Segment type of the synthetic root segment of every IDoc.
pub const ROOT_SEGMENT_TYPE: &str = "ROOT";

/// Name of a function's request parameter structure.
pub const REQUEST: &str = "Request";

/// Name of a function's response parameter structure.
pub const RESPONSE: &str = "Response";

// ─── Fields ─────────────────────────────────────────────────────────

/// Declared shape of one scalar field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Field name, local or `/NS/LOCAL`.
    pub name: String,
    /// Primitive type tag.
    #[serde(rename = "type")]
    pub data_type: DataType,
    /// External (wire) length in characters; 0 when unbounded.
    #[serde(default)]
    pub length: usize,
    /// Internal length in bytes.
    #[serde(default)]
    pub byte_length: usize,
    /// Byte offset within the segment's fixed-width record.
    #[serde(default)]
    pub offset: usize,
    /// Output length for display.
    #[serde(default)]
    pub output_length: usize,
    /// Fractional digits for decimal types.
    #[serde(default)]
    pub decimals: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain_name: String,
    #[serde(default)]
    pub check_table: String,
    /// Allowed values. Empty means unrestricted.
    #[serde(default)]
    pub values: Vec<String>,
    /// Whether the value is an ISO code.
    #[serde(default)]
    pub iso_code: bool,
}

impl FieldMeta {
    /// A field with the given name and type and no further constraints.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            length: 0,
            byte_length: 0,
            offset: 0,
            output_length: 0,
            decimals: 0,
            description: String::new(),
            domain_name: String::new(),
            check_table: String::new(),
            values: Vec::new(),
            iso_code: false,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// The coercion format for this field.
    pub fn format(&self) -> FieldFormat {
        FieldFormat::new(self.data_type)
            .with_length(self.length)
            .with_decimals(self.decimals)
    }

    /// Whether `wire` is permitted by the value enumeration.
    pub fn allows(&self, wire: &str) -> bool {
        self.values.is_empty() || self.values.iter().any(|v| v == wire)
    }
}

fn resolve_field<'a>(
    fields: &'a [FieldMeta],
    requested: &str,
    own_namespace: Option<&str>,
) -> Option<&'a FieldMeta> {
    let declared = name::resolve(fields.iter().map(|f| f.name.as_str()), requested, own_namespace)?;
    fields.iter().find(|f| f.name == declared)
}

// ─── Segments ───────────────────────────────────────────────────────

/// Declared occurrence of a child segment type under a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildMeta {
    /// Globally unique segment key, `<message-type-id>:<segment_type>`.
    pub key: String,
    pub segment_type: String,
    pub description: String,
    /// Level of the child segment; the root is level 0. A segment type
    /// occurs at one level per IDoc type.
    pub hierarchy_level: u32,
    pub min_occurrence: u64,
    pub max_occurrence: u64,
    pub mandatory: bool,
    pub qualified: bool,
    pub locked: bool,
}

/// Declared shape of one segment type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentMeta {
    pub key: String,
    pub segment_type: String,
    pub description: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldMeta>,
    /// Permitted child types in declaration order.
    pub children: Vec<ChildMeta>,
}

impl SegmentMeta {
    pub fn is_root(&self) -> bool {
        self.segment_type == ROOT_SEGMENT_TYPE
    }

    /// Resolve a field by local or qualified name.
    pub fn field(&self, requested: &str, own_namespace: Option<&str>) -> Option<&FieldMeta> {
        resolve_field(&self.fields, requested, own_namespace)
    }

    /// Resolve a permitted child type by local or qualified name.
    pub fn child(&self, requested: &str, own_namespace: Option<&str>) -> Option<&ChildMeta> {
        let declared = name::resolve(
            self.children.iter().map(|c| c.segment_type.as_str()),
            requested,
            own_namespace,
        )?;
        self.children.iter().find(|c| c.segment_type == declared)
    }
}

/// Compiled metadata of one IDoc type.
#[derive(Debug, Clone)]
pub struct IDocSchema {
    pub(crate) key: IDocTypeKey,
    pub(crate) namespace: Option<String>,
    pub(crate) description: String,
    pub(crate) root: Arc<SegmentMeta>,
    pub(crate) segments: HashMap<String, Arc<SegmentMeta>>,
}

impl IDocSchema {
    pub fn key(&self) -> &IDocTypeKey {
        &self.key
    }

    /// The message's own namespace, used to resolve local names.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn root(&self) -> &Arc<SegmentMeta> {
        &self.root
    }

    /// Look up a segment definition by its segment key.
    pub fn segment(&self, key: &str) -> Option<&Arc<SegmentMeta>> {
        self.segments.get(key)
    }

    /// Look up a segment definition by (exact) segment type.
    pub fn segment_by_type(&self, segment_type: &str) -> Option<&Arc<SegmentMeta>> {
        self.segments.get(&self.key.segment_key(segment_type))
    }

    /// Resolve a child type of `parent` and return its descriptor and definition.
    pub fn child_of<'a>(
        &'a self,
        parent: &'a SegmentMeta,
        requested: &str,
    ) -> Option<(&'a ChildMeta, &'a Arc<SegmentMeta>)> {
        let child = parent.child(requested, self.namespace())?;
        let meta = self.segments.get(&child.key)?;
        Some((child, meta))
    }

    /// Number of distinct segment types, root included.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// All segment definitions, in no particular order.
    pub fn segments(&self) -> impl Iterator<Item = &Arc<SegmentMeta>> {
        self.segments.values()
    }
}

// ─── Structures ─────────────────────────────────────────────────────

/// One member of a structure: a scalar, a nested structure, or a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberMeta {
    Field(FieldMeta),
    Structure {
        name: String,
        description: String,
        structure: Arc<StructureMeta>,
    },
    Table {
        name: String,
        description: String,
        row: Arc<StructureMeta>,
    },
}

impl MemberMeta {
    pub fn name(&self) -> &str {
        match self {
            Self::Field(f) => &f.name,
            Self::Structure { name, .. } | Self::Table { name, .. } => name,
        }
    }

    pub fn as_field(&self) -> Option<&FieldMeta> {
        match self {
            Self::Field(f) => Some(f),
            _ => None,
        }
    }
}

/// Declared shape of a structure or table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureMeta {
    pub name: String,
    pub description: String,
    /// Members in declaration order.
    pub members: Vec<MemberMeta>,
}

impl StructureMeta {
    /// Resolve a member by local or qualified name.
    pub fn member(&self, requested: &str, own_namespace: Option<&str>) -> Option<&MemberMeta> {
        let declared = name::resolve(
            self.members.iter().map(MemberMeta::name),
            requested,
            own_namespace,
        )?;
        self.members.iter().find(|m| m.name() == declared)
    }

    /// Scalar fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldMeta> {
        self.members.iter().filter_map(MemberMeta::as_field)
    }
}

// ─── Functions ──────────────────────────────────────────────────────

/// Compiled parameter lists of one function module.
#[derive(Debug, Clone)]
pub struct FunctionMeta {
    pub name: String,
    pub namespace: Option<String>,
    pub description: String,
    /// Import, changing, and table parameters.
    pub request: Arc<StructureMeta>,
    /// Export, changing, and table parameters.
    pub response: Arc<StructureMeta>,
}

impl FunctionMeta {
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}
