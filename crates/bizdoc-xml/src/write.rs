//! # Encoder
//!
//! Segment and member elements are qualified with the message prefix and
//! carry their set fields as attributes in declaration order. Containment
//! wrappers (`rootSegment`, `segmentChildren`, `document`, `row`) are
//! unqualified. Every element records a `parent` path so the tree can be
//! read back without a schema:
//!
//! ```text
//! //@rootSegment
//! //@rootSegment/@segmentChildren/@LEVEL1.0
//! //@rootSegment/@segmentChildren/@LEVEL1.0/@segmentChildren/@LEVEL2.0
//! ```

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use bizdoc_core::{coerce, name, Value};
use bizdoc_model::{
    Document, DocumentList, SegmentRef, Structure, CREATION_DATE, CREATION_TIME,
};
use bizdoc_registry::{FieldMeta, MemberMeta};

use crate::codec::XmlCodec;
use crate::error::CodecError;
use crate::options::{message_prefix, IDOC_PREFIX, RFC_PREFIX};

pub(crate) const PARENT: &str = "parent";
pub(crate) const DOCUMENT: &str = "document";
pub(crate) const ROOT_SEGMENT: &str = "rootSegment";
pub(crate) const SEGMENT_CHILDREN: &str = "segmentChildren";
pub(crate) const ROW: &str = "row";
pub(crate) const DOCUMENT_ELEMENT: &str = "Document";
pub(crate) const DOCUMENT_LIST_ELEMENT: &str = "DocumentList";

/// Path of a feature below `parent`; the document itself is `/`.
pub(crate) fn child_path(parent: &str, feature: &str) -> String {
    if parent == "/" {
        format!("//@{feature}")
    } else {
        format!("{parent}/@{feature}")
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for bizdoc_model::Document {}
    impl Sealed for bizdoc_model::DocumentList {}
    impl Sealed for bizdoc_model::Structure {}
}

/// A model value the codec can encode: [`Document`], [`DocumentList`] or
/// [`Structure`].
pub trait XmlModel: private::Sealed {
    #[doc(hidden)]
    fn write_xml(&self, codec: &XmlCodec, out: &mut Writer<Vec<u8>>) -> Result<(), CodecError>;
}

impl XmlModel for Document {
    fn write_xml(&self, codec: &XmlCodec, out: &mut Writer<Vec<u8>>) -> Result<(), CodecError> {
        let mut start = BytesStart::new(format!("{IDOC_PREFIX}:{DOCUMENT_ELEMENT}"));
        declare_idoc_namespaces(codec, self, &mut start);
        DocumentWriter { out, doc: self }.write(start, "/")
    }
}

impl XmlModel for DocumentList {
    fn write_xml(&self, codec: &XmlCodec, out: &mut Writer<Vec<u8>>) -> Result<(), CodecError> {
        let element = format!("{IDOC_PREFIX}:{DOCUMENT_LIST_ELEMENT}");
        let mut start = BytesStart::new(element.as_str());
        let options = codec.options();
        start.push_attribute((
            format!("xmlns:{IDOC_PREFIX}").as_str(),
            options.idoc_namespace().as_str(),
        ));
        start.push_attribute((
            format!("xmlns:{}", message_prefix(&self.key().idoc_type)).as_str(),
            options.message_namespace(self.key()).as_str(),
        ));
        if self.is_empty() {
            return write(out, Event::Empty(start));
        }
        write(out, Event::Start(start))?;
        for (i, doc) in self.iter().enumerate() {
            let path = child_path("/", &format!("{DOCUMENT}.{i}"));
            let mut start = BytesStart::new(DOCUMENT);
            start.push_attribute((PARENT, "/"));
            DocumentWriter { out: &mut *out, doc }.write(start, &path)?;
        }
        write(out, Event::End(BytesEnd::new(element)))
    }
}

impl XmlModel for Structure {
    fn write_xml(&self, codec: &XmlCodec, out: &mut Writer<Vec<u8>>) -> Result<(), CodecError> {
        let function = self.function();
        let options = codec.options();
        let prefix = message_prefix(&function.name);
        let mut start = BytesStart::new(format!("{RFC_PREFIX}:{}", self.name()));
        start.push_attribute((
            format!("xmlns:{RFC_PREFIX}").as_str(),
            options.rfc_namespace().as_str(),
        ));
        start.push_attribute((
            format!("xmlns:{prefix}").as_str(),
            options.function_namespace(&function.name).as_str(),
        ));
        write_structure(out, self, start, "/", &prefix)
    }
}

fn declare_idoc_namespaces(codec: &XmlCodec, doc: &Document, start: &mut BytesStart<'_>) {
    let options = codec.options();
    start.push_attribute((
        format!("xmlns:{IDOC_PREFIX}").as_str(),
        options.idoc_namespace().as_str(),
    ));
    start.push_attribute((
        format!("xmlns:{}", message_prefix(&doc.key().idoc_type)).as_str(),
        options.message_namespace(doc.key()).as_str(),
    ));
}

pub(crate) fn write(out: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), CodecError> {
    out.write_event(event)
        .map_err(|e| CodecError::Write(e.to_string()))
}

pub(crate) fn write_declaration(out: &mut Writer<Vec<u8>>) -> Result<(), CodecError> {
    write(out, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
}

fn push_fields<'f>(
    start: &mut BytesStart<'_>,
    fields: impl Iterator<Item = (&'f FieldMeta, &'f Value)>,
) -> Result<(), CodecError> {
    for (field, value) in fields {
        let wire = coerce::encode(&field.format(), value).map_err(|source| CodecError::Encode {
            field: field.name.clone(),
            source,
        })?;
        start.push_attribute((name::escape_xml(&field.name).as_ref(), wire.as_str()));
    }
    Ok(())
}

struct DocumentWriter<'w, 'd> {
    out: &'w mut Writer<Vec<u8>>,
    doc: &'d Document,
}

impl DocumentWriter<'_, '_> {
    fn write(mut self, mut start: BytesStart<'_>, doc_path: &str) -> Result<(), CodecError> {
        let end = BytesEnd::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
        for (field, value) in self.doc.header().iter() {
            start.push_attribute((field.attribute(), value));
        }
        let creation = self.doc.creation();
        start.push_attribute((CREATION_DATE, creation.date().format("%Y%m%d").to_string().as_str()));
        start.push_attribute((CREATION_TIME, creation.time().format("%H%M%S").to_string().as_str()));
        write(self.out, Event::Start(start))?;

        let root = self.doc.root();
        let root_path = child_path(doc_path, ROOT_SEGMENT);
        let mut root_start = BytesStart::new(ROOT_SEGMENT);
        root_start.push_attribute((PARENT, doc_path));
        root_start.push_attribute((DOCUMENT, doc_path));
        push_fields(&mut root_start, root.fields())?;
        if root.child_count() == 0 {
            write(self.out, Event::Empty(root_start))?;
        } else {
            write(self.out, Event::Start(root_start))?;
            self.write_children(root, &root_path, doc_path)?;
            write(self.out, Event::End(BytesEnd::new(ROOT_SEGMENT)))?;
        }

        write(self.out, Event::End(end))
    }

    fn write_children(
        &mut self,
        segment: SegmentRef<'_>,
        path: &str,
        doc_path: &str,
    ) -> Result<(), CodecError> {
        let mut start = BytesStart::new(SEGMENT_CHILDREN);
        start.push_attribute((PARENT, path));
        write(self.out, Event::Start(start))?;

        let children_path = child_path(path, SEGMENT_CHILDREN);
        let mut seen: Vec<(&str, usize)> = Vec::new();
        for child in segment.children() {
            let segment_type = child.segment_type();
            let index = match seen.iter_mut().find(|(t, _)| *t == segment_type) {
                Some((_, n)) => {
                    *n += 1;
                    *n - 1
                }
                None => {
                    seen.push((segment_type, 1));
                    0
                }
            };
            self.write_segment(child, path, &children_path, index, doc_path)?;
        }

        write(self.out, Event::End(BytesEnd::new(SEGMENT_CHILDREN)))
    }

    fn write_segment(
        &mut self,
        segment: SegmentRef<'_>,
        parent_path: &str,
        children_path: &str,
        index: usize,
        doc_path: &str,
    ) -> Result<(), CodecError> {
        let local = name::escape_xml(segment.segment_type());
        let path = format!("{children_path}/@{local}.{index}");
        let element = format!("{}:{local}", message_prefix(&self.doc.key().idoc_type));

        let mut start = BytesStart::new(element.as_str());
        start.push_attribute((PARENT, parent_path));
        start.push_attribute((DOCUMENT, doc_path));
        push_fields(&mut start, segment.fields())?;

        if segment.child_count() == 0 {
            return write(self.out, Event::Empty(start));
        }
        write(self.out, Event::Start(start))?;
        self.write_children(segment, &path, doc_path)?;
        write(self.out, Event::End(BytesEnd::new(element)))
    }
}

fn write_structure(
    out: &mut Writer<Vec<u8>>,
    structure: &Structure,
    mut start: BytesStart<'_>,
    path: &str,
    prefix: &str,
) -> Result<(), CodecError> {
    let end = BytesEnd::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    push_fields(&mut start, structure.fields())?;

    let nested: Vec<&MemberMeta> = structure
        .meta()
        .members
        .iter()
        .filter(|m| match m {
            MemberMeta::Field(_) => false,
            MemberMeta::Structure { name, .. } => matches!(structure.structure(name), Ok(Some(_))),
            MemberMeta::Table { name, .. } => matches!(structure.table(name), Ok(Some(_))),
        })
        .collect();
    if nested.is_empty() {
        return write(out, Event::Empty(start));
    }
    write(out, Event::Start(start))?;

    for member in nested {
        let local = name::escape_xml(member.name());
        let element = format!("{prefix}:{local}");
        let member_path = child_path(path, &local);
        let mut member_start = BytesStart::new(element.as_str());
        member_start.push_attribute((PARENT, path));
        match member {
            MemberMeta::Field(_) => {}
            MemberMeta::Structure { name, .. } => {
                if let Some(inner) = structure.structure(name)? {
                    write_structure(out, inner, member_start, &member_path, prefix)?;
                }
            }
            MemberMeta::Table { name, .. } => {
                let Some(table) = structure.table(name)? else {
                    continue;
                };
                if table.is_empty() {
                    write(out, Event::Empty(member_start))?;
                    continue;
                }
                write(out, Event::Start(member_start))?;
                for (i, row) in table.rows().iter().enumerate() {
                    let row_path = child_path(&member_path, &format!("{ROW}.{i}"));
                    let mut row_start = BytesStart::new(ROW);
                    row_start.push_attribute((PARENT, member_path.as_str()));
                    write_structure(out, row, row_start, &row_path, prefix)?;
                }
                write(out, Event::End(BytesEnd::new(element)))?;
            }
        }
    }

    write(out, Event::End(end))
}
