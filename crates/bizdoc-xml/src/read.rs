//! # Decoder
//!
//! Walks the parsed element tree against registry metadata. The message
//! type comes from the per-message namespace declared on the root element.
//! Segment and member elements may be qualified with that namespace or left
//! unqualified. Any other namespace is a structural error.
//!
//! `parent`, `document` and the creation attributes are advisory and
//! skipped. Every other attribute must name a header field or a declared
//! field.

use std::sync::Arc;

use bizdoc_core::name;
use bizdoc_model::{
    Document, DocumentList, HeaderField, ModelError, SegmentMut, Structure, CREATION_DATE,
    CREATION_TIME,
};
use bizdoc_registry::{FunctionMeta, IDocSchema, MemberMeta, REQUEST, RESPONSE};

use crate::codec::XmlCodec;
use crate::dom::{Attribute, Element};
use crate::error::CodecError;
use crate::write::{
    DOCUMENT, DOCUMENT_ELEMENT, DOCUMENT_LIST_ELEMENT, PARENT, ROOT_SEGMENT, ROW,
    SEGMENT_CHILDREN,
};

fn unexpected(expected: impl Into<String>, found: &Element) -> CodecError {
    CodecError::UnexpectedElement {
        expected: expected.into(),
        found: found.display_name(),
    }
}

fn unexpected_attribute(element: &Element, attr: &Attribute) -> CodecError {
    CodecError::UnexpectedAttribute {
        element: element.display_name(),
        attribute: match &attr.namespace {
            Some(ns) => format!("{{{ns}}}{}", attr.name),
            None => attr.name.clone(),
        },
    }
}

fn is_advisory(attr: &Attribute) -> bool {
    attr.name == PARENT || attr.name == DOCUMENT
}

/// Elements in the message namespace or in no namespace.
fn in_message_namespace(element: &Element, namespace: &str) -> bool {
    element.namespace.as_deref().map_or(true, |ns| ns == namespace)
}

/// Feed every non-advisory attribute through `set` by unescaped name.
fn read_fields(
    element: &Element,
    mut set: impl FnMut(&str, &str) -> Result<(), ModelError>,
) -> Result<(), CodecError> {
    for attr in &element.attributes {
        if attr.namespace.is_some() {
            return Err(unexpected_attribute(element, attr));
        }
        if is_advisory(attr) {
            continue;
        }
        let field = name::unescape_xml(&attr.name);
        set(&field, &attr.value)?;
    }
    Ok(())
}

/// Wrapper elements carry nothing but advisory attributes.
fn advisory_only(element: &Element) -> Result<(), CodecError> {
    match element
        .attributes
        .iter()
        .find(|a| a.namespace.is_some() || !is_advisory(a))
    {
        Some(attr) => Err(unexpected_attribute(element, attr)),
        None => Ok(()),
    }
}

impl XmlCodec {
    fn expect_root(&self, root: &Element, namespace: &str, names: &[&str]) -> Result<(), CodecError> {
        if root.namespace.as_deref() == Some(namespace) && names.contains(&root.name.as_str()) {
            return Ok(());
        }
        let expected = names
            .iter()
            .map(|n| format!("{{{namespace}}}{n}"))
            .collect::<Vec<_>>()
            .join(" or ");
        Err(unexpected(expected, root))
    }

    fn message_schema(&self, root: &Element) -> Result<(Arc<IDocSchema>, String), CodecError> {
        for (_, uri) in &root.declarations {
            if let Some(id) = self.options().message_id(uri) {
                return Ok((self.registry().idoc_by_id(id)?, uri.clone()));
            }
        }
        Err(CodecError::MissingNamespace {
            kind: "idoc",
            base: self.options().namespace_base.clone(),
        })
    }

    fn message_function(&self, root: &Element) -> Result<(Arc<FunctionMeta>, String), CodecError> {
        for (_, uri) in &root.declarations {
            if let Some(function) = self.options().function_name(uri) {
                return Ok((self.registry().function(&function)?, uri.clone()));
            }
        }
        Err(CodecError::MissingNamespace {
            kind: "rfc",
            base: self.options().namespace_base.clone(),
        })
    }

    pub(crate) fn read_document(&self, root: &Element) -> Result<Document, CodecError> {
        self.expect_root(root, &self.options().idoc_namespace(), &[DOCUMENT_ELEMENT])?;
        let (schema, namespace) = self.message_schema(root)?;
        read_document(root, schema, &namespace)
    }

    pub(crate) fn read_document_list(&self, root: &Element) -> Result<DocumentList, CodecError> {
        self.expect_root(root, &self.options().idoc_namespace(), &[DOCUMENT_LIST_ELEMENT])?;
        advisory_only(root)?;
        let (schema, namespace) = self.message_schema(root)?;
        let mut list = DocumentList::new(Arc::clone(&schema));
        for element in &root.children {
            if !element.is(None, DOCUMENT) {
                return Err(unexpected(DOCUMENT, element));
            }
            list.push(read_document(element, Arc::clone(&schema), &namespace)?)?;
        }
        Ok(list)
    }

    pub(crate) fn read_structure(&self, root: &Element) -> Result<Structure, CodecError> {
        self.expect_root(root, &self.options().rfc_namespace(), &[REQUEST, RESPONSE])?;
        let (function, namespace) = self.message_function(root)?;
        let mut structure = if root.name == REQUEST {
            Structure::request(&function)
        } else {
            Structure::response(&function)
        };
        read_structure(&mut structure, root, &namespace)?;
        Ok(structure)
    }
}

fn read_document(
    element: &Element,
    schema: Arc<IDocSchema>,
    namespace: &str,
) -> Result<Document, CodecError> {
    let mut doc = Document::new(schema);
    for attr in &element.attributes {
        if attr.namespace.is_some() {
            return Err(unexpected_attribute(element, attr));
        }
        if is_advisory(attr) || attr.name == CREATION_DATE || attr.name == CREATION_TIME {
            continue;
        }
        let field = HeaderField::from_attribute(&attr.name)
            .ok_or_else(|| unexpected_attribute(element, attr))?;
        doc.header_mut().set(field, attr.value.clone());
    }

    let root_element = match element.children.as_slice() {
        [root] if root.is(None, ROOT_SEGMENT) => root,
        [] => {
            return Err(CodecError::UnexpectedElement {
                expected: ROOT_SEGMENT.to_string(),
                found: format!("end of {}", element.display_name()),
            })
        }
        [other] => return Err(unexpected(ROOT_SEGMENT, other)),
        [_, extra, ..] => return Err(unexpected(format!("end of {}", element.display_name()), extra)),
    };

    let mut root = doc.root_mut();
    read_fields(root_element, |name, text| root.set_wire(name, text))?;
    read_children(&mut root, root_element, namespace)?;
    Ok(doc)
}

fn read_children(
    parent: &mut SegmentMut<'_>,
    element: &Element,
    namespace: &str,
) -> Result<(), CodecError> {
    for wrapper in &element.children {
        if !wrapper.is(None, SEGMENT_CHILDREN) {
            return Err(unexpected(SEGMENT_CHILDREN, wrapper));
        }
        advisory_only(wrapper)?;
        for child_element in &wrapper.children {
            if !in_message_namespace(child_element, namespace) {
                return Err(unexpected(format!("segment in {namespace}"), child_element));
            }
            let mut child = parent.add_child(&name::unescape_xml(&child_element.name))?;
            read_fields(child_element, |name, text| child.set_wire(name, text))?;
            read_children(&mut child, child_element, namespace)?;
        }
    }
    Ok(())
}

fn read_structure(
    structure: &mut Structure,
    element: &Element,
    namespace: &str,
) -> Result<(), CodecError> {
    read_fields(element, |name, text| structure.set_wire(name, text))?;

    for child in &element.children {
        if !in_message_namespace(child, namespace) {
            return Err(unexpected(format!("member in {namespace}"), child));
        }
        let member = name::unescape_xml(&child.name);
        let is_table = match structure.meta().member(&member, structure.namespace()) {
            Some(MemberMeta::Structure { .. }) => false,
            Some(MemberMeta::Table { .. }) => true,
            _ => {
                return Err(unexpected(
                    format!("structure or table member of {}", structure.name()),
                    child,
                ))
            }
        };

        if !is_table {
            read_structure(structure.structure_mut(&member)?, child, namespace)?;
            continue;
        }

        advisory_only(child)?;
        let table = structure.table_mut(&member)?;
        for row in &child.children {
            if !row.is(None, ROW) {
                return Err(unexpected(ROW, row));
            }
            read_structure(table.add(), row, namespace)?;
        }
    }
    Ok(())
}
