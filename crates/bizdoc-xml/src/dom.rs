//! Namespace-resolved element tree built from a fresh parser per call.
//!
//! Character data is not part of the format: any non-whitespace text is
//! rejected. Comments, processing instructions and the declaration are
//! skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::CodecError;

#[derive(Debug)]
pub(crate) struct Attribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Debug)]
pub(crate) struct Element {
    pub namespace: Option<String>,
    pub name: String,
    /// `(prefix, uri)` declarations made on this element.
    pub declarations: Vec<(String, String)>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn is(&self, namespace: Option<&str>, name: &str) -> bool {
        self.namespace.as_deref() == namespace && self.name == name
    }

    /// `{uri}name` form for error messages.
    pub fn display_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{ns}}}{}", self.name),
            None => self.name.clone(),
        }
    }
}

pub(crate) fn malformed(e: impl std::fmt::Display) -> CodecError {
    CodecError::Malformed(e.to_string())
}

fn utf8(bytes: &[u8]) -> Result<String, CodecError> {
    std::str::from_utf8(bytes).map(str::to_string).map_err(malformed)
}

fn namespace(resolved: ResolveResult<'_>) -> Result<Option<String>, CodecError> {
    match resolved {
        ResolveResult::Bound(ns) => utf8(ns.as_ref()).map(Some),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(malformed(format!(
            "undeclared namespace prefix {:?}",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn element(
    reader: &NsReader<&[u8]>,
    ns: Option<String>,
    start: &BytesStart<'_>,
) -> Result<Element, CodecError> {
    let mut declarations = Vec::new();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        let value = attr.unescape_value().map_err(malformed)?.into_owned();
        let key = attr.key.as_ref();
        if key == b"xmlns" {
            declarations.push((String::new(), value));
        } else if let Some(prefix) = key.strip_prefix(b"xmlns:") {
            declarations.push((utf8(prefix)?, value));
        } else {
            let (resolved, local) = reader.resolve_attribute(attr.key);
            attributes.push(Attribute {
                namespace: namespace(resolved)?,
                name: utf8(local.as_ref())?,
                value,
            });
        }
    }
    Ok(Element {
        namespace: ns,
        name: utf8(start.local_name().as_ref())?,
        declarations,
        attributes,
        children: Vec::new(),
    })
}

fn close(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), CodecError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => {
            return Err(malformed(format!(
                "second root element {}",
                element.display_name()
            )))
        }
        None => *root = Some(element),
    }
    Ok(())
}

pub(crate) fn parse(text: &str) -> Result<Element, CodecError> {
    let mut reader = NsReader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    loop {
        let (resolved, event) = reader.read_resolved_event().map_err(malformed)?;
        let ns = namespace(resolved)?;
        match event {
            Event::Start(start) => {
                let el = element(&reader, ns, &start)?;
                stack.push(el);
            }
            Event::Empty(start) => {
                let el = element(&reader, ns, &start)?;
                close(el, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| malformed("unbalanced end tag"))?;
                close(el, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(malformed)?;
                if !text.trim().is_empty() {
                    return Err(malformed(format!("unexpected character data {text:?}")));
                }
            }
            Event::CData(_) => return Err(malformed("unexpected CDATA section")),
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element {}", open.display_name())));
    }
    root.ok_or_else(|| malformed("no root element"))
}
