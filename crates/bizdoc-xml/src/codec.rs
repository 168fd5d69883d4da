//! # XML Codec
//!
//! [`XmlCodec`] pairs a shared registry with [`CodecOptions`]. It holds no
//! parser state: every decode builds its own reader, so one codec may be
//! used from many threads at once.
//!
//! Two decode surfaces are offered. `decode_*` returns the full
//! [`CodecError`]. `to_*` logs the failure and returns `None`, so callers
//! that only need "a model or nothing" never see a partially built object.

use std::borrow::Cow;
use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use quick_xml::Writer;

use bizdoc_model::{Document, DocumentList, Structure};
use bizdoc_registry::Registry;

use crate::dom::{self, malformed};
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::write::{write_declaration, XmlModel};

const BOM: char = '\u{feff}';

/// Input accepted by the decoders.
pub enum XmlSource<'a> {
    /// UTF-8 text.
    Text(&'a str),
    /// Raw bytes, which must be UTF-8.
    Bytes(&'a [u8]),
    /// A stream read to the end before parsing.
    Reader(Box<dyn Read + 'a>),
}

impl<'a> XmlSource<'a> {
    /// Wrap any reader.
    pub fn reader(reader: impl Read + 'a) -> Self {
        Self::Reader(Box::new(reader))
    }

    fn into_text(self) -> Result<Cow<'a, str>, CodecError> {
        let text = match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Bytes(bytes) => Cow::Borrowed(std::str::from_utf8(bytes).map_err(malformed)?),
            Self::Reader(mut reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                Cow::Owned(String::from_utf8(bytes).map_err(malformed)?)
            }
        };
        Ok(match text {
            Cow::Borrowed(t) => Cow::Borrowed(t.strip_prefix(BOM).unwrap_or(t)),
            Cow::Owned(t) => match t.strip_prefix(BOM) {
                Some(rest) => Cow::Owned(rest.to_string()),
                None => Cow::Owned(t),
            },
        })
    }
}

impl<'a> From<&'a str> for XmlSource<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for XmlSource<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a [u8]> for XmlSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for XmlSource<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Stateless XML encoder/decoder bound to a registry.
#[derive(Debug, Clone)]
pub struct XmlCodec {
    registry: Arc<Registry>,
    options: CodecOptions,
}

impl XmlCodec {
    /// Codec with default options.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_options(registry, CodecOptions::default())
    }

    pub fn with_options(registry: Arc<Registry>, options: CodecOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    // -- Encoding --------------------------------------------------------

    /// Encode to UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// `Encode` when a set value cannot be represented in its declared
    /// length or range.
    pub fn to_vec<M: XmlModel>(&self, model: &M) -> Result<Vec<u8>, CodecError> {
        let mut out = if self.options.indent > 0 {
            Writer::new_with_indent(Vec::new(), b' ', self.options.indent)
        } else {
            Writer::new(Vec::new())
        };
        if self.options.xml_declaration {
            write_declaration(&mut out)?;
        }
        model.write_xml(self, &mut out)?;
        Ok(out.into_inner())
    }

    pub fn to_string<M: XmlModel>(&self, model: &M) -> Result<String, CodecError> {
        String::from_utf8(self.to_vec(model)?).map_err(|e| CodecError::Write(e.to_string()))
    }

    pub fn to_writer<M: XmlModel, W: Write>(&self, model: &M, mut writer: W) -> Result<(), CodecError> {
        writer.write_all(&self.to_vec(model)?)?;
        Ok(())
    }

    /// Encode into an in-memory reader positioned at the start.
    pub fn to_reader<M: XmlModel>(&self, model: &M) -> Result<Cursor<Vec<u8>>, CodecError> {
        Ok(Cursor::new(self.to_vec(model)?))
    }

    // -- Decoding --------------------------------------------------------

    /// Decode one `idoc:Document`.
    pub fn decode_document<'s>(&self, source: impl Into<XmlSource<'s>>) -> Result<Document, CodecError> {
        let text = source.into().into_text()?;
        let doc = self.read_document(&dom::parse(&text)?)?;
        tracing::debug!(
            idoc = %doc.key(),
            segments = doc.segment_count(),
            "decoded document from XML"
        );
        Ok(doc)
    }

    /// Decode one `idoc:DocumentList`.
    pub fn decode_document_list<'s>(
        &self,
        source: impl Into<XmlSource<'s>>,
    ) -> Result<DocumentList, CodecError> {
        let text = source.into().into_text()?;
        let list = self.read_document_list(&dom::parse(&text)?)?;
        tracing::debug!(
            idoc = %list.key(),
            documents = list.len(),
            segments = list.iter().map(Document::segment_count).sum::<usize>(),
            "decoded document list from XML"
        );
        Ok(list)
    }

    /// Decode one `rfc:Request` or `rfc:Response`.
    pub fn decode_structure<'s>(&self, source: impl Into<XmlSource<'s>>) -> Result<Structure, CodecError> {
        let text = source.into().into_text()?;
        let structure = self.read_structure(&dom::parse(&text)?)?;
        tracing::debug!(
            function = %structure.function().name,
            structure = structure.name(),
            "decoded structure from XML"
        );
        Ok(structure)
    }

    /// Decode a document, or `None` on any failure.
    pub fn to_document<'s>(&self, source: impl Into<XmlSource<'s>>) -> Option<Document> {
        match self.decode_document(source) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(error = %e, "XML to document conversion failed");
                None
            }
        }
    }

    /// Decode a document list, or `None` on any failure.
    pub fn to_document_list<'s>(&self, source: impl Into<XmlSource<'s>>) -> Option<DocumentList> {
        match self.decode_document_list(source) {
            Ok(list) => Some(list),
            Err(e) => {
                tracing::warn!(error = %e, "XML to document list conversion failed");
                None
            }
        }
    }

    /// Decode a request or response structure, or `None` on any failure.
    pub fn to_structure<'s>(&self, source: impl Into<XmlSource<'s>>) -> Option<Structure> {
        match self.decode_structure(source) {
            Ok(structure) => Some(structure),
            Err(e) => {
                tracing::warn!(error = %e, "XML to structure conversion failed");
                None
            }
        }
    }
}
