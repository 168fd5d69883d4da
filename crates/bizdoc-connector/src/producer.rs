//! # Producer Path
//!
//! Walks a populated model in metadata field order, encodes each set value
//! to its wire string, and writes it into a native object. Unset fields are
//! not written.
//!
//! List sends convert every document before submitting any of them, so a
//! single failing field means nothing is sent.

use bizdoc_core::{coerce, Value};
use bizdoc_model::{
    Document, DocumentList, SegmentRef, Structure, CREATION_DATE_CONTROL, CREATION_TIME_CONTROL,
};
use bizdoc_registry::{FieldMeta, MemberMeta};

use crate::error::ConnectorError;
use crate::native::{IDocConnector, NativeDocument, NativeSegment, NativeStructure};
use crate::tid::TransactionId;

pub(crate) fn encode_field(field: &FieldMeta, value: &Value) -> Result<String, ConnectorError> {
    coerce::encode(&field.format(), value).map_err(|source| ConnectorError::Field {
        field: field.name.clone(),
        data_type: field.data_type,
        text: value.to_string(),
        source,
    })
}

/// Copy a document's control record and segment tree into `native`.
pub fn write_document<D: NativeDocument>(
    document: &Document,
    native: &mut D,
) -> Result<(), ConnectorError> {
    for (field, value) in document.header().iter() {
        native.set_header(field.control_name(), value)?;
    }
    let creation = document.creation();
    native.set_header(
        CREATION_DATE_CONTROL,
        &creation.date().format("%Y%m%d").to_string(),
    )?;
    native.set_header(
        CREATION_TIME_CONTROL,
        &creation.time().format("%H%M%S").to_string(),
    )?;
    write_segment(document.root(), native.root_segment_mut())
}

fn write_segment<S: NativeSegment>(
    segment: SegmentRef<'_>,
    native: &mut S,
) -> Result<(), ConnectorError> {
    for (field, value) in segment.fields() {
        native.set_value(&field.name, &encode_field(field, value)?)?;
    }
    for child in segment.children() {
        let native_child = native.add_child(child.segment_type())?;
        write_segment(child, native_child)?;
    }
    Ok(())
}

/// Copy a parameter structure, its nested structures and its table rows
/// into `native`.
pub fn write_structure<S: NativeStructure>(
    structure: &Structure,
    native: &mut S,
) -> Result<(), ConnectorError> {
    for (field, value) in structure.fields() {
        native.set_value(&field.name, &encode_field(field, value)?)?;
    }
    for member in &structure.meta().members {
        match member {
            MemberMeta::Field(_) => {}
            MemberMeta::Structure { name, .. } => {
                if let Some(inner) = structure.structure(name)? {
                    write_structure(inner, native.structure_mut(name)?)?;
                }
            }
            MemberMeta::Table { name, .. } => {
                if let Some(table) = structure.table(name)? {
                    for row in table.rows() {
                        write_structure(row, native.append_row(name)?)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn to_native<C: IDocConnector>(
    connector: &C,
    document: &Document,
) -> Result<C::Document, ConnectorError> {
    let mut native = connector.create_document(document.key())?;
    write_document(document, &mut native)?;
    Ok(native)
}

fn to_natives<C: IDocConnector>(
    connector: &C,
    list: &DocumentList,
) -> Result<Vec<C::Document>, ConnectorError> {
    list.iter().map(|doc| to_native(connector, doc)).collect()
}

/// Convert and send one document under a fresh transaction identifier.
pub fn send_document<C: IDocConnector>(
    connector: &C,
    document: &Document,
) -> Result<TransactionId, ConnectorError> {
    let native = to_native(connector, document)?;
    let tid = TransactionId::new();
    connector.send(native, &tid)?;
    tracing::info!(
        connector = connector.connector_name(),
        tid = %tid,
        idoc = %document.key(),
        documents = 1,
        "sent IDoc"
    );
    Ok(tid)
}

/// Convert every document, then send them together.
pub fn send_document_list<C: IDocConnector>(
    connector: &C,
    list: &DocumentList,
) -> Result<TransactionId, ConnectorError> {
    let natives = to_natives(connector, list)?;
    let tid = TransactionId::new();
    connector.send_list(natives, &tid)?;
    tracing::info!(
        connector = connector.connector_name(),
        tid = %tid,
        idoc = %list.key(),
        documents = list.len(),
        "sent IDoc list"
    );
    Ok(tid)
}

/// Convert every document, then send them together to `queue`.
pub fn send_document_list_queued<C: IDocConnector>(
    connector: &C,
    list: &DocumentList,
    queue: &str,
) -> Result<TransactionId, ConnectorError> {
    let natives = to_natives(connector, list)?;
    let tid = TransactionId::new();
    connector.send_queued(natives, queue, &tid)?;
    tracing::info!(
        connector = connector.connector_name(),
        tid = %tid,
        idoc = %list.key(),
        documents = list.len(),
        queue,
        "sent queued IDoc list"
    );
    Ok(tid)
}
