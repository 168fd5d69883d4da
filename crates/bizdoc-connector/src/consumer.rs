//! # Consumer Path
//!
//! Builds model objects from native ones by walking the declared metadata:
//! each declared field is read as a wire string and decoded with the same
//! coercion rules the XML codec uses, including its empty-text rule: an
//! empty wire string is an empty text or byte value, and an unset field of
//! any other type. Absent wire strings leave the field unset.

use std::sync::Arc;

use bizdoc_core::{coerce, Value};
use bizdoc_model::{Document, HeaderField, SegmentMut, Structure};
use bizdoc_registry::{FieldMeta, IDocSchema, MemberMeta, REQUEST};

use crate::error::ConnectorError;
use crate::native::{FunctionConnector, NativeDocument, NativeSegment, NativeStructure};
use crate::producer::write_structure;

fn decode_field(field: &FieldMeta, text: &str) -> Result<Option<Value>, ConnectorError> {
    coerce::decode_wire(&field.format(), text).map_err(|source| ConnectorError::Field {
        field: field.name.clone(),
        data_type: field.data_type,
        text: text.to_string(),
        source,
    })
}

/// Build a document of `schema`'s type from a native document.
///
/// The creation stamp is taken at construction; the native creation
/// fields are not read back.
pub fn read_document<D: NativeDocument>(
    schema: Arc<IDocSchema>,
    native: &D,
) -> Result<Document, ConnectorError> {
    let mut document = Document::new(schema);
    for field in HeaderField::all() {
        if let Some(value) = native.header(field.control_name()) {
            document.header_mut().set(*field, value);
        }
    }
    let mut root = document.root_mut();
    read_segment(&mut root, native.root_segment())?;
    Ok(document)
}

fn read_segment<S: NativeSegment>(
    target: &mut SegmentMut<'_>,
    native: &S,
) -> Result<(), ConnectorError> {
    let meta = Arc::clone(target.view().meta());
    for field in &meta.fields {
        if let Some(text) = native.value(&field.name) {
            if let Some(value) = decode_field(field, &text)? {
                target.set(&field.name, value)?;
            }
        }
    }
    for child in (0..native.child_count()).filter_map(|i| native.child(i)) {
        let mut segment = target.add_child(child.segment_type())?;
        read_segment(&mut segment, child)?;
    }
    Ok(())
}

/// Fill `target` from a native structure.
///
/// Every declared table is materialized, empty if the native side has no
/// rows. Nested structures are read only when the native side has them.
pub fn read_structure<S: NativeStructure>(
    target: &mut Structure,
    native: &S,
) -> Result<(), ConnectorError> {
    let meta = Arc::clone(target.meta());
    for member in &meta.members {
        match member {
            MemberMeta::Field(field) => {
                if let Some(text) = native.value(&field.name) {
                    if let Some(value) = decode_field(field, &text)? {
                        target.set(&field.name, value)?;
                    }
                }
            }
            MemberMeta::Structure { name, .. } => {
                if let Some(inner) = native.structure(name) {
                    read_structure(target.structure_mut(name)?, inner)?;
                }
            }
            MemberMeta::Table { name, .. } => {
                let table = target.table_mut(name)?;
                for row in (0..native.row_count(name)).filter_map(|i| native.row(name, i)) {
                    read_structure(table.add(), row)?;
                }
            }
        }
    }
    Ok(())
}

/// Run a function: write the request, execute it, and read the response.
pub fn call_function<C: FunctionConnector>(
    connector: &C,
    request: &Structure,
) -> Result<Structure, ConnectorError> {
    let function = Arc::clone(request.function());
    if request.name() != REQUEST {
        return Err(ConnectorError::NotARequest {
            function: function.name.clone(),
            actual: request.name().to_string(),
        });
    }

    let mut native = connector.create_request(&function.name)?;
    write_structure(request, &mut native)?;
    let native_response = connector.execute(&function.name, native)?;

    let mut response = Structure::response(&function);
    read_structure(&mut response, &native_response)?;
    tracing::debug!(
        function = %function.name,
        values = response.field_count(),
        "function call completed"
    );
    Ok(response)
}
