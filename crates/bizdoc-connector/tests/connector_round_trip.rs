//! Drive the producer and consumer paths through the in-memory connector.

use std::str::FromStr;
use std::sync::Arc;

use bizdoc_connector::{
    call_function, read_document, send_document, send_document_list,
    send_document_list_queued, write_structure, ConnectorError, FunctionConnector,
    MemoryConnector, MemoryDocument, MemoryStructure, NativeDocument, NativeError,
    NativeSegment, NativeStructure, TransactionId,
};
use bizdoc_core::{BigDecimal, DataType, Value};
use bizdoc_model::{
    Document, DocumentList, HeaderField, ModelError, SegmentMut, SegmentRef, Structure,
    CREATION_DATE_CONTROL, CREATION_TIME_CONTROL,
};
use bizdoc_registry::{IDocTypeKey, Registry};
use bizdoc_xml::XmlCodec;
use chrono::{NaiveDate, NaiveTime};

const REGISTRY: &str = include_str!("../../bizdoc-registry/tests/fixtures/test_registry.yaml");
const DOCUMENT_XML: &str = include_str!("../../bizdoc-xml/tests/fixtures/test_document.xml");

fn registry() -> Arc<Registry> {
    Arc::new(Registry::from_yaml_str(REGISTRY).unwrap())
}

fn test_key() -> IDocTypeKey {
    IDocTypeKey::new(
        "TEST_REPOSITORY",
        "TEST_IDOC_TYPE",
        "TEST_IDOC_TYPE_EXTENSION",
        "TEST_SYSTEM_RELEASE",
        "TEST_APPLICATION_RELEASE",
    )
}

fn populate(segment: &mut SegmentMut<'_>) -> Result<(), ModelError> {
    segment.set("CHAR_FIELD", "1234ABCDEF")?;
    segment.set("QUAN_FIELD", BigDecimal::from_str("123.456").unwrap())?;
    segment.set("NUMC_FIELD", "0123456789")?;
    segment.set("DATS_FIELD", NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())?;
    segment.set("TIMS_FIELD", NaiveTime::from_hms_opt(10, 15, 30).unwrap())?;
    segment.set("INT1_FIELD", 255)?;
    segment.set("INT2_FIELD", -32768)?;
    segment.set("INT4_FIELD", 2_147_483_647)?;
    segment.set("DEC_FIELD", BigDecimal::from_str("-0.00001").unwrap())?;
    segment.set("RAW_FIELD", vec![0xCAu8, 0xFE])?;
    segment.set("STRING_FIELD", "free text")?;
    Ok(())
}

fn three_level_document(registry: &Registry) -> Document {
    let mut doc = Document::new(registry.idoc(&test_key()).unwrap());
    doc.header_mut().set(HeaderField::ArchiveKey, "ARCHIVE");
    doc.header_mut().set(HeaderField::SenderPartnerNumber, "SENDER");
    {
        let mut root = doc.root_mut();
        let mut level1 = root.add_child("LEVEL1").unwrap();
        populate(&mut level1).unwrap();
        let mut level2 = level1.add_child("LEVEL2").unwrap();
        populate(&mut level2).unwrap();
        let mut level3 = level2.add_child("LEVEL3").unwrap();
        populate(&mut level3).unwrap();
    }
    doc
}

fn assert_same_segment(expected: SegmentRef<'_>, actual: SegmentRef<'_>) {
    assert_eq!(expected.segment_type(), actual.segment_type());
    assert_eq!(expected.hierarchy_level(), actual.hierarchy_level());
    let expected_fields: Vec<_> = expected.fields().collect();
    let actual_fields: Vec<_> = actual.fields().collect();
    assert_eq!(expected_fields.len(), actual_fields.len());
    for ((ef, ev), (af, av)) in expected_fields.iter().zip(&actual_fields) {
        assert_eq!(ef.name, af.name);
        assert_eq!(ev, av, "field {}", ef.name);
    }
    assert_eq!(expected.child_count(), actual.child_count());
    for (e, a) in expected.children().zip(actual.children()) {
        assert_same_segment(e, a);
    }
}

// ---------------------------------------------------------------------------
// IDoc sends
// ---------------------------------------------------------------------------

#[test]
fn test_document_round_trip_through_connector() {
    let registry = registry();
    let connector = MemoryConnector::new();
    let document = three_level_document(&registry);

    let tid = send_document(&connector, &document).unwrap();
    let sent = connector.take_sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tid, tid);
    assert_eq!(sent[0].queue, None);
    assert_eq!(sent[0].documents.len(), 1);

    let native = &sent[0].documents[0];
    assert_eq!(native.key(), &test_key());
    assert_eq!(native.header(HeaderField::ArchiveKey.control_name()).as_deref(), Some("ARCHIVE"));
    assert!(native.header(CREATION_DATE_CONTROL).is_some());
    assert!(native.header(CREATION_TIME_CONTROL).is_some());

    let level1 = native.root_segment().child(0).unwrap();
    assert_eq!(level1.segment_type(), "LEVEL1");
    assert_eq!(level1.value("DATS_FIELD").as_deref(), Some("20261019"));
    assert_eq!(level1.value("TIMS_FIELD").as_deref(), Some("101530"));
    assert_eq!(level1.value("RAW_FIELD").as_deref(), Some("CAFE"));
    assert_eq!(level1.value("UNIT_FIELD"), None);

    let decoded = read_document(registry.idoc(&test_key()).unwrap(), native).unwrap();
    assert_eq!(decoded.header(), document.header());
    assert_same_segment(document.root(), decoded.root());
}

#[test]
fn test_xml_and_connector_agree() {
    let registry = registry();
    let codec = XmlCodec::new(Arc::clone(&registry));
    let connector = MemoryConnector::new();

    let from_xml = codec.decode_document(DOCUMENT_XML).unwrap();
    send_document(&connector, &from_xml).unwrap();
    let native = connector.take_sent().remove(0).documents.remove(0);
    let from_connector = read_document(Arc::clone(from_xml.schema()), &native).unwrap();

    assert_eq!(from_connector.header(), from_xml.header());
    assert_same_segment(from_xml.root(), from_connector.root());
}

#[test]
fn test_empty_values_agree_across_paths() {
    let registry = registry();
    let codec = XmlCodec::new(Arc::clone(&registry));
    let connector = MemoryConnector::new();

    let mut document = Document::new(registry.idoc(&test_key()).unwrap());
    {
        let mut root = document.root_mut();
        let mut level1 = root.add_child("LEVEL1").unwrap();
        level1.set("CHAR_FIELD", "").unwrap();
        level1.set("RAWSTRING_FIELD", Vec::<u8>::new()).unwrap();
        level1.set("INT4_FIELD", 0).unwrap();
    }

    let xml = codec.to_string(&document).unwrap();
    let via_xml = codec.decode_document(xml.as_str()).unwrap();
    send_document(&connector, &document).unwrap();
    let native = connector.take_sent().remove(0).documents.remove(0);
    let via_connector = read_document(registry.idoc(&test_key()).unwrap(), &native).unwrap();

    assert_eq!(via_xml.root().child(0).unwrap().field_count(), 3);
    assert_same_segment(document.root(), via_xml.root());
    assert_same_segment(document.root(), via_connector.root());
    assert_same_segment(via_xml.root(), via_connector.root());
    let level1 = via_connector.root().child(0).unwrap();
    assert_eq!(level1.get("CHAR_FIELD").unwrap(), Some(&Value::from("")));
    assert_eq!(
        level1.get("RAWSTRING_FIELD").unwrap(),
        Some(&Value::Bytes(Vec::new()))
    );
}

#[test]
fn test_list_with_failing_field_sends_nothing() {
    let registry = registry();
    let connector = MemoryConnector::new();
    let mut list = DocumentList::new(registry.idoc(&test_key()).unwrap());
    list.push(three_level_document(&registry)).unwrap();
    {
        let broken = list.add();
        let mut root = broken.root_mut();
        let mut level1 = root.add_child("LEVEL1").unwrap();
        level1.set("INT1_FIELD", 256).unwrap();
    }

    let err = send_document_list(&connector, &list).unwrap_err();
    match err {
        ConnectorError::Field { field, data_type, text, .. } => {
            assert_eq!(field, "INT1_FIELD");
            assert_eq!(data_type, DataType::Int1);
            assert_eq!(text, "256");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(connector.sent().is_empty());
}

#[test]
fn test_list_sends_share_one_transaction() {
    let registry = registry();
    let connector = MemoryConnector::new();
    let mut list = DocumentList::new(registry.idoc(&test_key()).unwrap());
    list.push(three_level_document(&registry)).unwrap();
    list.push(three_level_document(&registry)).unwrap();

    let first = send_document_list(&connector, &list).unwrap();
    let second = send_document_list_queued(&connector, &list, "INBOUND_1").unwrap();
    assert_ne!(first, second);

    let sent = connector.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].tid, first);
    assert_eq!(sent[0].documents.len(), 2);
    assert_eq!(sent[1].tid, second);
    assert_eq!(sent[1].queue.as_deref(), Some("INBOUND_1"));

    assert!(matches!(
        send_document_list_queued(&connector, &list, ""),
        Err(ConnectorError::Native(_))
    ));
    assert_eq!(connector.sent().len(), 2);
}

#[test]
fn test_transaction_ids_are_well_formed() {
    let registry = registry();
    let connector = MemoryConnector::new();
    let tid = send_document(&connector, &three_level_document(&registry)).unwrap();
    assert_eq!(TransactionId::from_str(tid.as_str()).unwrap(), tid);
    assert!(tid
        .as_str()
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
}

#[test]
fn test_consumer_decode_failure_names_the_field() {
    let registry = registry();
    let mut native = MemoryDocument::new(test_key());
    native
        .root_segment_mut()
        .add_child("LEVEL1")
        .unwrap()
        .set_value("DATS_FIELD", "20261332")
        .unwrap();

    let err = read_document(registry.idoc(&test_key()).unwrap(), &native).unwrap_err();
    match err {
        ConnectorError::Field { field, data_type, text, .. } => {
            assert_eq!(field, "DATS_FIELD");
            assert_eq!(data_type, DataType::Dats);
            assert_eq!(text, "20261332");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_consumer_empty_wire_follows_field_kind() {
    let registry = registry();
    let mut native = MemoryDocument::new(test_key());
    {
        let level1 = native.root_segment_mut().add_child("LEVEL1").unwrap();
        level1.set_value("INT4_FIELD", "").unwrap();
        level1.set_value("DATS_FIELD", "").unwrap();
        level1.set_value("CHAR_FIELD", "").unwrap();
    }
    let doc = read_document(registry.idoc(&test_key()).unwrap(), &native).unwrap();
    let level1 = doc.root().child(0).unwrap();
    assert_eq!(level1.get("INT4_FIELD").unwrap(), None);
    assert_eq!(level1.get("DATS_FIELD").unwrap(), None);
    assert_eq!(level1.get("CHAR_FIELD").unwrap(), Some(&Value::from("")));
    assert_eq!(level1.field_count(), 1);
}

#[test]
fn test_consumer_rejects_undeclared_segment() {
    let registry = registry();
    let mut native = MemoryDocument::new(test_key());
    native.root_segment_mut().add_child("LEVEL3").unwrap();
    assert!(matches!(
        read_document(registry.idoc(&test_key()).unwrap(), &native),
        Err(ConnectorError::Model(ModelError::UnknownChild { .. }))
    ));
}

// ---------------------------------------------------------------------------
// Function calls
// ---------------------------------------------------------------------------

fn order_connector() -> MemoryConnector {
    MemoryConnector::new().with_handler("/BIZ/ORDER_GET", |request: &MemoryStructure| {
        let order = request
            .value("ORDER_ID")
            .ok_or_else(|| NativeError::new("ORDER_ID is required"))?;
        let mut response = MemoryStructure::new();
        for (i, qty) in ["1.000", "2.500"].iter().enumerate() {
            let row = response.append_row("ITEMS")?;
            row.set_value("POSNR", &format!("{:06}", (i + 1) * 10))?;
            row.set_value("/BIZ/QTY", qty)?;
        }
        if order == "EMPTY" {
            return Ok(MemoryStructure::new());
        }
        Ok(response)
    })
}

#[test]
fn test_call_function_round_trip() {
    let registry = registry();
    let connector = order_connector();
    let function = registry.function("/BIZ/ORDER_GET").unwrap();
    let mut request = Structure::request(&function);
    request.set("ORDER_ID", "4711").unwrap();
    request.set("FLAG", "X").unwrap();

    let response = call_function(&connector, &request).unwrap();
    assert_eq!(response.name(), "Response");
    let items = response.table("ITEMS").unwrap().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(
        items.rows()[0].value("POSNR").unwrap(),
        Some(&Value::from("000010"))
    );
    assert_eq!(
        items.rows()[1].value("QTY").unwrap(),
        Some(&Value::decimal("2.5").unwrap())
    );
}

#[test]
fn test_call_function_materializes_empty_tables() {
    let registry = registry();
    let connector = order_connector();
    let function = registry.function("/BIZ/ORDER_GET").unwrap();
    let mut request = Structure::request(&function);
    request.set("ORDER_ID", "EMPTY").unwrap();

    let response = call_function(&connector, &request).unwrap();
    assert_eq!(response.table("ITEMS").unwrap().map(|t| t.len()), Some(0));
}

#[test]
fn test_call_function_requires_request() {
    let registry = registry();
    let connector = order_connector();
    let function = registry.function("/BIZ/ORDER_GET").unwrap();
    let response = Structure::response(&function);
    assert!(matches!(
        call_function(&connector, &response),
        Err(ConnectorError::NotARequest { .. })
    ));
}

#[test]
fn test_call_function_surfaces_native_failure() {
    let registry = registry();
    let connector = order_connector();
    let function = registry.function("/BIZ/ORDER_GET").unwrap();
    let request = Structure::request(&function);
    match call_function(&connector, &request) {
        Err(ConnectorError::Native(e)) => assert_eq!(e.0, "ORDER_ID is required"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_write_structure_copies_nested_members() {
    let registry = registry();
    let function = registry.function("TEST_FUNCTION_MODULE").unwrap();
    let mut request = Structure::request(&function);
    request.set("CHAR_PARAM", "HELLO").unwrap();
    request.set("INT4_PARAM", -42).unwrap();
    request
        .structure_mut("STRUCT_PARAM")
        .unwrap()
        .set("RAW_FIELD", vec![0x01u8, 0x02])
        .unwrap();
    let table = request.table_mut("TABLE_PARAM").unwrap();
    table.add().set("INT1_FIELD", 7).unwrap();
    table.add().set("CHAR_FIELD", "ROW2").unwrap();

    let connector = MemoryConnector::new().with_handler("TEST_FUNCTION_MODULE", |r| Ok(r.clone()));
    let mut native = connector.create_request("TEST_FUNCTION_MODULE").unwrap();
    write_structure(&request, &mut native).unwrap();

    assert_eq!(native.value("CHAR_PARAM").as_deref(), Some("HELLO"));
    assert_eq!(native.value("INT4_PARAM").as_deref(), Some("-42"));
    assert_eq!(
        native.structure("STRUCT_PARAM").unwrap().value("RAW_FIELD").as_deref(),
        Some("0102")
    );
    assert_eq!(native.row_count("TABLE_PARAM"), 2);
    assert_eq!(native.row("TABLE_PARAM", 0).unwrap().value("INT1_FIELD").as_deref(), Some("7"));
    assert_eq!(native.row("TABLE_PARAM", 1).unwrap().value("CHAR_FIELD").as_deref(), Some("ROW2"));
}
