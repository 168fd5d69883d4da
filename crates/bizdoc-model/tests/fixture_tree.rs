//! Build the three-level fixture tree through the public model API.

use std::sync::Arc;

use bizdoc_core::{BigDecimal, Value, DATA_TYPE_COUNT};
use bizdoc_model::{Document, HeaderField, ModelError, SegmentMut};
use bizdoc_registry::{IDocSchema, IDocTypeKey, Registry};
use chrono::{NaiveDate, NaiveTime};
use std::str::FromStr;

const FIXTURE: &str = include_str!("../../bizdoc-registry/tests/fixtures/test_registry.yaml");

fn schema() -> Arc<IDocSchema> {
    let registry = Registry::from_yaml_str(FIXTURE).unwrap();
    registry
        .idoc(&IDocTypeKey::new(
            "TEST_REPOSITORY",
            "TEST_IDOC_TYPE",
            "TEST_IDOC_TYPE_EXTENSION",
            "TEST_SYSTEM_RELEASE",
            "TEST_APPLICATION_RELEASE",
        ))
        .unwrap()
}

fn populate(segment: &mut SegmentMut<'_>) -> Result<(), ModelError> {
    segment.set("CHAR_FIELD", "1234ABCDEF")?;
    segment.set("QUAN_FIELD", BigDecimal::from_str("1234567890123456789").unwrap())?;
    segment.set("UNIT_FIELD", "KG")?;
    segment.set("NUMC_FIELD", "0123456789")?;
    segment.set("DATS_FIELD", NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())?;
    segment.set("TIMS_FIELD", NaiveTime::from_hms_opt(10, 15, 30).unwrap())?;
    segment.set("CURR_FIELD", BigDecimal::from_str("1234.56").unwrap())?;
    segment.set("CUKY_FIELD", "EUR")?;
    segment.set("LANG_FIELD", "E")?;
    segment.set("CLNT_FIELD", "100")?;
    segment.set("INT1_FIELD", 255)?;
    segment.set("INT2_FIELD", -32768)?;
    segment.set("INT4_FIELD", 2_147_483_647)?;
    segment.set("FLTP_FIELD", BigDecimal::from_str("1.5E3").unwrap())?;
    segment.set("ACCP_FIELD", "202610")?;
    segment.set("PREC_FIELD", "12")?;
    segment.set("LRAW_FIELD", vec![0xDEu8, 0xAD, 0xBE, 0xEF])?;
    segment.set("DEC_FIELD", BigDecimal::from_str("-0.00001").unwrap())?;
    segment.set("RAW_FIELD", (0u8..16).rev().collect::<Vec<u8>>())?;
    segment.set("STRING_FIELD", "any length at all")?;
    segment.set("RAWSTRING_FIELD", Vec::<u8>::new())?;
    Ok(())
}

#[test]
fn test_three_level_tree_with_every_field() {
    let mut doc = Document::new(schema());
    {
        let mut root = doc.root_mut();
        let mut level1 = root.add_child("LEVEL1").unwrap();
        populate(&mut level1).unwrap();
        let mut level2 = level1.add_child("LEVEL2").unwrap();
        populate(&mut level2).unwrap();
        let mut level3 = level2.add_child("LEVEL3").unwrap();
        populate(&mut level3).unwrap();
    }

    assert_eq!(
        doc.header().get(HeaderField::IdocType),
        Some("TEST_IDOC_TYPE")
    );
    let root = doc.root();
    assert_eq!(root.field_count(), 0);
    assert_eq!(root.child_count(), 1);

    let mut segment = root;
    for (level, name) in ["LEVEL1", "LEVEL2", "LEVEL3"].iter().enumerate() {
        let children = segment.children_of_type(name).unwrap();
        assert_eq!(children.len(), 1);
        segment = children[0];
        assert_eq!(segment.segment_type(), *name);
        assert_eq!(segment.hierarchy_level() as usize, level + 1);
        assert_eq!(segment.field_count(), DATA_TYPE_COUNT);
        assert_eq!(
            segment.get("RAW_FIELD").unwrap().and_then(Value::as_bytes).map(hex_upper),
            Some("0F0E0D0C0B0A09080706050403020100".to_string())
        );
    }
    assert_eq!(segment.child_count(), 0);
    assert!(doc.validate().is_empty(), "{}", doc.validate());
}

fn hex_upper(bytes: &[u8]) -> String {
    bizdoc_core::encode_hex(bytes)
}

#[test]
fn test_creation_stamp_is_taken_at_construction() {
    let before = chrono::Local::now().naive_local();
    let doc = Document::new(schema());
    let stamp = *doc.creation().as_datetime();
    assert!(stamp <= chrono::Local::now().naive_local());
    assert!(stamp >= before - chrono::Duration::seconds(1));
}
