//! Compile the shared fixture and check the metadata graph it produces.

use bizdoc_core::{DataType, DATA_TYPE_COUNT};
use bizdoc_registry::{IDocTypeKey, MemberMeta, Registry, RegistryError, REQUEST, RESPONSE};

const FIXTURE: &str = include_str!("fixtures/test_registry.yaml");

fn test_key() -> IDocTypeKey {
    IDocTypeKey::new(
        "TEST_REPOSITORY",
        "TEST_IDOC_TYPE",
        "TEST_IDOC_TYPE_EXTENSION",
        "TEST_SYSTEM_RELEASE",
        "TEST_APPLICATION_RELEASE",
    )
}

fn registry() -> Registry {
    Registry::from_yaml_str(FIXTURE).expect("fixture compiles")
}

#[test]
fn test_fixture_loads_from_disk() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/test_registry.yaml");
    let registry = Registry::load(path).unwrap();
    assert_eq!(registry.idoc_keys().count(), 2);
    assert_eq!(registry.function_names().count(), 2);
}

#[test]
fn test_unsupported_extension_rejected() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
    assert!(matches!(
        Registry::load(path),
        Err(RegistryError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_three_levels_with_every_field_type() {
    let registry = registry();
    let schema = registry.idoc(&test_key()).unwrap();
    assert_eq!(schema.namespace(), None);
    assert_eq!(schema.segment_count(), 4);

    let root = schema.root();
    assert!(root.fields.is_empty());

    let mut parent = root.clone();
    for (level, name) in ["LEVEL1", "LEVEL2", "LEVEL3"].iter().enumerate() {
        let (child, meta) = schema.child_of(&parent, name).unwrap();
        assert_eq!(child.hierarchy_level as usize, level + 1);
        assert_eq!(child.key, format!("{}:{}", test_key().id(), name));
        assert_eq!(meta.fields.len(), DATA_TYPE_COUNT);

        let mut types: Vec<DataType> = meta.fields.iter().map(|f| f.data_type).collect();
        types.sort();
        types.dedup();
        assert_eq!(types.len(), DATA_TYPE_COUNT);

        parent = meta.clone();
    }
    assert!(parent.children.is_empty());
}

#[test]
fn test_lookup_by_segment_key() {
    let registry = registry();
    let key = test_key().segment_key("LEVEL2");
    let meta = registry.segment(&key).unwrap();
    assert_eq!(meta.segment_type, "LEVEL2");
    assert!(registry.segment("NOPE:LEVEL2").is_none());
}

#[test]
fn test_field_offsets_follow_byte_lengths() {
    let registry = registry();
    let schema = registry.idoc(&test_key()).unwrap();
    let level1 = schema.segment_by_type("LEVEL1").unwrap();
    let char_field = level1.field("CHAR_FIELD", None).unwrap();
    let quan_field = level1.field("QUAN_FIELD", None).unwrap();
    assert_eq!(char_field.offset, 0);
    assert_eq!(quan_field.offset, 10);
}

#[test]
fn test_namespace_derived_from_idoc_type() {
    let registry = registry();
    let schema = registry
        .idoc(&IDocTypeKey::new("TEST_REPOSITORY", "/BIZ/ORDERS", "", "", ""))
        .unwrap();
    assert_eq!(schema.namespace(), Some("BIZ"));

    let root = schema.root();
    let (head, head_meta) = schema.child_of(root, "HEAD").unwrap();
    assert_eq!(head.segment_type, "/BIZ/HEAD");
    assert!(head.qualified);
    assert!(head.mandatory);
    assert!(schema.child_of(root, "/BIZ/HEAD").is_some());
    assert!(schema.child_of(root, "/BIZ/ITEM").is_some());

    assert!(schema.child_of(head_meta, "NOTE").is_none());
    assert!(schema.child_of(head_meta, "/OTH/NOTE").is_some());

    assert!(head_meta.field("STATUS", schema.namespace()).is_some());
    assert!(head_meta.field("EXT", schema.namespace()).is_none());
    assert!(head_meta.field("/OTH/EXT", schema.namespace()).is_some());
}

#[test]
fn test_function_request_and_response() {
    let registry = registry();
    let f = registry.function("TEST_FUNCTION_MODULE").unwrap();
    assert_eq!(f.namespace(), None);
    assert_eq!(f.request.name, REQUEST);
    assert_eq!(f.response.name, RESPONSE);

    let request: Vec<&str> = f.request.members.iter().map(MemberMeta::name).collect();
    assert_eq!(
        request,
        vec!["CHAR_PARAM", "INT4_PARAM", "DATE_PARAM", "STRUCT_PARAM", "COUNTER", "TABLE_PARAM"]
    );
    let response: Vec<&str> = f.response.members.iter().map(MemberMeta::name).collect();
    assert_eq!(response, vec!["RESULT_TEXT", "RESULT_STRUCT", "COUNTER", "TABLE_PARAM"]);

    match f.request.member("TABLE_PARAM", None) {
        Some(MemberMeta::Table { row, .. }) => {
            assert_eq!(row.name, "TEST_STRUCTURE");
            assert_eq!(row.fields().count(), DATA_TYPE_COUNT);
        }
        other => panic!("expected table, got {other:?}"),
    }
    assert!(registry.structure("TEST_STRUCTURE").is_some());
}

#[test]
fn test_namespaced_function_members() {
    let registry = registry();
    let f = registry.function("/BIZ/ORDER_GET").unwrap();
    assert_eq!(f.namespace(), Some("BIZ"));
    assert_eq!(
        f.request.member("FLAG", f.namespace()).map(MemberMeta::name),
        Some("/BIZ/FLAG")
    );
    assert_eq!(
        f.request.member("/OTH/FLAG", f.namespace()).map(MemberMeta::name),
        Some("/OTH/FLAG")
    );
    assert!(f.response.member("ITEMS", f.namespace()).is_some());
}
