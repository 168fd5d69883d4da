//! # Registry Definitions
//!
//! The authored form of the metadata, deserialized from YAML or JSON. A
//! definition is checked and turned into the compiled graph in
//! [`meta`](crate::meta) by [`Registry::from_definition`](crate::Registry::from_definition).
//!
//! ```yaml
//! idocs:
//!   - key: { repository: R, idoc_type: ORDERS05 }
//!     root:
//!       - { type: E1EDK01, min_occurrence: 1, max_occurrence: 1, mandatory: true }
//!     segments:
//!       - type: E1EDK01
//!         fields:
//!           - { name: CURCY, type: CUKY, length: 3 }
//! functions:
//!   - name: BAPI_ORDER_GET
//!     import:
//!       - { kind: field, name: ORDER_ID, type: CHAR, length: 10 }
//! ```

use serde::{Deserialize, Serialize};

use crate::key::IDocTypeKey;
use crate::meta::FieldMeta;

/// Everything a registry is compiled from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryDefinition {
    #[serde(default)]
    pub idocs: Vec<IDocDefinition>,
    /// Named structures referenced by function parameters and other structures.
    #[serde(default)]
    pub structures: Vec<StructureDefinition>,
    #[serde(default)]
    pub functions: Vec<FunctionDefinition>,
}

/// One IDoc type: the children of the synthetic root plus every segment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IDocDefinition {
    pub key: IDocTypeKey,
    /// Own namespace. Derived from a `/NS/NAME` IDoc type when absent.
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Child types permitted directly under the root segment.
    #[serde(default)]
    pub root: Vec<ChildDefinition>,
    #[serde(default)]
    pub segments: Vec<SegmentDefinition>,
}

/// One segment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDefinition {
    #[serde(rename = "type")]
    pub segment_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FieldMeta>,
    #[serde(default)]
    pub children: Vec<ChildDefinition>,
}

/// A permitted child type under a parent segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildDefinition {
    #[serde(rename = "type")]
    pub segment_type: String,
    /// Overrides the segment type's description when non-empty.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub min_occurrence: u64,
    #[serde(default = "default_max_occurrence")]
    pub max_occurrence: u64,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub qualified: bool,
    #[serde(default)]
    pub locked: bool,
}

fn default_max_occurrence() -> u64 {
    1
}

/// A named structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub members: Vec<MemberDefinition>,
}

/// A structure member or function parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberDefinition {
    /// A scalar field.
    Field(FieldMeta),
    /// A nested structure of the named type.
    Structure {
        name: String,
        structure: String,
        #[serde(default)]
        description: String,
    },
    /// A table whose rows have the named structure type.
    Table {
        name: String,
        row: String,
        #[serde(default)]
        description: String,
    },
}

impl MemberDefinition {
    pub fn name(&self) -> &str {
        match self {
            Self::Field(f) => &f.name,
            Self::Structure { name, .. } | Self::Table { name, .. } => name,
        }
    }
}

/// One function module and its parameter lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    /// Own namespace. Derived from a `/NS/NAME` function name when absent.
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub import: Vec<MemberDefinition>,
    #[serde(default)]
    pub export: Vec<MemberDefinition>,
    #[serde(default)]
    pub changing: Vec<MemberDefinition>,
    #[serde(default)]
    pub tables: Vec<MemberDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizdoc_core::DataType;

    #[test]
    fn member_kinds_deserialize_from_yaml() {
        let yaml = r#"
- { kind: field, name: F, type: INT4 }
- { kind: structure, name: S, structure: ADDRESS }
- { kind: table, name: T, row: ITEM, description: Items }
"#;
        let members: Vec<MemberDefinition> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(members.len(), 3);
        match &members[0] {
            MemberDefinition::Field(f) => assert_eq!(f.data_type, DataType::Int4),
            other => panic!("expected field, got {other:?}"),
        }
        assert_eq!(members[1].name(), "S");
        assert!(matches!(&members[2], MemberDefinition::Table { row, .. } if row == "ITEM"));
    }

    #[test]
    fn child_defaults() {
        let child: ChildDefinition = serde_yaml::from_str("type: SEG").unwrap();
        assert_eq!(child.min_occurrence, 0);
        assert_eq!(child.max_occurrence, 1);
        assert!(!child.mandatory);
    }

    #[test]
    fn unknown_type_tag_rejected() {
        let result: Result<FieldMeta, _> = serde_yaml::from_str("{ name: F, type: BOGUS }");
        assert!(result.is_err());
    }
}
