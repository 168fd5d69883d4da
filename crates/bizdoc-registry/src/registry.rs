//! # Registry Compilation and Lookup
//!
//! [`Registry::from_definition`] resolves every reference in a
//! [`RegistryDefinition`] up front, so lookups during a conversion never
//! fail for reasons other than an unknown key.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use bizdoc_core::name;

use crate::definition::{
    ChildDefinition, FunctionDefinition, IDocDefinition, MemberDefinition, RegistryDefinition,
    SegmentDefinition, StructureDefinition,
};
use crate::error::RegistryError;
use crate::key::IDocTypeKey;
use crate::meta::{
    ChildMeta, FieldMeta, FunctionMeta, IDocSchema, MemberMeta, SegmentMeta, StructureMeta,
    REQUEST, RESPONSE, ROOT_SEGMENT_TYPE,
};

/// The compiled, read-only metadata catalogue.
#[derive(Debug, Default)]
pub struct Registry {
    idocs: HashMap<IDocTypeKey, Arc<IDocSchema>>,
    segments: HashMap<String, Arc<SegmentMeta>>,
    structures: HashMap<String, Arc<StructureMeta>>,
    functions: HashMap<String, Arc<FunctionMeta>>,
}

impl Registry {
    /// Compile a definition.
    ///
    /// # Errors
    ///
    /// Fails on duplicate names, references to undefined segment types or
    /// structures, and cyclic segment or structure definitions.
    pub fn from_definition(definition: RegistryDefinition) -> Result<Self, RegistryError> {
        let mut structures = StructureCompiler::new(&definition.structures)?;
        for def in &definition.structures {
            structures.compile(&def.name, &def.name)?;
        }

        let mut functions = HashMap::new();
        for def in &definition.functions {
            let meta = compile_function(def, &mut structures)?;
            if functions.insert(def.name.clone(), Arc::new(meta)).is_some() {
                return Err(RegistryError::Duplicate {
                    kind: "function",
                    name: def.name.clone(),
                });
            }
        }

        let mut idocs = HashMap::new();
        let mut segments = HashMap::new();
        for def in &definition.idocs {
            if idocs.contains_key(&def.key) {
                return Err(RegistryError::Duplicate {
                    kind: "IDoc type",
                    name: def.key.id(),
                });
            }
            let schema = compile_idoc(def)?;
            for segment in schema.segments() {
                segments.insert(segment.key.clone(), Arc::clone(segment));
            }
            idocs.insert(def.key.clone(), Arc::new(schema));
        }

        tracing::debug!(
            idocs = idocs.len(),
            segments = segments.len(),
            structures = structures.done.len(),
            functions = functions.len(),
            "compiled metadata registry"
        );

        Ok(Self {
            idocs,
            segments,
            structures: structures.done,
            functions,
        })
    }

    /// Parse and compile a YAML definition.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RegistryError> {
        Self::from_definition(serde_yaml::from_str(yaml)?)
    }

    /// Parse and compile a JSON definition.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        Self::from_definition(serde_json::from_str(json)?)
    }

    /// Load a definition file, choosing the format by extension
    /// (`.yaml`, `.yml`, or `.json`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(RegistryError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Look up an IDoc type.
    pub fn idoc(&self, key: &IDocTypeKey) -> Result<Arc<IDocSchema>, RegistryError> {
        self.idocs
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownIDoc(key.id()))
    }

    /// Look up an IDoc type by its message-type id.
    pub fn idoc_by_id(&self, id: &str) -> Result<Arc<IDocSchema>, RegistryError> {
        self.idoc(&IDocTypeKey::from_id(id)?)
    }

    /// Look up a segment definition by its globally unique segment key.
    pub fn segment(&self, segment_key: &str) -> Option<&Arc<SegmentMeta>> {
        self.segments.get(segment_key)
    }

    /// Look up a named structure.
    pub fn structure(&self, name: &str) -> Option<&Arc<StructureMeta>> {
        self.structures.get(name)
    }

    /// Look up a function module.
    pub fn function(&self, name: &str) -> Result<Arc<FunctionMeta>, RegistryError> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownFunction(name.to_string()))
    }

    pub fn idoc_keys(&self) -> impl Iterator<Item = &IDocTypeKey> {
        self.idocs.keys()
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

fn own_namespace(explicit: &Option<String>, name: &str) -> Option<String> {
    explicit
        .clone()
        .or_else(|| name::namespace_of(name).map(str::to_string))
}

// ─── Fields ─────────────────────────────────────────────────────────

/// Check field names and assign record offsets when none were declared.
fn compile_fields(owner: &str, defs: &[FieldMeta]) -> Result<Vec<FieldMeta>, RegistryError> {
    let mut seen = HashSet::new();
    for f in defs {
        if !seen.insert(f.name.as_str()) {
            return Err(RegistryError::Duplicate {
                kind: "field",
                name: format!("{owner}-{}", f.name),
            });
        }
    }

    let mut fields = defs.to_vec();
    if fields.iter().all(|f| f.offset == 0) {
        let mut offset = 0;
        for f in &mut fields {
            if f.byte_length == 0 {
                f.byte_length = f.length;
            }
            f.offset = offset;
            offset += f.byte_length;
        }
    }
    Ok(fields)
}

// ─── Structures ─────────────────────────────────────────────────────

struct StructureCompiler<'d> {
    defs: HashMap<&'d str, &'d StructureDefinition>,
    done: HashMap<String, Arc<StructureMeta>>,
    stack: Vec<String>,
}

impl<'d> StructureCompiler<'d> {
    fn new(defs: &'d [StructureDefinition]) -> Result<Self, RegistryError> {
        let mut by_name = HashMap::new();
        for def in defs {
            if by_name.insert(def.name.as_str(), def).is_some() {
                return Err(RegistryError::Duplicate {
                    kind: "structure",
                    name: def.name.clone(),
                });
            }
        }
        Ok(Self {
            defs: by_name,
            done: HashMap::new(),
            stack: Vec::new(),
        })
    }

    fn compile(
        &mut self,
        name: &str,
        referenced_by: &str,
    ) -> Result<Arc<StructureMeta>, RegistryError> {
        if let Some(pos) = self.stack.iter().position(|s| s == name) {
            let mut path = self.stack[pos..].to_vec();
            path.push(name.to_string());
            return Err(RegistryError::Cycle {
                kind: "structure",
                path: path.join(" -> "),
            });
        }
        if let Some(meta) = self.done.get(name) {
            return Ok(Arc::clone(meta));
        }
        let def = *self
            .defs
            .get(name)
            .ok_or_else(|| RegistryError::UnknownStructure {
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })?;

        self.stack.push(name.to_string());
        let members = self.members(&def.name, def.members.iter());
        self.stack.pop();

        let meta = Arc::new(StructureMeta {
            name: def.name.clone(),
            description: def.description.clone(),
            members: members?,
        });
        self.done.insert(def.name.clone(), Arc::clone(&meta));
        Ok(meta)
    }

    fn members<'m>(
        &mut self,
        owner: &str,
        defs: impl Iterator<Item = &'m MemberDefinition>,
    ) -> Result<Vec<MemberMeta>, RegistryError> {
        let mut seen = HashSet::new();
        let mut members = Vec::new();
        for def in defs {
            if !seen.insert(def.name().to_string()) {
                return Err(RegistryError::Duplicate {
                    kind: "member",
                    name: format!("{owner}-{}", def.name()),
                });
            }
            members.push(match def {
                MemberDefinition::Field(f) => MemberMeta::Field(f.clone()),
                MemberDefinition::Structure {
                    name,
                    structure,
                    description,
                } => MemberMeta::Structure {
                    name: name.clone(),
                    description: description.clone(),
                    structure: self.compile(structure, owner)?,
                },
                MemberDefinition::Table {
                    name,
                    row,
                    description,
                } => MemberMeta::Table {
                    name: name.clone(),
                    description: description.clone(),
                    row: self.compile(row, owner)?,
                },
            });
        }
        Ok(members)
    }
}

// ─── Functions ──────────────────────────────────────────────────────

fn compile_function(
    def: &FunctionDefinition,
    structures: &mut StructureCompiler<'_>,
) -> Result<FunctionMeta, RegistryError> {
    let request = structures.members(
        &def.name,
        def.import.iter().chain(&def.changing).chain(&def.tables),
    )?;
    let response = structures.members(
        &def.name,
        def.export.iter().chain(&def.changing).chain(&def.tables),
    )?;

    Ok(FunctionMeta {
        name: def.name.clone(),
        namespace: own_namespace(&def.namespace, &def.name),
        description: def.description.clone(),
        request: Arc::new(StructureMeta {
            name: REQUEST.to_string(),
            description: def.description.clone(),
            members: request,
        }),
        response: Arc::new(StructureMeta {
            name: RESPONSE.to_string(),
            description: def.description.clone(),
            members: response,
        }),
    })
}

// ─── IDocs ──────────────────────────────────────────────────────────

struct SegmentCompiler<'d> {
    key: &'d IDocTypeKey,
    defs: HashMap<&'d str, &'d SegmentDefinition>,
    /// Compiled segments with the level they were first reached at.
    done: HashMap<String, (u32, Arc<SegmentMeta>)>,
    stack: Vec<String>,
}

impl<'d> SegmentCompiler<'d> {
    fn children(
        &mut self,
        parent: &str,
        parent_level: u32,
        defs: &'d [ChildDefinition],
    ) -> Result<Vec<ChildMeta>, RegistryError> {
        let mut seen = HashSet::new();
        let mut children = Vec::with_capacity(defs.len());
        for child in defs {
            if !seen.insert(child.segment_type.as_str()) {
                return Err(RegistryError::Duplicate {
                    kind: "child segment",
                    name: format!("{parent}-{}", child.segment_type),
                });
            }
            let segment = self.segment(&child.segment_type, parent, parent_level + 1)?;
            let description = if child.description.is_empty() {
                segment.description.clone()
            } else {
                child.description.clone()
            };
            children.push(ChildMeta {
                key: segment.key.clone(),
                segment_type: child.segment_type.clone(),
                description,
                hierarchy_level: parent_level + 1,
                min_occurrence: child.min_occurrence,
                max_occurrence: child.max_occurrence,
                mandatory: child.mandatory,
                qualified: child.qualified || name::is_qualified(&child.segment_type),
                locked: child.locked,
            });
        }
        Ok(children)
    }

    fn segment(
        &mut self,
        segment_type: &str,
        parent: &str,
        level: u32,
    ) -> Result<Arc<SegmentMeta>, RegistryError> {
        if let Some(pos) = self.stack.iter().position(|s| s == segment_type) {
            let mut path = self.stack[pos..].to_vec();
            path.push(segment_type.to_string());
            return Err(RegistryError::Cycle {
                kind: "segment",
                path: path.join(" -> "),
            });
        }
        if let Some((first, meta)) = self.done.get(segment_type) {
            // Child levels are stored on the shared meta, so one depth per type.
            if *first != level {
                return Err(RegistryError::InconsistentLevel {
                    idoc: self.key.id(),
                    segment_type: segment_type.to_string(),
                    first: *first,
                    second: level,
                });
            }
            return Ok(Arc::clone(meta));
        }
        let def = *self
            .defs
            .get(segment_type)
            .ok_or_else(|| RegistryError::UnknownSegment {
                idoc: self.key.id(),
                segment_type: segment_type.to_string(),
                parent: parent.to_string(),
            })?;

        self.stack.push(segment_type.to_string());
        let children = self.children(segment_type, level, &def.children);
        self.stack.pop();

        let meta = Arc::new(SegmentMeta {
            key: self.key.segment_key(segment_type),
            segment_type: segment_type.to_string(),
            description: def.description.clone(),
            fields: compile_fields(segment_type, &def.fields)?,
            children: children?,
        });
        self.done
            .insert(segment_type.to_string(), (level, Arc::clone(&meta)));
        Ok(meta)
    }
}

fn compile_idoc(def: &IDocDefinition) -> Result<IDocSchema, RegistryError> {
    let mut by_type = HashMap::new();
    for segment in &def.segments {
        if segment.segment_type == ROOT_SEGMENT_TYPE
            || by_type.insert(segment.segment_type.as_str(), segment).is_some()
        {
            return Err(RegistryError::Duplicate {
                kind: "segment",
                name: segment.segment_type.clone(),
            });
        }
    }

    let mut compiler = SegmentCompiler {
        key: &def.key,
        defs: by_type,
        done: HashMap::new(),
        stack: vec![ROOT_SEGMENT_TYPE.to_string()],
    };
    let root_children = compiler.children(ROOT_SEGMENT_TYPE, 0, &def.root)?;

    let root = Arc::new(SegmentMeta {
        key: def.key.segment_key(ROOT_SEGMENT_TYPE),
        segment_type: ROOT_SEGMENT_TYPE.to_string(),
        description: def.description.clone(),
        fields: Vec::new(),
        children: root_children,
    });

    let mut segments: HashMap<String, Arc<SegmentMeta>> = compiler
        .done
        .into_values()
        .map(|(_, meta)| (meta.key.clone(), meta))
        .collect();
    segments.insert(root.key.clone(), Arc::clone(&root));

    Ok(IDocSchema {
        key: def.key.clone(),
        namespace: own_namespace(&def.namespace, &def.key.idoc_type),
        description: def.description.clone(),
        root,
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "key: { repository: R, idoc_type: T }";

    fn idoc_yaml(body: &str) -> String {
        format!("idocs:\n  - {KEY}\n{body}")
    }

    #[test]
    fn levels_are_computed_from_the_root() {
        let yaml = idoc_yaml(
            r#"    root: [ { type: A } ]
    segments:
      - { type: A, children: [ { type: B, max_occurrence: 9 } ] }
      - { type: B }
"#,
        );
        let registry = Registry::from_yaml_str(&yaml).unwrap();
        let schema = registry.idoc(&IDocTypeKey::new("R", "T", "", "", "")).unwrap();
        let root = schema.root();
        assert!(root.is_root());
        assert!(root.fields.is_empty());
        assert_eq!(root.children[0].hierarchy_level, 1);
        let (b, _) = schema
            .child_of(schema.segment_by_type("A").unwrap(), "B")
            .unwrap();
        assert_eq!(b.hierarchy_level, 2);
        assert_eq!(b.max_occurrence, 9);
        assert_eq!(b.key, "R/T///:B");
        assert_eq!(schema.segment_count(), 3);
        assert!(registry.segment("R/T///:B").is_some());
    }

    #[test]
    fn shared_segment_at_one_level_is_reused() {
        let yaml = idoc_yaml(
            r#"    root: [ { type: A }, { type: B } ]
    segments:
      - { type: A, children: [ { type: C } ] }
      - { type: B, children: [ { type: C } ] }
      - { type: C, children: [ { type: D } ] }
      - { type: D }
"#,
        );
        let registry = Registry::from_yaml_str(&yaml).unwrap();
        let schema = registry.idoc(&IDocTypeKey::new("R", "T", "", "", "")).unwrap();
        let c = schema.segment_by_type("C").unwrap();
        let (d, _) = schema.child_of(c, "D").unwrap();
        assert_eq!(d.hierarchy_level, 3);
        for parent in ["A", "B"] {
            let (child, meta) = schema
                .child_of(schema.segment_by_type(parent).unwrap(), "C")
                .unwrap();
            assert_eq!(child.hierarchy_level, 2);
            assert!(Arc::ptr_eq(meta, c));
        }
    }

    #[test]
    fn shared_segment_at_two_levels_rejected() {
        let yaml = idoc_yaml(
            r#"    root: [ { type: A }, { type: C } ]
    segments:
      - { type: A, children: [ { type: C } ] }
      - { type: C, children: [ { type: D } ] }
      - { type: D }
"#,
        );
        match Registry::from_yaml_str(&yaml) {
            Err(RegistryError::InconsistentLevel {
                segment_type,
                first,
                second,
                ..
            }) => {
                assert_eq!(segment_type, "C");
                assert_eq!((first, second), (2, 1));
            }
            other => panic!("expected inconsistent level, got {other:?}"),
        }
    }

    #[test]
    fn segment_cycle_rejected() {
        let yaml = idoc_yaml(
            r#"    root: [ { type: A } ]
    segments:
      - { type: A, children: [ { type: B } ] }
      - { type: B, children: [ { type: A } ] }
"#,
        );
        match Registry::from_yaml_str(&yaml) {
            Err(RegistryError::Cycle { kind, path }) => {
                assert_eq!(kind, "segment");
                assert_eq!(path, "A -> B -> A");
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn dangling_child_rejected() {
        let yaml = idoc_yaml("    root: [ { type: MISSING } ]\n");
        assert!(matches!(
            Registry::from_yaml_str(&yaml),
            Err(RegistryError::UnknownSegment { segment_type, .. }) if segment_type == "MISSING"
        ));
    }

    #[test]
    fn duplicate_field_rejected() {
        let yaml = idoc_yaml(
            r#"    root: [ { type: A } ]
    segments:
      - type: A
        fields: [ { name: F, type: CHAR }, { name: F, type: INT4 } ]
"#,
        );
        assert!(matches!(
            Registry::from_yaml_str(&yaml),
            Err(RegistryError::Duplicate { kind: "field", .. })
        ));
    }

    #[test]
    fn offsets_assigned_in_declaration_order() {
        let yaml = idoc_yaml(
            r#"    root: [ { type: A } ]
    segments:
      - type: A
        fields:
          - { name: X, type: CHAR, length: 10 }
          - { name: Y, type: INT4, length: 11, byte_length: 4 }
          - { name: Z, type: DATS, length: 8 }
"#,
        );
        let registry = Registry::from_yaml_str(&yaml).unwrap();
        let schema = registry.idoc(&IDocTypeKey::new("R", "T", "", "", "")).unwrap();
        let a = schema.segment_by_type("A").unwrap();
        let offsets: Vec<usize> = a.fields.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0, 10, 14]);
    }

    #[test]
    fn structure_cycle_and_dangling_reference_rejected() {
        let cyclic = r#"
structures:
  - name: A
    members: [ { kind: structure, name: B, structure: B } ]
  - name: B
    members: [ { kind: table, name: A, row: A } ]
"#;
        assert!(matches!(
            Registry::from_yaml_str(cyclic),
            Err(RegistryError::Cycle { kind: "structure", .. })
        ));

        let dangling = r#"
functions:
  - name: F
    import: [ { kind: structure, name: S, structure: NOPE } ]
"#;
        assert!(matches!(
            Registry::from_yaml_str(dangling),
            Err(RegistryError::UnknownStructure { name, referenced_by })
                if name == "NOPE" && referenced_by == "F"
        ));
    }

    #[test]
    fn function_parameter_lists() {
        let yaml = r#"
functions:
  - name: /BIZ/GET
    import: [ { kind: field, name: IN, type: CHAR } ]
    export: [ { kind: field, name: OUT, type: CHAR } ]
    changing: [ { kind: field, name: BOTH, type: CHAR } ]
"#;
        let registry = Registry::from_yaml_str(yaml).unwrap();
        let f = registry.function("/BIZ/GET").unwrap();
        assert_eq!(f.namespace(), Some("BIZ"));
        let request: Vec<&str> = f.request.members.iter().map(MemberMeta::name).collect();
        let response: Vec<&str> = f.response.members.iter().map(MemberMeta::name).collect();
        assert_eq!(request, vec!["IN", "BOTH"]);
        assert_eq!(response, vec!["OUT", "BOTH"]);
        assert_eq!(f.request.name, REQUEST);
        assert!(matches!(
            registry.function("NOPE"),
            Err(RegistryError::UnknownFunction(_))
        ));
    }

    #[test]
    fn json_definitions_load() {
        let json = r#"{"idocs":[{"key":{"repository":"R","idoc_type":"T"},"root":[{"type":"A"}],"segments":[{"type":"A"}]}]}"#;
        let registry = Registry::from_json_str(json).unwrap();
        assert_eq!(registry.idoc_keys().count(), 1);
        assert!(registry.idoc_by_id("R/T///").is_ok());
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
