//! # Structures and Tables
//!
//! A [`Structure`] holds one function module's request or response
//! parameters, or a nested structure within them. Members are scalars,
//! nested structures, and [`Table`]s of row structures, each bound to the
//! shape the registry declares for it.
//!
//! [`Structure::get`] is the single read access point for all three member
//! shapes. [`Structure::structure_mut`] and [`Structure::table_mut`] create a
//! nested member on first use and return the same instance afterwards, so
//! they serve both for populating and for inspecting a parameter set.

use std::sync::Arc;

use indexmap::IndexMap;

use bizdoc_core::Value;
use bizdoc_registry::{FieldMeta, FunctionMeta, MemberMeta, StructureMeta};

use crate::error::ModelError;
use crate::segment::{check_kind, decode_field};

/// A member value as returned by [`Structure::get`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Member<'a> {
    Value(&'a Value),
    Structure(&'a Structure),
    Table(&'a Table),
}

/// A named-value container bound to a [`StructureMeta`].
#[derive(Debug, Clone)]
pub struct Structure {
    function: Arc<FunctionMeta>,
    meta: Arc<StructureMeta>,
    values: IndexMap<String, Value>,
    structures: IndexMap<String, Structure>,
    tables: IndexMap<String, Table>,
}

impl PartialEq for Structure {
    fn eq(&self, other: &Self) -> bool {
        self.function.name == other.function.name
            && self.meta == other.meta
            && self.values == other.values
            && self.structures == other.structures
            && self.tables == other.tables
    }
}

impl Structure {
    /// An empty request parameter set for `function`.
    pub fn request(function: &Arc<FunctionMeta>) -> Self {
        Self::bound(Arc::clone(function), Arc::clone(&function.request))
    }

    /// An empty response parameter set for `function`.
    pub fn response(function: &Arc<FunctionMeta>) -> Self {
        Self::bound(Arc::clone(function), Arc::clone(&function.response))
    }

    fn bound(function: Arc<FunctionMeta>, meta: Arc<StructureMeta>) -> Self {
        Self {
            function,
            meta,
            values: IndexMap::new(),
            structures: IndexMap::new(),
            tables: IndexMap::new(),
        }
    }

    /// The function module this parameter set belongs to.
    pub fn function(&self) -> &Arc<FunctionMeta> {
        &self.function
    }

    pub fn meta(&self) -> &Arc<StructureMeta> {
        &self.meta
    }

    /// Declared name: `Request`/`Response` at the top, the structure type below.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// The function's own namespace, used to resolve local names.
    pub fn namespace(&self) -> Option<&str> {
        self.function.namespace()
    }

    fn member(&self, name: &str) -> Result<&MemberMeta, ModelError> {
        self.meta
            .member(name, self.namespace())
            .ok_or_else(|| ModelError::UnknownMember {
                structure: self.meta.name.clone(),
                member: name.to_string(),
            })
    }

    fn field(&self, name: &str) -> Result<&FieldMeta, ModelError> {
        match self.member(name)? {
            MemberMeta::Field(f) => Ok(f),
            other => Err(ModelError::WrongMemberKind {
                member: other.name().to_string(),
                expected: "field",
            }),
        }
    }

    /// Read any member. Absent scalars and not-yet-created nested members
    /// are `None`.
    ///
    /// # Errors
    ///
    /// `UnknownMember` when no member of that name is declared.
    pub fn get(&self, name: &str) -> Result<Option<Member<'_>>, ModelError> {
        Ok(match self.member(name)? {
            MemberMeta::Field(f) => self.values.get(&f.name).map(Member::Value),
            MemberMeta::Structure { name, .. } => self.structures.get(name).map(Member::Structure),
            MemberMeta::Table { name, .. } => self.tables.get(name).map(Member::Table),
        })
    }

    /// Value of a scalar member; `None` when unset.
    pub fn value(&self, name: &str) -> Result<Option<&Value>, ModelError> {
        let field = self.field(name)?;
        Ok(self.values.get(&field.name))
    }

    /// Set a scalar member.
    ///
    /// # Errors
    ///
    /// `UnknownMember`, `WrongMemberKind`, or `TypeMismatch`.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let value = value.into();
        let field = self.field(name)?;
        check_kind(field, &value)?;
        let declared = field.name.clone();
        self.values.insert(declared, value);
        Ok(())
    }

    /// Set a scalar member from its wire string. Empty text unsets members
    /// whose type has no empty value.
    pub fn set_wire(&mut self, name: &str, text: &str) -> Result<(), ModelError> {
        let field = self.field(name)?;
        let value = decode_field(field, text)?;
        let declared = field.name.clone();
        match value {
            Some(value) => {
                self.values.insert(declared, value);
            }
            None => {
                self.values.shift_remove(&declared);
            }
        }
        Ok(())
    }

    /// Clear a scalar member, returning its previous value.
    pub fn unset(&mut self, name: &str) -> Result<Option<Value>, ModelError> {
        let declared = self.field(name)?.name.clone();
        Ok(self.values.shift_remove(&declared))
    }

    /// Set scalar members in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldMeta, &Value)> + '_ {
        self.meta
            .fields()
            .filter_map(move |f| self.values.get(&f.name).map(|v| (f, v)))
    }

    /// Number of set scalar members.
    pub fn field_count(&self) -> usize {
        self.values.len()
    }

    /// A nested structure, if it has been created.
    pub fn structure(&self, name: &str) -> Result<Option<&Structure>, ModelError> {
        match self.member(name)? {
            MemberMeta::Structure { name, .. } => Ok(self.structures.get(name)),
            other => Err(ModelError::WrongMemberKind {
                member: other.name().to_string(),
                expected: "structure",
            }),
        }
    }

    /// A nested structure, created bound to its declared shape on first use.
    pub fn structure_mut(&mut self, name: &str) -> Result<&mut Structure, ModelError> {
        let (declared, shape) = match self.member(name)? {
            MemberMeta::Structure {
                name, structure, ..
            } => (name.clone(), Arc::clone(structure)),
            other => {
                return Err(ModelError::WrongMemberKind {
                    member: other.name().to_string(),
                    expected: "structure",
                })
            }
        };
        let function = Arc::clone(&self.function);
        Ok(self
            .structures
            .entry(declared)
            .or_insert_with(|| Structure::bound(function, shape)))
    }

    /// A table, if it has been created.
    pub fn table(&self, name: &str) -> Result<Option<&Table>, ModelError> {
        match self.member(name)? {
            MemberMeta::Table { name, .. } => Ok(self.tables.get(name)),
            other => Err(ModelError::WrongMemberKind {
                member: other.name().to_string(),
                expected: "table",
            }),
        }
    }

    /// A table, created bound to its declared row shape on first use.
    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table, ModelError> {
        let (declared, row) = match self.member(name)? {
            MemberMeta::Table { name, row, .. } => (name.clone(), Arc::clone(row)),
            other => {
                return Err(ModelError::WrongMemberKind {
                    member: other.name().to_string(),
                    expected: "table",
                })
            }
        };
        let function = Arc::clone(&self.function);
        Ok(self
            .tables
            .entry(declared)
            .or_insert_with(|| Table::new(function, row)))
    }
}

/// An ordered sequence of rows sharing one row definition.
#[derive(Debug, Clone)]
pub struct Table {
    function: Arc<FunctionMeta>,
    row: Arc<StructureMeta>,
    rows: Vec<Structure>,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.rows == other.rows
    }
}

impl Table {
    fn new(function: Arc<FunctionMeta>, row: Arc<StructureMeta>) -> Self {
        Self {
            function,
            row,
            rows: Vec::new(),
        }
    }

    pub fn row_meta(&self) -> &Arc<StructureMeta> {
        &self.row
    }

    /// Append an empty row and return it.
    pub fn add(&mut self) -> &mut Structure {
        self.rows.push(Structure::bound(
            Arc::clone(&self.function),
            Arc::clone(&self.row),
        ));
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[Structure] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Structure] {
        &mut self.rows
    }

    pub fn get(&self, index: usize) -> Option<&Structure> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
