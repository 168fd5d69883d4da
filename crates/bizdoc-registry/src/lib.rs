//! # bizdoc-registry — Metadata Registry
//!
//! Holds the declared shape of every message type a conversion may touch:
//! IDoc segment trees keyed by [`IDocTypeKey`], and function-module parameter
//! lists keyed by function name.
//!
//! ## Lifecycle
//!
//! 1. A [`RegistryDefinition`] is authored in YAML or JSON, or built in code.
//! 2. [`Registry::from_definition`] compiles it: child levels are computed,
//!    offsets are assigned, and references are checked for dangling names,
//!    duplicates, and cycles.
//! 3. The compiled [`Registry`] is immutable. Schemas are handed out as
//!    `Arc`s and shared freely across concurrent conversions.
//!
//! ## Crate Policy
//!
//! - Depends only on `bizdoc-core` internally.
//! - No interior mutability: nothing mutates a registry after compilation.

pub mod definition;
pub mod error;
pub mod key;
pub mod meta;
pub mod registry;

pub use definition::{
    ChildDefinition, FunctionDefinition, IDocDefinition, MemberDefinition, RegistryDefinition,
    SegmentDefinition, StructureDefinition,
};
pub use error::RegistryError;
pub use key::IDocTypeKey;
pub use meta::{
    ChildMeta, FieldMeta, FunctionMeta, IDocSchema, MemberMeta, SegmentMeta, StructureMeta,
    REQUEST, RESPONSE, ROOT_SEGMENT_TYPE,
};
pub use registry::Registry;
