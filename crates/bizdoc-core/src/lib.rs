//! # bizdoc-core — Foundational Types for bizdoc
//!
//! This crate is the leaf of the bizdoc workspace. It defines the primitive
//! type system shared by the XML codec and the native-call adapter, so that
//! both serialization boundaries agree on every field by construction.
//!
//! ## Key Design Principles
//!
//! 1. **Single `DataType` enum.** One definition of the wire type tags,
//!    exhaustive `match` everywhere. Adding a tag forces every coercion
//!    arm to handle it.
//!
//! 2. **Tagged-union `Value`.** Field values are `Text`, `Integer`, `Decimal`,
//!    `Date`, `Time` or `Bytes`. There is no untyped "object" slot and no
//!    null-as-value: an unset field is simply absent from its container.
//!
//! 3. **One coercion table.** [`coerce::encode`] and [`coerce::decode`] are the
//!    only string↔value conversions in the workspace. They are pure functions
//!    of a [`FieldFormat`] and their input.
//!
//! 4. **Qualified names.** `/NS/LOCAL` names resolve against the owning
//!    message's namespace through [`name::matches`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `bizdoc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod coerce;
pub mod datatype;
pub mod error;
pub mod name;
pub mod temporal;
pub mod value;

pub use coerce::{decode_hex, encode_hex, FieldFormat, FLTP_RELATIVE_TOLERANCE};
pub use datatype::{DataType, ValueKind, DATA_TYPE_COUNT};
pub use error::{BizdocError, CoercionError};
pub use temporal::CreationStamp;
pub use value::Value;

/// Arbitrary-precision integer used for `INT1`/`INT2`/`INT4` values.
pub use num_bigint::BigInt;

/// Arbitrary-precision decimal used for `QUAN`/`CURR`/`DEC`/`FLTP` values.
pub use bigdecimal::BigDecimal;
