//! # Data Type Tags — Single Source of Truth
//!
//! Defines the `DataType` enum with every primitive wire type a field can be
//! declared with, and the `ValueKind` each one coerces to.
//!
//! Every `match` on `DataType` must be exhaustive; adding a tag forces the
//! coercion engine, the codec, and the adapter to handle it at compile time.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::BizdocError;

/// Primitive wire type of a declared field.
///
/// # Tags
///
/// | Tag | Kind | Meaning |
/// |-----|------|---------|
/// | CHAR | Text | Fixed-length character field |
/// | STRING | Text | Variable-length character string |
/// | LANG | Text | Language key |
/// | CLNT | Text | Client number |
/// | CUKY | Text | Currency key |
/// | UNIT | Text | Unit of measure |
/// | NUMC | Text | Numeric character text (digits kept as text) |
/// | ACCP | Text | Posting period |
/// | PREC | Text | Precision |
/// | QUAN | Decimal | Quantity |
/// | CURR | Decimal | Currency amount |
/// | DEC | Decimal | Packed decimal |
/// | FLTP | Decimal | Floating point |
/// | INT1 | Integer | 1-byte integer |
/// | INT2 | Integer | 2-byte integer |
/// | INT4 | Integer | 4-byte integer |
/// | DATS | Date | Calendar date `YYYYMMDD` |
/// | TIMS | Time | Time of day `HHMMSS` |
/// | RAW | Bytes | Fixed-length byte sequence |
/// | LRAW | Bytes | Long byte sequence |
/// | RAWSTRING | Bytes | Variable-length byte string |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    /// Fixed-length character field.
    Char,
    /// Variable-length character string.
    String,
    /// Language key.
    Lang,
    /// Client number.
    Clnt,
    /// Currency key.
    Cuky,
    /// Unit of measure.
    Unit,
    /// Numeric text; the digits stay text.
    Numc,
    /// Posting period.
    Accp,
    /// Precision.
    Prec,
    /// Quantity.
    Quan,
    /// Currency amount.
    Curr,
    /// Packed decimal.
    Dec,
    /// Floating point.
    Fltp,
    /// 1-byte unsigned integer.
    Int1,
    /// 2-byte signed integer.
    Int2,
    /// 4-byte signed integer.
    Int4,
    /// Calendar date.
    Dats,
    /// Time of day.
    Tims,
    /// Fixed-length byte sequence.
    Raw,
    /// Long byte sequence.
    Lraw,
    /// Variable-length byte string.
    Rawstring,
}

/// Total number of declared data type tags.
pub const DATA_TYPE_COUNT: usize = 21;

/// The rich value shape a data type coerces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Character data.
    Text,
    /// Arbitrary-precision integer.
    Integer,
    /// Arbitrary-precision decimal.
    Decimal,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Byte sequence.
    Bytes,
}

impl ValueKind {
    /// Returns the lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::Time => "time",
            Self::Bytes => "bytes",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DataType {
    /// Returns every data type tag in declaration order.
    pub fn all() -> &'static [DataType] {
        &[
            Self::Char,
            Self::String,
            Self::Lang,
            Self::Clnt,
            Self::Cuky,
            Self::Unit,
            Self::Numc,
            Self::Accp,
            Self::Prec,
            Self::Quan,
            Self::Curr,
            Self::Dec,
            Self::Fltp,
            Self::Int1,
            Self::Int2,
            Self::Int4,
            Self::Dats,
            Self::Tims,
            Self::Raw,
            Self::Lraw,
            Self::Rawstring,
        ]
    }

    /// Returns the uppercase tag as it appears in metadata.
    ///
    /// This matches the serde serialization format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Char => "CHAR",
            Self::String => "STRING",
            Self::Lang => "LANG",
            Self::Clnt => "CLNT",
            Self::Cuky => "CUKY",
            Self::Unit => "UNIT",
            Self::Numc => "NUMC",
            Self::Accp => "ACCP",
            Self::Prec => "PREC",
            Self::Quan => "QUAN",
            Self::Curr => "CURR",
            Self::Dec => "DEC",
            Self::Fltp => "FLTP",
            Self::Int1 => "INT1",
            Self::Int2 => "INT2",
            Self::Int4 => "INT4",
            Self::Dats => "DATS",
            Self::Tims => "TIMS",
            Self::Raw => "RAW",
            Self::Lraw => "LRAW",
            Self::Rawstring => "RAWSTRING",
        }
    }

    /// The rich value kind this tag coerces to.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Char
            | Self::String
            | Self::Lang
            | Self::Clnt
            | Self::Cuky
            | Self::Unit
            | Self::Numc
            | Self::Accp
            | Self::Prec => ValueKind::Text,
            Self::Quan | Self::Curr | Self::Dec | Self::Fltp => ValueKind::Decimal,
            Self::Int1 | Self::Int2 | Self::Int4 => ValueKind::Integer,
            Self::Dats => ValueKind::Date,
            Self::Tims => ValueKind::Time,
            Self::Raw | Self::Lraw | Self::Rawstring => ValueKind::Bytes,
        }
    }

    /// Inclusive value range of the integer tags, `None` for every other tag.
    /// `INT1` is unsigned; `INT2` and `INT4` are signed.
    pub fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            Self::Int1 => Some((0, i64::from(u8::MAX))),
            Self::Int2 => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            Self::Int4 => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = BizdocError;

    /// Parse a tag from its uppercase metadata form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| BizdocError::UnknownDataType(s.to_string()))
    }
}
