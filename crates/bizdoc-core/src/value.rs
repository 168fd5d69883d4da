//! # Field Values
//!
//! `Value` is the tagged union held by segment and structure fields. Each
//! variant corresponds to one [`ValueKind`]; the declared [`DataType`] of a
//! field decides which variant it accepts.
//!
//! [`DataType`]: crate::DataType

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use num_bigint::BigInt;

use crate::coerce::FLTP_RELATIVE_TOLERANCE;
use crate::datatype::ValueKind;

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Character data.
    Text(String),
    /// Arbitrary-precision integer.
    Integer(BigInt),
    /// Arbitrary-precision decimal.
    Decimal(BigDecimal),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day, second precision.
    Time(NaiveTime),
    /// Byte sequence.
    Bytes(Vec<u8>),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Integer(_) => ValueKind::Integer,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Date(_) => ValueKind::Date,
            Self::Time(_) => ValueKind::Time,
            Self::Bytes(_) => ValueKind::Bytes,
        }
    }

    /// Parse a decimal value from text, e.g. `Value::decimal("12.50")`.
    pub fn decimal(text: &str) -> Option<Self> {
        BigDecimal::from_str(text).ok().map(Self::Decimal)
    }

    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Self::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the decimal, if this is a decimal value.
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Self::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Returns the date, if this is a date value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the time, if this is a time value.
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Self::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Returns the bytes, if this is a byte value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Equality with the floating-point tolerance applied to decimals.
    ///
    /// Decimals compare equal when their relative difference is within
    /// [`FLTP_RELATIVE_TOLERANCE`]. All other kinds compare exactly.
    pub fn approx_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Decimal(a), Self::Decimal(b)) => {
                if a == b {
                    return true;
                }
                let (Ok(x), Ok(y)) = (a.to_string().parse::<f64>(), b.to_string().parse::<f64>())
                else {
                    return false;
                };
                let scale = x.abs().max(y.abs());
                (x - y).abs() <= scale * FLTP_RELATIVE_TOLERANCE
            }
            _ => self == other,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(BigInt::from(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(BigInt::from(i))
    }
}

impl From<BigInt> for Value {
    fn from(i: BigInt) -> Self {
        Self::Integer(i)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Self::Time(t)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Self::Bytes(b) => f.write_str(&crate::coerce::encode_hex(b)),
        }
    }
}
