//! # Type Coercion Engine
//!
//! The single mapping between wire strings and rich [`Value`]s. The XML codec
//! and the native-call adapter both route every field through [`encode`] and
//! [`decode`], which is what makes a document built from XML behaviorally
//! indistinguishable from one built from a native connector.
//!
//! ## Rules
//!
//! | Kind | Encode | Decode |
//! |------|--------|--------|
//! | Text | identity, truncated to `length` characters when `length > 0` | identity, never re-padded |
//! | Decimal (QUAN, CURR, DEC) | plain decimal text, precision checked against `length`/`decimals` | exact parse, same checks |
//! | Decimal (FLTP) | shortest `f64` form with `E` exponent | parse, within [`FLTP_RELATIVE_TOLERANCE`] |
//! | Integer | decimal text, range checked per tag | parse, range checked |
//! | Date | `YYYYMMDD` | exactly 8 digits |
//! | Time | `HHMMSS` | exactly 6 digits |
//! | Bytes | uppercase hex | case-insensitive hex, even length |
//!
//! ## Empty wire strings
//!
//! [`decode_wire`] is the entry point for both decoders. An empty wire string
//! decodes to an empty value for text and byte kinds, whose encoded form can
//! be empty. For every other kind it means the field is unset.
//!
//! Coercion is a pure function of `(FieldFormat, input)`. It never consults
//! external state and never truncates non-text values; a value that does not
//! fit is refused with a [`CoercionError`].

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use num_bigint::BigInt;

use crate::datatype::{DataType, ValueKind};
use crate::error::CoercionError;
use crate::value::Value;

/// Relative tolerance applied when comparing `FLTP` values after a round trip.
pub const FLTP_RELATIVE_TOLERANCE: f64 = 1e-15;

/// Largest decimal exponent rendered in plain (non-exponent) form.
const MAX_PLAIN_EXPONENT: u64 = 4096;

/// The part of a field declaration that coercion depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldFormat {
    /// Declared wire type.
    pub data_type: DataType,
    /// Declared length in characters (text), digits (decimals) or bytes (raw).
    /// Zero means unbounded.
    pub length: usize,
    /// Declared number of fractional digits for `QUAN`/`CURR`/`DEC`.
    pub decimals: u32,
}

impl FieldFormat {
    /// An unbounded format for the given type.
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            length: 0,
            decimals: 0,
        }
    }

    /// Set the declared length.
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Set the declared number of fractional digits.
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }
}

/// Encode a value to its wire string.
///
/// # Errors
///
/// - `KindMismatch` if the value's kind does not match the declared type.
/// - `OutOfRange` if the value exceeds the declared precision, range, or length.
pub fn encode(format: &FieldFormat, value: &Value) -> Result<String, CoercionError> {
    let expected = format.data_type.kind();
    if value.kind() != expected {
        return Err(CoercionError::KindMismatch {
            data_type: format.data_type,
            expected,
            actual: value.kind(),
        });
    }

    match value {
        Value::Text(s) => Ok(truncate_chars(s, format.length)),
        Value::Decimal(d) if format.data_type == DataType::Fltp => encode_float(d),
        Value::Decimal(d) => {
            check_decimal_precision(format, d)?;
            Ok(plain_decimal(d))
        }
        Value::Integer(i) => {
            check_integer_range(format.data_type, i)?;
            Ok(i.to_string())
        }
        Value::Date(d) => encode_date(d),
        Value::Time(t) => encode_time(t),
        Value::Bytes(b) => {
            check_byte_length(format, b.len())?;
            Ok(encode_hex(b))
        }
    }
}

/// Decode a wire string to a value of the declared type.
///
/// # Errors
///
/// - `InvalidText` if the text cannot be parsed as the declared type.
/// - `OutOfRange` if the parsed value exceeds the declared precision or range.
pub fn decode(format: &FieldFormat, text: &str) -> Result<Value, CoercionError> {
    let data_type = format.data_type;
    match data_type.kind() {
        ValueKind::Text => Ok(Value::Text(text.to_string())),
        ValueKind::Decimal => {
            let d = BigDecimal::from_str(text.trim())
                .map_err(|e| invalid(data_type, text, e.to_string()))?;
            if data_type == DataType::Fltp {
                check_float(&d)?;
            } else {
                check_decimal_precision(format, &d)?;
            }
            Ok(Value::Decimal(d))
        }
        ValueKind::Integer => {
            let i = BigInt::from_str(text.trim())
                .map_err(|e| invalid(data_type, text, e.to_string()))?;
            check_integer_range(data_type, &i)?;
            Ok(Value::Integer(i))
        }
        ValueKind::Date => decode_date(text).map(Value::Date),
        ValueKind::Time => decode_time(text).map(Value::Time),
        ValueKind::Bytes => {
            let bytes = decode_hex(text).map_err(|e| invalid(data_type, text, e.to_string()))?;
            check_byte_length(format, bytes.len())?;
            Ok(Value::Bytes(bytes))
        }
    }
}

/// Decode a field's wire string, treating empty text as unset where the
/// declared kind has no empty value.
///
/// # Errors
///
/// As [`decode`].
pub fn decode_wire(format: &FieldFormat, text: &str) -> Result<Option<Value>, CoercionError> {
    match format.data_type.kind() {
        ValueKind::Text | ValueKind::Bytes => decode(format, text).map(Some),
        _ if text.is_empty() => Ok(None),
        _ => decode(format, text).map(Some),
    }
}

/// Render bytes as uppercase hex, two digits per byte, no separators.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Parse hex text (either case) into bytes.
///
/// # Errors
///
/// Returns an error for odd-length input or non-hex characters.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(text)
}

fn invalid(data_type: DataType, text: &str, reason: impl Into<String>) -> CoercionError {
    CoercionError::InvalidText {
        data_type,
        text: text.to_string(),
        reason: reason.into(),
    }
}

fn out_of_range(data_type: DataType, value: impl ToString, reason: impl Into<String>) -> CoercionError {
    CoercionError::OutOfRange {
        data_type,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn truncate_chars(s: &str, length: usize) -> String {
    if length == 0 {
        return s.to_string();
    }
    match s.char_indices().nth(length) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

// ─── Numbers ────────────────────────────────────────────────────────

fn check_integer_range(data_type: DataType, value: &BigInt) -> Result<(), CoercionError> {
    let Some((min, max)) = data_type.integer_range() else {
        return Ok(());
    };
    match i64::try_from(value) {
        Ok(v) if (min..=max).contains(&v) => Ok(()),
        _ => Err(out_of_range(
            data_type,
            value,
            format!("must be within {min}..={max}"),
        )),
    }
}

/// Digits before and after the decimal point of a normalized decimal.
fn decimal_digits(d: &BigDecimal) -> (u64, u64) {
    let (mantissa, scale) = d.normalized().as_bigint_and_exponent();
    let text = mantissa.to_string();
    let magnitude = text.trim_start_matches('-');
    if magnitude == "0" {
        return (0, 0);
    }
    let len = magnitude.len() as u64;
    if scale >= 0 {
        let scale = scale.unsigned_abs();
        (len.saturating_sub(scale), scale)
    } else {
        (len + scale.unsigned_abs(), 0)
    }
}

fn check_decimal_precision(format: &FieldFormat, d: &BigDecimal) -> Result<(), CoercionError> {
    let (_, exponent) = d.as_bigint_and_exponent();
    if exponent.unsigned_abs() > MAX_PLAIN_EXPONENT {
        return Err(out_of_range(format.data_type, d, "exponent too large"));
    }
    if format.length == 0 {
        return Ok(());
    }
    let (integer_digits, fraction_digits) = decimal_digits(d);
    let decimals = u64::from(format.decimals);
    if fraction_digits > decimals {
        return Err(out_of_range(
            format.data_type,
            d,
            format!("{fraction_digits} fractional digits exceed declared {decimals}"),
        ));
    }
    let max_integer = (format.length as u64).saturating_sub(decimals);
    if integer_digits > max_integer {
        return Err(out_of_range(
            format.data_type,
            d,
            format!("{integer_digits} integer digits exceed declared {max_integer}"),
        ));
    }
    Ok(())
}

/// Render a decimal without exponent notation, keeping its scale.
fn plain_decimal(d: &BigDecimal) -> String {
    let (mantissa, scale) = d.as_bigint_and_exponent();
    let text = mantissa.to_string();
    let (negative, magnitude) = match text.strip_prefix('-') {
        Some(m) => (true, m),
        None => (false, text.as_str()),
    };

    let mut out = String::with_capacity(magnitude.len() + 2);
    if negative {
        out.push('-');
    }
    if scale <= 0 {
        out.push_str(magnitude);
        if magnitude != "0" {
            let zeros = scale.unsigned_abs() as usize;
            out.extend(std::iter::repeat('0').take(zeros));
        }
    } else {
        let scale = scale.unsigned_abs() as usize;
        if magnitude.len() > scale {
            let split = magnitude.len() - scale;
            out.push_str(&magnitude[..split]);
            out.push('.');
            out.push_str(&magnitude[split..]);
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take(scale - magnitude.len()));
            out.push_str(magnitude);
        }
    }
    out
}

fn to_float(d: &BigDecimal) -> Result<f64, CoercionError> {
    let text = d.to_string();
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f),
        _ => Err(out_of_range(DataType::Fltp, &text, "not representable as a float")),
    }
}

fn check_float(d: &BigDecimal) -> Result<(), CoercionError> {
    to_float(d).map(|_| ())
}

fn encode_float(d: &BigDecimal) -> Result<String, CoercionError> {
    let f = to_float(d)?;
    Ok(format!("{f:E}"))
}

// ─── Dates and times ────────────────────────────────────────────────

fn all_digits(text: &str, len: usize) -> bool {
    text.len() == len && text.bytes().all(|b| b.is_ascii_digit())
}

fn encode_date(d: &NaiveDate) -> Result<String, CoercionError> {
    if !(0..=9999).contains(&d.year()) {
        return Err(out_of_range(DataType::Dats, d, "year must be within 0..=9999"));
    }
    Ok(d.format("%Y%m%d").to_string())
}

fn decode_date(text: &str) -> Result<NaiveDate, CoercionError> {
    if !all_digits(text, 8) {
        return Err(invalid(DataType::Dats, text, "expected 8 digits YYYYMMDD"));
    }
    // All-ASCII digits, so byte slicing is safe and the parses cannot fail.
    let year: i32 = text[0..4].parse().unwrap_or_default();
    let month: u32 = text[4..6].parse().unwrap_or_default();
    let day: u32 = text[6..8].parse().unwrap_or_default();
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| invalid(DataType::Dats, text, "not a calendar date"))
}

fn encode_time(t: &NaiveTime) -> Result<String, CoercionError> {
    if t.nanosecond() != 0 {
        return Err(out_of_range(
            DataType::Tims,
            t,
            "sub-second precision is not representable",
        ));
    }
    Ok(t.format("%H%M%S").to_string())
}

fn decode_time(text: &str) -> Result<NaiveTime, CoercionError> {
    if !all_digits(text, 6) {
        return Err(invalid(DataType::Tims, text, "expected 6 digits HHMMSS"));
    }
    let hour: u32 = text[0..2].parse().unwrap_or_default();
    let minute: u32 = text[2..4].parse().unwrap_or_default();
    let second: u32 = text[4..6].parse().unwrap_or_default();
    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| invalid(DataType::Tims, text, "not a time of day"))
}

// ─── Bytes ──────────────────────────────────────────────────────────

fn check_byte_length(format: &FieldFormat, len: usize) -> Result<(), CoercionError> {
    if format.data_type == DataType::Raw && format.length > 0 && len > format.length {
        return Err(out_of_range(
            format.data_type,
            format!("{len} bytes"),
            format!("declared length is {} bytes", format.length),
        ));
    }
    Ok(())
}
