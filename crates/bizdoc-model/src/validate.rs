//! # Structural Validation
//!
//! The model enforces field types and maximum occurrences as it is built.
//! Constraints that only hold for a finished message are checked on demand:
//!
//! - minimum occurrence and mandatory child segments;
//! - value enumerations declared on fields (checked against the wire form);
//! - values the declared length or precision cannot represent.
//!
//! Violations are collected rather than returned on the first failure.

use std::fmt;

use bizdoc_core::{coerce, Value};
use bizdoc_registry::{FieldMeta, MemberMeta};

use crate::document::Document;
use crate::segment::SegmentRef;
use crate::structure::Structure;

/// A single violation with the path of the offending element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Path to the segment or structure, e.g. `/ROOT/E1EDK01[0]`.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}: {}", self.path, self.message)
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }

    fn push(&mut self, path: &str, message: String) {
        self.violations.push(Violation {
            path: path.to_string(),
            message,
        });
    }

    fn check_field(&mut self, path: &str, field: &FieldMeta, value: &Value) {
        match coerce::encode(&field.format(), value) {
            Ok(wire) if !field.allows(&wire) => self.push(
                path,
                format!("field {}: {wire:?} is not one of {:?}", field.name, field.values),
            ),
            Ok(_) => {}
            Err(e) => self.push(path, format!("field {}: {e}", field.name)),
        }
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl Document {
    /// Check the finished document against its registry metadata.
    pub fn validate(&self) -> ValidationViolations {
        let mut out = ValidationViolations::default();
        validate_segment(self.root(), "/ROOT", &mut out);
        out
    }
}

fn validate_segment(segment: SegmentRef<'_>, path: &str, out: &mut ValidationViolations) {
    for (field, value) in segment.fields() {
        out.check_field(path, field, value);
    }

    for child in &segment.meta().children {
        let count = segment
            .children()
            .filter(|c| c.segment_type() == child.segment_type)
            .count() as u64;
        let required = child.min_occurrence.max(u64::from(child.mandatory));
        if count < required {
            out.push(
                path,
                format!(
                    "child {} occurs {count} times, at least {required} required",
                    child.segment_type
                ),
            );
        }
        if count > child.max_occurrence {
            out.push(
                path,
                format!(
                    "child {} occurs {count} times, at most {} allowed",
                    child.segment_type, child.max_occurrence
                ),
            );
        }
    }

    let mut seen: Vec<(&str, usize)> = Vec::new();
    for child in segment.children() {
        let segment_type = child.segment_type();
        let index = match seen.iter_mut().find(|(t, _)| *t == segment_type) {
            Some((_, n)) => {
                *n += 1;
                *n - 1
            }
            None => {
                seen.push((segment_type, 1));
                0
            }
        };
        let child_path = format!("{path}/{segment_type}[{index}]");
        validate_segment(child, &child_path, out);
    }
}

impl Structure {
    /// Check every populated value against its declared enumeration and
    /// representable range, recursing into nested structures and tables.
    pub fn validate(&self) -> ValidationViolations {
        let mut out = ValidationViolations::default();
        validate_structure(self, &format!("/{}", self.name()), &mut out);
        out
    }
}

fn validate_structure(structure: &Structure, path: &str, out: &mut ValidationViolations) {
    for (field, value) in structure.fields() {
        out.check_field(path, field, value);
    }
    for member in &structure.meta().members {
        match member {
            MemberMeta::Field(_) => {}
            MemberMeta::Structure { name, .. } => {
                if let Ok(Some(nested)) = structure.structure(name) {
                    validate_structure(nested, &format!("{path}/{name}"), out);
                }
            }
            MemberMeta::Table { name, .. } => {
                if let Ok(Some(table)) = structure.table(name) {
                    for (i, row) in table.rows().iter().enumerate() {
                        validate_structure(row, &format!("{path}/{name}[{i}]"), out);
                    }
                }
            }
        }
    }
}
