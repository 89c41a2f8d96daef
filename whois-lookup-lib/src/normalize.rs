//! Record normalization.
//!
//! Converts a [`RawRecord`] of variable shape into a fixed-shape
//! [`DomainResult`]. Every field is extracted independently and falls back to
//! its default, so normalization cannot fail.

use crate::record::{keys, FieldValue, RawRecord};
use crate::types::DomainResult;

/// How a field's raw value should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// One value; lists contribute their first element
    Single,
    /// Ordered list; a lone scalar becomes a one-element list
    List,
}

/// Extracted value of one field.
enum Extracted {
    Single(Option<String>),
    List(Vec<String>),
}

/// The one place that matches on `FieldValue`.
fn extract(value: &FieldValue, shape: Shape) -> Extracted {
    let non_empty = |s: &String| !s.trim().is_empty();

    match (shape, value) {
        (Shape::Single, FieldValue::Scalar(s)) => {
            Extracted::Single(Some(s.clone()).filter(non_empty))
        }
        (Shape::Single, FieldValue::Sequence(values)) => {
            Extracted::Single(values.first().cloned().filter(non_empty))
        }
        (Shape::Single, FieldValue::Absent) => Extracted::Single(None),
        (Shape::List, FieldValue::Scalar(s)) if non_empty(s) => {
            Extracted::List(vec![s.clone()])
        }
        (Shape::List, FieldValue::Sequence(values)) => {
            Extracted::List(values.iter().filter(|v| non_empty(*v)).cloned().collect())
        }
        (Shape::List, _) => Extracted::List(Vec::new()),
    }
}

/// Read a single-valued field (dates, registrar, contacts).
///
/// Dates stay opaque strings; registries disagree on format.
pub fn extract_single(value: &FieldValue) -> Option<String> {
    match extract(value, Shape::Single) {
        Extracted::Single(value) => value,
        Extracted::List(_) => None,
    }
}

/// Read a list-like field (name servers, status).
pub fn extract_list(value: &FieldValue) -> Vec<String> {
    match extract(value, Shape::List) {
        Extracted::List(values) => values,
        Extracted::Single(_) => Vec::new(),
    }
}

/// Build the success-path `DomainResult` for `domain` from a raw record.
///
/// `error` is always `None` here; failures are attached by the lookup worker.
pub fn normalize(domain: &str, record: &RawRecord) -> DomainResult {
    let single = |key: &str| extract_single(record.get(key));
    let list = |key: &str| extract_list(record.get(key));

    DomainResult {
        domain: domain.to_string(),
        registrar: single(keys::REGISTRAR),
        creation_date: single(keys::CREATION_DATE),
        expiration_date: single(keys::EXPIRATION_DATE),
        updated_date: single(keys::UPDATED_DATE),
        name_servers: list(keys::NAME_SERVERS),
        status: list(keys::STATUS),
        registrant_name: single(keys::NAME),
        registrant_organization: single(keys::ORG),
        registrant_country: single(keys::COUNTRY),
        admin_email: single(keys::ADMIN_EMAIL),
        tech_email: single(keys::TECH_EMAIL),
        error: None,
    }
}
