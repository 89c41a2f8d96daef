//! Loosely-shaped WHOIS records.
//!
//! Registries disagree on which fields they publish and how often a field
//! repeats, so a raw record maps each canonical key to a [`FieldValue`] that
//! may be absent, a single value, or a list. The normalizer turns this into
//! the fixed-shape `DomainResult`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical keys a WHOIS client may populate.
pub mod keys {
    pub const REGISTRAR: &str = "registrar";
    pub const CREATION_DATE: &str = "creation_date";
    pub const EXPIRATION_DATE: &str = "expiration_date";
    pub const UPDATED_DATE: &str = "updated_date";
    pub const NAME_SERVERS: &str = "name_servers";
    pub const STATUS: &str = "status";
    pub const NAME: &str = "name";
    pub const ORG: &str = "org";
    pub const COUNTRY: &str = "country";
    pub const ADMIN_EMAIL: &str = "admin_email";
    pub const TECH_EMAIL: &str = "tech_email";
}

/// A single field of a raw record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Absent,
    Scalar(String),
    Sequence(Vec<String>),
}

impl FieldValue {
    /// Append a value, promoting a scalar to a sequence on the second value.
    pub fn push(&mut self, value: String) {
        *self = match std::mem::take(self) {
            FieldValue::Absent => FieldValue::Scalar(value),
            FieldValue::Scalar(first) => FieldValue::Sequence(vec![first, value]),
            FieldValue::Sequence(mut values) => {
                values.push(value);
                FieldValue::Sequence(values)
            }
        };
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::Sequence(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::Sequence(values.into_iter().map(str::to_string).collect())
    }
}

/// A semi-structured WHOIS record keyed by canonical field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: HashMap<String, FieldValue>,
}

/// WHOIS labels, lowercased, mapped to canonical keys. Labels must match
/// exactly; anything not listed is dropped.
const LABEL_ALIASES: &[(&str, &str)] = &[
    ("registrar registration expiration date", keys::EXPIRATION_DATE),
    ("sponsoring registrar", keys::REGISTRAR),
    ("registrar name", keys::REGISTRAR),
    ("registrar", keys::REGISTRAR),
    ("creation date", keys::CREATION_DATE),
    ("created on", keys::CREATION_DATE),
    ("created", keys::CREATION_DATE),
    ("registered on", keys::CREATION_DATE),
    ("registration time", keys::CREATION_DATE),
    ("registry expiry date", keys::EXPIRATION_DATE),
    ("expiration date", keys::EXPIRATION_DATE),
    ("expiry date", keys::EXPIRATION_DATE),
    ("expires on", keys::EXPIRATION_DATE),
    ("expires", keys::EXPIRATION_DATE),
    ("paid-till", keys::EXPIRATION_DATE),
    ("updated date", keys::UPDATED_DATE),
    ("last updated", keys::UPDATED_DATE),
    ("last modified", keys::UPDATED_DATE),
    ("changed", keys::UPDATED_DATE),
    ("name server", keys::NAME_SERVERS),
    ("nameserver", keys::NAME_SERVERS),
    ("nserver", keys::NAME_SERVERS),
    ("domain status", keys::STATUS),
    ("status", keys::STATUS),
    ("registrant name", keys::NAME),
    ("registrant organization", keys::ORG),
    ("registrant organisation", keys::ORG),
    ("registrant country", keys::COUNTRY),
    ("admin email", keys::ADMIN_EMAIL),
    ("tech email", keys::TECH_EMAIL),
];

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for clients and tests.
    pub fn with<V: Into<FieldValue>>(mut self, key: &str, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Replace the value stored under `key`.
    pub fn insert<V: Into<FieldValue>>(&mut self, key: &str, value: V) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Append a value under `key`, keeping earlier ones.
    pub fn append(&mut self, key: &str, value: String) {
        self.fields.entry(key.to_string()).or_default().push(value);
    }

    /// Look up a field; missing keys read as [`FieldValue::Absent`].
    pub fn get(&self, key: &str) -> &FieldValue {
        static ABSENT: FieldValue = FieldValue::Absent;
        self.fields.get(key).unwrap_or(&ABSENT)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(FieldValue::is_absent)
    }

    /// Fill keys missing from `self` with values from `fallback`.
    ///
    /// Used when a registrar reply (thick) is layered over a registry reply (thin).
    pub fn merge_missing(&mut self, fallback: RawRecord) {
        for (key, value) in fallback.fields {
            let slot = self.fields.entry(key).or_default();
            if slot.is_absent() {
                *slot = value;
            }
        }
    }

    /// Collect `Label: value` lines from a WHOIS text reply.
    ///
    /// Only the labels in the alias table are kept. Values are stored verbatim;
    /// no date or status interpretation happens here.
    pub fn from_whois_text(text: &str) -> Self {
        let mut record = RawRecord::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') || line.starts_with('#') {
                continue;
            }
            // ICANN replies end with a legal notice after this marker
            if line.starts_with(">>>") {
                break;
            }

            let Some((label, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            let label = label.trim().to_lowercase();
            if let Some((_, key)) = LABEL_ALIASES.iter().find(|(alias, _)| *alias == label) {
                record.append(key, value.to_string());
            }
        }

        record
    }
}
