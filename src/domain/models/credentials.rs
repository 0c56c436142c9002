//! Credential schemas and typed credential values.
//!
//! A successful lookup yields a [`CredentialsMap`]: untyped string keys and
//! heterogeneous JSON values. Per-service-kind adapters are expressed as
//! declarative [`CredentialSchema`] values rather than one type per service,
//! so adding a service kind means adding a schema constant, not code.

use std::collections::BTreeMap;

use serde_json::Value;

/// Generic credentials mapping returned by a successful strategy evaluation,
/// before any field validation.
pub type CredentialsMap = serde_json::Map<String, Value>;

/// Expected JSON type of a credential field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A JSON string.
    Text,
    /// A JSON integer.
    Integer,
}

/// One field in a credential schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key to look up in the generic credentials mapping.
    pub name: &'static str,
    /// Expected JSON type of the value.
    pub kind: FieldKind,
    /// Whether extraction fails when the field is missing.
    pub required: bool,
}

impl FieldSpec {
    /// A field that must be present and well-typed.
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    /// A field that may be absent. When present it must still be well-typed.
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// A validated credential field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// String-valued field (host, username, password, url, certificate).
    Text(String),
    /// Integer-valued field (port).
    Integer(i64),
}

/// Declarative per-service-kind credential schema.
///
/// Extraction validates each declared field against the generic mapping and
/// either yields a complete [`ServiceCredentials`] or nothing at all; no
/// partially populated value is ever produced.
#[derive(Debug, Clone, Copy)]
pub struct CredentialSchema {
    /// Service kind this schema describes, e.g. `"mongodb"`.
    pub service: &'static str,
    /// Declared fields, required and optional.
    pub fields: &'static [FieldSpec],
}

impl CredentialSchema {
    /// Validate `map` against this schema.
    ///
    /// Returns `None` when a required field is missing, or when any declared
    /// field (required or optional) is present with the wrong JSON type.
    /// Missing optional fields are simply absent from the result.
    pub fn extract(&self, map: &CredentialsMap) -> Option<ServiceCredentials> {
        let mut values = BTreeMap::new();

        for field in self.fields {
            let Some(raw) = map.get(field.name) else {
                if field.required {
                    tracing::debug!(
                        service = self.service,
                        field = field.name,
                        "required credential field missing"
                    );
                    return None;
                }
                continue;
            };

            let value = match field.kind {
                FieldKind::Text => raw.as_str().map(|s| FieldValue::Text(s.to_string())),
                FieldKind::Integer => raw.as_i64().map(FieldValue::Integer),
            };

            match value {
                Some(value) => {
                    values.insert(field.name.to_string(), value);
                }
                None => {
                    tracing::debug!(
                        service = self.service,
                        field = field.name,
                        "credential field has unexpected type"
                    );
                    return None;
                }
            }
        }

        Some(ServiceCredentials {
            service: self.service.to_string(),
            values,
        })
    }
}

/// Validated, typed credentials for a specific service kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCredentials {
    service: String,
    values: BTreeMap<String, FieldValue>,
}

impl ServiceCredentials {
    /// Service kind these credentials were validated against.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// A string-valued field, or `None` when absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            FieldValue::Text(s) => Some(s),
            FieldValue::Integer(_) => None,
        }
    }

    /// An integer-valued field, or `None` when absent.
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Whether the named field was present in the source mapping.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// Schema constants for the supported service kinds.
pub mod schemas {
    use super::{CredentialSchema, FieldKind, FieldSpec};

    /// MongoDB (e.g. Compose for MongoDB) connection credentials.
    pub const MONGODB: CredentialSchema = CredentialSchema {
        service: "mongodb",
        fields: &[
            FieldSpec::required("host", FieldKind::Text),
            FieldSpec::required("username", FieldKind::Text),
            FieldSpec::required("password", FieldKind::Text),
            FieldSpec::required("port", FieldKind::Integer),
            FieldSpec::optional("certificate", FieldKind::Text),
        ],
    };

    /// Cloudant NoSQL DB credentials.
    pub const CLOUDANT: CredentialSchema = CredentialSchema {
        service: "cloudant",
        fields: &[
            FieldSpec::required("host", FieldKind::Text),
            FieldSpec::required("username", FieldKind::Text),
            FieldSpec::required("password", FieldKind::Text),
            FieldSpec::required("url", FieldKind::Text),
            FieldSpec::optional("port", FieldKind::Integer),
        ],
    };

    /// Redis (e.g. Compose for Redis) connection credentials.
    pub const REDIS: CredentialSchema = CredentialSchema {
        service: "redis",
        fields: &[
            FieldSpec::required("host", FieldKind::Text),
            FieldSpec::required("password", FieldKind::Text),
            FieldSpec::required("port", FieldKind::Integer),
            FieldSpec::optional("certificate", FieldKind::Text),
        ],
    };

    /// Natural Language Understanding service credentials.
    pub const NATURAL_LANGUAGE_UNDERSTANDING: CredentialSchema = CredentialSchema {
        service: "natural-language-understanding",
        fields: &[
            FieldSpec::required("username", FieldKind::Text),
            FieldSpec::required("password", FieldKind::Text),
            FieldSpec::required("url", FieldKind::Text),
        ],
    };
}
