//! Cloud Foundry service-binding registry.
//!
//! Reads the platform's `VCAP_SERVICES` / `VCAP_APPLICATION` descriptors,
//! either from the live process environment or from a static JSON file used
//! for deterministic resolution in tests and local development.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::models::CredentialsMap;
use crate::domain::ports::PlatformBindings;

/// Environment variable holding the service-binding descriptor.
const VCAP_SERVICES: &str = "VCAP_SERVICES";

/// Environment variable holding the application routing descriptor.
const VCAP_APPLICATION: &str = "VCAP_APPLICATION";

/// Port assumed when the application descriptor carries none.
const DEFAULT_PORT: u16 = 8080;

/// One bound service instance within `VCAP_SERVICES`.
#[derive(Debug, Clone, Default, Deserialize)]
struct ServiceInstance {
    #[serde(default)]
    name: String,

    #[serde(default)]
    label: Option<String>,

    #[serde(default)]
    tags: Vec<String>,

    #[serde(default)]
    credentials: CredentialsMap,
}

/// The `VCAP_APPLICATION` routing descriptor. Real platforms emit both
/// `uris` and `application_uris`; either is accepted.
#[derive(Debug, Clone, Default, Deserialize)]
struct ApplicationDescriptor {
    #[serde(default)]
    port: Option<u16>,

    #[serde(default)]
    uris: Vec<String>,

    #[serde(default)]
    application_uris: Vec<String>,
}

impl ApplicationDescriptor {
    fn first_uri(&self) -> Option<&str> {
        self.uris
            .first()
            .or_else(|| self.application_uris.first())
            .map(String::as_str)
    }
}

/// Service-binding registry backed by Cloud Foundry descriptors.
///
/// Built once at resolver construction; every lookup afterwards is a pure
/// read over the parsed descriptors.
#[derive(Debug, Clone, Default)]
pub struct CloudFoundryBindings {
    services: HashMap<String, Vec<ServiceInstance>>,
    application: Option<ApplicationDescriptor>,
}

impl CloudFoundryBindings {
    /// Build the registry from the live process environment.
    ///
    /// An unset or unparsable descriptor yields an empty registry rather
    /// than an error: running outside Cloud Foundry is a legitimate
    /// deployment, and the resolver treats an empty registry as a backend
    /// miss.
    pub fn from_env() -> Self {
        let services = env::var(VCAP_SERVICES)
            .ok()
            .and_then(|raw| parse_services(&serde_json::from_str(&raw).ok()?))
            .unwrap_or_default();

        let application = env::var(VCAP_APPLICATION)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok());

        if services.is_empty() {
            debug!("no service bindings found in process environment");
        }

        Self {
            services,
            application,
        }
    }

    /// Build the registry from a static descriptor file.
    ///
    /// The file is a JSON document keyed by the descriptor names, e.g.
    /// `{"VCAP_SERVICES": {...}, "VCAP_APPLICATION": {...}}`. Each section
    /// may be a JSON object or a string containing encoded JSON (the form
    /// the variables take in a captured environment dump). Unlike the
    /// environment-backed constructor, a file that cannot be read or parsed
    /// is an error: a designated override file is deliberate configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read bindings file {}", path.display()))?;
        let document: Value = serde_json::from_str(&raw)
            .with_context(|| format!("bindings file {} is not valid JSON", path.display()))?;

        let services = document
            .get(VCAP_SERVICES)
            .and_then(decode_section)
            .and_then(|section| parse_services(&section))
            .unwrap_or_default();

        let application = document
            .get(VCAP_APPLICATION)
            .and_then(decode_section)
            .and_then(|section| serde_json::from_value(section).ok());

        Ok(Self {
            services,
            application,
        })
    }

    fn instances(&self) -> impl Iterator<Item = &ServiceInstance> {
        self.services.values().flatten()
    }
}

impl PlatformBindings for CloudFoundryBindings {
    fn port(&self) -> Option<u16> {
        self.application
            .as_ref()
            .map(|app| app.port.unwrap_or(DEFAULT_PORT))
    }

    fn url(&self) -> Option<String> {
        self.application
            .as_ref()
            .and_then(ApplicationDescriptor::first_uri)
            .map(|uri| format!("https://{uri}"))
    }

    fn service_credentials(&self, spec: &str) -> Option<CredentialsMap> {
        // Instance name is the most specific match, then label, then tags.
        let matched = self
            .instances()
            .find(|instance| instance.name == spec)
            .or_else(|| {
                self.instances()
                    .find(|instance| instance.label.as_deref() == Some(spec))
            })
            .or_else(|| {
                self.instances()
                    .find(|instance| instance.tags.iter().any(|tag| tag == spec))
            });

        match matched {
            Some(instance) => Some(instance.credentials.clone()),
            None => {
                debug!(spec, "no bound service matched");
                None
            }
        }
    }
}

/// A descriptor section is either inline JSON or a string of encoded JSON.
fn decode_section(value: &Value) -> Option<Value> {
    match value {
        Value::String(raw) => serde_json::from_str(raw).ok(),
        other => Some(other.clone()),
    }
}

fn parse_services(section: &Value) -> Option<HashMap<String, Vec<ServiceInstance>>> {
    serde_json::from_value(section.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_services() -> Value {
        json!({
            "compose-for-mongodb": [{
                "name": "my-mongodb",
                "label": "compose-for-mongodb",
                "tags": ["database", "mongodb"],
                "credentials": {
                    "host": "bluemix-sandbox-dal-9-portal.4.dblayer.com",
                    "port": 19889,
                    "username": "username",
                    "password": "password"
                }
            }],
            "cloudantNoSQLDB": [{
                "name": "my-cloudant",
                "label": "cloudantNoSQLDB",
                "tags": ["data_management"],
                "credentials": {
                    "host": "account.cloudant.com",
                    "username": "u",
                    "password": "p",
                    "url": "https://account.cloudant.com"
                }
            }]
        })
    }

    fn bindings_file(document: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{document}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_match_by_name() {
        let file = bindings_file(&json!({ "VCAP_SERVICES": sample_services() }));
        let bindings = CloudFoundryBindings::from_file(file.path()).unwrap();

        let creds = bindings.service_credentials("my-mongodb").unwrap();
        assert_eq!(creds.get("port").and_then(Value::as_i64), Some(19889));
    }

    #[test]
    fn test_match_by_label() {
        let file = bindings_file(&json!({ "VCAP_SERVICES": sample_services() }));
        let bindings = CloudFoundryBindings::from_file(file.path()).unwrap();

        let creds = bindings.service_credentials("cloudantNoSQLDB").unwrap();
        assert_eq!(
            creds.get("url").and_then(Value::as_str),
            Some("https://account.cloudant.com")
        );
    }

    #[test]
    fn test_match_by_tag() {
        let file = bindings_file(&json!({ "VCAP_SERVICES": sample_services() }));
        let bindings = CloudFoundryBindings::from_file(file.path()).unwrap();

        let creds = bindings.service_credentials("mongodb").unwrap();
        assert_eq!(
            creds.get("host").and_then(Value::as_str),
            Some("bluemix-sandbox-dal-9-portal.4.dblayer.com")
        );
    }

    #[test]
    fn test_unmatched_spec() {
        let file = bindings_file(&json!({ "VCAP_SERVICES": sample_services() }));
        let bindings = CloudFoundryBindings::from_file(file.path()).unwrap();

        assert!(bindings.service_credentials("postgresql").is_none());
    }

    #[test]
    fn test_string_encoded_sections() {
        let document = json!({
            "VCAP_SERVICES": sample_services().to_string(),
            "VCAP_APPLICATION": json!({ "uris": ["app.example.com"] }).to_string()
        });
        let file = bindings_file(&document);
        let bindings = CloudFoundryBindings::from_file(file.path()).unwrap();

        assert!(bindings.service_credentials("my-mongodb").is_some());
        assert_eq!(bindings.url(), Some("https://app.example.com".to_string()));
    }

    #[test]
    fn test_application_port_default() {
        let file = bindings_file(&json!({
            "VCAP_APPLICATION": { "uris": ["app.example.com"] }
        }));
        let bindings = CloudFoundryBindings::from_file(file.path()).unwrap();

        assert_eq!(bindings.port(), Some(DEFAULT_PORT));
    }

    #[test]
    fn test_application_explicit_port_and_application_uris() {
        let file = bindings_file(&json!({
            "VCAP_APPLICATION": { "port": 61023, "application_uris": ["app.example.com"] }
        }));
        let bindings = CloudFoundryBindings::from_file(file.path()).unwrap();

        assert_eq!(bindings.port(), Some(61023));
        assert_eq!(bindings.url(), Some("https://app.example.com".to_string()));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(CloudFoundryBindings::from_file("/nonexistent/vcap.json").is_err());
    }

    #[test]
    fn test_empty_document_yields_empty_registry() {
        let file = bindings_file(&json!({}));
        let bindings = CloudFoundryBindings::from_file(file.path()).unwrap();

        assert!(bindings.service_credentials("anything").is_none());
        assert_eq!(bindings.port(), None);
        assert_eq!(bindings.url(), None);
    }
}
