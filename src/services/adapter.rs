//! Typed credential adapters.

use crate::domain::models::{CredentialSchema, ServiceCredentials};
use crate::services::CredentialResolver;

/// A per-service-kind credential adapter: a resolver paired with the
/// declarative schema for one service kind.
///
/// Nothing here panics across the public boundary; a failed resolution or a
/// mapping that does not validate against the schema both surface as `None`.
#[derive(Debug, Clone, Copy)]
pub struct CredentialAdapter<'a> {
    resolver: &'a CredentialResolver,
    schema: &'static CredentialSchema,
}

impl<'a> CredentialAdapter<'a> {
    /// Pair a resolver with a credential schema.
    pub const fn new(resolver: &'a CredentialResolver, schema: &'static CredentialSchema) -> Self {
        Self { resolver, schema }
    }

    /// The schema this adapter validates against.
    pub const fn schema(&self) -> &'static CredentialSchema {
        self.schema
    }

    /// Resolve and validate credentials for a logical service name.
    pub fn credentials(&self, name: &str) -> Option<ServiceCredentials> {
        let mapping = self.resolver.resolve(name)?;
        self.schema.extract(&mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{schemas, Mappings};
    use crate::domain::ports::NullBindings;
    use serde_json::json;
    use tempfile::TempDir;

    fn mongodb_resolver(credentials: &serde_json::Value) -> (TempDir, CredentialResolver) {
        let root = TempDir::new().unwrap();
        std::fs::write(
            root.path().join("creds.json"),
            json!({ "MongoDBKey": credentials }).to_string(),
        )
        .unwrap();

        let mut mappings = Mappings::new();
        mappings.insert("MongoDBKey", vec!["file:creds.json:MongoDBKey".to_string()]);

        let resolver = CredentialResolver::builder()
            .project_root(root.path())
            .mappings(mappings)
            .bindings(Box::new(NullBindings::new()))
            .build()
            .unwrap();

        (root, resolver)
    }

    #[test]
    fn test_credentials_round_trip() {
        let (_root, resolver) = mongodb_resolver(&json!({
            "host": "h",
            "username": "u",
            "password": "p",
            "port": 19889,
            "certificate": "c"
        }));

        let adapter = CredentialAdapter::new(&resolver, &schemas::MONGODB);
        let creds = adapter.credentials("MongoDBKey").unwrap();

        assert_eq!(creds.text("host"), Some("h"));
        assert_eq!(creds.integer("port"), Some(19889));
        assert_eq!(creds.text("certificate"), Some("c"));
    }

    #[test]
    fn test_credentials_mistyped_field_is_absent() {
        let (_root, resolver) = mongodb_resolver(&json!({
            "host": "h",
            "username": "u",
            "password": "p",
            "port": "19889"
        }));

        let adapter = CredentialAdapter::new(&resolver, &schemas::MONGODB);
        assert!(adapter.credentials("MongoDBKey").is_none());
    }

    #[test]
    fn test_credentials_unresolved_name_is_absent() {
        let (_root, resolver) = mongodb_resolver(&json!({ "host": "h" }));

        let adapter = CredentialAdapter::new(&resolver, &schemas::CLOUDANT);
        assert!(adapter.credentials("CloudantKey").is_none());
    }
}
