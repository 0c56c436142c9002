//! Credsource - Service Credential Resolution
//!
//! Credsource resolves service credentials (database connection info, API
//! credentials) for applications deployed across heterogeneous runtime
//! platforms: local files, Cloud Foundry `VCAP_SERVICES`, and
//! Kubernetes-style environment variables. A declarative mapping document
//! lists, per logical service name, an ordered sequence of lookup
//! strategies; resolution evaluates them in order and returns the first
//! non-empty result.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): mapping tree, search patterns, credential
//!   schemas, and the platform-bindings port
//! - **Service Layer** (`services`): the resolver and typed credential
//!   adapters
//! - **Infrastructure Layer** (`infrastructure`): mapping-document loading,
//!   Cloud Foundry bindings, logging bootstrap
//!
//! # Example
//!
//! ```ignore
//! use credsource::{CredentialAdapter, CredentialResolver, schemas};
//!
//! fn main() -> anyhow::Result<()> {
//!     // Loads config/mappings.json and the live platform environment.
//!     let resolver = CredentialResolver::builder().build()?;
//!
//!     let mongodb = CredentialAdapter::new(&resolver, &schemas::MONGODB);
//!     if let Some(creds) = mongodb.credentials("MongoDBKey") {
//!         let _ = (creds.text("host"), creds.integer("port"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    schemas, CredentialSchema, CredentialsMap, FieldKind, FieldSpec, FieldValue, MappingEntry,
    Mappings, PatternError, SearchPattern, ServiceCredentials,
};
pub use domain::ports::{NullBindings, PlatformBindings};
pub use infrastructure::config::{MappingsError, MappingsLoader};
pub use infrastructure::platform::CloudFoundryBindings;
pub use services::{CredentialAdapter, CredentialResolver, ResolverBuilder};
