//! Domain models: the mapping tree, search patterns, and credential types.

pub mod credentials;
pub mod mappings;

pub use credentials::{
    schemas, CredentialSchema, CredentialsMap, FieldKind, FieldSpec, FieldValue,
    ServiceCredentials,
};
pub use mappings::{MappingEntry, Mappings, PatternError, SearchPattern};
