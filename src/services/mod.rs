//! Service layer: the resolver and the typed credential adapter.

pub mod adapter;
pub mod resolver;

pub use adapter::CredentialAdapter;
pub use resolver::{CredentialResolver, ResolverBuilder};
