//! Mapping document infrastructure.
//!
//! Hierarchical mapping-document loading using figment:
//! - JSON/YAML file loading
//! - Local override merging
//! - Mapping validation

pub mod loader;

pub use loader::{MappingsError, MappingsLoader};
