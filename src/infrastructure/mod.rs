//! Infrastructure layer module
//!
//! This module contains all infrastructure adapters and external integrations:
//! - Mapping document loading (figment)
//! - Deployment platform bindings (Cloud Foundry VCAP descriptors)
//! - Logging bootstrap
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod logging;
pub mod platform;
