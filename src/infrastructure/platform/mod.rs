//! Deployment platform adapters.
//!
//! Implementations of the `PlatformBindings` port over real platform
//! descriptors, currently Cloud Foundry's VCAP environment.

pub mod cloud_foundry;

pub use cloud_foundry::CloudFoundryBindings;
