//! Port traits the infrastructure layer implements.

pub mod platform_bindings;

pub use platform_bindings::{NullBindings, PlatformBindings};
