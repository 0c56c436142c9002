//! Domain layer for credential resolution.
//!
//! This module contains the mapping and credential models plus the port
//! traits that infrastructure adapters implement.

pub mod models;
pub mod ports;
