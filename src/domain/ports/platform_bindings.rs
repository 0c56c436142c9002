//! Port for the deployment platform's service-binding registry.

use crate::domain::models::CredentialsMap;

/// Access to the deployment platform's service bindings and routing data.
///
/// Implementations are read-only views built once at resolver construction:
/// either the live process environment or a static descriptor file. All
/// methods are pure reads and must stay safe for concurrent callers.
pub trait PlatformBindings: Send + Sync {
    /// Port the platform assigned to the application, if any.
    fn port(&self) -> Option<u16>;

    /// Externally routable URL of the application, if any.
    fn url(&self) -> Option<String>;

    /// Credentials of the bound service matching `spec` by instance name,
    /// label, or tag. `None` when no bound service matches.
    fn service_credentials(&self, spec: &str) -> Option<CredentialsMap>;
}

/// A bindings registry with nothing in it.
///
/// Used when the application runs outside any binding-aware platform, and in
/// tests that only exercise the env and file strategies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBindings;

impl NullBindings {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self
    }
}

impl PlatformBindings for NullBindings {
    fn port(&self) -> Option<u16> {
        None
    }

    fn url(&self) -> Option<String> {
        None
    }

    fn service_credentials(&self, _spec: &str) -> Option<CredentialsMap> {
        None
    }
}
