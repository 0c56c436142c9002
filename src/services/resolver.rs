//! Credential resolution over ordered search patterns.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::providers::{Format, Json, Yaml};
use figment::Figment;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::domain::models::{CredentialsMap, Mappings, SearchPattern};
use crate::domain::ports::PlatformBindings;
use crate::infrastructure::config::MappingsLoader;
use crate::infrastructure::platform::CloudFoundryBindings;

/// Resolves service credentials by evaluating each logical name's search
/// patterns in order and returning the first non-empty result.
///
/// Constructed once per application; every lookup afterwards is a pure read
/// over the loaded mapping tree and bindings registry, so one instance is
/// safe to share across concurrent readers.
pub struct CredentialResolver {
    mappings: Mappings,
    bindings: Box<dyn PlatformBindings>,
    project_root: PathBuf,
}

impl CredentialResolver {
    /// Start building a resolver.
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    /// Resolve the generic credentials mapping for a logical service name.
    ///
    /// Patterns are evaluated in order; the first strategy yielding a
    /// non-empty object wins and later patterns are not consulted. A
    /// malformed pattern aborts the whole lookup. A name with no mapping
    /// entry, or whose patterns all miss, resolves to `None`.
    pub fn resolve(&self, name: &str) -> Option<CredentialsMap> {
        let Some(entry) = self.mappings.entry(name) else {
            warn!(name, "no mapping entry for logical service name");
            return None;
        };

        for raw in &entry.search_patterns {
            let pattern = match raw.parse::<SearchPattern>() {
                Ok(pattern) => pattern,
                Err(err) => {
                    // A malformed pattern marks the mapping document itself
                    // as broken: abort the lookup instead of skipping it.
                    error!(name, pattern = raw.as_str(), %err, "malformed search pattern");
                    return None;
                }
            };

            let result = match &pattern {
                SearchPattern::CloudFoundry { spec } => self.bindings.service_credentials(spec),
                SearchPattern::Env { variable } => lookup_env(variable),
                SearchPattern::File { path, key } => self.lookup_file(path, key.as_deref()),
            };

            match result {
                Some(map) if !map.is_empty() => {
                    debug!(name, pattern = raw.as_str(), "search pattern matched");
                    return Some(map);
                }
                _ => debug!(name, pattern = raw.as_str(), "search pattern missed"),
            }
        }

        debug!(name, "search patterns exhausted without a match");
        None
    }

    /// Port assigned by the deployment platform, if any.
    pub fn port(&self) -> Option<u16> {
        self.bindings.port()
    }

    /// Externally routable URL of the application, if any.
    pub fn url(&self) -> Option<String> {
        self.bindings.url()
    }

    /// Evaluate a `file:` pattern.
    ///
    /// The document is loaded relative to the project root and then the
    /// working directory, merged so the later load wins on key collisions.
    fn lookup_file(&self, path: &str, key: Option<&str>) -> Option<CredentialsMap> {
        let relative = strip_leading_separator(path);

        let mut figment = merge_document(Figment::new(), &self.project_root.join(relative));
        if let Ok(cwd) = env::current_dir() {
            figment = merge_document(figment, &cwd.join(relative));
        }

        let document: Value = match figment.extract() {
            Ok(document) => document,
            Err(err) => {
                debug!(path, %err, "failed to load credential document");
                return None;
            }
        };

        let object = match key {
            Some(key) => match document.get(key).and_then(Value::as_object) {
                Some(object) => object,
                None => {
                    debug!(path, key, "credential document has no object at key");
                    return None;
                }
            },
            None => document.as_object()?,
        };

        if object.is_empty() {
            None
        } else {
            Some(object.clone())
        }
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("mappings", &self.mappings)
            .field("project_root", &self.project_root)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CredentialResolver`].
///
/// Every collaborator is injectable; defaults are the conventional mapping
/// document under the project root and a bindings registry read from the
/// live process environment.
#[derive(Default)]
pub struct ResolverBuilder {
    project_root: Option<PathBuf>,
    mappings: Option<Mappings>,
    mappings_file: Option<PathBuf>,
    bindings: Option<Box<dyn PlatformBindings>>,
    bindings_file: Option<PathBuf>,
}

impl ResolverBuilder {
    /// Base directory for `config/mappings.json` and `file:` lookups.
    /// Defaults to the current working directory.
    #[must_use]
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Use an already-built mapping tree instead of loading one.
    #[must_use]
    pub fn mappings(mut self, mappings: Mappings) -> Self {
        self.mappings = Some(mappings);
        self
    }

    /// Load the mapping tree from a specific file (JSON or YAML).
    #[must_use]
    pub fn mappings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.mappings_file = Some(path.into());
        self
    }

    /// Inject a platform bindings registry.
    #[must_use]
    pub fn bindings(mut self, bindings: Box<dyn PlatformBindings>) -> Self {
        self.bindings = Some(bindings);
        self
    }

    /// Read the bindings registry from a static descriptor file instead of
    /// the live environment (deterministic/test mode).
    #[must_use]
    pub fn bindings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.bindings_file = Some(path.into());
        self
    }

    /// Build the resolver. Collaborator selection happens here, once; the
    /// resolver never re-reads the platform environment per call.
    pub fn build(self) -> Result<CredentialResolver> {
        let project_root = match self.project_root {
            Some(root) => root,
            None => env::current_dir().context("failed to determine project root")?,
        };

        let mappings = match (self.mappings, self.mappings_file) {
            (Some(mappings), _) => mappings,
            (None, Some(path)) => MappingsLoader::load_from_file(path)?,
            (None, None) => MappingsLoader::load(&project_root)?,
        };

        let bindings: Box<dyn PlatformBindings> = match (self.bindings, self.bindings_file) {
            (Some(bindings), _) => bindings,
            (None, Some(path)) => Box::new(CloudFoundryBindings::from_file(path)?),
            (None, None) => Box::new(CloudFoundryBindings::from_env()),
        };

        Ok(CredentialResolver {
            mappings,
            bindings,
            project_root,
        })
    }
}

/// Evaluate an `env:` pattern: the variable's value must be a JSON object.
fn lookup_env(variable: &str) -> Option<CredentialsMap> {
    let Ok(raw) = env::var(variable) else {
        debug!(variable, "environment variable unset");
        return None;
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            debug!(variable, "environment variable is not a JSON object");
            None
        }
        Err(err) => {
            debug!(variable, %err, "environment variable is not valid JSON");
            None
        }
    }
}

/// Remove exactly one leading path separator so absolute-looking mapping
/// entries stay inside the candidate base directories.
fn strip_leading_separator(path: &str) -> &str {
    path.strip_prefix('/')
        .or_else(|| path.strip_prefix('\\'))
        .unwrap_or(path)
}

fn merge_document(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        _ => figment.merge(Json::file(path)),
    }
}
