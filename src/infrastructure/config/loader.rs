//! Mapping document loading.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Format, Json, Yaml};
use figment::Figment;
use thiserror::Error;
use tracing::warn;

use crate::domain::models::{MappingEntry, Mappings};

/// Mapping document error types.
#[derive(Error, Debug)]
pub enum MappingsError {
    #[error("logical service name cannot be empty")]
    EmptyLogicalName,

    #[error("mapping entry `{0}` has no search patterns")]
    EmptySearchPatterns(String),
}

/// Mapping document loader with hierarchical merging.
pub struct MappingsLoader;

impl MappingsLoader {
    /// Load the mapping document from its conventional project location.
    ///
    /// Precedence (lowest to highest):
    /// 1. `config/mappings.json` (primary document)
    /// 2. `config/mappings.local.json` (local overrides, optional)
    ///
    /// Both files are optional; an application that configures its mappings
    /// programmatically gets an empty tree and a warning.
    pub fn load(project_root: impl AsRef<Path>) -> Result<Mappings> {
        let root = project_root.as_ref();

        let entries: HashMap<String, MappingEntry> = Figment::new()
            .merge(Json::file(root.join("config/mappings.json")))
            .merge(Json::file(root.join("config/mappings.local.json")))
            .extract()
            .context("failed to extract service mappings")?;

        let mappings = Self::from_entries(entries);
        if mappings.is_empty() {
            warn!(
                root = %root.display(),
                "no service mappings found under config/"
            );
        }

        Self::validate(&mappings)?;
        Ok(mappings)
    }

    /// Load the mapping document from a specific file, JSON or YAML chosen
    /// by extension. Unlike [`MappingsLoader::load`], the file must exist.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Mappings> {
        let path = path.as_ref();

        let figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Figment::new().merge(Yaml::file_exact(path)),
            _ => Figment::new().merge(Json::file_exact(path)),
        };

        let entries: HashMap<String, MappingEntry> = figment
            .extract()
            .with_context(|| format!("failed to load mappings from {}", path.display()))?;

        let mappings = Self::from_entries(entries);
        Self::validate(&mappings)?;
        Ok(mappings)
    }

    /// Validate a mapping tree after loading.
    pub fn validate(mappings: &Mappings) -> Result<(), MappingsError> {
        for (name, entry) in mappings.iter() {
            if name.is_empty() {
                return Err(MappingsError::EmptyLogicalName);
            }
            if entry.search_patterns.is_empty() {
                return Err(MappingsError::EmptySearchPatterns(name.clone()));
            }
        }
        Ok(())
    }

    fn from_entries(entries: HashMap<String, MappingEntry>) -> Mappings {
        let mut mappings = Mappings::new();
        for (name, entry) in entries {
            mappings.insert(name, entry.search_patterns);
        }
        mappings
    }
}
