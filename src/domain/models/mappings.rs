//! Mapping tree and search pattern model.
//!
//! A mapping document associates each logical service name with an ordered
//! list of search patterns. Each pattern is a colon-delimited string naming
//! a lookup strategy plus its parameters, e.g. `env:MONGODB_CREDENTIALS` or
//! `file:resources/config_cf_example.json:MongoDBKey`.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing a search pattern string.
///
/// A pattern that fails to parse marks the mapping document itself as
/// malformed; the resolver treats it as a terminal failure for the whole
/// lookup rather than a backend miss.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("unrecognized lookup strategy `{0}`. Must be one of: cloudfoundry, env, file")]
    UnknownStrategy(String),

    #[error("search pattern `{0}` is missing its parameter")]
    MissingParameter(String),
}

/// A single lookup strategy with its parameters.
///
/// The set of strategies is closed: resolution dispatches over this enum and
/// an unrecognized strategy token is a parse error, not an extension point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPattern {
    /// Look up a bound service by name, label, or tag in the platform's
    /// service-binding registry (`cloudfoundry:<spec>`).
    CloudFoundry {
        /// Service instance name, label, or tag to match.
        spec: String,
    },

    /// Parse the named process environment variable as a JSON object
    /// (`env:<VARIABLE>`).
    Env {
        /// Environment variable name.
        variable: String,
    },

    /// Load a JSON or YAML document from disk (`file:<path>[:<key>]`).
    File {
        /// Path relative to the project root or working directory.
        path: String,
        /// Optional top-level key to project the document to.
        key: Option<String>,
    },
}

impl FromStr for SearchPattern {
    type Err = PatternError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (strategy, params) = raw
            .split_once(':')
            .ok_or_else(|| PatternError::MissingParameter(raw.to_string()))?;

        match strategy {
            "cloudfoundry" => {
                if params.is_empty() {
                    return Err(PatternError::MissingParameter(raw.to_string()));
                }
                Ok(Self::CloudFoundry {
                    spec: params.to_string(),
                })
            }
            "env" => {
                if params.is_empty() {
                    return Err(PatternError::MissingParameter(raw.to_string()));
                }
                Ok(Self::Env {
                    variable: params.to_string(),
                })
            }
            "file" => {
                let (path, key) = match params.split_once(':') {
                    Some((path, key)) if !key.is_empty() => (path, Some(key.to_string())),
                    Some((path, _)) => (path, None),
                    None => (params, None),
                };
                if path.is_empty() {
                    return Err(PatternError::MissingParameter(raw.to_string()));
                }
                Ok(Self::File {
                    path: path.to_string(),
                    key,
                })
            }
            other => Err(PatternError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Ordered search patterns for one logical service name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Patterns to evaluate in order; the first non-empty result wins.
    #[serde(rename = "searchPatterns")]
    pub search_patterns: Vec<String>,
}

/// The loaded mapping tree: logical service name to search patterns.
///
/// Built once at load time and treated as read-only afterwards. Concurrent
/// readers are safe because nothing mutates the tree post-construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mappings {
    #[serde(flatten)]
    entries: HashMap<String, MappingEntry>,
}

impl Mappings {
    /// Create an empty mapping tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry for a logical service name.
    pub fn entry(&self, name: &str) -> Option<&MappingEntry> {
        self.entries.get(name)
    }

    /// Add an entry. Intended for construction time only; the tree must not
    /// be mutated once a resolver holds it.
    pub fn insert(&mut self, name: impl Into<String>, search_patterns: Vec<String>) {
        self.entries
            .insert(name.into(), MappingEntry { search_patterns });
    }

    /// Iterate over logical names and their entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MappingEntry)> {
        self.entries.iter()
    }

    /// Number of logical names in the tree.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cloudfoundry_pattern() {
        let pattern: SearchPattern = "cloudfoundry:my-mongodb".parse().unwrap();
        assert_eq!(
            pattern,
            SearchPattern::CloudFoundry {
                spec: "my-mongodb".to_string()
            }
        );
    }

    #[test]
    fn test_parse_env_pattern() {
        let pattern: SearchPattern = "env:MONGODB_CREDENTIALS".parse().unwrap();
        assert_eq!(
            pattern,
            SearchPattern::Env {
                variable: "MONGODB_CREDENTIALS".to_string()
            }
        );
    }

    #[test]
    fn test_parse_file_pattern_without_key() {
        let pattern: SearchPattern = "file:config/creds.json".parse().unwrap();
        assert_eq!(
            pattern,
            SearchPattern::File {
                path: "config/creds.json".to_string(),
                key: None
            }
        );
    }

    #[test]
    fn test_parse_file_pattern_with_key() {
        let pattern: SearchPattern = "file:resources/config_cf_example.json:MongoDBKey"
            .parse()
            .unwrap();
        assert_eq!(
            pattern,
            SearchPattern::File {
                path: "resources/config_cf_example.json".to_string(),
                key: Some("MongoDBKey".to_string())
            }
        );
    }

    #[test]
    fn test_parse_unknown_strategy() {
        let result = "bogus:x".parse::<SearchPattern>();
        assert_eq!(
            result.unwrap_err(),
            PatternError::UnknownStrategy("bogus".to_string())
        );
    }

    #[test]
    fn test_parse_missing_parameter() {
        assert!(matches!(
            "env:".parse::<SearchPattern>(),
            Err(PatternError::MissingParameter(_))
        ));
        assert!(matches!(
            "cloudfoundry".parse::<SearchPattern>(),
            Err(PatternError::MissingParameter(_))
        ));
        assert!(matches!(
            "file::key".parse::<SearchPattern>(),
            Err(PatternError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_mappings_deserialization() {
        let json = r#"{
            "MongoDBKey": {
                "searchPatterns": [
                    "cloudfoundry:my-mongodb",
                    "env:MONGODB_CREDENTIALS",
                    "file:resources/config_cf_example.json:MongoDBKey"
                ]
            }
        }"#;

        let mappings: Mappings = serde_json::from_str(json).expect("mappings should parse");
        assert_eq!(mappings.len(), 1);

        let entry = mappings.entry("MongoDBKey").expect("entry should exist");
        assert_eq!(entry.search_patterns.len(), 3);
        assert_eq!(entry.search_patterns[0], "cloudfoundry:my-mongodb");
        assert!(mappings.entry("CloudantKey").is_none());
    }

    #[test]
    fn test_mappings_insert_and_lookup() {
        let mut mappings = Mappings::new();
        assert!(mappings.is_empty());

        mappings.insert("RedisKey", vec!["env:REDIS_CREDENTIALS".to_string()]);
        assert_eq!(mappings.len(), 1);
        assert_eq!(
            mappings.entry("RedisKey").unwrap().search_patterns,
            vec!["env:REDIS_CREDENTIALS"]
        );
    }
}
