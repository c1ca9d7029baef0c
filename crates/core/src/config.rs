//! Mapper configuration
//!
//! A [`Configuration`] is the static metadata a session exposes to executors:
//! binding settings plus a registry of statements keyed by id. It can be built
//! in code or read from a TOML file.
//!
//! # Example
//!
//! ```toml
//! [settings]
//! use_actual_param_names = true
//! wrap_collections = false
//!
//! [[statements]]
//! id = "CityMapper.find"
//! kind = "select"
//!
//! [[statements]]
//! id = "CityMapper.rename"
//! kind = "update"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// What a statement does to the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// Read rows
    Select,
    /// Insert rows; result is a row count
    Insert,
    /// Update rows; result is a row count
    Update,
    /// Delete rows; result is a row count
    Delete,
    /// Flush batched statements
    Flush,
}

impl StatementKind {
    /// True for statements whose raw result is a row count
    pub fn is_write(self) -> bool {
        matches!(
            self,
            StatementKind::Insert | StatementKind::Update | StatementKind::Delete
        )
    }
}

/// One registered statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSpec {
    /// Fully qualified id, `"<Interface>.<operation>"`
    pub id: String,
    /// Statement kind
    pub kind: StatementKind,
}

/// Settings that change how arguments and results are shaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Expose declared parameter names in the parameter object.
    /// When false only the generic `param1..paramN` names are used.
    #[serde(default = "default_true")]
    pub use_actual_param_names: bool,
    /// Wrap a lone array argument as `{"collection", "list"}`.
    #[serde(default)]
    pub wrap_collections: bool,
    /// Allow single-result operations to return null.
    #[serde(default)]
    pub nullable_single_results: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_actual_param_names: true,
            wrap_collections: false,
            nullable_single_results: false,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ConfigFile {
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    statements: Vec<StatementSpec>,
}

/// Static metadata a session exposes to executors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    settings: Settings,
    statements: BTreeMap<String, StatementSpec>,
}

impl Configuration {
    /// Empty configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the settings.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Register a statement, replacing any previous one with the same id.
    pub fn with_statement(mut self, id: impl Into<String>, kind: StatementKind) -> Self {
        self.add_statement(StatementSpec {
            id: id.into(),
            kind,
        });
        self
    }

    /// Register a statement in place.
    pub fn add_statement(&mut self, spec: StatementSpec) {
        self.statements.insert(spec.id.clone(), spec);
    }

    /// Binding settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Look up a statement by id.
    pub fn statement(&self, id: &str) -> Option<&StatementSpec> {
        self.statements.get(id)
    }

    /// Whether a statement with this id is registered.
    pub fn has_statement(&self, id: &str) -> bool {
        self.statements.contains_key(id)
    }

    /// Number of registered statements
    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid configuration or
    /// declares the same statement id twice.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| Error::Config {
            reason: format!("failed to parse configuration: {}", e),
        })?;
        let mut config = Configuration::new().with_settings(file.settings);
        for spec in file.statements {
            if config.has_statement(&spec.id) {
                return Err(Error::Config {
                    reason: format!("duplicate statement id '{}'", spec.id),
                });
            }
            config.add_statement(spec);
        }
        Ok(config)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize this configuration to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        let file = ConfigFile {
            settings: self.settings.clone(),
            statements: self.statements.values().cloned().collect(),
        };
        toml::to_string_pretty(&file).map_err(|e| Error::Config {
            reason: format!("failed to serialize configuration: {}", e),
        })
    }
}
