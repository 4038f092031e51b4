//! Generator settings, read from `flowgen.toml`.

use crate::error::FlowError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "flowgen.toml";

/// Auxiliary files that receive first-time declarations, one per construct family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DefaultFiles {
    pub connections: String,
    pub data_mappings: String,
    pub functions: String,
    pub automation: String,
    pub agents: String,
}

impl Default for DefaultFiles {
    fn default() -> Self {
        Self {
            connections: "connections.bal".to_string(),
            data_mappings: "data_mappings.bal".to_string(),
            functions: "functions.bal".to_string(),
            automation: "automation.bal".to_string(),
            agents: "agents.bal".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    pub files: DefaultFiles,
    /// Spaces per nesting level in generated source.
    pub indent_width: usize,
    /// Quiet window of the change-notification debouncer.
    pub debounce_delay_ms: u64,
    pub search_limit: usize,
    /// Extension of source files; paths without it are treated as project roots.
    pub source_extension: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            files: DefaultFiles::default(),
            indent_width: 4,
            debounce_delay_ms: 500,
            search_limit: 20,
            source_extension: ".bal".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }

    pub fn from_toml(content: &str) -> Result<Self, FlowError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads an explicitly requested config file. Any failure is an error.
    pub fn from_file(path: &Path) -> Result<Self, FlowError> {
        let content = fs::read_to_string(path).map_err(|e| {
            FlowError::Config(format!("Could not read '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content).map_err(|e| {
            FlowError::Config(format!("Could not parse '{}': {}", path.display(), e))
        })
    }

    /// Looks for `flowgen.toml` in `root`. A missing or malformed file yields defaults.
    pub fn discover(root: &Path) -> Self {
        let candidate = root.join(CONFIG_FILE_NAME);
        if !candidate.is_file() {
            return Self::default();
        }
        match Self::from_file(&candidate) {
            Ok(config) => {
                tracing::debug!("Loaded generator config from {}", candidate.display());
                config
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring auto-discovered config {}: {}",
                    candidate.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Loads `explicit` when given, otherwise discovers a config under `root`.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, FlowError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Ok(Self::discover(root)),
        }
    }
}
