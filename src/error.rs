use crate::model::NodeKind;
use thiserror::Error;

/// Errors returned by template population, rendering and search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("Node '{node_id}' cannot be rendered: property '{key}' {reason}")]
    SchemaViolation {
        node_id: String,
        key: String,
        reason: String,
    },

    #[error("Node kind '{kind}' is not supported. Supported kinds: {}", .supported.join(", "))]
    UnsupportedKind {
        kind: String,
        supported: Vec<String>,
    },

    #[error("Lookup against the {service} failed: {message}")]
    ExternalLookupFailure { service: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O failure: {0}")]
    Io(String),

    #[error("Failed to parse JSON: {0}")]
    Json(String),
}

impl FlowError {
    /// A required property is absent or empty.
    pub fn missing(node_id: &str, key: &str) -> Self {
        FlowError::SchemaViolation {
            node_id: node_id.to_string(),
            key: key.to_string(),
            reason: "is required but missing or empty".to_string(),
        }
    }

    /// A property is present but its value is unusable.
    pub fn malformed(node_id: &str, key: &str, reason: impl Into<String>) -> Self {
        FlowError::SchemaViolation {
            node_id: node_id.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported<'a, I>(kind: impl Into<String>, supported: I) -> Self
    where
        I: IntoIterator<Item = &'a NodeKind>,
    {
        let mut supported: Vec<String> = supported.into_iter().map(|k| k.to_string()).collect();
        supported.sort();
        FlowError::UnsupportedKind {
            kind: kind.into(),
            supported,
        }
    }

    /// Whether the error only affects the node that raised it.
    pub fn is_node_scoped(&self) -> bool {
        matches!(self, FlowError::SchemaViolation { .. })
    }
}

/// Failures reported by the semantic-facts, catalog and project services.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("symbol '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl LookupError {
    pub fn into_flow_error(self, service: &str) -> FlowError {
        FlowError::ExternalLookupFailure {
            service: service.to_string(),
            message: self.to_string(),
        }
    }
}

impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        FlowError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Json(err.to_string())
    }
}

impl From<toml::de::Error> for FlowError {
    fn from(err: toml::de::Error) -> Self {
        FlowError::Config(err.to_string())
    }
}

/// Returned by a debounced submission that a later submission for the same key replaced.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("superseded by a later submission for the same key")]
pub struct Cancelled;
