use super::text::LineRange;
use serde::{Deserialize, Serialize};

/// Provenance of a node: which symbol it refers to and where it lives in source.
///
/// A node with a `line_range` is regenerated in place. A node that `is_new`, or that
/// has no range, is written to the auxiliary file of its construct family.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Codedata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,
    /// Location of a declaration the node depends on, e.g. the function a data mapper calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_range: Option<LineRange>,
    pub is_new: bool,
    pub is_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inferred_return_type: Option<String>,
}

impl Codedata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, org: impl Into<String>, module: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self.module = Some(module.into());
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn with_parent_symbol(mut self, parent: impl Into<String>) -> Self {
        self.parent_symbol = Some(parent.into());
        self
    }

    pub fn with_resource_path(mut self, path: impl Into<String>) -> Self {
        self.resource_path = Some(path.into());
        self
    }

    pub fn with_line_range(mut self, range: LineRange) -> Self {
        self.line_range = Some(range);
        self
    }

    pub fn with_definition_range(mut self, range: LineRange) -> Self {
        self.definition_range = Some(range);
        self
    }

    pub fn new_node(mut self) -> Self {
        self.is_new = true;
        self
    }

    pub fn generated(mut self) -> Self {
        self.is_generated = true;
        self
    }

    /// `org/module`, when both halves are known.
    pub fn module_id(&self) -> Option<String> {
        match (&self.org, &self.module) {
            (Some(org), Some(module)) if !org.is_empty() && !module.is_empty() => {
                Some(format!("{}/{}", org, module))
            }
            _ => None,
        }
    }

    /// The prefix used to reference the module in source: the last dotted segment.
    pub fn module_prefix(&self) -> Option<&str> {
        self.module
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(|m| m.rsplit('.').next().unwrap_or(m))
    }
}
