//! Interfaces to the collaborators the generator consults but does not own: the
//! compiler's semantic facts, the symbol catalog, and the project's files.
//!
//! Every method is read-only. Implementations must be shareable across threads, since
//! one registry serves concurrent template and render requests.

mod catalog;
mod facts;
mod project;

pub use catalog::{
    CachedCatalog, Catalog, CatalogItem, ItemKind, JsonCatalog, OfflineCatalog, ParameterInfo,
    SearchKind, SymbolRef, UnknownSearchKind,
};
pub use facts::{OfflineFacts, StaticFacts};
pub use project::{DiskProject, MemoryProject, end_position, parse_imports};

use crate::error::LookupError;
use crate::model::LinePosition;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Identity of the module a file belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub org: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
}

impl ModuleDescriptor {
    pub fn new(org: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
            version: String::new(),
        }
    }

    /// `org/name`, the form used in import declarations.
    pub fn id(&self) -> String {
        format!("{}/{}", self.org, self.name)
    }
}

/// A field of a record type, as reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub optional: bool,
}

/// Answers questions about the program that only the compiler front end can.
pub trait SemanticFacts: Send + Sync {
    /// The static type of `expression` evaluated at `position`.
    fn type_of(
        &self,
        expression: &str,
        position: Option<LinePosition>,
    ) -> Result<Option<String>, LookupError>;

    /// Every identifier visible at `position`.
    fn visible_names(&self, position: Option<LinePosition>) -> Result<Vec<String>, LookupError>;

    /// The module enclosing the file being edited.
    fn module_descriptor(&self) -> Result<ModuleDescriptor, LookupError>;

    /// Functions declared in the current module.
    fn module_functions(&self) -> Result<Vec<CatalogItem>, LookupError>;

    /// Fields of a record type, empty when the type is not a record.
    fn record_fields(&self, type_name: &str) -> Result<Vec<RecordField>, LookupError>;
}

/// Access to the project's source files.
pub trait ProjectFiles: Send + Sync {
    /// The root directory of the project containing `path`.
    fn project_root(&self, path: &Path) -> PathBuf;

    /// The position just past the last character of `path`; the start of the file when
    /// it does not exist yet.
    fn end_of_file(&self, path: &Path) -> Result<LinePosition, LookupError>;

    /// Module ids (`org/module`) already imported by `path`.
    fn existing_imports(&self, path: &Path) -> Result<Vec<String>, LookupError>;

    /// The module `path` belongs to, when it can be determined.
    fn current_module(&self, path: &Path) -> Option<ModuleDescriptor>;
}
