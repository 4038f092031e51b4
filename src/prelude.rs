//! Prelude module for convenient imports
//!
//! Re-exports the types most callers need to request templates and render nodes.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowgen::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! let config = GeneratorConfig::discover(Path::new("path/to/project"));
//! let catalog = JsonCatalog::from_file(Path::new("path/to/catalog.json"))?;
//! let generator = FlowGenerator::new(Arc::new(DiskProject::new("path/to/project")))
//!     .with_catalog(Arc::new(catalog))
//!     .with_config(config);
//!
//! let node: Node = serde_json::from_str(&std::fs::read_to_string("path/to/node.json")?)?;
//! let edits = generator.render(&node, Path::new("path/to/project/main.bal"))?;
//! println!("{}", serde_json::to_string_pretty(&edits)?);
//! # Ok(())
//! # }
//! ```

// Generation entry points
pub use crate::builder::TemplateContext;
pub use crate::builder::registry::{NodeRegistry, NodeRegistryBuilder};
pub use crate::generator::{BatchOutcome, FlowGenerator, NodeFailure};

// Flow model
pub use crate::model::{
    Branch, Codedata, LinePosition, LineRange, Node, NodeKind, Properties, Property,
    PropertyValue, TextEdit, ValueType,
};

// Output and lookups
pub use crate::palette::{AvailableNode, Category};
pub use crate::search::SearchRequest;
pub use crate::services::{
    Catalog, DiskProject, JsonCatalog, MemoryProject, ModuleDescriptor, ProjectFiles,
    SearchKind, SemanticFacts, StaticFacts,
};
pub use crate::source::SourceEdits;

// Configuration and errors
pub use crate::config::GeneratorConfig;
pub use crate::debounce::Debouncer;
pub use crate::error::{Cancelled, FlowError};

pub use std::path::Path;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
