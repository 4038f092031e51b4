//! Per-kind node builders and the registry that dispatches to them.
//!
//! Every construct has one stateless builder implementing [`NodeBuilder`]. A template is
//! produced in two steps, `populate_constants` then `populate_template`, and the edited
//! node comes back through `render`. Nothing is kept on the builder between the steps;
//! the [`Node`] value itself carries all state.

pub mod call;
pub mod concurrency;
pub mod control;
pub mod data_mapper;
pub mod definition;
pub mod names;
pub mod params;
pub mod registry;
pub mod statement;

use crate::error::FlowError;
use crate::model::{Codedata, LinePosition, Metadata, Node, NodeKind};
use crate::services::{Catalog, CatalogItem, RecordField, SemanticFacts, SymbolRef};
use crate::source::SourceBuilder;
use ahash::AHashSet;
use std::path::{Path, PathBuf};

/// Defines the contract for producing and rendering one node kind.
pub trait NodeBuilder: Send + Sync {
    fn kind(&self) -> NodeKind;

    fn label(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Search keywords shown by the node palette.
    fn keywords(&self) -> &'static [&'static str] {
        &[]
    }

    /// The kind, label and description. Pure and deterministic.
    fn populate_constants(&self) -> Node {
        let mut node = Node::new(self.kind());
        node.metadata = Metadata::new(self.label(), self.description())
            .with_keywords(self.keywords().iter().copied());
        node
    }

    /// Adds the property and branch schema, with defaults. Lookups through `context`
    /// are best effort.
    fn populate_template(&self, node: Node, context: &TemplateContext<'_>) -> Node;

    /// Writes the source of `source.node()`.
    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError>;
}

/// What a template request knows about its surroundings: where the node will be
/// inserted, which symbol it refers to, and handles to the lookup services.
pub struct TemplateContext<'a> {
    facts: &'a dyn SemanticFacts,
    catalog: &'a dyn Catalog,
    pub file_path: PathBuf,
    pub position: Option<LinePosition>,
    pub codedata: Codedata,
    /// The type the node is expected to produce, when the editor already knows it.
    pub output_type: Option<String>,
}

impl<'a> TemplateContext<'a> {
    pub fn new(facts: &'a dyn SemanticFacts, catalog: &'a dyn Catalog) -> Self {
        Self {
            facts,
            catalog,
            file_path: PathBuf::new(),
            position: None,
            codedata: Codedata::default(),
            output_type: None,
        }
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_position(mut self, position: LinePosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_codedata(mut self, codedata: Codedata) -> Self {
        self.codedata = codedata;
        self
    }

    pub fn with_output_type(mut self, type_name: impl Into<String>) -> Self {
        self.output_type = Some(type_name.into()).filter(|t: &String| !t.trim().is_empty());
        self
    }

    pub fn facts(&self) -> &'a dyn SemanticFacts {
        self.facts
    }

    pub fn catalog(&self) -> &'a dyn Catalog {
        self.catalog
    }

    /// Identifiers visible at the insertion point; empty when the compiler is unreachable.
    pub fn visible_names(&self) -> AHashSet<String> {
        match self.facts.visible_names(self.position) {
            Ok(names) => names.into_iter().collect(),
            Err(e) => {
                tracing::warn!("Could not read visible names, generated names may clash: {}", e);
                AHashSet::new()
            }
        }
    }

    pub fn record_fields(&self, type_name: &str) -> Vec<RecordField> {
        self.facts.record_fields(type_name).unwrap_or_else(|e| {
            tracing::warn!("Could not read the fields of '{}': {}", type_name, e);
            Vec::new()
        })
    }

    /// A placeholder expression of `type_name`: a record literal with every field
    /// defaulted when the type is a known record, otherwise [`definition::default_body`].
    pub fn expression_body(&self, type_name: &str) -> String {
        let fields = self.record_fields(type_name.trim());
        if fields.is_empty() {
            definition::default_body(type_name).to_string()
        } else {
            definition::record_body(&fields)
        }
    }

    /// The catalog entry of the symbol named by `codedata`. Symbols without a module
    /// are looked up among the functions of the current module.
    pub fn lookup(&self) -> Option<CatalogItem> {
        let symbol = self.codedata.symbol.as_deref()?;
        let (org, module) = match (&self.codedata.org, &self.codedata.module) {
            (Some(org), Some(module)) if !org.is_empty() && !module.is_empty() => (org, module),
            _ => {
                return self
                    .facts
                    .module_functions()
                    .map_err(|e| tracing::warn!("Could not list module functions: {}", e))
                    .ok()?
                    .into_iter()
                    .find(|item| item.name == symbol);
            }
        };

        let mut reference = SymbolRef::new(org, module, symbol);
        reference.object = self.codedata.object.clone();
        match self.catalog.lookup(&reference) {
            Ok(Some(item)) => Some(item),
            Ok(None) => {
                tracing::debug!("Symbol {} is not in the catalog", reference);
                None
            }
            Err(e) => {
                tracing::warn!("Catalog lookup of {} failed, using defaults: {}", reference, e);
                None
            }
        }
    }
}
