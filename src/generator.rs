//! The public entry point: templates, rendering, deletion, search and the node palette.

use crate::builder::TemplateContext;
use crate::builder::registry::NodeRegistry;
use crate::config::GeneratorConfig;
use crate::error::FlowError;
use crate::model::{Node, NodeKind, TextEdit};
use crate::palette::{self, Category};
use crate::search::{self, SearchRequest};
use crate::services::{Catalog, OfflineCatalog, OfflineFacts, ProjectFiles, SemanticFacts};
use crate::source::{RenderContext, SourceBuilder, SourceEdits, located_path};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// A node of a batch that could not be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFailure {
    pub node_id: String,
    pub error: FlowError,
}

/// The result of rendering several nodes: the edits of every node that succeeded, and
/// the failures of the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub edits: SourceEdits,
    pub failures: Vec<NodeFailure>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Adds one node's edits. Import edits already present for a file are not repeated.
    fn merge(&mut self, edits: SourceEdits) {
        for (path, edits) in edits {
            let existing = self.edits.entry(path).or_default();
            for edit in edits {
                if is_import(&edit) && existing.contains(&edit) {
                    continue;
                }
                existing.push(edit);
            }
        }
    }
}

fn is_import(edit: &TextEdit) -> bool {
    edit.range.is_empty() && edit.new_text.starts_with("import ")
}

/// Generates flow-node templates and turns edited nodes back into source edits.
///
/// ```rust
/// use flowgen::generator::FlowGenerator;
/// use flowgen::model::NodeKind;
/// use flowgen::services::MemoryProject;
/// use std::sync::Arc;
///
/// let generator = FlowGenerator::new(Arc::new(MemoryProject::new("/project")));
/// let context = generator.context();
/// let node = generator.template(NodeKind::Break, &context).unwrap();
/// assert_eq!(node.kind, NodeKind::Break);
/// ```
pub struct FlowGenerator {
    registry: Arc<NodeRegistry>,
    project: Arc<dyn ProjectFiles>,
    facts: Arc<dyn SemanticFacts>,
    catalog: Arc<dyn Catalog>,
    config: GeneratorConfig,
}

impl FlowGenerator {
    /// A generator over `project` with every default builder. The compiler and catalog
    /// start out unreachable; attach them with [`with_facts`](Self::with_facts) and
    /// [`with_catalog`](Self::with_catalog).
    pub fn new(project: Arc<dyn ProjectFiles>) -> Self {
        Self {
            registry: Arc::new(NodeRegistry::default()),
            project,
            facts: Arc::new(OfflineFacts),
            catalog: Arc::new(OfflineCatalog),
            config: GeneratorConfig::default(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<NodeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_facts(mut self, facts: Arc<dyn SemanticFacts>) -> Self {
        self.facts = facts;
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// A template context backed by this generator's compiler and catalog handles.
    pub fn context(&self) -> TemplateContext<'_> {
        TemplateContext::new(self.facts.as_ref(), self.catalog.as_ref())
    }

    fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            registry: &self.registry,
            project: self.project.as_ref(),
            config: &self.config,
        }
    }

    /// A new node of `kind`, populated with defaults for the position in `context`.
    pub fn template(&self, kind: NodeKind, context: &TemplateContext<'_>) -> Result<Node, FlowError> {
        let builder = self.registry.resolve(kind)?;
        let mut node = builder.populate_constants();
        node.codedata = context.codedata.clone().new_node();
        node.id = template_id(kind, context);
        Ok(builder.populate_template(node, context))
    }

    /// The edits that write `node` into the project, requested against `file`.
    pub fn render(&self, node: &Node, file: &Path) -> Result<SourceEdits, FlowError> {
        let builder = self.registry.resolve(node.kind)?;
        let mut source = SourceBuilder::new(node, self.render_context(), file)?;
        builder.render(&mut source)?;
        let edits = source.build();
        tracing::debug!(
            "Rendered {} node '{}' into {} file(s)",
            node.kind,
            node.id,
            edits.len()
        );
        Ok(edits)
    }

    /// Renders independent nodes in parallel. A node that fails does not stop the others.
    pub fn render_batch(&self, nodes: &[Node], file: &Path) -> BatchOutcome {
        let results: Vec<(&Node, Result<SourceEdits, FlowError>)> = nodes
            .par_iter()
            .map(|node| (node, self.render(node, file)))
            .collect();

        let mut outcome = BatchOutcome::default();
        for (node, result) in results {
            match result {
                Ok(edits) => outcome.merge(edits),
                Err(error) => {
                    tracing::warn!("Skipping node '{}': {}", node.id, error);
                    outcome.failures.push(NodeFailure {
                        node_id: node.id.clone(),
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// An edit that removes `node` from its file.
    pub fn delete(&self, node: &Node, file: &Path) -> Result<SourceEdits, FlowError> {
        let range = node.codedata.line_range.as_ref().ok_or_else(|| {
            FlowError::malformed(&node.id, "lineRange", "is required to delete a node")
        })?;
        let path = located_path(file, range, &self.config);
        let mut edits = SourceEdits::new();
        edits.insert(path, vec![TextEdit::delete(range.without_file())]);
        Ok(edits)
    }

    pub fn search(&self, request: &SearchRequest) -> Result<Vec<Category>, FlowError> {
        search::search(
            request,
            self.catalog.as_ref(),
            self.facts.as_ref(),
            self.project.as_ref(),
        )
    }

    /// Every registered kind, arranged into palette categories.
    pub fn available_nodes(&self) -> Vec<Category> {
        palette::available_nodes(&self.registry)
    }
}

fn template_id(kind: NodeKind, context: &TemplateContext<'_>) -> String {
    match context.position {
        Some(position) => format!(
            "{}-{}:{}",
            kind.as_str().to_lowercase(),
            position.line,
            position.offset
        ),
        None => kind.as_str().to_lowercase(),
    }
}
