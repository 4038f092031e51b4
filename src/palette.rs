//! The node palette: registered kinds arranged into a category tree.

use crate::builder::registry::NodeRegistry;
use crate::model::{Codedata, Metadata, NodeKind};
use serde::{Deserialize, Serialize};

/// A node the editor can insert, with enough identity to request its template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableNode {
    pub metadata: Metadata,
    pub kind: NodeKind,
    #[serde(default)]
    pub codedata: Codedata,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

fn enabled() -> bool {
    true
}

impl AvailableNode {
    pub fn new(kind: NodeKind, metadata: Metadata) -> Self {
        Self {
            metadata,
            kind,
            codedata: Codedata::default(),
            enabled: true,
        }
    }

    pub fn with_codedata(mut self, codedata: Codedata) -> Self {
        self.codedata = codedata;
        self
    }
}

/// The contents of a category. A category holds sub-categories or nodes, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Items {
    Categories(Vec<Category>),
    Nodes(Vec<AvailableNode>),
}

impl Items {
    pub fn is_empty(&self) -> bool {
        match self {
            Items::Categories(categories) => categories.is_empty(),
            Items::Nodes(nodes) => nodes.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub metadata: Metadata,
    pub items: Items,
}

impl Category {
    pub fn with_nodes(metadata: Metadata, nodes: Vec<AvailableNode>) -> Self {
        Self {
            metadata,
            items: Items::Nodes(nodes),
        }
    }

    pub fn with_categories(metadata: Metadata, categories: Vec<Category>) -> Self {
        Self {
            metadata,
            items: Items::Categories(categories),
        }
    }

    /// Every node in the category and its descendants, depth first.
    pub fn nodes(&self) -> Vec<&AvailableNode> {
        match &self.items {
            Items::Nodes(nodes) => nodes.iter().collect(),
            Items::Categories(categories) => categories.iter().flat_map(Category::nodes).collect(),
        }
    }
}

/// Builds a category tree from registered kinds.
///
/// ```rust
/// use flowgen::builder::registry::NodeRegistry;
/// use flowgen::model::NodeKind;
/// use flowgen::palette::PaletteBuilder;
///
/// let registry = NodeRegistry::default();
/// let palette = PaletteBuilder::new(&registry)
///     .step_in("Flow", "Flow control")
///     .step_in("Branch", "Conditional flows")
///     .node(NodeKind::If)
///     .step_out()
///     .step_out()
///     .build();
/// assert_eq!(palette.len(), 1);
/// ```
pub struct PaletteBuilder<'r> {
    registry: &'r NodeRegistry,
    open: Vec<Category>,
    roots: Vec<Category>,
}

impl<'r> PaletteBuilder<'r> {
    pub fn new(registry: &'r NodeRegistry) -> Self {
        Self {
            registry,
            open: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Opens a new category inside the current one.
    pub fn step_in(mut self, label: &str, description: &str) -> Self {
        self.open.push(Category::with_nodes(
            Metadata::new(label, description),
            Vec::new(),
        ));
        self
    }

    /// Adds `kind` to the current category. Kinds missing from the registry are skipped.
    pub fn node(mut self, kind: NodeKind) -> Self {
        let Some(builder) = self.registry.get(kind) else {
            tracing::debug!("Kind {} is not registered, leaving it off the palette", kind);
            return self;
        };
        let Some(current) = self.open.last_mut() else {
            tracing::warn!("Kind {} was added outside of any category", kind);
            return self;
        };
        let constants = builder.populate_constants();
        match &mut current.items {
            Items::Nodes(nodes) => nodes.push(AvailableNode::new(kind, constants.metadata)),
            Items::Categories(_) => tracing::warn!(
                "Category '{}' already holds sub-categories, skipping kind {}",
                current.metadata.label,
                kind
            ),
        }
        self
    }

    /// Closes the current category. Empty categories are dropped.
    pub fn step_out(mut self) -> Self {
        let Some(finished) = self.open.pop() else {
            return self;
        };
        if finished.items.is_empty() {
            return self;
        }
        let Some(parent) = self.open.last_mut() else {
            self.roots.push(finished);
            return self;
        };
        if parent.items.is_empty() {
            parent.items = Items::Categories(Vec::new());
        }
        match &mut parent.items {
            Items::Categories(categories) => categories.push(finished),
            Items::Nodes(_) => tracing::warn!(
                "Category '{}' already holds nodes, dropping sub-category '{}'",
                parent.metadata.label,
                finished.metadata.label
            ),
        }
        self
    }

    /// Closes any categories still open and returns the roots.
    pub fn build(mut self) -> Vec<Category> {
        while !self.open.is_empty() {
            self = self.step_out();
        }
        self.roots
    }
}

/// The default palette of every registered kind.
pub fn available_nodes(registry: &NodeRegistry) -> Vec<Category> {
    PaletteBuilder::new(registry)
        .step_in("Flow", "Flow control nodes")
        .step_in("Branch", "Choose a path based on a condition")
        .node(NodeKind::If)
        .node(NodeKind::Match)
        .step_out()
        .step_in("Iteration", "Repeat a block")
        .node(NodeKind::While)
        .node(NodeKind::Foreach)
        .node(NodeKind::Break)
        .node(NodeKind::Continue)
        .step_out()
        .step_in("Control", "Leave the current flow")
        .node(NodeKind::Return)
        .node(NodeKind::Stop)
        .step_out()
        .step_in("Concurrency", "Run work in parallel")
        .node(NodeKind::Start)
        .node(NodeKind::Wait)
        .node(NodeKind::Fork)
        .node(NodeKind::ParallelFlow)
        .node(NodeKind::Lock)
        .step_out()
        .step_in("Error Handling", "Handle and raise errors")
        .node(NodeKind::ErrorHandler)
        .node(NodeKind::Fail)
        .node(NodeKind::Panic)
        .node(NodeKind::Retry)
        .node(NodeKind::Transaction)
        .node(NodeKind::Commit)
        .node(NodeKind::Rollback)
        .step_out()
        .step_out()
        .step_in("Statement", "Plain statements")
        .node(NodeKind::Variable)
        .node(NodeKind::Assign)
        .node(NodeKind::Expression)
        .node(NodeKind::Comment)
        .node(NodeKind::ConfigVariable)
        .node(NodeKind::FunctionCall)
        .node(NodeKind::NewConnection)
        .step_out()
        .step_in("Data", "Build and transform data")
        .node(NodeKind::DataMapper)
        .node(NodeKind::JsonPayload)
        .node(NodeKind::XmlPayload)
        .node(NodeKind::BinaryData)
        .step_out()
        .build()
}
