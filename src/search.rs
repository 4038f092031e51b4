//! Catalog search shaped into palette categories.

use crate::config::GeneratorConfig;
use crate::error::FlowError;
use crate::model::{Codedata, Metadata, NodeKind};
use crate::palette::{AvailableNode, Category};
use crate::services::{Catalog, CatalogItem, ItemKind, ProjectFiles, SearchKind, SemanticFacts};
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use std::path::PathBuf;

pub const CURRENT_INTEGRATION: &str = "Current Integration";
pub const IMPORTED_FUNCTIONS: &str = "Imported Functions";
pub const AVAILABLE_FUNCTIONS: &str = "Available Functions";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub kind: SearchKind,
    pub query: String,
    pub limit: usize,
    pub offset: usize,
    /// The file being edited; its imports decide which functions count as imported.
    pub file_path: Option<PathBuf>,
}

impl SearchRequest {
    pub fn new(kind: SearchKind, config: &GeneratorConfig) -> Self {
        Self {
            kind,
            query: String::new(),
            limit: config.search_limit,
            offset: 0,
            file_path: None,
        }
    }

    /// Reads `q`, `limit` and `offset` from request parameters. Numbers that do not parse
    /// fall back to their defaults.
    pub fn from_query_map(
        kind: SearchKind,
        params: &AHashMap<String, String>,
        config: &GeneratorConfig,
    ) -> Self {
        let number = |key: &str, default: usize| {
            params
                .get(key)
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(default)
        };
        Self {
            kind,
            query: params.get("q").map(|q| q.trim().to_string()).unwrap_or_default(),
            limit: number("limit", config.search_limit),
            offset: number("offset", 0),
            file_path: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }
}

/// The node kind an item is inserted as.
fn node_kind(kind: ItemKind) -> NodeKind {
    match kind {
        ItemKind::Function => NodeKind::FunctionCall,
        ItemKind::Method => NodeKind::MethodCall,
        ItemKind::Connector => NodeKind::NewConnection,
        ItemKind::RemoteAction => NodeKind::RemoteActionCall,
        ItemKind::ResourceAction => NodeKind::ResourceActionCall,
        ItemKind::Type => NodeKind::Variable,
    }
}

fn available_node(item: &CatalogItem) -> AvailableNode {
    let mut metadata = Metadata::new(&item.name, &item.description);
    metadata.icon = item.icon.clone();
    let mut codedata = Codedata::new()
        .with_module(&item.org, &item.module)
        .with_symbol(&item.name);
    codedata.object = item.object.clone();
    codedata.resource_path = item.resource_path.clone();
    if !item.version.is_empty() {
        codedata.version = Some(item.version.clone());
    }
    AvailableNode::new(node_kind(item.kind), metadata).with_codedata(codedata)
}

/// Functions of the module being edited carry no module, so their templates resolve
/// against the module's own declarations.
fn local_node(item: &CatalogItem) -> AvailableNode {
    let metadata = Metadata::new(&item.name, &item.description);
    AvailableNode::new(NodeKind::FunctionCall, metadata)
        .with_codedata(Codedata::new().with_symbol(&item.name))
}

/// One category per module, in order of first appearance.
fn by_module<'a, I>(items: I) -> Vec<Category>
where
    I: IntoIterator<Item = &'a CatalogItem>,
{
    let mut modules: IndexMap<String, (Metadata, Vec<AvailableNode>)> = IndexMap::new();
    for item in items {
        let (_, nodes) = modules.entry(item.module_id()).or_insert_with(|| {
            let mut metadata = Metadata::new(&item.module, item.module_id());
            metadata.icon = item.icon.clone();
            (metadata, Vec::new())
        });
        nodes.push(available_node(item));
    }
    modules
        .into_values()
        .map(|(metadata, nodes)| Category::with_nodes(metadata, nodes))
        .collect()
}

/// Runs a catalog search and groups the results.
///
/// An empty query shows the catalog's default view. Catalog failures are returned as
/// errors since a search has no sensible fallback; the compiler and project services
/// only refine the grouping and degrade to empty answers.
pub fn search(
    request: &SearchRequest,
    catalog: &dyn Catalog,
    facts: &dyn SemanticFacts,
    project: &dyn ProjectFiles,
) -> Result<Vec<Category>, FlowError> {
    let results = if request.query.is_empty() {
        catalog.popular(request.kind)
    } else {
        catalog.search(request.kind, &request.query, request.limit, request.offset)
    }
    .map_err(|e| e.into_flow_error("catalog"))?;
    tracing::debug!(
        "Catalog returned {} {} items for '{}'",
        results.len(),
        request.kind,
        request.query
    );

    match request.kind {
        SearchKind::Function => Ok(function_categories(request, &results, facts, project)),
        SearchKind::Connector | SearchKind::Type => Ok(by_module(&results)),
    }
}

fn function_categories(
    request: &SearchRequest,
    results: &[CatalogItem],
    facts: &dyn SemanticFacts,
    project: &dyn ProjectFiles,
) -> Vec<Category> {
    let query = request.query.to_lowercase();
    let local: Vec<AvailableNode> = facts
        .module_functions()
        .unwrap_or_else(|e| {
            tracing::warn!("Could not list functions of the current module: {}", e);
            Vec::new()
        })
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&query))
        .map(local_node)
        .collect();

    let imported: AHashSet<String> = match &request.file_path {
        Some(path) => project
            .existing_imports(path)
            .unwrap_or_else(|e| {
                tracing::warn!("Could not read imports of {}: {}", path.display(), e);
                Vec::new()
            })
            .into_iter()
            .collect(),
        None => AHashSet::new(),
    };
    let (imported, available): (Vec<&CatalogItem>, Vec<&CatalogItem>) = results
        .iter()
        .partition(|item| imported.contains(&item.module_id()));

    let mut categories = Vec::new();
    if !local.is_empty() {
        let metadata = Metadata::new(CURRENT_INTEGRATION, "Functions defined in this integration");
        categories.push(Category::with_nodes(metadata, local));
    }
    if !imported.is_empty() {
        let metadata = Metadata::new(IMPORTED_FUNCTIONS, "Functions of modules already imported");
        categories.push(Category::with_categories(metadata, by_module(imported)));
    }
    if !available.is_empty() {
        let metadata = Metadata::new(AVAILABLE_FUNCTIONS, "Functions of modules that can be imported");
        categories.push(Category::with_categories(metadata, by_module(available)));
    }
    categories
}
