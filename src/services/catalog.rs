use crate::error::{FlowError, LookupError};
use crate::model::ParameterKind;
use ahash::AHashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::RwLock;
use thiserror::Error;

/// The three searchable collections of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchKind {
    Function,
    Connector,
    Type,
}

/// Returned when a string does not name a [`SearchKind`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown search kind '{0}'")]
pub struct UnknownSearchKind(pub String);

impl FromStr for SearchKind {
    type Err = UnknownSearchKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FUNCTION" => Ok(SearchKind::Function),
            "CONNECTOR" => Ok(SearchKind::Connector),
            "TYPE" => Ok(SearchKind::Type),
            _ => Err(UnknownSearchKind(s.to_string())),
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchKind::Function => f.write_str("FUNCTION"),
            SearchKind::Connector => f.write_str("CONNECTOR"),
            SearchKind::Type => f.write_str("TYPE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Function,
    Connector,
    Type,
    RemoteAction,
    ResourceAction,
    Method,
}

impl ItemKind {
    pub fn search_kind(&self) -> SearchKind {
        match self {
            ItemKind::Function | ItemKind::Method => SearchKind::Function,
            ItemKind::Connector | ItemKind::RemoteAction | ItemKind::ResourceAction => {
                SearchKind::Connector
            }
            ItemKind::Type => SearchKind::Type,
        }
    }
}

/// Qualified identity of a catalog symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SymbolRef {
    pub org: String,
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub symbol: String,
}

impl SymbolRef {
    pub fn new(org: impl Into<String>, module: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            module: module.into(),
            object: None,
            symbol: symbol.into(),
        }
    }

    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }
}

impl fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.object {
            Some(object) => write!(f, "{}/{}:{}.{}", self.org, self.module, object, self.symbol),
            None => write!(f, "{}/{}:{}", self.org, self.module, self.symbol),
        }
    }
}

/// A parameter in a catalog signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub imports: IndexMap<String, String>,
}

/// A function, connector, or type known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub kind: ItemKind,
    pub org: String,
    pub module: String,
    #[serde(default)]
    pub version: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default)]
    pub return_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Whether calls may fail and are wrapped in `check` by default.
    #[serde(default)]
    pub can_fail: bool,
}

impl CatalogItem {
    pub fn symbol_ref(&self) -> SymbolRef {
        SymbolRef {
            org: self.org.clone(),
            module: self.module.clone(),
            object: self.object.clone(),
            symbol: self.name.clone(),
        }
    }

    pub fn module_id(&self) -> String {
        format!("{}/{}", self.org, self.module)
    }

    fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.module.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// Read-only lookup and search over available symbols.
pub trait Catalog: Send + Sync {
    fn lookup(&self, symbol: &SymbolRef) -> Result<Option<CatalogItem>, LookupError>;

    fn search(
        &self,
        kind: SearchKind,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CatalogItem>, LookupError>;

    /// The default view shown before the user types a query.
    fn popular(&self, kind: SearchKind) -> Result<Vec<CatalogItem>, LookupError>;
}

/// A catalog held in memory, usually loaded from a JSON array of items.
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    items: Vec<CatalogItem>,
    popular_modules: Vec<String>,
}

impl JsonCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            items,
            popular_modules: vec!["log".to_string(), "time".to_string(), "io".to_string()],
        }
    }

    pub fn with_popular_modules(mut self, modules: Vec<String>) -> Self {
        self.popular_modules = modules;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        let items: Vec<CatalogItem> = serde_json::from_str(json)?;
        Ok(Self::new(items))
    }

    pub fn from_file(path: &Path) -> Result<Self, FlowError> {
        let content = fs::read_to_string(path).map_err(|e| {
            FlowError::Io(format!("Could not read catalog '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Catalog for JsonCatalog {
    fn lookup(&self, symbol: &SymbolRef) -> Result<Option<CatalogItem>, LookupError> {
        Ok(self
            .items
            .iter()
            .find(|item| {
                item.org == symbol.org
                    && item.module == symbol.module
                    && item.name == symbol.symbol
                    && item.object == symbol.object
            })
            .cloned())
    }

    fn search(
        &self,
        kind: SearchKind,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CatalogItem>, LookupError> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.kind.search_kind() == kind && item.matches(query))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn popular(&self, kind: SearchKind) -> Result<Vec<CatalogItem>, LookupError> {
        let popular: Vec<CatalogItem> = self
            .items
            .iter()
            .filter(|item| item.kind.search_kind() == kind)
            .filter(|item| {
                kind != SearchKind::Function || self.popular_modules.contains(&item.module)
            })
            .cloned()
            .collect();
        Ok(popular)
    }
}

/// A catalog that is never reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCatalog;

impl Catalog for OfflineCatalog {
    fn lookup(&self, _symbol: &SymbolRef) -> Result<Option<CatalogItem>, LookupError> {
        Err(LookupError::Unavailable("catalog is offline".to_string()))
    }

    fn search(
        &self,
        _kind: SearchKind,
        _query: &str,
        _limit: usize,
        _offset: usize,
    ) -> Result<Vec<CatalogItem>, LookupError> {
        Err(LookupError::Unavailable("catalog is offline".to_string()))
    }

    fn popular(&self, _kind: SearchKind) -> Result<Vec<CatalogItem>, LookupError> {
        Err(LookupError::Unavailable("catalog is offline".to_string()))
    }
}

/// Memoizes symbol lookups of another catalog. Searches pass straight through.
pub struct CachedCatalog<C> {
    inner: C,
    lookups: RwLock<AHashMap<SymbolRef, Option<CatalogItem>>>,
}

impl<C: Catalog> CachedCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            lookups: RwLock::new(AHashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.lookups.read().map(|map| map.len()).unwrap_or(0)
    }
}

impl<C: Catalog> Catalog for CachedCatalog<C> {
    fn lookup(&self, symbol: &SymbolRef) -> Result<Option<CatalogItem>, LookupError> {
        if let Ok(cache) = self.lookups.read() {
            if let Some(hit) = cache.get(symbol) {
                return Ok(hit.clone());
            }
        }
        // Failures are not cached so a later request can succeed.
        let item = self.inner.lookup(symbol)?;
        if let Ok(mut cache) = self.lookups.write() {
            cache.insert(symbol.clone(), item.clone());
        }
        Ok(item)
    }

    fn search(
        &self,
        kind: SearchKind,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CatalogItem>, LookupError> {
        self.inner.search(kind, query, limit, offset)
    }

    fn popular(&self, kind: SearchKind) -> Result<Vec<CatalogItem>, LookupError> {
        self.inner.popular(kind)
    }
}
