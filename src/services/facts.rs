use super::{CatalogItem, ModuleDescriptor, RecordField, SemanticFacts};
use crate::error::LookupError;
use crate::model::LinePosition;
use ahash::AHashMap;

/// Semantic facts known up front, for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticFacts {
    visible: Vec<String>,
    types: AHashMap<String, String>,
    module: ModuleDescriptor,
    functions: Vec<CatalogItem>,
    records: AHashMap<String, Vec<RecordField>>,
}

impl StaticFacts {
    pub fn new(module: ModuleDescriptor) -> Self {
        Self {
            module,
            ..Self::default()
        }
    }

    pub fn with_visible<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visible.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_type(mut self, expression: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.types.insert(expression.into(), type_name.into());
        self
    }

    pub fn with_function(mut self, item: CatalogItem) -> Self {
        self.functions.push(item);
        self
    }

    pub fn with_record(mut self, type_name: impl Into<String>, fields: Vec<RecordField>) -> Self {
        self.records.insert(type_name.into(), fields);
        self
    }
}

impl SemanticFacts for StaticFacts {
    fn type_of(
        &self,
        expression: &str,
        _position: Option<LinePosition>,
    ) -> Result<Option<String>, LookupError> {
        Ok(self.types.get(expression.trim()).cloned())
    }

    fn visible_names(&self, _position: Option<LinePosition>) -> Result<Vec<String>, LookupError> {
        Ok(self.visible.clone())
    }

    fn module_descriptor(&self) -> Result<ModuleDescriptor, LookupError> {
        Ok(self.module.clone())
    }

    fn module_functions(&self) -> Result<Vec<CatalogItem>, LookupError> {
        Ok(self.functions.clone())
    }

    fn record_fields(&self, type_name: &str) -> Result<Vec<RecordField>, LookupError> {
        Ok(self.records.get(type_name).cloned().unwrap_or_default())
    }
}

/// Facts from a compiler that could not be reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFacts;

fn offline<T>() -> Result<T, LookupError> {
    Err(LookupError::Unavailable("semantic model is not loaded".to_string()))
}

impl SemanticFacts for OfflineFacts {
    fn type_of(&self, _: &str, _: Option<LinePosition>) -> Result<Option<String>, LookupError> {
        offline()
    }

    fn visible_names(&self, _: Option<LinePosition>) -> Result<Vec<String>, LookupError> {
        offline()
    }

    fn module_descriptor(&self) -> Result<ModuleDescriptor, LookupError> {
        offline()
    }

    fn module_functions(&self) -> Result<Vec<CatalogItem>, LookupError> {
        offline()
    }

    fn record_fields(&self, _: &str) -> Result<Vec<RecordField>, LookupError> {
        offline()
    }
}
