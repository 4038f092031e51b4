use super::{ModuleDescriptor, ProjectFiles};
use crate::error::LookupError;
use crate::model::LinePosition;
use ahash::AHashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "Ballerina.toml";

/// The position just past the last character of `text`.
pub fn end_position(text: &str) -> LinePosition {
    let line = text.matches('\n').count() as u32;
    let offset = text.rsplit('\n').next().map_or(0, |last| last.chars().count()) as u32;
    LinePosition::new(line, offset)
}

/// Module ids (`org/module`) named by the import declarations of `text`.
pub fn parse_imports(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("import "))
        .map(|rest| {
            let rest = rest.trim_end_matches(';').trim();
            let module = rest.split(" as ").next().unwrap_or(rest);
            module.trim().to_string()
        })
        .filter(|module| !module.is_empty())
        .collect()
}

/// A project whose files live in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProject {
    root: PathBuf,
    files: AHashMap<PathBuf, String>,
    module: Option<ModuleDescriptor>,
}

impl MemoryProject {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_module(mut self, module: ModuleDescriptor) -> Self {
        self.module = Some(module);
        self
    }

    /// Adds a file. Relative paths are resolved against the project root.
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        let path = self.root.join(path);
        self.files.insert(path, content.into());
        self
    }

    pub fn file(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

impl ProjectFiles for MemoryProject {
    fn project_root(&self, _path: &Path) -> PathBuf {
        self.root.clone()
    }

    fn end_of_file(&self, path: &Path) -> Result<LinePosition, LookupError> {
        Ok(self.file(path).map(end_position).unwrap_or_default())
    }

    fn existing_imports(&self, path: &Path) -> Result<Vec<String>, LookupError> {
        Ok(self.file(path).map(parse_imports).unwrap_or_default())
    }

    fn current_module(&self, _path: &Path) -> Option<ModuleDescriptor> {
        self.module.clone()
    }
}

/// A project read from the local file system.
#[derive(Debug, Clone)]
pub struct DiskProject {
    root: PathBuf,
}

impl DiskProject {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walks up from `start` to the nearest directory holding a package manifest.
    pub fn discover(start: &Path) -> Self {
        let start = if start.is_file() {
            start.parent().unwrap_or(start)
        } else {
            start
        };
        let root = start
            .ancestors()
            .find(|dir| dir.join(MANIFEST_FILE).is_file())
            .unwrap_or(start);
        Self::new(root)
    }

    fn read(&self, path: &Path) -> Result<Option<String>, LookupError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LookupError::Other(format!(
                "could not read '{}': {}",
                path.display(),
                e
            ))),
        }
    }
}

impl ProjectFiles for DiskProject {
    fn project_root(&self, _path: &Path) -> PathBuf {
        self.root.clone()
    }

    fn end_of_file(&self, path: &Path) -> Result<LinePosition, LookupError> {
        Ok(self
            .read(path)?
            .map(|text| end_position(&text))
            .unwrap_or_default())
    }

    fn existing_imports(&self, path: &Path) -> Result<Vec<String>, LookupError> {
        Ok(self
            .read(path)?
            .map(|text| parse_imports(&text))
            .unwrap_or_default())
    }

    fn current_module(&self, _path: &Path) -> Option<ModuleDescriptor> {
        let manifest = self.read(&self.root.join(MANIFEST_FILE)).ok()??;
        let table: toml::Table = manifest.parse().ok()?;
        let package = table.get("package")?.as_table()?;
        let org = package.get("org")?.as_str()?;
        let name = package.get("name")?.as_str()?;
        let version = package
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        Some(ModuleDescriptor {
            org: org.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}
