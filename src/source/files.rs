use crate::config::GeneratorConfig;
use crate::error::FlowError;
use crate::model::properties::{SCOPE_KEY, SCOPE_LOCAL};
use crate::model::{LineRange, Node, NodeKind};
use crate::services::ProjectFiles;
use std::path::{Path, PathBuf};

/// Construct families that own an auxiliary file for first-time declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFamily {
    Connections,
    DataMappings,
    Functions,
    Automation,
    Agents,
}

impl FileFamily {
    /// The family `node` belongs to when requested against `requested`.
    ///
    /// Definitions, class initializations and action calls requested against the
    /// agents file are part of the agent family.
    pub fn of(node: &Node, requested: &Path, config: &GeneratorConfig) -> Option<Self> {
        let in_agents_file = requested
            .file_name()
            .is_some_and(|name| name.to_string_lossy() == config.files.agents);
        if in_agents_file
            && matches!(
                node.kind,
                NodeKind::FunctionDefinition
                    | NodeKind::ClassInit
                    | NodeKind::ResourceActionCall
                    | NodeKind::RemoteActionCall
            )
        {
            return Some(FileFamily::Agents);
        }
        match node.kind {
            NodeKind::NewConnection => {
                let local = node
                    .property(SCOPE_KEY)
                    .and_then(|scope| scope.text())
                    .is_some_and(|scope| scope == SCOPE_LOCAL);
                (!local).then_some(FileFamily::Connections)
            }
            NodeKind::DataMapperDefinition => Some(FileFamily::DataMappings),
            NodeKind::FunctionDefinition | NodeKind::NpFunction => Some(FileFamily::Functions),
            NodeKind::Automation => Some(FileFamily::Automation),
            _ => None,
        }
    }

    pub fn file_name<'c>(&self, config: &'c GeneratorConfig) -> &'c str {
        match self {
            FileFamily::Connections => &config.files.connections,
            FileFamily::DataMappings => &config.files.data_mappings,
            FileFamily::Functions => &config.files.functions,
            FileFamily::Automation => &config.files.automation,
            FileFamily::Agents => &config.files.agents,
        }
    }

    /// The family file inside the project containing `requested`.
    pub fn path(&self, requested: &Path, project: &dyn ProjectFiles, config: &GeneratorConfig) -> PathBuf {
        project.project_root(requested).join(self.file_name(config))
    }
}

/// Where a node's primary edit goes.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub path: PathBuf,
    pub range: LineRange,
    /// Set when the edit appends to an auxiliary file rather than replacing in place.
    pub family: Option<FileFamily>,
}

/// Picks the file and range for a node's primary edit.
///
/// New nodes, and nodes without a known location, append to the auxiliary file of their
/// family. Nodes with a location are replaced in place; when the request names a
/// directory instead of a source file, the file name recorded in the range is used.
pub fn resolve_target(
    node: &Node,
    requested: &Path,
    project: &dyn ProjectFiles,
    config: &GeneratorConfig,
) -> Result<Target, FlowError> {
    let line_range = node.codedata.line_range.as_ref();
    if node.codedata.is_new || line_range.is_none() {
        if let Some(family) = FileFamily::of(node, requested, config) {
            let path = family.path(requested, project, config);
            let end = project
                .end_of_file(&path)
                .map_err(|e| e.into_flow_error("project"))?;
            return Ok(Target {
                path,
                range: LineRange::at(end),
                family: Some(family),
            });
        }
    }

    let range = line_range.ok_or_else(|| {
        FlowError::malformed(
            &node.id,
            "lineRange",
            format!(
                "is required: {} nodes have no default file to be created in",
                node.kind
            ),
        )
    })?;

    Ok(Target {
        path: located_path(requested, range, config),
        range: range.without_file(),
        family: None,
    })
}

/// The file an existing range lives in. A request naming a directory is joined with the
/// file name recorded in the range.
pub fn located_path(requested: &Path, range: &LineRange, config: &GeneratorConfig) -> PathBuf {
    if requested
        .to_string_lossy()
        .ends_with(config.source_extension.as_str())
        || range.file_name.is_empty()
    {
        requested.to_path_buf()
    } else {
        requested.join(&range.file_name)
    }
}
