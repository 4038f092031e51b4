//! Source text emission.
//!
//! A [`SourceBuilder`] is created per node render. Builders push tokens through
//! [`SourceBuilder::token`] and close each edit with `text_edit` or one of its variants.
//! Child nodes are rendered in their own nested builders, so token state never crosses
//! between a parent and its children; only finished text, imports and edits to other
//! files flow back up.

mod files;
mod format;
mod token;

pub use files::{FileFamily, Target, located_path, resolve_target};
pub use token::TokenBuilder;

use crate::builder::registry::NodeRegistry;
use crate::config::GeneratorConfig;
use crate::error::FlowError;
use crate::model::properties::{
    IGNORE_KEY, ON_ERROR_TYPE_KEY, ON_ERROR_VARIABLE_KEY, TYPE_KEY, VARIABLE_KEY,
};
use crate::model::{
    Branch, LinePosition, LineRange, Node, ON_FAILURE_LABEL, ParameterKind, Property, TextEdit,
};
use crate::services::ProjectFiles;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Text edits grouped by the file they apply to.
pub type SourceEdits = BTreeMap<PathBuf, Vec<TextEdit>>;

/// Read-only inputs shared by every builder in a render pass.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub registry: &'a NodeRegistry,
    pub project: &'a dyn ProjectFiles,
    pub config: &'a GeneratorConfig,
}

pub struct SourceBuilder<'a> {
    node: &'a Node,
    ctx: RenderContext<'a>,
    requested: PathBuf,
    target: Target,
    nested: bool,
    tokens: TokenBuilder,
    edits: SourceEdits,
    imports: BTreeSet<String>,
    primary: Option<String>,
}

impl<'a> SourceBuilder<'a> {
    /// Starts a top-level render of `node`, requested against `requested`.
    pub fn new(node: &'a Node, ctx: RenderContext<'a>, requested: &Path) -> Result<Self, FlowError> {
        let target = resolve_target(node, requested, ctx.project, ctx.config)?;
        Ok(Self {
            node,
            ctx,
            requested: requested.to_path_buf(),
            target,
            nested: false,
            tokens: TokenBuilder::new(),
            edits: SourceEdits::new(),
            imports: BTreeSet::new(),
            primary: None,
        })
    }

    fn nested(node: &'a Node, parent: &SourceBuilder<'a>) -> Self {
        Self {
            node,
            ctx: parent.ctx,
            requested: parent.requested.clone(),
            target: Target {
                family: None,
                ..parent.target.clone()
            },
            nested: true,
            tokens: TokenBuilder::new(),
            edits: SourceEdits::new(),
            imports: BTreeSet::new(),
            primary: None,
        }
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn config(&self) -> &'a GeneratorConfig {
        self.ctx.config
    }

    pub fn token(&mut self) -> &mut TokenBuilder {
        &mut self.tokens
    }

    /// Looks up a node property and records the imports its value needs.
    pub fn property(&mut self, key: &str) -> Option<&'a Property> {
        let property = self.node.properties.get(key)?;
        self.imports.extend(property.imports().map(str::to_string));
        Some(property)
    }

    /// A property that must be present, non-empty and well formed.
    pub fn require(&mut self, key: &str) -> Result<&'a Property, FlowError> {
        let node: &'a Node = self.node;
        let node_id = &node.id;
        let property = self
            .property(key)
            .filter(|p| !p.is_empty() || !p.placeholder.is_empty())
            .ok_or_else(|| FlowError::missing(node_id, key))?;
        property
            .validate_shape()
            .map_err(|reason| FlowError::malformed(node_id, key, reason))?;
        Ok(property)
    }

    /// A required property of a branch.
    pub fn require_in(&mut self, branch: &'a Branch, key: &str) -> Result<&'a Property, FlowError> {
        let property = branch
            .property(key)
            .filter(|p| !p.is_empty() || !p.placeholder.is_empty())
            .ok_or_else(|| {
                FlowError::malformed(
                    &self.node.id,
                    key,
                    format!("is required on branch '{}'", branch.label),
                )
            })?;
        self.imports.extend(property.imports().map(str::to_string));
        Ok(property)
    }

    /// The source text of a property, when present and non-empty.
    pub fn text(&mut self, key: &str) -> Option<String> {
        self.property(key)
            .filter(|p| !p.is_empty())
            .map(Property::to_source)
    }

    pub fn flag(&mut self, key: &str) -> bool {
        self.property(key).is_some_and(Property::as_bool)
    }

    /// `<type> <variable> = ` when the node declares a variable.
    pub fn new_variable(&mut self) -> &mut Self {
        self.new_variable_typed(TYPE_KEY)
    }

    pub fn new_variable_typed(&mut self, type_key: &str) -> &mut Self {
        if self.typed_binding(type_key) {
            self.tokens.equal();
        }
        self
    }

    /// Like [`new_variable`](Self::new_variable), but for calls whose result type is
    /// named by a type-inferring parameter: `targetType|error` with `targetType = Order`
    /// declares `Order|error`. Without a value for that parameter the declared type is
    /// used unchanged.
    pub fn new_variable_with_inferred_type(&mut self) -> &mut Self {
        let node: &'a Node = self.node;
        let Some(return_type) = node.codedata.inferred_return_type.as_deref() else {
            return self.new_variable();
        };
        let inferred = node
            .properties
            .iter()
            .find(|(_, p)| p.param_kind() == Some(ParameterKind::ParamForTypeInfer));
        let Some((key, parameter)) = inferred else {
            return self.new_variable();
        };
        let Some(value) = self.text(key) else {
            return self.new_variable();
        };
        let Some(variable) = self.text(VARIABLE_KEY) else {
            return self;
        };
        let label = parameter.original_name().unwrap_or(key.as_str());
        let type_name = replace_identifier(return_type, label, value.trim());
        self.tokens.typed_binding(&type_name, &variable);
        self.tokens.equal();
        self
    }

    /// `<type> <variable>`; returns whether anything was written.
    pub fn typed_binding(&mut self, type_key: &str) -> bool {
        let variable = self.text(VARIABLE_KEY);
        let type_name = self.property(type_key).map(Property::to_source);
        match (type_name, variable) {
            (Some(type_name), Some(variable)) if !type_name.is_empty() => {
                self.tokens.typed_binding(&type_name, &variable);
                true
            }
            _ => false,
        }
    }

    /// The prefix that qualifies the node's symbol, or `None` when the symbol belongs to
    /// the module being edited.
    pub fn module_prefix(&self) -> Option<&'a str> {
        let node: &'a Node = self.node;
        let codedata = &node.codedata;
        let prefix = codedata.module_prefix()?;
        let current = self.ctx.project.current_module(&self.target.path);
        let is_current = current.is_some_and(|m| {
            codedata.org.as_deref() == Some(m.org.as_str())
                && codedata.module.as_deref() == Some(m.name.as_str())
        });
        (!is_current).then_some(prefix)
    }

    /// Records an import of the node's own module.
    pub fn accept_import(&mut self) -> &mut Self {
        if let Some(id) = self.node.codedata.module_id() {
            self.imports.insert(id);
        }
        self
    }

    pub fn import(&mut self, org: &str, module: &str) -> &mut Self {
        if !org.is_empty() && !module.is_empty() {
            self.imports.insert(format!("{}/{}", org, module));
        }
        self
    }

    /// Renders a single child node, returning the text of its statement.
    pub fn render_child(&mut self, child: &'a Node) -> Result<Option<String>, FlowError> {
        let builder = self.ctx.registry.resolve(child.kind)?;
        let mut sub = SourceBuilder::nested(child, self);
        builder.render(&mut sub)?;
        for (path, mut edits) in sub.edits {
            self.edits.entry(path).or_default().append(&mut edits);
        }
        self.imports.append(&mut sub.imports);
        Ok(sub.primary)
    }

    /// Renders `children` one after another as lines of the current block.
    pub fn children(&mut self, children: &'a [Node]) -> Result<&mut Self, FlowError> {
        for child in children {
            if let Some(text) = self.render_child(child)? {
                self.tokens.block(text);
            }
        }
        Ok(self)
    }

    /// `{ <children> }`
    pub fn body(&mut self, children: &'a [Node]) -> Result<&mut Self, FlowError> {
        self.tokens.open_brace();
        self.children(children)?;
        self.tokens.close_brace();
        Ok(self)
    }

    /// Appends `on fail <type> <variable> { ... }` when the node has a failure branch
    /// that is not ignored.
    pub fn on_failure(&mut self) -> Result<&mut Self, FlowError> {
        let node = self.node;
        let Some(branch) = node.branch(ON_FAILURE_LABEL) else {
            return Ok(self);
        };
        if branch.property(IGNORE_KEY).is_some_and(Property::as_bool) {
            return Ok(self);
        }
        self.tokens.keyword("on").keyword("fail");
        let error_type = branch.property(ON_ERROR_TYPE_KEY).map(Property::to_source);
        let error_variable = branch.property(ON_ERROR_VARIABLE_KEY).map(Property::to_source);
        if let (Some(error_type), Some(error_variable)) = (error_type, error_variable) {
            if !error_type.is_empty() && !error_variable.is_empty() {
                self.tokens.typed_binding(&error_type, &error_variable);
            }
        }
        self.body(&branch.children)
    }

    /// Closes the current tokens into the node's primary edit.
    pub fn text_edit(&mut self) -> &mut Self {
        let text = self.tokens.take(self.ctx.config.indent_width);
        if self.nested {
            self.primary = Some(text);
            return self;
        }
        let text = if self.target.family.is_some() {
            format!("\n{}\n", text)
        } else {
            text
        };
        let edit = TextEdit::new(self.target.range.clone(), text);
        self.edits
            .entry(self.target.path.clone())
            .or_default()
            .push(edit);
        self
    }

    /// The project file a recorded range points into. Ranges without a file name refer
    /// to the node's own target file.
    pub fn path_of(&self, range: &LineRange) -> PathBuf {
        if range.file_name.is_empty() {
            return self.target.path.clone();
        }
        self.ctx
            .project
            .project_root(&self.requested)
            .join(&range.file_name)
    }

    /// Closes the current tokens into an edit of an explicit file and range.
    pub fn text_edit_at(&mut self, path: PathBuf, range: LineRange) -> &mut Self {
        let text = self.tokens.take(self.ctx.config.indent_width);
        self.edits
            .entry(path)
            .or_default()
            .push(TextEdit::new(range, text));
        self
    }

    /// Closes the current tokens into an append at the end of a family's file.
    pub fn text_edit_in(&mut self, family: FileFamily) -> Result<&mut Self, FlowError> {
        let path = family.path(&self.requested, self.ctx.project, self.ctx.config);
        let end = self
            .ctx
            .project
            .end_of_file(&path)
            .map_err(|e| e.into_flow_error("project"))?;
        let text = self.tokens.take(self.ctx.config.indent_width);
        self.edits
            .entry(path)
            .or_default()
            .push(TextEdit::new(LineRange::at(end), format!("\n{}\n", text)));
        Ok(self)
    }

    /// Finishes a top-level render, adding import edits to the target file.
    pub fn build(mut self) -> SourceEdits {
        if !self.nested {
            self.add_imports();
        }
        self.edits
    }

    fn add_imports(&mut self) {
        if self.imports.is_empty() {
            return;
        }
        let path = self.target.path.clone();
        let project = self.ctx.project;
        let current = project.current_module(&path);
        let existing = project.existing_imports(&path).unwrap_or_else(|e| {
            tracing::warn!("Could not read imports of {}: {}", path.display(), e);
            Vec::new()
        });

        let mut import_edits = Vec::new();
        for id in &self.imports {
            if is_predeclared(id)
                || existing.iter().any(|e| e == id)
                || current.as_ref().is_some_and(|m| &m.id() == id)
            {
                continue;
            }
            let id = match &current {
                Some(module) if self.node.codedata.is_generated => {
                    generated_import(id, &module.org, &module.name)
                }
                _ => id.clone(),
            };
            import_edits.push(TextEdit::new(
                LineRange::at(LinePosition::start()),
                format!("import {};\n", id),
            ));
        }
        if import_edits.is_empty() {
            return;
        }
        let edits = self.edits.entry(path).or_default();
        import_edits.append(edits);
        *edits = import_edits;
    }
}

/// Language modules are in scope without an import.
fn is_predeclared(id: &str) -> bool {
    id.starts_with("ballerina/lang.") || !id.contains('/')
}

/// Generated code lives in a sub-module, so sibling modules of the same org are
/// addressed through the current module.
fn generated_import(id: &str, org: &str, current: &str) -> String {
    match id.split_once('/') {
        Some((id_org, module)) if id_org == org && !module.starts_with(current) => {
            format!("{}/{}.{}", org, current, module)
        }
        _ => id.to_string(),
    }
}

/// Replaces whole-identifier occurrences of `name` in `text`.
fn replace_identifier(text: &str, name: &str, with: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(|c: char| c.is_alphanumeric() || c == '_') {
        out.push_str(&rest[..start]);
        let word = &rest[start..];
        let end = word
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(word.len());
        let ident = &word[..end];
        out.push_str(if ident == name { with } else { ident });
        rest = &word[end..];
    }
    out.push_str(rest);
    out
}
