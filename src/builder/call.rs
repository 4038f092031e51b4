//! Calls to functions, methods, connector actions and constructors.
//!
//! All call kinds share the template shape (one property per catalog parameter, then
//! the result binding) and the argument rendering in [`params::call_arguments`].

use super::statement::result_name;
use super::{NodeBuilder, TemplateContext, names, params};
use crate::error::FlowError;
use crate::model::properties::{
    CHECK_ERROR_KEY, CONNECTION_KEY, RESOURCE_PATH_KEY, SCOPE_GLOBAL, SCOPE_KEY, SCOPE_LOCAL,
    TYPE_KEY, VARIABLE_KEY,
};
use crate::model::{
    FLAG_CHECKED, Node, NodeKind, ParameterKind, Properties, PropertiesBuilder, Property,
};
use crate::services::CatalogItem;
use crate::source::SourceBuilder;

/// One property per parameter of `item`, in signature order, carrying the imports each
/// parameter type needs.
fn parameter_properties(item: &CatalogItem) -> Properties {
    let mut builder = PropertiesBuilder::new();
    for p in &item.parameters {
        builder = builder.parameter(
            &p.name,
            &p.type_name,
            p.kind,
            p.default_value.as_deref(),
            &p.description,
        );
    }
    let mut properties = builder.build();
    for p in item.parameters.iter().filter(|p| !p.imports.is_empty()) {
        if let Some(property) = properties.get_mut(&p.name) {
            let codedata = property.codedata.get_or_insert_with(Default::default);
            for (prefix, id) in &p.imports {
                codedata.imports.insert(prefix.clone(), id.clone());
            }
        }
    }
    properties
}

/// Fills a call template from the catalog entry of its symbol. `head` holds the
/// properties that come before the parameters, such as the connection.
fn populate_call(mut node: Node, context: &TemplateContext<'_>, head: PropertiesBuilder) -> Node {
    let Some(item) = context.lookup() else {
        node.properties = head.build();
        return node;
    };

    node.metadata.description = item.description.clone();
    if item.icon.is_some() {
        node.metadata.icon = item.icon.clone();
    }
    if node.codedata.version.is_none() && !item.version.is_empty() {
        node.codedata.version = Some(item.version.clone());
    }

    let mut builder = head;
    for (key, property) in parameter_properties(&item) {
        builder = builder.custom(key, property);
    }
    if let Some(return_type) = item
        .return_type
        .as_deref()
        .filter(|t| !t.is_empty() && *t != "()")
    {
        let name = result_name(Some(return_type), context);
        builder = builder
            .data_type(Some(return_type), true)
            .variable(Some(&name), &Default::default(), "");
        if item
            .parameters
            .iter()
            .any(|p| p.kind == ParameterKind::ParamForTypeInfer)
        {
            node.codedata.inferred_return_type = Some(return_type.to_string());
        }
    }
    if item.can_fail {
        builder = builder.check_error(true);
        node.flags |= FLAG_CHECKED;
    }
    node.properties = builder.build();
    node
}

/// Whether the call is wrapped in `check`. The property wins over the template flag.
fn is_checked(source: &mut SourceBuilder<'_>) -> bool {
    match source.property(CHECK_ERROR_KEY) {
        Some(property) => property.as_bool(),
        None => source.node().is_checked(),
    }
}

/// `[T v =] [check] <callee>(<args>);`
fn render_call(source: &mut SourceBuilder<'_>, callee: &str) -> Result<(), FlowError> {
    source.new_variable_with_inferred_type();
    if is_checked(source) {
        source.token().keyword("check");
    }
    source.token().name(callee);
    params::call_arguments(source)?;
    source.token().end_of_statement();
    source.accept_import();
    source.text_edit();
    Ok(())
}

fn symbol<'a>(node: &'a Node) -> Result<&'a str, FlowError> {
    node.codedata
        .symbol
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FlowError::missing(&node.id, "symbol"))
}

/// The receiver of a method or action: the connection property, falling back to the
/// parent symbol recorded in codedata.
fn receiver(source: &mut SourceBuilder<'_>) -> Result<String, FlowError> {
    let node = source.node();
    source
        .text(CONNECTION_KEY)
        .or_else(|| node.codedata.parent_symbol.clone())
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| FlowError::missing(&node.id, CONNECTION_KEY))
}

fn connection_head(context: &TemplateContext<'_>) -> PropertiesBuilder {
    PropertiesBuilder::new().connection(context.codedata.parent_symbol.as_deref())
}

pub struct FunctionCallBuilder;

impl NodeBuilder for FunctionCallBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::FunctionCall
    }

    fn label(&self) -> &'static str {
        "Call Function"
    }

    fn description(&self) -> &'static str {
        "Call a function"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["function", "call"]
    }

    fn populate_template(&self, mut node: Node, context: &TemplateContext<'_>) -> Node {
        if let Some(symbol) = &context.codedata.symbol {
            node.metadata.label = symbol.clone();
        }
        populate_call(node, context, PropertiesBuilder::new())
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let symbol = symbol(source.node())?;
        let callee = match source.module_prefix() {
            Some(prefix) => format!("{}:{}", prefix, symbol),
            None => symbol.to_string(),
        };
        render_call(source, &callee)
    }
}

pub struct MethodCallBuilder;

impl NodeBuilder for MethodCallBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::MethodCall
    }

    fn label(&self) -> &'static str {
        "Method Call"
    }

    fn description(&self) -> &'static str {
        "Call a method of an object"
    }

    fn populate_template(&self, node: Node, context: &TemplateContext<'_>) -> Node {
        populate_call(node, context, connection_head(context))
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let method = symbol(source.node())?;
        let callee = format!("{}.{}", receiver(source)?, method);
        render_call(source, &callee)
    }
}

pub struct RemoteActionCallBuilder;

impl NodeBuilder for RemoteActionCallBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::RemoteActionCall
    }

    fn label(&self) -> &'static str {
        "Remote Action"
    }

    fn description(&self) -> &'static str {
        "Call a remote action of a connection"
    }

    fn populate_template(&self, node: Node, context: &TemplateContext<'_>) -> Node {
        populate_call(node, context, connection_head(context))
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let action = symbol(source.node())?;
        let callee = format!("{}->{}", receiver(source)?, action);
        render_call(source, &callee)
    }
}

pub struct ResourceActionCallBuilder;

impl NodeBuilder for ResourceActionCallBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::ResourceActionCall
    }

    fn label(&self) -> &'static str {
        "Resource Action"
    }

    fn description(&self) -> &'static str {
        "Call a resource of a connection"
    }

    fn populate_template(&self, node: Node, context: &TemplateContext<'_>) -> Node {
        let item_path = context.lookup().and_then(|item| item.resource_path);
        let path = item_path
            .or_else(|| context.codedata.resource_path.clone())
            .unwrap_or_else(|| "/".to_string());
        let mut node = populate_call(node, context, connection_head(context));
        // The path sits right after the connection.
        let properties = std::mem::take(&mut node.properties);
        let mut builder = PropertiesBuilder::new();
        let mut placed = false;
        for (key, property) in properties {
            let is_connection = key == CONNECTION_KEY;
            builder = builder.custom(key, property);
            if is_connection {
                builder = builder.resource_path(&path);
                placed = true;
            }
        }
        if !placed {
            builder = builder.resource_path(&path);
        }
        node.properties = builder.build();
        node.codedata.resource_path = Some(path);
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let node = source.node();
        let method = symbol(node)?;
        let connection = receiver(source)?;
        let template = source
            .text(RESOURCE_PATH_KEY)
            .or_else(|| node.codedata.resource_path.clone())
            .unwrap_or_else(|| "/".to_string());
        let path = substitute_path_params(node, &template)?;
        let callee = format!("{}->{}.{}", connection, path, method);
        render_call(source, &callee)
    }
}

/// Replaces each `[T name]` segment of a resource path with `[<value of name>]`, taking
/// the values from the node's path-parameter properties.
pub fn substitute_path_params(node: &Node, template: &str) -> Result<String, FlowError> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template.trim();
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|i| open + i) else {
            return Err(FlowError::malformed(
                &node.id,
                RESOURCE_PATH_KEY,
                format!("has an unclosed segment in '{}'", template),
            ));
        };
        path.push_str(&rest[..open]);
        let segment = &rest[open + 1..close];
        let name = segment
            .split_whitespace()
            .last()
            .unwrap_or(segment)
            .trim_start_matches("...");
        let value = node
            .properties
            .get(name)
            .filter(|p| p.param_kind() == Some(ParameterKind::PathParam) || p.param_kind().is_none())
            .filter(|p| !p.is_empty())
            .map(Property::to_source);
        match value {
            Some(value) => {
                path.push('[');
                path.push_str(&value);
                path.push(']');
            }
            // Segments that already hold an expression are kept as written.
            None if !segment.contains(char::is_whitespace) => {
                path.push_str(&rest[open..=close]);
            }
            None => return Err(FlowError::missing(&node.id, name)),
        }
        rest = &rest[close + 1..];
    }
    path.push_str(rest);
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    Ok(path)
}

pub struct NewConnectionBuilder;

impl NodeBuilder for NewConnectionBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::NewConnection
    }

    fn label(&self) -> &'static str {
        "New Connection"
    }

    fn description(&self) -> &'static str {
        "Create a new connection to an external service"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["connection", "client", "connector"]
    }

    fn populate_template(&self, node: Node, context: &TemplateContext<'_>) -> Node {
        let mut node = populate_call(node, context, PropertiesBuilder::new());
        let prefix = node.codedata.module_prefix().unwrap_or_default().to_string();
        let object = node.codedata.object.clone().unwrap_or_else(|| "Client".to_string());
        let type_name = if prefix.is_empty() {
            object.clone()
        } else {
            format!("{}:{}", prefix, object)
        };
        let name = names::generate(
            &format!("{}{}", prefix, object),
            &context.visible_names(),
        );
        node.properties = PropertiesBuilder::from_properties(std::mem::take(&mut node.properties))
            .data_type(Some(&type_name), false)
            .variable(Some(&names::lower_first(&name)), &Default::default(), "")
            .scope(SCOPE_GLOBAL)
            .check_error(true)
            .build();
        node.flags |= FLAG_CHECKED;
        node
    }

    /// Global connections are `final` module-level declarations; local ones are plain
    /// statements in place.
    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        source.require(TYPE_KEY)?;
        source.require(VARIABLE_KEY)?;
        let local = source
            .text(SCOPE_KEY)
            .is_some_and(|scope| scope == SCOPE_LOCAL);
        if !local {
            source.token().keyword("final");
        }
        render_constructor(source)
    }
}

/// `T v = [check] new (<args>);`
fn render_constructor(source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
    source.new_variable();
    if is_checked(source) {
        source.token().keyword("check");
    }
    source.token().keyword("new");
    params::call_arguments(source)?;
    source.token().end_of_statement();
    source.accept_import();
    source.text_edit();
    Ok(())
}

pub struct ClassInitBuilder;

impl NodeBuilder for ClassInitBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::ClassInit
    }

    fn label(&self) -> &'static str {
        "New Object"
    }

    fn description(&self) -> &'static str {
        "Create a new instance of a class"
    }

    fn populate_template(&self, node: Node, context: &TemplateContext<'_>) -> Node {
        let mut node = populate_call(node, context, PropertiesBuilder::new());
        if let Some(object) = node.codedata.object.clone() {
            let type_name = match node.codedata.module_prefix() {
                Some(prefix) => format!("{}:{}", prefix, object),
                None => object.clone(),
            };
            let name = names::generate(&names::lower_first(&object), &context.visible_names());
            node.properties =
                PropertiesBuilder::from_properties(std::mem::take(&mut node.properties))
                    .data_type(Some(&type_name), true)
                    .variable(Some(&name), &Default::default(), "")
                    .build();
        }
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        source.require(TYPE_KEY)?;
        source.require(VARIABLE_KEY)?;
        render_constructor(source)
    }
}
