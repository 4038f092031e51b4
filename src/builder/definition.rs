//! Module-level function declarations: plain functions, natural functions and the
//! automation entry point.

use super::params::{self, DeclaredParameter};
use super::{NodeBuilder, TemplateContext, names};
use crate::error::FlowError;
use crate::model::properties::{
    BODY_KEY, DESCRIPTION_KEY, FUNCTION_NAME_KEY, PARAMETERS_KEY, PROMPT_KEY,
    RETURN_DESCRIPTION_KEY, RETURN_ERROR_KEY, TYPE_KEY,
};
use crate::model::{BODY_LABEL, Branch, Node, NodeKind, PropertiesBuilder, Property, ValueType};
use crate::services::RecordField;
use crate::source::{SourceBuilder, TokenBuilder};
use itertools::Itertools;

/// `# description`, `# + p - doc` and `# + return - doc` lines. Nothing is written when
/// no documentation is present.
pub(crate) fn doc_comments(
    tokens: &mut TokenBuilder,
    description: Option<&str>,
    parameters: &[DeclaredParameter],
    return_description: Option<&str>,
) {
    if let Some(description) = description {
        for line in description.lines() {
            tokens.name(format!("# {}", line.trim()).trim_end()).newline();
        }
    }
    for parameter in parameters {
        if let Some(doc) = &parameter.description {
            tokens
                .name(format!("# + {} - {}", parameter.name, doc))
                .newline();
        }
    }
    if let Some(doc) = return_description {
        tokens.name(format!("# + return - {}", doc)).newline();
    }
}

/// `function name(T a, U b) returns R`
pub(crate) fn signature(
    tokens: &mut TokenBuilder,
    name: &str,
    parameters: &[DeclaredParameter],
    return_type: Option<&str>,
) {
    tokens
        .keyword("function")
        .name(format!("{}({})", name, params::parameter_list(parameters)));
    if let Some(return_type) = return_type.filter(|t| !t.trim().is_empty()) {
        tokens.keyword("returns").name(return_type);
    }
}

/// Adds `error` to a return type, `error?` when there is none.
fn with_error(return_type: Option<String>) -> String {
    match return_type {
        None => "error?".to_string(),
        Some(t) if t.split('|').any(|member| member.trim().trim_end_matches('?') == "error") => t,
        Some(t) => format!("{}|error", t),
    }
}

/// The repeatable group of declared parameters.
pub(crate) fn parameters_group(builder: PropertiesBuilder, key: &str) -> PropertiesBuilder {
    builder.nested().end_nested(
        ValueType::RepeatableProperty,
        key,
        "Parameters",
        "Parameters of the function",
    )
}

pub(crate) fn return_type_property(label: &str, value: Option<&str>, optional: bool) -> Property {
    Property::builder()
        .label(label)
        .description("Type of the returned value")
        .value_type(ValueType::Type)
        .value(value.unwrap_or_default())
        .optional(optional)
        .build()
}

fn return_description_property() -> Property {
    Property::builder()
        .label("Return Description")
        .description("Documentation of the returned value")
        .value_type(ValueType::String)
        .optional(true)
        .build()
}

pub struct FunctionDefinitionBuilder;

impl NodeBuilder for FunctionDefinitionBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::FunctionDefinition
    }

    fn label(&self) -> &'static str {
        "Function"
    }

    fn description(&self) -> &'static str {
        "Define a new function"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["function", "define"]
    }

    fn populate_template(&self, mut node: Node, context: &TemplateContext<'_>) -> Node {
        let name = names::generate("function", &context.visible_names());
        let builder = PropertiesBuilder::new()
            .function_name(&name, true)
            .description(None);
        node.properties = parameters_group(builder, PARAMETERS_KEY)
            .custom(TYPE_KEY, return_type_property("Return Type", None, true))
            .custom(RETURN_DESCRIPTION_KEY, return_description_property())
            .return_error(false)
            .build();
        node.branches = vec![Branch::block(BODY_LABEL)];
        node
    }

    /// New functions are written whole; existing ones only get their signature
    /// regenerated, leaving the body untouched.
    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let node = source.node();
        let name = source.require(FUNCTION_NAME_KEY)?.to_source();
        let parameters = params::declared_parameters(source, PARAMETERS_KEY)?;
        let mut return_type = source.text(TYPE_KEY);
        if source.flag(RETURN_ERROR_KEY) {
            return_type = Some(with_error(return_type));
        }
        let description = source.text(DESCRIPTION_KEY);
        let return_description = source.text(RETURN_DESCRIPTION_KEY);

        doc_comments(
            source.token(),
            description.as_deref(),
            &parameters,
            return_description.as_deref(),
        );
        signature(source.token(), &name, &parameters, return_type.as_deref());
        if source.target().family.is_some() {
            let children = node
                .branch(BODY_LABEL)
                .map(|b| b.children.as_slice())
                .unwrap_or_default();
            source.body(children)?;
        }
        source.text_edit();
        Ok(())
    }
}

pub struct NpFunctionBuilder;

impl NodeBuilder for NpFunctionBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::NpFunction
    }

    fn label(&self) -> &'static str {
        "Natural Function"
    }

    fn description(&self) -> &'static str {
        "Define a function whose body is a natural language prompt"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["natural", "prompt", "llm"]
    }

    fn populate_template(&self, mut node: Node, context: &TemplateContext<'_>) -> Node {
        let name = names::generate("npFunction", &context.visible_names());
        let builder = PropertiesBuilder::new()
            .function_name(&name, true)
            .description(None);
        node.properties = parameters_group(builder, PARAMETERS_KEY)
            .custom(TYPE_KEY, return_type_property("Return Type", Some("string"), false))
            .custom(
                PROMPT_KEY,
                Property::builder()
                    .label("Prompt")
                    .description("Prompt for the function")
                    .value_type(ValueType::RawTemplate)
                    .build(),
            )
            .build();
        node
    }

    /// `function f(T a) returns R|error => natural { <prompt> };`
    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let name = source.require(FUNCTION_NAME_KEY)?.to_source();
        let prompt = source.require(PROMPT_KEY)?.to_source();
        let parameters = params::declared_parameters(source, PARAMETERS_KEY)?;
        let return_type = with_error(Some(
            source.text(TYPE_KEY).unwrap_or_else(|| "anydata".to_string()),
        ));
        let description = source.text(DESCRIPTION_KEY);

        let tokens = source.token();
        doc_comments(tokens, description.as_deref(), &parameters, None);
        signature(tokens, &name, &parameters, Some(&return_type));
        tokens
            .right_double_arrow()
            .keyword("natural")
            .open_brace()
            .block(prompt.trim().to_string())
            .close_brace()
            .end_of_statement();
        source.text_edit();
        Ok(())
    }
}

pub struct AutomationBuilder;

impl NodeBuilder for AutomationBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Automation
    }

    fn label(&self) -> &'static str {
        "Automation"
    }

    fn description(&self) -> &'static str {
        "Entry point of an automation that runs on demand or on a schedule"
    }

    fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
        node.properties = parameters_group(PropertiesBuilder::new(), PARAMETERS_KEY).build();
        node.branches = vec![Branch::block(BODY_LABEL)];
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let node = source.node();
        let parameters = params::declared_parameters(source, PARAMETERS_KEY)?;
        source.token().keyword("public");
        signature(source.token(), "main", &parameters, Some("error?"));

        if source.target().family.is_some() {
            let children = node
                .branch(BODY_LABEL)
                .map(|b| b.children.as_slice())
                .unwrap_or_default();
            source.token().open_brace().keyword("do");
            source.body(children)?;
            source
                .token()
                .keyword("on")
                .keyword("fail")
                .typed_binding("error", "e")
                .open_brace()
                .name("log:printError(\"Error occurred\", 'error = e)")
                .end_of_statement()
                .keyword("return")
                .name("e")
                .end_of_statement()
                .close_brace()
                .close_brace();
            source.import("ballerina", "log");
        }
        source.text_edit();
        Ok(())
    }
}

/// The declaration body of a data mapping, defaulting by return type when empty.
pub(crate) fn mapping_body(source: &mut SourceBuilder<'_>, return_type: &str) -> String {
    source
        .text(BODY_KEY)
        .unwrap_or_else(|| default_body(return_type).to_string())
}

/// `{a: <default>, b: <default>}` over the fields of a record type.
pub fn record_body(fields: &[RecordField]) -> String {
    let entries = fields
        .iter()
        .map(|field| format!("{}: {}", field.name, default_body(&field.type_name)))
        .join(", ");
    format!("{{{}}}", entries)
}

/// A value of `type_name` usable as a placeholder body.
pub fn default_body(type_name: &str) -> &'static str {
    let type_name = type_name.trim();
    if type_name.ends_with('?') || type_name == "()" {
        return "()";
    }
    if type_name.ends_with(']') {
        return "[]";
    }
    match type_name {
        "int" | "byte" => "0",
        "float" => "0.0",
        "decimal" => "0d",
        "string" => "\"\"",
        "boolean" => "false",
        _ => "{}",
    }
}
