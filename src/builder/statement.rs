//! Simple statements: expressions, declarations, assignments, comments and payloads.

use super::{NodeBuilder, TemplateContext, names};
use crate::error::FlowError;
use crate::model::properties::{COMMENT_KEY, EXPRESSION_KEY, STATEMENT_KEY, TYPE_KEY, VARIABLE_KEY};
use crate::model::{Node, NodeKind, PropertiesBuilder, Property, ValueType};
use crate::source::SourceBuilder;

pub struct ExpressionBuilder;

impl NodeBuilder for ExpressionBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Expression
    }

    fn label(&self) -> &'static str {
        "Custom Expression"
    }

    fn description(&self) -> &'static str {
        "Represents a custom Ballerina expression"
    }

    fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
        node.properties = PropertiesBuilder::new().statement(None).build();
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let statement = source.require(STATEMENT_KEY)?;
        let text = statement.to_source();
        let text = text.trim().trim_end_matches(';');
        source.token().name(text).end_of_statement();
        source.text_edit();
        Ok(())
    }
}

pub struct VariableBuilder;

impl NodeBuilder for VariableBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Variable
    }

    fn label(&self) -> &'static str {
        "Declare Variable"
    }

    fn description(&self) -> &'static str {
        "New variable with type"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["variable", "declare", "let"]
    }

    fn populate_template(&self, mut node: Node, context: &TemplateContext<'_>) -> Node {
        let visible = context.visible_names();
        node.properties = PropertiesBuilder::new()
            .data_type(None, true)
            .variable(None, &visible, "var")
            .optional_expression(None, "Expression", "Initialize with value")
            .build();
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let variable = source.require(VARIABLE_KEY)?;
        if !source.typed_binding(TYPE_KEY) {
            source.token().keyword("var").expression(variable);
        }
        if let Some(initializer) = source.text(EXPRESSION_KEY) {
            source.token().equal().name(initializer);
        }
        source.token().end_of_statement();
        source.text_edit();
        Ok(())
    }
}

pub struct AssignBuilder;

impl NodeBuilder for AssignBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Assign
    }

    fn label(&self) -> &'static str {
        "Assign"
    }

    fn description(&self) -> &'static str {
        "Assign a value to a variable"
    }

    fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
        node.properties = PropertiesBuilder::new()
            .custom(
                VARIABLE_KEY,
                Property::builder()
                    .label("Variable")
                    .description("Name of the variable or field to assign to")
                    .value_type(ValueType::Identifier)
                    .build(),
            )
            .expression(None, "Expression", "Assign value")
            .build();
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let variable = source.require(VARIABLE_KEY)?;
        let expression = source.require(EXPRESSION_KEY)?;
        source
            .token()
            .expression(variable)
            .equal()
            .expression(expression)
            .end_of_statement();
        source.text_edit();
        Ok(())
    }
}

pub struct ConfigVariableBuilder;

impl NodeBuilder for ConfigVariableBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::ConfigVariable
    }

    fn label(&self) -> &'static str {
        "Config"
    }

    fn description(&self) -> &'static str {
        "Create a configurable variable"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["configurable", "config", "environment"]
    }

    fn populate_template(&self, mut node: Node, context: &TemplateContext<'_>) -> Node {
        let visible = context.visible_names();
        node.properties = PropertiesBuilder::new()
            .data_type(Some("string"), true)
            .variable(None, &visible, "config")
            .optional_expression(None, "Default Value", "Default value of the configurable")
            .build();
        node
    }

    /// `configurable T name = value;`, with `?` standing in for a missing default.
    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let type_name = source.require(TYPE_KEY)?;
        let variable = source.require(VARIABLE_KEY)?;
        let default_value = source.text(EXPRESSION_KEY).unwrap_or_else(|| "?".to_string());
        source
            .token()
            .keyword("configurable")
            .typed_binding(&type_name.to_source(), &variable.to_source())
            .equal()
            .name(default_value)
            .end_of_statement();
        source.text_edit();
        Ok(())
    }
}

pub struct CommentBuilder;

impl NodeBuilder for CommentBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Comment
    }

    fn label(&self) -> &'static str {
        "Comment"
    }

    fn description(&self) -> &'static str {
        "Comment to describe the flow"
    }

    fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
        node.properties = PropertiesBuilder::new().comment(None).build();
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let comment = source.require(COMMENT_KEY)?.to_source();
        let tokens = source.token();
        for line in comment.lines() {
            let line = line.trim_start_matches("//").trim();
            if line.is_empty() {
                tokens.name("//").newline();
            } else {
                tokens.name(format!("// {}", line)).newline();
            }
        }
        source.text_edit();
        Ok(())
    }
}

/// Variable declarations of a fixed payload type.
macro_rules! payload_builder {
    ($name:ident, $kind:path, $label:literal, $description:literal, $type_name:literal, $prefix:literal, $placeholder:literal) => {
        pub struct $name;

        impl NodeBuilder for $name {
            fn kind(&self) -> NodeKind {
                $kind
            }

            fn label(&self) -> &'static str {
                $label
            }

            fn description(&self) -> &'static str {
                $description
            }

            fn populate_template(&self, mut node: Node, context: &TemplateContext<'_>) -> Node {
                let visible = context.visible_names();
                node.properties = PropertiesBuilder::new()
                    .data_type(Some($type_name), false)
                    .variable(None, &visible, $prefix)
                    .custom(
                        EXPRESSION_KEY,
                        Property::builder()
                            .label("Payload")
                            .description($description)
                            .value_type(ValueType::RawTemplate)
                            .placeholder($placeholder)
                            .build(),
                    )
                    .build();
                node
            }

            fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
                let variable = source.require(VARIABLE_KEY)?.to_source();
                let payload = source.require(EXPRESSION_KEY)?;
                let type_name = source
                    .text(TYPE_KEY)
                    .unwrap_or_else(|| $type_name.to_string());
                source
                    .token()
                    .typed_binding(&type_name, &variable)
                    .equal()
                    .expression(payload)
                    .end_of_statement();
                source.text_edit();
                Ok(())
            }
        }
    };
}

payload_builder!(
    XmlPayloadBuilder,
    NodeKind::XmlPayload,
    "XML",
    "Create new XML payload",
    "xml",
    "xmlValue",
    "xml `<root></root>`"
);
payload_builder!(
    JsonPayloadBuilder,
    NodeKind::JsonPayload,
    "JSON",
    "Create new JSON payload",
    "json",
    "jsonValue",
    "{}"
);
payload_builder!(
    BinaryDataBuilder,
    NodeKind::BinaryData,
    "Binary Data",
    "Create new binary data",
    "byte[]",
    "byteArr",
    "[]"
);

/// A name for a fresh variable of `type_name` that does not clash with `context`.
pub(crate) fn result_name(type_name: Option<&str>, context: &TemplateContext<'_>) -> String {
    let prefix = type_name.map_or_else(|| "result".to_string(), names::prefix_for_type);
    names::generate(&prefix, &context.visible_names())
}
