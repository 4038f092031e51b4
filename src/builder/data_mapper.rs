//! Data mappings: an expression-bodied transform function plus the statement that calls it.

use super::definition::{doc_comments, mapping_body, parameters_group, return_type_property, signature};
use super::params::{self, DeclaredParameter};
use super::{NodeBuilder, TemplateContext, names};
use crate::error::FlowError;
use crate::model::properties::{
    BODY_KEY, DESCRIPTION_KEY, FUNCTION_NAME_KEY, INPUTS_KEY, RETURN_DESCRIPTION_KEY, TYPE_KEY,
    VARIABLE_KEY,
};
use crate::model::{Node, NodeKind, PropertiesBuilder, Property, ValueType};
use crate::source::{FileFamily, SourceBuilder};
use itertools::Itertools;

/// The mapping expression, prefilled with a default of the output type when the
/// request names one.
fn body_property(context: &TemplateContext<'_>) -> Property {
    let body = context
        .output_type
        .as_deref()
        .map(|output| context.expression_body(output))
        .unwrap_or_default();
    Property::builder()
        .label("Mapping")
        .description("Expression that builds the output from the inputs")
        .value_type(ValueType::Expression)
        .value(body)
        .optional(true)
        .advanced(true)
        .build()
}

/// The mapping function's name, inputs and output type, all required.
fn mapping_signature(
    source: &mut SourceBuilder<'_>,
) -> Result<(String, Vec<DeclaredParameter>, String), FlowError> {
    let name = source.require(FUNCTION_NAME_KEY)?.to_source();
    let inputs = params::declared_parameters(source, INPUTS_KEY)?;
    let output = source.require(TYPE_KEY)?.to_source();
    Ok((name, inputs, output))
}

pub struct DataMapperBuilder;

impl NodeBuilder for DataMapperBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::DataMapper
    }

    fn label(&self) -> &'static str {
        "Data Mapper"
    }

    fn description(&self) -> &'static str {
        "Map data from multiple variables to a record type"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["map", "transform", "convert"]
    }

    fn populate_template(&self, mut node: Node, context: &TemplateContext<'_>) -> Node {
        let visible = context.visible_names();
        let function = names::generate("transform", &visible);
        let builder = PropertiesBuilder::new().function_name(&function, true);
        node.properties = parameters_group(builder, INPUTS_KEY)
            .custom(
                TYPE_KEY,
                return_type_property("Output Type", context.output_type.as_deref(), false),
            )
            .variable(None, &visible, "result")
            .custom(BODY_KEY, body_property(context))
            .build();
        node
    }

    /// Emits the mapping declaration, then `R v = f(a, b);` at the node itself.
    ///
    /// When the declaration already exists only its signature is regenerated, at the
    /// recorded definition range. Otherwise the whole declaration is appended to the
    /// data-mappings file.
    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let node = source.node();
        let (name, inputs, output) = mapping_signature(source)?;
        source.require(VARIABLE_KEY)?;

        signature(source.token(), &name, &inputs, Some(&output));
        match &node.codedata.definition_range {
            Some(range) => {
                let path = source.path_of(range);
                source.text_edit_at(path, range.without_file());
            }
            None => {
                let body = mapping_body(source, &output);
                source.token().right_double_arrow().name(body).end_of_statement();
                source.text_edit_in(FileFamily::DataMappings)?;
            }
        }

        let arguments = inputs.iter().map(|p| p.name.as_str()).join(", ");
        source.new_variable();
        source
            .token()
            .name(format!("{}({})", name, arguments))
            .end_of_statement();
        source.text_edit();
        Ok(())
    }
}

pub struct DataMapperDefinitionBuilder;

impl NodeBuilder for DataMapperDefinitionBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::DataMapperDefinition
    }

    fn label(&self) -> &'static str {
        "Data Mapper Definition"
    }

    fn description(&self) -> &'static str {
        "Define a data mapper function"
    }

    fn populate_template(&self, mut node: Node, context: &TemplateContext<'_>) -> Node {
        let function = names::generate("transform", &context.visible_names());
        let builder = PropertiesBuilder::new()
            .function_name(&function, true)
            .description(None);
        node.properties = parameters_group(builder, INPUTS_KEY)
            .custom(
                TYPE_KEY,
                return_type_property("Output Type", context.output_type.as_deref(), false),
            )
            .custom(
                RETURN_DESCRIPTION_KEY,
                Property::builder()
                    .label("Output Description")
                    .value_type(ValueType::String)
                    .optional(true)
                    .build(),
            )
            .custom(BODY_KEY, body_property(context))
            .build();
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let (name, inputs, output) = mapping_signature(source)?;
        let description = source.text(DESCRIPTION_KEY);
        let return_description = source.text(RETURN_DESCRIPTION_KEY);
        let body = mapping_body(source, &output);

        let tokens = source.token();
        doc_comments(
            tokens,
            description.as_deref(),
            &inputs,
            return_description.as_deref(),
        );
        signature(tokens, &name, &inputs, Some(&output));
        tokens.right_double_arrow().name(body).end_of_statement();
        source.text_edit();
        Ok(())
    }
}
