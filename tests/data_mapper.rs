//! Data mappers and module-level definitions.
mod common;
use common::*;
use flowgen::builder::definition::{default_body, record_body};
use flowgen::model::properties::{
    BODY_KEY, DESCRIPTION_KEY, EXPRESSION_KEY, INPUTS_KEY, PARAMETERS_KEY, PROMPT_KEY, RETURN_ERROR_KEY, TYPE_KEY,
};
use flowgen::model::{BODY_LABEL, PropertiesBuilder};
use flowgen::prelude::*;
use flowgen::services::RecordField;
use std::sync::Arc;

fn template(generator: &FlowGenerator, kind: NodeKind) -> Node {
    let context = generator.context().with_file(MAIN);
    let mut node = generator.template(kind, &context).expect("template");
    place(&mut node, 3);
    node
}

/// Replaces a parameter group with `(type, name)` entries.
fn set_parameters(node: &mut Node, key: &str, parameters: &[(&str, &str)]) {
    let mut builder = PropertiesBuilder::new();
    for (i, (type_name, name)) in parameters.iter().enumerate() {
        builder = builder.parameter_entry(&format!("{}{}", key, i + 1), type_name, name);
    }
    node.property_mut(key).expect("parameter group").value = builder.build().into();
}

fn data_mappings() -> String {
    format!("{}/data_mappings.bal", ROOT)
}

#[test]
fn test_default_body_follows_the_output_type() {
    assert_eq!(default_body("Summary"), "{}");
    assert_eq!(default_body("int"), "0");
    assert_eq!(default_body("decimal"), "0d");
    assert_eq!(default_body("string"), "\"\"");
    assert_eq!(default_body("Order[]"), "[]");
    assert_eq!(default_body("Summary?"), "()");
}

fn summary_fields() -> Vec<RecordField> {
    [("total", "decimal", false), ("count", "int", false), ("note", "string?", true)]
        .iter()
        .map(|(name, type_name, optional)| RecordField {
            name: name.to_string(),
            type_name: type_name.to_string(),
            optional: *optional,
        })
        .collect()
}

#[test]
fn test_record_body_defaults_every_field() {
    assert_eq!(record_body(&summary_fields()), "{total: 0d, count: 0, note: ()}");
    assert_eq!(record_body(&[]), "{}");
}

#[test]
fn test_data_mapper_body_is_prefilled_for_record_output() {
    let generator = FlowGenerator::new(Arc::new(project()))
        .with_facts(Arc::new(facts().with_record("Summary", summary_fields())))
        .with_catalog(Arc::new(catalog()));
    let context = generator
        .context()
        .with_file(MAIN)
        .with_output_type("Summary");

    let mut node = generator
        .template(NodeKind::DataMapperDefinition, &context)
        .expect("template");
    assert_eq!(node.property(TYPE_KEY).unwrap().to_source(), "Summary");
    assert_eq!(
        node.property(BODY_KEY).unwrap().to_source(),
        "{total: 0d, count: 0, note: ()}"
    );

    set_parameters(&mut node, INPUTS_KEY, &[("Order", "order")]);
    let edits = generator.render(&node, &main_path()).unwrap();
    assert_eq!(
        primary_text(&edits, &data_mappings()),
        "\nfunction transform1(Order order) returns Summary => {total: 0d, count: 0, note: ()};\n"
    );

    // Types that are not records fall back to a scalar default.
    let context = generator.context().with_file(MAIN).with_output_type("int");
    let node = generator.template(NodeKind::DataMapper, &context).expect("template");
    assert_eq!(node.property(BODY_KEY).unwrap().to_source(), "0");
}

#[test]
fn test_record_body_without_compiler_falls_back() {
    let generator = FlowGenerator::new(Arc::new(project())).with_catalog(Arc::new(catalog()));
    let context = generator
        .context()
        .with_file(MAIN)
        .with_output_type("Summary");
    let node = generator.template(NodeKind::DataMapper, &context).expect("template");
    assert_eq!(node.property(BODY_KEY).unwrap().to_source(), "{}");
}

#[test]
fn test_new_data_mapper_declares_function_and_calls_it() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::DataMapper);
    node.set(TYPE_KEY, "Summary")
        .set(BODY_KEY, "{total: order.total}");
    set_parameters(&mut node, INPUTS_KEY, &[("Order", "order"), ("Customer", "customer")]);

    let edits = generator.render(&node, &main_path()).unwrap();
    assert_eq!(
        primary_text(&edits, MAIN),
        "Summary result2 = transform1(order, customer);"
    );
    let declaration = &edits_of(&edits, &data_mappings())[0];
    assert_eq!(
        declaration.new_text,
        "\nfunction transform1(Order order, Customer customer) returns Summary => {total: order.total};\n"
    );
    assert_eq!(declaration.range.start_line, LinePosition::start());
}

#[test]
fn test_existing_data_mapper_only_updates_signature() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::DataMapper);
    node.codedata.is_new = false;
    node.codedata.definition_range = Some(LineRange::new(
        "data_mappings.bal",
        LinePosition::new(2, 0),
        LinePosition::new(2, 48),
    ));
    node.set(TYPE_KEY, "Summary");
    set_parameters(&mut node, INPUTS_KEY, &[("Order", "order")]);

    let edits = generator.render(&node, &main_path()).unwrap();
    let signature = &edits_of(&edits, &data_mappings())[0];
    assert_eq!(
        signature.new_text,
        "function transform1(Order order) returns Summary"
    );
    assert_eq!(signature.range.start_line, LinePosition::new(2, 0));
    assert!(signature.range.file_name.is_empty());
    assert_eq!(
        primary_text(&edits, MAIN),
        "Summary result2 = transform1(order);"
    );
}

#[test]
fn test_data_mapper_requires_output_type() {
    let generator = generator();
    let node = template(&generator, NodeKind::DataMapper);

    let err = generator.render(&node, &main_path()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::SchemaViolation { ref key, .. } if key == TYPE_KEY
    ));
}

#[test]
fn test_malformed_input_entry() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::DataMapper);
    node.set(TYPE_KEY, "Summary");
    set_parameters(&mut node, INPUTS_KEY, &[("Order", "")]);

    let err = generator.render(&node, &main_path()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::SchemaViolation { ref key, .. } if key == INPUTS_KEY
    ));
}

#[test]
fn test_data_mapper_definition_with_docs() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::DataMapperDefinition);
    node.set(TYPE_KEY, "Summary")
        .set(DESCRIPTION_KEY, "Builds a summary");
    set_parameters(&mut node, INPUTS_KEY, &[("Order", "order")]);

    let edits = generator.render(&node, &main_path()).unwrap();
    assert_eq!(
        primary_text(&edits, &data_mappings()),
        "\n# Builds a summary\nfunction transform1(Order order) returns Summary => {};\n"
    );
}

#[test]
fn test_new_function_definition() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::FunctionDefinition);
    node.set(TYPE_KEY, "int").set(RETURN_ERROR_KEY, true);
    set_parameters(&mut node, PARAMETERS_KEY, &[("int", "a"), ("int", "b")]);
    let mut sum = Node::new(NodeKind::Return);
    sum.set(EXPRESSION_KEY, "a + b");
    node.branch_mut(BODY_LABEL).unwrap().push(sum);

    let edits = generator.render(&node, &main_path()).unwrap();
    assert_eq!(
        primary_text(&edits, &format!("{}/functions.bal", ROOT)),
        "\nfunction function1(int a, int b) returns int|error {\n    return a + b;\n}\n"
    );
}

#[test]
fn test_existing_function_definition_keeps_body() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::FunctionDefinition);
    node.codedata.is_new = false;

    assert_eq!(render_main(&generator, &node), "function function1()");
}

#[test]
fn test_natural_function() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::NpFunction);
    node.set(PROMPT_KEY, "Summarize the order");

    let edits = generator.render(&node, &main_path()).unwrap();
    assert_eq!(
        primary_text(&edits, &format!("{}/functions.bal", ROOT)),
        "\nfunction npFunction1() returns string|error => natural {\n    Summarize the order\n};\n"
    );
}

#[test]
fn test_automation_entry_point() {
    let generator = generator();
    let node = template(&generator, NodeKind::Automation);

    let edits = generator.render(&node, &main_path()).unwrap();
    let automation = format!("{}/automation.bal", ROOT);
    assert_eq!(imports_of(&edits, &automation), ["import ballerina/log;"]);
    let text = primary_text(&edits, &automation);
    assert!(text.contains("public function main() returns error? {"));
    assert!(text.contains("    } on fail error e {"));
    assert!(text.contains("        return e;"));
    assert_well_formed(&text);
}

