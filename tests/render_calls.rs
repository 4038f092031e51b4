//! Rendering of function calls, connector actions and connections.
mod common;
use common::*;
use flowgen::builder::call::substitute_path_params;
use flowgen::model::properties::{
    CHECK_ERROR_KEY, CONNECTION_KEY, SCOPE_KEY, SCOPE_LOCAL, VARIABLE_KEY,
};
use flowgen::prelude::*;
use std::sync::Arc;

fn call_template(generator: &FlowGenerator, kind: NodeKind, codedata: Codedata) -> Node {
    let context = generator.context().with_file(MAIN).with_codedata(codedata);
    let mut node = generator.template(kind, &context).expect("template");
    place(&mut node, 3);
    node
}

fn format_call(generator: &FlowGenerator) -> Node {
    call_template(
        generator,
        NodeKind::FunctionCall,
        Codedata::new().with_module("acme", "util").with_symbol("format"),
    )
}

fn http(symbol: &str) -> Codedata {
    Codedata::new()
        .with_module("ballerina", "http")
        .with_object("Client")
        .with_symbol(symbol)
}

#[test]
fn test_skipped_defaultable_makes_later_arguments_named() {
    let generator = generator();
    let mut node = format_call(&generator);
    node.set("p1", "v1").set("p3", "v3");

    let edits = generator.render(&node, &main_path()).unwrap();
    assert_eq!(
        primary_text(&edits, MAIN),
        "string stringResult1 = util:format(v1, p3 = v3);"
    );
    assert_eq!(imports_of(&edits, MAIN), ["import acme/util;"]);

    let import = &edits_of(&edits, MAIN)[0];
    assert!(import.range.is_empty());
    assert_eq!(import.range.start_line, LinePosition::start());
}

#[test]
fn test_all_supplied_arguments_stay_positional() {
    let generator = generator();
    let mut node = format_call(&generator);
    node.set("p1", "v1").set("p2", "2").set("p3", "v3");
    assert_eq!(
        render_main(&generator, &node),
        "string stringResult1 = util:format(v1, 2, v3);"
    );

    // A value equal to the default counts as not supplied.
    node.set("p2", "0");
    assert_eq!(
        render_main(&generator, &node),
        "string stringResult1 = util:format(v1, p3 = v3);"
    );
}

#[test]
fn test_missing_required_argument() {
    let generator = generator();
    let node = format_call(&generator);

    let err = generator.render(&node, &main_path()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::SchemaViolation { ref key, .. } if key == "p1"
    ));
}

#[test]
fn test_function_of_current_module_is_unqualified() {
    let generator = generator();
    let mut node = call_template(
        &generator,
        NodeKind::FunctionCall,
        Codedata::new().with_symbol("calculateTotal"),
    );
    node.set("items", "cart");

    let edits = generator.render(&node, &main_path()).unwrap();
    assert_eq!(
        primary_text(&edits, MAIN),
        "decimal decimalResult1 = calculateTotal(cart);"
    );
    assert!(imports_of(&edits, MAIN).is_empty());
}

#[test]
fn test_generated_code_imports_through_current_module() {
    let generator = generator();
    let mut node = format_call(&generator);
    node.set("p1", "v1");
    node.codedata.is_generated = true;

    let edits = generator.render(&node, &main_path()).unwrap();
    assert_eq!(imports_of(&edits, MAIN), ["import acme/orders.util;"]);
}

#[test]
fn test_existing_import_is_not_repeated() {
    let generator = generator();
    let mut node = call_template(&generator, NodeKind::RemoteActionCall, http("post"));
    node.codedata.parent_symbol = Some("httpClient".to_string());
    node.set("path", "\"/users\"").set("message", "payload");

    let edits = generator.render(&node, &main_path()).unwrap();
    assert_eq!(
        primary_text(&edits, MAIN),
        "json jsonResult1 = check httpClient->post(\"/users\", payload);"
    );
    // main.bal already imports ballerina/http.
    assert!(imports_of(&edits, MAIN).is_empty());
}

#[test]
fn test_connection_property_overrides_parent_symbol() {
    let generator = generator();
    let mut node = call_template(
        &generator,
        NodeKind::RemoteActionCall,
        http("post").with_parent_symbol("httpClient"),
    );
    node.set("path", "\"/\"")
        .set("message", "{}")
        .set(CONNECTION_KEY, "backup")
        .set(CHECK_ERROR_KEY, false);

    assert_eq!(
        render_main(&generator, &node),
        "json jsonResult1 = backup->post(\"/\", {});"
    );
}

#[test]
fn test_method_call() {
    let generator = generator();
    let node = call_template(
        &generator,
        NodeKind::MethodCall,
        Codedata::new().with_symbol("close").with_parent_symbol("client"),
    );
    assert_eq!(render_main(&generator, &node), "client.close();");

    let mut orphan = node.clone();
    orphan.codedata.parent_symbol = None;
    orphan.set(CONNECTION_KEY, "");
    assert!(generator.render(&orphan, &main_path()).is_err());
}

#[test]
fn test_resource_action_substitutes_path_parameters() {
    let generator = generator();
    let mut node = call_template(
        &generator,
        NodeKind::ResourceActionCall,
        http("get").with_parent_symbol("httpClient"),
    );
    node.set("id", "userId");

    assert_eq!(
        render_main(&generator, &node),
        "json jsonResult1 = check httpClient->/users/[userId].get();"
    );

    node.set("id", "");
    let err = generator.render(&node, &main_path()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::SchemaViolation { ref key, .. } if key == "id"
    ));
}

#[test]
fn test_substitute_path_params_keeps_literal_segments() {
    let mut node = Node::new(NodeKind::ResourceActionCall);
    node.set("id", "42");

    assert_eq!(
        substitute_path_params(&node, "/users/[string id]/orders/[\"latest\"]").unwrap(),
        "/users/[42]/orders/[\"latest\"]"
    );
    assert_eq!(substitute_path_params(&node, "health").unwrap(), "/health");
    assert!(substitute_path_params(&node, "/users/[string id").is_err());
}

#[test]
fn test_new_connection_goes_to_connections_file() {
    let generator = generator();
    let mut node = call_template(&generator, NodeKind::NewConnection, http("init"));
    node.set("url", "\"http://localhost:9090\"");

    let edits = generator.render(&node, &main_path()).unwrap();
    assert!(!edits.contains_key(&main_path()));

    let connections = format!("{}/connections.bal", ROOT);
    let file_edits = edits_of(&edits, &connections);
    assert_eq!(file_edits.len(), 2);
    assert_eq!(file_edits[0].new_text, "import ballerina/http;\n");
    assert_eq!(
        file_edits[1].new_text,
        "\nfinal http:Client httpClient1 = check new (\"http://localhost:9090\");\n"
    );
}

#[test]
fn test_new_connection_appends_at_end_of_existing_file() {
    let project = project().with_file("connections.bal", "import ballerina/http;\n\nfinal http:Client a = check new (\"x\");\n");
    let generator = FlowGenerator::new(Arc::new(project))
        .with_facts(Arc::new(facts()))
        .with_catalog(Arc::new(catalog()));
    let mut node = call_template(&generator, NodeKind::NewConnection, http("init"));
    node.set("url", "\"http://localhost:9090\"");

    let edits = generator.render(&node, &main_path()).unwrap();
    let file_edits = edits_of(&edits, &format!("{}/connections.bal", ROOT));
    assert_eq!(file_edits.len(), 1, "the import already exists");
    assert_eq!(file_edits[0].range.start_line, LinePosition::new(3, 0));
}

#[test]
fn test_local_connection_is_written_in_place() {
    let generator = generator();
    let mut node = call_template(&generator, NodeKind::NewConnection, http("init"));
    node.set("url", "\"http://localhost:9090\"")
        .set(SCOPE_KEY, SCOPE_LOCAL);

    assert_eq!(
        render_main(&generator, &node),
        "http:Client httpClient1 = check new (\"http://localhost:9090\");"
    );
}

#[test]
fn test_class_init() {
    let generator = generator();
    let node = call_template(
        &generator,
        NodeKind::ClassInit,
        Codedata::new().with_object("Counter").with_symbol("init"),
    );
    assert_eq!(render_main(&generator, &node), "Counter counter1 = new ();");
}

#[test]
fn test_class_init_requested_in_agents_file_stays_there() {
    let generator = generator();
    let node = call_template(
        &generator,
        NodeKind::ClassInit,
        Codedata::new().with_object("Counter").with_symbol("init"),
    );
    let agents = format!("{}/agents.bal", ROOT);

    let edits = generator.render(&node, Path::new(&agents)).unwrap();
    assert!(primary_text(&edits, &agents).contains("Counter counter1 = new ();"));
    assert!(!edits.contains_key(&main_path()));
}

fn join_call(generator: &FlowGenerator) -> Node {
    call_template(
        generator,
        NodeKind::FunctionCall,
        Codedata::new().with_module("acme", "util").with_symbol("join"),
    )
}

fn set_rest(node: &mut Node, key: &str, values: &[&str]) {
    let items = values.iter().map(|v| Property::expression(*v)).collect();
    node.property_mut(key).unwrap().value = PropertyValue::List(items);
}

#[test]
fn test_rest_arguments_pass_skipped_defaults_positionally() {
    let generator = generator();
    let mut node = join_call(&generator);
    node.set("first", "x");
    assert_eq!(render_main(&generator, &node), "string stringResult1 = util:join(x);");

    set_rest(&mut node, "parts", &["a", "b"]);
    let text = render_main(&generator, &node);
    assert_eq!(text, "string stringResult1 = util:join(x, \",\", a, b);");
    assert!(!text.contains(" = \","));
}

#[test]
fn test_rest_arguments_need_a_default_for_skipped_parameters() {
    let generator = generator();
    let mut node = join_call(&generator);
    node.set("first", "x");
    set_rest(&mut node, "parts", &["a"]);
    node.property_mut("sep").unwrap().placeholder.clear();

    match generator.render(&node, &main_path()) {
        Err(FlowError::SchemaViolation { key, .. }) => assert_eq!(key, "sep"),
        other => panic!("expected a schema violation, got {:?}", other),
    }

    node.set("sep", "\";\"");
    assert_eq!(
        render_main(&generator, &node),
        "string stringResult1 = util:join(x, \";\", a);"
    );
}

fn parse_call(generator: &FlowGenerator) -> Node {
    let mut node = call_template(
        generator,
        NodeKind::FunctionCall,
        Codedata::new()
            .with_module("ballerina", "data.jsondata")
            .with_symbol("parseString"),
    );
    node.set("s", "payload").set(VARIABLE_KEY, "order");
    node
}

#[test]
fn test_type_inferring_parameter_names_the_result_type() {
    let generator = generator();
    let mut node = parse_call(&generator);
    assert_eq!(node.codedata.inferred_return_type.as_deref(), Some("t|error"));
    let target = node.property("t").unwrap();
    assert_eq!(target.value_type, ValueType::Type);
    assert!(!target.advanced);

    node.set("t", "Order");
    let edits = generator.render(&node, &main_path()).unwrap();
    assert_eq!(
        primary_text(&edits, MAIN),
        "Order|error order = check jsondata:parseString(payload);"
    );
    assert_eq!(imports_of(&edits, MAIN), ["import ballerina/data.jsondata;"]);
}

#[test]
fn test_inferred_type_replaces_whole_names_only() {
    let generator = generator();
    let mut node = parse_call(&generator);
    node.codedata.inferred_return_type = Some("map<t>|table<t>|error".to_string());
    node.set("t", "Order");
    assert_eq!(
        render_main(&generator, &node),
        "map<Order>|table<Order>|error order = check jsondata:parseString(payload);"
    );

    // Without a target type the declared type is kept.
    let node = parse_call(&generator);
    assert_eq!(
        render_main(&generator, &node),
        "t|error order = check jsondata:parseString(payload);"
    );
}
