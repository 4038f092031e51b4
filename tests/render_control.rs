//! Rendering of branching, looping and error-handling constructs.
mod common;
use common::*;
use flowgen::model::properties::{
    COLLECTION_KEY, COMMENT_KEY, CONDITION_KEY, EXPRESSION_KEY, IGNORE_KEY, PATTERNS_KEY,
    RETRY_COUNT_KEY, STATEMENT_KEY, TYPE_KEY, VARIABLE_KEY,
};
use flowgen::model::{BODY_LABEL, ELSE_LABEL, ON_FAILURE_LABEL, THEN_LABEL};
use flowgen::prelude::*;

fn statement(text: &str) -> Node {
    let mut node = Node::new(NodeKind::Expression);
    node.set(STATEMENT_KEY, text);
    node
}

fn condition(value: &str) -> Properties {
    let mut properties = Properties::new();
    properties.insert(CONDITION_KEY.to_string(), Property::expression(value));
    properties
}

fn if_node(test: &str, then: Vec<Node>, otherwise: Vec<Node>) -> Node {
    Node::new(NodeKind::If)
        .with_id("if")
        .with_branch(
            Branch::block(THEN_LABEL)
                .with_properties(condition(test))
                .with_children(then),
        )
        .with_branch(Branch::block(ELSE_LABEL).with_children(otherwise))
}

fn template(generator: &FlowGenerator, kind: NodeKind) -> Node {
    let context = generator.context().with_file(MAIN);
    let mut node = generator.template(kind, &context).expect("template");
    place(&mut node, 3);
    node
}

#[test]
fn test_if_with_nested_if_collapses_to_else_if() {
    let generator = generator();
    let inner = if_node("c", vec![Node::new(NodeKind::Return)], vec![]);
    let mut node = if_node("a", vec![statement("x")], vec![inner]);
    place(&mut node, 3);

    assert_eq!(
        render_main(&generator, &node),
        "if a {\n    x;\n} else if c {\n    return;\n}"
    );
}

#[test]
fn test_if_with_else_block() {
    let generator = generator();
    let mut node = if_node("ready", vec![], vec![statement("retry()"), statement("log()")]);
    place(&mut node, 3);

    assert_eq!(
        render_main(&generator, &node),
        "if ready {\n} else {\n    retry();\n    log();\n}"
    );
}

#[test]
fn test_if_without_condition_fails() {
    let generator = generator();
    let mut node = Node::new(NodeKind::If)
        .with_id("if-1")
        .with_branch(Branch::block(THEN_LABEL));
    place(&mut node, 3);

    let err = generator.render(&node, &main_path()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::SchemaViolation { ref node_id, ref key, .. } if node_id == "if-1" && key == CONDITION_KEY
    ));
}

#[test]
fn test_nested_blocks_indent_per_level() {
    let generator = generator();
    let inner = if_node("b", vec![statement("y")], vec![]);
    let mut node = if_node("a", vec![inner], vec![]);
    place(&mut node, 3);

    assert_eq!(
        render_main(&generator, &node),
        "if a {\n    if b {\n        y;\n    }\n}"
    );
}

#[test]
fn test_while_with_failure_handler() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::While);
    node.set(CONDITION_KEY, "i < 10");
    node.branch_mut(BODY_LABEL)
        .unwrap()
        .push(Node::new(NodeKind::Break));
    node.branch_mut(ON_FAILURE_LABEL)
        .unwrap()
        .properties
        .get_mut(IGNORE_KEY)
        .unwrap()
        .value = false.into();

    assert_eq!(
        render_main(&generator, &node),
        "while i < 10 {\n    break;\n} on fail error e {\n}"
    );
}

#[test]
fn test_while_ignored_failure_handler_is_omitted() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::While);
    node.set(CONDITION_KEY, "running");

    assert_eq!(render_main(&generator, &node), "while running {\n}");
}

#[test]
fn test_foreach() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::Foreach);
    node.set(COLLECTION_KEY, "orders")
        .set(TYPE_KEY, "Order")
        .set(VARIABLE_KEY, "order");
    node.branch_mut(BODY_LABEL)
        .unwrap()
        .push(statement("process(order)"));

    assert_eq!(
        render_main(&generator, &node),
        "foreach Order order in orders {\n    process(order);\n}"
    );
}

#[test]
fn test_match_cases() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::Match);
    node.set(CONDITION_KEY, "status");

    let mut first = Properties::new();
    first.insert(
        PATTERNS_KEY.to_string(),
        Property::expression(vec![
            Property::expression("\"ok\""),
            Property::expression("\"done\""),
        ]),
    );
    let case = Branch::block("ok")
        .with_properties(first)
        .with_children(vec![statement("x")]);
    node.branches.insert(0, case);

    assert_eq!(
        render_main(&generator, &node),
        "match status {\n    \"ok\"|\"done\" => {\n        x;\n    }\n    _ => {\n    }\n}"
    );
}

#[test]
fn test_retry_count() {
    let generator = generator();
    let mut node = template(&generator, NodeKind::Retry);
    node.set(RETRY_COUNT_KEY, "5");
    assert_eq!(render_main(&generator, &node), "retry (5) {\n}");

    node.set(RETRY_COUNT_KEY, "three");
    let err = generator.render(&node, &main_path()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::SchemaViolation { ref key, .. } if key == RETRY_COUNT_KEY
    ));
}

#[test]
fn test_transaction_and_error_handler() {
    let generator = generator();
    let transaction = template(&generator, NodeKind::Transaction);
    assert_eq!(
        render_main(&generator, &transaction),
        "transaction {\n    check commit;\n}"
    );

    let mut handler = template(&generator, NodeKind::ErrorHandler);
    handler
        .branch_mut(BODY_LABEL)
        .unwrap()
        .push(statement("check risky()"));
    handler
        .branch_mut(ON_FAILURE_LABEL)
        .unwrap()
        .push(Node::new(NodeKind::Stop));
    assert_eq!(
        render_main(&generator, &handler),
        "do {\n    check risky();\n} on fail error e {\n    return;\n}"
    );
}

#[test]
fn test_keyword_statements() {
    let generator = generator();
    assert_eq!(
        render_main(&generator, &with_property(NodeKind::Return, EXPRESSION_KEY, "total")),
        "return total;"
    );
    assert_eq!(
        render_main(&generator, &located(NodeKind::Return, 3)),
        "return;"
    );
    assert_eq!(
        render_main(&generator, &with_property(NodeKind::Fail, EXPRESSION_KEY, "error(\"bad\")")),
        "fail error(\"bad\");"
    );
    assert_eq!(render_main(&generator, &located(NodeKind::Continue, 3)), "continue;");

    let err = generator
        .render(&located(NodeKind::Panic, 3), &main_path())
        .unwrap_err();
    assert!(err.is_node_scoped());
}

#[test]
fn test_comment_lines() {
    let generator = generator();
    let node = with_property(NodeKind::Comment, COMMENT_KEY, "first\n// second\n");
    assert_eq!(render_main(&generator, &node), "// first\n// second");
}

#[test]
fn test_expression_statement_is_terminated_once() {
    let generator = generator();
    let node = with_property(NodeKind::Expression, STATEMENT_KEY, "io:println(x);");
    assert_eq!(render_main(&generator, &node), "io:println(x);");
}

#[test]
fn test_variable_and_assign() {
    let generator = generator();
    let mut variable = template(&generator, NodeKind::Variable);
    variable.set(TYPE_KEY, "int").set(EXPRESSION_KEY, "0");
    assert_eq!(render_main(&generator, &variable), "int var2 = 0;");

    let untyped = template(&generator, NodeKind::Variable);
    assert_eq!(render_main(&generator, &untyped), "var var2;");

    let mut assign = template(&generator, NodeKind::Assign);
    assign.set(VARIABLE_KEY, "total").set(EXPRESSION_KEY, "total + 1");
    assert_eq!(render_main(&generator, &assign), "total = total + 1;");
}

#[test]
fn test_in_place_edit_targets_the_recorded_range() {
    let generator = generator();
    let node = located(NodeKind::Break, 7);
    let edits = generator.render(&node, &main_path()).unwrap();

    assert_eq!(edits.len(), 1);
    let edit = &edits_of(&edits, MAIN)[0];
    assert_eq!(edit.range.start_line, LinePosition::new(7, 4));
    assert_eq!(edit.range.end_line, LinePosition::new(7, 30));
    assert!(edit.range.file_name.is_empty());
}

#[test]
fn test_statement_without_location_is_rejected() {
    let generator = generator();
    let node = Node::new(NodeKind::Break).with_id("break-1");

    let err = generator.render(&node, &main_path()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::SchemaViolation { ref key, .. } if key == "lineRange"
    ));
}

#[test]
fn test_delete_removes_the_range() {
    let generator = generator();
    let node = located(NodeKind::Break, 4);
    let edits = generator.delete(&node, &main_path()).unwrap();

    let edit = &edits_of(&edits, MAIN)[0];
    assert_eq!(edit.new_text, "");
    assert_eq!(edit.range.start_line, LinePosition::new(4, 4));

    // A project directory resolves through the file name in the range.
    let edits = generator.delete(&node, Path::new(ROOT)).unwrap();
    assert!(edits.contains_key(&main_path()));

    let unplaced = Node::new(NodeKind::Break);
    assert!(generator.delete(&unplaced, &main_path()).is_err());
}

#[test]
fn test_custom_indent_width() {
    let mut config = GeneratorConfig::default();
    config.indent_width = 2;
    let generator = generator().with_config(config);
    let mut node = if_node("a", vec![statement("x")], vec![]);
    place(&mut node, 3);

    assert_eq!(render_main(&generator, &node), "if a {\n  x;\n}");
}
