//! Unit tests for core flowgen functionality.
mod common;
use ahash::AHashSet;
use flowgen::builder::names::{claim, generate, prefix_for_type};
use flowgen::builder::NodeBuilder;
use flowgen::model::UnknownKind;
use flowgen::services::{UnknownSearchKind, end_position, parse_imports};
use flowgen::prelude::*;
use std::str::FromStr;

#[test]
fn test_error_display() {
    let err = FlowError::missing("if-1", "condition");
    assert_eq!(
        err.to_string(),
        "Node 'if-1' cannot be rendered: property 'condition' is required but missing or empty"
    );
    assert!(err.is_node_scoped());

    let err = FlowError::unsupported("LOCK", &[NodeKind::While, NodeKind::If]);
    assert_eq!(
        err.to_string(),
        "Node kind 'LOCK' is not supported. Supported kinds: IF, WHILE"
    );
    assert!(!err.is_node_scoped());

    let err = FlowError::ExternalLookupFailure {
        service: "catalog".to_string(),
        message: "timed out".to_string(),
    };
    assert_eq!(err.to_string(), "Lookup against the catalog failed: timed out");
}

#[test]
fn test_position_and_range_display() {
    let range = LineRange::new("main.bal", LinePosition::new(3, 4), LinePosition::new(3, 12));
    assert_eq!(range.to_string(), "main.bal:(3:4)-(3:12)");
    assert_eq!(range.without_file().to_string(), "(3:4)-(3:12)");
    assert!(LineRange::at(LinePosition::new(2, 0)).is_empty());
}

#[test]
fn test_node_kind_names() {
    assert_eq!(NodeKind::from_str("REMOTE_ACTION_CALL"), Ok(NodeKind::RemoteActionCall));
    assert_eq!(
        NodeKind::from_str("remote_action_call"),
        Err(UnknownKind("remote_action_call".to_string()))
    );
    for kind in NodeKind::ALL {
        assert_eq!(NodeKind::from_str(kind.as_str()).as_ref(), Ok(kind));
    }

    assert_eq!(serde_json::to_string(&NodeKind::NpFunction).unwrap(), "\"NP_FUNCTION\"");
    let kind: NodeKind = serde_json::from_str("\"PARALLEL_FLOW\"").unwrap();
    assert_eq!(kind, NodeKind::ParallelFlow);
}

#[test]
fn test_unknown_names_are_errors() {
    let err = NodeKind::from_str("GOTO").unwrap_err();
    assert_eq!(err.to_string(), "unknown node kind 'GOTO'");
    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert!(boxed.source().is_none());

    assert_eq!(SearchKind::from_str("connector"), Ok(SearchKind::Connector));
    let err = SearchKind::from_str("widget").unwrap_err();
    assert_eq!(err, UnknownSearchKind("widget".to_string()));
    assert_eq!(err.to_string(), "unknown search kind 'widget'");
}

#[test]
fn test_kind_classification() {
    assert!(NodeKind::Fork.is_composite());
    assert!(!NodeKind::Variable.is_composite());
    assert!(NodeKind::Automation.is_declaration());
    assert!(!NodeKind::DataMapper.is_declaration());
}

#[test]
fn test_config_from_toml() {
    let config = GeneratorConfig::from_toml(
        r#"
        indent-width = 2
        search-limit = 50

        [files]
        connections = "clients.bal"
        "#,
    )
    .unwrap();

    assert_eq!(config.indent_width, 2);
    assert_eq!(config.search_limit, 50);
    assert_eq!(config.files.connections, "clients.bal");
    // Unset keys keep their defaults.
    assert_eq!(config.files.functions, "functions.bal");
    assert_eq!(config.debounce_delay_ms, 500);
    assert_eq!(config.source_extension, ".bal");
}

#[test]
fn test_config_errors() {
    let err = GeneratorConfig::from_toml("indent-width = \"wide\"").unwrap_err();
    assert!(matches!(err, FlowError::Config(_)));

    let missing = Path::new("/nonexistent/flowgen.toml");
    assert!(matches!(
        GeneratorConfig::from_file(missing),
        Err(FlowError::Config(_))
    ));
    // Discovery never fails.
    assert_eq!(
        GeneratorConfig::discover(Path::new("/nonexistent")),
        GeneratorConfig::default()
    );
    assert!(GeneratorConfig::load(Path::new("/nonexistent"), Some(missing)).is_err());
}

#[test]
fn test_registry() {
    let registry = NodeRegistry::default();
    assert_eq!(registry.len(), NodeKind::ALL.len());
    assert_eq!(registry.kinds().first(), Some(&NodeKind::EventStart));
    assert_eq!(
        registry.resolve_name("FORK").map(|builder| builder.kind()),
        Ok(NodeKind::Fork)
    );
    assert!(matches!(
        registry.resolve_name("GOTO"),
        Err(FlowError::UnsupportedKind { .. })
    ));

    let trimmed = NodeRegistry::builder()
        .without(NodeKind::Lock)
        .without(NodeKind::Fork)
        .build();
    assert!(!trimmed.contains(NodeKind::Lock));
    assert!(trimmed.contains(NodeKind::If));
    assert_eq!(trimmed.len(), NodeKind::ALL.len() - 2);

    let empty = NodeRegistryBuilder::empty().build();
    assert!(empty.is_empty());
    assert!(empty.resolve(NodeKind::If).is_err());
}

#[test]
fn test_palette_follows_the_registry() {
    let project = MemoryProject::new("/project");
    let registry = NodeRegistry::builder().without(NodeKind::Match).build();
    let generator = FlowGenerator::new(std::sync::Arc::new(project))
        .with_registry(std::sync::Arc::new(registry));

    let palette = generator.available_nodes();
    let branch: Vec<NodeKind> = palette[0].nodes().iter().take(1).map(|n| n.kind).collect();
    assert_eq!(branch, [NodeKind::If]);
    assert!(palette
        .iter()
        .flat_map(|c| c.nodes())
        .all(|n| n.kind != NodeKind::Match));

    let bare = FlowGenerator::new(std::sync::Arc::new(MemoryProject::new("/project")))
        .with_registry(std::sync::Arc::new(NodeRegistryBuilder::empty().build()));
    assert!(bare.available_nodes().is_empty());
}

#[test]
fn test_parse_imports() {
    let source = "import ballerina/http;\nimport ballerina/log as l;\n  import acme/util ;\n\nfunction f() {}\n";
    assert_eq!(
        parse_imports(source),
        ["ballerina/http", "ballerina/log", "acme/util"]
    );
    assert!(parse_imports("").is_empty());
}

#[test]
fn test_end_position() {
    assert_eq!(end_position(""), LinePosition::new(0, 0));
    assert_eq!(end_position("abc"), LinePosition::new(0, 3));
    assert_eq!(end_position("import x;\n"), LinePosition::new(1, 0));
    assert_eq!(end_position("a\nbcd"), LinePosition::new(1, 3));
}

#[test]
fn test_name_generation() {
    let mut visible: AHashSet<String> = ["var1", "var2", "result1"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(generate("var", &visible), "var3");
    assert_eq!(generate("config", &visible), "config1");

    assert_eq!(claim("worker", &mut visible), "worker1");
    assert_eq!(claim("worker", &mut visible), "worker2");
}

#[test]
fn test_prefix_for_type() {
    assert_eq!(prefix_for_type("http:Response"), "response");
    assert_eq!(prefix_for_type("string"), "stringResult");
    assert_eq!(prefix_for_type("map<json>"), "mapResult");
    assert_eq!(prefix_for_type("Order[]"), "order");
    assert_eq!(prefix_for_type("()"), "result");
}
