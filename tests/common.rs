//! Common test utilities for building flow nodes and the services they are rendered against.
use flowgen::builder::concurrency::WaitBuilder;
use flowgen::model::properties::FUTURES_KEY;
use flowgen::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

pub const ROOT: &str = "/project";
pub const MAIN: &str = "/project/main.bal";

/// The file every in-place render targets.
pub const MAIN_SOURCE: &str = "import ballerina/http;\n\npublic function main() {\n}\n";

/// A small catalog: a log function, functions with defaultable, rest and type-inferring
/// parameters, an HTTP connector with one resource and one remote action, and a type.
pub const CATALOG_JSON: &str = r#"[
    {
        "kind": "FUNCTION", "org": "ballerina", "module": "log", "version": "2.10.0",
        "name": "printInfo", "description": "Prints info logs",
        "parameters": [
            {"name": "msg", "type": "string", "kind": "REQUIRED", "description": "The message"}
        ],
        "returnType": "()"
    },
    {
        "kind": "FUNCTION", "org": "acme", "module": "util", "name": "format",
        "description": "Formats a value",
        "parameters": [
            {"name": "p1", "type": "string", "kind": "REQUIRED"},
            {"name": "p2", "type": "int", "kind": "DEFAULTABLE", "defaultValue": "0"},
            {"name": "p3", "type": "boolean", "kind": "DEFAULTABLE", "defaultValue": "false"}
        ],
        "returnType": "string"
    },
    {
        "kind": "FUNCTION", "org": "acme", "module": "util", "name": "join",
        "description": "Joins values with a separator",
        "parameters": [
            {"name": "first", "type": "string", "kind": "REQUIRED"},
            {"name": "sep", "type": "string", "kind": "DEFAULTABLE", "defaultValue": "\",\""},
            {"name": "parts", "type": "string", "kind": "REST_PARAMETER"}
        ],
        "returnType": "string"
    },
    {
        "kind": "FUNCTION", "org": "ballerina", "module": "data.jsondata", "name": "parseString",
        "description": "Parses a JSON string into a typed value",
        "parameters": [
            {"name": "s", "type": "string", "kind": "REQUIRED"},
            {"name": "t", "type": "typedesc<anydata>", "kind": "PARAM_FOR_TYPE_INFER", "defaultValue": "<>"}
        ],
        "returnType": "t|error", "canFail": true
    },
    {
        "kind": "CONNECTOR", "org": "ballerina", "module": "http", "name": "init",
        "object": "Client", "description": "HTTP client",
        "parameters": [
            {"name": "url", "type": "string", "kind": "REQUIRED"},
            {"name": "config", "type": "http:ClientConfiguration", "kind": "INCLUDED_RECORD", "defaultValue": "{}"}
        ],
        "canFail": true
    },
    {
        "kind": "RESOURCE_ACTION", "org": "ballerina", "module": "http", "name": "get",
        "object": "Client", "resourcePath": "/users/[string id]",
        "parameters": [
            {"name": "id", "type": "string", "kind": "PATH_PARAM"},
            {"name": "headers", "type": "map<string>", "kind": "DEFAULTABLE", "defaultValue": "()"}
        ],
        "returnType": "json", "canFail": true
    },
    {
        "kind": "REMOTE_ACTION", "org": "ballerina", "module": "http", "name": "post",
        "object": "Client",
        "parameters": [
            {"name": "path", "type": "string", "kind": "REQUIRED"},
            {"name": "message", "type": "anydata", "kind": "REQUIRED"}
        ],
        "returnType": "json", "canFail": true
    },
    {
        "kind": "CONNECTOR", "org": "ballerinax", "module": "redis", "name": "init",
        "object": "Client", "description": "Redis client", "parameters": []
    },
    {
        "kind": "TYPE", "org": "ballerina", "module": "time", "name": "Utc",
        "description": "UTC timestamp"
    }
]"#;

#[allow(dead_code)]
pub fn main_path() -> PathBuf {
    PathBuf::from(MAIN)
}

#[allow(dead_code)]
pub fn project() -> MemoryProject {
    MemoryProject::new(ROOT)
        .with_module(ModuleDescriptor::new("acme", "orders"))
        .with_file("main.bal", MAIN_SOURCE)
}

#[allow(dead_code)]
pub fn catalog() -> JsonCatalog {
    JsonCatalog::from_json(CATALOG_JSON).expect("test catalog is valid JSON")
}

/// Facts for `acme/orders`: two names already taken and one local function.
#[allow(dead_code)]
pub fn facts() -> StaticFacts {
    let local: flowgen::services::CatalogItem = serde_json::from_str(
        r#"{"kind": "FUNCTION", "org": "acme", "module": "orders", "name": "calculateTotal",
            "parameters": [{"name": "items", "type": "Item[]", "kind": "REQUIRED"}],
            "returnType": "decimal"}"#,
    )
    .expect("local function is valid JSON");
    StaticFacts::new(ModuleDescriptor::new("acme", "orders"))
        .with_visible(["var1", "result1"])
        .with_function(local)
}

#[allow(dead_code)]
pub fn generator() -> FlowGenerator {
    FlowGenerator::new(Arc::new(project()))
        .with_facts(Arc::new(facts()))
        .with_catalog(Arc::new(catalog()))
}

/// A node that replaces line `line` of `main.bal` in place.
#[allow(dead_code)]
pub fn located(kind: NodeKind, line: u32) -> Node {
    let mut node = Node::new(kind).with_id(format!("{}-{}", kind.as_str().to_lowercase(), line));
    place(&mut node, line);
    node
}

/// Records a single-line location in `main.bal`.
#[allow(dead_code)]
pub fn place(node: &mut Node, line: u32) {
    node.codedata.line_range = Some(LineRange::new(
        "main.bal",
        LinePosition::new(line, 4),
        LinePosition::new(line, 30),
    ));
}

/// A node with a single expression-valued property.
#[allow(dead_code)]
pub fn with_property(kind: NodeKind, key: &str, value: &str) -> Node {
    let mut node = located(kind, 3);
    node.set(key, value);
    node
}

/// Replaces the futures group of a WAIT node with `(field, future)` entries.
#[allow(dead_code)]
pub fn set_futures(node: &mut Node, futures: &[(&str, &str)]) {
    let mut group = Properties::new();
    for (i, (label, future)) in futures.iter().enumerate() {
        group.insert(
            format!("future{}", i + 1),
            WaitBuilder::future_entry(label, future),
        );
    }
    match node.property_mut(FUTURES_KEY) {
        Some(property) => property.value = PropertyValue::Map(group),
        None => {
            node.properties.insert(
                FUTURES_KEY.to_string(),
                Property::builder()
                    .value_type(ValueType::RepeatableProperty)
                    .value(group)
                    .build(),
            );
        }
    }
}

/// The edits of `file`, which must be present.
#[allow(dead_code)]
pub fn edits_of<'e>(edits: &'e SourceEdits, file: &str) -> &'e [TextEdit] {
    edits
        .get(&PathBuf::from(file))
        .unwrap_or_else(|| panic!("no edits for {}; got {:?}", file, edits.keys()))
}

/// The statement written for the node itself: the last edit of `file`.
#[allow(dead_code)]
pub fn primary_text(edits: &SourceEdits, file: &str) -> String {
    edits_of(edits, file)
        .last()
        .map(|edit| edit.new_text.clone())
        .expect("at least one edit")
}

/// Renders `node` against `main.bal` and returns the text written for it.
#[allow(dead_code)]
pub fn render_main(generator: &FlowGenerator, node: &Node) -> String {
    let edits = generator
        .render(node, &main_path())
        .unwrap_or_else(|e| panic!("rendering {} failed: {}", node.kind, e));
    primary_text(&edits, MAIN)
}

/// Import declarations among the edits of `file`.
#[allow(dead_code)]
pub fn imports_of(edits: &SourceEdits, file: &str) -> Vec<String> {
    edits
        .get(&PathBuf::from(file))
        .map(|edits| {
            edits
                .iter()
                .filter(|e| e.new_text.starts_with("import "))
                .map(|e| e.new_text.trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Balanced braces, parentheses and brackets, and a final `;` or `}`.
#[allow(dead_code)]
pub fn assert_well_formed(text: &str) {
    let mut depth = [0i32; 3];
    let mut in_string = false;
    for c in text.chars() {
        if c == '"' {
            in_string = !in_string;
        }
        if in_string {
            continue;
        }
        match c {
            '{' => depth[0] += 1,
            '}' => depth[0] -= 1,
            '(' => depth[1] += 1,
            ')' => depth[1] -= 1,
            '[' => depth[2] += 1,
            ']' => depth[2] -= 1,
            _ => {}
        }
        assert!(depth.iter().all(|d| *d >= 0), "closed before opened in:\n{}", text);
    }
    assert_eq!(depth, [0, 0, 0], "unbalanced delimiters in:\n{}", text);
    let trimmed = text.trim();
    assert!(
        trimmed.ends_with(';') || trimmed.ends_with('}') || trimmed.starts_with("//"),
        "statement does not end in ';' or '}}':\n{}",
        text
    );
}
