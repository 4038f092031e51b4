//! Strands and workers: `start`, `wait`, `fork` and parallel flows.

use super::{NodeBuilder, TemplateContext, names};
use crate::error::FlowError;
use crate::model::properties::{
    EXPRESSION_KEY, FUTURES_KEY, TYPE_KEY, VARIABLE_KEY, WAIT_ALL_KEY,
};
use crate::model::{
    Branch, BranchKind, Node, NodeKind, PropertiesBuilder, Property, ValueType,
};
use crate::source::SourceBuilder;
use itertools::Itertools;

/// The variable that collects worker results of a new fork.
const WAIT_RESULT: &str = "waitResult";

pub struct StartBuilder;

impl NodeBuilder for StartBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Start
    }

    fn label(&self) -> &'static str {
        "Start"
    }

    fn description(&self) -> &'static str {
        "Execute a function or a method invocation in a new strand"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["start", "async", "strand"]
    }

    fn populate_template(&self, mut node: Node, context: &TemplateContext<'_>) -> Node {
        let visible = context.visible_names();
        node.properties = PropertiesBuilder::new()
            .expression(None, "Expression", "Call to run in a new strand")
            .data_type(Some("future<any|error>"), true)
            .variable(None, &visible, "future")
            .build();
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let expression = source.require(EXPRESSION_KEY)?;
        source.new_variable();
        source
            .token()
            .keyword("start")
            .expression(expression)
            .end_of_statement();
        source.text_edit();
        Ok(())
    }
}

pub struct WaitBuilder;

impl WaitBuilder {
    /// A template entry of the futures group: an optional field label and the future.
    pub fn future_entry(label: &str, future: &str) -> Property {
        let entry = PropertiesBuilder::new()
            .custom(
                VARIABLE_KEY,
                Property::builder()
                    .label("Field")
                    .description("Field name of the result")
                    .value_type(ValueType::Identifier)
                    .value(label)
                    .optional(true)
                    .build(),
            )
            .custom(
                EXPRESSION_KEY,
                Property::builder()
                    .label("Future")
                    .description("The future to wait for")
                    .value_type(ValueType::Expression)
                    .value(future)
                    .build(),
            )
            .build();
        Property::builder()
            .label("Future")
            .value_type(ValueType::FixedProperty)
            .value(entry)
            .build()
    }
}

impl NodeBuilder for WaitBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Wait
    }

    fn label(&self) -> &'static str {
        "Wait"
    }

    fn description(&self) -> &'static str {
        "Wait for a set of futures to complete"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["wait", "join", "future"]
    }

    fn populate_template(&self, mut node: Node, context: &TemplateContext<'_>) -> Node {
        let visible = context.visible_names();
        node.properties = PropertiesBuilder::new()
            .data_type(None, true)
            .variable(None, &visible, "result")
            .wait_all(false)
            .nested()
            .custom("future1", Self::future_entry("", ""))
            .end_nested(
                ValueType::RepeatableProperty,
                FUTURES_KEY,
                "Futures",
                "The futures to wait for",
            )
            .build();
        node
    }

    /// `wait {a: f1, b: f2}` when waiting for all, `wait f1|f2` otherwise.
    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let node = source.node();
        let futures = source.require(FUTURES_KEY)?;
        let wait_all = source.flag(WAIT_ALL_KEY);

        let mut joined = Vec::new();
        for entry in futures.entries() {
            let text = |key: &str| {
                entry
                    .get(key)
                    .filter(|p| !p.is_empty())
                    .map(Property::to_source)
            };
            let future = text(EXPRESSION_KEY).ok_or_else(|| {
                FlowError::malformed(&node.id, FUTURES_KEY, "has an entry without a future")
            })?;
            joined.push(match text(VARIABLE_KEY) {
                Some(label) if wait_all => format!("{}: {}", label, future),
                _ => future,
            });
        }
        if joined.is_empty() {
            return Err(FlowError::missing(&node.id, FUTURES_KEY));
        }

        let join = if wait_all {
            format!("{{{}}}", joined.iter().join(", "))
        } else {
            joined.iter().join("|")
        };
        source.new_variable();
        source.token().keyword("wait").name(join).end_of_statement();
        source.text_edit();
        Ok(())
    }
}

/// A worker branch with an optional return type.
pub fn worker(name: &str, return_type: Option<&str>) -> Branch {
    let properties = PropertiesBuilder::new()
        .custom(
            TYPE_KEY,
            Property::builder()
                .label("Return Type")
                .description("Type of the value the worker returns")
                .value_type(ValueType::Type)
                .value(return_type.unwrap_or_default())
                .optional(true)
                .build(),
        )
        .build();
    Branch::worker(name).with_properties(properties)
}

fn worker_template(mut node: Node, context: &TemplateContext<'_>) -> Node {
    let mut taken = context.visible_names();
    node.branches = (0..2)
        .map(|_| worker(&names::claim("worker", &mut taken), None))
        .collect();
    node
}

/// Writes each worker branch and returns the worker names in order.
fn render_workers(source: &mut SourceBuilder<'_>) -> Result<Vec<String>, FlowError> {
    let node = source.node();
    let workers: Vec<&Branch> = node
        .branches
        .iter()
        .filter(|b| b.kind == BranchKind::Worker)
        .collect();
    if workers.is_empty() {
        return Err(FlowError::malformed(
            &node.id,
            "branches",
            "needs at least one worker",
        ));
    }

    let mut names = Vec::with_capacity(workers.len());
    for branch in workers {
        let name = branch
            .property(VARIABLE_KEY)
            .filter(|p| !p.is_empty())
            .map(Property::to_source)
            .unwrap_or_else(|| branch.label.clone());
        source.token().keyword("worker").name(&name);
        if let Some(return_type) = branch.property(TYPE_KEY).filter(|p| !p.is_empty()) {
            source.token().keyword("returns").expression(return_type);
        }
        source.body(&branch.children)?;
        source.token().newline();
        names.push(name);
    }
    Ok(names)
}

pub struct ForkBuilder;

impl NodeBuilder for ForkBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Fork
    }

    fn label(&self) -> &'static str {
        "Fork"
    }

    fn description(&self) -> &'static str {
        "Create parallel workers"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["fork", "worker", "parallel"]
    }

    fn populate_template(&self, node: Node, context: &TemplateContext<'_>) -> Node {
        worker_template(node, context)
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        source.token().keyword("fork").open_brace();
        let workers = render_workers(source)?;
        source.token().close_brace();

        if source.node().codedata.is_new {
            source
                .token()
                .newline()
                .typed_binding("map<any|error>", WAIT_RESULT)
                .equal()
                .keyword("wait")
                .name(format!("{{{}}}", workers.join(", ")))
                .end_of_statement();
        }
        source.text_edit();
        Ok(())
    }
}

pub struct ParallelFlowBuilder;

impl NodeBuilder for ParallelFlowBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::ParallelFlow
    }

    fn label(&self) -> &'static str {
        "Parallel Flow"
    }

    fn description(&self) -> &'static str {
        "Run flows in parallel"
    }

    fn populate_template(&self, node: Node, context: &TemplateContext<'_>) -> Node {
        worker_template(node, context)
    }

    /// Only the workers; results are collected by the flow that follows.
    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        render_workers(source)?;
        source.text_edit();
        Ok(())
    }
}
