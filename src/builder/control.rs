//! Branching, looping and error-handling constructs, plus the single-keyword statements
//! that only make sense inside them.

use super::{NodeBuilder, TemplateContext};
use crate::error::FlowError;
use crate::model::properties::{
    COLLECTION_KEY, CONDITION_KEY, EXPRESSION_KEY, GUARD_KEY, PATTERNS_KEY, RETRY_COUNT_KEY,
    TYPE_KEY, VARIABLE_KEY,
};
use crate::model::{
    BODY_LABEL, Branch, ELSE_LABEL, Node, NodeKind, ON_FAILURE_LABEL, PropertiesBuilder, Property,
    Repeatable, THEN_LABEL,
};
use crate::source::SourceBuilder;

/// An `On Failure` branch for templates. Ignored until the user opts in.
pub(crate) fn on_failure_branch(ignore: bool) -> Branch {
    Branch::block(ON_FAILURE_LABEL)
        .with_repeatable(Repeatable::ZeroOrOne)
        .with_properties(
            PropertiesBuilder::new()
                .on_error("error", "e")
                .ignore(ignore)
                .build(),
        )
}

fn body_branch() -> Branch {
    Branch::block(BODY_LABEL)
}

/// The children of a required branch.
fn required_branch<'a>(node: &'a Node, label: &str) -> Result<&'a Branch, FlowError> {
    node.branch(label)
        .ok_or_else(|| FlowError::malformed(&node.id, label, "branch is required"))
}

pub struct EventStartBuilder;

impl NodeBuilder for EventStartBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::EventStart
    }

    fn label(&self) -> &'static str {
        "Start"
    }

    fn description(&self) -> &'static str {
        "Entry point of the flow"
    }

    fn populate_template(&self, node: Node, _context: &TemplateContext<'_>) -> Node {
        node
    }

    // The entry point has no source of its own.
    fn render(&self, _source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        Ok(())
    }
}

pub struct IfBuilder;

impl NodeBuilder for IfBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::If
    }

    fn label(&self) -> &'static str {
        "If"
    }

    fn description(&self) -> &'static str {
        "Add conditional branch to the integration flow."
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["if", "condition", "else"]
    }

    fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
        node.branches = vec![
            Branch::block(THEN_LABEL)
                .with_properties(PropertiesBuilder::new().condition(None).build()),
            Branch::block(ELSE_LABEL).with_repeatable(Repeatable::ZeroOrOne),
        ];
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let node = source.node();
        let then = required_branch(node, THEN_LABEL)?;
        let condition = source.require_in(then, CONDITION_KEY)?;
        source.token().keyword("if").expression(condition);
        source.body(&then.children)?;

        // Branches other than Then and Else are extra `else if` arms.
        for branch in node
            .branches
            .iter()
            .filter(|b| ![THEN_LABEL, ELSE_LABEL, ON_FAILURE_LABEL].contains(&b.label.as_str()))
        {
            let condition = source.require_in(branch, CONDITION_KEY)?;
            source
                .token()
                .keyword("else")
                .keyword("if")
                .expression(condition);
            source.body(&branch.children)?;
        }

        if let Some(otherwise) = node.branch(ELSE_LABEL) {
            match otherwise.children.as_slice() {
                [] => {}
                [only] if only.kind == NodeKind::If => {
                    let chained = source.render_child(only)?.unwrap_or_default();
                    source.token().keyword("else").inline(chained);
                }
                children => {
                    source.token().keyword("else");
                    source.body(children)?;
                }
            }
        }
        source.text_edit();
        Ok(())
    }
}

pub struct MatchBuilder;

impl NodeBuilder for MatchBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Match
    }

    fn label(&self) -> &'static str {
        "Match"
    }

    fn description(&self) -> &'static str {
        "Switches the data flow based on the value of an expression."
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["match", "switch", "case"]
    }

    fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
        node.properties = PropertiesBuilder::new()
            .custom(
                CONDITION_KEY,
                Property::builder()
                    .label("Target")
                    .description("The value to match against")
                    .placeholder("true")
                    .build(),
            )
            .build();
        node.branches = vec![
            Branch::block("_")
                .with_repeatable(Repeatable::OneOrMore)
                .with_properties(
                    PropertiesBuilder::new()
                        .patterns(vec![Property::expression("_")])
                        .guard(None)
                        .build(),
                ),
        ];
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let node = source.node();
        let target = source.require(CONDITION_KEY)?;
        source.token().keyword("match").expression(target).open_brace();

        for case in node.branches.iter().filter(|b| b.label != ON_FAILURE_LABEL) {
            let patterns: Vec<String> = case
                .property(PATTERNS_KEY)
                .and_then(Property::as_list)
                .map(|items| {
                    items
                        .iter()
                        .filter(|p| !p.is_empty())
                        .map(Property::to_source)
                        .collect()
                })
                .unwrap_or_default();
            let pattern = if patterns.is_empty() {
                case.label.clone()
            } else {
                patterns.join("|")
            };
            source.token().name(pattern);
            if let Some(guard) = case.property(GUARD_KEY).filter(|g| !g.is_empty()) {
                source.token().keyword("if").expression(guard);
            }
            source.token().right_double_arrow();
            source.body(&case.children)?;
            source.token().newline();
        }
        source.token().close_brace();
        source.on_failure()?;
        source.text_edit();
        Ok(())
    }
}

pub struct WhileBuilder;

impl NodeBuilder for WhileBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::While
    }

    fn label(&self) -> &'static str {
        "While"
    }

    fn description(&self) -> &'static str {
        "Loops over a block of code while the condition holds."
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["while", "loop"]
    }

    fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
        node.properties = PropertiesBuilder::new().condition(None).build();
        node.branches = vec![body_branch(), on_failure_branch(true)];
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let node = source.node();
        let condition = source.require(CONDITION_KEY)?;
        source.token().keyword("while").expression(condition);
        source.body(&required_branch(node, BODY_LABEL)?.children)?;
        source.on_failure()?;
        source.text_edit();
        Ok(())
    }
}

pub struct ForeachBuilder;

impl NodeBuilder for ForeachBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Foreach
    }

    fn label(&self) -> &'static str {
        "Foreach"
    }

    fn description(&self) -> &'static str {
        "Iterates over a collection, running the body once per item."
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["foreach", "for", "loop", "iterate"]
    }

    fn populate_template(&self, mut node: Node, context: &TemplateContext<'_>) -> Node {
        let visible = context.visible_names();
        node.properties = PropertiesBuilder::new()
            .collection(None)
            .data_type(None, true)
            .variable(None, &visible, "item")
            .build();
        node.branches = vec![body_branch(), on_failure_branch(true)];
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let node = source.node();
        let variable = source.require(VARIABLE_KEY)?;
        let type_name = source.require(TYPE_KEY)?;
        let collection = source.require(COLLECTION_KEY)?;
        source
            .token()
            .keyword("foreach")
            .expression(type_name)
            .whitespace()
            .expression(variable)
            .keyword("in")
            .expression(collection);
        source.body(&required_branch(node, BODY_LABEL)?.children)?;
        source.on_failure()?;
        source.text_edit();
        Ok(())
    }
}

/// Statements that are a single keyword followed by an optional or required expression.
macro_rules! keyword_statement {
    ($name:ident, $kind:path, $label:literal, $description:literal, $keyword:literal, none) => {
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

            fn populate_template(&self, node: Node, _context: &TemplateContext<'_>) -> Node {
                node
            }

            fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
                source.token().keyword($keyword).end_of_statement();
                source.text_edit();
                Ok(())
            }
        }
    };
    ($name:ident, $kind:path, $label:literal, $description:literal, $keyword:literal, optional) => {
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

            fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
                node.properties = PropertiesBuilder::new()
                    .optional_expression(None, "Expression", $description)
                    .build();
                node
            }

            fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
                let expression = source.text(EXPRESSION_KEY);
                let tokens = source.token();
                tokens.keyword($keyword);
                if let Some(expression) = expression {
                    tokens.name(expression);
                }
                tokens.end_of_statement();
                source.text_edit();
                Ok(())
            }
        }
    };
    ($name:ident, $kind:path, $label:literal, $description:literal, $keyword:literal, required) => {
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

            fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
                node.properties = PropertiesBuilder::new()
                    .expression(None, "Expression", $description)
                    .build();
                node
            }

            fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
                let expression = source.require(EXPRESSION_KEY)?;
                source
                    .token()
                    .keyword($keyword)
                    .expression(expression)
                    .end_of_statement();
                source.text_edit();
                Ok(())
            }
        }
    };
}

keyword_statement!(BreakBuilder, NodeKind::Break, "Break", "Break out of the loop", "break", none);
keyword_statement!(ContinueBuilder, NodeKind::Continue, "Continue", "Skip to the next iteration of the loop", "continue", none);
keyword_statement!(StopBuilder, NodeKind::Stop, "Stop", "Stop the execution of the flow", "return", none);
keyword_statement!(ReturnBuilder, NodeKind::Return, "Return", "Value of the expression to return", "return", optional);
keyword_statement!(RollbackBuilder, NodeKind::Rollback, "Rollback", "Rollback the current transaction", "rollback", optional);
keyword_statement!(PanicBuilder, NodeKind::Panic, "Panic", "Panic and stop the execution", "panic", required);
keyword_statement!(FailBuilder, NodeKind::Fail, "Fail", "Fail the execution with an error", "fail", required);

pub struct CommitBuilder;

impl NodeBuilder for CommitBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Commit
    }

    fn label(&self) -> &'static str {
        "Commit"
    }

    fn description(&self) -> &'static str {
        "Commit transaction"
    }

    fn populate_template(&self, node: Node, _context: &TemplateContext<'_>) -> Node {
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        source
            .token()
            .keyword("check")
            .keyword("commit")
            .end_of_statement();
        source.text_edit();
        Ok(())
    }
}

/// Block constructs made of a keyword, a body and an optional failure handler.
fn render_guarded_block(
    source: &mut SourceBuilder<'_>,
    keyword: &str,
) -> Result<(), FlowError> {
    let node = source.node();
    source.token().keyword(keyword);
    source.body(&required_branch(node, BODY_LABEL)?.children)?;
    source.on_failure()?;
    source.text_edit();
    Ok(())
}

pub struct ErrorHandlerBuilder;

impl NodeBuilder for ErrorHandlerBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::ErrorHandler
    }

    fn label(&self) -> &'static str {
        "Error Handler"
    }

    fn description(&self) -> &'static str {
        "Catch and handle errors"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["do", "on fail", "catch", "error"]
    }

    fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
        node.branches = vec![body_branch(), on_failure_branch(false)];
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        render_guarded_block(source, "do")
    }
}

pub struct LockBuilder;

impl NodeBuilder for LockBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Lock
    }

    fn label(&self) -> &'static str {
        "Lock"
    }

    fn description(&self) -> &'static str {
        "Allow to access mutable states safely"
    }

    fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
        node.branches = vec![body_branch(), on_failure_branch(true)];
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        render_guarded_block(source, "lock")
    }
}

pub struct TransactionBuilder;

impl NodeBuilder for TransactionBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Transaction
    }

    fn label(&self) -> &'static str {
        "Transaction"
    }

    fn description(&self) -> &'static str {
        "Handle transaction."
    }

    fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
        let commit = CommitBuilder.populate_constants();
        node.branches = vec![
            body_branch().with_children(vec![commit]),
            on_failure_branch(true),
        ];
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        render_guarded_block(source, "transaction")
    }
}

pub struct RetryBuilder;

impl NodeBuilder for RetryBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Retry
    }

    fn label(&self) -> &'static str {
        "Retry"
    }

    fn description(&self) -> &'static str {
        "Retry block."
    }

    fn populate_template(&self, mut node: Node, _context: &TemplateContext<'_>) -> Node {
        node.properties = PropertiesBuilder::new().retry_count(3).build();
        node.branches = vec![body_branch(), on_failure_branch(true)];
        node
    }

    fn render(&self, source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
        let node = source.node();
        let count = source.require(RETRY_COUNT_KEY)?;
        let count = count.to_source();
        if count.trim().parse::<u32>().is_err() {
            return Err(FlowError::malformed(
                &node.id,
                RETRY_COUNT_KEY,
                format!("must be a non-negative integer, got '{}'", count),
            ));
        }
        source
            .token()
            .keyword("retry")
            .open_paren()
            .name(count.trim())
            .close_paren();
        source.body(&required_branch(node, BODY_LABEL)?.children)?;
        source.on_failure()?;
        source.text_edit();
        Ok(())
    }
}
