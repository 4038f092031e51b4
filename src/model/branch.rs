use super::node::Node;
use super::property::{Properties, Property};
use serde::{Deserialize, Serialize};

pub const THEN_LABEL: &str = "Then";
pub const ELSE_LABEL: &str = "Else";
pub const BODY_LABEL: &str = "Body";
pub const ON_FAILURE_LABEL: &str = "On Failure";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchKind {
    #[default]
    Block,
    Worker,
}

/// How many times a branch may appear on its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Repeatable {
    #[default]
    One,
    OneOrMore,
    ZeroOrOne,
    ZeroOrMore,
}

/// A named block of child nodes attached to a composite node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub label: String,
    #[serde(default)]
    pub kind: BranchKind,
    #[serde(default)]
    pub repeatable: Repeatable,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Branch {
    pub fn block(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: BranchKind::Block,
            repeatable: Repeatable::One,
            properties: Properties::new(),
            children: Vec::new(),
        }
    }

    pub fn worker(label: impl Into<String>) -> Self {
        Self {
            kind: BranchKind::Worker,
            repeatable: Repeatable::OneOrMore,
            ..Self::block(label)
        }
    }

    pub fn with_repeatable(mut self, repeatable: Repeatable) -> Self {
        self.repeatable = repeatable;
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }
}
