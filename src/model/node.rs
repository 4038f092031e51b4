use super::branch::Branch;
use super::codedata::Codedata;
use super::kind::NodeKind;
use super::metadata::Metadata;
use super::property::{Properties, Property, PropertyValue};
use serde::{Deserialize, Serialize};

/// Flag bit set when the node's call result is wrapped in `check`.
pub const FLAG_CHECKED: u32 = 1 << 0;

/// One statement or construct of the visual program graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default)]
    pub id: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub codedata: Codedata,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub returning: bool,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: String::new(),
            kind,
            metadata: Metadata::default(),
            codedata: Codedata::default(),
            properties: Properties::new(),
            branches: Vec::new(),
            flags: 0,
            returning: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_codedata(mut self, codedata: Codedata) -> Self {
        self.codedata = codedata;
        self
    }

    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    pub fn property_mut(&mut self, key: &str) -> Option<&mut Property> {
        self.properties.get_mut(key)
    }

    /// Sets the value of `key`, adding a bare expression property when the key is new.
    pub fn set(&mut self, key: &str, value: impl Into<PropertyValue>) -> &mut Self {
        let value = value.into();
        match self.properties.get_mut(key) {
            Some(property) => property.value = value,
            None => {
                self.properties
                    .insert(key.to_string(), Property::expression(value));
            }
        }
        self
    }

    /// Removes `key`, preserving the order of the remaining properties.
    pub fn unset(&mut self, key: &str) -> Option<Property> {
        self.properties.shift_remove(key)
    }

    pub fn branch(&self, label: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.label == label)
    }

    pub fn branch_mut(&mut self, label: &str) -> Option<&mut Branch> {
        self.branches.iter_mut().find(|b| b.label == label)
    }

    pub fn is_checked(&self) -> bool {
        self.flags & FLAG_CHECKED != 0
    }

    /// Visits the node and every descendant, depth first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        for branch in &self.branches {
            for child in &branch.children {
                child.walk(visit);
            }
        }
    }

    /// The number of nodes in the tree rooted here.
    pub fn size(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}
