//! The flow model: nodes, their branches, and the recursive property schema.

mod branch;
mod codedata;
mod kind;
mod metadata;
mod node;
pub mod properties;
mod property;
mod text;

pub use branch::{
    BODY_LABEL, Branch, BranchKind, ELSE_LABEL, ON_FAILURE_LABEL, Repeatable, THEN_LABEL,
};
pub use codedata::Codedata;
pub use kind::{NodeKind, UnknownKind};
pub use metadata::Metadata;
pub use node::{FLAG_CHECKED, Node};
pub use properties::PropertiesBuilder;
pub use property::{
    ParameterKind, Properties, Property, PropertyBuilder, PropertyCodedata, PropertyValue,
    Scalar, TypeMember, ValueType,
};
pub use text::{LinePosition, LineRange, TextEdit};
