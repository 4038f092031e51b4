//! Argument and parameter lists shared by the call and definition builders.

use crate::error::FlowError;
use crate::model::properties::{DESCRIPTION_KEY, TYPE_KEY, VARIABLE_KEY};
use crate::model::{ParameterKind, Property};
use crate::source::SourceBuilder;
use itertools::Itertools;

/// Collects the call arguments of the current node and writes them as `(<args>)`.
///
/// Parameters are taken in property order. They stay positional until a defaultable
/// parameter is skipped; every supplied defaultable parameter after that is written as
/// `name = value`. Included-record fields are always named and rest arguments are
/// spread in place. Properties that are not parameters are ignored.
///
/// Rest arguments cannot follow named ones, so when the call spreads rest values every
/// skipped parameter is passed positionally with its default instead.
pub fn call_arguments(source: &mut SourceBuilder<'_>) -> Result<(), FlowError> {
    let arguments = collect_arguments(source)?;
    let tokens = source.token();
    tokens.open_paren();
    for (i, argument) in arguments.iter().enumerate() {
        if i > 0 {
            tokens.comma();
        }
        tokens.name(argument);
    }
    tokens.close_paren();
    Ok(())
}

/// One parameter position of a call, before deciding between positional and named form.
enum Slot<'n> {
    Given { name: &'n str, value: String },
    Skipped { key: &'n str, default: &'n str },
    Field { name: &'n str, value: String },
    Rest(Vec<String>),
}

fn collect_arguments(source: &mut SourceBuilder<'_>) -> Result<Vec<String>, FlowError> {
    let node = source.node();
    let mut slots = Vec::new();

    for (key, property) in &node.properties {
        let Some(kind) = property.param_kind() else {
            continue;
        };
        if kind == ParameterKind::ParamForTypeInfer || kind == ParameterKind::PathParam {
            continue;
        }
        // Records the imports the argument value needs.
        source.property(key);
        let name = property.original_name().unwrap_or(key.as_str());
        let value = property.text().filter(|v| !v.trim().is_empty());

        match kind {
            ParameterKind::Required => {
                let value = value
                    .or_else(|| Some(property.placeholder.clone()).filter(|p| !p.is_empty()))
                    .ok_or_else(|| FlowError::missing(&node.id, key))?;
                slots.push(Slot::Given { name, value });
            }
            ParameterKind::Defaultable | ParameterKind::IncludedRecord => match value {
                Some(value) if value != property.placeholder => {
                    slots.push(Slot::Given { name, value });
                }
                _ => slots.push(Slot::Skipped {
                    key,
                    default: &property.placeholder,
                }),
            },
            ParameterKind::IncludedField => {
                if let Some(value) = value {
                    slots.push(Slot::Field { name, value });
                }
            }
            ParameterKind::RestParameter => {
                let values = rest_values(property);
                if !values.is_empty() {
                    slots.push(Slot::Rest(values));
                }
            }
            ParameterKind::ParamForTypeInfer | ParameterKind::PathParam => {}
        }
    }

    let spread = slots.iter().any(|slot| matches!(slot, Slot::Rest(_)));
    let mut arguments = Vec::new();
    let mut named = false;
    for slot in slots {
        match slot {
            Slot::Given { name, value } => arguments.push(argument(named, name, &value)),
            Slot::Skipped { key, default } if spread => {
                if default.is_empty() {
                    return Err(FlowError::malformed(
                        &node.id,
                        key,
                        "needs a value or a default when rest arguments are passed",
                    ));
                }
                arguments.push(default.to_string());
            }
            Slot::Skipped { .. } => named = true,
            Slot::Field { name, value } => arguments.push(argument(true, name, &value)),
            Slot::Rest(values) => arguments.extend(values),
        }
    }
    Ok(arguments)
}

fn argument(named: bool, name: &str, value: &str) -> String {
    if named {
        format!("{} = {}", name, value)
    } else {
        value.to_string()
    }
}

fn rest_values(property: &Property) -> Vec<String> {
    match property.as_list() {
        Some(items) => items
            .iter()
            .filter(|item| !item.is_empty())
            .map(Property::to_source)
            .collect(),
        None => property
            .text()
            .filter(|v| !v.trim().is_empty())
            .into_iter()
            .collect(),
    }
}

/// One parameter of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredParameter {
    pub type_name: String,
    pub name: String,
    pub description: Option<String>,
}

/// Reads the repeatable parameter group under `key`. A missing group means no
/// parameters; an entry without a type or name is malformed.
pub fn declared_parameters(
    source: &mut SourceBuilder<'_>,
    key: &str,
) -> Result<Vec<DeclaredParameter>, FlowError> {
    let node = source.node();
    let Some(group) = source.property(key) else {
        return Ok(Vec::new());
    };
    group
        .validate_shape()
        .map_err(|reason| FlowError::malformed(&node.id, key, reason))?;

    let mut parameters = Vec::new();
    for entry in group.entries() {
        let field = |k: &str| {
            entry
                .get(k)
                .and_then(Property::text)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let (Some(type_name), Some(name)) = (field(TYPE_KEY), field(VARIABLE_KEY)) else {
            return Err(FlowError::malformed(
                &node.id,
                key,
                "has an entry without a type or a name",
            ));
        };
        parameters.push(DeclaredParameter {
            type_name,
            name,
            description: field(DESCRIPTION_KEY),
        });
    }
    Ok(parameters)
}

/// `T a, U b`
pub fn parameter_list(parameters: &[DeclaredParameter]) -> String {
    parameters
        .iter()
        .map(|p| format!("{} {}", p.type_name, p.name))
        .join(", ")
}
