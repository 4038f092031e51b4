//! Named helpers for the properties most node templates share.
//!
//! [`PropertiesBuilder`] keeps a stack of open property maps. `nested()` opens a new
//! map and `end_nested` closes it, filing the finished group under a key of the
//! enclosing map as a `FIXED_PROPERTY` or `REPEATABLE_PROPERTY`. Groups nest to any
//! depth, which is how parameter lists and wait-future lists are expressed.

use super::property::{ParameterKind, Properties, Property, PropertyValue, ValueType};
use ahash::AHashSet;

pub const VARIABLE_KEY: &str = "variable";
pub const TYPE_KEY: &str = "type";
pub const EXPRESSION_KEY: &str = "expression";
pub const CONDITION_KEY: &str = "condition";
pub const COLLECTION_KEY: &str = "collection";
pub const CHECK_ERROR_KEY: &str = "checkError";
pub const SCOPE_KEY: &str = "scope";
pub const CONNECTION_KEY: &str = "connection";
pub const RESOURCE_PATH_KEY: &str = "resourcePath";
pub const COMMENT_KEY: &str = "comment";
pub const PATTERNS_KEY: &str = "patterns";
pub const GUARD_KEY: &str = "guard";
pub const ON_ERROR_TYPE_KEY: &str = "errorType";
pub const ON_ERROR_VARIABLE_KEY: &str = "errorVariable";
pub const IGNORE_KEY: &str = "ignore";
pub const RETRY_COUNT_KEY: &str = "retryCount";
pub const STATEMENT_KEY: &str = "statement";
pub const FUNCTION_NAME_KEY: &str = "functionName";
pub const PARAMETERS_KEY: &str = "parameters";
pub const DEFAULTABLE_KEY: &str = "defaultable";
pub const WAIT_ALL_KEY: &str = "waitAll";
pub const FUTURES_KEY: &str = "futures";
pub const RETURN_ERROR_KEY: &str = "returnError";
pub const PROMPT_KEY: &str = "prompt";
pub const BODY_KEY: &str = "body";
pub const INPUTS_KEY: &str = "inputs";
pub const DESCRIPTION_KEY: &str = "description";
pub const RETURN_DESCRIPTION_KEY: &str = "returnDescription";

pub const SCOPE_GLOBAL: &str = "Global";
pub const SCOPE_LOCAL: &str = "Local";

#[derive(Debug, Default)]
pub struct PropertiesBuilder {
    stack: Vec<Properties>,
}

impl PropertiesBuilder {
    pub fn new() -> Self {
        Self {
            stack: vec![Properties::new()],
        }
    }

    /// Continues building on top of an existing map.
    pub fn from_properties(properties: Properties) -> Self {
        Self {
            stack: vec![properties],
        }
    }

    fn current(&mut self) -> &mut Properties {
        if self.stack.is_empty() {
            self.stack.push(Properties::new());
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// Files a fully built property under `key` of the innermost open map.
    pub fn custom(mut self, key: impl Into<String>, property: Property) -> Self {
        self.current().insert(key.into(), property);
        self
    }

    /// Opens a nested group.
    pub fn nested(mut self) -> Self {
        self.stack.push(Properties::new());
        self
    }

    /// Closes the innermost group and files it in its parent.
    pub fn end_nested(
        mut self,
        value_type: ValueType,
        key: impl Into<String>,
        label: &str,
        description: &str,
    ) -> Self {
        let group = if self.stack.len() > 1 {
            self.stack.pop().unwrap_or_default()
        } else {
            Properties::new()
        };
        let property = Property::builder()
            .label(label)
            .description(description)
            .value_type(value_type)
            .value(PropertyValue::Map(group))
            .build();
        self.current().insert(key.into(), property);
        self
    }

    /// Finishes the builder, folding any groups left open into their parents.
    pub fn build(mut self) -> Properties {
        while self.stack.len() > 1 {
            self = self.end_nested(ValueType::FixedProperty, "group", "", "");
        }
        self.stack.pop().unwrap_or_default()
    }

    pub fn variable(self, value: Option<&str>, visible: &AHashSet<String>, prefix: &str) -> Self {
        let name = match value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => crate::builder::names::generate(prefix, visible),
        };
        self.custom(
            VARIABLE_KEY,
            Property::builder()
                .label("Variable Name")
                .description("Name of the variable")
                .value_type(ValueType::Identifier)
                .value(name)
                .build(),
        )
    }

    pub fn data_type(self, value: Option<&str>, editable: bool) -> Self {
        self.custom(
            TYPE_KEY,
            Property::builder()
                .label("Variable Type")
                .description("Type of the variable")
                .value_type(ValueType::Type)
                .value(value.unwrap_or_default())
                .placeholder("var")
                .editable(editable)
                .build(),
        )
    }

    pub fn expression(self, value: Option<&str>, label: &str, description: &str) -> Self {
        self.custom(
            EXPRESSION_KEY,
            Property::builder()
                .label(label)
                .description(description)
                .value_type(ValueType::Expression)
                .value(value.unwrap_or_default())
                .build(),
        )
    }

    pub fn optional_expression(self, value: Option<&str>, label: &str, description: &str) -> Self {
        self.custom(
            EXPRESSION_KEY,
            Property::builder()
                .label(label)
                .description(description)
                .value_type(ValueType::Expression)
                .value(value.unwrap_or_default())
                .optional(true)
                .build(),
        )
    }

    pub fn condition(self, value: Option<&str>) -> Self {
        self.custom(
            CONDITION_KEY,
            Property::builder()
                .label("Condition")
                .description("Boolean Condition")
                .value_type(ValueType::Expression)
                .value(value.unwrap_or_default())
                .placeholder("true")
                .build(),
        )
    }

    pub fn collection(self, value: Option<&str>) -> Self {
        self.custom(
            COLLECTION_KEY,
            Property::builder()
                .label("Collection")
                .description("Collection to iterate")
                .value_type(ValueType::Expression)
                .value(value.unwrap_or_default())
                .placeholder("[]")
                .build(),
        )
    }

    pub fn check_error(self, value: bool) -> Self {
        self.custom(
            CHECK_ERROR_KEY,
            Property::builder()
                .label("Check Error")
                .description("Trigger error flow")
                .value_type(ValueType::Flag)
                .value(value)
                .advanced(true)
                .build(),
        )
    }

    pub fn scope(self, value: &str) -> Self {
        self.custom(
            SCOPE_KEY,
            Property::builder()
                .label("Connection Scope")
                .description("Scope of the connection, Global or Local")
                .value_type(ValueType::SingleSelect)
                .value(value)
                .type_member(SCOPE_GLOBAL, value == SCOPE_GLOBAL)
                .type_member(SCOPE_LOCAL, value == SCOPE_LOCAL)
                .advanced(true)
                .build(),
        )
    }

    pub fn connection(self, value: Option<&str>) -> Self {
        self.custom(
            CONNECTION_KEY,
            Property::builder()
                .label("Connection")
                .description("Connection to use")
                .value_type(ValueType::Identifier)
                .value(value.unwrap_or_default())
                .editable(false)
                .build(),
        )
    }

    pub fn resource_path(self, value: &str) -> Self {
        self.custom(
            RESOURCE_PATH_KEY,
            Property::builder()
                .label("Resource Path")
                .description("Resource path")
                .value_type(ValueType::ActionPath)
                .value(value)
                .build(),
        )
    }

    pub fn comment(self, value: Option<&str>) -> Self {
        self.custom(
            COMMENT_KEY,
            Property::builder()
                .label("Comment")
                .description("Comment to attach to the code")
                .value_type(ValueType::Text)
                .value(value.unwrap_or_default())
                .build(),
        )
    }

    pub fn patterns(self, patterns: Vec<Property>) -> Self {
        self.custom(
            PATTERNS_KEY,
            Property::builder()
                .label("Patterns")
                .description("List of binding patterns")
                .value_type(ValueType::MultipleSelect)
                .value(patterns)
                .build(),
        )
    }

    pub fn guard(self, value: Option<&str>) -> Self {
        self.custom(
            GUARD_KEY,
            Property::builder()
                .label("Guard")
                .description("Guard expression")
                .value_type(ValueType::Expression)
                .value(value.unwrap_or_default())
                .optional(true)
                .build(),
        )
    }

    pub fn on_error(self, error_type: &str, error_variable: &str) -> Self {
        self.custom(
            ON_ERROR_TYPE_KEY,
            Property::builder()
                .label("Error Type")
                .description("Type of the error")
                .value_type(ValueType::Type)
                .value(error_type)
                .placeholder("error")
                .build(),
        )
        .custom(
            ON_ERROR_VARIABLE_KEY,
            Property::builder()
                .label("Error Variable")
                .description("Name of the error variable")
                .value_type(ValueType::Identifier)
                .value(error_variable)
                .placeholder("err")
                .build(),
        )
    }

    pub fn ignore(self, value: bool) -> Self {
        self.custom(
            IGNORE_KEY,
            Property::builder()
                .label("Ignore")
                .description("Ignore the error value")
                .value_type(ValueType::Flag)
                .value(value)
                .editable(false)
                .build(),
        )
    }

    pub fn retry_count(self, value: u32) -> Self {
        self.custom(
            RETRY_COUNT_KEY,
            Property::builder()
                .label("Retry Count")
                .description("Number of retries")
                .value_type(ValueType::Expression)
                .value(value.to_string())
                .build(),
        )
    }

    pub fn statement(self, value: Option<&str>) -> Self {
        self.custom(
            STATEMENT_KEY,
            Property::builder()
                .label("Statement")
                .description("Statement")
                .value_type(ValueType::Expression)
                .value(value.unwrap_or_default())
                .build(),
        )
    }

    pub fn function_name(self, value: &str, editable: bool) -> Self {
        self.custom(
            FUNCTION_NAME_KEY,
            Property::builder()
                .label("Name")
                .description("Name of the function")
                .value_type(ValueType::Identifier)
                .value(value)
                .editable(editable)
                .build(),
        )
    }

    pub fn wait_all(self, value: bool) -> Self {
        self.custom(
            WAIT_ALL_KEY,
            Property::builder()
                .label("Wait All")
                .description("Wait for all tasks to complete")
                .value_type(ValueType::Flag)
                .value(value)
                .build(),
        )
    }

    pub fn return_error(self, value: bool) -> Self {
        self.custom(
            RETURN_ERROR_KEY,
            Property::builder()
                .label("Return Error")
                .description("Allow the function to return an error")
                .value_type(ValueType::Flag)
                .value(value)
                .build(),
        )
    }

    pub fn description(self, value: Option<&str>) -> Self {
        self.custom(
            DESCRIPTION_KEY,
            Property::builder()
                .label("Description")
                .description("Documentation of the definition")
                .value_type(ValueType::String)
                .value(value.unwrap_or_default())
                .optional(true)
                .build(),
        )
    }

    /// Adds a call parameter taken from a symbol signature.
    pub fn parameter(
        self,
        name: &str,
        type_name: &str,
        kind: ParameterKind,
        default_value: Option<&str>,
        description: &str,
    ) -> Self {
        let optional = !matches!(kind, ParameterKind::Required | ParameterKind::PathParam);
        // The type-inferring parameter names the result type, so it is edited up front.
        let infers = kind == ParameterKind::ParamForTypeInfer;
        let mut builder = Property::builder()
            .label(name)
            .description(description)
            .value_type(if infers { ValueType::Type } else { ValueType::Expression })
            .type_constraint(type_name)
            .optional(optional)
            .advanced(optional && !infers)
            .kind(kind)
            .original_name(name);
        if let Some(default) = default_value {
            builder = builder.placeholder(default);
        }
        if kind == ParameterKind::RestParameter {
            builder = builder.value(Vec::<Property>::new());
        }
        self.custom(name, builder.build())
    }

    /// Opens a repeatable parameter list whose entries are `type` + `variable` pairs.
    pub fn parameter_entry(self, key: &str, type_name: &str, name: &str) -> Self {
        self.nested()
            .custom(
                TYPE_KEY,
                Property::builder()
                    .label("Type")
                    .description("Type of the parameter")
                    .value_type(ValueType::Type)
                    .value(type_name)
                    .build(),
            )
            .custom(
                VARIABLE_KEY,
                Property::builder()
                    .label("Name")
                    .description("Name of the parameter")
                    .value_type(ValueType::Identifier)
                    .value(name)
                    .build(),
            )
            .end_nested(ValueType::FixedProperty, key, "Parameter", "A parameter of the definition")
    }
}
