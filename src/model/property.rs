use super::metadata::Metadata;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered map of property key to property, as carried by nodes, branches and
/// nested schemas.
pub type Properties = IndexMap<String, Property>;

/// How the editor presents a property and which value shapes are legal for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    #[default]
    Expression,
    Identifier,
    Type,
    SingleSelect,
    MultipleSelect,
    RepeatableProperty,
    FixedProperty,
    RawTemplate,
    Flag,
    String,
    Text,
    ExpressionSet,
    View,
    ActionPath,
}

/// The role a property plays when it stands for a parameter of a called symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterKind {
    Required,
    Defaultable,
    IncludedRecord,
    IncludedField,
    RestParameter,
    PathParam,
    ParamForTypeInfer,
}

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// The value held by a property. Nested schemas are themselves property maps, which
/// lets repeatable groups nest to any depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyValue {
    Scalar(Scalar),
    List(Vec<Property>),
    Map(Properties),
    /// A named schema (usually a record type) resolved by the catalog.
    SchemaRef(String),
}

impl Default for PropertyValue {
    fn default() -> Self {
        PropertyValue::Scalar(Scalar::Text(String::new()))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Scalar(Scalar::Text(value.to_string()))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Scalar(Scalar::Text(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Scalar(Scalar::Bool(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Scalar(Scalar::Number(value))
    }
}

impl From<Vec<Property>> for PropertyValue {
    fn from(value: Vec<Property>) -> Self {
        PropertyValue::List(value)
    }
}

impl From<Properties> for PropertyValue {
    fn from(value: Properties) -> Self {
        PropertyValue::Map(value)
    }
}

/// Symbol-level data of a property: parameter role, original name and the imports the
/// value needs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyCodedata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ParameterKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    /// Module prefix to `org/module[:version]`.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub imports: IndexMap<String, String>,
}

/// One alternative of a union-typed property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMember {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub package_info: String,
    #[serde(default)]
    pub selected: bool,
}

/// A typed, schema-described field of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub value: PropertyValue,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub placeholder: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default = "default_editable")]
    pub editable: bool,
    #[serde(default)]
    pub advanced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codedata: Option<PropertyCodedata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_constraint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_members: Vec<TypeMember>,
}

fn default_editable() -> bool {
    true
}

impl Property {
    pub fn builder() -> PropertyBuilder {
        PropertyBuilder::new()
    }

    /// A bare expression property holding `value`.
    pub fn expression(value: impl Into<PropertyValue>) -> Self {
        PropertyBuilder::new().value(value).build()
    }

    /// True when the value carries nothing a renderer could emit.
    pub fn is_empty(&self) -> bool {
        match &self.value {
            PropertyValue::Scalar(Scalar::Text(s)) => s.trim().is_empty(),
            PropertyValue::Scalar(_) => false,
            PropertyValue::List(items) => items.is_empty(),
            PropertyValue::Map(map) => map.is_empty(),
            PropertyValue::SchemaRef(name) => name.trim().is_empty(),
        }
    }

    /// The scalar text of the value, if it is a scalar or schema reference.
    pub fn text(&self) -> Option<String> {
        match &self.value {
            PropertyValue::Scalar(scalar) => Some(scalar.to_string()),
            PropertyValue::SchemaRef(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// The source text of the value, falling back to the placeholder when empty.
    pub fn to_source(&self) -> String {
        match self.text() {
            Some(text) if !text.trim().is_empty() => text,
            _ => self.placeholder.clone(),
        }
    }

    /// Reads a flag. Text values of `"true"` count as set.
    pub fn as_bool(&self) -> bool {
        match &self.value {
            PropertyValue::Scalar(Scalar::Bool(b)) => *b,
            PropertyValue::Scalar(Scalar::Text(s)) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn as_list(&self) -> Option<&[Property]> {
        match &self.value {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Properties> {
        match &self.value {
            PropertyValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The sub-schemas of a repeatable group, in order. Entries that are not fixed
    /// groups are skipped.
    pub fn entries(&self) -> impl Iterator<Item = &Properties> {
        self.as_map()
            .into_iter()
            .flat_map(|map| map.values())
            .filter_map(|entry| entry.as_map())
    }

    pub fn param_kind(&self) -> Option<ParameterKind> {
        self.codedata.as_ref().and_then(|c| c.kind)
    }

    pub fn original_name(&self) -> Option<&str> {
        self.codedata
            .as_ref()
            .and_then(|c| c.original_name.as_deref())
    }

    /// Module ids (`org/module`) the value depends on, version suffixes stripped.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.codedata
            .iter()
            .flat_map(|c| c.imports.values())
            .map(|id| id.split(':').next().unwrap_or(id.as_str()))
    }

    /// Checks that the value shape is legal for the declared value type.
    pub fn validate_shape(&self) -> Result<(), String> {
        let ok = match (self.value_type, &self.value) {
            (ValueType::Flag, PropertyValue::Scalar(Scalar::Bool(_))) => true,
            (ValueType::Flag, PropertyValue::Scalar(Scalar::Text(s))) => {
                matches!(s.trim(), "true" | "false")
            }
            (ValueType::Flag, _) => false,
            (ValueType::FixedProperty, PropertyValue::Map(map)) => {
                return map.values().try_for_each(Property::validate_shape);
            }
            (ValueType::FixedProperty, _) => false,
            (ValueType::RepeatableProperty, PropertyValue::Map(map)) => {
                for (key, entry) in map {
                    if entry.value_type != ValueType::FixedProperty || entry.as_map().is_none() {
                        return Err(format!("entry '{}' is not a fixed property group", key));
                    }
                    entry.validate_shape()?;
                }
                true
            }
            (ValueType::RepeatableProperty, _) => false,
            (ValueType::MultipleSelect | ValueType::ExpressionSet, PropertyValue::List(_)) => true,
            (ValueType::MultipleSelect | ValueType::ExpressionSet, _) => false,
            (_, PropertyValue::Scalar(_) | PropertyValue::SchemaRef(_)) => true,
            // Single expressions may still carry a list, e.g. rest arguments or patterns.
            (_, PropertyValue::List(_)) => true,
            (_, PropertyValue::Map(_)) => false,
        };
        if ok {
            Ok(())
        } else {
            Err(format!(
                "value shape is not valid for value type {:?}",
                self.value_type
            ))
        }
    }
}

/// Assembles a [`Property`] step by step and files it under a key.
///
/// ```rust
/// use flowgen::model::{Properties, Property, ValueType};
///
/// let mut props = Properties::new();
/// Property::builder()
///     .label("Condition")
///     .description("Boolean condition")
///     .value_type(ValueType::Expression)
///     .placeholder("true")
///     .add_to(&mut props, "condition");
/// assert_eq!(props["condition"].to_source(), "true");
/// ```
#[derive(Debug, Clone)]
pub struct PropertyBuilder {
    property: Property,
}

impl Default for PropertyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyBuilder {
    pub fn new() -> Self {
        Self {
            property: Property {
                metadata: Metadata::default(),
                value_type: ValueType::Expression,
                value: PropertyValue::default(),
                placeholder: String::new(),
                optional: false,
                editable: true,
                advanced: false,
                codedata: None,
                type_constraint: None,
                type_members: Vec::new(),
            },
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.property.metadata.label = label.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.property.metadata.description = description.into();
        self
    }

    pub fn value(mut self, value: impl Into<PropertyValue>) -> Self {
        self.property.value = value.into();
        self
    }

    /// Sets the value only when one is given, leaving the default otherwise.
    pub fn value_opt<V: Into<PropertyValue>>(self, value: Option<V>) -> Self {
        match value {
            Some(v) => self.value(v),
            None => self,
        }
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.property.value_type = value_type;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.property.placeholder = placeholder.into();
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.property.optional = optional;
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.property.editable = editable;
        self
    }

    pub fn advanced(mut self, advanced: bool) -> Self {
        self.property.advanced = advanced;
        self
    }

    pub fn kind(mut self, kind: ParameterKind) -> Self {
        self.codedata().kind = Some(kind);
        self
    }

    pub fn original_name(mut self, name: impl Into<String>) -> Self {
        self.codedata().original_name = Some(name.into());
        self
    }

    pub fn import(mut self, prefix: impl Into<String>, module_id: impl Into<String>) -> Self {
        self.codedata().imports.insert(prefix.into(), module_id.into());
        self
    }

    pub fn type_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.property.type_constraint = Some(constraint.into());
        self
    }

    pub fn type_member(mut self, type_name: impl Into<String>, selected: bool) -> Self {
        self.property.type_members.push(TypeMember {
            type_name: type_name.into(),
            package_info: String::new(),
            selected,
        });
        self
    }

    fn codedata(&mut self) -> &mut PropertyCodedata {
        self.property.codedata.get_or_insert_with(PropertyCodedata::default)
    }

    pub fn build(self) -> Property {
        self.property
    }

    /// Files the property under `key`, replacing any previous entry in place.
    pub fn add_to(self, properties: &mut Properties, key: impl Into<String>) {
        properties.insert(key.into(), self.property);
    }
}
