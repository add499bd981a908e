//! Field-level schema description.
//!
//! A [`FieldSpec`] is one entry of a [`crate::Schema`]: the key the value is
//! stored under in a raw tree, whether it must be present, its kind, optional
//! enum constraints and the default written when the caller omits it.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::SchemaError;
use crate::model::TypeKey;

/// Structural kind of a raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// JSON string
    String,
    /// JSON number (integral or floating point)
    Number,
    /// JSON boolean
    Boolean,
    /// JSON array
    List,
    /// JSON object
    Map,
    /// Any value; no structural check is applied
    Any,
}

impl PrimitiveKind {
    /// Lower-case name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::List => "list",
            PrimitiveKind::Map => "map",
            PrimitiveKind::Any => "any",
        }
    }

    /// Whether `value` structurally belongs to this kind.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            PrimitiveKind::String => value.is_string(),
            PrimitiveKind::Number => value.is_number(),
            PrimitiveKind::Boolean => value.is_boolean(),
            PrimitiveKind::List => value.is_array(),
            PrimitiveKind::Map => value.is_object(),
            PrimitiveKind::Any => true,
        }
    }
}

/// Name of the dynamic type of a raw value, for error messages.
pub fn value_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum FieldType {
    /// A scalar or untyped container
    Primitive(PrimitiveKind),
    /// An object described by another schema
    Nested(TypeKey),
    /// A list whose elements are objects described by another schema
    NestedList(TypeKey),
}

impl FieldType {
    /// Structural kind a raw value must have for this field.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            FieldType::Primitive(kind) => *kind,
            FieldType::Nested(_) => PrimitiveKind::Map,
            FieldType::NestedList(_) => PrimitiveKind::List,
        }
    }

    /// Schema the field's object(s) are described by, if any.
    pub fn nested_type(&self) -> Option<&TypeKey> {
        match self {
            FieldType::Primitive(_) => None,
            FieldType::Nested(key) | FieldType::NestedList(key) => Some(key),
        }
    }
}

/// Member of an enum constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// Integral option
    Int(i64),
    /// String option
    Str(String),
}

impl EnumValue {
    /// Whether `value` equals this option.
    ///
    /// Payload numbers are truncated toward zero before the comparison, so an
    /// integral option `1` accepts `1.0` and `1.5` alike.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (EnumValue::Str(option), Value::String(s)) => option == s,
            (EnumValue::Int(option), Value::Number(n)) => match n.as_i64() {
                Some(i) => i == *option,
                None => n.as_f64().is_some_and(|f| f as i64 == *option),
            },
            _ => false,
        }
    }

    /// Convert the option to a raw value.
    pub fn to_value(&self) -> Value {
        match self {
            EnumValue::Int(i) => Value::from(*i),
            EnumValue::Str(s) => Value::String(s.clone()),
        }
    }
}

impl From<&str> for EnumValue {
    fn from(s: &str) -> Self { EnumValue::Str(s.to_string()) }
}

impl From<i64> for EnumValue {
    fn from(i: i64) -> Self { EnumValue::Int(i) }
}

impl std::fmt::Display for EnumValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnumValue::Int(i) => write!(f, "{}", i),
            EnumValue::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Value written into a raw tree when a field is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DefaultValue {
    /// No default
    #[default]
    None,
    /// Boolean default
    Bool(bool),
    /// 32-bit integer default
    Int(i32),
    /// 64-bit integer default
    Long(i64),
    /// Floating point default
    Double(f64),
    /// String default
    String(String),
}

impl DefaultValue {
    /// Whether no default is declared.
    pub fn is_none(&self) -> bool { matches!(self, DefaultValue::None) }

    /// Whether this default can be stored in a field of `kind`.
    pub fn fits(&self, kind: PrimitiveKind) -> bool {
        match self {
            DefaultValue::None => true,
            DefaultValue::Bool(_) => matches!(kind, PrimitiveKind::Boolean | PrimitiveKind::Any),
            DefaultValue::Int(_) | DefaultValue::Long(_) | DefaultValue::Double(_) => {
                matches!(kind, PrimitiveKind::Number | PrimitiveKind::Any)
            }
            DefaultValue::String(_) => matches!(kind, PrimitiveKind::String | PrimitiveKind::Any),
        }
    }

    /// The concretely-typed raw value, or `None` when no default is declared.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            DefaultValue::None => None,
            DefaultValue::Bool(b) => Some(Value::Bool(*b)),
            DefaultValue::Int(i) => Some(Value::from(*i)),
            DefaultValue::Long(l) => Some(Value::from(*l)),
            DefaultValue::Double(d) => Number::from_f64(*d).map(Value::Number),
            DefaultValue::String(s) => Some(Value::String(s.clone())),
        }
    }
}

/// Role of the accessor a field was declared through.
///
/// Only getters take part in validation, defaulting and serialization;
/// setters exist so result models can be written through accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessorRole {
    /// Read accessor
    #[default]
    Getter,
    /// Write accessor
    Setter,
}

/// Description of a single field of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Key the value is stored under in the raw tree
    pub key: String,
    /// Accessor identity; empty means "same as key"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub accessor: String,
    /// Whether the caller must supply the field
    #[serde(default)]
    pub required: bool,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Whether `enum_values` constrains the field
    #[serde(default)]
    pub is_enum: bool,
    /// Allowed values when `is_enum` is set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<EnumValue>,
    /// Default written when the field is absent
    #[serde(default, skip_serializing_if = "DefaultValue::is_none")]
    pub default: DefaultValue,
    /// Accessor role
    #[serde(default)]
    pub role: AccessorRole,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl FieldSpec {
    /// Create an optional getter field of the given type.
    pub fn new(key: impl Into<String>, ty: FieldType) -> Self {
        Self {
            key: key.into(),
            accessor: String::new(),
            required: false,
            ty,
            is_enum: false,
            enum_values: Vec::new(),
            default: DefaultValue::None,
            role: AccessorRole::Getter,
            description: String::new(),
        }
    }

    /// String field.
    pub fn string(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::Primitive(PrimitiveKind::String))
    }

    /// Number field.
    pub fn number(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::Primitive(PrimitiveKind::Number))
    }

    /// Boolean field.
    pub fn boolean(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::Primitive(PrimitiveKind::Boolean))
    }

    /// Untyped list field.
    pub fn list(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::Primitive(PrimitiveKind::List))
    }

    /// Untyped map field.
    pub fn map(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::Primitive(PrimitiveKind::Map))
    }

    /// Field accepting any value.
    pub fn any(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::Primitive(PrimitiveKind::Any))
    }

    /// Nested object field described by `model`.
    pub fn nested(key: impl Into<String>, model: impl Into<TypeKey>) -> Self {
        Self::new(key, FieldType::Nested(model.into()))
    }

    /// List of nested objects described by `model`.
    pub fn nested_list(key: impl Into<String>, model: impl Into<TypeKey>) -> Self {
        Self::new(key, FieldType::NestedList(model.into()))
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declare a default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    /// Constrain the field to the given options.
    pub fn with_enum<I, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<EnumValue>,
    {
        self.is_enum = true;
        self.enum_values = options.into_iter().map(Into::into).collect();
        self
    }

    /// Declare the field through a setter accessor.
    pub fn setter(mut self) -> Self {
        self.role = AccessorRole::Setter;
        self
    }

    /// Override the accessor identity.
    pub fn accessor(mut self, name: impl Into<String>) -> Self {
        self.accessor = name.into();
        self
    }

    /// Attach a description.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Accessor identity, falling back to the key.
    pub fn accessor_name(&self) -> &str {
        if self.accessor.is_empty() {
            &self.key
        } else {
            &self.accessor
        }
    }

    /// Structural kind of the field.
    pub fn kind(&self) -> PrimitiveKind { self.ty.kind() }

    /// Nested schema key, if the field refers to one.
    pub fn nested_type(&self) -> Option<&TypeKey> { self.ty.nested_type() }

    /// Whether the field takes part in validation and serialization.
    pub fn is_getter(&self) -> bool { self.role == AccessorRole::Getter }

    /// Whether `value` is one of the enum options.
    pub fn enum_contains(&self, value: &Value) -> bool {
        self.enum_values.iter().any(|option| option.matches(value))
    }

    /// Check the declared metadata for internal consistency.
    pub fn check(&self, model: &TypeKey) -> Result<(), SchemaError> {
        let malformed = |reason: &str| SchemaError::MalformedField {
            model: model.clone(),
            key: self.key.clone(),
            reason: reason.to_string(),
        };

        if self.key.trim().is_empty() {
            return Err(malformed("field key is empty"));
        }
        if self.required && !self.default.is_none() {
            return Err(malformed("required field declares a default"));
        }
        if !self.default.fits(self.kind()) || self.nested_type().is_some() && !self.default.is_none()
        {
            return Err(malformed(&format!(
                "default {:?} does not fit declared kind {}",
                self.default,
                self.kind().as_str()
            )));
        }
        if let DefaultValue::Double(d) = self.default {
            if !d.is_finite() {
                return Err(malformed("double default is not finite"));
            }
        }

        match (self.is_enum, self.enum_values.is_empty()) {
            (true, true) => return Err(malformed("enum field declares no options")),
            (false, false) => return Err(malformed("enum options declared on a non-enum field")),
            _ => {}
        }
        if self.is_enum {
            let options_fit = match &self.ty {
                FieldType::Primitive(PrimitiveKind::String) => {
                    self.enum_values.iter().all(|v| matches!(v, EnumValue::Str(_)))
                }
                FieldType::Primitive(PrimitiveKind::Number) => {
                    self.enum_values.iter().all(|v| matches!(v, EnumValue::Int(_)))
                }
                FieldType::Primitive(PrimitiveKind::List)
                | FieldType::Primitive(PrimitiveKind::Map)
                | FieldType::Primitive(PrimitiveKind::Any) => true,
                _ => false,
            };
            if !options_fit {
                return Err(malformed(&format!(
                    "enum options do not fit declared kind {}",
                    self.kind().as_str()
                )));
            }
            if let Some(default) = self.default.to_value() {
                if !self.enum_contains(&default) {
                    return Err(malformed("default is not one of the enum options"));
                }
            }
        }

        Ok(())
    }
}
