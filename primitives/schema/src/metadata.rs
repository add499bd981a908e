//! Generator metadata loader.
//!
//! The client stub generator writes one JSON file per method describing its
//! request and response types. This module reads those files and turns them
//! into [`MethodDecl`]s, so schemas for generated methods do not have to be
//! written by hand.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decl::{MethodDecl, ModelDecl};
use crate::error::{Result, SchemaError};
use crate::field::{DefaultValue, EnumValue, FieldSpec, FieldType, PrimitiveKind};
use crate::model::TypeKey;

/// One method entry as written by the stub generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodMetadata {
    /// Method name (e.g. `router.open`)
    pub name: String,
    /// Method description
    #[serde(default)]
    pub description: Option<String>,
    /// Module the method belongs to
    #[serde(default)]
    pub module_name: Option<String>,
    /// Package of the generated sources
    #[serde(default)]
    pub package_name: Option<String>,
    /// Declaration file the method was read from
    #[serde(default)]
    pub source: Option<String>,
    /// Request type; absent means "no parameters"
    #[serde(default)]
    pub request: Option<TypeSummary>,
    /// Response type; absent means "no data"
    #[serde(default)]
    pub response: Option<TypeSummary>,
    /// Named object types referenced from request and response
    #[serde(default)]
    pub interfaces: BTreeMap<String, ObjectDefinition>,
    /// Generation timestamp
    #[serde(default)]
    pub generated_at: Option<String>,
}

/// Primitive names used by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveName {
    /// string
    String,
    /// number
    Number,
    /// boolean
    Boolean,
    /// void
    Void,
    /// object
    Object,
    /// any
    Any,
}

/// Structural type description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeSummary {
    /// Scalar or untyped object
    Primitive {
        /// Primitive name
        name: PrimitiveName,
        /// Source text of the type
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        /// Literal union members, when the type is an enum
        #[serde(default, rename = "enumValues", skip_serializing_if = "Option::is_none")]
        enum_values: Option<Vec<Value>>,
    },
    /// Homogeneous array
    Array {
        /// Element type
        #[serde(rename = "elementType")]
        element_type: Box<TypeSummary>,
    },
    /// Named interface
    Reference {
        /// Interface name
        name: String,
    },
    /// Inline object literal
    Object {
        /// Object fields
        fields: Vec<FieldSummary>,
    },
}

/// Default value as written by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultSummary {
    /// `string`, `number` or `boolean`
    pub kind: String,
    /// Literal value
    pub value: Value,
}

/// One field of an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    /// Field name
    pub name: String,
    /// Whether the field may be omitted
    #[serde(default)]
    pub optional: bool,
    /// Field description
    #[serde(default)]
    pub description: Option<String>,
    /// Declared default
    #[serde(default)]
    pub default_value: Option<DefaultSummary>,
    /// Field type
    #[serde(rename = "type")]
    pub ty: TypeSummary,
}

/// Named object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    /// Interface name
    #[serde(default)]
    pub name: Option<String>,
    /// Interface description
    #[serde(default)]
    pub description: Option<String>,
    /// Interface fields
    #[serde(default)]
    pub fields: Vec<FieldSummary>,
}

/// Read a generator metadata file and convert it into a method declaration.
pub fn load_method_metadata(path: &Path) -> Result<MethodDecl> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

/// Parse generator metadata from a JSON string and convert it.
pub fn from_json_str(json: &str) -> Result<MethodDecl> {
    let metadata: MethodMetadata = serde_json::from_str(json)?;
    metadata.into_decl()
}

impl MethodMetadata {
    /// Convert into a method declaration.
    ///
    /// Inline objects become models named after the method and the field path
    /// leading to them. A missing or `void` request/response becomes an empty
    /// model.
    pub fn into_decl(self) -> Result<MethodDecl> {
        let pascal = to_pascal_case(&self.name);
        let mut builder = DeclBuilder { interfaces: &self.interfaces, models: BTreeMap::new() };

        let params = builder.top_level(self.request.as_ref(), format!("{}Request", pascal))?;
        let result = builder.top_level(self.response.as_ref(), format!("{}Response", pascal))?;

        let mut decl = MethodDecl::new(self.name.clone(), params, result);
        decl.description = self.description.clone().unwrap_or_default();
        decl.models = builder.models.into_values().collect();
        Ok(decl)
    }
}

struct DeclBuilder<'a> {
    interfaces: &'a BTreeMap<String, ObjectDefinition>,
    models: BTreeMap<String, ModelDecl>,
}

impl DeclBuilder<'_> {
    fn top_level(&mut self, summary: Option<&TypeSummary>, fallback: String) -> Result<TypeKey> {
        match summary {
            Some(TypeSummary::Reference { name }) => self.reference(name),
            Some(TypeSummary::Object { fields }) => self.object(&fallback, "", fields),
            _ => {
                self.models.entry(fallback.clone()).or_insert_with(|| ModelDecl::new(fallback.clone()));
                Ok(TypeKey::new(fallback))
            }
        }
    }

    fn reference(&mut self, name: &str) -> Result<TypeKey> {
        if self.models.contains_key(name) {
            return Ok(TypeKey::new(name));
        }
        let definition = self
            .interfaces
            .get(name)
            .ok_or_else(|| SchemaError::UnknownModel(TypeKey::new(name)))?;
        // Reserve the name first so self-referencing interfaces terminate.
        self.models.insert(name.to_string(), ModelDecl::new(name));
        let description = definition.description.clone().unwrap_or_default();
        let fields = self.fields(name, &definition.fields)?;
        self.models.insert(name.to_string(), ModelDecl { name: name.to_string(), description, fields });
        Ok(TypeKey::new(name))
    }

    fn object(&mut self, name: &str, description: &str, fields: &[FieldSummary]) -> Result<TypeKey> {
        self.models.insert(name.to_string(), ModelDecl::new(name));
        let fields = self.fields(name, fields)?;
        self.models.insert(
            name.to_string(),
            ModelDecl { name: name.to_string(), description: description.to_string(), fields },
        );
        Ok(TypeKey::new(name))
    }

    fn fields(&mut self, model: &str, summaries: &[FieldSummary]) -> Result<Vec<FieldSpec>> {
        summaries.iter().map(|summary| self.field(model, summary)).collect()
    }

    fn field(&mut self, model: &str, summary: &FieldSummary) -> Result<FieldSpec> {
        let inline_name = format!("{}{}", model, to_pascal_case(&summary.name));
        let ty = match &summary.ty {
            TypeSummary::Primitive { name, .. } => FieldType::Primitive(primitive_kind(*name)),
            TypeSummary::Reference { name } => FieldType::Nested(self.reference(name)?),
            TypeSummary::Object { fields } => FieldType::Nested(self.object(&inline_name, "", fields)?),
            TypeSummary::Array { element_type } => match element_type.as_ref() {
                TypeSummary::Reference { name } => FieldType::NestedList(self.reference(name)?),
                TypeSummary::Object { fields } => {
                    FieldType::NestedList(self.object(&format!("{}Item", inline_name), "", fields)?)
                }
                _ => FieldType::Primitive(PrimitiveKind::List),
            },
        };

        let mut field = FieldSpec::new(summary.name.clone(), ty);
        field.description = summary.description.clone().unwrap_or_default();
        field.default = match &summary.default_value {
            Some(default) => convert_default(model, &summary.name, default)?,
            None => DefaultValue::None,
        };
        field.required = !summary.optional && field.default.is_none();

        if let TypeSummary::Primitive { enum_values: Some(values), .. } = &summary.ty {
            let options = convert_enum(model, &summary.name, values)?;
            if !options.is_empty() {
                field.is_enum = true;
                field.enum_values = options;
            }
        }

        Ok(field)
    }
}

fn primitive_kind(name: PrimitiveName) -> PrimitiveKind {
    match name {
        PrimitiveName::String => PrimitiveKind::String,
        PrimitiveName::Number => PrimitiveKind::Number,
        PrimitiveName::Boolean => PrimitiveKind::Boolean,
        PrimitiveName::Object => PrimitiveKind::Map,
        PrimitiveName::Void | PrimitiveName::Any => PrimitiveKind::Any,
    }
}

fn malformed(model: &str, key: &str, reason: String) -> SchemaError {
    SchemaError::MalformedField { model: TypeKey::new(model), key: key.to_string(), reason }
}

fn convert_default(model: &str, key: &str, default: &DefaultSummary) -> Result<DefaultValue> {
    let converted = match (default.kind.as_str(), &default.value) {
        ("string", Value::String(s)) => Some(DefaultValue::String(s.clone())),
        ("boolean", Value::Bool(b)) => Some(DefaultValue::Bool(*b)),
        ("number", Value::Number(n)) => match n.as_i64() {
            Some(i) => Some(match i32::try_from(i) {
                Ok(small) => DefaultValue::Int(small),
                Err(_) => DefaultValue::Long(i),
            }),
            None => n.as_f64().map(DefaultValue::Double),
        },
        _ => None,
    };
    converted.ok_or_else(|| {
        malformed(model, key, format!("unsupported default {} of kind {}", default.value, default.kind))
    })
}

// Boolean literal unions have no enum representation and are left unconstrained.
fn convert_enum(model: &str, key: &str, values: &[Value]) -> Result<Vec<EnumValue>> {
    let mut options = Vec::new();
    for value in values {
        match value {
            Value::String(s) => options.push(EnumValue::Str(s.clone())),
            Value::Number(n) => match n.as_i64() {
                Some(i) => options.push(EnumValue::Int(i)),
                None => {
                    return Err(malformed(model, key, format!("non-integral enum option {}", n)));
                }
            },
            _ => {}
        }
    }
    Ok(options)
}

/// Convert a dotted or separated name into PascalCase (`router.open` → `RouterOpen`).
pub fn to_pascal_case(value: &str) -> String {
    let mut spaced = String::with_capacity(value.len() + 4);
    let mut prev: Option<char> = None;
    for c in value.chars() {
        if c.is_ascii_uppercase() && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
            spaced.push(' ');
        }
        spaced.push(c);
        prev = Some(c);
    }

    let pascal: String = spaced
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let lower = part.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if pascal.is_empty() {
        "Method".to_string()
    } else {
        pascal
    }
}
