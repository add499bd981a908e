//! Declaration tables for models and methods.
//!
//! Declarations are the registration-time input from which schemas are
//! derived. They can be built in code or loaded from JSON files.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::field::FieldSpec;
use crate::model::{Schema, TypeKey};

/// Declared fields of one parameter or result model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDecl {
    /// Model name, used as its type key
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl ModelDecl {
    /// Create a model with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), description: String::new(), fields: Vec::new() }
    }

    /// Append a field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Attach a description.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Type key of this model.
    pub fn key(&self) -> TypeKey { TypeKey::new(self.name.clone()) }
}

/// Declaration of one bridge method and every model it uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Method name as called from scripts (e.g. `x.router.open`)
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Parameter model
    pub params: TypeKey,
    /// Result model
    pub result: TypeKey,
    /// Models declared by this method, including nested ones
    #[serde(default)]
    pub models: Vec<ModelDecl>,
}

impl MethodDecl {
    /// Create a method declaration with no models attached.
    pub fn new(name: impl Into<String>, params: impl Into<TypeKey>, result: impl Into<TypeKey>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            params: params.into(),
            result: result.into(),
            models: Vec::new(),
        }
    }

    /// Attach a model declaration.
    pub fn model(mut self, model: ModelDecl) -> Self {
        self.models.push(model);
        self
    }

    /// Attach a description.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Declared model with the given key.
    pub fn find_model(&self, key: &TypeKey) -> Option<&ModelDecl> {
        self.models.iter().find(|m| m.name == key.as_str())
    }

    /// Load a method declaration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let decl: Self = serde_json::from_str(&content)?;
        Ok(decl)
    }

    /// Save the declaration to a JSON file with pretty formatting
    pub fn to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        writeln!(file)?;
        Ok(())
    }
}

/// Report every problem in a method declaration.
///
/// Derivation stops at the first malformed field; this walks the whole
/// declaration so tooling can show all of them at once. An empty vector means
/// the declaration would derive cleanly, assuming every referenced model is
/// declared here.
pub fn check_method_decl(decl: &MethodDecl) -> Vec<String> {
    let mut errors = Vec::new();

    if decl.name.trim().is_empty() {
        errors.push("Method name is empty".to_string());
    }

    let mut seen = HashSet::new();
    for model in &decl.models {
        if !seen.insert(model.name.as_str()) {
            errors.push(format!("Model `{}` is declared more than once", model.name));
        }
    }

    for key in [&decl.params, &decl.result] {
        if decl.find_model(key).is_none() {
            errors.push(format!("Model `{}` referenced by method `{}` is not declared", key, decl.name));
        }
    }

    for model in &decl.models {
        let model_key = model.key();
        for field in &model.fields {
            if let Err(e) = field.check(&model_key) {
                errors.push(e.to_string());
            }
            if let Some(nested) = field.nested_type() {
                if decl.find_model(nested).is_none() {
                    errors.push(format!(
                        "Field `{}` in model `{}` references undeclared model `{}`",
                        field.key, model.name, nested
                    ));
                }
            }
        }
        // Per-field problems are already reported; only surface key clashes here.
        if let Err(e @ SchemaError::DuplicateKey { .. }) = Schema::from_decl(model) {
            errors.push(e.to_string());
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::DefaultValue;

    fn open_method() -> MethodDecl {
        MethodDecl::new("x.router.open", "OpenParams", "OpenResult")
            .model(
                ModelDecl::new("OpenParams")
                    .field(FieldSpec::string("scheme").required())
                    .field(FieldSpec::nested("options", "OpenOptions")),
            )
            .model(
                ModelDecl::new("OpenOptions")
                    .field(FieldSpec::boolean("animated").with_default(DefaultValue::Bool(true))),
            )
            .model(ModelDecl::new("OpenResult"))
    }

    #[test]
    fn clean_declaration_has_no_errors() {
        assert!(check_method_decl(&open_method()).is_empty());
    }

    #[test]
    fn reports_every_problem() {
        let mut decl = open_method();
        decl.models.retain(|m| m.name != "OpenOptions");
        decl.models[0].fields.push(
            FieldSpec::string("title").required().with_default(DefaultValue::String("x".into())),
        );
        decl.result = TypeKey::new("Missing");

        let errors = check_method_decl(&decl);
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors.iter().any(|e| e.contains("`Missing`")));
        assert!(errors.iter().any(|e| e.contains("undeclared model `OpenOptions`")));
        assert!(errors.iter().any(|e| e.contains("title")));
    }
}
