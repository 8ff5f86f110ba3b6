//! Metadata structures for declared model schemas

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SchemaError;

/// Storage type of a model field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Number,
    Boolean,
    Date,
    Json,
    /// Name of a stored upload
    File,
    /// Reference to another model
    Relation,
    /// Sequence of values of the element type in `FieldMeta::of`
    List,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Boolean => "Boolean",
            FieldType::Date => "Date",
            FieldType::Json => "Json",
            FieldType::File => "File",
            FieldType::Relation => "Relation",
            FieldType::List => "List",
        };
        f.write_str(name)
    }
}

/// Target of a relation field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMeta {
    /// Related model name
    pub model: String,

    /// Directory holding the related model's type declaration, when not the default
    #[serde(default)]
    pub path: Option<String>,
}

/// Metadata for a single model field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Field name as exposed in payloads
    pub name: String,

    /// Field type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Relation target; present iff `field_type` is `Relation`
    #[serde(default)]
    pub relation: Option<RelationMeta>,

    /// Element type; present iff `field_type` is `List`
    #[serde(default)]
    pub of: Option<FieldType>,

    /// Never returned in responses
    #[serde(default)]
    pub confidential: bool,

    /// Must equal the authenticated user's id for non-admin access
    #[serde(default)]
    pub owner_verified: bool,
}

impl FieldMeta {
    /// Check if this field is a `List` whose elements are `item_type`
    pub fn is_list_of(&self, item_type: FieldType) -> bool {
        self.field_type == FieldType::List && self.of == Some(item_type)
    }

    /// Related model name, for relation fields
    pub fn related_model(&self) -> Option<&str> {
        self.relation.as_ref().map(|r| r.model.as_str())
    }

    fn check(&self, model: &str) -> Result<(), SchemaError> {
        let invalid = |reason: &str| SchemaError::InvalidField {
            model: model.to_string(),
            field: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("field name must not be empty"));
        }
        match (self.field_type, &self.relation) {
            (FieldType::Relation, None) => {
                return Err(invalid("relation fields must declare `relation`"))
            }
            (FieldType::Relation, Some(_)) => {}
            (_, Some(_)) => return Err(invalid("only relation fields may declare `relation`")),
            (_, None) => {}
        }
        match (self.field_type, self.of) {
            (FieldType::List, None) => return Err(invalid("list fields must declare `of`")),
            (FieldType::List, Some(FieldType::List | FieldType::Relation)) => {
                return Err(invalid("list elements must be scalar or File"))
            }
            (FieldType::List, Some(_)) => {}
            (_, Some(_)) => return Err(invalid("only list fields may declare `of`")),
            (_, None) => {}
        }
        Ok(())
    }
}

/// A declared model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Model (type) name, e.g. `User`
    pub name: String,

    /// Directory holding this model's type declaration, when not the default
    #[serde(default)]
    pub path: Option<String>,

    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldMeta>,
}

impl ModelSchema {
    /// Get a field by name
    pub fn get_field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Read-only set of all declared models, loaded once per generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    #[serde(default)]
    models: Vec<ModelSchema>,
}

impl SchemaRegistry {
    /// Build a registry, checking field invariants and name uniqueness
    pub fn new(models: Vec<ModelSchema>) -> Result<Self, SchemaError> {
        let registry = Self { models };
        registry.check()?;
        Ok(registry)
    }

    /// Look up a model by name
    pub fn model(&self, name: &str) -> Result<&ModelSchema, SchemaError> {
        self.models
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| SchemaError::UnknownModel(name.to_string()))
    }

    /// All models in declaration order
    pub fn models(&self) -> &[ModelSchema] {
        &self.models
    }

    pub(crate) fn check(&self) -> Result<(), SchemaError> {
        for (i, model) in self.models.iter().enumerate() {
            if self.models[..i].iter().any(|m| m.name == model.name) {
                return Err(SchemaError::DuplicateModel(model.name.clone()));
            }
            for (j, field) in model.fields.iter().enumerate() {
                if model.fields[..j].iter().any(|f| f.name == field.name) {
                    return Err(SchemaError::DuplicateField {
                        model: model.name.clone(),
                        field: field.name.clone(),
                    });
                }
                field.check(&model.name)?;
            }
        }
        Ok(())
    }
}

/// Ordered view of a subset of a model's fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFieldSet<'a> {
    fields: Vec<&'a FieldMeta>,
}

impl<'a> ModelFieldSet<'a> {
    pub(crate) fn from_fields(fields: Vec<&'a FieldMeta>) -> Option<Self> {
        if fields.is_empty() {
            None
        } else {
            Some(Self { fields })
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

/// Security metadata derived from a model's fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityProfile {
    /// Fields removed from every response, in declaration order
    pub confidential_fields: Vec<String>,

    /// Fields that must equal the authenticated user's id, in declaration order
    pub owner_verified_fields: Vec<String>,
}

impl SecurityProfile {
    pub fn requires_owner(&self) -> bool {
        !self.owner_verified_fields.is_empty()
    }

    pub fn has_confidential(&self) -> bool {
        !self.confidential_fields.is_empty()
    }
}

/// One hop of a relation path, e.g. `author -> User`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationHop {
    /// Relation field on the previous model
    pub field: String,
    /// Model the field points to
    pub model: String,
    /// Type declaration directory override of the target model
    pub path: Option<String>,
}

/// Confidential fields of a model embedded through a relation path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRedaction {
    /// Path from the root model, outermost hop first
    pub path: Vec<RelationHop>,
    /// Confidential fields of the last hop's model
    pub fields: Vec<String>,
}

impl RelationRedaction {
    /// Model the redacted fields belong to
    pub fn target(&self) -> Option<&RelationHop> {
        self.path.last()
    }

    /// Dotted field path, e.g. `author.company`
    pub fn dotted(&self) -> String {
        self.path
            .iter()
            .map(|h| h.field.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}
