//! Field and security lookups over a schema registry

use tracing::debug;

use super::metadata::{
    FieldMeta, FieldType, ModelFieldSet, ModelSchema, RelationHop, RelationRedaction,
    SchemaRegistry, SecurityProfile,
};
use crate::error::SchemaError;

/// Pure lookups over a loaded schema; every query fails on unknown models
#[derive(Debug, Clone, Copy)]
pub struct SchemaInspector<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> SchemaInspector<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn model(&self, model: &str) -> Result<&'a ModelSchema, SchemaError> {
        self.registry.model(model)
    }

    /// Fields of exactly `field_type`, or `None` when the model has none
    pub fn fields_by_type(
        &self,
        model: &str,
        field_type: FieldType,
    ) -> Result<Option<ModelFieldSet<'a>>, SchemaError> {
        let schema = self.model(model)?;
        Ok(ModelFieldSet::from_fields(
            schema
                .fields
                .iter()
                .filter(|f| f.field_type == field_type)
                .collect(),
        ))
    }

    /// `List` fields whose elements are `item_type`, or `None`
    pub fn list_fields_of(
        &self,
        model: &str,
        item_type: FieldType,
    ) -> Result<Option<ModelFieldSet<'a>>, SchemaError> {
        let schema = self.model(model)?;
        Ok(ModelFieldSet::from_fields(
            schema
                .fields
                .iter()
                .filter(|f| f.is_list_of(item_type))
                .collect(),
        ))
    }

    pub fn field_meta(&self, model: &str, field: &str) -> Result<&'a FieldMeta, SchemaError> {
        self.model(model)?
            .get_field(field)
            .ok_or_else(|| SchemaError::UnknownField {
                model: model.to_string(),
                field: field.to_string(),
            })
    }

    pub fn confidential_fields(&self, model: &str) -> Result<Vec<String>, SchemaError> {
        Ok(self
            .model(model)?
            .fields
            .iter()
            .filter(|f| f.confidential)
            .map(|f| f.name.clone())
            .collect())
    }

    pub fn owner_verified_fields(&self, model: &str) -> Result<Vec<String>, SchemaError> {
        Ok(self
            .model(model)?
            .fields
            .iter()
            .filter(|f| f.owner_verified)
            .map(|f| f.name.clone())
            .collect())
    }

    pub fn security_profile(&self, model: &str) -> Result<SecurityProfile, SchemaError> {
        Ok(SecurityProfile {
            confidential_fields: self.confidential_fields(model)?,
            owner_verified_fields: self.owner_verified_fields(model)?,
        })
    }

    /// Confidential fields reachable through relation fields, up to `max_depth` hops.
    ///
    /// A relation that re-enters a model already on the current path is still
    /// redacted at that hop but not followed further, so cyclic schemas terminate.
    pub fn relation_redactions(
        &self,
        model: &str,
        max_depth: usize,
    ) -> Result<Vec<RelationRedaction>, SchemaError> {
        let root = self.model(model)?;
        let mut out = Vec::new();
        let mut stack = vec![root.name.clone()];
        let mut prefix = Vec::new();
        self.walk_relations(root, max_depth, &mut stack, &mut prefix, &mut out)?;
        Ok(out)
    }

    fn walk_relations(
        &self,
        model: &ModelSchema,
        max_depth: usize,
        stack: &mut Vec<String>,
        prefix: &mut Vec<RelationHop>,
        out: &mut Vec<RelationRedaction>,
    ) -> Result<(), SchemaError> {
        for field in model.fields.iter().filter(|f| f.field_type == FieldType::Relation) {
            let Some(relation) = &field.relation else {
                continue;
            };
            let target = self.model(&relation.model)?;

            prefix.push(RelationHop {
                field: field.name.clone(),
                model: target.name.clone(),
                path: relation.path.clone().or_else(|| target.path.clone()),
            });

            let fields = self.confidential_fields(&target.name)?;
            if !fields.is_empty() {
                out.push(RelationRedaction {
                    path: prefix.clone(),
                    fields,
                });
            }

            let revisit = stack.contains(&target.name);
            if revisit {
                debug!(
                    "Not following cyclic relation {}.{} -> {}",
                    model.name, field.name, target.name
                );
            } else if prefix.len() < max_depth {
                stack.push(target.name.clone());
                self.walk_relations(target, max_depth, stack, prefix, out)?;
                stack.pop();
            }

            prefix.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema_toml;

    const SCHEMA: &str = r#"
        [[models]]
        name = "Company"
        [[models.fields]]
        name = "taxId"
        type = "Text"
        confidential = true
        [[models.fields]]
        name = "parent"
        type = "Relation"
        relation = { model = "Company" }

        [[models]]
        name = "User"
        [[models.fields]]
        name = "password"
        type = "Text"
        confidential = true
        [[models.fields]]
        name = "company"
        type = "Relation"
        relation = { model = "Company", path = "src/org/models" }
        [[models.fields]]
        name = "avatar"
        type = "File"

        [[models]]
        name = "Post"
        [[models.fields]]
        name = "userId"
        type = "Text"
        owner_verified = true
        [[models.fields]]
        name = "author"
        type = "Relation"
        relation = { model = "User" }
        owner_verified = true
        [[models.fields]]
        name = "secret"
        type = "Text"
        confidential = true
        [[models.fields]]
        name = "cover"
        type = "File"
        [[models.fields]]
        name = "banner"
        type = "File"
        [[models.fields]]
        name = "attachments"
        type = "List"
        of = "File"

        [[models]]
        name = "Tag"
        [[models.fields]]
        name = "label"
        type = "Text"
    "#;

    fn registry() -> SchemaRegistry {
        parse_schema_toml(SCHEMA).unwrap()
    }

    #[test]
    fn test_fields_by_type() {
        let registry = registry();
        let inspector = SchemaInspector::new(&registry);

        let files = inspector.fields_by_type("Post", FieldType::File).unwrap().unwrap();
        assert_eq!(files.names(), vec!["cover", "banner"]);

        assert!(inspector
            .fields_by_type("Tag", FieldType::File)
            .unwrap()
            .is_none());

        let lists = inspector.list_fields_of("Post", FieldType::File).unwrap().unwrap();
        assert_eq!(lists.names(), vec!["attachments"]);
    }

    #[test]
    fn test_unknown_model_and_field() {
        let registry = registry();
        let inspector = SchemaInspector::new(&registry);

        assert_eq!(
            inspector.confidential_fields("Ghost"),
            Err(SchemaError::UnknownModel("Ghost".to_string()))
        );
        assert!(matches!(
            inspector.field_meta("Post", "nope"),
            Err(SchemaError::UnknownField { .. })
        ));
        assert_eq!(
            inspector.field_meta("Post", "author").unwrap().related_model(),
            Some("User")
        );
    }

    #[test]
    fn test_security_profile_keeps_declaration_order() {
        let registry = registry();
        let inspector = SchemaInspector::new(&registry);

        let profile = inspector.security_profile("Post").unwrap();
        assert_eq!(profile.owner_verified_fields, vec!["userId", "author"]);
        assert_eq!(profile.confidential_fields, vec!["secret"]);
        assert!(profile.requires_owner());

        let tag = inspector.security_profile("Tag").unwrap();
        assert!(!tag.requires_owner());
        assert!(!tag.has_confidential());
    }

    #[test]
    fn test_relation_redactions_follow_nested_relations() {
        let registry = registry();
        let inspector = SchemaInspector::new(&registry);

        let redactions = inspector.relation_redactions("Post", 4).unwrap();
        let dotted: Vec<String> = redactions.iter().map(|r| r.dotted()).collect();
        assert_eq!(
            dotted,
            vec!["author", "author.company", "author.company.parent"]
        );
        assert_eq!(redactions[0].fields, vec!["password"]);
        assert_eq!(redactions[1].fields, vec!["taxId"]);

        // relation-level path override wins over the target model's own path
        let company = redactions[1].target().unwrap();
        assert_eq!(company.model, "Company");
        assert_eq!(company.path.as_deref(), Some("src/org/models"));
    }

    #[test]
    fn test_relation_redactions_respect_depth() {
        let registry = registry();
        let inspector = SchemaInspector::new(&registry);

        let redactions = inspector.relation_redactions("Post", 1).unwrap();
        assert_eq!(redactions.len(), 1);
        assert_eq!(redactions[0].dotted(), "author");
    }

    #[test]
    fn test_self_relation_terminates() {
        let registry = registry();
        let inspector = SchemaInspector::new(&registry);

        // Company.parent -> Company is redacted once, then not followed
        let redactions = inspector.relation_redactions("Company", 16).unwrap();
        assert_eq!(redactions.len(), 1);
        assert_eq!(redactions[0].dotted(), "parent");
        assert_eq!(redactions[0].fields, vec!["taxId"]);
    }

    #[test]
    fn test_dangling_relation_is_schema_error() {
        let registry = parse_schema_toml(
            r#"
            [[models]]
            name = "Post"
            [[models.fields]]
            name = "author"
            type = "Relation"
            relation = { model = "Ghost" }
        "#,
        )
        .unwrap();
        let inspector = SchemaInspector::new(&registry);
        assert_eq!(
            inspector.relation_redactions("Post", 4),
            Err(SchemaError::UnknownModel("Ghost".to_string()))
        );
    }
}
