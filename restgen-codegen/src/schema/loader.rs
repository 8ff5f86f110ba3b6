//! Schema file loading (TOML or JSON)

use std::path::Path;

use super::metadata::SchemaRegistry;
use crate::error::Result;

/// Load a schema registry from a file, picking the decoder by extension
pub fn load_schema(path: &Path) -> Result<SchemaRegistry> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        parse_schema_json(&content)
    } else {
        parse_schema_toml(&content)
    }
}

/// Parse a TOML schema document
pub fn parse_schema_toml(content: &str) -> Result<SchemaRegistry> {
    let registry: SchemaRegistry = toml::from_str(content)?;
    registry.check()?;
    Ok(registry)
}

/// Parse a JSON schema document
pub fn parse_schema_json(content: &str) -> Result<SchemaRegistry> {
    let registry: SchemaRegistry = serde_json::from_str(content)?;
    registry.check()?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodegenError, SchemaError};
    use crate::schema::FieldType;
    use std::io::Write;

    const BLOG: &str = r#"
        [[models]]
        name = "User"

        [[models.fields]]
        name = "email"
        type = "Text"

        [[models.fields]]
        name = "password"
        type = "Text"
        confidential = true

        [[models]]
        name = "Post"
        path = "src/blog/models"

        [[models.fields]]
        name = "author"
        type = "Relation"
        relation = { model = "User" }
        owner_verified = true

        [[models.fields]]
        name = "attachments"
        type = "List"
        of = "File"
    "#;

    #[test]
    fn test_parse_toml_schema() {
        let registry = parse_schema_toml(BLOG).unwrap();
        assert_eq!(registry.models().len(), 2);

        let user = registry.model("User").unwrap();
        assert!(user.get_field("password").unwrap().confidential);
        assert!(!user.get_field("email").unwrap().confidential);

        let post = registry.model("Post").unwrap();
        assert_eq!(post.path.as_deref(), Some("src/blog/models"));
        let author = post.get_field("author").unwrap();
        assert_eq!(author.field_type, FieldType::Relation);
        assert_eq!(author.related_model(), Some("User"));
        assert!(author.owner_verified);
        assert!(post
            .get_field("attachments")
            .unwrap()
            .is_list_of(FieldType::File));
    }

    #[test]
    fn test_parse_json_schema() {
        let json = r#"{
            "models": [
                { "name": "Album", "fields": [
                    { "name": "cover", "type": "File" },
                    { "name": "ownerId", "type": "Text", "owner_verified": true }
                ]}
            ]
        }"#;
        let registry = parse_schema_json(json).unwrap();
        let album = registry.model("Album").unwrap();
        assert_eq!(album.fields.len(), 2);
        assert!(album.get_field("ownerId").unwrap().owner_verified);
    }

    #[test]
    fn test_invariant_violation_is_schema_error() {
        let toml = r#"
            [[models]]
            name = "Post"
            [[models.fields]]
            name = "author"
            type = "Relation"
        "#;
        let err = parse_schema_toml(toml).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::Schema(SchemaError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_unknown_field_type_is_parse_error() {
        let toml = r#"
            [[models]]
            name = "Post"
            [[models.fields]]
            name = "title"
            type = "Blob"
        "#;
        assert!(matches!(
            parse_schema_toml(toml),
            Err(CodegenError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_schema_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("models.toml");
        std::fs::File::create(&toml_path)
            .unwrap()
            .write_all(BLOG.as_bytes())
            .unwrap();
        assert_eq!(load_schema(&toml_path).unwrap().models().len(), 2);

        let json_path = dir.path().join("models.json");
        std::fs::write(&json_path, r#"{ "models": [ { "name": "Tag" } ] }"#).unwrap();
        assert!(load_schema(&json_path).unwrap().model("Tag").is_ok());
    }
}
