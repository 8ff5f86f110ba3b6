//! Error types for restgen-codegen

use thiserror::Error;

/// Result type alias for restgen-codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed to parse model schema: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Unknown or malformed references in the model schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown model `{0}`")]
    UnknownModel(String),

    #[error("unknown field `{field}` on model `{model}`")]
    UnknownField { model: String, field: String },

    #[error("invalid field `{model}.{field}`: {reason}")]
    InvalidField {
        model: String,
        field: String,
        reason: String,
    },

    #[error("model `{0}` is declared more than once")]
    DuplicateModel(String),

    #[error("field `{field}` is declared more than once on model `{model}`")]
    DuplicateField { model: String, field: String },
}

impl From<toml::de::Error> for CodegenError {
    fn from(err: toml::de::Error) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}

impl From<serde_json::Error> for CodegenError {
    fn from(err: serde_json::Error) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}
