//! Configuration settings for restgen-codegen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults;
use crate::error::{CodegenError, Result};

/// Main configuration struct for code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Path to the model schema file (TOML or JSON)
    #[serde(default)]
    pub schema_file: PathBuf,

    /// API version used when the invocation does not name one
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Root directory for generated controllers; each version gets a subdirectory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory holding model type declarations
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Directory holding the controller runtime (base controller, acl, errors, files)
    #[serde(default = "default_core_dir")]
    pub core_dir: PathBuf,

    /// Registry file to patch. Defaults to `<output_dir>/<version>/index.ts`
    #[serde(default)]
    pub registry_file: Option<PathBuf>,

    /// Marker line before which controller imports are inserted
    #[serde(default = "default_import_marker")]
    pub import_marker: String,

    /// Marker line before which controller bindings are inserted
    #[serde(default = "default_binding_marker")]
    pub binding_marker: String,

    /// Maximum relation hops followed for nested redaction
    #[serde(default = "default_max_relation_depth")]
    pub max_relation_depth: usize,

    /// Formatter command run on each written file (e.g. "prettier --write")
    #[serde(default)]
    pub formatter: Option<String>,

    /// Dry run mode - preview without writing files
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_api_version() -> String {
    defaults::API_VERSION.to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_DIR)
}
fn default_models_dir() -> PathBuf {
    PathBuf::from(defaults::MODELS_DIR)
}
fn default_core_dir() -> PathBuf {
    PathBuf::from(defaults::CORE_DIR)
}
fn default_import_marker() -> String {
    defaults::IMPORT_MARKER.to_string()
}
fn default_binding_marker() -> String {
    defaults::BINDING_MARKER.to_string()
}
fn default_max_relation_depth() -> usize {
    defaults::MAX_RELATION_DEPTH
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            api_version: default_api_version(),
            output_dir: default_output_dir(),
            models_dir: default_models_dir(),
            core_dir: default_core_dir(),
            registry_file: None,
            import_marker: default_import_marker(),
            binding_marker: default_binding_marker(),
            max_relation_depth: default_max_relation_depth(),
            formatter: None,
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl CodegenConfig {
    /// Create a default config with the given schema file
    pub fn default_with_schema(schema_file: PathBuf) -> Self {
        Self {
            schema_file,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodegenConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            builder = builder.add_source(File::with_name("restgen").required(false));
        }

        // Override with environment variables (RESTGEN_OUTPUT_DIR, RESTGEN_DRY_RUN, ...)
        builder = builder.add_source(
            Environment::with_prefix("RESTGEN")
                .prefix_separator("_")
                .separator("__"),
        );

        let config: CodegenConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Directory receiving the controllers of one API version
    pub fn controllers_dir(&self, version: &str) -> PathBuf {
        self.output_dir.join(version)
    }

    /// Registry file patched after generating a controller of the given version
    pub fn registry_path(&self, version: &str) -> PathBuf {
        match &self.registry_file {
            Some(path) => path.clone(),
            None => self
                .controllers_dir(version)
                .join(defaults::REGISTRY_FILE_NAME),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.schema_file.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError(
                "schema_file is required".into(),
            ));
        }

        if !self.schema_file.exists() {
            return Err(CodegenError::ValidationError(format!(
                "Schema file not found: {}",
                self.schema_file.display()
            )));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError(
                "output_dir must not be empty".into(),
            ));
        }

        if self.import_marker.trim().is_empty() || self.binding_marker.trim().is_empty() {
            return Err(CodegenError::ValidationError(
                "registry markers must not be empty".into(),
            ));
        }

        if self.import_marker.trim() == self.binding_marker.trim() {
            return Err(CodegenError::ValidationError(
                "import_marker and binding_marker must differ".into(),
            ));
        }

        if self.max_relation_depth == 0 {
            return Err(CodegenError::ValidationError(
                "max_relation_depth must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodegenConfig::default();
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.max_relation_depth, 4);
        assert!(!config.dry_run);
        assert!(config.log_level.is_none());
        assert!(config.registry_file.is_none());
    }

    #[test]
    fn test_validation_missing_schema() {
        let config = CodegenConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_same_markers() {
        let schema = tempfile::NamedTempFile::new().unwrap();
        let mut config = CodegenConfig::default_with_schema(schema.path().to_path_buf());
        assert!(config.validate().is_ok());

        config.binding_marker = config.import_marker.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_registry_path_defaults_to_versioned_index() {
        let config = CodegenConfig {
            output_dir: PathBuf::from("src/controllers"),
            ..Default::default()
        };
        assert_eq!(
            config.registry_path("v2"),
            PathBuf::from("src/controllers/v2/index.ts")
        );

        let config = CodegenConfig {
            registry_file: Some(PathBuf::from("src/app/controllers.ts")),
            ..Default::default()
        };
        assert_eq!(
            config.registry_path("v2"),
            PathBuf::from("src/app/controllers.ts")
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("restgen.toml");
        std::fs::write(
            &path,
            r#"
                schema_file = "models.toml"
                api_version = "v2"
                output_dir = "api/controllers"
                max_relation_depth = 2
            "#,
        )
        .unwrap();

        let config = CodegenConfig::from_file(&path).unwrap();
        assert_eq!(config.schema_file, PathBuf::from("models.toml"));
        assert_eq!(config.api_version, "v2");
        assert_eq!(config.max_relation_depth, 2);
        assert_eq!(
            config.registry_path("v2"),
            PathBuf::from("api/controllers/v2/index.ts")
        );
        // unset keys keep their defaults
        assert_eq!(config.import_marker, "// restgen:imports");
    }

    #[test]
    fn test_from_file_rejects_malformed_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("restgen.toml");
        std::fs::write(&path, "max_relation_depth = \"deep\"").unwrap();

        match CodegenConfig::from_file(&path) {
            Err(CodegenError::ConfigError(msg)) => assert!(msg.contains("restgen.toml")),
            other => panic!("expected config error, got {:?}", other.map(|c| c.api_version)),
        }
        assert!(matches!(
            CodegenConfig::from_file(&dir.path().join("missing.toml")),
            Err(CodegenError::IoError(_))
        ));
    }

    #[test]
    fn test_config_with_log_level() {
        let toml_content = r#"
            schema_file = "models.toml"
            log_level = "debug"
            formatter = "prettier --write"
        "#;
        let config: CodegenConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.log_level, Some("debug".to_string()));
        assert_eq!(config.formatter.as_deref(), Some("prettier --write"));
        assert_eq!(config.output_dir, PathBuf::from("./src/controllers"));
    }
}
