//! restgen-codegen: Generate access-controlled REST controllers from model schemas
//!
//! This crate provides both a CLI tool and a library for generating TypeScript
//! controller sources from a declarative model schema (TOML or JSON). For each
//! controller it derives:
//!
//! - The canonical route table (count, detail, list, create, update, delete and,
//!   for models with File fields, upload), each bound to an ACL action
//! - Handler bodies enforcing ownership of owner-verified fields, redacting
//!   confidential fields (also inside related records) and managing stored files
//! - A registration of the controller in the per-version registry file
//!
//! # Usage in build.rs
//!
//! ```rust,ignore
//! fn main() {
//!     restgen_codegen::CodegenBuilder::new("schema.toml")
//!         .controller("profile", "User")
//!         .route("account")
//!         .output_dir("src/controllers")
//!         .generate()
//!         .expect("Failed to generate controller");
//!
//!     println!("cargo:rerun-if-changed=schema.toml");
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! restgen --schema schema.toml controller profile --model User --route account
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod schema;

use std::path::Path;

use tracing::info;

pub use codegen::{CodeGenerator, GeneratedController, PatchOutcome};
pub use config::{CodegenConfig, ControllerRequest};
pub use error::{CodegenError, Result};

/// Main entry point for code generation
///
/// Arguments are checked before anything is read or written; a rejected request
/// leaves the filesystem untouched.
pub fn generate(config: &CodegenConfig, request: &ControllerRequest) -> Result<GeneratedController> {
    request.validate(&config.api_version)?;
    config.validate()?;

    info!("Loading schema: {:?}", config.schema_file);
    let registry = schema::load_schema(&config.schema_file)?;
    info!("Found {} models", registry.models().len());

    CodeGenerator::new(config, &registry).generate(request)
}

/// Builder pattern for easy configuration in build.rs
pub struct CodegenBuilder {
    config: CodegenConfig,
    request: ControllerRequest,
}

impl CodegenBuilder {
    /// Create a new builder with the given schema file
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            config: CodegenConfig::default_with_schema(schema_file.as_ref().to_path_buf()),
            request: ControllerRequest::new("", ""),
        }
    }

    /// Controller to generate and the model it serves
    pub fn controller(mut self, name: &str, model: &str) -> Self {
        self.request.name = name.to_string();
        self.request.model = model.to_string();
        self
    }

    /// Route base the controller is mounted under
    pub fn route(mut self, route: &str) -> Self {
        self.request.route = route.to_string();
        self
    }

    /// API version, overriding the configured default
    pub fn version(mut self, version: &str) -> Self {
        self.request.version = Some(version.to_string());
        self
    }

    /// Set the root output directory for controllers
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the directory model declarations are imported from
    pub fn models_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.models_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the directory core helpers are imported from
    pub fn core_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.core_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Patch this registry file instead of `<output_dir>/<version>/index.ts`
    pub fn registry_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config.registry_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Formatter command run on the written controller
    pub fn formatter(mut self, command: &str) -> Self {
        self.config.formatter = Some(command.to_string());
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    /// Generate the controller
    pub fn generate(self) -> Result<GeneratedController> {
        generate(&self.config, &self.request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SCHEMA: &str = r#"
[[models]]
name = "User"

[[models.fields]]
name = "email"
type = "Text"
"#;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("schema.toml"), SCHEMA).unwrap();
        dir
    }

    fn file_count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_invalid_name_writes_nothing() {
        let dir = setup();
        let result = CodegenBuilder::new(dir.path().join("schema.toml"))
            .controller("profile2", "User")
            .output_dir(dir.path().join("controllers"))
            .generate();

        assert!(matches!(result, Err(CodegenError::ConfigError(_))));
        assert!(!dir.path().join("controllers").exists());
        assert_eq!(file_count(dir.path()), 1);
    }

    #[test]
    fn test_literal_true_model_is_rejected() {
        let dir = setup();
        let result = CodegenBuilder::new(dir.path().join("schema.toml"))
            .controller("profile", "true")
            .output_dir(dir.path().join("controllers"))
            .generate();

        match result {
            Err(CodegenError::ConfigError(msg)) => assert!(msg.contains("--model")),
            other => panic!("expected config error, got {:?}", other.map(|g| g.written)),
        }
        assert_eq!(file_count(dir.path()), 1);
    }

    #[test]
    fn test_unknown_model_writes_nothing() {
        let dir = setup();
        let result = CodegenBuilder::new(dir.path().join("schema.toml"))
            .controller("profile", "Ghost")
            .output_dir(dir.path().join("controllers"))
            .generate();

        assert!(matches!(result, Err(CodegenError::Schema(_))));
        assert!(!dir.path().join("controllers").exists());
    }

    #[test]
    fn test_dry_run_returns_source_only() {
        let dir = setup();
        let generated = CodegenBuilder::new(dir.path().join("schema.toml"))
            .controller("profile", "User")
            .output_dir(dir.path().join("controllers"))
            .dry_run()
            .generate()
            .unwrap();

        assert!(!generated.written);
        assert!(generated.registry.is_none());
        assert!(generated.emitted.source.contains("export class ProfileController"));
        assert!(!dir.path().join("controllers").exists());
    }

    #[test]
    fn test_generate_writes_controller_and_registry() {
        let dir = setup();
        let generated = CodegenBuilder::new(dir.path().join("schema.toml"))
            .controller("profile", "User")
            .route("account")
            .output_dir(dir.path().join("controllers"))
            .generate()
            .unwrap();

        assert!(generated.written);
        assert_eq!(generated.registry, Some(PatchOutcome::Created));
        let controller = dir.path().join("controllers/v1/profile.controller.ts");
        assert_eq!(fs::read_to_string(controller).unwrap(), generated.emitted.source);

        let registry = fs::read_to_string(dir.path().join("controllers/v1/index.ts")).unwrap();
        assert!(registry.contains("import { ProfileController } from './profile.controller';"));
        assert!(registry.contains("profile: new ProfileController(),"));
    }
}
