//! Main code generator orchestrator

use tracing::info;

use super::controller_generator::{assemble_controller, write_controller, EmittedController};
use super::fs_util::relative_import;
use super::naming::to_binding_name;
use super::registry_patcher::{patch_registry, PatchOutcome, RegistryEntry};
use crate::config::{CodegenConfig, ControllerRequest};
use crate::error::Result;
use crate::schema::SchemaRegistry;

/// Result of one generation run
#[derive(Debug, Clone)]
pub struct GeneratedController {
    pub emitted: EmittedController,
    /// False in dry-run mode
    pub written: bool,
    /// Registry patch outcome; `None` when nothing was written
    pub registry: Option<PatchOutcome>,
}

/// Main code generator that assembles, writes and registers controllers
pub struct CodeGenerator<'a> {
    config: &'a CodegenConfig,
    registry: &'a SchemaRegistry,
}

impl<'a> CodeGenerator<'a> {
    /// Create a new code generator over a loaded schema
    pub fn new(config: &'a CodegenConfig, registry: &'a SchemaRegistry) -> Self {
        Self { config, registry }
    }

    /// Assemble the controller without touching disk
    pub fn assemble(&self, request: &ControllerRequest) -> Result<EmittedController> {
        request.validate(&self.config.api_version)?;
        assemble_controller(self.registry, self.config, request)
    }

    /// Generate, write and register one controller
    pub fn generate(&self, request: &ControllerRequest) -> Result<GeneratedController> {
        let emitted = self.assemble(request)?;
        let written = write_controller(&emitted, self.config)?;
        if !written {
            return Ok(GeneratedController {
                emitted,
                written,
                registry: None,
            });
        }

        let outcome = self.register(&emitted, request)?;
        info!(
            "Generated {} ({} routes), registry: {:?}",
            emitted.class_name,
            emitted.plan.entries.len(),
            outcome
        );
        Ok(GeneratedController {
            emitted,
            written,
            registry: Some(outcome),
        })
    }

    /// Wire a written controller into the registry of its version
    pub fn register(
        &self,
        emitted: &EmittedController,
        request: &ControllerRequest,
    ) -> Result<PatchOutcome> {
        let registry_path = self.config.registry_path(&emitted.version);
        let registry_dir = registry_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();
        let entry = RegistryEntry {
            class_name: emitted.class_name.clone(),
            import_path: relative_import(&registry_dir, &emitted.module_path())?,
            binding: to_binding_name(&request.name),
        };
        patch_registry(
            &registry_path,
            &entry,
            &self.config.import_marker,
            &self.config.binding_marker,
        )
    }
}
