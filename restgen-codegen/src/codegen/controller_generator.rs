//! Controller assembler - composes the emitted controller source file

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::clause::HandlerBody;
use super::fs_util::{format_file, relative_import, write_file};
use super::naming::{to_controller_class, to_controller_file_stem, to_model_class, to_model_file_stem};
use super::render::{CoreModule, RenderContext, Renderer, Requirement};
use super::route_plan::RoutePlan;
use super::source_file::{ClassSpec, ImportSet, MethodSpec, Parameter, SourceFile, Visibility};
use super::synthesizer::HandlerSynthesizer;
use crate::config::{CodegenConfig, ControllerRequest};
use crate::error::Result;
use crate::schema::{SchemaInspector, SchemaRegistry};

/// A fully assembled controller, not yet written
#[derive(Debug, Clone)]
pub struct EmittedController {
    pub class_name: String,
    pub version: String,
    pub file_path: PathBuf,
    pub source: String,
    pub imports: ImportSet,
    pub plan: RoutePlan,
    pub bodies: Vec<HandlerBody>,
}

impl EmittedController {
    /// Controller file path without its extension, as imported by other modules
    pub fn module_path(&self) -> PathBuf {
        self.file_path.with_extension("")
    }
}

/// Assemble the controller for a request. Nothing is written.
pub fn assemble_controller(
    registry: &SchemaRegistry,
    config: &CodegenConfig,
    request: &ControllerRequest,
) -> Result<EmittedController> {
    let version = request.resolved_version(&config.api_version).to_string();
    let inspector = SchemaInspector::new(registry);
    let synthesizer = HandlerSynthesizer::new(&inspector, &request.model, config.max_relation_depth)?;
    let model = synthesizer.model();

    let plan = RoutePlan::build(
        &request.name,
        &request.route,
        &version,
        synthesizer.has_file_fields(),
    );
    let bodies = synthesizer.synthesize_all(&plan);

    let ctx = RenderContext {
        controller_class: to_controller_class(&request.name),
        model_class: to_model_class(&model.name),
        model_path: model.path.clone(),
    };
    let mut renderer = Renderer::new(&ctx);
    renderer.require(Requirement::Core(CoreModule::BaseController, "BaseController"));
    let routes = renderer.render_routes(&plan);
    let handlers: Vec<String> = bodies.iter().map(|b| renderer.render_handler(b)).collect();

    let controllers_dir = config.controllers_dir(&version);
    let mut file = SourceFile::new();
    file.add_import(&["Request", "Response", "Router"], "express");
    add_requirements(&mut file, renderer.into_requirements(), &controllers_dir, config)?;

    let class = file.add_class(ClassSpec {
        name: ctx.controller_class.clone(),
        extends: Some("BaseController".to_string()),
        exported: true,
    });
    class
        .add_method(MethodSpec {
            name: "route".to_string(),
            visibility: Visibility::Public,
            is_async: false,
            return_type: Some("void".to_string()),
        })
        .add_parameter(Parameter::new("router", "Router"))
        .append_content(&routes);
    for (body, code) in bodies.iter().zip(&handlers) {
        class
            .add_method(MethodSpec {
                name: body.kind.method_name().to_string(),
                visibility: Visibility::Private,
                is_async: true,
                return_type: Some("Promise<void>".to_string()),
            })
            .add_parameter(Parameter::new("req", "Request"))
            .add_parameter(Parameter::new("res", "Response"))
            .append_content(code);
    }

    let file_path = controllers_dir.join(format!("{}.ts", to_controller_file_stem(&request.name)));
    debug!(
        "Assembled {} ({} routes, {} import modules)",
        ctx.controller_class,
        plan.entries.len(),
        file.imports().len()
    );

    Ok(EmittedController {
        class_name: ctx.controller_class,
        version,
        file_path,
        source: file.generate(),
        imports: file.imports().clone(),
        plan,
        bodies,
    })
}

/// Resolve the names the rendered code needs to import statements
fn add_requirements(
    file: &mut SourceFile,
    requirements: BTreeSet<Requirement>,
    controllers_dir: &Path,
    config: &CodegenConfig,
) -> Result<()> {
    let mut models = BTreeSet::new();
    for requirement in requirements {
        match requirement {
            Requirement::Core(module, name) => {
                let from = relative_import(controllers_dir, &config.core_dir.join(module.file_stem()))?;
                file.add_import(&[name], &from);
            }
            Requirement::Model { name, path } => {
                // one declaration per type name; the first resolved path wins
                if !models.insert(name.clone()) {
                    continue;
                }
                let dir = path.map(PathBuf::from).unwrap_or_else(|| config.models_dir.clone());
                let from = relative_import(controllers_dir, &dir.join(to_model_file_stem(&name)))?;
                file.add_import(&[name.as_str()], &from);
            }
        }
    }
    Ok(())
}

/// Write an assembled controller and run the formatter. Returns false in dry-run mode.
pub fn write_controller(emitted: &EmittedController, config: &CodegenConfig) -> Result<bool> {
    if config.dry_run {
        info!("Dry run: would write {}", emitted.file_path.display());
        return Ok(false);
    }
    write_file(&emitted.file_path, &emitted.source)?;
    format_file(&emitted.file_path, config.formatter.as_deref());
    info!("Wrote {}", emitted.file_path.display());
    Ok(true)
}
