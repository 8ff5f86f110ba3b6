//! CLI entry point for restgen

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use restgen_codegen::codegen::{CodeGenerator, PatchOutcome, RoutePlan};
use restgen_codegen::config::{CodegenConfig, ControllerRequest};
use restgen_codegen::schema::{load_schema, SchemaInspector, SchemaRegistry};

#[derive(Parser)]
#[command(name = "restgen")]
#[command(about = "Generate access-controlled REST controllers from declarative model schemas")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to model schema file (overrides config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Controllers output directory (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a controller and register it
    Controller(ControllerArgs),
    /// Print the route table of a controller without generating it
    Plan(ControllerArgs),
    /// Inspect schema (show models and security profiles for debugging)
    Inspect {
        /// Only show this model
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Args)]
struct ControllerArgs {
    /// Controller name (lower-case letters only)
    name: Option<String>,

    /// Model the controller serves
    #[arg(long)]
    model: Option<String>,

    /// Route base the controller is mounted under
    #[arg(long, default_value = "")]
    route: String,

    /// API version (overrides config)
    #[arg(long)]
    version: Option<String>,
}

impl ControllerArgs {
    fn to_request(&self) -> ControllerRequest {
        let mut request = ControllerRequest::new(
            self.name.clone().unwrap_or_default(),
            self.model.clone().unwrap_or_default(),
        )
        .route(self.route.clone());
        request.version = self.version.clone();
        request
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    // An explicit --config file is used as is; otherwise restgen.toml + RESTGEN_* env
    let mut config = if let Some(config_path) = &cli.config {
        CodegenConfig::from_file(config_path)?
    } else {
        CodegenConfig::load(None)?
    };

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    // Apply CLI overrides
    if let Some(schema) = cli.schema {
        config.schema_file = schema;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    match &cli.command {
        Commands::Controller(args) => generate_controller(&config, &args.to_request()),
        Commands::Plan(args) => print_plan(&config, &args.to_request()),
        Commands::Inspect { model } => inspect_schema(&config, model.as_deref()),
    }
}

fn generate_controller(config: &CodegenConfig, request: &ControllerRequest) -> Result<()> {
    // Arguments are rejected before the schema is even read
    request.validate(&config.api_version)?;
    config.validate()?;

    info!("Generating controller from schema: {:?}", config.schema_file);
    let registry = load_schema(&config.schema_file)?;
    let generated = CodeGenerator::new(config, &registry).generate(request)?;

    if !generated.written {
        println!("Dry run mode - would generate:");
        println!("  Controller: {}", generated.emitted.file_path.display());
        println!("  Registry:   {}", config.registry_path(&generated.emitted.version).display());
        println!();
        print!("{}", generated.emitted.source);
        return Ok(());
    }

    match generated.registry {
        Some(PatchOutcome::MarkersMissing) => println!(
            "Registry {} has no restgen markers; register {} manually",
            config.registry_path(&generated.emitted.version).display(),
            generated.emitted.class_name
        ),
        Some(PatchOutcome::NameConflict) => println!(
            "Registry {} already binds {} from another module; not registered",
            config.registry_path(&generated.emitted.version).display(),
            generated.emitted.class_name
        ),
        Some(PatchOutcome::AlreadyPresent) => {
            info!("{} was already registered", generated.emitted.class_name)
        }
        _ => {}
    }

    info!("Code generation completed successfully");
    Ok(())
}

fn print_plan(config: &CodegenConfig, request: &ControllerRequest) -> Result<()> {
    request.validate(&config.api_version)?;
    config.validate()?;

    let registry = load_schema(&config.schema_file)?;
    let emitted = CodeGenerator::new(config, &registry).assemble(request)?;
    print_route_table(&emitted.class_name, &emitted.plan);
    Ok(())
}

fn print_route_table(class_name: &str, plan: &RoutePlan) {
    println!("{} ({}, acl '{}'):", class_name, plan.version, plan.acl_id);
    for entry in &plan.entries {
        println!(
            "  {:<7} {:<40} {:<7} {}",
            entry.verb.to_string(),
            entry.url_path,
            entry.acl_action.as_str(),
            entry.method_name
        );
    }
}

fn inspect_schema(config: &CodegenConfig, only: Option<&str>) -> Result<()> {
    let registry = load_schema(&config.schema_file)?;
    let inspector = SchemaInspector::new(&registry);

    let models = match only {
        Some(name) => vec![inspector.model(name)?],
        None => registry.models().iter().collect(),
    };

    println!("Parsed {} models:\n", registry.models().len());
    for model in models {
        print_model(&registry, &inspector, config, &model.name)?;
    }
    Ok(())
}

fn print_model(
    registry: &SchemaRegistry,
    inspector: &SchemaInspector<'_>,
    config: &CodegenConfig,
    name: &str,
) -> Result<()> {
    let model = registry.model(name)?;
    println!("Model: {}", model.name);
    if let Some(path) = &model.path {
        println!("  Declared in: {}", path);
    }
    println!("  Fields:");
    for field in &model.fields {
        let mut flags = Vec::new();
        if field.confidential {
            flags.push("confidential");
        }
        if field.owner_verified {
            flags.push("owner-verified");
        }
        let detail = match (&field.relation, field.of) {
            (Some(rel), _) => format!(" -> {}", rel.model),
            (None, Some(of)) => format!(" of {}", of),
            (None, None) => String::new(),
        };
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("    - {} {}{}{}", field.name, field.field_type, detail, flags);
    }

    let profile = inspector.security_profile(name)?;
    if !profile.confidential_fields.is_empty() {
        println!("  Confidential: {:?}", profile.confidential_fields);
    }
    if !profile.owner_verified_fields.is_empty() {
        println!("  Owner-verified: {:?}", profile.owner_verified_fields);
    }

    let redactions = inspector.relation_redactions(name, config.max_relation_depth)?;
    if !redactions.is_empty() {
        println!("  Nested redactions:");
        for redaction in &redactions {
            println!("    - {}: {:?}", redaction.dotted(), redaction.fields);
        }
    }
    println!();
    Ok(())
}
