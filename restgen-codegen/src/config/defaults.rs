//! Default configuration values - single source of truth

/// Default API version (selects the controller subdirectory and registry)
pub const API_VERSION: &str = "v1";

/// Default route base (controllers are mounted at the root)
pub const ROUTE_BASE: &str = "";

/// Default output directory for generated controllers
pub const OUTPUT_DIR: &str = "./src/controllers";

/// Default directory holding model type declarations
pub const MODELS_DIR: &str = "./src/models";

/// Default directory holding the shared controller runtime (base controller, acl, errors)
pub const CORE_DIR: &str = "./src/core";

/// Default registry file name, resolved inside the versioned output directory
pub const REGISTRY_FILE_NAME: &str = "index.ts";

/// Marker line before which controller imports are inserted
pub const IMPORT_MARKER: &str = "// restgen:imports";

/// Marker line before which controller bindings are inserted
pub const BINDING_MARKER: &str = "// restgen:controllers";

/// Maximum number of relation hops followed when redacting nested confidential fields
pub const MAX_RELATION_DEPTH: usize = 4;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;
