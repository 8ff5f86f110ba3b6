//! Code generation module

mod clause;
mod code_generator;
mod controller_generator;
mod fs_util;
mod naming;
mod registry_patcher;
mod render;
mod route_plan;
mod source_file;
mod synthesizer;

pub use clause::*;
pub use code_generator::*;
pub use controller_generator::*;
pub use fs_util::relative_import;
pub use naming::*;
pub use registry_patcher::*;
pub use render::{CoreModule, RenderContext, Renderer, Requirement};
pub use route_plan::*;
pub use source_file::*;
pub use synthesizer::*;
