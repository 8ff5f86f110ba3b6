//! Model schema: declared fields, loading, and security lookups

mod inspector;
mod loader;
mod metadata;

pub use inspector::*;
pub use loader::*;
pub use metadata::*;
