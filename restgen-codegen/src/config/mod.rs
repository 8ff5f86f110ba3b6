//! Generator configuration

pub mod defaults;
mod request;
mod settings;

pub use request::*;
pub use settings::*;
