// src/resolution/mod.rs
pub mod assembly;
pub mod contextual;
pub mod resolver;

pub use assembly::ResultAssembler;
pub use contextual::{contextual_temp_id, ContextualResolution};
pub use resolver::EntityResolver;
