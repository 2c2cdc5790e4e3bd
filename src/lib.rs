// src/lib.rs
pub mod aliases;
pub mod errors;
pub mod matching;
pub mod merge;
pub mod models;
pub mod resolution;
pub mod store;
pub mod utils;

pub use errors::{ResolutionError, Result};
pub use merge::MergeCoordinator;
pub use models::{
    BatchResolutionResult, CanonicalEntity, ContextualAttributeInput, EntityId, EntityType,
    ResolutionInput, ResolutionResult, ResolutionTier,
};
pub use resolution::EntityResolver;
