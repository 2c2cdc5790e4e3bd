// src/models/mod.rs
pub mod core;
pub mod resolution;
pub mod stats_models;

pub use self::core::{AttributeScope, CanonicalEntity, EntityId, EntityRef, EntityType};
pub use resolution::{
    BatchResolutionResult, ConfidenceBand, ContextualAttributeInput, ResolutionInput,
    ResolutionResult, ResolutionTier,
};
pub use stats_models::{ResolutionMetrics, TierCounts};
