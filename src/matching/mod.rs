// src/matching/mod.rs
//! Matching tiers. Each tier receives the still-unmatched inputs of one
//! entity-type partition and returns results only for the inputs it matched.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::core::EntityType;
use crate::models::resolution::{ResolutionInput, ResolutionResult, ResolutionTier};
use crate::store::EntityStore;
use crate::utils::resolution_config::ResolutionConfig;

pub mod alias;
pub mod exact;
pub mod fuzzy;
pub mod similarity;

pub use alias::AliasMatcher;
pub use exact::ExactMatcher;
pub use fuzzy::FuzzyMatcher;

#[async_trait]
pub trait TierMatcher: Send + Sync {
    fn tier(&self) -> ResolutionTier;

    /// Errors are bulk lookup failures; an input without a match is simply
    /// absent from the returned results.
    async fn find_matches(
        &self,
        store: &dyn EntityStore,
        entity_type: EntityType,
        inputs: &[ResolutionInput],
        config: &ResolutionConfig,
    ) -> Result<Vec<ResolutionResult>>;
}
