// src/errors.rs
use thiserror::Error;

use crate::models::core::{EntityId, EntityType};
use crate::models::resolution::ResolutionTier;

/// Error taxonomy for the resolution engine.
///
/// Bulk tier lookups, missing entities and type mismatches are fatal to the
/// call that raised them. `EntityCreation` is only ever carried inline in a
/// `ResolutionResult`, never returned from `resolve_batch`.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{tier} tier lookup failed for {entity_type}: {source:#}")]
    StoreQuery {
        tier: ResolutionTier,
        entity_type: EntityType,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to create entity '{name}' for {temp_id}: {source:#}")]
    EntityCreation {
        temp_id: String,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    #[error("Entity type mismatch: {entity_id} is {actual}, expected {expected}")]
    TypeMismatch {
        entity_id: EntityId,
        expected: EntityType,
        actual: EntityType,
    },

    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ResolutionError>;
