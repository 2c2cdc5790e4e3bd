// src/store/mod.rs
//! Entity store collaborator. The resolver only ever talks to the catalog
//! through this trait; Postgres and in-memory backends implement it.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::core::{CanonicalEntity, EntityId, EntityRef, EntityType};

pub mod creators;
pub mod memory;
pub mod postgres;
#[cfg(test)]
pub(crate) mod test_support;

pub use creators::{CreatorRegistry, EntityCreator, StoreBackedCreator};
pub use memory::InMemoryEntityStore;
pub use postgres::PgEntityStore;

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Entities of `entity_type` whose trimmed name equals any of `names`,
    /// ignoring case.
    async fn find_by_type_and_names_case_insensitive(
        &self,
        entity_type: EntityType,
        names: &[String],
    ) -> Result<Vec<EntityRef>>;

    /// Entities of `entity_type` with at least one alias equal (ignoring case)
    /// to any of `candidates`.
    async fn find_by_type_with_any_alias(
        &self,
        entity_type: EntityType,
        candidates: &[String],
    ) -> Result<Vec<CanonicalEntity>>;

    /// Full scan of one type partition.
    async fn find_all_by_type(&self, entity_type: EntityType) -> Result<Vec<CanonicalEntity>>;

    async fn create_entity(
        &self,
        entity_type: EntityType,
        name: &str,
        aliases: &[String],
    ) -> Result<EntityRef>;

    async fn fetch_entity(&self, id: &EntityId) -> Result<Option<CanonicalEntity>>;

    async fn update_entity_aliases(
        &self,
        id: &EntityId,
        aliases: &[String],
    ) -> Result<CanonicalEntity>;
}
