// src/store/memory.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::aliases::alias_set::alias_key;
use crate::models::core::{CanonicalEntity, EntityId, EntityRef, EntityType};
use crate::store::EntityStore;

/// Insertion-ordered in-memory catalog. Lookups return entities in the order
/// they were added, which keeps "first fetched entity" deterministic.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    entities: RwLock<Vec<CanonicalEntity>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity directly, bypassing alias preparation.
    pub async fn seed(&self, entity_type: EntityType, name: &str, aliases: &[&str]) -> EntityId {
        let entity = new_entity(entity_type, name, aliases.iter().map(|a| a.to_string()).collect());
        let id = entity.id.clone();
        self.entities.write().await.push(entity);
        id
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

fn new_entity(entity_type: EntityType, name: &str, aliases: Vec<String>) -> CanonicalEntity {
    let now = Utc::now().naive_utc();
    CanonicalEntity {
        id: EntityId(Uuid::new_v4().to_string()),
        name: name.to_string(),
        entity_type,
        aliases,
        created_at: Some(now),
        updated_at: Some(now),
    }
}

fn key_set(values: &[String]) -> HashSet<String> {
    values.iter().map(|v| alias_key(v)).collect()
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn find_by_type_and_names_case_insensitive(
        &self,
        entity_type: EntityType,
        names: &[String],
    ) -> Result<Vec<EntityRef>> {
        let wanted = key_set(names);
        let entities = self.entities.read().await;
        Ok(entities
            .iter()
            .filter(|e| e.entity_type == entity_type && wanted.contains(&alias_key(&e.name)))
            .map(CanonicalEntity::to_ref)
            .collect())
    }

    async fn find_by_type_with_any_alias(
        &self,
        entity_type: EntityType,
        candidates: &[String],
    ) -> Result<Vec<CanonicalEntity>> {
        let wanted = key_set(candidates);
        let entities = self.entities.read().await;
        Ok(entities
            .iter()
            .filter(|e| {
                e.entity_type == entity_type
                    && e.aliases.iter().any(|a| wanted.contains(&alias_key(a)))
            })
            .cloned()
            .collect())
    }

    async fn find_all_by_type(&self, entity_type: EntityType) -> Result<Vec<CanonicalEntity>> {
        let entities = self.entities.read().await;
        Ok(entities.iter().filter(|e| e.entity_type == entity_type).cloned().collect())
    }

    async fn create_entity(
        &self,
        entity_type: EntityType,
        name: &str,
        aliases: &[String],
    ) -> Result<EntityRef> {
        let entity = new_entity(entity_type, name, aliases.to_vec());
        let entity_ref = entity.to_ref();
        self.entities.write().await.push(entity);
        Ok(entity_ref)
    }

    async fn fetch_entity(&self, id: &EntityId) -> Result<Option<CanonicalEntity>> {
        let entities = self.entities.read().await;
        Ok(entities.iter().find(|e| &e.id == id).cloned())
    }

    async fn update_entity_aliases(
        &self,
        id: &EntityId,
        aliases: &[String],
    ) -> Result<CanonicalEntity> {
        let mut entities = self.entities.write().await;
        let entity = entities
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| anyhow!("Entity {} not found for alias update", id))?;
        entity.aliases = aliases.to_vec();
        entity.updated_at = Some(Utc::now().naive_utc());
        Ok(entity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_name_lookup_ignores_case_and_whitespace() {
        let store = InMemoryEntityStore::new();
        let id = store.seed(EntityType::Restaurant, "Franklin BBQ", &[]).await;
        store.seed(EntityType::DishOrCategory, "Franklin BBQ", &[]).await;

        let found = store
            .find_by_type_and_names_case_insensitive(
                EntityType::Restaurant,
                &["  franklin bbq ".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
    }

    #[tokio::test]
    async fn test_alias_lookup_is_type_scoped() {
        let store = InMemoryEntityStore::new();
        store.seed(EntityType::DishOrCategory, "Brisket", &["Smoked Brisket"]).await;

        let restaurants = store
            .find_by_type_with_any_alias(EntityType::Restaurant, &["smoked brisket".to_string()])
            .await
            .unwrap();
        assert!(restaurants.is_empty());

        let dishes = store
            .find_by_type_with_any_alias(
                EntityType::DishOrCategory,
                &["smoked brisket".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(dishes.len(), 1);
    }

    #[tokio::test]
    async fn test_create_fetch_and_update() {
        let store = InMemoryEntityStore::new();
        let created = store
            .create_entity(EntityType::DishAttribute, "Spicy", &["spicy".to_string()])
            .await
            .unwrap();

        let fetched = store.fetch_entity(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.aliases, vec!["spicy"]);

        let updated = store
            .update_entity_aliases(&created.id, &["spicy".to_string(), "hot".to_string()])
            .await
            .unwrap();
        assert_eq!(updated.aliases.len(), 2);

        assert!(store.fetch_entity(&EntityId::from("missing")).await.unwrap().is_none());
        assert!(store.update_entity_aliases(&EntityId::from("missing"), &[]).await.is_err());
    }
}
