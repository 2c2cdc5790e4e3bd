// src/store/creators.rs
//! Per-type entity creation, dispatched through a lookup table so a new
//! entity type only needs a registered creator.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ResolutionError;
use crate::models::core::{EntityRef, EntityType};
use crate::store::EntityStore;

#[async_trait]
pub trait EntityCreator: Send + Sync {
    fn entity_type(&self) -> EntityType;

    async fn create(&self, name: &str, aliases: &[String]) -> Result<EntityRef>;
}

/// Creates entities of one fixed type through the shared store.
pub struct StoreBackedCreator {
    entity_type: EntityType,
    store: Arc<dyn EntityStore>,
}

impl StoreBackedCreator {
    pub fn new(entity_type: EntityType, store: Arc<dyn EntityStore>) -> Self {
        Self { entity_type, store }
    }
}

#[async_trait]
impl EntityCreator for StoreBackedCreator {
    fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    async fn create(&self, name: &str, aliases: &[String]) -> Result<EntityRef> {
        self.store.create_entity(self.entity_type, name, aliases).await
    }
}

#[derive(Clone, Default)]
pub struct CreatorRegistry {
    creators: HashMap<EntityType, Arc<dyn EntityCreator>>,
}

impl CreatorRegistry {
    /// Registers a store-backed creator for every known entity type.
    pub fn for_store(store: Arc<dyn EntityStore>) -> Self {
        let mut registry = Self::default();
        for entity_type in EntityType::ALL {
            registry.register(Arc::new(StoreBackedCreator::new(entity_type, store.clone())));
        }
        registry
    }

    /// Replaces any creator already registered for the same type.
    pub fn register(&mut self, creator: Arc<dyn EntityCreator>) {
        self.creators.insert(creator.entity_type(), creator);
    }

    pub fn get(&self, entity_type: EntityType) -> Result<&Arc<dyn EntityCreator>, ResolutionError> {
        self.creators
            .get(&entity_type)
            .ok_or_else(|| {
                ResolutionError::Validation(format!(
                    "No entity creator registered for {}",
                    entity_type
                ))
            })
    }
}
