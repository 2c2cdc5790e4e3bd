// src/store/test_support.rs
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::models::core::{CanonicalEntity, EntityId, EntityRef, EntityType};
use crate::store::memory::InMemoryEntityStore;
use crate::store::EntityStore;

/// Wraps the in-memory store and fails selected calls.
#[derive(Default)]
pub(crate) struct FailingStore {
    pub inner: InMemoryEntityStore,
    pub fail_exact_lookup: AtomicBool,
    pub fail_alias_lookup: AtomicBool,
    pub fail_full_scan: AtomicBool,
    pub fail_create_for: HashSet<String>,
    pub full_scans: AtomicUsize,
    pub updates: AtomicUsize,
}

impl FailingStore {
    pub fn failing_creates(names: &[&str]) -> Self {
        Self {
            fail_create_for: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl EntityStore for FailingStore {
    async fn find_by_type_and_names_case_insensitive(
        &self,
        entity_type: EntityType,
        names: &[String],
    ) -> Result<Vec<EntityRef>> {
        if self.fail_exact_lookup.load(Ordering::SeqCst) {
            bail!("connection refused");
        }
        self.inner.find_by_type_and_names_case_insensitive(entity_type, names).await
    }

    async fn find_by_type_with_any_alias(
        &self,
        entity_type: EntityType,
        candidates: &[String],
    ) -> Result<Vec<CanonicalEntity>> {
        if self.fail_alias_lookup.load(Ordering::SeqCst) {
            bail!("connection refused");
        }
        self.inner.find_by_type_with_any_alias(entity_type, candidates).await
    }

    async fn find_all_by_type(&self, entity_type: EntityType) -> Result<Vec<CanonicalEntity>> {
        self.full_scans.fetch_add(1, Ordering::SeqCst);
        if self.fail_full_scan.load(Ordering::SeqCst) {
            bail!("connection refused");
        }
        self.inner.find_all_by_type(entity_type).await
    }

    async fn create_entity(
        &self,
        entity_type: EntityType,
        name: &str,
        aliases: &[String],
    ) -> Result<EntityRef> {
        if self.fail_create_for.contains(name) {
            bail!("unique constraint violated for '{}'", name);
        }
        self.inner.create_entity(entity_type, name, aliases).await
    }

    async fn fetch_entity(&self, id: &EntityId) -> Result<Option<CanonicalEntity>> {
        self.inner.fetch_entity(id).await
    }

    async fn update_entity_aliases(
        &self,
        id: &EntityId,
        aliases: &[String],
    ) -> Result<CanonicalEntity> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update_entity_aliases(id, aliases).await
    }
}
