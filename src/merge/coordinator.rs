// src/merge/coordinator.rs
use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::aliases::alias_set::alias_key;
use crate::aliases::AliasManager;
use crate::errors::{ResolutionError, Result};
use crate::models::core::{CanonicalEntity, EntityId, EntityType};
use crate::store::EntityStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub target_id: EntityId,
    pub aliases_added: usize,
    pub duplicates_removed: usize,
    pub violations: Vec<String>,
    /// Alias list of the target after the merge.
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasAddOutcome {
    pub entity_id: EntityId,
    pub added: bool,
    pub aliases: Vec<String>,
    pub violations: Vec<String>,
}

/// Alias consolidation for existing entities.
///
/// Both operations are unsynchronized read-modify-write cycles on a single
/// entity; concurrent calls on the same entity are last-write-wins. Deleting
/// a merged source entity is left to the caller.
pub struct MergeCoordinator {
    store: Arc<dyn EntityStore>,
    alias_manager: AliasManager,
}

impl MergeCoordinator {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            alias_manager: AliasManager::default(),
        }
    }

    pub fn with_alias_manager(mut self, alias_manager: AliasManager) -> Self {
        self.alias_manager = alias_manager;
        self
    }

    async fn fetch_required(&self, id: &EntityId) -> Result<CanonicalEntity> {
        self.store
            .fetch_entity(id)
            .await?
            .ok_or_else(|| ResolutionError::NotFound(id.clone()))
    }

    /// Folds the source entity's aliases into the target's and persists the
    /// result on the target only.
    pub async fn merge_entities(
        &self,
        source_id: &EntityId,
        target_id: &EntityId,
        entity_type: EntityType,
    ) -> Result<MergeOutcome> {
        if source_id == target_id {
            return Err(ResolutionError::Validation(format!(
                "Cannot merge entity {} into itself",
                source_id
            )));
        }

        let source = self.fetch_required(source_id).await?;
        let target = self.fetch_required(target_id).await?;

        for entity in [&source, &target] {
            if entity.entity_type != entity_type {
                return Err(ResolutionError::TypeMismatch {
                    entity_id: entity.id.clone(),
                    expected: entity_type,
                    actual: entity.entity_type,
                });
            }
        }

        let prep = self
            .alias_manager
            .prepare_aliases_for_merge(&source.aliases, &target.aliases, entity_type);

        let existing: HashSet<String> = target.aliases.iter().map(|a| alias_key(a)).collect();
        let aliases_added = prep
            .merged_aliases
            .iter()
            .filter(|a| !existing.contains(&alias_key(a)))
            .count();

        if prep.merged_aliases != target.aliases {
            self.store.update_entity_aliases(&target.id, &prep.merged_aliases).await?;
            info!(
                "🔀 Merged {} ('{}') into {} ('{}'): {} alias(es) added, {} duplicate(s) removed",
                source.id,
                source.name,
                target.id,
                target.name,
                aliases_added,
                prep.duplicates_removed
            );
        } else {
            debug!("Merge of {} into {} left aliases unchanged", source.id, target.id);
        }

        Ok(MergeOutcome {
            target_id: target.id,
            aliases_added,
            duplicates_removed: prep.duplicates_removed,
            violations: prep.violations,
            aliases: prep.merged_aliases,
        })
    }

    /// Adds one alias to an entity. Blank, already-present and out-of-scope
    /// aliases leave the stored entity untouched.
    pub async fn add_alias_to_entity(
        &self,
        entity_id: &EntityId,
        alias: &str,
    ) -> Result<AliasAddOutcome> {
        let entity = self.fetch_required(entity_id).await?;

        let addition = self
            .alias_manager
            .add_original_text_as_alias(&entity.aliases, alias);
        if !addition.added {
            return Ok(AliasAddOutcome {
                entity_id: entity.id,
                added: false,
                aliases: entity.aliases,
                violations: Vec::new(),
            });
        }

        let validation = self
            .alias_manager
            .validate_scope_constraints(entity.entity_type, &[alias.trim().to_string()]);
        if !validation.violations.is_empty() {
            return Ok(AliasAddOutcome {
                entity_id: entity.id,
                added: false,
                aliases: entity.aliases,
                violations: validation.violations,
            });
        }

        self.store
            .update_entity_aliases(&entity.id, &addition.aliases)
            .await?;
        info!("➕ Added alias '{}' to {} ('{}')", alias.trim(), entity.id, entity.name);

        Ok(AliasAddOutcome {
            entity_id: entity.id,
            added: true,
            aliases: addition.aliases,
            violations: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::FailingStore;
    use std::sync::atomic::Ordering;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_merge_entities_consolidates_onto_target() {
        let store = Arc::new(FailingStore::default());
        let source = store
            .inner
            .seed(EntityType::DishOrCategory, "Tonkotsu", &["TONKOTSU RAMEN", "pork bone ramen"])
            .await;
        let target = store
            .inner
            .seed(EntityType::DishOrCategory, "Tonkotsu Ramen", &["tonkotsu ramen"])
            .await;
        let coordinator = MergeCoordinator::new(store.clone());

        let outcome = coordinator
            .merge_entities(&source, &target, EntityType::DishOrCategory)
            .await
            .unwrap();

        assert_eq!(outcome.target_id, target);
        assert_eq!(outcome.aliases, strings(&["tonkotsu ramen", "pork bone ramen"]));
        assert_eq!(outcome.aliases_added, 1);
        assert_eq!(outcome.duplicates_removed, 1);
        assert!(outcome.violations.is_empty());

        let stored_target = store.inner.fetch_entity(&target).await.unwrap().unwrap();
        assert_eq!(stored_target.aliases, outcome.aliases);
        let stored_source = store.inner.fetch_entity(&source).await.unwrap().unwrap();
        assert_eq!(stored_source.aliases, strings(&["TONKOTSU RAMEN", "pork bone ramen"]));
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_merge_entities_reports_scope_violations() {
        let store = Arc::new(FailingStore::default());
        let source = store
            .inner
            .seed(EntityType::DishAttribute, "Charred", &["romantic patio"])
            .await;
        let target = store.inner.seed(EntityType::DishAttribute, "Smoky", &["smoked"]).await;
        let coordinator = MergeCoordinator::new(store.clone());

        let outcome = coordinator
            .merge_entities(&source, &target, EntityType::DishAttribute)
            .await
            .unwrap();

        assert_eq!(outcome.violations, strings(&["romantic patio"]));
        assert_eq!(outcome.aliases, strings(&["smoked"]));
        assert_eq!(outcome.aliases_added, 0);
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_merge_entities_fails_fast() {
        let store = Arc::new(FailingStore::default());
        let dish = store.inner.seed(EntityType::DishOrCategory, "Brisket", &[]).await;
        let restaurant = store.inner.seed(EntityType::Restaurant, "Brisket House", &[]).await;
        let coordinator = MergeCoordinator::new(store.clone());

        let missing = EntityId::from("does-not-exist");
        assert!(matches!(
            coordinator.merge_entities(&missing, &dish, EntityType::DishOrCategory).await,
            Err(ResolutionError::NotFound(id)) if id == missing
        ));
        assert!(matches!(
            coordinator.merge_entities(&dish, &restaurant, EntityType::DishOrCategory).await,
            Err(ResolutionError::TypeMismatch { entity_id, actual: EntityType::Restaurant, .. })
                if entity_id == restaurant
        ));

        let other_dish = store.inner.seed(EntityType::DishOrCategory, "Burnt Ends", &[]).await;
        assert!(matches!(
            coordinator.merge_entities(&dish, &other_dish, EntityType::Restaurant).await,
            Err(ResolutionError::TypeMismatch {
                expected: EntityType::Restaurant,
                actual: EntityType::DishOrCategory,
                ..
            })
        ));
        assert!(matches!(
            coordinator.merge_entities(&dish, &dish, EntityType::DishOrCategory).await,
            Err(ResolutionError::Validation(_))
        ));
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_alias_to_entity() {
        let store = Arc::new(FailingStore::default());
        let id = store
            .inner
            .seed(EntityType::Restaurant, "Franklin BBQ", &["Franklin Barbecue"])
            .await;
        let coordinator = MergeCoordinator::new(store.clone());

        let outcome = coordinator.add_alias_to_entity(&id, "Franklin's").await.unwrap();
        assert!(outcome.added);
        assert_eq!(outcome.aliases, strings(&["Franklin Barbecue", "Franklin's"]));

        let repeat = coordinator.add_alias_to_entity(&id, "  FRANKLIN'S ").await.unwrap();
        assert!(!repeat.added);
        assert_eq!(repeat.aliases, outcome.aliases);
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);

        let blank = coordinator.add_alias_to_entity(&id, "   ").await.unwrap();
        assert!(!blank.added);
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_add_alias_rejects_cross_scope_term() {
        let store = Arc::new(FailingStore::default());
        let id = store.inner.seed(EntityType::RestaurantAttribute, "Outdoor", &[]).await;
        let coordinator = MergeCoordinator::new(store.clone());

        let outcome = coordinator.add_alias_to_entity(&id, "extra spicy").await.unwrap();
        assert!(!outcome.added);
        assert_eq!(outcome.violations, strings(&["extra spicy"]));
        assert!(outcome.aliases.is_empty());
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);

        let missing = EntityId::from("nope");
        assert!(matches!(
            coordinator.add_alias_to_entity(&missing, "x").await,
            Err(ResolutionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_noop_alias_add_keeps_existing_aliases() {
        let store = Arc::new(FailingStore::default());
        let id = store
            .inner
            .seed(EntityType::DishAttribute, "Smoky", &["patio smoke"])
            .await;
        let coordinator = MergeCoordinator::new(store.clone());

        for alias in ["   ", "PATIO SMOKE", "rooftop"] {
            let outcome = coordinator.add_alias_to_entity(&id, alias).await.unwrap();
            assert!(!outcome.added);
            assert_eq!(outcome.aliases, strings(&["patio smoke"]));
        }
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);

        let outcome = coordinator.add_alias_to_entity(&id, "charred").await.unwrap();
        assert!(outcome.added);
        assert_eq!(outcome.aliases, strings(&["patio smoke", "charred"]));

        let stored = store.inner.fetch_entity(&id).await.unwrap().unwrap();
        assert_eq!(stored.aliases, strings(&["patio smoke", "charred"]));
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);
    }
}
