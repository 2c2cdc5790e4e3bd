// src/aliases/manager.rs
use log::{debug, info, warn};
use serde::Serialize;

use crate::aliases::alias_set::{
    add_original_text_as_alias, merge_aliases, validate_scope_constraints, AliasAddition,
    AliasConfig, AliasMergeResult, ScopeValidation,
};
use crate::models::core::EntityType;

/// Outcome of consolidating two alias lists for a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergePreparation {
    pub merged_aliases: Vec<String>,
    pub duplicates_removed: usize,
    pub violations: Vec<String>,
}

/// Stateless service over the alias operations in `alias_set`, adding the
/// logging the resolver and merge coordinator rely on.
#[derive(Debug, Clone, Default)]
pub struct AliasManager {
    config: AliasConfig,
}

impl AliasManager {
    pub fn new(config: AliasConfig) -> Self {
        Self { config }
    }

    pub fn merge_aliases(
        &self,
        first: &[String],
        second: &[String],
        third: &[String],
    ) -> AliasMergeResult {
        let result = merge_aliases(first, second, third, &self.config);
        if result.duplicates_removed > 0 {
            debug!(
                "Alias merge: {} inputs → {} unique ({} duplicates removed)",
                first.len() + second.len() + third.len(),
                result.merged.len(),
                result.duplicates_removed
            );
        }
        result
    }

    pub fn validate_scope_constraints(
        &self,
        entity_type: EntityType,
        aliases: &[String],
    ) -> ScopeValidation {
        let validation = validate_scope_constraints(entity_type, aliases, &self.config);
        if !validation.violations.is_empty() {
            warn!(
                "🚫 {} alias(es) rejected for {} due to cross-scope terms: {:?}",
                validation.violations.len(),
                entity_type,
                validation.violations
            );
        }
        validation
    }

    /// Merges source aliases into the target's and validates the result
    /// against the entity type's scope.
    pub fn prepare_aliases_for_merge(
        &self,
        source_aliases: &[String],
        target_aliases: &[String],
        entity_type: EntityType,
    ) -> MergePreparation {
        let merged = self.merge_aliases(target_aliases, source_aliases, &[]);
        let validation = self.validate_scope_constraints(entity_type, &merged.merged);

        info!(
            "Prepared {} merge aliases: {} source + {} target → {} kept, {} dupes, {} violations",
            entity_type,
            source_aliases.len(),
            target_aliases.len(),
            validation.valid.len(),
            merged.duplicates_removed,
            validation.violations.len()
        );

        MergePreparation {
            merged_aliases: validation.valid,
            duplicates_removed: merged.duplicates_removed,
            violations: validation.violations,
        }
    }

    pub fn add_original_text_as_alias(&self, existing: &[String], text: &str) -> AliasAddition {
        let addition = add_original_text_as_alias(existing, text, &self.config);
        debug!(
            "Alias '{}' {}",
            text.trim(),
            if addition.added { "added" } else { "already present or blank" }
        );
        addition
    }

    /// Aliases for a brand-new entity: its own aliases plus the original
    /// mention text, deduplicated and scope-validated.
    pub fn prepare_new_entity_aliases(
        &self,
        entity_type: EntityType,
        aliases: &[String],
        original_text: &str,
    ) -> ScopeValidation {
        let merged = self.merge_aliases(aliases, &[original_text.to_string()], &[]);
        self.validate_scope_constraints(entity_type, &merged.merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prepare_aliases_for_merge_prefers_target_casing() {
        let manager = AliasManager::default();
        let prep = manager.prepare_aliases_for_merge(
            &strings(&["TONKOTSU", "Shoyu"]),
            &strings(&["Tonkotsu", "Miso"]),
            EntityType::DishOrCategory,
        );
        assert_eq!(prep.merged_aliases, strings(&["Tonkotsu", "Miso", "Shoyu"]));
        assert_eq!(prep.duplicates_removed, 1);
        assert!(prep.violations.is_empty());
    }

    #[test]
    fn test_prepare_aliases_for_merge_reports_violations() {
        let manager = AliasManager::default();
        let prep = manager.prepare_aliases_for_merge(
            &strings(&["romantic patio"]),
            &strings(&["charred"]),
            EntityType::DishAttribute,
        );
        assert_eq!(prep.merged_aliases, strings(&["charred"]));
        assert_eq!(prep.violations, strings(&["romantic patio"]));
    }

    #[test]
    fn test_prepare_new_entity_aliases_includes_original_text() {
        let manager = AliasManager::default();
        let validation =
            manager.prepare_new_entity_aliases(EntityType::Restaurant, &[], "Joe's Tacos");
        assert_eq!(validation.valid, strings(&["Joe's Tacos"]));

        let validation = manager.prepare_new_entity_aliases(
            EntityType::DishAttribute,
            &strings(&["crispy", "patio seating"]),
            "Crispy",
        );
        assert_eq!(validation.valid, strings(&["crispy"]));
        assert_eq!(validation.violations, strings(&["patio seating"]));
    }
}
