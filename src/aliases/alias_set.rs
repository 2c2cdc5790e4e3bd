// src/aliases/alias_set.rs
//! Pure alias operations: normalization, case-insensitive deduplication and
//! cross-scope validation. Nothing in here touches the store.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;

use crate::aliases::scope_terms::{DISH_SCOPED_TERMS, RESTAURANT_SCOPED_TERMS};
use crate::models::core::EntityType;

pub const DEFAULT_MAX_ALIAS_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasConfig {
    pub max_alias_length: usize,
    pub deduplication_enabled: bool,
    pub prevent_cross_scope: bool,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            max_alias_length: DEFAULT_MAX_ALIAS_LENGTH,
            deduplication_enabled: true,
            prevent_cross_scope: true,
        }
    }
}

impl AliasConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            max_alias_length: env::var("ALIAS_MAX_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_alias_length),
            deduplication_enabled: env::var("ALIAS_DEDUPLICATION_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.deduplication_enabled),
            prevent_cross_scope: env::var("ALIAS_PREVENT_CROSS_SCOPE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.prevent_cross_scope),
        };
        debug!("Alias config: {:?}", config);
        config
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AliasMergeResult {
    pub merged: Vec<String>,
    pub duplicates_removed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeValidation {
    pub valid: Vec<String>,
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AliasAddition {
    pub aliases: Vec<String>,
    pub added: bool,
}

/// Comparison key for case-insensitive alias identity.
pub fn alias_key(alias: &str) -> String {
    alias.trim().to_lowercase()
}

/// Trims the alias and rejects blank or over-length values.
pub fn normalize_alias(raw: &str, max_alias_length: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max_alias_length {
        return None;
    }
    Some(trimmed.to_string())
}

/// Keeps the first-seen casing of every alias and counts later repeats.
/// Applying it to its own output removes nothing.
pub fn remove_duplicates(aliases: &[String]) -> AliasMergeResult {
    let mut seen = HashSet::with_capacity(aliases.len());
    let mut merged = Vec::with_capacity(aliases.len());
    let mut duplicates_removed = 0;

    for alias in aliases {
        if seen.insert(alias_key(alias)) {
            merged.push(alias.clone());
        } else {
            duplicates_removed += 1;
        }
    }

    AliasMergeResult {
        merged,
        duplicates_removed,
    }
}

/// Concatenates the three lists in order, drops blank and over-length
/// entries, then deduplicates unless deduplication is disabled.
pub fn merge_aliases(
    first: &[String],
    second: &[String],
    third: &[String],
    config: &AliasConfig,
) -> AliasMergeResult {
    let normalized: Vec<String> = first
        .iter()
        .chain(second)
        .chain(third)
        .filter_map(|alias| normalize_alias(alias, config.max_alias_length))
        .collect();

    if !config.deduplication_enabled {
        return AliasMergeResult {
            merged: normalized,
            duplicates_removed: 0,
        };
    }

    remove_duplicates(&normalized)
}

fn blocked_terms_for(entity_type: EntityType) -> &'static [&'static str] {
    match entity_type {
        EntityType::DishAttribute => &RESTAURANT_SCOPED_TERMS,
        EntityType::RestaurantAttribute => &DISH_SCOPED_TERMS,
        EntityType::Restaurant | EntityType::DishOrCategory => &[],
    }
}

/// Moves aliases that contain a term from the opposite scope into
/// `violations`. Matching is substring-based on the lowercased alias.
pub fn validate_scope_constraints(
    entity_type: EntityType,
    aliases: &[String],
    config: &AliasConfig,
) -> ScopeValidation {
    let blocked = blocked_terms_for(entity_type);
    if !config.prevent_cross_scope || blocked.is_empty() {
        return ScopeValidation {
            valid: aliases.to_vec(),
            violations: Vec::new(),
        };
    }

    let (violations, valid): (Vec<String>, Vec<String>) =
        aliases.iter().cloned().partition(|alias| {
            let lowered = alias.to_lowercase();
            blocked.iter().any(|term| lowered.contains(term))
        });

    ScopeValidation { valid, violations }
}

/// Merges `text` into `existing` and reports whether it was new.
pub fn add_original_text_as_alias(
    existing: &[String],
    text: &str,
    config: &AliasConfig,
) -> AliasAddition {
    if text.trim().is_empty() {
        return AliasAddition {
            aliases: existing.to_vec(),
            added: false,
        };
    }

    let baseline = merge_aliases(existing, &[], &[], config).merged.len();
    let merged = merge_aliases(existing, &[text.to_string()], &[], config).merged;
    let added = merged.len() > baseline;

    AliasAddition {
        aliases: merged,
        added,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_aliases_counts_cross_list_duplicates() {
        let result = merge_aliases(
            &strings(&["ramen", "ramen noodles"]),
            &strings(&["ramen", "japanese noodles"]),
            &strings(&["tonkotsu ramen"]),
            &AliasConfig::default(),
        );
        assert_eq!(
            result.merged,
            strings(&["ramen", "ramen noodles", "japanese noodles", "tonkotsu ramen"])
        );
        assert_eq!(result.duplicates_removed, 1);
    }

    #[test]
    fn test_merge_aliases_drops_blank_and_over_length() {
        let config = AliasConfig {
            max_alias_length: 5,
            ..Default::default()
        };
        let raw = strings(&["  ", "", "pho", "  bun  ", "vermicelli"]);
        let result = merge_aliases(&raw, &[], &[], &config);
        assert_eq!(result.merged, strings(&["pho", "bun"]));
        assert_eq!(result.duplicates_removed, 0);
    }

    #[test]
    fn test_merge_aliases_without_deduplication() {
        let config = AliasConfig {
            deduplication_enabled: false,
            ..Default::default()
        };
        let result = merge_aliases(&strings(&["Taco"]), &strings(&["taco"]), &[], &config);
        assert_eq!(result.merged.len(), 2);
        assert_eq!(result.duplicates_removed, 0);
    }

    #[test]
    fn test_remove_duplicates_keeps_first_casing() {
        let result = remove_duplicates(&strings(&[
            "Franklin BBQ",
            "franklin bbq",
            " FRANKLIN BBQ ",
            "Franklin's",
        ]));
        assert_eq!(result.merged, strings(&["Franklin BBQ", "Franklin's"]));
        assert_eq!(result.duplicates_removed, 2);
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let first = remove_duplicates(&strings(&[
            "Pad Thai",
            "pad thai",
            "Pad See Ew",
            "PAD SEE EW",
            "Larb",
        ]));
        let second = remove_duplicates(&first.merged);
        assert_eq!(second.duplicates_removed, 0);
        assert_eq!(second.merged, first.merged);
    }

    #[test]
    fn test_duplicates_removed_matches_valid_minus_unique() {
        let inputs = strings(&["a", "A", " ", "b", "B ", "c", "a"]);
        let result = merge_aliases(&inputs, &[], &[], &AliasConfig::default());
        let valid_count = inputs.iter().filter(|s| !s.trim().is_empty()).count();
        assert_eq!(result.duplicates_removed, valid_count - result.merged.len());
    }

    #[test]
    fn test_dish_attribute_rejects_restaurant_terms() {
        let validation = validate_scope_constraints(
            EntityType::DishAttribute,
            &strings(&["smoky", "patio", "house-made"]),
            &AliasConfig::default(),
        );
        assert_eq!(validation.valid, strings(&["smoky", "house-made"]));
        assert_eq!(validation.violations, strings(&["patio"]));
    }

    #[test]
    fn test_restaurant_attribute_rejects_dish_terms() {
        let validation = validate_scope_constraints(
            EntityType::RestaurantAttribute,
            &strings(&["Extra Spicy", "cozy", "Gluten-Free options"]),
            &AliasConfig::default(),
        );
        assert_eq!(validation.valid, strings(&["cozy"]));
        assert_eq!(validation.violations, strings(&["Extra Spicy", "Gluten-Free options"]));
    }

    #[test]
    fn test_scope_validation_matches_substrings() {
        // "patios" contains "patio"; substring matching over-matches on purpose.
        let validation = validate_scope_constraints(
            EntityType::DishAttribute,
            &strings(&["patios"]),
            &AliasConfig::default(),
        );
        assert_eq!(validation.violations, strings(&["patios"]));
    }

    #[test]
    fn test_scope_validation_skipped_for_top_level_types_and_when_disabled() {
        let aliases = strings(&["patio", "spicy"]);
        for entity_type in [EntityType::Restaurant, EntityType::DishOrCategory] {
            let validation =
                validate_scope_constraints(entity_type, &aliases, &AliasConfig::default());
            assert_eq!(validation.valid, aliases);
            assert!(validation.violations.is_empty());
        }

        let disabled = AliasConfig {
            prevent_cross_scope: false,
            ..Default::default()
        };
        let validation = validate_scope_constraints(EntityType::DishAttribute, &aliases, &disabled);
        assert!(validation.violations.is_empty());
    }

    #[test]
    fn test_add_original_text_as_alias() {
        let config = AliasConfig::default();
        let existing = strings(&["Franklin BBQ"]);

        let added = add_original_text_as_alias(&existing, "Franklin Barbecue", &config);
        assert!(added.added);
        assert_eq!(added.aliases, strings(&["Franklin BBQ", "Franklin Barbecue"]));

        let repeat = add_original_text_as_alias(&existing, "  franklin bbq ", &config);
        assert!(!repeat.added);
        assert_eq!(repeat.aliases, existing);

        let blank = add_original_text_as_alias(&existing, "   ", &config);
        assert!(!blank.added);
        assert_eq!(blank.aliases, existing);
    }
}
