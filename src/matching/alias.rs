// src/matching/alias.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use std::collections::HashSet;

use crate::aliases::alias_set::alias_key;
use crate::matching::TierMatcher;
use crate::models::core::EntityType;
use crate::models::resolution::{
    ResolutionInput, ResolutionResult, ResolutionTier, ALIAS_MATCH_CONFIDENCE,
};
use crate::store::EntityStore;
use crate::utils::resolution_config::ResolutionConfig;

/// Tier 2: any of an input's candidate strings appears in an entity's alias
/// list. One bulk query covers every input in the partition.
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasMatcher;

#[async_trait]
impl TierMatcher for AliasMatcher {
    fn tier(&self) -> ResolutionTier {
        ResolutionTier::Alias
    }

    async fn find_matches(
        &self,
        store: &dyn EntityStore,
        entity_type: EntityType,
        inputs: &[ResolutionInput],
        _config: &ResolutionConfig,
    ) -> Result<Vec<ResolutionResult>> {
        let candidate_keys: Vec<HashSet<String>> = inputs
            .iter()
            .map(|input| input.candidate_strings().iter().map(|c| alias_key(c)).collect())
            .collect();

        let mut seen = HashSet::new();
        let all_candidates: Vec<String> = inputs
            .iter()
            .flat_map(|input| input.candidate_strings())
            .filter(|candidate| seen.insert(alias_key(candidate)))
            .collect();
        if all_candidates.is_empty() {
            return Ok(Vec::new());
        }

        let entities = store
            .find_by_type_with_any_alias(entity_type, &all_candidates)
            .await
            .context("Alias lookup failed")?;
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for (input, keys) in inputs.iter().zip(candidate_keys.iter()) {
            let hit = entities
                .iter()
                .find(|entity| entity.aliases.iter().any(|alias| keys.contains(&alias_key(alias))));
            if let Some(entity) = hit {
                debug!("[ALIAS] {} → {} ('{}')", input.temp_id, entity.id, entity.name);
                matches.push(ResolutionResult::matched(
                    input,
                    entity.id.clone(),
                    ALIAS_MATCH_CONFIDENCE,
                    ResolutionTier::Alias,
                    entity.name.clone(),
                ));
            }
        }

        Ok(matches)
    }
}
