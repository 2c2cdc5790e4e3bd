// src/matching/exact.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;

use crate::aliases::alias_set::alias_key;
use crate::matching::TierMatcher;
use crate::models::core::{EntityRef, EntityType};
use crate::models::resolution::{
    ResolutionInput, ResolutionResult, ResolutionTier, EXACT_MATCH_CONFIDENCE,
};
use crate::store::EntityStore;
use crate::utils::resolution_config::ResolutionConfig;

/// Tier 1: canonical name equality, ignoring case and surrounding whitespace.
/// Punctuation is significant.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

#[async_trait]
impl TierMatcher for ExactMatcher {
    fn tier(&self) -> ResolutionTier {
        ResolutionTier::Exact
    }

    async fn find_matches(
        &self,
        store: &dyn EntityStore,
        entity_type: EntityType,
        inputs: &[ResolutionInput],
        _config: &ResolutionConfig,
    ) -> Result<Vec<ResolutionResult>> {
        let names: Vec<String> = inputs
            .iter()
            .map(|input| input.normalized_name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let found = store
            .find_by_type_and_names_case_insensitive(entity_type, &names)
            .await
            .context("Exact name lookup failed")?;

        let mut by_name: HashMap<String, EntityRef> = HashMap::with_capacity(found.len());
        for entity in found {
            by_name.entry(alias_key(&entity.name)).or_insert(entity);
        }

        let matches: Vec<ResolutionResult> = inputs
            .iter()
            .filter_map(|input| {
                by_name.get(&alias_key(&input.normalized_name)).map(|entity| {
                    debug!("[EXACT] {} → {} ('{}')", input.temp_id, entity.id, entity.name);
                    ResolutionResult::matched(
                        input,
                        entity.id.clone(),
                        EXACT_MATCH_CONFIDENCE,
                        ResolutionTier::Exact,
                        entity.name.clone(),
                    )
                })
            })
            .collect();

        Ok(matches)
    }
}
