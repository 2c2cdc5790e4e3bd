// src/matching/fuzzy.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};

use crate::matching::similarity::compare_normalized;
use crate::matching::TierMatcher;
use crate::models::core::{CanonicalEntity, EntityType};
use crate::models::resolution::{ResolutionInput, ResolutionResult, ResolutionTier};
use crate::store::EntityStore;
use crate::utils::resolution_config::ResolutionConfig;

/// Tier 3: similarity search over the whole type partition.
///
/// Cost is inputs × catalog size × terms per pair, so this tier is meant for
/// the small residue the earlier tiers could not place. A term pair qualifies
/// when its similarity reaches the threshold and its edit distance stays
/// within the limit; the highest similarity wins and the first pair
/// encountered (catalog order, then entity terms, then input candidates)
/// wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatcher;

struct CatalogEntry<'a> {
    entity: &'a CanonicalEntity,
    terms: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct BestMatch<'a> {
    entity: &'a CanonicalEntity,
    similarity: f64,
}

fn best_match<'a>(
    candidates: &[String],
    catalog: &[CatalogEntry<'a>],
    threshold: f64,
    max_edit_distance: usize,
) -> Option<BestMatch<'a>> {
    let mut best: Option<BestMatch<'a>> = None;

    for entry in catalog {
        for term in &entry.terms {
            let term_len = term.chars().count();
            for candidate in candidates {
                // Levenshtein distance is at least the length difference.
                if term_len.abs_diff(candidate.chars().count()) > max_edit_distance {
                    continue;
                }
                let cmp = compare_normalized(candidate, term);
                if !cmp.qualifies(threshold, max_edit_distance) {
                    continue;
                }
                if best.map_or(true, |b| cmp.similarity > b.similarity) {
                    best = Some(BestMatch {
                        entity: entry.entity,
                        similarity: cmp.similarity,
                    });
                }
            }
        }
    }

    best
}

#[async_trait]
impl TierMatcher for FuzzyMatcher {
    fn tier(&self) -> ResolutionTier {
        ResolutionTier::Fuzzy
    }

    async fn find_matches(
        &self,
        store: &dyn EntityStore,
        entity_type: EntityType,
        inputs: &[ResolutionInput],
        config: &ResolutionConfig,
    ) -> Result<Vec<ResolutionResult>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let entities = store
            .find_all_by_type(entity_type)
            .await
            .context("Full catalog scan for fuzzy matching failed")?;
        info!(
            "[FUZZY] 🔍 Comparing {} unmatched {} inputs against {} catalog entities",
            inputs.len(),
            entity_type,
            entities.len()
        );

        let catalog: Vec<CatalogEntry> = entities
            .iter()
            .map(|entity| CatalogEntry {
                entity,
                terms: entity
                    .terms()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect(),
            })
            .collect();

        let mut matches = Vec::new();
        for input in inputs {
            let candidates: Vec<String> = input
                .candidate_strings()
                .iter()
                .map(|c| c.to_lowercase())
                .collect();
            if let Some(found) = best_match(
                &candidates,
                &catalog,
                config.fuzzy_match_threshold,
                config.max_edit_distance,
            ) {
                debug!(
                    "[FUZZY] {} → {} ('{}') similarity {:.3}",
                    input.temp_id, found.entity.id, found.entity.name, found.similarity
                );
                matches.push(ResolutionResult::matched(
                    input,
                    found.entity.id.clone(),
                    found.similarity,
                    ResolutionTier::Fuzzy,
                    found.entity.name.clone(),
                ));
            }
        }

        Ok(matches)
    }
}
