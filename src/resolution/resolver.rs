// src/resolution/resolver.rs
use indicatif::MultiProgress;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crate::aliases::AliasManager;
use crate::errors::{ResolutionError, Result};
use crate::matching::{AliasMatcher, ExactMatcher, FuzzyMatcher, TierMatcher};
use crate::models::core::{EntityRef, EntityType};
use crate::models::resolution::{
    BatchResolutionResult, ResolutionInput, ResolutionResult, ResolutionTier, NEW_ENTITY_CONFIDENCE,
};
use crate::models::stats_models::ResolutionMetrics;
use crate::resolution::assembly::ResultAssembler;
use crate::store::{CreatorRegistry, EntityStore};
use crate::utils::progress_bars::logging::ResolutionLogger;
use crate::utils::progress_bars::progress_config::chunk_progress_bar;
use crate::utils::resolution_config::{ResolutionConfig, ResolutionConfigOverrides};

/// Batch coordinator for the tiered resolution pipeline.
///
/// Chunks are processed sequentially and, within a chunk, type partitions
/// are processed one after another to bound concurrent store load. A failed
/// bulk lookup aborts the whole call; a failed creation only marks its own
/// input with a null entity id.
///
/// Concurrent calls are not serialized against each other: two batches that
/// both miss on the same name will each create an entity.
pub struct EntityResolver {
    store: Arc<dyn EntityStore>,
    creators: CreatorRegistry,
    alias_manager: AliasManager,
    base_config: ResolutionConfig,
    multi_progress: Option<MultiProgress>,
}

impl EntityResolver {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            creators: CreatorRegistry::for_store(store.clone()),
            store,
            alias_manager: AliasManager::default(),
            base_config: ResolutionConfig::default(),
            multi_progress: None,
        }
    }

    pub fn with_alias_manager(mut self, alias_manager: AliasManager) -> Self {
        self.alias_manager = alias_manager;
        self
    }

    pub fn with_creators(mut self, creators: CreatorRegistry) -> Self {
        self.creators = creators;
        self
    }

    /// Replaces the defaults that per-call overrides are merged onto.
    pub fn with_base_config(mut self, base_config: ResolutionConfig) -> Self {
        self.base_config = base_config;
        self
    }

    pub fn with_progress(mut self, multi_progress: Option<MultiProgress>) -> Self {
        self.multi_progress = multi_progress;
        self
    }

    /// Resolves every input to a canonical entity, creating entities for
    /// inputs no tier could place. Exactly one result is returned per input,
    /// in input order.
    pub async fn resolve_batch(
        &self,
        inputs: &[ResolutionInput],
        overrides: Option<&ResolutionConfigOverrides>,
    ) -> Result<BatchResolutionResult> {
        let config = match overrides {
            Some(overrides) => self.base_config.with_overrides(overrides),
            None => self.base_config.clone(),
        };
        config.validate()?;
        check_unique_temp_ids(inputs)?;

        let start = Instant::now();
        let logger = ResolutionLogger::new("RESOLVE");
        let total_chunks = inputs.len().div_ceil(config.batch_size);
        logger.log_start(inputs.len(), total_chunks, &config);

        let progress_bar = self
            .multi_progress
            .as_ref()
            .map(|mp| chunk_progress_bar(mp, total_chunks));

        let mut results = Vec::with_capacity(inputs.len());
        for (chunk_idx, chunk) in inputs.chunks(config.batch_size).enumerate() {
            logger.log_chunk_progress(chunk_idx + 1, total_chunks, chunk.len());
            let chunk_results = match self.resolve_chunk(chunk, &config, &logger).await {
                Ok(chunk_results) => chunk_results,
                Err(e) => {
                    if let Some(pb) = &progress_bar {
                        pb.abandon_with_message("Resolution aborted");
                    }
                    return Err(e);
                }
            };
            results.extend(chunk_results);
            if let Some(pb) = &progress_bar {
                pb.inc(1);
            }
        }
        if let Some(pb) = &progress_bar {
            pb.finish_with_message(format!("Resolved {} inputs", inputs.len()));
        }

        let metrics = ResolutionMetrics::from_results(&results, total_chunks, start.elapsed());
        logger.log_completion(&metrics);

        let temp_id_to_entity_id = results
            .iter()
            .filter_map(|r| r.entity_id.clone().map(|id| (r.temp_id.clone(), id)))
            .collect();

        Ok(BatchResolutionResult {
            temp_id_to_entity_id,
            new_entities_created: metrics.new_entities_created,
            results,
            metrics,
        })
    }

    async fn resolve_chunk(
        &self,
        chunk: &[ResolutionInput],
        config: &ResolutionConfig,
        logger: &ResolutionLogger,
    ) -> Result<Vec<ResolutionResult>> {
        let mut partitions: Vec<(EntityType, Vec<ResolutionInput>)> = Vec::new();
        for input in chunk {
            match partitions.iter_mut().find(|(t, _)| *t == input.entity_type) {
                Some((_, members)) => members.push(input.clone()),
                None => partitions.push((input.entity_type, vec![input.clone()])),
            }
        }

        let mut by_temp_id: HashMap<String, ResolutionResult> = HashMap::with_capacity(chunk.len());
        for (entity_type, members) in partitions {
            logger.log_partition(entity_type, members.len());
            for result in self.resolve_partition(entity_type, members, config, logger).await? {
                by_temp_id.insert(result.temp_id.clone(), result);
            }
        }

        Ok(chunk
            .iter()
            .map(|input| {
                by_temp_id
                    .remove(&input.temp_id)
                    .unwrap_or_else(|| ResolutionResult::unmatched(input))
            })
            .collect())
    }

    async fn resolve_partition(
        &self,
        entity_type: EntityType,
        inputs: Vec<ResolutionInput>,
        config: &ResolutionConfig,
        logger: &ResolutionLogger,
    ) -> Result<Vec<ResolutionResult>> {
        let mut assembler = ResultAssembler::new(inputs);

        let mut matchers: Vec<&dyn TierMatcher> = vec![&ExactMatcher, &AliasMatcher];
        if config.enable_fuzzy_matching {
            matchers.push(&FuzzyMatcher);
        }

        for matcher in matchers {
            let remaining = assembler.unresolved();
            if remaining.is_empty() {
                break;
            }
            let tier = matcher.tier();
            let matches = match matcher
                .find_matches(self.store.as_ref(), entity_type, &remaining, config)
                .await
            {
                Ok(matches) => matches,
                Err(source) => {
                    logger.log_tier_failure(tier, entity_type, &source);
                    return Err(ResolutionError::StoreQuery {
                        tier,
                        entity_type,
                        source,
                    });
                }
            };
            let inserted = assembler.insert_all(matches);
            logger.log_tier_result(tier, entity_type, inserted, remaining.len());
        }

        let remaining = assembler.unresolved();
        if !remaining.is_empty() {
            let created = self.create_new_entities(&remaining, logger).await;
            let resolved = created.iter().filter(|r| r.is_resolved()).count();
            assembler.insert_all(created);
            logger.log_tier_result(ResolutionTier::New, entity_type, resolved, remaining.len());
        }

        Ok(assembler.finish())
    }

    /// Creates one entity per input. Failures are captured per item.
    async fn create_new_entities(
        &self,
        inputs: &[ResolutionInput],
        logger: &ResolutionLogger,
    ) -> Vec<ResolutionResult> {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = match self.create_entity_for(input).await {
                Ok(entity) => {
                    debug!("[NEW] {} → {} ('{}')", input.temp_id, entity.id, entity.name);
                    ResolutionResult::matched(
                        input,
                        entity.id,
                        NEW_ENTITY_CONFIDENCE,
                        ResolutionTier::New,
                        entity.name,
                    )
                }
                Err(err) => {
                    logger.log_creation_failure(&input.temp_id, &input.normalized_name, &err);
                    ResolutionResult::creation_failed(input, err.to_string())
                }
            };
            results.push(result);
        }
        results
    }

    async fn create_entity_for(&self, input: &ResolutionInput) -> Result<EntityRef> {
        let name = [input.normalized_name.trim(), input.original_text.trim()]
            .into_iter()
            .find(|n| !n.is_empty())
            .ok_or_else(|| {
                ResolutionError::Validation(format!(
                    "Input {} has no name to create an entity from",
                    input.temp_id
                ))
            })?
            .to_string();

        let creator = self.creators.get(input.entity_type)?;
        let aliases = self
            .alias_manager
            .prepare_new_entity_aliases(input.entity_type, &input.aliases, &input.original_text)
            .valid;

        creator
            .create(&name, &aliases)
            .await
            .map_err(|source| ResolutionError::EntityCreation {
                temp_id: input.temp_id.clone(),
                name: name.clone(),
                source,
            })
    }
}

fn check_unique_temp_ids(inputs: &[ResolutionInput]) -> Result<()> {
    let mut seen = HashSet::with_capacity(inputs.len());
    let duplicates: Vec<&str> = inputs
        .iter()
        .filter(|input| !seen.insert(input.temp_id.as_str()))
        .map(|input| input.temp_id.as_str())
        .collect();
    if duplicates.is_empty() {
        Ok(())
    } else {
        warn!("Rejecting batch with duplicate temp ids: {:?}", duplicates);
        Err(ResolutionError::Validation(format!(
            "Duplicate temp ids in batch: {}",
            duplicates.join(", ")
        )))
    }
}
