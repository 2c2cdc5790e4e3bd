// src/utils/progress_bars/logging.rs - Logging helpers for the resolution pipeline
use log::{error, info, warn};
use std::time::Instant;

use crate::models::core::EntityType;
use crate::models::resolution::ResolutionTier;
use crate::models::stats_models::ResolutionMetrics;
use crate::utils::resolution_config::ResolutionConfig;

fn tier_tag(tier: ResolutionTier) -> (&'static str, &'static str) {
    match tier {
        ResolutionTier::Exact => ("EXACT", "🎯"),
        ResolutionTier::Alias => ("ALIAS", "🔗"),
        ResolutionTier::Fuzzy => ("FUZZY", "🔍"),
        ResolutionTier::New => ("NEW", "✨"),
        ResolutionTier::Unmatched => ("UNMATCHED", "❔"),
    }
}

#[derive(Clone)]
pub struct ResolutionLogger {
    operation: &'static str,
    start_time: Instant,
}

impl ResolutionLogger {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, total_inputs: usize, chunk_count: usize, config: &ResolutionConfig) {
        info!(
            "[{}] 🚀 Resolving {} inputs in {} chunk(s) (batch size: {})",
            self.operation, total_inputs, chunk_count, config.batch_size
        );
        info!(
            "[{}] ⚙️  Configuration: fuzzy {} (threshold {:.2}, max edit distance {})",
            self.operation,
            if config.enable_fuzzy_matching { "enabled" } else { "disabled" },
            config.fuzzy_match_threshold,
            config.max_edit_distance
        );
    }

    pub fn log_chunk_progress(
        &self,
        chunk_num: usize,
        total_chunks: usize,
        inputs_in_chunk: usize,
    ) {
        if chunk_num % 5 == 0 || chunk_num == 1 || chunk_num == total_chunks {
            info!(
                "[{}] 📦 Processing chunk {}/{} ({} inputs) [+{:.1}s]",
                self.operation,
                chunk_num,
                total_chunks,
                inputs_in_chunk,
                self.start_time.elapsed().as_secs_f32()
            );
        }
    }

    pub fn log_partition(&self, entity_type: EntityType, count: usize) {
        info!("[{}] 🗂️  Partition {}: {} inputs", self.operation, entity_type, count);
    }

    pub fn log_tier_result(
        &self,
        tier: ResolutionTier,
        entity_type: EntityType,
        matched: usize,
        attempted: usize,
    ) {
        let (name, emoji) = tier_tag(tier);
        info!(
            "[{}] {} {} tier matched {}/{} {} inputs",
            name, emoji, name.to_lowercase(), matched, attempted, entity_type
        );
    }

    pub fn log_tier_failure(
        &self,
        tier: ResolutionTier,
        entity_type: EntityType,
        err: &anyhow::Error,
    ) {
        let (name, emoji) = tier_tag(tier);
        error!(
            "[{}] {} ❌ Bulk lookup failed for {} partition, aborting batch: {:#}",
            name, emoji, entity_type, err
        );
    }

    pub fn log_creation_failure(&self, temp_id: &str, name: &str, err: &dyn std::fmt::Display) {
        warn!(
            "[NEW] ✨ ⚠️  Could not create entity '{}' for {}: {}. Continuing.",
            name, temp_id, err
        );
    }

    pub fn log_completion(&self, metrics: &ResolutionMetrics) {
        let counts = &metrics.tier_counts;
        info!(
            "[{}] 🎉 COMPLETED: {} inputs resolved in {} ms across {} chunk(s)",
            self.operation,
            metrics.total_inputs,
            metrics.processing_time_ms,
            metrics.chunks_processed
        );
        info!(
            "[{}] 📊 Tiers: {} exact, {} alias, {} fuzzy, {} new, {} unmatched; avg conf {:.2}",
            self.operation, counts.exact, counts.alias, counts.fuzzy, counts.new, counts.unmatched,
            metrics.average_confidence
        );
        if metrics.creation_failures > 0 {
            warn!(
                "[{}] ⚠️  {} entity creation(s) failed; affected inputs carry a null entity id",
                self.operation, metrics.creation_failures
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tier_has_a_tag() {
        for tier in [
            ResolutionTier::Exact,
            ResolutionTier::Alias,
            ResolutionTier::Fuzzy,
            ResolutionTier::New,
            ResolutionTier::Unmatched,
        ] {
            let (name, _) = tier_tag(tier);
            assert_eq!(name.to_lowercase(), tier.as_str());
        }
    }
}
