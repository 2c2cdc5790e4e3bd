// src/models/stats_models.rs
use serde::Serialize;
use std::time::Duration;

use crate::models::resolution::{ResolutionResult, ResolutionTier};

/// Result counts keyed by the tier that produced them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCounts {
    pub exact: usize,
    pub alias: usize,
    pub fuzzy: usize,
    pub new: usize,
    pub unmatched: usize,
}

impl TierCounts {
    pub fn record(&mut self, tier: ResolutionTier) {
        match tier {
            ResolutionTier::Exact => self.exact += 1,
            ResolutionTier::Alias => self.alias += 1,
            ResolutionTier::Fuzzy => self.fuzzy += 1,
            ResolutionTier::New => self.new += 1,
            ResolutionTier::Unmatched => self.unmatched += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.exact + self.alias + self.fuzzy + self.new + self.unmatched
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetrics {
    pub total_inputs: usize,
    pub tier_counts: TierCounts,
    pub new_entities_created: usize,
    pub creation_failures: usize,
    pub chunks_processed: usize,
    pub processing_time_ms: u64,
    pub average_confidence: f64,
}

impl ResolutionMetrics {
    /// Aggregates over the final result stream. Elapsed time is clamped to at
    /// least one millisecond; mean confidence is rounded to two decimals.
    pub fn from_results(
        results: &[ResolutionResult],
        chunks_processed: usize,
        elapsed: Duration,
    ) -> Self {
        let mut tier_counts = TierCounts::default();
        let mut new_entities_created = 0;
        let mut creation_failures = 0;
        for result in results {
            tier_counts.record(result.resolution_tier);
            if result.resolution_tier == ResolutionTier::New {
                if result.is_resolved() {
                    new_entities_created += 1;
                } else {
                    creation_failures += 1;
                }
            }
        }

        let average_confidence = if results.is_empty() {
            0.0
        } else {
            let mean = results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64;
            (mean * 100.0).round() / 100.0
        };

        Self {
            total_inputs: results.len(),
            tier_counts,
            new_entities_created,
            creation_failures,
            chunks_processed,
            processing_time_ms: (elapsed.as_millis() as u64).max(1),
            average_confidence,
        }
    }
}
