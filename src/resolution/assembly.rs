// src/resolution/assembly.rs
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

use crate::models::resolution::{ResolutionInput, ResolutionResult};

/// Collects tier outputs for one partition keyed by `temp_id`.
///
/// Tiers must be fed in priority order (exact, alias, fuzzy, new); the first
/// result recorded for a `temp_id` is final. `finish` yields exactly one
/// result per input, in input order.
#[derive(Debug)]
pub struct ResultAssembler {
    inputs: Vec<ResolutionInput>,
    temp_ids: HashSet<String>,
    entries: HashMap<String, ResolutionResult>,
}

impl ResultAssembler {
    pub fn new(inputs: Vec<ResolutionInput>) -> Self {
        let temp_ids = inputs.iter().map(|i| i.temp_id.clone()).collect();
        let capacity = inputs.len();
        Self {
            inputs,
            temp_ids,
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Returns false when the `temp_id` already has a result or does not
    /// belong to this partition.
    pub fn insert(&mut self, result: ResolutionResult) -> bool {
        if !self.temp_ids.contains(&result.temp_id) {
            warn!("Ignoring result for unknown temp_id {}", result.temp_id);
            return false;
        }
        if self.entries.contains_key(&result.temp_id) {
            debug!(
                "Keeping earlier result for {}; dropping {} result",
                result.temp_id, result.resolution_tier
            );
            return false;
        }
        self.entries.insert(result.temp_id.clone(), result);
        true
    }

    pub fn insert_all(&mut self, results: Vec<ResolutionResult>) -> usize {
        let mut inserted = 0;
        for result in results {
            if self.insert(result) {
                inserted += 1;
            }
        }
        inserted
    }

    /// Inputs that no tier has claimed yet, in input order.
    pub fn unresolved(&self) -> Vec<ResolutionInput> {
        self.inputs
            .iter()
            .filter(|input| !self.entries.contains_key(&input.temp_id))
            .cloned()
            .collect()
    }

    pub fn finish(mut self) -> Vec<ResolutionResult> {
        self.inputs
            .iter()
            .map(|input| {
                self.entries
                    .remove(&input.temp_id)
                    .unwrap_or_else(|| ResolutionResult::unmatched(input))
            })
            .collect()
    }
}
