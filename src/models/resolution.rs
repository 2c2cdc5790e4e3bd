// src/models/resolution.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::models::core::{AttributeScope, EntityId, EntityType};
use crate::models::stats_models::ResolutionMetrics;
use crate::utils::resolution_config::ConfidenceThresholds;

pub const EXACT_MATCH_CONFIDENCE: f64 = 1.0;
pub const ALIAS_MATCH_CONFIDENCE: f64 = 0.95;
pub const NEW_ENTITY_CONFIDENCE: f64 = 1.0;
pub const FAILED_CREATION_CONFIDENCE: f64 = 0.0;

/// One raw mention to resolve. `temp_id` must be unique within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionInput {
    pub temp_id: String,
    pub normalized_name: String,
    pub original_text: String,
    pub entity_type: EntityType,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ResolutionInput {
    pub fn new(
        temp_id: impl Into<String>,
        normalized_name: impl Into<String>,
        original_text: impl Into<String>,
        entity_type: EntityType,
    ) -> Self {
        Self {
            temp_id: temp_id.into(),
            normalized_name: normalized_name.into(),
            original_text: original_text.into(),
            entity_type,
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// `{normalized_name, original_text} ∪ aliases`, trimmed, blanks dropped,
    /// first occurrence wins on case-insensitive repeats.
    pub fn candidate_strings(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        std::iter::once(&self.normalized_name)
            .chain(std::iter::once(&self.original_text))
            .chain(self.aliases.iter())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.to_lowercase()))
            .map(str::to_string)
            .collect()
    }
}

/// Pipeline stage that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionTier {
    Exact,
    Alias,
    Fuzzy,
    New,
    Unmatched,
}

impl ResolutionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTier::Exact => "exact",
            ResolutionTier::Alias => "alias",
            ResolutionTier::Fuzzy => "fuzzy",
            ResolutionTier::New => "new",
            ResolutionTier::Unmatched => "unmatched",
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
    Insufficient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub temp_id: String,
    pub entity_id: Option<EntityId>,
    pub confidence: f64,
    pub resolution_tier: ResolutionTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
    pub original_input: ResolutionInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolutionResult {
    pub fn matched(
        input: &ResolutionInput,
        entity_id: EntityId,
        confidence: f64,
        tier: ResolutionTier,
        matched_name: impl Into<String>,
    ) -> Self {
        Self {
            temp_id: input.temp_id.clone(),
            entity_id: Some(entity_id),
            confidence,
            resolution_tier: tier,
            matched_name: Some(matched_name.into()),
            original_input: input.clone(),
            error: None,
        }
    }

    pub fn creation_failed(input: &ResolutionInput, error: String) -> Self {
        Self {
            temp_id: input.temp_id.clone(),
            entity_id: None,
            confidence: FAILED_CREATION_CONFIDENCE,
            resolution_tier: ResolutionTier::New,
            matched_name: None,
            original_input: input.clone(),
            error: Some(error),
        }
    }

    pub fn unmatched(input: &ResolutionInput) -> Self {
        Self {
            temp_id: input.temp_id.clone(),
            entity_id: None,
            confidence: 0.0,
            resolution_tier: ResolutionTier::Unmatched,
            matched_name: None,
            original_input: input.clone(),
            error: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.entity_id.is_some()
    }

    /// Informational classification; tiers never consult these bands.
    pub fn confidence_band(&self, thresholds: &ConfidenceThresholds) -> ConfidenceBand {
        if self.confidence >= thresholds.high {
            ConfidenceBand::High
        } else if self.confidence >= thresholds.medium {
            ConfidenceBand::Medium
        } else if self.confidence >= thresholds.low {
            ConfidenceBand::Low
        } else {
            ConfidenceBand::Insufficient
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResolutionResult {
    /// Only inputs that ended up with an entity id.
    pub temp_id_to_entity_id: HashMap<String, EntityId>,
    pub results: Vec<ResolutionResult>,
    pub new_entities_created: usize,
    pub metrics: ResolutionMetrics,
}

impl BatchResolutionResult {
    pub fn result_for(&self, temp_id: &str) -> Option<&ResolutionResult> {
        self.results.iter().find(|r| r.temp_id == temp_id)
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &ResolutionResult> {
        self.results.iter().filter(|r| !r.is_resolved())
    }
}

/// Scope-tagged attribute mention, mapped 1:1 onto a `ResolutionInput`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextualAttributeInput {
    pub temp_id: String,
    pub attribute_name: String,
    pub original_text: String,
    pub scope: AttributeScope,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_strings_dedupe_and_drop_blanks() {
        let input = ResolutionInput::new("t1", "Ramen", "ramen", EntityType::DishOrCategory)
            .with_aliases(vec!["  ".into(), "Tonkotsu Ramen".into(), "RAMEN".into()]);
        assert_eq!(input.candidate_strings(), vec!["Ramen", "Tonkotsu Ramen"]);
    }

    #[test]
    fn test_confidence_band_classification() {
        let input = ResolutionInput::new("t1", "Tacos", "tacos", EntityType::DishOrCategory);
        let thresholds = ConfidenceThresholds::default();

        let mut result = ResolutionResult::matched(
            &input,
            EntityId::from("e1"),
            0.95,
            ResolutionTier::Alias,
            "Tacos",
        );
        assert_eq!(result.confidence_band(&thresholds), ConfidenceBand::High);

        result.confidence = 0.72;
        assert_eq!(result.confidence_band(&thresholds), ConfidenceBand::Medium);

        result.confidence = 0.1;
        assert_eq!(result.confidence_band(&thresholds), ConfidenceBand::Insufficient);
    }

    #[test]
    fn test_input_deserializes_from_camel_case() {
        let json = r#"{
            "tempId": "m1",
            "normalizedName": "Franklin BBQ",
            "originalText": "franklin bbq",
            "entityType": "restaurant"
        }"#;
        let input: ResolutionInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.entity_type, EntityType::Restaurant);
        assert!(input.aliases.is_empty());
    }
}
