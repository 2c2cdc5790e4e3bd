// src/resolution/contextual.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use crate::errors::Result;
use crate::models::core::{AttributeScope, EntityId};
use crate::models::resolution::{BatchResolutionResult, ContextualAttributeInput, ResolutionInput};
use crate::resolution::resolver::EntityResolver;
use crate::utils::resolution_config::ResolutionConfigOverrides;

static NON_ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

/// Deterministic temp id for an attribute mentioned under a parent mention,
/// e.g. `mention-42::dish::extra-spicy`.
pub fn contextual_temp_id(
    parent_mention_id: &str,
    scope: AttributeScope,
    attribute_text: &str,
) -> String {
    let lowered = attribute_text.trim().to_lowercase();
    let slug = NON_ALNUM_RUN.replace_all(&lowered, "-");
    format!("{}::{}::{}", parent_mention_id, scope, slug.trim_matches('-'))
}

pub fn to_resolution_input(attribute: &ContextualAttributeInput) -> ResolutionInput {
    ResolutionInput {
        temp_id: attribute.temp_id.clone(),
        normalized_name: attribute.attribute_name.clone(),
        original_text: attribute.original_text.clone(),
        entity_type: attribute.scope.entity_type(),
        aliases: attribute.aliases.clone(),
    }
}

/// Resolved attribute ids split by the scope they were resolved under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextualResolution {
    pub dish_attribute_ids: HashMap<String, EntityId>,
    pub restaurant_attribute_ids: HashMap<String, EntityId>,
}

impl ContextualResolution {
    pub fn from_batch(
        attributes: &[ContextualAttributeInput],
        batch: &BatchResolutionResult,
    ) -> Self {
        let mut view = Self::default();
        for attribute in attributes {
            let Some(id) = batch.temp_id_to_entity_id.get(&attribute.temp_id) else {
                continue;
            };
            let target = match attribute.scope {
                AttributeScope::Dish => &mut view.dish_attribute_ids,
                AttributeScope::Restaurant => &mut view.restaurant_attribute_ids,
            };
            target.insert(attribute.temp_id.clone(), id.clone());
        }
        view
    }
}

impl EntityResolver {
    /// Resolves scope-tagged attributes: dish-scoped ones against
    /// `dish_attribute` entities, restaurant-scoped ones against
    /// `restaurant_attribute` entities.
    pub async fn resolve_contextual_attributes(
        &self,
        attributes: &[ContextualAttributeInput],
        overrides: Option<&ResolutionConfigOverrides>,
    ) -> Result<BatchResolutionResult> {
        let inputs: Vec<ResolutionInput> = attributes.iter().map(to_resolution_input).collect();
        self.resolve_batch(&inputs, overrides).await
    }
}
