// src/models/core.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ResolutionError;

/// Identifier of a canonical entity as assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Partition of the canonical entity catalog. Matching never crosses types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Restaurant,
    DishOrCategory,
    DishAttribute,
    RestaurantAttribute,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Restaurant,
        EntityType::DishOrCategory,
        EntityType::DishAttribute,
        EntityType::RestaurantAttribute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Restaurant => "restaurant",
            EntityType::DishOrCategory => "dish_or_category",
            EntityType::DishAttribute => "dish_attribute",
            EntityType::RestaurantAttribute => "restaurant_attribute",
        }
    }

    /// Attribute types carry a scope; top-level entities do not.
    pub fn scope(&self) -> Option<AttributeScope> {
        match self {
            EntityType::DishAttribute => Some(AttributeScope::Dish),
            EntityType::RestaurantAttribute => Some(AttributeScope::Restaurant),
            EntityType::Restaurant | EntityType::DishOrCategory => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| ResolutionError::Validation(format!("Unsupported entity type: '{}'", s)))
    }
}

/// Which side of the catalog a contextual attribute belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeScope {
    Dish,
    Restaurant,
}

impl AttributeScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeScope::Dish => "dish",
            AttributeScope::Restaurant => "restaurant",
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            AttributeScope::Dish => EntityType::DishAttribute,
            AttributeScope::Restaurant => EntityType::RestaurantAttribute,
        }
    }
}

impl fmt::Display for AttributeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authoritative record that mentions resolve to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub id: EntityId,
    pub name: String,
    pub entity_type: EntityType,
    pub aliases: Vec<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl CanonicalEntity {
    /// Name followed by every alias, in stored order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn to_ref(&self) -> EntityRef {
        EntityRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Minimal projection returned by name lookups and creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub name: String,
}
