// src/store/postgres.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::debug;
use tokio_postgres::Row as PgRow;
use uuid::Uuid;

use crate::aliases::alias_set::alias_key;
use crate::models::core::{CanonicalEntity, EntityId, EntityRef, EntityType};
use crate::store::EntityStore;
use crate::utils::db_connect::PgPool;

const ENTITY_COLUMNS: &str = "id, name, entity_type, aliases, created_at, updated_at";

/// `EntityStore` over `public.canonical_entity`.
///
/// Expected schema:
/// ```sql
/// CREATE TABLE public.canonical_entity (
///     id TEXT PRIMARY KEY,
///     name TEXT NOT NULL,
///     entity_type TEXT NOT NULL,
///     aliases TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
///     updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn lowered(values: &[String]) -> Vec<String> {
    values.iter().map(|v| alias_key(v)).filter(|v| !v.is_empty()).collect()
}

fn row_to_entity(row: &PgRow) -> Result<CanonicalEntity> {
    let type_str: String = row.get("entity_type");
    let entity_type = type_str
        .parse::<EntityType>()
        .map_err(|e| anyhow!("Row has invalid entity_type: {}", e))?;
    Ok(CanonicalEntity {
        id: EntityId(row.get("id")),
        name: row.get("name"),
        entity_type,
        aliases: row.get::<_, Option<Vec<String>>>("aliases").unwrap_or_default(),
        created_at: row.get::<_, Option<NaiveDateTime>>("created_at"),
        updated_at: row.get::<_, Option<NaiveDateTime>>("updated_at"),
    })
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn find_by_type_and_names_case_insensitive(
        &self,
        entity_type: EntityType,
        names: &[String],
    ) -> Result<Vec<EntityRef>> {
        let keys = lowered(names);
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self
            .pool
            .get()
            .await
            .context("Failed to get DB connection for exact name lookup")?;

        let rows = conn
            .query(
                "SELECT id, name FROM public.canonical_entity
                 WHERE entity_type = $1 AND LOWER(TRIM(name)) = ANY($2)
                 ORDER BY created_at, id",
                &[&entity_type.as_str(), &keys],
            )
            .await
            .context("Failed to query canonical entities by name")?;

        debug!("Exact lookup for {} names returned {} rows", keys.len(), rows.len());
        Ok(rows
            .iter()
            .map(|row| EntityRef {
                id: EntityId(row.get("id")),
                name: row.get("name"),
            })
            .collect())
    }

    async fn find_by_type_with_any_alias(
        &self,
        entity_type: EntityType,
        candidates: &[String],
    ) -> Result<Vec<CanonicalEntity>> {
        let keys = lowered(candidates);
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self
            .pool
            .get()
            .await
            .context("Failed to get DB connection for alias lookup")?;

        let query = format!(
            "SELECT {} FROM public.canonical_entity ce
             WHERE ce.entity_type = $1
               AND EXISTS (
                   SELECT 1 FROM unnest(ce.aliases) AS a(alias)
                   WHERE LOWER(TRIM(a.alias)) = ANY($2)
               )
             ORDER BY ce.created_at, ce.id",
            ENTITY_COLUMNS
        );
        let rows = conn
            .query(query.as_str(), &[&entity_type.as_str(), &keys])
            .await
            .context("Failed to query canonical entities by alias")?;

        debug!("Alias lookup for {} candidates returned {} rows", keys.len(), rows.len());
        rows.iter().map(row_to_entity).collect()
    }

    async fn find_all_by_type(&self, entity_type: EntityType) -> Result<Vec<CanonicalEntity>> {
        let conn = self
            .pool
            .get()
            .await
            .context("Failed to get DB connection for full type scan")?;

        let query = format!(
            "SELECT {} FROM public.canonical_entity WHERE entity_type = $1 ORDER BY created_at, id",
            ENTITY_COLUMNS
        );
        let rows = conn
            .query(query.as_str(), &[&entity_type.as_str()])
            .await
            .context(format!("Failed to scan canonical entities of type {}", entity_type))?;

        rows.iter().map(row_to_entity).collect()
    }

    async fn create_entity(
        &self,
        entity_type: EntityType,
        name: &str,
        aliases: &[String],
    ) -> Result<EntityRef> {
        let conn = self
            .pool
            .get()
            .await
            .context("Failed to get DB connection for create_entity")?;

        let id = Uuid::new_v4().to_string();
        let aliases = aliases.to_vec();
        conn.execute(
            "INSERT INTO public.canonical_entity
             (id, name, entity_type, aliases, created_at, updated_at)
             VALUES ($1, $2, $3, $4, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
            &[&id, &name, &entity_type.as_str(), &aliases],
        )
        .await
        .context(format!("Failed to insert canonical entity '{}'", name))?;

        debug!("[{}] Inserted canonical entity {} ('{}')", entity_type, id, name);
        Ok(EntityRef {
            id: EntityId(id),
            name: name.to_string(),
        })
    }

    async fn fetch_entity(&self, id: &EntityId) -> Result<Option<CanonicalEntity>> {
        let conn = self
            .pool
            .get()
            .await
            .context("Failed to get DB connection for fetch_entity")?;

        let query = format!("SELECT {} FROM public.canonical_entity WHERE id = $1", ENTITY_COLUMNS);
        let row = conn
            .query_opt(query.as_str(), &[&id.as_str()])
            .await
            .context(format!("Failed to fetch canonical entity {}", id))?;

        row.as_ref().map(row_to_entity).transpose()
    }

    async fn update_entity_aliases(
        &self,
        id: &EntityId,
        aliases: &[String],
    ) -> Result<CanonicalEntity> {
        let conn = self
            .pool
            .get()
            .await
            .context("Failed to get DB connection for update_entity_aliases")?;

        let aliases = aliases.to_vec();
        let query = format!(
            "UPDATE public.canonical_entity SET aliases = $1, updated_at = CURRENT_TIMESTAMP
             WHERE id = $2 RETURNING {}",
            ENTITY_COLUMNS
        );
        let row = conn
            .query_opt(query.as_str(), &[&aliases, &id.as_str()])
            .await
            .context(format!("Failed to update aliases for canonical entity {}", id))?
            .ok_or_else(|| anyhow!("Canonical entity {} not found for alias update", id))?;

        row_to_entity(&row)
    }
}
