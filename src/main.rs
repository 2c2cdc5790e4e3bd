// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use entity_resolution_lib::aliases::{AliasConfig, AliasManager};
use entity_resolution_lib::merge::MergeCoordinator;
use entity_resolution_lib::models::{
    BatchResolutionResult, ContextualAttributeInput, EntityId, EntityType, ResolutionInput,
};
use entity_resolution_lib::resolution::{ContextualResolution, EntityResolver};
use entity_resolution_lib::store::{EntityStore, PgEntityStore};
use entity_resolution_lib::utils::db_connect::{connect, get_pool_status};
use entity_resolution_lib::utils::env::load_env;
use entity_resolution_lib::utils::progress_bars::progress_config::ProgressConfig;
use entity_resolution_lib::utils::resolution_config::ResolutionConfigOverrides;

#[derive(Parser)]
/// Resolve restaurant, dish and attribute mentions to canonical entities
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a JSON array of resolution inputs
    Batch {
        #[arg(long)]
        input: PathBuf,
    },
    /// Resolve a JSON array of scope-tagged attribute inputs
    Attributes {
        #[arg(long)]
        input: PathBuf,
    },
    /// Fold the source entity's aliases into the target entity
    Merge {
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        /// restaurant, dish_or_category, dish_attribute or restaurant_attribute
        #[arg(long)]
        entity_type: EntityType,
    },
    /// Add a single alias to an entity
    AddAlias {
        #[arg(long)]
        entity: String,
        #[arg(long)]
        alias: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttributeReport {
    #[serde(flatten)]
    batch: BatchResolutionResult,
    by_scope: ContextualResolution,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", rendered);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let cli = Cli::parse();
    info!("Starting entity resolution");
    let start_time = Instant::now();
    load_env();

    let pool = connect().await.context("Failed to connect to database")?;
    let (connections, idle, in_use) = get_pool_status(&pool);
    info!(
        "Database pool ready: {} connections ({} idle, {} in use)",
        connections, idle, in_use
    );
    let store: Arc<dyn EntityStore> = Arc::new(PgEntityStore::new(pool));
    let alias_manager = AliasManager::new(AliasConfig::from_env());

    match cli.command {
        Command::Batch { input } => {
            let inputs: Vec<ResolutionInput> = read_json(&input)?;
            let overrides = ResolutionConfigOverrides::from_env();
            let resolver = EntityResolver::new(store)
                .with_alias_manager(alias_manager)
                .with_progress(ProgressConfig::from_env().create_multi_progress());
            let batch = resolver
                .resolve_batch(&inputs, Some(&overrides))
                .await
                .context("Batch resolution failed")?;
            print_json(&batch)?;
        }
        Command::Attributes { input } => {
            let attributes: Vec<ContextualAttributeInput> = read_json(&input)?;
            let overrides = ResolutionConfigOverrides::from_env();
            let resolver = EntityResolver::new(store)
                .with_alias_manager(alias_manager)
                .with_progress(ProgressConfig::from_env().create_multi_progress());
            let batch = resolver
                .resolve_contextual_attributes(&attributes, Some(&overrides))
                .await
                .context("Attribute resolution failed")?;
            let by_scope = ContextualResolution::from_batch(&attributes, &batch);
            print_json(&AttributeReport { batch, by_scope })?;
        }
        Command::Merge {
            source,
            target,
            entity_type,
        } => {
            let coordinator = MergeCoordinator::new(store).with_alias_manager(alias_manager);
            let outcome = coordinator
                .merge_entities(&EntityId::new(source), &EntityId::new(target), entity_type)
                .await
                .context("Entity merge failed")?;
            print_json(&outcome)?;
        }
        Command::AddAlias { entity, alias } => {
            let coordinator = MergeCoordinator::new(store).with_alias_manager(alias_manager);
            let outcome = coordinator
                .add_alias_to_entity(&EntityId::new(entity), &alias)
                .await
                .context("Adding alias failed")?;
            print_json(&outcome)?;
        }
    }

    info!("Finished in {:.2?}", start_time.elapsed());
    Ok(())
}
