// src/utils/db_connect.rs

use anyhow::{bail, Context, Result};
use bb8::Pool;
use bb8_postgres::PostgresConnectionManager;
use log::{info, warn};
use std::env;
use std::time::Duration;
use tokio_postgres::{Config, NoTls};

pub type PgPool = Pool<PostgresConnectionManager<NoTls>>;

const ENTITY_TABLE: &str = "public.canonical_entity";

/// Connection and pool settings read from `POSTGRES_*` variables.
#[derive(Clone)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub pool_max_size: u32,
    pub pool_min_idle: u32,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5432,
            dbname: "entity_resolution".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            pool_max_size: 10,
            pool_min_idle: 1,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}", key, raw);
            fallback
        }),
        Err(_) => fallback,
    }
}

impl DbSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let pool_max_size = env_or("POSTGRES_POOL_MAX_SIZE", defaults.pool_max_size).max(1);
        Self {
            host: env_or("POSTGRES_HOST", defaults.host),
            port: env_or("POSTGRES_PORT", defaults.port),
            dbname: env_or("POSTGRES_DB", defaults.dbname),
            user: env_or("POSTGRES_USER", defaults.user),
            password: env::var("POSTGRES_PASSWORD").unwrap_or_default(),
            pool_max_size,
            pool_min_idle: env_or("POSTGRES_POOL_MIN_IDLE", defaults.pool_min_idle)
                .min(pool_max_size),
        }
    }

    fn pg_config(&self) -> Config {
        let mut config = Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.dbname)
            .user(&self.user)
            .password(&self.password)
            .application_name("entity_resolution")
            .connect_timeout(Duration::from_secs(10));
        config
    }
}

/// Builds the pool and checks that the entity table is reachable.
pub async fn connect() -> Result<PgPool> {
    let settings = DbSettings::from_env();
    info!(
        "DB Config: Host={}, Port={}, DB={}, User={}, Pool={}..{}",
        settings.host,
        settings.port,
        settings.dbname,
        settings.user,
        settings.pool_min_idle,
        settings.pool_max_size
    );
    let manager = PostgresConnectionManager::new(settings.pg_config(), NoTls);

    let pool = Pool::builder()
        .max_size(settings.pool_max_size)
        .min_idle(Some(settings.pool_min_idle))
        .idle_timeout(Some(Duration::from_secs(180)))
        .connection_timeout(Duration::from_secs(15))
        .build(manager)
        .await
        .context("Failed to build database connection pool")?;

    check_entity_table(&pool).await?;
    info!("Database connection pool initialized successfully.");
    Ok(pool)
}

async fn check_entity_table(pool: &PgPool) -> Result<()> {
    let conn = pool
        .get()
        .await
        .context("Failed to get test connection from pool")?;
    let row = conn
        .query_one(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = 'canonical_entity'
            ) AS present",
            &[],
        )
        .await
        .context("Entity table check failed")?;
    let present: bool = row.get("present");
    if !present {
        bail!("Table {} does not exist", ENTITY_TABLE);
    }
    Ok(())
}

/// Returns (total connections, idle connections, in use).
pub fn get_pool_status(pool: &PgPool) -> (u32, u32, u32) {
    let state = pool.state();
    (
        state.connections,
        state.idle_connections,
        state.connections.saturating_sub(state.idle_connections),
    )
}
