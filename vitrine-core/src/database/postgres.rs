use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tracing::info;

use crate::database::infrastructure::postgres::{
    PostgresMaintenanceRepository, PostgresOrdersRepository,
    PostgresProductColorsRepository, PostgresStatisticsRepository,
};
use crate::error::Result;

/// Statistics about the connection pool
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max_size: u32,
    pub min_idle: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    settings: PoolSettings,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.settings.max_connections)
            .field("min_connections", &self.settings.min_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn new(
        connection_string: &str,
        settings: PoolSettings,
    ) -> Result<Self> {
        let connect_options = PgConnectOptions::from_str(connection_string)?;
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout)
            .max_lifetime(Duration::from_secs(1800)) // 30 min lifetime
            .idle_timeout(Duration::from_secs(600)) // 10 min idle timeout
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await?;

        info!(
            "Database pool initialized with max_connections={}, \
             min_connections={}",
            settings.max_connections, settings.min_connections
        );

        Ok(Self { pool, settings })
    }

    /// Wrap an existing pool (used by `sqlx::test`).
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            settings: PoolSettings::default(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle() as u32,
            max_size: self.settings.max_connections,
            min_idle: self.settings.min_connections,
        }
    }

    /// Apply the embedded migrations.
    pub async fn initialize_schema(&self) -> Result<()> {
        crate::MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn product_colors(&self) -> PostgresProductColorsRepository {
        PostgresProductColorsRepository::new(self.pool.clone())
    }

    pub fn orders(&self) -> PostgresOrdersRepository {
        PostgresOrdersRepository::new(self.pool.clone())
    }

    pub fn statistics(&self) -> PostgresStatisticsRepository {
        PostgresStatisticsRepository::new(self.pool.clone())
    }

    pub fn maintenance(&self) -> PostgresMaintenanceRepository {
        PostgresMaintenanceRepository::new(self.pool.clone())
    }
}
