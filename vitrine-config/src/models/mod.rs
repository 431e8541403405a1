pub mod sources;
pub mod validation;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_DB_MIN_CONNECTIONS: u32 = 2;
pub const DEFAULT_REDIS_NAMESPACE: &str = "vitrine-cache";
pub const DEFAULT_REDIS_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_LISTING_CACHE_TTL_SECS: u64 = 5 * 60;
pub const DEFAULT_COUNT_CACHE_TTL_SECS: u64 = 30 * 60;
pub const DEFAULT_PRODUCT_COLORS_LIMIT: u32 = 12;
pub const DEFAULT_ORDERS_LIMIT: u32 = 10;
pub const DEFAULT_MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// `None` disables the listing cache.
    pub redis: Option<RedisConfig>,
    pub listing: ListingConfig,
    pub cors: CorsConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub primary_url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub namespace: String,
    pub connect_timeout: Duration,
    pub response_timeout: Duration,
}

/// Cache lifetimes and page-size bounds of the listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingConfig {
    /// Lifetime of cached pages and of exact filtered counts.
    pub cache_ttl: Duration,
    /// Lifetime of cached statistics-based counts.
    pub count_cache_ttl: Duration,
    pub product_colors_default_limit: u32,
    pub orders_default_limit: u32,
    pub max_limit: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_LISTING_CACHE_TTL_SECS),
            count_cache_ttl: Duration::from_secs(DEFAULT_COUNT_CACHE_TTL_SECS),
            product_colors_default_limit: DEFAULT_PRODUCT_COLORS_LIMIT,
            orders_default_limit: DEFAULT_ORDERS_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
