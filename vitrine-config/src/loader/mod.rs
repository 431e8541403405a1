pub mod db_url;
pub mod error;
pub mod redis_url;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::models::sources::{EnvConfig, FileConfig};
use crate::models::validation::{ConfigWarnings, collect_warnings};
use crate::models::{
    Config, ConfigMetadata, CorsConfig, DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_DB_MIN_CONNECTIONS, DEFAULT_REDIS_NAMESPACE,
    DEFAULT_REDIS_TIMEOUT_MS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DatabaseConfig, ListingConfig, RedisConfig, ServerConfig,
};
use error::ConfigLoadError;

const DEFAULT_CONFIG_PATH: &str = "config/vitrine.toml";

/// Loaded configuration plus anything worth telling the operator about.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
    load_dotenv: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_file: None,
            load_dotenv: true,
        }
    }

    /// Read this TOML file instead of `VITRINE_CONFIG` or the default path.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Seed the environment from this file instead of `./.env`.
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn without_dotenv(mut self) -> Self {
        self.load_dotenv = false;
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = self.load_env_file()?;
        let env = EnvConfig::gather()?;

        let explicit_path =
            self.config_path.clone().or_else(|| env.config_path.clone());
        let (file, config_path) = match explicit_path {
            Some(path) => (read_file_config(&path)?, Some(path)),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
                if fallback.is_file() {
                    (read_file_config(&fallback)?, Some(fallback))
                } else {
                    (FileConfig::default(), None)
                }
            }
        };

        let metadata = ConfigMetadata {
            config_path,
            env_file_loaded,
        };
        let config = compose(file, env, metadata)?;
        let warnings = collect_warnings(&config);
        Ok(ConfigLoad { config, warnings })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        if !self.load_dotenv {
            return Ok(false);
        }
        let result = match &self.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| ()),
            None => dotenvy::dotenv().map(|_| ()),
        };
        match result {
            Ok(()) => Ok(true),
            Err(err) if err.not_found() => {
                debug!("no env file found; using process environment only");
                Ok(false)
            }
            Err(source) => Err(ConfigLoadError::EnvFile { source }),
        }
    }
}

pub fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigLoadError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge file and environment layers over the defaults. Environment values
/// win over file values.
pub fn compose(
    file: FileConfig,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<Config, ConfigLoadError> {
    let server = ServerConfig {
        host: env
            .server_host
            .clone()
            .or(file.server.host.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
        port: env
            .server_port
            .or(file.server.port)
            .unwrap_or(DEFAULT_SERVER_PORT),
    };

    let database = DatabaseConfig {
        primary_url: db_url::resolve_database_url(&env, &file.database)?,
        max_connections: env
            .database_max_connections
            .or(file.database.max_connections)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
        min_connections: env
            .database_min_connections
            .or(file.database.min_connections)
            .unwrap_or(DEFAULT_DB_MIN_CONNECTIONS),
    };
    if database.min_connections > database.max_connections {
        return Err(ConfigLoadError::InvalidValue {
            key: "DB_MIN_CONNECTIONS",
            message: format!(
                "{} exceeds DB_MAX_CONNECTIONS ({})",
                database.min_connections, database.max_connections
            ),
        });
    }

    let redis = redis_url::resolve_redis_url(&env, file.redis.as_ref())?.map(
        |url| {
            let file_redis = file.redis.clone().unwrap_or_default();
            let timeout = |env_ms: Option<u64>, file_ms: Option<u64>| {
                Duration::from_millis(
                    env_ms.or(file_ms).unwrap_or(DEFAULT_REDIS_TIMEOUT_MS),
                )
            };
            RedisConfig {
                url,
                namespace: env
                    .redis_namespace
                    .clone()
                    .or(file_redis.namespace)
                    .unwrap_or_else(|| DEFAULT_REDIS_NAMESPACE.to_string()),
                connect_timeout: timeout(
                    env.redis_connect_timeout_ms,
                    file_redis.connect_timeout_ms,
                ),
                response_timeout: timeout(
                    env.redis_response_timeout_ms,
                    file_redis.response_timeout_ms,
                ),
            }
        },
    );

    let listing = compose_listing(&file, &env)?;

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .clone()
            .or(file.cors.allowed_origins.clone())
            .unwrap_or_default(),
    };

    Ok(Config {
        server,
        database,
        redis,
        listing,
        cors,
        metadata,
    })
}

fn compose_listing(
    file: &FileConfig,
    env: &EnvConfig,
) -> Result<ListingConfig, ConfigLoadError> {
    let defaults = ListingConfig::default();
    let section = &file.listing;

    let max_limit = env
        .listing_max_limit
        .or(section.max_limit)
        .unwrap_or(defaults.max_limit);
    if max_limit == 0 {
        return Err(ConfigLoadError::InvalidValue {
            key: "LISTING_MAX_LIMIT",
            message: "must be at least 1".to_string(),
        });
    }

    let secs = |env_secs: Option<u64>, file_secs: Option<u64>, fallback| {
        env_secs
            .or(file_secs)
            .map(Duration::from_secs)
            .unwrap_or(fallback)
    };
    let limit = |env_limit: Option<u32>, file_limit: Option<u32>, fallback| {
        env_limit.or(file_limit).unwrap_or(fallback)
    };

    let product_colors_default_limit = limit(
        env.product_colors_default_limit,
        section.product_colors_default_limit,
        defaults.product_colors_default_limit,
    );
    let orders_default_limit = limit(
        env.orders_default_limit,
        section.orders_default_limit,
        defaults.orders_default_limit,
    );
    if product_colors_default_limit == 0 || orders_default_limit == 0 {
        return Err(ConfigLoadError::InvalidValue {
            key: "*_DEFAULT_LIMIT",
            message: "default page sizes must be at least 1".to_string(),
        });
    }

    Ok(ListingConfig {
        cache_ttl: secs(
            env.listing_cache_ttl_secs,
            section.cache_ttl_secs,
            defaults.cache_ttl,
        ),
        count_cache_ttl: secs(
            env.count_cache_ttl_secs,
            section.count_cache_ttl_secs,
            defaults.count_cache_ttl,
        ),
        product_colors_default_limit,
        orders_default_limit,
        max_limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sources::FileListingConfig;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = compose(
            FileConfig::default(),
            EnvConfig::default(),
            ConfigMetadata::default(),
        )
        .unwrap();

        assert_eq!(config.server.bind_address(), "0.0.0.0:3000");
        assert!(config.redis.is_none());
        assert!(config.database.primary_url.is_none());
        assert_eq!(config.listing, ListingConfig::default());
    }

    #[test]
    fn env_wins_over_file() {
        let file = FileConfig {
            listing: FileListingConfig {
                cache_ttl_secs: Some(10),
                max_limit: Some(50),
                ..FileListingConfig::default()
            },
            ..FileConfig::default()
        };
        let env = EnvConfig {
            listing_cache_ttl_secs: Some(20),
            ..EnvConfig::default()
        };

        let config = compose(file, env, ConfigMetadata::default()).unwrap();
        assert_eq!(config.listing.cache_ttl, Duration::from_secs(20));
        assert_eq!(config.listing.max_limit, 50);
    }

    #[test]
    fn zero_max_limit_is_rejected() {
        let env = EnvConfig {
            listing_max_limit: Some(0),
            ..EnvConfig::default()
        };
        let err = compose(FileConfig::default(), env, ConfigMetadata::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::InvalidValue { key: "LISTING_MAX_LIMIT", .. }
        ));
    }

    #[test]
    fn redis_settings_fall_back_to_defaults() {
        let env = EnvConfig {
            redis_url: Some("redis://127.0.0.1:6379".into()),
            redis_response_timeout_ms: Some(250),
            ..EnvConfig::default()
        };
        let config =
            compose(FileConfig::default(), env, ConfigMetadata::default())
                .unwrap();
        let redis = config.redis.unwrap();
        assert_eq!(redis.namespace, DEFAULT_REDIS_NAMESPACE);
        assert_eq!(redis.connect_timeout, Duration::from_millis(2_000));
        assert_eq!(redis.response_timeout, Duration::from_millis(250));
    }
}
