use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::loader::error::ConfigLoadError;
use crate::util::{non_blank, parse_csv};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    pub redis: Option<FileRedisConfig>,
    #[serde(default)]
    pub listing: FileListingConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileRedisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileListingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_cache_ttl_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_colors_default_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders_default_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_url_file: Option<PathBuf>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_user: Option<String>,
    pub database_name: Option<String>,
    pub database_password: Option<String>,
    pub database_password_file: Option<PathBuf>,
    pub database_max_connections: Option<u32>,
    pub database_min_connections: Option<u32>,
    pub redis_url: Option<String>,
    pub redis_host: Option<String>,
    pub redis_port: Option<u16>,
    pub redis_password: Option<String>,
    pub redis_namespace: Option<String>,
    pub redis_connect_timeout_ms: Option<u64>,
    pub redis_response_timeout_ms: Option<u64>,
    pub listing_cache_ttl_secs: Option<u64>,
    pub count_cache_ttl_secs: Option<u64>,
    pub product_colors_default_limit: Option<u32>,
    pub orders_default_limit: Option<u32>,
    pub listing_max_limit: Option<u32>,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl EnvConfig {
    pub fn gather() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset;
    /// numeric values that fail to parse are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| non_blank(lookup(key).as_ref());
        let path = |key: &str| text(key).map(PathBuf::from);

        Ok(Self {
            config_path: path("VITRINE_CONFIG"),
            server_host: text("SERVER_HOST"),
            server_port: number(&lookup, "SERVER_PORT")?,
            database_url: text("DATABASE_URL"),
            database_url_file: path("DATABASE_URL_FILE"),
            database_host: text("DB_HOST"),
            database_port: number(&lookup, "DB_PORT")?,
            database_user: text("DB_USERNAME"),
            database_name: text("DB_DATABASE"),
            database_password: text("DB_PASSWORD"),
            database_password_file: path("DB_PASSWORD_FILE"),
            database_max_connections: number(&lookup, "DB_MAX_CONNECTIONS")?,
            database_min_connections: number(&lookup, "DB_MIN_CONNECTIONS")?,
            redis_url: text("REDIS_URL"),
            redis_host: text("REDIS_HOST"),
            redis_port: number(&lookup, "REDIS_PORT")?,
            redis_password: text("REDIS_PASSWORD"),
            redis_namespace: text("REDIS_NAMESPACE"),
            redis_connect_timeout_ms: number(
                &lookup,
                "REDIS_CONNECT_TIMEOUT_MS",
            )?,
            redis_response_timeout_ms: number(
                &lookup,
                "REDIS_RESPONSE_TIMEOUT_MS",
            )?,
            listing_cache_ttl_secs: number(&lookup, "LISTING_CACHE_TTL_SECS")?,
            count_cache_ttl_secs: number(&lookup, "COUNT_CACHE_TTL_SECS")?,
            product_colors_default_limit: number(
                &lookup,
                "PRODUCT_COLORS_DEFAULT_LIMIT",
            )?,
            orders_default_limit: number(&lookup, "ORDERS_DEFAULT_LIMIT")?,
            listing_max_limit: number(&lookup, "LISTING_MAX_LIMIT")?,
            cors_allowed_origins: text("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_csv(&raw)),
        })
    }
}

fn number<T, F>(
    lookup: &F,
    key: &'static str,
) -> Result<Option<T>, ConfigLoadError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match non_blank(lookup(key).as_ref()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigLoadError::InvalidNumber { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Result<EnvConfig, ConfigLoadError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn blank_values_are_unset() {
        let env = env(&[("REDIS_URL", "  "), ("SERVER_PORT", "")]).unwrap();
        assert!(env.redis_url.is_none());
        assert!(env.server_port.is_none());
    }

    #[test]
    fn numbers_are_parsed() {
        let env = env(&[
            ("SERVER_PORT", "8080"),
            ("LISTING_CACHE_TTL_SECS", "60"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test,http://b.test"),
        ])
        .unwrap();
        assert_eq!(env.server_port, Some(8080));
        assert_eq!(env.listing_cache_ttl_secs, Some(60));
        assert_eq!(env.cors_allowed_origins.map(|o| o.len()), Some(2));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = env(&[("REDIS_PORT", "six")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::InvalidNumber { key: "REDIS_PORT", .. }
        ));
    }
}
