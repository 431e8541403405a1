use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to load env file: {source}")]
    EnvFile {
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to read secret file {path}: {source}")]
    SecretFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid database url: {source}")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },

    #[error("database username {username:?} cannot be encoded in a url")]
    InvalidDatabaseUsername { username: String },

    #[error("database password cannot be encoded in a url")]
    InvalidDatabasePassword,

    #[error("invalid redis url: {source}")]
    InvalidRedisUrl {
        #[source]
        source: url::ParseError,
    },

    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}
