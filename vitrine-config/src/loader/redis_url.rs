use url::Url;

use crate::{
    ConfigLoadError,
    models::sources::{EnvConfig, FileRedisConfig},
};

/// Resolve the Redis URL: `REDIS_URL`, then the file's `redis.url`, then
/// `redis://[:password@]REDIS_HOST:REDIS_PORT`. `None` disables caching.
pub fn resolve_redis_url(
    env: &EnvConfig,
    file_redis: Option<&FileRedisConfig>,
) -> Result<Option<String>, ConfigLoadError> {
    let explicit = env.redis_url.clone().or_else(|| {
        file_redis
            .and_then(|redis| redis.url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    });
    if let Some(url) = explicit {
        Url::parse(&url)
            .map_err(|source| ConfigLoadError::InvalidRedisUrl { source })?;
        return Ok(Some(url));
    }

    let Some(host) = env.redis_host.as_ref() else {
        return Ok(None);
    };
    let port = env.redis_port.unwrap_or(6379);
    let mut url = Url::parse(&format!("redis://{host}:{port}"))
        .map_err(|source| ConfigLoadError::InvalidRedisUrl { source })?;
    if let Some(password) = env.redis_password.as_ref() {
        url.set_password(Some(password)).map_err(|_| {
            ConfigLoadError::InvalidValue {
                key: "REDIS_PASSWORD",
                message: "cannot be encoded in a url".to_string(),
            }
        })?;
    }
    Ok(Some(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_redis_disables_the_cache() {
        let resolved = resolve_redis_url(&EnvConfig::default(), None);
        assert_eq!(resolved.unwrap(), None);
    }

    #[test]
    fn host_and_password_compose_a_url() {
        let env = EnvConfig {
            redis_host: Some("cache".into()),
            redis_password: Some("hunter2".into()),
            ..EnvConfig::default()
        };
        assert_eq!(
            resolve_redis_url(&env, None).unwrap().as_deref(),
            Some("redis://:hunter2@cache:6379")
        );
    }

    #[test]
    fn invalid_explicit_url_is_rejected() {
        let env = EnvConfig {
            redis_url: Some("not a url".into()),
            ..EnvConfig::default()
        };
        assert!(matches!(
            resolve_redis_url(&env, None),
            Err(ConfigLoadError::InvalidRedisUrl { .. })
        ));
    }
}
