use super::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, message: impl Into<String>, hint: Option<&str>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: hint.map(str::to_string),
        });
    }
}

/// Non-fatal observations about an otherwise valid configuration.
pub fn collect_warnings(config: &Config) -> ConfigWarnings {
    let mut warnings = ConfigWarnings::default();

    if config.redis.is_none() {
        warnings.push(
            "no Redis configured; listing cache disabled",
            Some("set REDIS_URL or REDIS_HOST"),
        );
    }

    if config.database.primary_url.is_none() {
        warnings.push(
            "no database configured",
            Some("set DATABASE_URL or DB_HOST, DB_USERNAME and DB_DATABASE"),
        );
    }

    let listing = &config.listing;
    if listing.product_colors_default_limit > listing.max_limit
        || listing.orders_default_limit > listing.max_limit
    {
        warnings.push(
            format!(
                "default page size exceeds LISTING_MAX_LIMIT ({})",
                listing.max_limit
            ),
            Some("default limits are clamped to the maximum"),
        );
    }

    if config.cors.is_wildcard_included() {
        warnings.push("CORS allows any origin", None);
    }

    warnings
}
