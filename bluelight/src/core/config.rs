/// Engine configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | BLUELIGHT_COSMETIC_PRICE_CACHE_TTL | 86400 | Cosmetic price cache TTL (seconds) |
/// | BLUELIGHT_IGNORED_ORDER_STATUSES | (empty) | Comma separated order statuses ignored by single-use voucher rules |
/// | BLUELIGHT_MAX_OFFER_APPLICATIONS | 10000 | Hard cap on applications of one offer to one basket |
/// | BLUELIGHT_DEFAULT_CURRENCY | USD | Currency of new baskets |
/// | LOG_LEVEL | info | Log level |
/// | LOG_DIR | (unset) | Rolling log file directory |
/// | ENVIRONMENT | development | Runtime environment |
///
/// # Example
///
/// ```ignore
/// BLUELIGHT_COSMETIC_PRICE_CACHE_TTL=600 bluelight apply basket.json
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Seconds a cosmetic price stays cached
    pub cosmetic_price_cache_ttl: u64,
    /// Order statuses whose voucher applications don't count as usage
    pub ignored_order_statuses: Vec<String>,
    /// Upper bound of `ConditionalOffer::get_max_applications`
    pub max_offer_applications: u32,
    pub default_currency: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            cosmetic_price_cache_ttl: std::env::var("BLUELIGHT_COSMETIC_PRICE_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86400),
            ignored_order_statuses: std::env::var("BLUELIGHT_IGNORED_ORDER_STATUSES")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            max_offer_applications: std::env::var("BLUELIGHT_MAX_OFFER_APPLICATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10000),
            default_currency: std::env::var("BLUELIGHT_DEFAULT_CURRENCY")
                .unwrap_or_else(|_| "USD".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|v| !v.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override the engine settings, keeping everything else from the environment
    ///
    /// Mostly used by tests
    pub fn with_overrides(
        cosmetic_price_cache_ttl: u64,
        ignored_order_statuses: Vec<String>,
        max_offer_applications: u32,
    ) -> Self {
        let mut config = Self::from_env();
        config.cosmetic_price_cache_ttl = cosmetic_price_cache_ttl;
        config.ignored_order_statuses = ignored_order_statuses;
        config.max_offer_applications = max_offer_applications;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
