//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present). Missing required variables and unparsable values are errors;
//! absent optional variables fall back to their defaults.

use serde::Deserialize;
use share_core::ViewDedupPolicy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub engagement: EngagementConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT validation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

/// Where discovery selections are cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown cache backend '{other}'")),
        }
    }
}

/// View counting, counter reconciliation, and discovery caching settings
#[derive(Debug, Clone, Deserialize)]
pub struct EngagementConfig {
    /// Cooldown window for repeat views; `None` counts each identity once
    #[serde(default)]
    pub view_dedup_window_secs: Option<u64>,
    /// Age after which view records are pruned (cooldown policy only)
    #[serde(default)]
    pub view_retention_days: Option<u32>,
    #[serde(default = "default_discovery_cache_ttl")]
    pub discovery_cache_ttl_secs: u64,
    #[serde(default)]
    pub discovery_cache_backend: CacheBackend,
    #[serde(default)]
    pub counter_drift_tolerance: u32,
    /// 0 disables the background reconciler
    #[serde(default)]
    pub reconcile_interval_secs: u64,
    #[serde(default = "default_reconcile_batch_size")]
    pub reconcile_batch_size: u32,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            view_dedup_window_secs: None,
            view_retention_days: None,
            discovery_cache_ttl_secs: default_discovery_cache_ttl(),
            discovery_cache_backend: CacheBackend::default(),
            counter_drift_tolerance: 0,
            reconcile_interval_secs: 0,
            reconcile_batch_size: default_reconcile_batch_size(),
        }
    }
}

impl EngagementConfig {
    #[must_use]
    pub fn dedup_policy(&self) -> ViewDedupPolicy {
        ViewDedupPolicy::from_window_secs(self.view_dedup_window_secs)
    }

    #[must_use]
    pub fn discovery_ttl(&self) -> Duration {
        Duration::from_secs(self.discovery_cache_ttl_secs)
    }

    /// Interval of the background reconciler, if enabled
    #[must_use]
    pub fn reconcile_interval(&self) -> Option<Duration> {
        (self.reconcile_interval_secs > 0).then(|| Duration::from_secs(self.reconcile_interval_secs))
    }

    /// Retention horizon for view records; ignored under the permanent policy
    #[must_use]
    pub fn view_retention(&self) -> Option<chrono::Duration> {
        if !self.dedup_policy().allows_pruning() {
            return None;
        }
        self.view_retention_days
            .map(|days| chrono::Duration::days(i64::from(days)))
    }
}

// Default value functions
fn default_app_name() -> String {
    "share-server".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_discovery_cache_ttl() -> u64 {
    60
}

fn default_reconcile_batch_size() -> u32 {
    500
}

/// Typed access to a variable source
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingVar(key))
    }

    fn parse<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| ConfigError::InvalidValue(key, format!("'{raw}': {e}")))
            })
            .transpose()
    }

    fn parse_or<T>(&self, key: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parse(key)?.unwrap_or_else(default))
    }

    fn required_parse<T>(&self, key: &'static str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.parse(key)?.ok_or(ConfigError::MissingVar(key))
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or a
    /// value cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    /// Same as [`AppConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let engagement = EngagementConfig {
            view_dedup_window_secs: vars.parse("VIEW_DEDUP_WINDOW_SECS")?,
            view_retention_days: vars.parse("VIEW_RETENTION_DAYS")?,
            discovery_cache_ttl_secs: vars
                .parse_or("DISCOVERY_CACHE_TTL_SECS", default_discovery_cache_ttl)?,
            discovery_cache_backend: vars.parse_or("DISCOVERY_CACHE_BACKEND", CacheBackend::default)?,
            counter_drift_tolerance: vars.parse_or("COUNTER_DRIFT_TOLERANCE", || 0)?,
            reconcile_interval_secs: vars.parse_or("RECONCILE_INTERVAL_SECS", || 0)?,
            reconcile_batch_size: vars
                .parse_or("RECONCILE_BATCH_SIZE", default_reconcile_batch_size)?,
        };

        if engagement.discovery_cache_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "DISCOVERY_CACHE_TTL_SECS",
                "must be greater than 0".to_string(),
            ));
        }
        if engagement.reconcile_batch_size == 0 {
            return Err(ConfigError::InvalidValue(
                "RECONCILE_BATCH_SIZE",
                "must be greater than 0".to_string(),
            ));
        }
        if engagement.view_retention_days == Some(0) {
            return Err(ConfigError::InvalidValue(
                "VIEW_RETENTION_DAYS",
                "must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env: vars.parse_or("APP_ENV", Environment::default)?,
            },
            api: ServerConfig {
                host: vars.get("API_HOST").unwrap_or_else(default_host),
                port: vars.required_parse("API_PORT")?,
            },
            database: DatabaseConfig {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars.parse_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: vars.parse_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            redis: RedisConfig {
                url: vars.required("REDIS_URL")?,
                max_connections: vars
                    .parse_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            },
            jwt: JwtConfig {
                secret: vars.required("JWT_SECRET")?,
                access_token_expiry: vars
                    .parse_or("JWT_ACCESS_TOKEN_EXPIRY", default_access_token_expiry)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: vars
                    .parse_or("RATE_LIMIT_REQUESTS_PER_SECOND", default_requests_per_second)?,
                burst: vars.parse_or("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                worker_id: vars.parse_or("WORKER_ID", || 0)?,
            },
            engagement,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
