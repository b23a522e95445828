//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, CacheBackend, ConfigError, CorsConfig, DatabaseConfig,
    EngagementConfig, Environment, JwtConfig, RateLimitConfig, RedisConfig, ServerConfig,
    SnowflakeConfig,
};
