//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, CorsConfig, LogFormat, LoggingConfig, SeedConfig, ServerConfig,
    StorageBackend, StorageConfig,
};
