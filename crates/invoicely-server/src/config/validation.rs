//! Configuration validation.

use super::types::ServerConfig;
use invoicely_common_log::LogLevel;
use invoicely_notify::is_valid_email;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid JWT secret: must be at least 32 characters")]
    InvalidJwtSecret,

    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Cache TTL must be greater than zero")]
    InvalidCacheTtl,

    #[error("Cache capacity must be greater than zero")]
    InvalidCacheCapacity,

    #[error("Upload limit for {0} must be greater than zero and below the request body limit")]
    InvalidUploadLimit(&'static str),

    #[error("Invalid sender address: {0}")]
    InvalidSenderAddress(String),

    #[error("Email batch concurrency must be greater than zero")]
    InvalidBatchConcurrency,
}

/// Validate server configuration, collecting every problem.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.auth.jwt_secret.len() < 32 {
        errors.push(ConfigError::InvalidJwtSecret);
    }

    if config.server.port == 0 {
        errors.push(ConfigError::InvalidPort(0));
    }

    if LogLevel::parse(&config.logging.level).is_none() {
        errors.push(ConfigError::InvalidLogLevel(config.logging.level.clone()));
    }

    if config.cache.enabled {
        if config.cache.ttl_ms == 0 {
            errors.push(ConfigError::InvalidCacheTtl);
        }
        if config.cache.max_entries == 0 {
            errors.push(ConfigError::InvalidCacheCapacity);
        }
    }

    let body_limit = config.server.body_limit_bytes as u64;
    for (name, limit) in [
        ("logos", config.upload.logo_max_bytes),
        ("attachments", config.upload.attachment_max_bytes),
    ] {
        if limit == 0 || limit > body_limit {
            errors.push(ConfigError::InvalidUploadLimit(name));
        }
    }

    if !is_valid_email(&config.email.from_email) {
        errors.push(ConfigError::InvalidSenderAddress(config.email.from_email.clone()));
    }

    if config.email.batch_concurrency == 0 {
        errors.push(ConfigError::InvalidBatchConcurrency);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
