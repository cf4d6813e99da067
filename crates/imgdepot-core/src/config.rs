//! Configuration module
//!
//! Environment-based configuration for the upload service. Values are read
//! once at startup; the storage directory is resolved to an absolute path at
//! that point and never re-resolved per request.

use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_STORAGE_DIR: &str = "./uploads";
const MAX_FILE_SIZE_MB: usize = 10;
const DEFAULT_MIME_PREFIX: &str = "image/";

/// Application configuration (upload service).
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Fixed storage directory, absolute. Resolved once per process.
    pub storage_dir: PathBuf,
    pub max_file_size_bytes: usize,
    /// Declared MIME types must start with one of these prefixes.
    pub allowed_mime_prefixes: Vec<String>,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let storage_dir = PathBuf::from(
            env::var("STORAGE_DIR").unwrap_or_else(|_| DEFAULT_STORAGE_DIR.to_string()),
        );
        let storage_dir = if storage_dir.is_absolute() {
            storage_dir
        } else {
            env::current_dir()?.join(storage_dir)
        };

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_mime_prefixes = env::var("ALLOWED_MIME_PREFIXES")
            .unwrap_or_else(|_| DEFAULT_MIME_PREFIX.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            storage_dir,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_mime_prefixes,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.allowed_mime_prefixes.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_MIME_PREFIXES must contain at least one prefix"
            ));
        }

        if self.is_production() && self.cors_origins.contains(&"*".to_string()) {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 4000,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            storage_dir: PathBuf::from("/tmp/uploads"),
            max_file_size_bytes: 10 * 1024 * 1024,
            allowed_mime_prefixes: vec!["image/".to_string()],
        }
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_size_ceiling() {
        let mut config = base_config();
        config.max_file_size_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_mime_prefixes() {
        let mut config = base_config();
        config.allowed_mime_prefixes.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_wildcard_cors_in_production() {
        let mut config = base_config();
        config.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.cors_origins = vec!["https://app.example.com".to_string()];
        assert!(config.validate().is_ok());
    }
}
