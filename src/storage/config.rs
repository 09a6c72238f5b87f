//! JSON Configuration Management
//!
//! Reads the server configuration file, creating it with defaults on
//! first start, and applies environment-variable overrides.

use std::fs;
use std::path::{Path, PathBuf};

use taskline_core::{CoreError, CoreResult};

use crate::models::settings::ServerConfig;
use crate::utils::paths::{config_path, ensure_taskline_dir};

/// Configuration service for server settings
#[derive(Debug)]
pub struct ConfigService {
    config: ServerConfig,
}

impl ConfigService {
    /// Load from the default location (~/.taskline/config.json),
    /// creating the file with defaults when it does not exist.
    pub fn load() -> CoreResult<Self> {
        ensure_taskline_dir()?;
        Self::load_from(&config_path()?)
    }

    /// Load from an explicit path
    pub fn load_from(path: &Path) -> CoreResult<Self> {
        let config = if path.exists() {
            Self::read_file(path)?
        } else {
            let default_config = ServerConfig::default();
            Self::write_file(path, &default_config)?;
            default_config
        };

        let mut service = Self { config };
        service.apply_env_overrides();
        service.config.validate().map_err(CoreError::config)?;
        Ok(service)
    }

    fn read_file(path: &Path) -> CoreResult<ServerConfig> {
        let content = fs::read_to_string(path)
            .map_err(|e| CoreError::config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: ServerConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn write_file(path: &Path, config: &ServerConfig) -> CoreResult<()> {
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)
            .map_err(|e| CoreError::config(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Environment variables win over the file so deployments can keep
    /// secrets out of it.
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("TASKLINE_LISTEN_ADDR") {
            self.config.listen_addr = addr;
        }
        if let Ok(path) = std::env::var("TASKLINE_DB_PATH") {
            self.config.database_path = Some(PathBuf::from(path));
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            self.config.api_key = Some(key);
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Consume the service, yielding the configuration
    pub fn into_config(self) -> ServerConfig {
        self.config
    }
}
