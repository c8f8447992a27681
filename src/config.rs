use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Sizes and defaults for the four engines.
///
/// Every key is optional in the TOML file; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub time_quantum: u64,
    pub memory_size: usize,
    pub num_frames: u32,
    pub disk_head: i64,
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            time_quantum: DEFAULT_TIME_QUANTUM,
            memory_size: DEFAULT_MEMORY_SIZE,
            num_frames: DEFAULT_NUM_FRAMES,
            disk_head: DEFAULT_HEAD_POSITION,
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl SimConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_quantum == 0 {
            return Err(ConfigError::Invalid("time_quantum must be at least 1".to_string()));
        }
        if self.memory_size == 0 {
            return Err(ConfigError::Invalid("memory_size must be at least 1".to_string()));
        }
        if self.num_frames == 0 {
            return Err(ConfigError::Invalid("num_frames must be at least 1".to_string()));
        }
        if self.admin_username.trim().is_empty() {
            return Err(ConfigError::Invalid("admin_username must not be empty".to_string()));
        }
        Ok(())
    }
}
