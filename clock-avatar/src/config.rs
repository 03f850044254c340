use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono_tz::Tz;
use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Deserialize)]
struct RawConfig {
    telegram_account: AccountConfig,
    timezone: String,
    assets: RawAssets,
}

#[derive(Deserialize)]
struct RawAssets {
    font_file_path: PathBuf,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AccountConfig {
    pub api_id: i32,
    pub api_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub telegram_account: AccountConfig,
    pub timezone: Tz,
    pub font_file_path: PathBuf,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading config from {}", path.display());

        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(raw)?;

        let timezone = raw
            .timezone
            .parse()
            .map_err(|_| Error::InvalidTimezone(raw.timezone.clone()))?;

        let config = Self {
            telegram_account: raw.telegram_account,
            timezone,
            font_file_path: raw.assets.font_file_path,
        };
        Ok(config)
    }
}
