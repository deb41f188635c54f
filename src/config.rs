// src/config.rs
//! Process configuration read from the environment (after `.env` is loaded).
//!
//! | Variable                   | Default     |
//! |----------------------------|-------------|
//! | `HOST`                     | `127.0.0.1` |
//! | `PORT`                     | `3000`      |
//! | `BASE_PATH`                | empty       |
//! | `STORAGE_MODE`             | `postgres`  |
//! | `DATABASE_URL`             | required for `postgres` |
//! | `DATABASE_MAX_CONNECTIONS` | `10`        |
//! | `DEFAULT_PAGE_SIZE`        | `20`        |
//! | `MAX_PAGE_SIZE`            | `2000`      |

use std::net::IpAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid STORAGE_MODE: {0:?} (expected `postgres` or `in_memory`)")]
    InvalidStorageMode(String),

    #[error("DEFAULT_PAGE_SIZE ({default}) must be between 1 and MAX_PAGE_SIZE ({max})")]
    PageSizeBounds { default: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Postgres,
    InMemory,
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StorageMode::Postgres),
            "in_memory" | "inmemory" | "memory" => Ok(StorageMode::InMemory),
            _ => Err(ConfigError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Page size limits applied to `GET /products`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Prefix under which every route is nested. Empty means the root.
    pub base_path: String,
    pub storage_mode: StorageMode,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub paging: PagingConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = parse_or(&var, "HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or(&var, "PORT", 3000u16)?;
        let max_connections = parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10u32)?;
        let default_size = parse_or(&var, "DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let max_size = parse_or(&var, "MAX_PAGE_SIZE", MAX_PAGE_SIZE)?;

        if default_size == 0 || default_size > max_size {
            return Err(ConfigError::PageSizeBounds { default: default_size, max: max_size });
        }

        let storage_mode = match var("STORAGE_MODE") {
            Some(mode) => mode.parse()?,
            None => StorageMode::default(),
        };

        let database_url = var("DATABASE_URL");
        if storage_mode == StorageMode::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            host,
            port,
            base_path: normalize_base_path(var("BASE_PATH").as_deref().unwrap_or("")),
            storage_mode,
            database_url,
            max_connections,
            paging: PagingConfig { default_size, max_size },
        })
    }
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

/// `"api/"` -> `"/api"`, `"/"` -> `""`.
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
