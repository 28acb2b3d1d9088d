// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file (TOML).
//!
//! ```toml
//! label = "base"
//!
//! [network]
//! node = 0
//! channel = 42
//! bind = "0.0.0.0:7420"
//! broadcast = "255.255.255.255:7420"
//!
//! [timing]
//! dispatch_interval = "10s"
//! job_timeout = "5m"
//!
//! [[craft]]
//! item = "minecraft:torch"
//! amount = 256
//!
//! [stock]
//! "minecraft:coal" = 64
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use logi_core::{
    NodeId, Recipe, StaticRecipeBook, StockSnapshot, StockTarget, Targets, WorkTarget,
};
use logi_engine::{parse_duration, DurationError, ServerConfig, DEFAULT_HISTORY_LIMIT};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid duration for {field}: {source}")]
    Duration {
        field: &'static str,
        #[source]
        source: DurationError,
    },

    #[error("invalid recipes in {path}: {source}")]
    Recipes {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub craft: Vec<StockTarget>,
    #[serde(default)]
    pub smelt: Vec<StockTarget>,
    #[serde(default)]
    pub work: Vec<WorkTarget>,
    /// JSON file with an array of recipes, relative to the config file
    #[serde(default)]
    pub recipes_file: Option<PathBuf>,
    #[serde(default, rename = "recipe")]
    pub recipes: Vec<Recipe>,
    /// Starting storage contents
    #[serde(default)]
    pub stock: BTreeMap<String, u64>,
    /// Run an in-process fleet instead of talking UDP
    #[serde(default)]
    pub simulate: Option<SimulateConfig>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    #[serde(default)]
    pub node: u32,
    #[serde(default = "default_channel")]
    pub channel: u16,
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    #[serde(default = "default_broadcast")]
    pub broadcast: SocketAddr,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node: 0,
            channel: default_channel(),
            bind: default_bind(),
            broadcast: default_broadcast(),
        }
    }
}

/// Durations are human strings (`"10s"`, `"5m"`); unset fields keep the
/// server defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    pub dispatch_interval: Option<String>,
    pub job_timeout: Option<String>,
    pub stale_sweep_interval: Option<String>,
    pub ping_interval: Option<String>,
    pub announce_interval: Option<String>,
    pub offline_timeout: Option<String>,
    pub history_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulateConfig {
    #[serde(default = "default_crafters")]
    pub crafters: u32,
    #[serde(default)]
    pub workers: u32,
    /// Pause per craft or task
    #[serde(default)]
    pub op_delay: Option<String>,
}

fn default_label() -> String {
    "logi".to_string()
}

fn default_channel() -> u16 {
    42
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 7420))
}

fn default_broadcast() -> SocketAddr {
    SocketAddr::from(([255, 255, 255, 255], 7420))
}

fn default_crafters() -> u32 {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            label: default_label(),
            network: NetworkConfig::default(),
            timing: TimingConfig::default(),
            craft: Vec::new(),
            smelt: Vec::new(),
            work: Vec::new(),
            recipes_file: None,
            recipes: Vec::new(),
            stock: BTreeMap::new(),
            simulate: None,
            base_dir: None,
        }
    }
}

impl Config {
    /// Read and parse `path`. Relative paths inside resolve against its
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let mut config = Self::parse(&text)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.server_config()?;
        config.op_delay()?;
        Ok(config)
    }

    pub fn targets(&self) -> Targets {
        Targets { craft: self.craft.clone(), smelt: self.smelt.clone(), work: self.work.clone() }
    }

    pub fn server_config(&self) -> Result<ServerConfig, ConfigError> {
        let defaults = ServerConfig::default();
        let t = &self.timing;
        Ok(ServerConfig {
            label: self.label.clone(),
            targets: self.targets(),
            dispatch_interval: duration(
                "dispatch_interval",
                &t.dispatch_interval,
                defaults.dispatch_interval,
            )?,
            job_timeout: duration("job_timeout", &t.job_timeout, defaults.job_timeout)?,
            stale_sweep_interval: duration(
                "stale_sweep_interval",
                &t.stale_sweep_interval,
                defaults.stale_sweep_interval,
            )?,
            ping_interval: duration("ping_interval", &t.ping_interval, defaults.ping_interval)?,
            announce_interval: duration(
                "announce_interval",
                &t.announce_interval,
                defaults.announce_interval,
            )?,
            offline_timeout: duration(
                "offline_timeout",
                &t.offline_timeout,
                defaults.offline_timeout,
            )?,
            history_limit: t.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
        })
    }

    /// Inline recipes plus those in `recipes_file`; inline entries win.
    pub fn recipe_book(&self) -> Result<StaticRecipeBook, ConfigError> {
        let mut book = match &self.recipes_file {
            Some(file) => {
                let path = match &self.base_dir {
                    Some(base) if file.is_relative() => base.join(file),
                    _ => file.clone(),
                };
                let json = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
                StaticRecipeBook::from_json(&json)
                    .map_err(|source| ConfigError::Recipes { path, source })?
            }
            None => StaticRecipeBook::new(),
        };
        for recipe in &self.recipes {
            book.insert(recipe.clone());
        }
        Ok(book)
    }

    pub fn initial_stock(&self) -> StockSnapshot {
        let mut snapshot = StockSnapshot::new();
        for (item, count) in &self.stock {
            snapshot.set(item.as_str(), *count);
        }
        snapshot
    }

    pub fn node(&self) -> NodeId {
        NodeId(self.network.node)
    }

    pub fn op_delay(&self) -> Result<Duration, ConfigError> {
        let delay = self.simulate.as_ref().and_then(|s| s.op_delay.clone());
        duration("simulate.op_delay", &delay, Duration::ZERO)
    }
}

fn duration(
    field: &'static str,
    value: &Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        Some(s) => parse_duration(s).map_err(|source| ConfigError::Duration { field, source }),
        None => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
