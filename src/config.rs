use std::{collections::HashMap, ffi::OsString, path::PathBuf};

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub struct RepofetchConfig {
    /// Base of the source tree, checkouts live under `<source_root>/src`.
    pub source_root: Option<PathBuf>,
    pub discovery_enabled: bool,
}

impl RepofetchConfig {
    pub fn load() -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(None)?;
        Ok(Self::from_raw(raw_config))
    }

    fn from_raw(raw_config: RawConfig) -> Self {
        Self {
            source_root: raw_config.source.path.as_deref().and_then(first_search_path),
            discovery_enabled: raw_config.discovery.enabled.unwrap_or(true),
        }
    }
}

/// The first entry of a search path list such as `/a:/b`.
fn first_search_path(search_path: &str) -> Option<PathBuf> {
    std::env::split_paths(&OsString::from(search_path)).find(|path| !path.as_os_str().is_empty())
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    source: SourceConfig,
    #[serde(default)]
    discovery: DiscoveryConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct SourceConfig {
    path: Option<String>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct DiscoveryConfig {
    enabled: Option<bool>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("REPOFETCH")
                    .separator("_")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
