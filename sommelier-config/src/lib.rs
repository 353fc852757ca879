//! Configuration loading for Sommelier.
//!
//! One [`SommelierConfig`] document carries every tunable of the scan
//! controller, the connectivity monitor, the simulated scan service and the
//! offline cache. Each section deserializes with defaults, so a file only
//! needs the keys it overrides.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use sommelier_core::config::{
    ControllerConfig, NetworkMonitorConfig, OfflineCacheConfig,
    SimulatorConfig,
};
use tracing::debug;

pub const CONFIG_PATH_ENV: &str = "SOMMELIER_CONFIG_PATH";
pub const CONFIG_JSON_ENV: &str = "SOMMELIER_CONFIG_JSON";

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    /// Path given explicitly by the caller, e.g. `--config`.
    Explicit(PathBuf),
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::Default => "built-in defaults".to_string(),
            ConfigSource::Explicit(path) => {
                format!("{} (explicit)", path.display())
            }
            ConfigSource::EnvPath(path) => {
                format!("{} (from ${CONFIG_PATH_ENV})", path.display())
            }
            ConfigSource::EnvInline => format!("${CONFIG_JSON_ENV}"),
            ConfigSource::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SommelierConfig {
    /// Command buffering, event fan-out and result caching of the controller.
    pub controller: ControllerConfig,
    /// Debounce window and optional reachability probe.
    pub network: NetworkMonitorConfig,
    /// Step timings and fault injection for the simulated scan service.
    pub simulator: SimulatorConfig,
    /// Location and session key of the on-disk offline cache.
    pub offline: OfflineCacheConfig,
}

impl SommelierConfig {
    /// Load configuration using environment variables.
    /// Evaluation order:
    /// 1) `$SOMMELIER_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$SOMMELIER_CONFIG_JSON` (inline JSON),
    /// 3) `sommelier.toml` / `sommelier.json` in the working directory or
    ///    `config/`,
    /// 4) defaults.
    pub fn load_from_env() -> anyhow::Result<(Self, ConfigSource)> {
        if let Ok(path_str) = env::var(CONFIG_PATH_ENV)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Ok(raw) = env::var(CONFIG_JSON_ENV)
            && !raw.trim().is_empty()
        {
            let parsed = Self::parse_json(&raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_ENV}"))?;
            return Ok((parsed, ConfigSource::EnvInline));
        }

        if let Some(path) = Self::find_default_file() {
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Self::default(), ConfigSource::Default))
    }

    /// An explicit path wins over everything the environment says.
    pub fn load(
        explicit: Option<&Path>,
    ) -> anyhow::Result<(Self, ConfigSource)> {
        match explicit {
            Some(path) => {
                let config = Self::load_from_file(path)?;
                Ok((config, ConfigSource::Explicit(path.to_path_buf())))
            }
            None => Self::load_from_env(),
        }
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read config from {}", path.display())
        })?;
        debug!(path = %path.display(), "loading sommelier config");

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents)
                .with_context(|| format!("invalid config {}", path.display())),
            Some("toml") | Some("tml") => {
                toml::from_str(&contents).map_err(|err| {
                    anyhow!("invalid config {}: {}", path.display(), err)
                })
            }
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    /// Try TOML first, then JSON.
    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> anyhow::Result<Self> {
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse config {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| anyhow!("invalid config json: {err}"))
    }

    fn find_default_file() -> Option<PathBuf> {
        const CANDIDATES: &[&str] = &[
            "sommelier.toml",
            "sommelier.json",
            "config/sommelier.toml",
            "config/sommelier.json",
        ];

        CANDIDATES
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(|path| path.to_path_buf())
    }
}
