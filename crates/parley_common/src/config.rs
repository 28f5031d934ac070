//! Parley configuration.
//!
//! Config file: ~/.config/parley/config.toml or /etc/parley/config.toml

use crate::category::DEFAULT_THRESHOLD;
use crate::dialogue::TemplateSelector;
use crate::error::{ParleyError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which classifier answers `classify` by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Category,
    Priority,
    Weighted,
}

impl FromStr for EngineKind {
    type Err = ParleyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "category" | "categories" => Ok(Self::Category),
            "priority" | "pattern" | "regex" => Ok(Self::Priority),
            "weighted" => Ok(Self::Weighted),
            _ => Err(ParleyError::Config(format!(
                "Invalid engine: '{}'. Valid values: category, priority, weighted",
                s
            ))),
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_top_n() -> usize {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum category score
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// How many weighted categories to report
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default)]
    pub default_engine: EngineKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            top_n: default_top_n(),
            default_engine: EngineKind::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Rule book file; built-in rules when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_remote_timeout_ms() -> u64 {
    1500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            remote_timeout_ms: default_remote_timeout_ms(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive, overridden by PARLEY_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Main Parley configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub selection: TemplateSelector,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl ParleyConfig {
    /// Get default user config path: ~/.config/parley/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return Some(Path::new(&xdg).join("parley").join("config.toml"));
        }
        std::env::var("HOME")
            .ok()
            .map(|home| Path::new(&home).join(".config").join("parley").join("config.toml"))
    }

    /// Get system config path: /etc/parley/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/parley/config.toml")
    }

    /// Load configuration from file
    ///
    /// Priority:
    /// 1. Explicit path (must exist)
    /// 2. User config (~/.config/parley/config.toml)
    /// 3. System config (/etc/parley/config.toml)
    /// 4. Defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::load_from(&user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::load_from(&system_path);
        }

        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ParleyError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: ParleyConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.engine.threshold.is_finite() {
            return Err(ParleyError::Config("threshold must be a finite number".to_string()));
        }
        if self.engine.top_n == 0 {
            return Err(ParleyError::Config("top_n must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Write configuration as TOML
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ParleyError::Config(format!("Failed to serialize configuration: {}", e)))?;
        fs::write(path, toml_string)?;
        Ok(())
    }
}
