//! Application configuration: `journal.ron` plus environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use journal_core::{ConfigError, DispatchPolicy, TriggerConfig};
use journal_engine::RefreshSettings;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "journal.ron";

pub const ENV_CONFIG: &str = "JOURNAL_CONFIG";
pub const ENV_ENDPOINT: &str = "JOURNAL_ENDPOINT";
pub const ENV_DATA_DIR: &str = "JOURNAL_DATA_DIR";
pub const ENV_LOG: &str = "JOURNAL_LOG";

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid trigger settings: {0}")]
    Trigger(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PolicySetting {
    Mutex,
    #[default]
    CancelAndReplace,
}

impl From<PolicySetting> for DispatchPolicy {
    fn from(value: PolicySetting) -> Self {
        match value {
            PolicySetting::Mutex => DispatchPolicy::Mutex,
            PolicySetting::CancelAndReplace => DispatchPolicy::CancelAndReplace,
        }
    }
}

/// Mirrors [`TriggerConfig`]; omitted fields keep the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TriggerSection {
    pub min_chars: usize,
    pub checkpoints: Vec<usize>,
    pub bucket_size: usize,
    pub cooldown_ms: u64,
    pub min_call_interval_ms: u64,
    pub debounce_ms: u64,
    pub settle_ms: u64,
    pub draft_save_ms: u64,
    pub policy: PolicySetting,
}

impl Default for TriggerSection {
    fn default() -> Self {
        let defaults = TriggerConfig::default();
        Self {
            min_chars: defaults.min_chars,
            checkpoints: defaults.checkpoints,
            bucket_size: defaults.bucket_size,
            cooldown_ms: defaults.cooldown_ms,
            min_call_interval_ms: defaults.min_call_interval_ms,
            debounce_ms: defaults.debounce_ms,
            settle_ms: defaults.settle_ms,
            draft_save_ms: defaults.draft_save_ms,
            policy: PolicySetting::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub data_dir: PathBuf,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub log: Option<String>,
    pub trigger: TriggerSection,
    /// File the values were read from; `None` when running on defaults.
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let refresh = RefreshSettings::default();
        Self {
            endpoint: refresh.endpoint,
            data_dir: PathBuf::from(".journal"),
            connect_timeout_ms: refresh.connect_timeout.as_millis() as u64,
            request_timeout_ms: refresh.request_timeout.as_millis() as u64,
            log: None,
            trigger: TriggerSection::default(),
            loaded_from: None,
        }
    }
}

impl AppConfig {
    /// Loads `JOURNAL_CONFIG` (or `./journal.ron`) and applies environment
    /// overrides. A missing default file is not an error.
    pub fn load() -> Result<Self, AppConfigError> {
        let explicit = std::env::var(ENV_CONFIG).ok().map(PathBuf::from);
        let mut config = match &explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppConfigError> {
        let content = fs::read_to_string(path).map_err(|source| AppConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content).map_err(|source| AppConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.loaded_from = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    /// Applies overrides from `lookup`; blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(endpoint) = value(ENV_ENDPOINT) {
            self.endpoint = endpoint.trim().to_string();
        }
        if let Some(dir) = value(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(log) = value(ENV_LOG) {
            self.log = Some(log);
        }
    }

    pub fn trigger_config(&self) -> Result<TriggerConfig, AppConfigError> {
        let section = &self.trigger;
        let config = TriggerConfig {
            min_chars: section.min_chars,
            checkpoints: section.checkpoints.clone(),
            bucket_size: section.bucket_size,
            cooldown_ms: section.cooldown_ms,
            min_call_interval_ms: section.min_call_interval_ms,
            debounce_ms: section.debounce_ms,
            settle_ms: section.settle_ms,
            draft_save_ms: section.draft_save_ms,
            policy: section.policy.into(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            endpoint: self.endpoint.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            ..RefreshSettings::default()
        }
    }
}
