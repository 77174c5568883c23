//! TOML-based engine configuration.
//!
//! Stores scheduling preferences:
//! - Default auto-dismiss durations and the exit-animation grace delay
//! - Default screen slot for requests that do not name one
//! - Whether hover and document visibility pause countdowns
//!
//! Configuration is stored at `~/.config/toastline/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::toast::{Position, ToastKind};

/// Longest accepted grace delay.
const MAX_GRACE_DELAY_MS: u64 = 60_000;

/// Countdown configuration, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_duration_ms")]
    pub default_duration_ms: u64,
    /// Budget for `loading` toasts without an explicit duration. 0 = sticky.
    #[serde(default)]
    pub loading_duration_ms: u64,
    /// Delay between removal and physical deletion, reserved for the exit animation.
    #[serde(default = "default_grace_delay_ms")]
    pub grace_delay_ms: u64,
}

/// Slot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotsConfig {
    #[serde(default)]
    pub default_position: Position,
}

/// Pause behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    #[serde(default = "default_true")]
    pub pause_while_hidden: bool,
    #[serde(default = "default_true")]
    pub pause_on_hover: bool,
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/toastline/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub slots: SlotsConfig,
    #[serde(default)]
    pub behaviour: BehaviourConfig,
}

fn default_duration_ms() -> u64 {
    4000
}
fn default_grace_delay_ms() -> u64 {
    200
}
fn default_true() -> bool {
    true
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: default_duration_ms(),
            loading_duration_ms: 0,
            grace_delay_ms: default_grace_delay_ms(),
        }
    }
}

impl Default for SlotsConfig {
    fn default() -> Self {
        Self {
            default_position: Position::Bottom,
        }
    }
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            pause_while_hidden: true,
            pause_on_hover: true,
        }
    }
}

impl Config {
    /// Budget for a request of `kind` that gave no duration.
    pub fn duration_for(&self, kind: ToastKind) -> u64 {
        match kind {
            ToastKind::Loading => self.timing.loading_duration_ms,
            _ => self.timing.default_duration_ms,
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero default duration or a
    /// grace delay above one minute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.default_duration_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timing.default_duration_ms".into(),
                message: "must be greater than 0; use an explicit duration of 0 for sticky toasts"
                    .into(),
            });
        }
        if self.timing.grace_delay_ms > MAX_GRACE_DELAY_MS {
            return Err(ConfigError::InvalidValue {
                key: "timing.grace_delay_ms".into(),
                message: format!("must be at most {MAX_GRACE_DELAY_MS}"),
            });
        }
        Ok(())
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|e| invalid(format!("cannot parse '{value}' as number: {e}")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot replace a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location, `<data dir>/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if the file exists but is unreadable
    /// or invalid, `ConfigError::SaveFailed` if defaults cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::SaveFailed` if serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config fails validation. `self` is left unchanged
    /// on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
