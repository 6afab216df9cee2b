//! TOML-based application configuration.
//!
//! Stores the tunables of the engine:
//! - How long a stored fragment may be
//! - How the display slices and renders time
//!
//! Configuration is stored at `~/.config/timetile/config.toml`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::view::{RenderPolicy, HALF_HOUR_MINUTES};

/// Storage-side configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentsConfig {
    #[serde(default = "default_max_fragment_minutes")]
    pub max_fragment_minutes: u32,
}

/// Display-side configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    #[serde(default = "default_min_block_minutes")]
    pub min_block_minutes: u32,
    #[serde(default = "default_free_time_partition_minutes")]
    pub free_time_partition_minutes: u32,
    /// Blocks shorter than this are merged after rendering; 0 disables it.
    #[serde(default = "default_merge_min_minutes")]
    pub merge_min_minutes: u32,
    /// How far back `log list` and `log fragments` look by default.
    #[serde(default = "default_hours_to_load")]
    pub hours_to_load: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/timetile/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fragments: FragmentsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_max_fragment_minutes() -> u32 {
    60
}
fn default_interval_minutes() -> u32 {
    30
}
fn default_min_block_minutes() -> u32 {
    5
}
fn default_free_time_partition_minutes() -> u32 {
    10
}
fn default_merge_min_minutes() -> u32 {
    5
}
fn default_hours_to_load() -> u32 {
    8
}

impl Default for FragmentsConfig {
    fn default() -> Self {
        Self {
            max_fragment_minutes: default_max_fragment_minutes(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            min_block_minutes: default_min_block_minutes(),
            free_time_partition_minutes: default_free_time_partition_minutes(),
            merge_min_minutes: default_merge_min_minutes(),
            hours_to_load: default_hours_to_load(),
        }
    }
}

impl Config {
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
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u32>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
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

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            debug!(path = %path.display(), "wrote default config");
            Ok(cfg)
        }
    }

    /// Read and validate a config file at an explicit path.
    ///
    /// # Errors
    ///
    /// Returns `LoadFailed` if the file cannot be read, `ParseFailed` if it is
    /// not valid TOML for this schema, and `InvalidValue` if validation fails.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns `SaveFailed` if serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
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
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without touching the disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config is invalid. On error `self` is unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every leaf key with its current value, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (key, child) in map {
                        let path = if prefix.is_empty() {
                            key.clone()
                        } else {
                            format!("{prefix}.{key}")
                        };
                        walk(&path, child, out);
                    }
                }
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Check the cross-field constraints the renderer relies on.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let d = &self.display;

        let positive = [
            ("fragments.max_fragment_minutes", self.fragments.max_fragment_minutes),
            ("display.interval_minutes", d.interval_minutes),
            ("display.min_block_minutes", d.min_block_minutes),
            ("display.free_time_partition_minutes", d.free_time_partition_minutes),
            ("display.hours_to_load", d.hours_to_load),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(invalid(key, "must be greater than 0".into()));
            }
        }
        if d.interval_minutes % d.free_time_partition_minutes != 0 {
            return Err(invalid(
                "display.free_time_partition_minutes",
                format!("must evenly divide interval_minutes ({})", d.interval_minutes),
            ));
        }
        if d.min_block_minutes >= d.interval_minutes {
            return Err(invalid(
                "display.min_block_minutes",
                format!("must be shorter than interval_minutes ({})", d.interval_minutes),
            ));
        }
        // Hour rows are always rendered as two half hours.
        if HALF_HOUR_MINUTES % i64::from(d.free_time_partition_minutes) != 0 {
            return Err(invalid(
                "display.free_time_partition_minutes",
                format!("must evenly divide the rendered half hour ({HALF_HOUR_MINUTES})"),
            ));
        }
        if i64::from(d.min_block_minutes) >= HALF_HOUR_MINUTES {
            return Err(invalid(
                "display.min_block_minutes",
                format!("must be shorter than the rendered half hour ({HALF_HOUR_MINUTES})"),
            ));
        }
        Ok(())
    }

    pub fn max_fragment_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.fragments.max_fragment_minutes))
    }

    pub fn interval_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.display.interval_minutes))
    }

    pub fn hours_to_load(&self) -> Duration {
        Duration::hours(i64::from(self.display.hours_to_load))
    }

    /// Renderer settings, with merging disabled when `merge_min_minutes` is 0.
    pub fn render_policy(&self) -> RenderPolicy {
        let d = &self.display;
        RenderPolicy {
            min_block: Duration::minutes(i64::from(d.min_block_minutes)),
            free_time_partition: Duration::minutes(i64::from(d.free_time_partition_minutes)),
            merge_min: (d.merge_min_minutes > 0)
                .then(|| Duration::minutes(i64::from(d.merge_min_minutes))),
        }
    }
}
