//! Persistent navigation tuning.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FORMAT_VERSION: u32 = 1;
/// Depths past this no longer fit the legacy one-byte cost encoding.
pub const MAX_DEPTH_LIMIT: u16 = 250;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NavConfig {
    pub format_version: u32,
    pub queue_capacity: usize,
    /// Depth used by sweeps that don't set their own.
    pub max_depth: u16,
    pub unreachable_cost: u16,
    pub track_capacity: usize,
    pub door_track_capacity: usize,
    pub chest_fail_tolerance: i32,
    pub door_refusal_per_mille: u32,
    pub door_magic_per_mille: u32,
    pub door_magic_panel_turns: u32,
    pub dig_loop_break_per_mille: u32,
    pub trap_magic_mana_pct: i32,
    pub seed: u64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            format_version: CONFIG_FORMAT_VERSION,
            queue_capacity: 1536,
            max_depth: MAX_DEPTH_LIMIT,
            unreachable_cost: 250,
            track_capacity: 75,
            door_track_capacity: 100,
            chest_fail_tolerance: 7,
            door_refusal_per_mille: 10,
            door_magic_per_mille: 10,
            door_magic_panel_turns: 500,
            dig_loop_break_per_mille: 12,
            trap_magic_mana_pct: 80,
            seed: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported config format version {0}")]
    UnsupportedVersion(u32),
    #[error("queue capacity must be at least 2, got {0}")]
    QueueTooSmall(usize),
}

impl NavConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn write_atomic(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.format_version != CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.format_version));
        }
        if self.queue_capacity < 2 {
            return Err(ConfigError::QueueTooSmall(self.queue_capacity));
        }
        Ok(())
    }

    pub fn depth_limit(&self) -> u16 {
        self.max_depth.min(MAX_DEPTH_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn config_atomic_write_and_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nav.json");
        let config = NavConfig { queue_capacity: 64, seed: 99, ..NavConfig::default() };

        config.write_atomic(&path).expect("write");
        let loaded = NavConfig::load(&path).expect("load");
        assert_eq!(config, loaded);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: NavConfig =
            serde_json::from_str(r#"{ "format_version": 1, "track_capacity": 8 }"#)
                .expect("deserialize");
        assert_eq!(config.track_capacity, 8);
        assert_eq!(config.queue_capacity, NavConfig::default().queue_capacity);
    }

    #[test]
    fn load_rejects_unknown_version_and_tiny_queue() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nav.json");
        fs::write(&path, r#"{ "format_version": 7 }"#).expect("write");
        assert!(matches!(NavConfig::load(&path), Err(ConfigError::UnsupportedVersion(7))));

        fs::write(&path, r#"{ "queue_capacity": 1 }"#).expect("write");
        assert!(matches!(NavConfig::load(&path), Err(ConfigError::QueueTooSmall(1))));

        fs::write(&path, "not json").expect("write");
        assert!(matches!(NavConfig::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn depth_limit_is_clamped() {
        let config = NavConfig { max_depth: 999, ..NavConfig::default() };
        assert_eq!(config.depth_limit(), MAX_DEPTH_LIMIT);
    }
}
