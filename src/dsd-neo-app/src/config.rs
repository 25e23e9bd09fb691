// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),
}

/// Returns search paths for the combined `dsd-neo.toml` config file
/// (current directory → XDG config → /etc).
pub fn combined_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("dsd-neo.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("dsd-neo").join("dsd-neo.toml"));
    }
    paths.push(PathBuf::from("/etc/dsd-neo/dsd-neo.toml"));
    paths
}

/// Extract and deserialize a named section from a TOML file.
///
/// Returns `Ok(Some(cfg))` when the section is present and parses cleanly,
/// `Ok(None)` when the section is absent, or `Err` on I/O / parse failure.
fn load_section_from_file<T: DeserializeOwned>(
    path: &Path,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

    let table: toml::Table = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;

    let Some(section) = table.get(key) else {
        return Ok(None);
    };

    let section_toml = toml::to_string(section)
        .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
    let cfg = toml::from_str::<T>(&section_toml)
        .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
    Ok(Some(cfg))
}

/// Trait for loading configuration files with default paths, shared by
/// every dsd-neo binary.
pub trait ConfigFile: Sized + Default + DeserializeOwned {
    /// Config filename (e.g., "dsd-neo.toml").
    fn config_filename() -> &'static str;

    /// Section key inside a combined `dsd-neo.toml` file. Return `None`
    /// (the default) to disable combined-file support.
    fn combined_key() -> Option<&'static str> {
        None
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if let Some(key) = Self::combined_key() {
            if let Ok(Some(cfg)) = load_section_from_file::<Self>(path, key) {
                return Ok(cfg);
            }
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    /// Search default paths (CWD → XDG → /etc) and load the first config
    /// found. Returns `(config, path_where_found)`, falling back to
    /// `Default::default()` with no path when nothing is found.
    fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        let combined = combined_config_paths();
        let flat = Self::default_search_paths();

        let tiers = combined.len().max(flat.len());
        for i in 0..tiers {
            if let Some(key) = Self::combined_key() {
                if let Some(path) = combined.get(i) {
                    if path.exists() {
                        if let Some(cfg) = load_section_from_file::<Self>(path, key)? {
                            return Ok((cfg, Some(path.clone())));
                        }
                    }
                }
            }
            if let Some(path) = flat.get(i) {
                if path.exists() {
                    let cfg = Self::load_from_file(path)?;
                    return Ok((cfg, Some(path.clone())));
                }
            }
        }
        Ok((Self::default(), None))
    }

    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(Self::config_filename())];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("dsd-neo").join(Self::config_filename()));
        }
        paths.push(PathBuf::from("/etc/dsd-neo").join(Self::config_filename()));
        paths
    }
}

/// Per-role thread target for realtime scheduling and CPU pinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadRole {
    Dongle,
    Demod,
    Usb,
    Audio,
}

/// Runtime engine configuration: the enumerated knobs in the external
/// interfaces that aren't protocol state, only process shape and policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rt_sched_enabled: bool,
    pub rt_prio: HashMap<String, i32>,
    pub cpu_affinity: HashMap<String, u32>,
    pub ftz_daz_enabled: bool,
    pub p25_watchdog_ms: Option<u64>,
    pub trunk_enable: bool,
    pub p25_trunk: bool,
    pub trunk_tune_group_calls: bool,
    pub trunk_tune_private_calls: bool,
    pub trunk_tune_enc_calls: bool,
    pub trunk_hangtime_secs: u64,
    pub trunk_use_allow_list: bool,
    pub floating_point: bool,
    pub pulse_digi_out_channels: u8,
    pub unicode_supported: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rt_sched_enabled: false,
            rt_prio: HashMap::new(),
            cpu_affinity: HashMap::new(),
            ftz_daz_enabled: false,
            p25_watchdog_ms: None,
            trunk_enable: false,
            p25_trunk: false,
            trunk_tune_group_calls: true,
            trunk_tune_private_calls: false,
            trunk_tune_enc_calls: false,
            trunk_hangtime_secs: 3,
            trunk_use_allow_list: false,
            floating_point: false,
            pulse_digi_out_channels: 1,
            unicode_supported: true,
        }
    }
}

impl ConfigFile for EngineConfig {
    fn config_filename() -> &'static str {
        "dsd-neo.toml"
    }

    fn combined_key() -> Option<&'static str> {
        Some("dsd-neo")
    }
}

impl EngineConfig {
    /// Resolve the watchdog tick cadence, clamped to [20, 2000] ms, with
    /// the UI/headless defaults applied when unset.
    pub fn watchdog_cadence_ms(&self, headless: bool) -> u64 {
        let default = if headless { 400 } else { 200 };
        self.p25_watchdog_ms.unwrap_or(default).clamp(20, 2000)
    }

    pub fn rt_prio_for(&self, role: &str) -> Option<i32> {
        self.rt_prio.get(role).copied()
    }

    pub fn cpu_for(&self, role: &str) -> Option<u32> {
        self.cpu_affinity.get(role).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_policy_defaults() {
        let cfg = EngineConfig::default();
        assert!(!cfg.trunk_enable);
        assert!(cfg.trunk_tune_group_calls);
        assert!(!cfg.trunk_tune_enc_calls);
        assert_eq!(cfg.trunk_hangtime_secs, 3);
    }

    #[test]
    fn watchdog_cadence_uses_role_specific_default_when_unset() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.watchdog_cadence_ms(false), 200);
        assert_eq!(cfg.watchdog_cadence_ms(true), 400);
    }

    #[test]
    fn watchdog_cadence_override_is_clamped() {
        let mut cfg = EngineConfig::default();
        cfg.p25_watchdog_ms = Some(5);
        assert_eq!(cfg.watchdog_cadence_ms(false), 20);
        cfg.p25_watchdog_ms = Some(10_000);
        assert_eq!(cfg.watchdog_cadence_ms(false), 2000);
    }

    #[test]
    fn load_from_file_falls_back_to_error_for_missing_path() {
        let missing = PathBuf::from("/nonexistent/dsd-neo-test/dsd-neo.toml");
        assert!(EngineConfig::load_from_file(&missing).is_err());
    }

    #[test]
    fn load_from_file_parses_a_flat_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dsd-neo.toml");
        std::fs::write(
            &path,
            "trunk_enable = true\ntrunk_hangtime_secs = 5\n",
        )
        .unwrap();
        let cfg = EngineConfig::load_from_file(&path).unwrap();
        assert!(cfg.trunk_enable);
        assert_eq!(cfg.trunk_hangtime_secs, 5);
    }
}
