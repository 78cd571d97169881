//! Configuration loading for Crew Commander.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::Error;
use crate::session::Identity;
pub type Result<T> = std::result::Result<T, Error>;

/// Get the Crew Commander home directory (~/.crew).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".crew"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.crew/settings.json, creating the file with defaults
/// on first run.
pub fn load_settings() -> Result<Settings> {
    let path = get_settings_path()?;

    if !path.exists() {
        let settings = Settings::default();
        save_settings(&settings)?;
        tracing::info!("Created default settings at {}", path.display());
        return Ok(settings);
    }

    let content = std::fs::read_to_string(&path)?;
    let mut settings: Settings = serde_json::from_str(&content)?;

    // Self-heal installs that predate per-identity messaging targets.
    if ensure_messaging_targets(&mut settings) {
        save_settings(&settings)?;
        tracing::info!("Applied default messaging targets to {}", path.display());
    }

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load settings or return defaults if loading fails.
pub fn load_settings_or_default() -> Settings {
    load_settings().unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}, using defaults", e);
        Settings::default()
    })
}

/// Save settings to ~/.crew/settings.json.
pub fn save_settings(settings: &Settings) -> Result<()> {
    let path = get_settings_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(settings)?)?;
    Ok(())
}

fn ensure_messaging_targets(settings: &mut Settings) -> bool {
    let mut changed = false;
    for identity in Identity::ALL {
        if !settings.messaging.targets.contains_key(identity.key()) {
            settings
                .messaging
                .targets
                .insert(identity.key().to_string(), identity.key().to_string());
            changed = true;
        }
    }
    changed
}

/// Installation-mode bookkeeping (dev / pip / apt).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct VersionManagement {
    #[serde(default = "default_preferred_mode")]
    pub preferred_mode: String,
    #[serde(default = "default_available_modes")]
    pub available_modes: HashMap<String, String>,
}

fn default_preferred_mode() -> String {
    "auto".to_string()
}

fn default_available_modes() -> HashMap<String, String> {
    let mut modes = HashMap::new();
    modes.insert("dev".to_string(), "/usr/local/bin/crew".to_string());
    modes.insert("pip".to_string(), "~/.local/bin/crew".to_string());
    modes.insert("apt".to_string(), "/usr/bin/crew".to_string());
    modes
}

impl Default for VersionManagement {
    fn default() -> Self {
        Self {
            preferred_mode: default_preferred_mode(),
            available_modes: default_available_modes(),
        }
    }
}

/// Inter-agent messaging over tmux.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Messaging {
    /// Identity key -> tmux session name.
    #[serde(default)]
    pub targets: HashMap<String, String>,
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

fn default_send_timeout_secs() -> u64 {
    5
}

impl Default for Messaging {
    fn default() -> Self {
        let targets = Identity::ALL
            .iter()
            .map(|id| (id.key().to_string(), id.key().to_string()))
            .collect();
        Self {
            targets,
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

/// Git / CI wrapper configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GitIntegration {
    pub repo_dir: Option<PathBuf>,
    pub homepage_dir: Option<PathBuf>,
    #[serde(default = "default_test_command")]
    pub test_command: String,
    #[serde(default = "default_git_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_test_command() -> String {
    "cargo test".to_string()
}

fn default_git_timeout_secs() -> u64 {
    600
}

impl Default for GitIntegration {
    fn default() -> Self {
        Self {
            repo_dir: None,
            homepage_dir: None,
            test_command: default_test_command(),
            timeout_secs: default_git_timeout_secs(),
        }
    }
}

/// Packaging and PPA upload configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Packaging {
    #[serde(default = "default_ppa")]
    pub ppa: String,
    #[serde(default = "default_base_packages")]
    pub base_packages: Vec<String>,
    #[serde(default = "default_meta_packages")]
    pub meta_packages: Vec<String>,
    pub gpg_key: Option<String>,
    pub build_dir: Option<PathBuf>,
    #[serde(default = "default_packaging_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ppa() -> String {
    "ppa:collective-context/crew".to_string()
}

fn default_base_packages() -> Vec<String> {
    vec!["crew".to_string()]
}

fn default_meta_packages() -> Vec<String> {
    vec!["crewcmd".to_string()]
}

fn default_packaging_timeout_secs() -> u64 {
    900
}

impl Default for Packaging {
    fn default() -> Self {
        Self {
            ppa: default_ppa(),
            base_packages: default_base_packages(),
            meta_packages: default_meta_packages(),
            gpg_key: None,
            build_dir: None,
            timeout_secs: default_packaging_timeout_secs(),
        }
    }
}

/// Outbound message guard selection. `mode` is a visible configuration
/// choice: "allow_all" (no-op default) or "pattern".
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GuardConfig {
    #[serde(default = "default_guard_mode")]
    pub mode: String,
    #[serde(default)]
    pub deny_patterns: Vec<String>,
}

fn default_guard_mode() -> String {
    "allow_all".to_string()
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            mode: default_guard_mode(),
            deny_patterns: Vec::new(),
        }
    }
}

/// Crew Commander settings.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    #[serde(default)]
    pub version_management: VersionManagement,

    #[serde(default)]
    pub messaging: Messaging,

    #[serde(default)]
    pub git: GitIntegration,

    #[serde(default)]
    pub packaging: Packaging,

    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version_management: VersionManagement::default(),
            messaging: Messaging::default(),
            git: GitIntegration::default(),
            packaging: Packaging::default(),
            guard: GuardConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Apply a `key=value` assignment from `config -- set key=value`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "log_level" => self.log_level = value.to_string(),
            "version_management.preferred_mode" => {
                if !["auto", "dev", "pip", "apt"].contains(&value) {
                    return Err(Error::Config(format!(
                        "invalid mode '{}' (expected auto, dev, pip or apt)",
                        value
                    )));
                }
                self.version_management.preferred_mode = value.to_string();
            }
            "git.repo_dir" => self.git.repo_dir = Some(PathBuf::from(value)),
            "git.homepage_dir" => self.git.homepage_dir = Some(PathBuf::from(value)),
            "git.test_command" => self.git.test_command = value.to_string(),
            "packaging.ppa" => self.packaging.ppa = value.to_string(),
            "packaging.gpg_key" => self.packaging.gpg_key = Some(value.to_string()),
            "packaging.build_dir" => self.packaging.build_dir = Some(PathBuf::from(value)),
            "guard.mode" => {
                if !["allow_all", "pattern"].contains(&value) {
                    return Err(Error::Config(format!(
                        "invalid guard mode '{}' (expected allow_all or pattern)",
                        value
                    )));
                }
                self.guard.mode = value.to_string();
            }
            other => {
                if let Some(identity_key) = other.strip_prefix("messaging.targets.") {
                    let identity: Identity = identity_key.parse()?;
                    self.messaging
                        .targets
                        .insert(identity.key().to_string(), value.to_string());
                } else {
                    return Err(Error::Config(format!("unknown settings key: {}", other)));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_identities() {
        let settings = Settings::default();
        for identity in Identity::ALL {
            assert!(settings.messaging.targets.contains_key(identity.key()));
        }
    }

    #[test]
    fn set_value_accepts_known_keys() {
        let mut settings = Settings::default();
        settings.set_value("log_level", "debug").unwrap();
        assert_eq!(settings.log_level, "debug");

        settings
            .set_value("messaging.targets.cl1", "claude-main")
            .unwrap();
        assert_eq!(
            settings.messaging.targets.get("claude-1").map(String::as_str),
            Some("claude-main")
        );
    }

    #[test]
    fn set_value_rejects_unknown_keys_and_bad_modes() {
        let mut settings = Settings::default();
        assert!(settings.set_value("nope.nothing", "x").is_err());
        assert!(settings
            .set_value("version_management.preferred_mode", "flatpak")
            .is_err());
        assert!(settings.set_value("guard.mode", "maybe").is_err());
        assert!(settings.set_value("messaging.targets.cl9", "x").is_err());
    }

    #[test]
    fn settings_round_trip_through_json() {
        let mut settings = Settings::default();
        settings.guard.mode = "pattern".to_string();
        settings.guard.deny_patterns = vec!["rm -rf".to_string()];

        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.guard.mode, "pattern");
        assert_eq!(back.guard.deny_patterns, vec!["rm -rf"]);
    }
}
