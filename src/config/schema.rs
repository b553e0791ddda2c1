//! Configuration schema

use crate::notifications::NoticeSettings;
use crate::rules::RuleStore;
use crate::vault::WatchScope;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Vault location and trigger scope
    #[serde(default)]
    pub vault: VaultConfig,

    /// Move rules, evaluated in order
    #[serde(default, rename = "rule")]
    pub rules: RuleStore,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Polling interval in seconds for the fallback poll watcher
    #[serde(default = "default_polling_interval")]
    pub polling_interval_secs: u64,

    /// Ignore repeat events for the same path within this window (0 = off)
    #[serde(default)]
    pub debounce_ms: u64,

    /// Evaluate every in-scope note when the daemon starts
    #[serde(default)]
    pub scan_on_start: bool,

    /// Desktop notification after every move
    #[serde(default)]
    pub show_move_toast: bool,

    /// Desktop notification when evaluating or moving a note fails
    #[serde(default)]
    pub show_debug_toast: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            polling_interval_secs: default_polling_interval(),
            debounce_ms: 0,
            scan_on_start: false,
            show_move_toast: false,
            show_debug_toast: false,
        }
    }
}

impl GeneralConfig {
    pub fn notices(&self) -> NoticeSettings {
        NoticeSettings {
            on_move: self.show_move_toast,
            on_debug: self.show_debug_toast,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_polling_interval() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

/// Vault location and which of its notes trigger evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VaultConfig {
    /// Vault root (supports ~ and $VAR)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Notes directly in the vault root are evaluated
    #[serde(default = "default_true")]
    pub watch_root: bool,

    /// Folders whose direct children are evaluated
    #[serde(default)]
    pub watched_folders: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: None,
            watch_root: true,
            watched_folders: Vec::new(),
        }
    }
}

impl VaultConfig {
    pub fn scope(&self) -> WatchScope {
        WatchScope::new(self.watch_root, &self.watched_folders)
    }
}
