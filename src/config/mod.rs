//! Configuration management

mod schema;

pub use schema::{Config, GeneralConfig, VaultConfig};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

impl Config {
    /// Load configuration from a file or default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = Self::resolve_path(path)?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

            let config: Config = toml::from_str(&content).with_context(|| {
                format!("Failed to parse config from {}", config_path.display())
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file (with advisory file locking)
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = Self::resolve_path(path)?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        let lock_path = config_path.with_extension("toml.lock");
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

        use fs2::FileExt;
        lock_file
            .lock_exclusive()
            .with_context(|| "Failed to acquire config file lock")?;

        let result = std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {}", config_path.display()));

        let _ = lock_file.unlock();

        result
    }

    /// The explicit path, or the default location
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        path.map(PathBuf::from)
            .or_else(Self::default_path)
            .context("Could not determine config path")
    }

    /// Get the default config file path
    /// Uses the platform config directory (via dirs::config_dir), falling back to ~/.config
    pub fn default_path() -> Option<PathBuf> {
        let config_base =
            dirs::config_dir().or_else(|| dirs::home_dir().map(|d| d.join(".config")))?;
        Some(config_base.join("vaultsort").join("config.toml"))
    }

    /// Vault root: the override if given, else the configured path, with ~ and $VAR expanded
    pub fn vault_root(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        let path = override_path
            .or(self.vault.path.as_deref())
            .context("No vault configured (set [vault] path or pass --vault)")?;
        Ok(crate::expand_path(path))
    }

    /// Problems that make rules or settings useless without being parse errors
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.vault.path.is_none() {
            warnings.push("no vault path configured".to_string());
        }
        if !self.vault.watch_root && self.vault.watched_folders.is_empty() {
            warnings.push(
                "watch_root is off and no watched_folders are set: nothing will be evaluated"
                    .to_string(),
            );
        }

        for (i, rule) in self.rules.list().iter().enumerate() {
            if rule.property.trim().is_empty() {
                warnings.push(format!("rule {} has no property and will never match", i + 1));
            }
            if rule.value.trim().is_empty() {
                warnings.push(format!("rule {} has no value and will never match", i + 1));
            }
            if crate::vault::normalize_path(&rule.folder).is_empty() {
                warnings.push(format!("rule {} moves notes to the vault root", i + 1));
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(Some(tmp.path().join("config.toml").as_path())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let path = tmp.child("nested/config.toml");

        let mut config = Config::default();
        config.rules.add(Rule::new("domain", "Health", "Health"));
        config.general.show_move_toast = true;
        config.save(Some(path.path())).unwrap();

        path.assert(predicate::str::contains("show_move_toast = true"));
        let loaded = Config::load(Some(path.path())).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_file_fails() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let path = tmp.child("config.toml");
        path.write_str("[[rule]\nproperty = ").unwrap();

        assert!(Config::load(Some(path.path())).is_err());
    }

    #[test]
    fn test_vault_root_prefers_override() {
        let mut config = Config::default();
        assert!(config.vault_root(None).is_err());

        config.vault.path = Some(PathBuf::from("/notes"));
        assert_eq!(config.vault_root(None).unwrap(), PathBuf::from("/notes"));
        assert_eq!(
            config.vault_root(Some(Path::new("/other"))).unwrap(),
            PathBuf::from("/other")
        );
    }

    #[test]
    fn test_warnings() {
        let mut config = Config::default();
        config.vault.path = Some(PathBuf::from("/notes"));
        assert!(config.warnings().is_empty());

        config.rules.add(Rule::new("domain", "Health", "Health"));
        config.rules.add(Rule::new("", "", "/"));
        let warnings = config.warnings();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().all(|w| w.starts_with("rule 2")));
    }
}
