//! vaultsort - files markdown notes into folders by frontmatter property
//!
//! Watches a vault, reads the frontmatter of every changed note and moves the
//! note into a rule's folder when one of its properties matches.

pub mod config;
pub mod frontmatter;
pub mod mover;
pub mod notifications;
pub mod rules;
pub mod service;
pub mod vault;
pub mod watcher;

pub use config::Config;
pub use frontmatter::{Frontmatter, PropertyValue};
pub use mover::{MoveOutcome, Mover, Plan};
pub use rules::{Rule, RuleEngine, RuleStore};
pub use vault::{FsVault, Note, Vault};
pub use watcher::VaultWatcher;

/// Current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Expand ~ and environment variables ($VAR, ${VAR}) in a path
pub fn expand_path(path: &std::path::Path) -> std::path::PathBuf {
    let path_str = path.to_string_lossy();

    let home = || dirs::home_dir().map(|h| h.to_string_lossy().to_string());
    let expanded = match path_str.strip_prefix("~/") {
        Some(stripped) => match home() {
            Some(home) => format!("{}/{}", home.trim_end_matches('/'), stripped),
            None => path_str.to_string(),
        },
        None if path_str == "~" => home().unwrap_or_else(|| path_str.to_string()),
        None => path_str.to_string(),
    };

    use std::sync::LazyLock;
    static ENV_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
        regex::Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("invalid env regex")
    });

    let result = ENV_RE.replace_all(&expanded, |caps: &regex::Captures| {
        let var_name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or("");
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    });

    std::path::PathBuf::from(result.as_ref())
}
