//! Vault access - notes, paths and the file operations the mover needs

mod fs;
#[cfg(test)]
pub(crate) mod memory;
mod scope;

pub use fs::FsVault;
pub use scope::WatchScope;

use std::path::{Component, Path};
use thiserror::Error;

/// Errors from vault file operations
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("{path} not found")]
    NotFound { path: String },

    #[error("{path} already exists")]
    AlreadyExists { path: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl VaultError {
    /// Map an I/O error on a vault path
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            VaultError::NotFound { path }
        } else {
            VaultError::Io { path, source }
        }
    }
}

/// Result of asking the vault to create a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOutcome {
    Created,
    AlreadyExisted,
    Failed(String),
}

/// A markdown note, addressed by its vault-relative path (`/`-separated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Note {
    path: String,
}

impl Note {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Build a note from an absolute filesystem path inside `root`.
    ///
    /// Returns `None` for paths outside the vault and for anything inside a
    /// hidden directory (`.obsidian`, `.trash`, ...).
    pub fn from_fs_path(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    let segment = segment.to_str()?;
                    if segment.starts_with('.') {
                        return None;
                    }
                    segments.push(segment);
                }
                _ => return None,
            }
        }
        if segments.is_empty() {
            return None;
        }
        Some(Self::new(segments.join("/")))
    }

    /// Vault-relative path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name including extension
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Containing folder, empty for the vault root
    pub fn folder(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.name();
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Some(ext),
            _ => None,
        }
    }

    pub fn is_markdown(&self) -> bool {
        self.extension() == Some("md")
    }
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// Host operations the mover relies on
#[allow(async_fn_in_trait)]
pub trait Vault {
    /// Read a note's full text
    async fn read(&self, note: &Note) -> Result<String, VaultError>;

    /// Canonical form of a user-entered folder path
    fn normalize(&self, raw: &str) -> String {
        normalize_path(raw)
    }

    /// Make sure a folder exists
    async fn create_folder(&self, path: &str) -> FolderOutcome;

    /// Move a note to a new vault-relative path. Never overwrites.
    async fn rename(&self, note: &Note, new_path: &str) -> Result<(), VaultError>;
}

/// Normalize a vault-relative folder path: backslashes become slashes,
/// repeated slashes collapse, surrounding whitespace and slashes are trimmed,
/// and non-breaking spaces become plain spaces. The vault root is `""`.
pub fn normalize_path(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_slash = false;

    for c in raw.trim().chars() {
        match c {
            '/' | '\\' => {
                if !last_was_slash {
                    out.push('/');
                }
                last_was_slash = true;
            }
            '\u{00A0}' | '\u{202F}' => {
                out.push(' ');
                last_was_slash = false;
            }
            c => {
                out.push(c);
                last_was_slash = false;
            }
        }
    }

    // Folders always stay inside the vault
    out.split('/')
        .filter(|segment| !segment.is_empty() && !matches!(segment.trim(), "." | ".."))
        .collect::<Vec<_>>()
        .join("/")
}
