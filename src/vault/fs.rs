//! Filesystem-backed vault

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{FolderOutcome, Note, Vault, VaultError};

/// Vault rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Open a vault rooted at `root` (must be an existing directory)
    pub fn open(root: &Path) -> Result<Self> {
        let root = std::fs::canonicalize(root)
            .with_context(|| format!("Vault not found: {}", root.display()))?;
        anyhow::ensure!(root.is_dir(), "Vault is not a directory: {}", root.display());
        Ok(Self { root })
    }

    /// Canonical vault root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a vault-relative path
    pub fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|s| !s.is_empty() && !matches!(*s, "." | ".."))
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    /// Every markdown note in the vault, skipping hidden directories and symlinks
    pub fn markdown_notes(&self) -> Result<Vec<Note>> {
        let mut files = Vec::new();
        walk_recursive(&self.root, &mut files)?;

        let mut notes: Vec<Note> = files
            .iter()
            .filter_map(|path| Note::from_fs_path(&self.root, path))
            .filter(Note::is_markdown)
            .collect();
        notes.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(notes)
    }
}

fn walk_recursive(path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(path)
        .with_context(|| format!("Failed to read directory {}", path.display()))?;
    for entry in entries {
        let entry = entry?;
        let ft = entry.file_type()?;
        if ft.is_symlink() {
            // Skip symlinks to avoid potential loops
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if ft.is_dir() {
            walk_recursive(&entry.path(), result)?;
        } else {
            result.push(entry.path());
        }
    }
    Ok(())
}

impl Vault for FsVault {
    async fn read(&self, note: &Note) -> Result<String, VaultError> {
        tokio::fs::read_to_string(self.resolve(note.path()))
            .await
            .map_err(|e| VaultError::io(note.path(), e))
    }

    async fn create_folder(&self, path: &str) -> FolderOutcome {
        let dir = self.resolve(path);

        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => return FolderOutcome::AlreadyExisted,
            Ok(_) => return FolderOutcome::Failed(format!("{} is a file", path)),
            Err(_) => {}
        }

        match tokio::fs::create_dir_all(&dir).await {
            Ok(()) => {
                info!("Created folder {}", path);
                FolderOutcome::Created
            }
            Err(e) => FolderOutcome::Failed(e.to_string()),
        }
    }

    async fn rename(&self, note: &Note, new_path: &str) -> Result<(), VaultError> {
        let from = self.resolve(note.path());
        let to = self.resolve(new_path);

        if tokio::fs::try_exists(&to)
            .await
            .map_err(|e| VaultError::io(new_path, e))?
        {
            return Err(VaultError::AlreadyExists {
                path: new_path.to_string(),
            });
        }

        debug!("Renaming {} -> {}", from.display(), to.display());
        tokio::fs::rename(&from, &to)
            .await
            .map_err(|e| VaultError::io(note.path(), e))
    }
}
