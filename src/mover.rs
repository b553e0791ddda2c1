//! Mover - turns a rule match into a folder creation and a rename

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::frontmatter::Frontmatter;
use crate::notifications::{NoticeSettings, NotificationKind, Notifier};
use crate::rules::{MatchKind, Rule, RuleEngine};
use crate::vault::{FolderOutcome, Note, Vault, VaultError};

/// Errors while moving a note
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: VaultError,
    },

    #[error("failed to create folder {folder}: {reason}")]
    CreateFolder { folder: String, reason: String },

    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: String,
        to: String,
        #[source]
        source: VaultError,
    },
}

impl MoveError {
    /// The note disappeared between the change event and processing
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MoveError::Read {
                source: VaultError::NotFound { .. },
                ..
            } | MoveError::Move {
                source: VaultError::NotFound { .. },
                ..
            }
        )
    }
}

/// A pending move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// Index of the matching rule
    pub rule_index: usize,
    pub kind: MatchKind,
    /// Normalized destination folder, empty for the vault root
    pub folder: String,
    /// New vault-relative path of the note
    pub destination: String,
}

/// What evaluating a note would do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    NoFrontmatter,
    NoMatch,
    AlreadyInPlace { rule_index: usize },
    Move(MovePlan),
}

/// What processing a note did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    NoFrontmatter,
    NoMatch,
    AlreadyInPlace { rule_index: usize },
    Moved { plan: MovePlan, folder: FolderOutcome },
}

/// Destination path for a note filed into `folder`
pub fn destination(folder: &str, note: &Note) -> String {
    if folder.is_empty() {
        note.name().to_string()
    } else {
        format!("{}/{}", folder, note.name())
    }
}

/// Applies rules to notes in a vault
pub struct Mover<'a, V, N> {
    vault: &'a V,
    notifier: &'a N,
    notices: NoticeSettings,
}

impl<'a, V: Vault, N: Notifier> Mover<'a, V, N> {
    pub fn new(vault: &'a V, notifier: &'a N, notices: NoticeSettings) -> Self {
        Self {
            vault,
            notifier,
            notices,
        }
    }

    /// Work out what should happen to a note without touching the vault
    pub async fn plan(&self, rules: &[Rule], note: &Note) -> Result<Plan, MoveError> {
        let content = self.vault.read(note).await.map_err(|source| MoveError::Read {
            path: note.path().to_string(),
            source,
        })?;

        let Some(frontmatter) = Frontmatter::from_document(&content) else {
            debug!("No frontmatter in {}", note);
            return Ok(Plan::NoFrontmatter);
        };

        let Some(found) = RuleEngine::new(rules).evaluate(&frontmatter) else {
            debug!("No rule matched {}", note);
            return Ok(Plan::NoMatch);
        };

        let folder = self.vault.normalize(&found.rule.folder);
        let destination = destination(&folder, note);

        if destination == note.path() {
            debug!("{} is already in place", note);
            return Ok(Plan::AlreadyInPlace {
                rule_index: found.index,
            });
        }

        Ok(Plan::Move(MovePlan {
            rule_index: found.index,
            kind: found.kind,
            folder,
            destination,
        }))
    }

    /// Evaluate a note and move it if a rule matches.
    ///
    /// Failures emit a debug notice (when enabled) and are returned.
    pub async fn process(&self, rules: &[Rule], note: &Note) -> Result<MoveOutcome, MoveError> {
        let result = match self.plan(rules, note).await {
            Ok(Plan::NoFrontmatter) => Ok(MoveOutcome::NoFrontmatter),
            Ok(Plan::NoMatch) => Ok(MoveOutcome::NoMatch),
            Ok(Plan::AlreadyInPlace { rule_index }) => {
                Ok(MoveOutcome::AlreadyInPlace { rule_index })
            }
            Ok(Plan::Move(plan)) => self.apply(note, plan).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result
            && !e.is_not_found()
        {
            self.send(NotificationKind::Debug, &e.to_string());
        }

        result
    }

    /// Carry out a planned move
    pub async fn apply(&self, note: &Note, plan: MovePlan) -> Result<MoveOutcome, MoveError> {
        let folder = if plan.folder.is_empty() {
            FolderOutcome::AlreadyExisted
        } else {
            match self.vault.create_folder(&plan.folder).await {
                FolderOutcome::Failed(reason) => {
                    return Err(MoveError::CreateFolder {
                        folder: plan.folder,
                        reason,
                    });
                }
                outcome => outcome,
            }
        };

        self.vault
            .rename(note, &plan.destination)
            .await
            .map_err(|source| MoveError::Move {
                from: note.path().to_string(),
                to: plan.destination.clone(),
                source,
            })?;

        info!("Moved {} -> {}", note, plan.destination);
        self.send(
            NotificationKind::Moved,
            &format!("Moved {} to {}", note.name(), display_folder(&plan.folder)),
        );

        Ok(MoveOutcome::Moved { plan, folder })
    }

    fn send(&self, kind: NotificationKind, message: &str) {
        if self.notices.allows(kind) {
            self.notifier.notify(kind, message);
        } else if kind == NotificationKind::Debug {
            warn!("{}", message);
        }
    }
}

fn display_folder(folder: &str) -> &str {
    if folder.is_empty() { "/" } else { folder }
}
