//! Writing rendered artifacts into a project
//!
//! Per-resource files are created once and never overwritten. Entries in
//! shared files (route table, migration manifest, policy table, module
//! registries) are inserted above a fixed anchor line, at most once per
//! resource: each entry carries a marker, and an entry whose marker is already
//! present is skipped.
//!
//! Shared files are rewritten atomically, so an interrupted run leaves either
//! the previous or the updated file, never a truncated one.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::layout::ProjectLayout;
use crate::scaffold::ArtifactKind;
use crate::store::FileStore;
use crate::templates::project;

/// Errors applying an artifact
#[derive(Debug, Error)]
pub enum MergeError {
    /// A create-only target already exists
    #[error("{} already exists; refusing to overwrite", path.display())]
    ArtifactAlreadyExists {
        /// Existing file
        path: PathBuf,
    },

    /// A shared file lacks its insertion anchor
    #[error("{} has no '{anchor}' line to insert before", path.display())]
    MalformedSharedFile {
        /// Shared file
        path: PathBuf,
        /// Anchor that was looked for
        anchor: &'static str,
    },

    /// Atomic replacement of a shared file failed
    #[error("failed to update {}", path.display())]
    AtomicReplace {
        /// Shared file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Any other filesystem failure
    #[error("I/O error on {}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Shared files that accumulate one entry per resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SharedFile {
    /// Route table
    Routes,
    /// Migration manifest
    MigrationManifest,
    /// Authorization policy table
    Policies,
    /// `mod.rs` of the entities directory
    EntityModules,
    /// `mod.rs` of the models directory
    ModelModules,
    /// `mod.rs` of the handlers directory
    HandlerModules,
}

impl SharedFile {
    /// Location of the file in a project
    #[must_use]
    pub fn path(self, layout: &ProjectLayout) -> PathBuf {
        match self {
            Self::Routes => layout.routes_file.clone(),
            Self::MigrationManifest => layout.migration_manifest.clone(),
            Self::Policies => layout.policy_file.clone(),
            Self::EntityModules => layout.entities_registry(),
            Self::ModelModules => layout.models_registry(),
            Self::HandlerModules => layout.handlers_registry(),
        }
    }

    /// Anchor line new entries are inserted before
    #[must_use]
    pub const fn anchor(self) -> &'static str {
        match self {
            Self::Routes => "wheel:routes:end",
            Self::MigrationManifest => "wheel:migrations:end",
            Self::Policies => "wheel:policies:end",
            Self::EntityModules | Self::ModelModules | Self::HandlerModules => "wheel:modules:end",
        }
    }

    /// Content used when the file does not exist yet
    #[must_use]
    pub const fn skeleton(self) -> &'static str {
        match self {
            Self::Routes => project::ROUTES_RS,
            Self::MigrationManifest => project::MIGRATIONS_RS,
            Self::Policies => project::AUTHORIZATION_RS,
            Self::EntityModules => project::ENTITIES_MOD,
            Self::ModelModules => project::MODELS_MOD,
            Self::HandlerModules => project::HANDLERS_MOD,
        }
    }
}

/// How an artifact is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Write a new file; fail if it exists
    CreateOnly,
    /// Insert into a shared file unless `marker` is already present
    AppendOnce {
        /// Shared file being extended
        file: SharedFile,
        /// Token identifying this entry
        marker: String,
    },
}

/// A rendered file or fragment, ready to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Artifact this belongs to
    pub kind: ArtifactKind,
    /// Path relative to the project root
    pub target_path: PathBuf,
    /// Rendered content
    pub content: String,
    /// Write strategy
    pub strategy: MergeStrategy,
}

/// Result of applying an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// New file written
    Created,
    /// Entry inserted into a shared file
    Appended,
    /// Entry was already present; nothing written
    AlreadyApplied,
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Created => "created",
            Self::Appended => "updated",
            Self::AlreadyApplied => "unchanged",
        })
    }
}

/// Apply one artifact through `store`
///
/// # Errors
///
/// - [`MergeError::ArtifactAlreadyExists`] when a create-only target exists
///   (the existing file is left as is)
/// - [`MergeError::MalformedSharedFile`] when a shared file has no anchor
/// - [`MergeError::AtomicReplace`] or [`MergeError::Io`] on filesystem errors
pub fn apply(artifact: &Artifact, store: &dyn FileStore) -> Result<MergeOutcome, MergeError> {
    let path = artifact.target_path.as_path();

    match &artifact.strategy {
        MergeStrategy::CreateOnly => {
            if store.exists(path) {
                return Err(MergeError::ArtifactAlreadyExists {
                    path: path.to_path_buf(),
                });
            }

            store
                .create_new(path, &artifact.content)
                .map_err(|source| match source.kind() {
                    io::ErrorKind::AlreadyExists => MergeError::ArtifactAlreadyExists {
                        path: path.to_path_buf(),
                    },
                    _ => MergeError::Io {
                        path: path.to_path_buf(),
                        source,
                    },
                })?;

            tracing::info!(kind = %artifact.kind, path = %path.display(), "created");
            Ok(MergeOutcome::Created)
        }

        MergeStrategy::AppendOnce { file, marker } => {
            let current = store
                .read(path)
                .map_err(|source| MergeError::Io {
                    path: path.to_path_buf(),
                    source,
                })?
                .unwrap_or_else(|| file.skeleton().to_string());

            if contains_marker(&current, marker) {
                tracing::info!(kind = %artifact.kind, path = %path.display(), %marker, "already applied");
                return Ok(MergeOutcome::AlreadyApplied);
            }

            let updated = insert_before_anchor(&current, file.anchor(), &artifact.content)
                .ok_or_else(|| MergeError::MalformedSharedFile {
                    path: path.to_path_buf(),
                    anchor: file.anchor(),
                })?;

            store
                .replace(path, &updated)
                .map_err(|source| MergeError::AtomicReplace {
                    path: path.to_path_buf(),
                    source,
                })?;

            tracing::info!(kind = %artifact.kind, path = %path.display(), %marker, "appended");
            Ok(MergeOutcome::Appended)
        }
    }
}

/// Whether `marker` occurs in `content` as a whole token
///
/// The characters around a match must not be identifier characters, so
/// `wheel:route:post` does not match inside `wheel:route:posts`.
#[must_use]
pub fn contains_marker(content: &str, marker: &str) -> bool {
    if marker.is_empty() {
        return false;
    }

    content.match_indices(marker).any(|(at, _)| {
        let before = content[..at].chars().next_back();
        let after = content[at + marker.len()..].chars().next();
        before.is_none_or(|c| !is_ident_char(c)) && after.is_none_or(|c| !is_ident_char(c))
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Insert `fragment` as whole lines directly above the first anchor line
///
/// Returns `None` when no line carries the anchor.
fn insert_before_anchor(content: &str, anchor: &str, fragment: &str) -> Option<String> {
    let mut offset = 0;
    let mut anchor_at = None;
    for line in content.split_inclusive('\n') {
        if contains_marker(line, anchor) {
            anchor_at = Some(offset);
            break;
        }
        offset += line.len();
    }
    let anchor_at = anchor_at?;

    let fragment = fragment.trim_matches('\n');
    let mut updated = String::with_capacity(content.len() + fragment.len() + 1);
    updated.push_str(&content[..anchor_at]);
    updated.push_str(fragment);
    updated.push('\n');
    updated.push_str(&content[anchor_at..]);
    Some(updated)
}

/// Convenience for building shared-file artifacts
#[must_use]
pub fn shared_artifact(
    kind: ArtifactKind,
    file: SharedFile,
    layout: &ProjectLayout,
    marker: impl Into<String>,
    content: String,
) -> Artifact {
    Artifact {
        kind,
        target_path: file.path(layout),
        content,
        strategy: MergeStrategy::AppendOnce {
            file,
            marker: marker.into(),
        },
    }
}

/// Convenience for building create-only artifacts
#[must_use]
pub fn new_file_artifact(kind: ArtifactKind, path: &Path, content: String) -> Artifact {
    Artifact {
        kind,
        target_path: path.to_path_buf(),
        content,
        strategy: MergeStrategy::CreateOnly,
    }
}
