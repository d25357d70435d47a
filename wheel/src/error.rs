//! Error types and error handling

use thiserror::Error;

use crate::column::ParseError;
use crate::init::InitError;
use crate::merge::MergeError;
use crate::scaffold::ArtifactKind;
use crate::templates::{RenderFailure, TemplateLoadError};
use crate::types::MissingTypeMapping;

/// Broad class of a failure, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input; nothing was written
    Validation,
    /// Target already exists
    Conflict,
    /// Shared file could not be updated
    Merge,
    /// Filesystem failure
    Io,
    /// External program failed
    ExternalTool,
    /// Template failed to load or render
    Template,
}

/// Generator error type
#[derive(Debug, Error)]
pub enum Error {
    /// Resource name cannot become a Rust identifier
    #[error("invalid resource name '{name}': {reason}")]
    InvalidResourceName {
        /// Name as given
        name: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Column tokens could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An artifact failed; earlier artifacts of the run were kept
    #[error("failed to generate {kind} for '{resource}'")]
    Artifact {
        /// Artifact being generated
        kind: ArtifactKind,
        /// Resource name
        resource: String,
        /// What went wrong
        #[source]
        source: ArtifactError,
    },

    /// Application initialization failed
    #[error(transparent)]
    Init(#[from] InitError),

    /// Templates could not be loaded
    #[error(transparent)]
    Templates(#[from] TemplateLoadError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors producing or writing a single artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// A column kind has no type in this artifact
    #[error(transparent)]
    MissingTypeMapping(#[from] MissingTypeMapping),

    /// Template rendering failed
    #[error(transparent)]
    Render(#[from] RenderFailure),

    /// Writing the artifact failed
    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl ArtifactError {
    /// Category of this error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingTypeMapping(_) => ErrorCategory::Validation,
            Self::Render(_) => ErrorCategory::Template,
            Self::Merge(MergeError::ArtifactAlreadyExists { .. }) => ErrorCategory::Conflict,
            Self::Merge(MergeError::MalformedSharedFile { .. } | MergeError::AtomicReplace { .. }) => {
                ErrorCategory::Merge
            }
            Self::Merge(MergeError::Io { .. }) => ErrorCategory::Io,
        }
    }
}

impl Error {
    /// Category of this error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidResourceName { .. } | Self::Parse(_) | Self::Config(_) => ErrorCategory::Validation,
            Self::Artifact { source, .. } => source.category(),
            Self::Init(err) => err.category(),
            Self::Templates(TemplateLoadError::Io { .. }) => ErrorCategory::Io,
            Self::Templates(TemplateLoadError::Syntax { .. }) => ErrorCategory::Template,
        }
    }

    /// Artifact kind and resource name, for generation failures
    #[must_use]
    pub fn artifact(&self) -> Option<(ArtifactKind, &str)> {
        match self {
            Self::Artifact { kind, resource, .. } => Some((*kind, resource.as_str())),
            _ => None,
        }
    }
}
