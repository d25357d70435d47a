//! New application initialization
//!
//! Renders the project tree into `<base>/<app_name>` and, unless disabled,
//! initializes version control in it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::json;
use thiserror::Error;

use crate::config::VcsSettings;
use crate::error::{Error, ErrorCategory};
use crate::layout::ProjectLayout;
use crate::process::{Invocation, ProcessRunner, ProcessStatus};
use crate::templates::{RenderFailure, TemplateId, TemplateRegistry};

/// Errors initializing an application
#[derive(Debug, Error)]
pub enum InitError {
    /// Repository path does not end in a usable crate name
    #[error("invalid repository '{0}': the last path segment must be a valid crate name (lowercase letters, digits, '_' or '-')")]
    InvalidRepository(String),

    /// Destination exists and has entries
    #[error("{} already exists and is not empty", path.display())]
    DestinationNotEmpty {
        /// Destination directory
        path: PathBuf,
    },

    /// A project file could not be written
    #[error("failed to write {}", path.display())]
    TemplateCopyFailed {
        /// File being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Destination could not be inspected
    #[error("cannot read {}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A project template failed to render
    #[error(transparent)]
    Render(#[from] RenderFailure),

    /// Version-control program could not be started
    #[error("failed to run {program}")]
    Spawn {
        /// Program name
        program: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Version-control program failed
    #[error("{program} failed with {status}")]
    ExternalTool {
        /// Program name
        program: String,
        /// Exit status
        status: ProcessStatus,
    },
}

impl InitError {
    /// Category of this error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRepository(_) => ErrorCategory::Validation,
            Self::DestinationNotEmpty { .. } => ErrorCategory::Conflict,
            Self::TemplateCopyFailed { .. } | Self::Io { .. } => ErrorCategory::Io,
            Self::Render(_) => ErrorCategory::Template,
            Self::Spawn { .. } | Self::ExternalTool { .. } => ErrorCategory::ExternalTool,
        }
    }
}

/// A request to create an application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitRequest {
    /// Repository path as given, e.g. `github.com/acme/blog`
    pub repository: String,
    /// Application (and directory) name
    pub app_name: String,
    /// Skip version-control initialization
    pub skip_vcs: bool,
}

impl InitRequest {
    /// Derive the application name from the last segment of `repository`
    ///
    /// # Errors
    ///
    /// Returns [`InitError::InvalidRepository`] when that segment is not a
    /// valid crate name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wheel::init::InitRequest;
    /// let request = InitRequest::from_repository("github.com/acme/blog", false).unwrap();
    /// assert_eq!(request.app_name, "blog");
    /// ```
    pub fn from_repository(repository: &str, skip_vcs: bool) -> Result<Self, InitError> {
        let app_name = repository
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();

        if !is_valid_crate_name(app_name) {
            return Err(InitError::InvalidRepository(repository.to_string()));
        }

        Ok(Self {
            repository: repository.to_string(),
            app_name: app_name.to_string(),
            skip_vcs,
        })
    }
}

/// Validate that a string is a valid crate name
fn is_valid_crate_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// Creates new applications
pub struct AppInitializer<'a> {
    templates: &'a TemplateRegistry,
    layout: &'a ProjectLayout,
    vcs: &'a VcsSettings,
    runner: &'a dyn ProcessRunner,
}

impl<'a> AppInitializer<'a> {
    /// Create an initializer
    #[must_use]
    pub fn new(
        templates: &'a TemplateRegistry,
        layout: &'a ProjectLayout,
        vcs: &'a VcsSettings,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        Self {
            templates,
            layout,
            vcs,
            runner,
        }
    }

    /// Create the application under `base_dir`, returning its directory
    ///
    /// # Errors
    ///
    /// - [`InitError::DestinationNotEmpty`] if the directory has entries
    ///   (nothing is written)
    /// - [`InitError::Render`] if a template fails (nothing is written)
    /// - [`InitError::TemplateCopyFailed`] if a file cannot be written (files
    ///   already written are kept)
    /// - [`InitError::Spawn`] or [`InitError::ExternalTool`] if version control
    ///   initialization fails
    pub fn init_app(&self, base_dir: &Path, request: &InitRequest) -> Result<PathBuf, Error> {
        let destination = base_dir.join(&request.app_name);
        let span = tracing::info_span!("init", app = %request.app_name);
        let _guard = span.enter();

        ensure_empty(&destination)?;

        let files = self.render_tree(request)?;
        for (relative, contents) in &files {
            write_file(&destination.join(relative), contents)?;
            tracing::info!(path = %relative.display(), "created");
        }
        for dir in [&self.layout.migrations_dir, &self.layout.views_dir] {
            create_dir(&destination.join(dir))?;
        }

        if request.skip_vcs || !self.vcs.enabled {
            tracing::debug!("skipping version control");
        } else {
            self.init_vcs(&destination)?;
        }

        Ok(destination)
    }

    /// Every file of a new project with its path relative to the project root
    fn render_tree(&self, request: &InitRequest) -> Result<Vec<(PathBuf, String)>, InitError> {
        let layout = self.layout;
        let context = json!({
            "app_name": request.app_name,
            "repository": request.repository,
        });

        let tree = [
            (PathBuf::from("Cargo.toml"), TemplateId::ProjectCargoToml),
            (PathBuf::from("README.md"), TemplateId::ProjectReadme),
            (PathBuf::from(".gitignore"), TemplateId::ProjectGitignore),
            (PathBuf::from("config/app.toml"), TemplateId::ProjectConfig),
            (PathBuf::from("src/main.rs"), TemplateId::ProjectMain),
            (PathBuf::from("src/state.rs"), TemplateId::ProjectState),
            (PathBuf::from("src/mailer.rs"), TemplateId::ProjectMailer),
            (layout.routes_file.clone(), TemplateId::ProjectRoutes),
            (layout.migration_manifest.clone(), TemplateId::ProjectMigrations),
            (layout.policy_file.clone(), TemplateId::ProjectAuthorization),
            (layout.entities_registry(), TemplateId::ProjectEntities),
            (layout.models_registry(), TemplateId::ProjectModels),
            (layout.handlers_registry(), TemplateId::ProjectHandlers),
        ];

        tree.into_iter()
            .map(|(path, id)| Ok((path, self.templates.render(id, &context)?)))
            .collect()
    }

    fn init_vcs(&self, destination: &Path) -> Result<(), InitError> {
        let invocation = Invocation {
            program: self.vcs.program.clone(),
            args: self.vcs.args.clone(),
            dir: destination.to_path_buf(),
        };

        let status = self.runner.run(&invocation).map_err(|source| InitError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        if !status.success {
            return Err(InitError::ExternalTool {
                program: invocation.program,
                status,
            });
        }

        tracing::info!(command = %invocation, "initialized version control");
        Ok(())
    }
}

fn ensure_empty(destination: &Path) -> Result<(), InitError> {
    match fs::read_dir(destination) {
        Ok(mut entries) => {
            if entries.next().is_some() {
                return Err(InitError::DestinationNotEmpty {
                    path: destination.to_path_buf(),
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(InitError::Io {
            path: destination.to_path_buf(),
            source,
        }),
    }
}

fn create_dir(path: &Path) -> Result<(), InitError> {
    fs::create_dir_all(path).map_err(|source| InitError::TemplateCopyFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), InitError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    fs::write(path, contents).map_err(|source| InitError::TemplateCopyFailed {
        path: path.to_path_buf(),
        source,
    })
}
