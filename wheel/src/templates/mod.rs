//! Template registry and rendering
//!
//! Every template is addressed by a [`TemplateId`]. Bodies are embedded in the
//! binary; a configured override directory can replace any of them with a
//! `<dir>/<id>.hbs` file (for example `<dir>/resource/handler.hbs`).
//!
//! Rendering runs handlebars in strict mode with HTML escaping disabled, since
//! the output is source code. A template referencing a field the context does
//! not provide fails to render instead of silently emitting an empty string.

use std::fmt;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::TemplateSettings;

pub mod project;
pub mod resource;

/// Stable identifier of an embedded template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    /// Entity struct file
    Entity,
    /// Data-access functions file
    Model,
    /// HTML form view
    View,
    /// HTTP handlers file
    Handler,
    /// `CREATE TABLE` migration
    MigrationCreate,
    /// `ALTER TABLE` migration
    MigrationAlter,
    /// Route table entry
    RouteEntry,
    /// `pub mod` line in a module registry
    ModuleEntry,
    /// Migration manifest entry
    MigrationEntry,
    /// Authorization policy entries
    PolicyEntry,
    /// Application `Cargo.toml`
    ProjectCargoToml,
    /// Application README
    ProjectReadme,
    /// Application `.gitignore`
    ProjectGitignore,
    /// Application runtime configuration
    ProjectConfig,
    /// Application entry point
    ProjectMain,
    /// Application state and settings
    ProjectState,
    /// Route table skeleton
    ProjectRoutes,
    /// Migration manifest skeleton
    ProjectMigrations,
    /// Authorization policy skeleton
    ProjectAuthorization,
    /// Entities module registry skeleton
    ProjectEntities,
    /// Models module registry skeleton
    ProjectModels,
    /// Handlers module registry skeleton
    ProjectHandlers,
    /// Mailer module
    ProjectMailer,
}

impl TemplateId {
    /// Every template id
    pub const ALL: [Self; 23] = [
        Self::Entity,
        Self::Model,
        Self::View,
        Self::Handler,
        Self::MigrationCreate,
        Self::MigrationAlter,
        Self::RouteEntry,
        Self::ModuleEntry,
        Self::MigrationEntry,
        Self::PolicyEntry,
        Self::ProjectCargoToml,
        Self::ProjectReadme,
        Self::ProjectGitignore,
        Self::ProjectConfig,
        Self::ProjectMain,
        Self::ProjectState,
        Self::ProjectRoutes,
        Self::ProjectMigrations,
        Self::ProjectAuthorization,
        Self::ProjectEntities,
        Self::ProjectModels,
        Self::ProjectHandlers,
        Self::ProjectMailer,
    ];

    /// Registry name, also the override file path without `.hbs`
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Entity => "resource/entity",
            Self::Model => "resource/model",
            Self::View => "resource/view",
            Self::Handler => "resource/handler",
            Self::MigrationCreate => "resource/migration_create",
            Self::MigrationAlter => "resource/migration_alter",
            Self::RouteEntry => "fragment/route",
            Self::ModuleEntry => "fragment/module",
            Self::MigrationEntry => "fragment/migration",
            Self::PolicyEntry => "fragment/policy",
            Self::ProjectCargoToml => "project/cargo_toml",
            Self::ProjectReadme => "project/readme",
            Self::ProjectGitignore => "project/gitignore",
            Self::ProjectConfig => "project/config",
            Self::ProjectMain => "project/main",
            Self::ProjectState => "project/state",
            Self::ProjectRoutes => "project/routes",
            Self::ProjectMigrations => "project/migrations",
            Self::ProjectAuthorization => "project/authorization",
            Self::ProjectEntities => "project/entities",
            Self::ProjectModels => "project/models",
            Self::ProjectHandlers => "project/handlers",
            Self::ProjectMailer => "project/mailer",
        }
    }

    /// Embedded template body
    #[must_use]
    pub const fn body(self) -> &'static str {
        match self {
            Self::Entity => resource::ENTITY,
            Self::Model => resource::MODEL,
            Self::View => resource::VIEW,
            Self::Handler => resource::HANDLER,
            Self::MigrationCreate => resource::MIGRATION_CREATE,
            Self::MigrationAlter => resource::MIGRATION_ALTER,
            Self::RouteEntry => resource::ROUTE_ENTRY,
            Self::ModuleEntry => resource::MODULE_ENTRY,
            Self::MigrationEntry => resource::MIGRATION_ENTRY,
            Self::PolicyEntry => resource::POLICY_ENTRY,
            Self::ProjectCargoToml => project::CARGO_TOML,
            Self::ProjectReadme => project::README_MD,
            Self::ProjectGitignore => project::GITIGNORE,
            Self::ProjectConfig => project::CONFIG_APP,
            Self::ProjectMain => project::MAIN_RS,
            Self::ProjectState => project::STATE_RS,
            Self::ProjectRoutes => project::ROUTES_RS,
            Self::ProjectMigrations => project::MIGRATIONS_RS,
            Self::ProjectAuthorization => project::AUTHORIZATION_RS,
            Self::ProjectEntities => project::ENTITIES_MOD,
            Self::ProjectModels => project::MODELS_MOD,
            Self::ProjectHandlers => project::HANDLERS_MOD,
            Self::ProjectMailer => project::MAILER_RS,
        }
    }

    /// Look up an id by its registry name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A template failed to render
#[derive(Debug, Error)]
#[error("template '{template}' failed to render")]
pub struct RenderFailure {
    /// Template that failed
    pub template: TemplateId,
    /// Underlying handlebars error
    #[source]
    pub source: Box<handlebars::RenderError>,
}

/// Errors loading templates into the registry
#[derive(Debug, Error)]
pub enum TemplateLoadError {
    /// Template body does not parse
    #[error("template '{name}' has invalid syntax")]
    Syntax {
        /// Registry name of the template
        name: String,
        /// Underlying handlebars error
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// Override directory or file cannot be read
    #[error("cannot read template override {}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Registry of all templates, embedded or overridden
#[derive(Debug)]
pub struct TemplateRegistry {
    handlebars: Handlebars<'static>,
    overridden: Vec<TemplateId>,
}

impl TemplateRegistry {
    /// Create a registry holding the embedded templates
    ///
    /// # Errors
    ///
    /// Returns [`TemplateLoadError::Syntax`] if an embedded body does not parse.
    pub fn embedded() -> Result<Self, TemplateLoadError> {
        let mut handlebars = Handlebars::new();

        // Output is source code, never HTML to escape
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        for id in TemplateId::ALL {
            handlebars
                .register_template_string(id.name(), id.body())
                .map_err(|e| TemplateLoadError::Syntax {
                    name: id.name().to_string(),
                    source: Box::new(e),
                })?;
        }

        Ok(Self {
            handlebars,
            overridden: Vec::new(),
        })
    }

    /// Create a registry with embedded templates replaced by files in `dir`
    ///
    /// Every `*.hbs` file under `dir` whose relative path (without the
    /// extension) names a [`TemplateId`] replaces that template. Other files
    /// are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` cannot be walked, an override cannot be read,
    /// or an override does not parse.
    pub fn with_overrides(dir: &Path) -> Result<Self, TemplateLoadError> {
        let mut registry = Self::embedded()?;

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| TemplateLoadError::Io {
                path: e.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf),
                source: e.into(),
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "hbs") {
                continue;
            }

            let Some(id) = override_id(dir, path) else {
                tracing::warn!(path = %path.display(), "ignoring unknown template override");
                continue;
            };

            let body = std::fs::read_to_string(path).map_err(|source| TemplateLoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            registry.register(id, &body)?;
            tracing::debug!(template = %id, path = %path.display(), "using template override");
        }

        Ok(registry)
    }

    /// Create the registry described by configuration
    ///
    /// # Errors
    ///
    /// See [`TemplateRegistry::with_overrides`].
    pub fn from_settings(settings: &TemplateSettings) -> Result<Self, TemplateLoadError> {
        match &settings.override_dir {
            Some(dir) => Self::with_overrides(dir),
            None => Self::embedded(),
        }
    }

    /// Replace a single template body
    ///
    /// # Errors
    ///
    /// Returns [`TemplateLoadError::Syntax`] if `body` does not parse.
    pub fn register(&mut self, id: TemplateId, body: &str) -> Result<(), TemplateLoadError> {
        self.handlebars
            .register_template_string(id.name(), body)
            .map_err(|e| TemplateLoadError::Syntax {
                name: id.name().to_string(),
                source: Box::new(e),
            })?;
        if !self.overridden.contains(&id) {
            self.overridden.push(id);
        }
        Ok(())
    }

    /// Templates replaced by overrides, in registration order
    #[must_use]
    pub fn overridden(&self) -> &[TemplateId] {
        &self.overridden
    }

    /// Render a template with the given context
    ///
    /// # Errors
    ///
    /// Returns [`RenderFailure`] when the template references data the
    /// context does not provide, or a helper fails.
    pub fn render<T: Serialize>(&self, id: TemplateId, context: &T) -> Result<String, RenderFailure> {
        tracing::debug!(template = %id, "rendering");
        self.handlebars
            .render(id.name(), context)
            .map_err(|e| RenderFailure {
                template: id,
                source: Box::new(e),
            })
    }
}

fn override_id(dir: &Path, path: &Path) -> Option<TemplateId> {
    let relative = path.strip_prefix(dir).ok()?.with_extension("");
    let name = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?
        .join("/");
    TemplateId::from_name(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_embedded_template_parses() {
        let registry = TemplateRegistry::embedded().unwrap();
        assert!(registry.overridden().is_empty());
    }

    #[test]
    fn test_names_are_unique_and_resolvable() {
        for id in TemplateId::ALL {
            assert_eq!(TemplateId::from_name(id.name()), Some(id));
        }
    }

    #[test]
    fn test_render_module_entry() {
        let registry = TemplateRegistry::embedded().unwrap();
        let out = registry
            .render(TemplateId::ModuleEntry, &json!({ "module": "post" }))
            .unwrap();
        assert_eq!(out.trim(), "pub mod post;");
    }

    #[test]
    fn test_missing_context_field_is_an_error() {
        let registry = TemplateRegistry::embedded().unwrap();
        let err = registry.render(TemplateId::ModuleEntry, &json!({})).unwrap_err();
        assert_eq!(err.template, TemplateId::ModuleEntry);
    }

    #[test]
    fn test_code_is_not_html_escaped() {
        let mut registry = TemplateRegistry::embedded().unwrap();
        registry.register(TemplateId::ModuleEntry, "{{module}}").unwrap();
        let out = registry
            .render(TemplateId::ModuleEntry, &json!({ "module": "Vec<&str>" }))
            .unwrap();
        assert_eq!(out, "Vec<&str>");
    }

    #[test]
    fn test_overrides_replace_embedded_bodies() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("fragment")).unwrap();
        std::fs::write(dir.path().join("fragment/module.hbs"), "pub(crate) mod {{module}};").unwrap();
        std::fs::write(dir.path().join("unknown.hbs"), "ignored").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = TemplateRegistry::with_overrides(dir.path()).unwrap();
        assert_eq!(registry.overridden(), &[TemplateId::ModuleEntry]);

        let out = registry
            .render(TemplateId::ModuleEntry, &json!({ "module": "post" }))
            .unwrap();
        assert_eq!(out, "pub(crate) mod post;");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("fragment")).unwrap();
        std::fs::write(dir.path().join("fragment/module.hbs"), "{{#each}}").unwrap();

        let err = TemplateRegistry::with_overrides(dir.path()).unwrap_err();
        assert!(matches!(err, TemplateLoadError::Syntax { .. }));
    }

    #[test]
    fn test_missing_override_dir_is_an_io_error() {
        let err = TemplateRegistry::with_overrides(Path::new("/nonexistent/wheel-templates")).unwrap_err();
        assert!(matches!(err, TemplateLoadError::Io { .. }));
    }
}
