//! Filesystem layout of a generated project

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where each kind of generated file lives, relative to the project root
///
/// The embedded templates assume the default module names (`entities`,
/// `models`, `handlers`); moving those directories also requires overriding
/// the templates that reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLayout {
    /// Entity structs, one file per resource
    pub entities_dir: PathBuf,
    /// Data-access functions, one file per resource
    pub models_dir: PathBuf,
    /// HTTP handlers, one file per resource
    pub handlers_dir: PathBuf,
    /// Static HTML views, one directory per resource
    pub views_dir: PathBuf,
    /// SQL migration files
    pub migrations_dir: PathBuf,
    /// Central route table
    pub routes_file: PathBuf,
    /// Ordered list of migrations
    pub migration_manifest: PathBuf,
    /// Authorization policy table
    pub policy_file: PathBuf,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            entities_dir: PathBuf::from("src/entities"),
            models_dir: PathBuf::from("src/models"),
            handlers_dir: PathBuf::from("src/handlers"),
            views_dir: PathBuf::from("views"),
            migrations_dir: PathBuf::from("migrations"),
            routes_file: PathBuf::from("src/routes.rs"),
            migration_manifest: PathBuf::from("src/migrations.rs"),
            policy_file: PathBuf::from("src/authorization.rs"),
        }
    }
}

impl ProjectLayout {
    /// Module registry of the entities directory
    #[must_use]
    pub fn entities_registry(&self) -> PathBuf {
        self.entities_dir.join("mod.rs")
    }

    /// Module registry of the models directory
    #[must_use]
    pub fn models_registry(&self) -> PathBuf {
        self.models_dir.join("mod.rs")
    }

    /// Module registry of the handlers directory
    #[must_use]
    pub fn handlers_registry(&self) -> PathBuf {
        self.handlers_dir.join("mod.rs")
    }

    /// Path to `target` as seen from the directory containing `from`
    ///
    /// Used for `include_str!` paths in the migration manifest. Both paths
    /// are relative to the project root.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::path::Path;
    /// # use wheel::layout::ProjectLayout;
    /// let rel = ProjectLayout::relative_to(Path::new("src/migrations.rs"), Path::new("migrations/create_posts.sql"));
    /// assert_eq!(rel, "../migrations/create_posts.sql");
    /// ```
    #[must_use]
    pub fn relative_to(from: &Path, target: &Path) -> String {
        let depth = from
            .parent()
            .map_or(0, |dir| dir.components().filter(|c| matches!(c, Component::Normal(_))).count());

        let mut parts: Vec<String> = vec!["..".to_string(); depth];
        parts.extend(
            target
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                }),
        );
        parts.join("/")
    }
}
