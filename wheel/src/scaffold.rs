//! Resource scaffolding
//!
//! Turns a [`ResourceSpec`] into rendered artifacts and writes them in a fixed
//! order:
//!
//! 1. Entity (`src/entities/{resource}.rs` + module registry entry)
//! 2. Model (`src/models/{resource}.rs` + module registry entry)
//! 3. View (`views/{resources}/form.html`)
//! 4. Handler (`src/handlers/{resources}.rs` + module registry entry)
//! 5. Routes (entry in `src/routes.rs`)
//! 6. Migration (`migrations/{name}.sql` + manifest entry)
//! 7. Authorization (entries in `src/authorization.rs`)
//!
//! Every artifact is rendered before the first one is written, so template
//! and type-mapping failures leave the project untouched. Write failures stop
//! the run; files written before the failing artifact are kept.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use inflector::Inflector;
use serde_json::{json, Value};
use thiserror::Error;

use crate::column::{self, Column, ColumnKind};
use crate::error::{ArtifactError, Error};
use crate::layout::ProjectLayout;
use crate::merge::{self, Artifact, MergeOutcome, SharedFile};
use crate::naming::{self, DerivedNames};
use crate::store::FileStore;
use crate::templates::{TemplateId, TemplateRegistry};
use crate::types::{form_conversion, map_type, MissingTypeMapping};

/// Kinds of generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Entity struct
    Entity,
    /// Data-access functions
    Model,
    /// HTML form
    View,
    /// HTTP handlers
    Handler,
    /// Route table entry
    Routes,
    /// SQL migration and manifest entry
    Migrate,
    /// Authorization policies
    Authorize,
}

impl ArtifactKind {
    /// Generation order
    pub const ORDER: [Self; 7] = [
        Self::Entity,
        Self::Model,
        Self::View,
        Self::Handler,
        Self::Routes,
        Self::Migrate,
        Self::Authorize,
    ];

    /// Human readable name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Model => "model",
            Self::View => "view",
            Self::Handler => "handler",
            Self::Routes => "routes",
            Self::Migrate => "migration",
            Self::Authorize => "authorization",
        }
    }

    /// Whether the artifact's templates emit per-column types
    #[must_use]
    pub const fn has_column_types(self) -> bool {
        matches!(self, Self::Entity | Self::Handler | Self::View | Self::Migrate)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the user asked to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Every artifact
    Scaffold,
    /// Model, entity and migration
    Model,
    /// Handler, routes and authorization
    Handler,
    /// Entity and migration
    Entity,
    /// A standalone migration
    Migration,
}

impl Subject {
    /// Every subject
    pub const ALL: [Self; 5] = [
        Self::Scaffold,
        Self::Model,
        Self::Handler,
        Self::Entity,
        Self::Migration,
    ];

    /// Name used on the command line
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scaffold => "scaffold",
            Self::Model => "model",
            Self::Handler => "handler",
            Self::Entity => "entity",
            Self::Migration => "migration",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Subject name not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown subject '{0}' (expected scaffold, model, handler, entity or migration)")]
pub struct UnknownSubject(pub String);

impl FromStr for Subject {
    type Err = UnknownSubject;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|subject| subject.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSubject(s.to_string()))
    }
}

/// Which artifacts to generate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct GenerationOptions {
    /// Entity struct
    pub entity: bool,
    /// Data-access functions
    pub model: bool,
    /// HTML form
    pub view: bool,
    /// HTTP handlers
    pub handler: bool,
    /// Route table entry
    pub routes: bool,
    /// SQL migration
    pub migrate: bool,
    /// Authorization policies
    pub authorize: bool,
}

impl GenerationOptions {
    /// Every artifact enabled
    #[must_use]
    pub const fn all() -> Self {
        Self {
            entity: true,
            model: true,
            view: true,
            handler: true,
            routes: true,
            migrate: true,
            authorize: true,
        }
    }

    /// Artifacts generated for a subject
    ///
    /// # Examples
    ///
    /// ```
    /// # use wheel::scaffold::{GenerationOptions, Subject};
    /// let options = GenerationOptions::for_subject(Subject::Model);
    /// assert!(options.model && options.entity && options.migrate);
    /// assert!(!options.handler);
    /// ```
    #[must_use]
    pub const fn for_subject(subject: Subject) -> Self {
        let none = Self {
            entity: false,
            model: false,
            view: false,
            handler: false,
            routes: false,
            migrate: false,
            authorize: false,
        };

        match subject {
            Subject::Scaffold => Self::all(),
            Subject::Model => Self {
                model: true,
                entity: true,
                migrate: true,
                ..none
            },
            Subject::Handler => Self {
                handler: true,
                routes: true,
                authorize: true,
                ..none
            },
            Subject::Entity => Self {
                entity: true,
                migrate: true,
                ..none
            },
            Subject::Migration => Self {
                migrate: true,
                ..none
            },
        }
    }

    /// Whether an artifact is enabled
    #[must_use]
    pub const fn is_enabled(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Entity => self.entity,
            ArtifactKind::Model => self.model,
            ArtifactKind::View => self.view,
            ArtifactKind::Handler => self.handler,
            ArtifactKind::Routes => self.routes,
            ArtifactKind::Migrate => self.migrate,
            ArtifactKind::Authorize => self.authorize,
        }
    }

    /// Enabled artifacts in generation order
    pub fn enabled(&self) -> impl Iterator<Item = ArtifactKind> {
        let options = *self;
        ArtifactKind::ORDER
            .into_iter()
            .filter(move |kind| options.is_enabled(*kind))
    }
}

/// A resource to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Raw resource name (or migration name for standalone migrations)
    pub name: String,
    /// Declared columns, in order
    pub columns: Vec<Column>,
}

impl ResourceSpec {
    /// Validate a name and parse its column tokens
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResourceName`] or [`Error::Parse`]; nothing is
    /// generated for an invalid spec.
    pub fn parse<S: AsRef<str>>(name: &str, tokens: &[S]) -> Result<Self, Error> {
        naming::validate_name(name)?;
        let columns = column::parse(tokens)?;
        Ok(Self {
            name: name.to_string(),
            columns,
        })
    }
}

/// Schema change produced by the migration artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationPlan {
    /// New table holding the resource
    CreateTable {
        /// Migration name
        name: String,
        /// Table to create
        table: String,
    },
    /// `add_<column>_to_<table>`
    AddColumns {
        /// Migration name
        name: String,
        /// Table to alter
        table: String,
        /// Columns to add
        columns: Vec<Column>,
    },
    /// `remove_<column>_from_<table>`
    DropColumns {
        /// Migration name
        name: String,
        /// Table to alter
        table: String,
        /// Column names to drop
        columns: Vec<String>,
    },
}

impl MigrationPlan {
    /// Plan creating the resource's table
    #[must_use]
    pub fn for_resource(names: &DerivedNames) -> Self {
        Self::CreateTable {
            name: format!("create_{}", names.table_name),
            table: names.table_name.clone(),
        }
    }

    /// Plan described by a migration name
    ///
    /// `add_<column>_to_<table>` adds columns (the declared ones, or a string
    /// column named after the migration), `remove_<column>_from_<table>` drops
    /// them, and any other name creates a table, with an optional `create_`
    /// prefix stripped.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wheel::scaffold::MigrationPlan;
    /// # use wheel::column::parse;
    /// let columns = parse(&["total:integer"]).unwrap();
    /// let plan = MigrationPlan::from_migration_name("add_total_to_users", &columns);
    /// assert!(matches!(plan, MigrationPlan::AddColumns { ref table, .. } if table == "users"));
    /// ```
    #[must_use]
    pub fn from_migration_name(name: &str, columns: &[Column]) -> Self {
        let snake = name.to_snake_case();

        if let Some((column, table)) = split_around(&snake, "add_", "_to_") {
            let columns = if columns.is_empty() {
                vec![Column {
                    name: column.to_string(),
                    kind: ColumnKind::String,
                }]
            } else {
                columns.to_vec()
            };
            return Self::AddColumns {
                name: snake.clone(),
                table: table.to_string(),
                columns,
            };
        }

        if let Some((column, table)) = split_around(&snake, "remove_", "_from_") {
            let columns = if columns.is_empty() {
                vec![column.to_string()]
            } else {
                columns.iter().map(Column::column_name).collect()
            };
            return Self::DropColumns {
                name: snake.clone(),
                table: table.to_string(),
                columns,
            };
        }

        let table = naming::resolve(snake.strip_prefix("create_").unwrap_or(&snake)).table_name;
        Self::CreateTable {
            name: format!("create_{table}"),
            table,
        }
    }

    /// Migration name, also the SQL file stem
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::CreateTable { name, .. } | Self::AddColumns { name, .. } | Self::DropColumns { name, .. } => {
                name
            }
        }
    }

    /// Table the migration touches
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::CreateTable { table, .. }
            | Self::AddColumns { table, .. }
            | Self::DropColumns { table, .. } => table,
        }
    }
}

fn split_around<'a>(name: &'a str, prefix: &str, separator: &str) -> Option<(&'a str, &'a str)> {
    let (column, table) = name.strip_prefix(prefix)?.rsplit_once(separator)?;
    (!column.is_empty() && !table.is_empty()).then_some((column, table))
}

/// An artifact written (or skipped) by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedArtifact {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Path relative to the project root
    pub path: PathBuf,
    /// What happened
    pub outcome: MergeOutcome,
}

/// Resource generator
pub struct Scaffolder<'a> {
    templates: &'a TemplateRegistry,
    layout: &'a ProjectLayout,
    store: &'a dyn FileStore,
}

impl<'a> Scaffolder<'a> {
    /// Create a scaffolder writing through `store`
    #[must_use]
    pub fn new(templates: &'a TemplateRegistry, layout: &'a ProjectLayout, store: &'a dyn FileStore) -> Self {
        Self {
            templates,
            layout,
            store,
        }
    }

    /// Generate and write every enabled artifact
    ///
    /// # Errors
    ///
    /// Returns [`Error::Artifact`] naming the failing artifact kind and the
    /// resource. Artifacts written before the failure are kept.
    pub fn generate(&self, spec: &ResourceSpec, options: &GenerationOptions) -> Result<Vec<AppliedArtifact>, Error> {
        let span = tracing::info_span!("generate", resource = %spec.name);
        let _guard = span.enter();

        let artifacts = self.plan(spec, options)?;
        let mut applied = Vec::with_capacity(artifacts.len());

        for artifact in &artifacts {
            let outcome = merge::apply(artifact, self.store).map_err(|e| Error::Artifact {
                kind: artifact.kind,
                resource: spec.name.clone(),
                source: e.into(),
            })?;

            applied.push(AppliedArtifact {
                kind: artifact.kind,
                path: artifact.target_path.clone(),
                outcome,
            });
        }

        Ok(applied)
    }

    /// Render every enabled artifact without writing anything
    ///
    /// # Errors
    ///
    /// Returns [`Error::Artifact`] for the first artifact that fails to render.
    pub fn plan(&self, spec: &ResourceSpec, options: &GenerationOptions) -> Result<Vec<Artifact>, Error> {
        let names = naming::resolve(&spec.name);
        let migration = if options.migrate && !options.entity {
            MigrationPlan::from_migration_name(&spec.name, &spec.columns)
        } else {
            MigrationPlan::for_resource(&names)
        };

        let context = resource_context(spec, &names, &migration, options).map_err(|e| Error::Artifact {
            kind: e.artifact,
            resource: spec.name.clone(),
            source: e.into(),
        })?;

        let mut artifacts = Vec::new();
        for kind in options.enabled() {
            let rendered = self
                .render_kind(kind, &names, &migration, &context)
                .map_err(|source| Error::Artifact {
                    kind,
                    resource: spec.name.clone(),
                    source,
                })?;
            tracing::debug!(%kind, count = rendered.len(), "rendered");
            artifacts.extend(rendered);
        }

        Ok(artifacts)
    }

    fn render_kind(
        &self,
        kind: ArtifactKind,
        names: &DerivedNames,
        migration: &MigrationPlan,
        context: &Value,
    ) -> Result<Vec<Artifact>, ArtifactError> {
        let layout = self.layout;

        let artifacts = match kind {
            ArtifactKind::Entity => vec![
                merge::new_file_artifact(
                    kind,
                    &layout.entities_dir.join(format!("{}.rs", names.file_stem)),
                    self.templates.render(TemplateId::Entity, context)?,
                ),
                self.module_entry(kind, SharedFile::EntityModules, &names.file_stem)?,
            ],
            ArtifactKind::Model => vec![
                merge::new_file_artifact(
                    kind,
                    &layout.models_dir.join(format!("{}.rs", names.file_stem)),
                    self.templates.render(TemplateId::Model, context)?,
                ),
                self.module_entry(kind, SharedFile::ModelModules, &names.file_stem)?,
            ],
            ArtifactKind::View => vec![merge::new_file_artifact(
                kind,
                &layout.views_dir.join(&names.plural).join("form.html"),
                self.templates.render(TemplateId::View, context)?,
            )],
            ArtifactKind::Handler => vec![
                merge::new_file_artifact(
                    kind,
                    &layout.handlers_dir.join(format!("{}.rs", names.table_name)),
                    self.templates.render(TemplateId::Handler, context)?,
                ),
                self.module_entry(kind, SharedFile::HandlerModules, &names.table_name)?,
            ],
            ArtifactKind::Routes => vec![merge::shared_artifact(
                kind,
                SharedFile::Routes,
                layout,
                format!("wheel:route:{}", names.table_name),
                self.templates.render(TemplateId::RouteEntry, context)?,
            )],
            ArtifactKind::Migrate => {
                let template = match migration {
                    MigrationPlan::CreateTable { .. } => TemplateId::MigrationCreate,
                    MigrationPlan::AddColumns { .. } | MigrationPlan::DropColumns { .. } => TemplateId::MigrationAlter,
                };
                let sql_path = layout.migrations_dir.join(format!("{}.sql", migration.name()));
                let entry = json!({
                    "migration_name": migration.name(),
                    "include_path": ProjectLayout::relative_to(&layout.migration_manifest, &sql_path),
                });

                vec![
                    merge::new_file_artifact(kind, &sql_path, self.templates.render(template, context)?),
                    merge::shared_artifact(
                        kind,
                        SharedFile::MigrationManifest,
                        layout,
                        format!("wheel:migration:{}", migration.name()),
                        self.templates.render(TemplateId::MigrationEntry, &entry)?,
                    ),
                ]
            }
            ArtifactKind::Authorize => vec![merge::shared_artifact(
                kind,
                SharedFile::Policies,
                layout,
                format!("wheel:policy:{}", names.table_name),
                self.templates.render(TemplateId::PolicyEntry, context)?,
            )],
        };

        Ok(artifacts)
    }

    fn module_entry(&self, kind: ArtifactKind, file: SharedFile, module: &str) -> Result<Artifact, ArtifactError> {
        let content = self
            .templates
            .render(TemplateId::ModuleEntry, &json!({ "module": module }))?;
        Ok(merge::shared_artifact(
            kind,
            file,
            self.layout,
            format!("pub mod {module};"),
            content,
        ))
    }
}

/// Template context shared by every whole-file resource template
fn resource_context(
    spec: &ResourceSpec,
    names: &DerivedNames,
    migration: &MigrationPlan,
    options: &GenerationOptions,
) -> Result<Value, MissingTypeMapping> {
    let columns = spec
        .columns
        .iter()
        .map(|column| column_context(column, options))
        .collect::<Result<Vec<_>, _>>()?;

    let column_names: Vec<String> = spec.columns.iter().map(Column::column_name).collect();
    let table = &names.table_name;

    let insert_sql = if column_names.is_empty() {
        format!("INSERT INTO {table} DEFAULT VALUES RETURNING *")
    } else {
        let placeholders: Vec<String> = (1..=column_names.len()).map(|i| format!("${i}")).collect();
        format!(
            "INSERT INTO {table} ({}) VALUES ({}) RETURNING *",
            column_names.join(", "),
            placeholders.join(", ")
        )
    };

    let mut assignments: Vec<String> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{name} = ${}", i + 1))
        .collect();
    assignments.push("updated_at = now()".to_string());
    let update_sql = format!(
        "UPDATE {table} SET {} WHERE id = ${} RETURNING *",
        assignments.join(", "),
        column_names.len() + 1
    );

    let statements: Vec<String> = match migration {
        MigrationPlan::CreateTable { .. } => Vec::new(),
        MigrationPlan::AddColumns { table, columns, .. } => columns
            .iter()
            .map(|column| Ok(format!("ALTER TABLE {table} ADD COLUMN {}", sql_definition(column)?)))
            .collect::<Result<_, MissingTypeMapping>>()?,
        MigrationPlan::DropColumns { table, columns, .. } => columns
            .iter()
            .map(|column| format!("ALTER TABLE {table} DROP COLUMN {column}"))
            .collect(),
    };

    Ok(json!({
        "names": names,
        "columns": columns,
        "insert_sql": insert_sql,
        "update_sql": update_sql,
        "migration_name": migration.name(),
        "table": migration.table(),
        "statements": statements,
    }))
}

fn column_context(column: &Column, options: &GenerationOptions) -> Result<Value, MissingTypeMapping> {
    let mapped = |artifact: ArtifactKind| -> Result<&'static str, MissingTypeMapping> {
        if options.is_enabled(artifact) {
            map_type(column.kind, artifact)
        } else {
            Ok("")
        }
    };

    let column_name = column.column_name();
    let view_type = mapped(ArtifactKind::View)?;
    let sql_definition = if options.migrate {
        sql_definition(column)?
    } else {
        String::new()
    };

    Ok(json!({
        "name": column.name,
        "column_name": column_name,
        "kind": column.kind.token(),
        "title": column.name.to_title_case(),
        "entity_type": mapped(ArtifactKind::Entity)?,
        "handler_type": mapped(ArtifactKind::Handler)?,
        "view_type": view_type,
        "sql_type": mapped(ArtifactKind::Migrate)?,
        "sql_definition": sql_definition,
        "references": column.referenced().map(|names| names.table_name).unwrap_or_default(),
        "conversion": form_conversion(column.kind, &format!("form.{column_name}")),
        "is_textarea": view_type == "textarea",
        "view_attributes": view_attributes(column.kind),
    }))
}

fn sql_definition(column: &Column) -> Result<String, MissingTypeMapping> {
    let sql_type = map_type(column.kind, ArtifactKind::Migrate)?;
    let name = column.column_name();
    Ok(match column.referenced() {
        Some(target) => format!("{name} {sql_type} REFERENCES {}(id)", target.table_name),
        None => format!("{name} {sql_type}"),
    })
}

const fn view_attributes(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Boolean => "",
        ColumnKind::Float | ColumnKind::Decimal => r#" step="any" required"#,
        _ => " required",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalFileStore;
    use std::path::Path;

    fn spec(name: &str, tokens: &[&str]) -> ResourceSpec {
        ResourceSpec::parse(name, tokens).unwrap()
    }

    #[test]
    fn test_subject_options() {
        assert_eq!(GenerationOptions::for_subject(Subject::Scaffold), GenerationOptions::all());

        let handler = GenerationOptions::for_subject(Subject::Handler);
        assert_eq!(
            handler.enabled().collect::<Vec<_>>(),
            vec![ArtifactKind::Handler, ArtifactKind::Routes, ArtifactKind::Authorize]
        );

        let entity = GenerationOptions::for_subject(Subject::Entity);
        assert_eq!(
            entity.enabled().collect::<Vec<_>>(),
            vec![ArtifactKind::Entity, ArtifactKind::Migrate]
        );

        let migration = GenerationOptions::for_subject(Subject::Migration);
        assert_eq!(migration.enabled().collect::<Vec<_>>(), vec![ArtifactKind::Migrate]);
    }

    #[test]
    fn test_subject_from_str() {
        assert_eq!("scaffold".parse::<Subject>().unwrap(), Subject::Scaffold);
        assert_eq!("Migration".parse::<Subject>().unwrap(), Subject::Migration);
        assert!("controller".parse::<Subject>().is_err());
    }

    #[test]
    fn test_resource_spec_rejects_bad_name() {
        let err = ResourceSpec::parse("user-profile", &["title"]).unwrap_err();
        assert!(matches!(err, Error::InvalidResourceName { .. }));
    }

    #[test]
    fn test_migration_plans() {
        let columns = column::parse(&["total:integer"]).unwrap();

        let plan = MigrationPlan::from_migration_name("add_total_to_users", &columns);
        assert_eq!(
            plan,
            MigrationPlan::AddColumns {
                name: "add_total_to_users".to_string(),
                table: "users".to_string(),
                columns: columns.clone(),
            }
        );

        let plan = MigrationPlan::from_migration_name("remove_total_from_users", &[]);
        assert_eq!(
            plan,
            MigrationPlan::DropColumns {
                name: "remove_total_from_users".to_string(),
                table: "users".to_string(),
                columns: vec!["total".to_string()],
            }
        );

        let plan = MigrationPlan::from_migration_name("create_invoices", &[]);
        assert_eq!(plan.name(), "create_invoices");
        assert_eq!(plan.table(), "invoices");

        let plan = MigrationPlan::from_migration_name("invoice", &[]);
        assert_eq!(plan.name(), "create_invoices");
    }

    #[test]
    fn test_add_migration_without_columns_adds_string_column() {
        let plan = MigrationPlan::from_migration_name("add_nickname_to_users", &[]);
        let MigrationPlan::AddColumns { columns, .. } = plan else {
            panic!("expected an add-columns plan");
        };
        assert_eq!(columns[0].name, "nickname");
        assert_eq!(columns[0].kind, ColumnKind::String);
    }

    #[test]
    fn test_plan_scaffold_paths_in_order() {
        let registry = TemplateRegistry::embedded().unwrap();
        let layout = ProjectLayout::default();
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let scaffolder = Scaffolder::new(&registry, &layout, &store);

        let artifacts = scaffolder
            .plan(&spec("post", &["title", "total:integer"]), &GenerationOptions::all())
            .unwrap();
        let paths: Vec<_> = artifacts.iter().map(|a| a.target_path.clone()).collect();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("src/entities/post.rs"),
                PathBuf::from("src/entities/mod.rs"),
                PathBuf::from("src/models/post.rs"),
                PathBuf::from("src/models/mod.rs"),
                PathBuf::from("views/posts/form.html"),
                PathBuf::from("src/handlers/posts.rs"),
                PathBuf::from("src/handlers/mod.rs"),
                PathBuf::from("src/routes.rs"),
                PathBuf::from("migrations/create_posts.sql"),
                PathBuf::from("src/migrations.rs"),
                PathBuf::from("src/authorization.rs"),
            ]
        );
        assert!(!dir.path().join("src").exists(), "planning must not write");
    }

    #[test]
    fn test_rendered_entity_uses_mapped_types() {
        let registry = TemplateRegistry::embedded().unwrap();
        let layout = ProjectLayout::default();
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let scaffolder = Scaffolder::new(&registry, &layout, &store);

        let artifacts = scaffolder
            .plan(
                &spec("post", &["title", "total:integer", "author:references"]),
                &GenerationOptions::for_subject(Subject::Entity),
            )
            .unwrap();

        let entity = &artifacts[0].content;
        assert!(entity.contains("pub struct Post {"));
        assert!(entity.contains("pub title: String,"));
        assert!(entity.contains("pub total: i32,"));
        assert!(entity.contains("pub author_id: i64,"));
        assert!(entity.contains("pub struct PostChanges {"));

        let sql = &artifacts[2].content;
        assert!(sql.contains("CREATE TABLE posts ("));
        assert!(sql.contains("title VARCHAR(255) NOT NULL,"));
        assert!(sql.contains("author_id BIGINT REFERENCES authors(id) NOT NULL,"));
    }

    #[test]
    fn test_model_sql_placeholders() {
        let registry = TemplateRegistry::embedded().unwrap();
        let layout = ProjectLayout::default();
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let scaffolder = Scaffolder::new(&registry, &layout, &store);

        let artifacts = scaffolder
            .plan(
                &spec("post", &["title", "total:integer"]),
                &GenerationOptions::for_subject(Subject::Model),
            )
            .unwrap();
        let model = &artifacts
            .iter()
            .find(|a| a.target_path == Path::new("src/models/post.rs"))
            .unwrap()
            .content;

        assert!(model.contains("INSERT INTO posts (title, total) VALUES ($1, $2) RETURNING *"));
        assert!(model.contains("UPDATE posts SET title = $1, total = $2, updated_at = now() WHERE id = $3 RETURNING *"));
        assert!(model.contains(".bind(&changes.total)"));
    }

    #[test]
    fn test_model_without_columns_inserts_default_values() {
        let registry = TemplateRegistry::embedded().unwrap();
        let layout = ProjectLayout::default();
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let scaffolder = Scaffolder::new(&registry, &layout, &store);

        let artifacts = scaffolder
            .plan(&spec("tag", &[]), &GenerationOptions::for_subject(Subject::Model))
            .unwrap();
        let model = &artifacts[2].content;
        assert!(model.contains("INSERT INTO tags DEFAULT VALUES RETURNING *"));
        assert!(model.contains("UPDATE tags SET updated_at = now() WHERE id = $1 RETURNING *"));
    }

    #[test]
    fn test_handler_converts_form_fields() {
        let registry = TemplateRegistry::embedded().unwrap();
        let layout = ProjectLayout::default();
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let scaffolder = Scaffolder::new(&registry, &layout, &store);

        let artifacts = scaffolder
            .plan(
                &spec("post", &["published:boolean", "title"]),
                &GenerationOptions::for_subject(Subject::Handler),
            )
            .unwrap();

        let handler = &artifacts[0].content;
        assert!(handler.contains("pub published: Option<String>,"));
        assert!(handler.contains("published: form.published.is_some(),"));
        assert!(handler.contains("const RESOURCE: &str = \"posts\";"));

        let route = &artifacts[2].content;
        assert!(route.contains("// wheel:route:posts"));
        assert!(route.contains(".route(\"/posts/{id}\""));

        let policy = &artifacts[3].content;
        assert!(policy.contains("Policy { resource: \"posts\", action: Action::Destroy, roles: &[\"admin\"] },"));
    }

    #[test]
    fn test_entity_named_like_an_import_stays_qualified() {
        let registry = TemplateRegistry::embedded().unwrap();
        let layout = ProjectLayout::default();
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let scaffolder = Scaffolder::new(&registry, &layout, &store);

        let artifacts = scaffolder
            .plan(&spec("state", &["title"]), &GenerationOptions::all())
            .unwrap();
        let content = |kind| &artifacts.iter().find(|a| a.kind == kind).unwrap().content;

        let handler = content(ArtifactKind::Handler);
        assert!(handler.contains("use axum::extract::State;"));
        assert!(handler.contains("use crate::entities::state as entity;"));
        assert!(!handler.contains("use crate::entities::state::State;"));
        assert!(handler.contains("impl From<StateForm> for entity::StateChanges {"));
        assert!(handler.contains("Json<entity::State>"));

        let model = content(ArtifactKind::Model);
        assert!(model.contains("use crate::entities::state as entity;"));
        assert!(model.contains("Result<Vec<entity::State>, sqlx::Error>"));
    }

    #[test]
    fn test_view_inputs() {
        let registry = TemplateRegistry::embedded().unwrap();
        let layout = ProjectLayout::default();
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let scaffolder = Scaffolder::new(&registry, &layout, &store);

        let artifacts = scaffolder
            .plan(&spec("post", &["body:text", "price:decimal", "draft:boolean"]), &GenerationOptions::all())
            .unwrap();
        let view = &artifacts
            .iter()
            .find(|a| a.kind == ArtifactKind::View)
            .unwrap()
            .content;

        assert!(view.contains("<form method=\"post\" action=\"/posts\">"));
        assert!(view.contains("<textarea id=\"body\" name=\"body\" required></textarea>"));
        assert!(view.contains("<input type=\"number\" id=\"price\" name=\"price\" step=\"any\" required>"));
        assert!(view.contains("<input type=\"checkbox\" id=\"draft\" name=\"draft\">"));
    }

    #[test]
    fn test_standalone_migrations() {
        let registry = TemplateRegistry::embedded().unwrap();
        let layout = ProjectLayout::default();
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let scaffolder = Scaffolder::new(&registry, &layout, &store);
        let options = GenerationOptions::for_subject(Subject::Migration);

        let artifacts = scaffolder
            .plan(&spec("add_total_to_users", &["total:integer"]), &options)
            .unwrap();
        assert_eq!(artifacts[0].target_path, PathBuf::from("migrations/add_total_to_users.sql"));
        assert!(artifacts[0].content.contains("ALTER TABLE users ADD COLUMN total INTEGER;"));
        assert!(artifacts[1]
            .content
            .contains("include_str!(\"../migrations/add_total_to_users.sql\")"));

        let artifacts = scaffolder
            .plan(&spec("remove_total_from_users", &[]), &options)
            .unwrap();
        assert!(artifacts[0].content.contains("ALTER TABLE users DROP COLUMN total;"));
    }

    #[test]
    fn test_generate_writes_and_reports_outcomes() {
        let registry = TemplateRegistry::embedded().unwrap();
        let layout = ProjectLayout::default();
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let scaffolder = Scaffolder::new(&registry, &layout, &store);

        let applied = scaffolder
            .generate(&spec("post", &["title"]), &GenerationOptions::for_subject(Subject::Handler))
            .unwrap();

        assert!(applied.iter().all(|a| a.outcome != MergeOutcome::AlreadyApplied));
        assert_eq!(applied[0].outcome, MergeOutcome::Created);
        assert_eq!(applied[1].outcome, MergeOutcome::Appended);
        assert!(dir.path().join("src/handlers/posts.rs").exists());

        let modules = std::fs::read_to_string(dir.path().join("src/handlers/mod.rs")).unwrap();
        assert!(modules.contains("pub mod posts;"));
        assert!(modules.find("pub mod posts;") < modules.find("wheel:modules:end"));
    }
}
