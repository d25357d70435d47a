//! Integration tests for resource generation

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use wheel::column::ParseError;
use wheel::config::{TemplateSettings, VcsSettings};
use wheel::layout::ProjectLayout;
use wheel::merge::MergeOutcome;
use wheel::naming::resolve;
use wheel::prelude::*;
use wheel::process::SystemRunner;
use wheel::scaffold::ArtifactKind;

fn read(root: &Path, path: &str) -> String {
    fs::read_to_string(root.join(path)).unwrap()
}

/// Create an application skeleton the way `wheel new` does, without git
fn new_app(base: &TempDir) -> std::path::PathBuf {
    let templates = TemplateRegistry::embedded().unwrap();
    let layout = ProjectLayout::default();
    let vcs = VcsSettings::default();
    let request = InitRequest::from_repository("github.com/acme/blog", true).unwrap();

    AppInitializer::new(&templates, &layout, &vcs, &SystemRunner)
        .init_app(base.path(), &request)
        .unwrap()
}

fn generate(root: &Path, subject: Subject, name: &str, tokens: &[&str]) -> Result<Vec<wheel::scaffold::AppliedArtifact>, Error> {
    let templates = TemplateRegistry::embedded().unwrap();
    let layout = ProjectLayout::default();
    let store = LocalFileStore::new(root);
    let spec = ResourceSpec::parse(name, tokens)?;

    Scaffolder::new(&templates, &layout, &store).generate(&spec, &GenerationOptions::for_subject(subject))
}

#[test]
fn test_scaffold_into_new_app() {
    let base = TempDir::new().unwrap();
    let root = new_app(&base);

    let applied = generate(&root, Subject::Scaffold, "post", &["title", "body:text", "published:boolean"]).unwrap();
    assert!(applied.iter().all(|a| a.outcome != MergeOutcome::AlreadyApplied));

    for path in [
        "src/entities/post.rs",
        "src/models/post.rs",
        "views/posts/form.html",
        "src/handlers/posts.rs",
        "migrations/create_posts.sql",
    ] {
        assert!(root.join(path).is_file(), "{path} should exist");
    }

    let routes = read(&root, "src/routes.rs");
    assert!(routes.contains("get(handlers::posts::index).post(handlers::posts::create)"));
    assert!(routes.find("wheel:route:posts") < routes.find("wheel:routes:end"));

    let manifest = read(&root, "src/migrations.rs");
    assert!(manifest.contains(
        "Migration { name: \"create_posts\", sql: include_str!(\"../migrations/create_posts.sql\") },"
    ));

    let policies = read(&root, "src/authorization.rs");
    assert!(policies.contains("Policy { resource: \"posts\", action: Action::Index, roles: &[\"*\"] },"));

    assert!(read(&root, "src/entities/mod.rs").contains("pub mod post;"));
    assert!(read(&root, "src/models/mod.rs").contains("pub mod post;"));
    let handlers = read(&root, "src/handlers/mod.rs");
    assert!(handlers.contains("pub mod posts;"));
    assert!(handlers.contains("pub async fn home()"));
}

#[test]
fn test_integer_column_is_consistent_across_artifacts() {
    let base = TempDir::new().unwrap();
    let root = base.path();

    generate(root, Subject::Scaffold, "invoice", &["total:integer"]).unwrap();

    assert!(read(root, "src/entities/invoice.rs").contains("pub total: i32,"));
    assert!(read(root, "src/handlers/invoices.rs").contains("pub total: i32,"));
    assert!(read(root, "views/invoices/form.html").contains("type=\"number\" id=\"total\" name=\"total\""));
    assert!(read(root, "migrations/create_invoices.sql").contains("total INTEGER NOT NULL,"));
}

#[test]
fn test_unknown_column_kind_writes_nothing() {
    let base = TempDir::new().unwrap();

    let err = generate(base.path(), Subject::Scaffold, "invoice", &["total:bogus"]).unwrap_err();

    assert!(matches!(
        err,
        Error::Parse(ParseError::UnsupportedColumnKind { ref kind, .. }) if kind == "bogus"
    ));
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(fs::read_dir(base.path()).unwrap().count(), 0);
}

#[test]
fn test_singular_and_plural_names_resolve_identically() {
    assert_eq!(resolve("user"), resolve("users"));
    assert_eq!(resolve("User"), resolve("user"));
}

#[test]
fn test_repeated_route_generation_is_byte_identical() {
    let base = TempDir::new().unwrap();
    let root = base.path();
    let templates = TemplateRegistry::embedded().unwrap();
    let layout = ProjectLayout::default();
    let store = LocalFileStore::new(root);
    let scaffolder = Scaffolder::new(&templates, &layout, &store);
    let spec = ResourceSpec::parse("post", &["title"]).unwrap();
    let routes_only = GenerationOptions {
        routes: true,
        ..GenerationOptions::default()
    };

    let first = scaffolder.generate(&spec, &routes_only).unwrap();
    assert_eq!(first[0].outcome, MergeOutcome::Appended);
    let before = read(root, "src/routes.rs");

    let second = scaffolder.generate(&spec, &routes_only).unwrap();
    assert_eq!(second[0].outcome, MergeOutcome::AlreadyApplied);
    assert_eq!(read(root, "src/routes.rs"), before);
    assert_eq!(before.matches("wheel:route:posts").count(), 1);
}

#[test]
fn test_second_scaffold_conflicts_without_overwriting() {
    let base = TempDir::new().unwrap();
    let root = base.path();

    generate(root, Subject::Scaffold, "post", &["title"]).unwrap();
    fs::write(root.join("src/entities/post.rs"), "// edited by hand\n").unwrap();

    let err = generate(root, Subject::Scaffold, "post", &["title"]).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert_eq!(err.artifact(), Some((ArtifactKind::Entity, "post")));
    assert_eq!(read(root, "src/entities/post.rs"), "// edited by hand\n");
}

#[test]
fn test_entries_follow_generation_order() {
    let base = TempDir::new().unwrap();
    let root = base.path();

    for name in ["post", "comment", "tag"] {
        generate(root, Subject::Handler, name, &["title"]).unwrap();
    }

    let routes = read(root, "src/routes.rs");
    let posts = routes.find("wheel:route:posts").unwrap();
    let comments = routes.find("wheel:route:comments").unwrap();
    let tags = routes.find("wheel:route:tags").unwrap();
    assert!(posts < comments && comments < tags);

    let policies = read(root, "src/authorization.rs");
    assert!(policies.find("wheel:policy:posts") < policies.find("wheel:policy:tags"));
}

#[test]
fn test_malformed_shared_file_stops_generation() {
    let base = TempDir::new().unwrap();
    let root = base.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/routes.rs"), "pub fn router() {}\n").unwrap();

    let err = generate(root, Subject::Scaffold, "post", &["title"]).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Merge);
    assert_eq!(err.artifact(), Some((ArtifactKind::Routes, "post")));
    assert!(err.to_string().contains("routes"));
    // earlier artifacts are kept, later ones never written
    assert!(root.join("src/handlers/posts.rs").exists());
    assert!(!root.join("migrations/create_posts.sql").exists());
    assert_eq!(read(root, "src/routes.rs"), "pub fn router() {}\n");
}

#[test]
fn test_standalone_migration_registers_in_manifest() {
    let base = TempDir::new().unwrap();
    let root = new_app(&base);

    generate(&root, Subject::Model, "user", &["email"]).unwrap();
    generate(&root, Subject::Migration, "add_total_to_users", &["total:integer"]).unwrap();

    let sql = read(&root, "migrations/add_total_to_users.sql");
    assert!(sql.contains("ALTER TABLE users ADD COLUMN total INTEGER;"));

    let manifest = read(&root, "src/migrations.rs");
    let create = manifest.find("wheel:migration:create_users").unwrap();
    let add = manifest.find("wheel:migration:add_total_to_users").unwrap();
    assert!(create < add);
}

#[test]
fn test_reference_column() {
    let base = TempDir::new().unwrap();
    let root = base.path();

    generate(root, Subject::Model, "comment", &["body:text", "post:references"]).unwrap();

    assert!(read(root, "src/entities/comment.rs").contains("pub post_id: i64,"));
    assert!(read(root, "migrations/create_comments.sql").contains("post_id BIGINT REFERENCES posts(id) NOT NULL,"));
    assert!(read(root, "src/models/comment.rs").contains("INSERT INTO comments (body, post_id) VALUES ($1, $2)"));
}

#[test]
fn test_template_override_is_used() {
    let base = TempDir::new().unwrap();
    let overrides = TempDir::new().unwrap();
    fs::create_dir_all(overrides.path().join("resource")).unwrap();
    fs::write(
        overrides.path().join("resource/entity.hbs"),
        "// custom entity for {{names.type_name}}\n",
    )
    .unwrap();

    let templates = TemplateRegistry::from_settings(&TemplateSettings {
        override_dir: Some(overrides.path().to_path_buf()),
    })
    .unwrap();
    let layout = ProjectLayout::default();
    let store = LocalFileStore::new(base.path());
    let spec = ResourceSpec::parse("post", &["title"]).unwrap();

    Scaffolder::new(&templates, &layout, &store)
        .generate(&spec, &GenerationOptions::for_subject(Subject::Entity))
        .unwrap();

    assert_eq!(read(base.path(), "src/entities/post.rs"), "// custom entity for Post\n");
}

#[test]
fn test_custom_layout() {
    let base = TempDir::new().unwrap();
    let root = base.path();
    let templates = TemplateRegistry::embedded().unwrap();
    let layout = ProjectLayout {
        migrations_dir: "db/migrations".into(),
        migration_manifest: "src/db/manifest.rs".into(),
        ..ProjectLayout::default()
    };
    let store = LocalFileStore::new(root);
    let spec = ResourceSpec::parse("post", &["title"]).unwrap();

    Scaffolder::new(&templates, &layout, &store)
        .generate(&spec, &GenerationOptions::for_subject(Subject::Entity))
        .unwrap();

    assert!(root.join("db/migrations/create_posts.sql").exists());
    assert!(read(root, "src/db/manifest.rs").contains("include_str!(\"../../db/migrations/create_posts.sql\")"));
}
