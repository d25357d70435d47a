//! wheel: project scaffolding for axum + sqlx web applications
//!
//! Given a resource name and a list of typed columns, wheel renders a
//! consistent set of source files (entity, model, view, handler, route entry,
//! migration and authorization policy) and merges the shared pieces into the
//! project's route table, migration manifest, policy table and module
//! registries without duplicating earlier entries.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wheel::prelude::*;
//!
//! fn main() -> Result<(), wheel::Error> {
//!     let config = WheelConfig::load()?;
//!     let templates = TemplateRegistry::from_settings(&config.templates)?;
//!     let store = LocalFileStore::new(".");
//!
//!     let spec = ResourceSpec::parse("post", &["title", "body:text", "published:boolean"])?;
//!     let applied = Scaffolder::new(&templates, &config.layout, &store)
//!         .generate(&spec, &GenerationOptions::for_subject(Subject::Scaffold))?;
//!
//!     for artifact in applied {
//!         println!("{} {}", artifact.outcome, artifact.path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Layout
//!
//! Paths of generated files come from [`layout::ProjectLayout`], configurable
//! through `wheel.toml` or `WHEEL_LAYOUT__*` environment variables.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod column;
pub mod config;
pub mod error;
pub mod init;
pub mod layout;
pub mod merge;
pub mod naming;
pub mod observability;
pub mod process;
pub mod scaffold;
pub mod store;
pub mod templates;
pub mod types;

pub use error::{Error, ErrorCategory};

pub mod prelude {
    //! Convenience re-exports for common types

    pub use crate::column::{Column, ColumnKind};
    pub use crate::config::WheelConfig;
    pub use crate::error::{Error, ErrorCategory};
    pub use crate::init::{AppInitializer, InitRequest};
    pub use crate::merge::MergeOutcome;
    pub use crate::process::SystemRunner;
    pub use crate::scaffold::{GenerationOptions, ResourceSpec, Scaffolder, Subject};
    pub use crate::store::LocalFileStore;
    pub use crate::templates::TemplateRegistry;
}
