//! Column type mapping
//!
//! One static table maps every `(ColumnKind, ArtifactKind)` pair used by a
//! column-bearing artifact to the type string that artifact's template emits.

use thiserror::Error;

use crate::column::ColumnKind;
use crate::scaffold::ArtifactKind;

/// No mapping exists for a column kind in an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no {artifact} type mapping for column kind '{kind}'")]
pub struct MissingTypeMapping {
    /// Column kind being mapped
    pub kind: ColumnKind,
    /// Artifact that needed the mapping
    pub artifact: ArtifactKind,
}

/// Map a column kind to the type string used by an artifact
///
/// Entity and handler mappings are Rust types, view mappings are HTML input
/// types and migration mappings are PostgreSQL column types.
///
/// # Examples
///
/// ```
/// # use wheel::column::ColumnKind;
/// # use wheel::scaffold::ArtifactKind;
/// # use wheel::types::map_type;
/// assert_eq!(map_type(ColumnKind::Integer, ArtifactKind::Entity).unwrap(), "i32");
/// assert_eq!(map_type(ColumnKind::Integer, ArtifactKind::Migrate).unwrap(), "INTEGER");
/// assert!(map_type(ColumnKind::Integer, ArtifactKind::Routes).is_err());
/// ```
///
/// # Errors
///
/// Returns [`MissingTypeMapping`] for artifacts that carry no column types.
pub const fn map_type(kind: ColumnKind, artifact: ArtifactKind) -> Result<&'static str, MissingTypeMapping> {
    use ArtifactKind as A;
    use ColumnKind as K;

    let mapped = match (artifact, kind) {
        (A::Entity, K::String | K::Text) => "String",
        (A::Entity, K::Integer) => "i32",
        (A::Entity, K::BigInt | K::Reference) => "i64",
        (A::Entity, K::Float) => "f64",
        (A::Entity, K::Decimal) => "rust_decimal::Decimal",
        (A::Entity, K::Boolean) => "bool",
        (A::Entity, K::Date) => "chrono::NaiveDate",
        (A::Entity, K::DateTime) => "chrono::DateTime<chrono::Utc>",
        (A::Entity, K::Uuid) => "uuid::Uuid",

        // HTML forms omit unchecked boxes and send local times without an offset
        (A::Handler, K::String | K::Text) => "String",
        (A::Handler, K::Integer) => "i32",
        (A::Handler, K::BigInt | K::Reference) => "i64",
        (A::Handler, K::Float) => "f64",
        (A::Handler, K::Decimal) => "rust_decimal::Decimal",
        (A::Handler, K::Boolean) => "Option<String>",
        (A::Handler, K::Date) => "chrono::NaiveDate",
        (A::Handler, K::DateTime) => "chrono::NaiveDateTime",
        (A::Handler, K::Uuid) => "uuid::Uuid",

        (A::View, K::String | K::Uuid) => "text",
        (A::View, K::Text) => "textarea",
        (A::View, K::Integer | K::BigInt | K::Float | K::Decimal | K::Reference) => "number",
        (A::View, K::Boolean) => "checkbox",
        (A::View, K::Date) => "date",
        (A::View, K::DateTime) => "datetime-local",

        (A::Migrate, K::String) => "VARCHAR(255)",
        (A::Migrate, K::Text) => "TEXT",
        (A::Migrate, K::Integer) => "INTEGER",
        (A::Migrate, K::BigInt | K::Reference) => "BIGINT",
        (A::Migrate, K::Float) => "DOUBLE PRECISION",
        (A::Migrate, K::Decimal) => "NUMERIC(19,4)",
        (A::Migrate, K::Boolean) => "BOOLEAN",
        (A::Migrate, K::Date) => "DATE",
        (A::Migrate, K::DateTime) => "TIMESTAMPTZ",
        (A::Migrate, K::Uuid) => "UUID",

        _ => return Err(MissingTypeMapping { kind, artifact }),
    };

    Ok(mapped)
}

/// Expression converting a handler form field into its entity type
///
/// `field` is the Rust expression holding the form value.
#[must_use]
pub fn form_conversion(kind: ColumnKind, field: &str) -> String {
    match kind {
        ColumnKind::Boolean => format!("{field}.is_some()"),
        ColumnKind::DateTime => format!("{field}.and_utc()"),
        _ => field.to_string(),
    }
}
