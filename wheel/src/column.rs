//! Column definitions for resource generation
//!
//! Columns are given on the command line as `name:kind` tokens. A bare `name`
//! is a `string` column.
//!
//! # Supported Column Kinds
//!
//! - `string` - VARCHAR(255), Rust `String`
//! - `text` - TEXT, Rust `String`
//! - `integer` - INTEGER, Rust `i32`
//! - `bigint` - BIGINT, Rust `i64`
//! - `float` - DOUBLE PRECISION, Rust `f64`
//! - `decimal` - NUMERIC(19,4), Rust `rust_decimal::Decimal`
//! - `boolean` - BOOLEAN, Rust `bool`
//! - `date` - DATE, Rust `chrono::NaiveDate`
//! - `datetime` - TIMESTAMPTZ, Rust `chrono::DateTime<Utc>`
//! - `uuid` - UUID, Rust `uuid::Uuid`
//! - `references` - foreign key stored in a `<name>_id` BIGINT column
//!
//! # Examples
//!
//! ```text
//! title                → title:string
//! total:integer        → INTEGER
//! author:references    → author_id BIGINT REFERENCES authors(id)
//! ```

use std::fmt;

use inflector::Inflector;
use serde::Serialize;
use thiserror::Error;

use crate::naming::{self, DerivedNames};

/// Column names every generated table already has.
pub const RESERVED_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

const SUPPORTED_KINDS: &str =
    "string, text, integer, bigint, float, decimal, boolean, date, datetime, uuid, references";

/// Errors produced while parsing column tokens
///
/// Every variant carries the token that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Token is not of the form `name` or `name:kind`
    #[error("invalid column '{token}': {reason}")]
    InvalidColumnSyntax {
        /// Offending token
        token: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Kind is not one of the supported kinds
    #[error("unsupported column kind '{kind}' in '{token}' (supported: {SUPPORTED_KINDS})")]
    UnsupportedColumnKind {
        /// Offending token
        token: String,
        /// Kind as written
        kind: String,
    },

    /// Same column name given twice
    #[error("column '{column}' is defined more than once (at '{token}')")]
    DuplicateColumn {
        /// Offending token
        token: String,
        /// Normalized column name
        column: String,
    },

    /// Column clashes with an automatically generated one
    #[error("column '{column}' is generated automatically and cannot be declared (at '{token}')")]
    ReservedColumnName {
        /// Offending token
        token: String,
        /// Normalized column name
        column: String,
    },
}

impl ParseError {
    /// Token that caused the error
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::InvalidColumnSyntax { token, .. }
            | Self::UnsupportedColumnKind { token, .. }
            | Self::DuplicateColumn { token, .. }
            | Self::ReservedColumnName { token, .. } => token,
        }
    }
}

/// Fixed set of column kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Short string
    String,
    /// Unbounded text
    Text,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    BigInt,
    /// Double precision float
    Float,
    /// Fixed-point decimal
    Decimal,
    /// Boolean flag
    Boolean,
    /// Calendar date
    Date,
    /// Timestamp with time zone
    DateTime,
    /// UUID
    Uuid,
    /// Foreign key to another resource
    Reference,
}

impl ColumnKind {
    /// Every kind, in declaration order
    pub const ALL: [Self; 11] = [
        Self::String,
        Self::Text,
        Self::Integer,
        Self::BigInt,
        Self::Float,
        Self::Decimal,
        Self::Boolean,
        Self::Date,
        Self::DateTime,
        Self::Uuid,
        Self::Reference,
    ];

    /// Token used on the command line
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Uuid => "uuid",
            Self::Reference => "references",
        }
    }

    /// Look up a kind by its token, ignoring ASCII case
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.token().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A single typed column of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// `snake_case` name as declared (`author` for `author:references`)
    pub name: String,
    /// Column kind
    pub kind: ColumnKind,
}

impl Column {
    /// Parse one `name[:kind]` token
    ///
    /// # Examples
    ///
    /// ```
    /// # use wheel::column::{Column, ColumnKind};
    /// let column = Column::parse("total:integer").unwrap();
    /// assert_eq!(column.name, "total");
    /// assert_eq!(column.kind, ColumnKind::Integer);
    ///
    /// let column = Column::parse("title").unwrap();
    /// assert_eq!(column.kind, ColumnKind::String);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidColumnSyntax`] for malformed tokens and
    /// [`ParseError::UnsupportedColumnKind`] for unknown kinds.
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        let syntax = |reason| ParseError::InvalidColumnSyntax {
            token: token.to_string(),
            reason,
        };

        let mut parts = token.split(':');
        let name = parts.next().unwrap_or_default().trim();
        let kind = parts.next().map(str::trim);
        if parts.next().is_some() {
            return Err(syntax("expected name or name:kind"));
        }

        if name.is_empty() {
            return Err(syntax("column name cannot be empty"));
        }
        if !name.chars().next().is_some_and(char::is_alphabetic)
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(syntax(
                "column name must start with a letter and contain only letters, digits and underscores",
            ));
        }
        let name = name.to_snake_case();
        if naming::is_keyword(&name) {
            return Err(syntax("column name is a Rust keyword"));
        }

        let kind = match kind {
            None => ColumnKind::String,
            Some(kind) => {
                ColumnKind::from_token(kind).ok_or_else(|| ParseError::UnsupportedColumnKind {
                    token: token.to_string(),
                    kind: kind.to_string(),
                })?
            }
        };

        Ok(Self { name, kind })
    }

    /// Name of the database column and entity field
    ///
    /// Reference columns store the foreign key in `<name>_id`.
    #[must_use]
    pub fn column_name(&self) -> String {
        match self.kind {
            ColumnKind::Reference => format!("{}_id", self.name),
            _ => self.name.clone(),
        }
    }

    /// Names of the referenced resource, for reference columns
    #[must_use]
    pub fn referenced(&self) -> Option<DerivedNames> {
        (self.kind == ColumnKind::Reference).then(|| naming::resolve(&self.name))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.kind)
    }
}

/// Parse a list of column tokens
///
/// Empty tokens are skipped. The first invalid token aborts the whole parse,
/// so callers never see a partial column list.
///
/// # Errors
///
/// Returns the [`ParseError`] of the first offending token.
pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Column>, ParseError> {
    let mut columns: Vec<Column> = Vec::with_capacity(tokens.len());

    for token in tokens.iter().map(AsRef::as_ref) {
        if token.trim().is_empty() {
            continue;
        }

        let column = Column::parse(token)?;
        let column_name = column.column_name();

        if RESERVED_COLUMNS.contains(&column.name.as_str())
            || RESERVED_COLUMNS.contains(&column_name.as_str())
        {
            return Err(ParseError::ReservedColumnName {
                token: token.to_string(),
                column: column_name,
            });
        }
        if columns.iter().any(|c| c.column_name() == column_name) {
            return Err(ParseError::DuplicateColumn {
                token: token.to_string(),
                column: column_name,
            });
        }

        columns.push(column);
    }

    Ok(columns)
}
