//! Embedded per-resource templates
//!
//! Whole-file templates receive the resource context built by the scaffolder
//! (`names`, `columns`, SQL statements). Fragment templates receive only the
//! values their single entry needs.

/// Entity struct and writable-fields struct
pub const ENTITY: &str = r"//! {{names.title}} entity.

/// A row of the `{{names.table_name}}` table.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct {{names.type_name}} {
    pub id: i64,
{{#each columns}}
    pub {{column_name}}: {{entity_type}},
{{/each}}
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Writable fields of a {{names.title}}.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct {{names.type_name}}Changes {
{{#each columns}}
    pub {{column_name}}: {{entity_type}},
{{/each}}
}
";

/// Data-access functions
pub const MODEL: &str = r#"//! Data access for {{names.plural_title}}.

use sqlx::PgPool;

use crate::entities::{{names.file_stem}} as entity;

/// Returns every {{names.title}}, oldest first.
pub async fn all(db: &PgPool) -> Result<Vec<entity::{{names.type_name}}>, sqlx::Error> {
    sqlx::query_as::<_, entity::{{names.type_name}}>("SELECT * FROM {{names.table_name}} ORDER BY id")
        .fetch_all(db)
        .await
}

/// Finds a {{names.title}} by id.
pub async fn find(db: &PgPool, id: i64) -> Result<Option<entity::{{names.type_name}}>, sqlx::Error> {
    sqlx::query_as::<_, entity::{{names.type_name}}>("SELECT * FROM {{names.table_name}} WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Inserts a new {{names.title}}.
pub async fn create(db: &PgPool, changes: &entity::{{names.type_name}}Changes) -> Result<entity::{{names.type_name}}, sqlx::Error> {
    sqlx::query_as::<_, entity::{{names.type_name}}>("{{insert_sql}}")
{{#each columns}}
        .bind(&changes.{{column_name}})
{{/each}}
        .fetch_one(db)
        .await
}

/// Updates a {{names.title}}, returning `None` when it does not exist.
pub async fn update(
    db: &PgPool,
    id: i64,
    changes: &entity::{{names.type_name}}Changes,
) -> Result<Option<entity::{{names.type_name}}>, sqlx::Error> {
    sqlx::query_as::<_, entity::{{names.type_name}}>("{{update_sql}}")
{{#each columns}}
        .bind(&changes.{{column_name}})
{{/each}}
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Deletes a {{names.title}}, returning whether a row was removed.
pub async fn delete(db: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM {{names.table_name}} WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
"#;

/// Static HTML form posting to the resource collection
pub const VIEW: &str = r#"<!-- {{names.title}} form -->
<form method="post" action="{{names.route_path}}">
{{#each columns}}
  <div class="field">
    <label for="{{column_name}}">{{title}}</label>
{{#if is_textarea}}
    <textarea id="{{column_name}}" name="{{column_name}}" required></textarea>
{{else}}
    <input type="{{view_type}}" id="{{column_name}}" name="{{column_name}}"{{view_attributes}}>
{{/if}}
  </div>
{{/each}}
  <button type="submit">Save {{names.title}}</button>
</form>
"#;

/// CRUD handlers guarded by the policy table
pub const HANDLER: &str = r#"//! HTTP handlers for {{names.plural_title}}.

use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Form;
use axum::Json;
use serde::Deserialize;

use crate::authorization::authorize;
use crate::authorization::Action;
use crate::entities::{{names.file_stem}} as entity;
use crate::models::{{names.file_stem}} as model;
use crate::state::AppState;

const RESOURCE: &str = "{{names.table_name}}";

/// Form payload for creating or updating a {{names.title}}.
#[derive(Debug, Deserialize)]
pub struct {{names.type_name}}Form {
{{#each columns}}
    pub {{column_name}}: {{handler_type}},
{{/each}}
}

impl From<{{names.type_name}}Form> for entity::{{names.type_name}}Changes {
    fn from(form: {{names.type_name}}Form) -> Self {
        Self {
{{#each columns}}
            {{column_name}}: {{conversion}},
{{/each}}
        }
    }
}

fn guard(headers: &HeaderMap, action: Action) -> Result<(), StatusCode> {
    let role = headers
        .get("x-role")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("guest");
    if authorize(role, RESOURCE, action) {
        Ok(())
    } else {
        Err(StatusCode::FORBIDDEN)
    }
}

fn internal(err: sqlx::Error) -> StatusCode {
    tracing::error!(error = %err, resource = RESOURCE, "database error");
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Lists every {{names.title}}.
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<entity::{{names.type_name}}>>, StatusCode> {
    guard(&headers, Action::Index)?;
    model::all(&state.db).await.map(Json).map_err(internal)
}

/// Shows one {{names.title}}.
pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<entity::{{names.type_name}}>, StatusCode> {
    guard(&headers, Action::Show)?;
    model::find(&state.db, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Creates a {{names.title}} from a submitted form.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<{{names.type_name}}Form>,
) -> Result<(StatusCode, Json<entity::{{names.type_name}}>), StatusCode> {
    guard(&headers, Action::Create)?;
    let record = model::create(&state.db, &form.into()).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Updates a {{names.title}} from a submitted form.
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Form(form): Form<{{names.type_name}}Form>,
) -> Result<Json<entity::{{names.type_name}}>, StatusCode> {
    guard(&headers, Action::Update)?;
    model::update(&state.db, id, &form.into())
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Deletes a {{names.title}}.
pub async fn destroy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    guard(&headers, Action::Destroy)?;
    if model::delete(&state.db, id).await.map_err(internal)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
"#;

/// New table with the resource's columns
pub const MIGRATION_CREATE: &str = r"-- {{migration_name}}
CREATE TABLE {{table}} (
    id BIGSERIAL PRIMARY KEY,
{{#each columns}}
    {{sql_definition}} NOT NULL,
{{/each}}
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

/// Column additions or removals on an existing table
pub const MIGRATION_ALTER: &str = r"-- {{migration_name}}
{{#each statements}}
{{this}};
{{/each}}
";

/// Route table entry, inserted above the routes anchor
pub const ROUTE_ENTRY: &str = r#"        // wheel:route:{{names.table_name}}
        .route("{{names.route_path}}", get(handlers::{{names.table_name}}::index).post(handlers::{{names.table_name}}::create))
        .route("{{names.route_path}}/{id}", get(handlers::{{names.table_name}}::show).put(handlers::{{names.table_name}}::update).delete(handlers::{{names.table_name}}::destroy))
"#;

/// Module declaration; the line itself is the marker
pub const MODULE_ENTRY: &str = "pub mod {{module}};\n";

/// Migration manifest entry
pub const MIGRATION_ENTRY: &str = r#"    Migration { name: "{{migration_name}}", sql: include_str!("{{include_path}}") }, // wheel:migration:{{migration_name}}
"#;

/// Default policies: anyone may read, admins may write
pub const POLICY_ENTRY: &str = r#"    // wheel:policy:{{names.table_name}}
    Policy { resource: "{{names.table_name}}", action: Action::Index, roles: &["*"] },
    Policy { resource: "{{names.table_name}}", action: Action::Show, roles: &["*"] },
    Policy { resource: "{{names.table_name}}", action: Action::Create, roles: &["admin"] },
    Policy { resource: "{{names.table_name}}", action: Action::Update, roles: &["admin"] },
    Policy { resource: "{{names.table_name}}", action: Action::Destroy, roles: &["admin"] },
"#;
