//! Embedded project tree for new applications
//!
//! Rendered with `app_name` and `repository` in the context. The shared-file
//! skeletons here double as the fallback content the merge engine uses when a
//! shared file is missing, so both always agree on anchor placement.

/// Application manifest
pub const CARGO_TOML: &str = r#"[package]
name = "{{app_name}}"
version = "0.1.0"
edition = "2021"
publish = false

[dependencies]
anyhow = "1"
axum = "0.8"
chrono = { version = "0.4", features = ["serde"] }
figment = { version = "0.10", features = ["toml", "env"] }
lettre = { version = "0.11", default-features = false, features = ["builder", "smtp-transport", "rustls-tls"] }
rust_decimal = { version = "1", features = ["serde"] }
serde = { version = "1", features = ["derive"] }
serde_json = "1"
sqlx = { version = "0.8", features = ["runtime-tokio", "postgres", "chrono", "uuid", "rust_decimal"] }
thiserror = "2"
tokio = { version = "1", features = ["full"] }
tower-http = { version = "0.6", features = ["fs", "trace"] }
tracing = "0.1"
tracing-subscriber = { version = "0.3", features = ["env-filter"] }
uuid = { version = "1", features = ["serde", "v4"] }
"#;

/// Application README
pub const README_MD: &str = r"# {{app_name}}

Generated from `{{repository}}`.

## Setup

1. Create the database:
   ```bash
   createdb {{app_name}}_development
   ```

2. Adjust `config/app.toml`, or override any value with `APP_*`
   environment variables (`APP_DATABASE_URL`, `APP_MAIL__HOST`).

3. Run the server; pending migrations are applied on startup:
   ```bash
   cargo run
   ```

## Generating resources

```bash
wheel generate scaffold post title body:text published:boolean
wheel g model comment body:text post:references
wheel g migration add_views_to_posts views:integer
```
";

/// Ignore rules
pub const GITIGNORE: &str = r"/target
.env
*.log
";

/// Runtime settings
pub const CONFIG_APP: &str = r#"bind = "127.0.0.1:3000"
database_url = "postgres://localhost/{{app_name}}_development"

[mail]
host = "localhost"
port = 587
user = ""
password = ""
"#;

/// Entry point wiring configuration, database and router
pub const MAIN_RS: &str = r#"//! {{app_name}}

mod authorization;
mod entities;
mod handlers;
mod mailer;
mod migrations;
mod models;
mod routes;
mod state;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = state::AppConfig::load()?;
    let db = sqlx::PgPool::connect(&config.database_url).await?;
    migrations::run(&db).await?;

    let bind = config.bind.clone();
    let app = routes::router()
        .nest_service("/views", ServeDir::new("views"))
        .layer(TraceLayer::new_for_http())
        .with_state(state::AppState { db, config });

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(address = %bind, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
"#;

/// Shared state and settings
pub const STATE_RS: &str = r#"//! Shared application state and settings.

use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Toml;
use figment::Figment;
use serde::Deserialize;
use sqlx::PgPool;

use crate::mailer::MailerConfig;

/// Settings from `config/app.toml`, overridden by `APP_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bind: String,
    pub database_url: String,
    pub mail: MailerConfig,
}

impl AppConfig {
    /// Loads the settings.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("config/app.toml"))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()
    }
}

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: AppConfig,
}
"#;

/// Route table; entries are inserted above the anchor line
pub const ROUTES_RS: &str = r#"//! Route table.

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Builds the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home))
        // wheel:routes:end
}
"#;

/// Migration manifest; entries are inserted above the anchor line
pub const MIGRATIONS_RS: &str = r#"//! Database migrations, oldest first.

use sqlx::PgPool;

/// A named schema change.
pub struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

/// Every migration, in the order it must be applied.
pub const MIGRATIONS: &[Migration] = &[
    // wheel:migrations:end
];

/// Applies migrations that have not run yet.
pub async fn run(db: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (name TEXT PRIMARY KEY, applied_at TIMESTAMPTZ NOT NULL DEFAULT now())",
    )
    .execute(db)
    .await?;

    for migration in MIGRATIONS {
        let applied: Option<(String,)> = sqlx::query_as("SELECT name FROM schema_migrations WHERE name = $1")
            .bind(migration.name)
            .fetch_optional(db)
            .await?;
        if applied.is_some() {
            continue;
        }

        let mut tx = db.begin().await?;
        sqlx::raw_sql(migration.sql).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO schema_migrations (name) VALUES ($1)")
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(migration = migration.name, "applied migration");
    }

    Ok(())
}
"#;

/// Policy table; entries are inserted above the anchor line
pub const AUTHORIZATION_RS: &str = r#"//! Authorization policies.

/// Actions a handler can guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Index,
    Show,
    Create,
    Update,
    Destroy,
}

/// Roles allowed to perform an action on a resource. `"*"` allows everyone.
pub struct Policy {
    pub resource: &'static str,
    pub action: Action,
    pub roles: &'static [&'static str],
}

/// Policy table. Anything without an entry is denied.
pub const POLICIES: &[Policy] = &[
    // wheel:policies:end
];

/// Returns whether `role` may perform `action` on `resource`.
pub fn authorize(role: &str, resource: &str, action: Action) -> bool {
    POLICIES.iter().any(|policy| {
        policy.resource == resource
            && policy.action == action
            && (policy.roles.contains(&"*") || policy.roles.contains(&role))
    })
}
"#;

/// Entities module registry
pub const ENTITIES_MOD: &str = r"//! Database entities.

// wheel:modules:end
";

/// Models module registry
pub const MODELS_MOD: &str = r"//! Data access.

// wheel:modules:end
";

/// Handlers module registry with the landing page
pub const HANDLERS_MOD: &str = r#"//! HTTP handlers.

// wheel:modules:end

/// Landing page.
pub async fn home() -> &'static str {
    "It works!"
}
"#;

/// Outgoing mail
pub const MAILER_RS: &str = r#"//! Outgoing mail.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::Message;
use lettre::SmtpTransport;
use lettre::Transport;
use serde::Deserialize;

/// SMTP settings, the `[mail]` table of `config/app.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("message has no sender")]
    MissingSender,
    #[error("message has no recipients")]
    NoRecipients,
    #[error(transparent)]
    Build(#[from] lettre::error::Error),
    #[error(transparent)]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Header an address is added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientKind {
    To,
    Cc,
    Bcc,
    From,
}

/// Sender and recipients of one message.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    from: Option<Mailbox>,
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
    bcc: Vec<Mailbox>,
}

impl Envelope {
    /// Adds an address; `From` replaces any previous sender.
    pub fn add(mut self, kind: RecipientKind, address: &str) -> Result<Self, MailError> {
        let mailbox: Mailbox = address.parse()?;
        match kind {
            RecipientKind::From => self.from = Some(mailbox),
            RecipientKind::To => self.to.push(mailbox),
            RecipientKind::Cc => self.cc.push(mailbox),
            RecipientKind::Bcc => self.bcc.push(mailbox),
        }
        Ok(self)
    }

    /// Every recipient address, one entry per To, Cc and Bcc mailbox.
    pub fn receipts(&self) -> Vec<String> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(|mailbox| mailbox.email.to_string())
            .collect()
    }

    fn message(&self, subject: &str, body: String, html: bool) -> Result<Message, MailError> {
        let from = self.from.clone().ok_or(MailError::MissingSender)?;
        if self.receipts().is_empty() {
            return Err(MailError::NoRecipients);
        }

        let mut builder = Message::builder().from(from).subject(subject);
        for mailbox in &self.to {
            builder = builder.to(mailbox.clone());
        }
        for mailbox in &self.cc {
            builder = builder.cc(mailbox.clone());
        }
        for mailbox in &self.bcc {
            builder = builder.bcc(mailbox.clone());
        }

        let content_type = if html { ContentType::TEXT_HTML } else { ContentType::TEXT_PLAIN };
        Ok(builder.header(content_type).body(body)?)
    }
}

/// Sends a message through the configured SMTP relay.
pub fn send(
    config: &MailerConfig,
    envelope: &Envelope,
    subject: &str,
    body: String,
    html: bool,
) -> Result<(), MailError> {
    let message = envelope.message(subject, body, html)?;
    let transport = SmtpTransport::relay(&config.host)?
        .port(config.port)
        .credentials(Credentials::new(config.user.clone(), config.password.clone()))
        .build();
    transport.send(&message)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipts_lists_every_recipient() {
        let envelope = Envelope::default()
            .add(RecipientKind::From, "app@example.com")
            .unwrap()
            .add(RecipientKind::To, "a@example.com")
            .unwrap()
            .add(RecipientKind::To, "b@example.com")
            .unwrap()
            .add(RecipientKind::Cc, "c@example.com")
            .unwrap()
            .add(RecipientKind::Bcc, "d@example.com")
            .unwrap();

        assert_eq!(
            envelope.receipts(),
            vec!["a@example.com", "b@example.com", "c@example.com", "d@example.com"]
        );
    }

    #[test]
    fn message_requires_a_sender() {
        let envelope = Envelope::default().add(RecipientKind::To, "a@example.com").unwrap();
        assert!(matches!(
            envelope.message("hi", String::new(), false),
            Err(MailError::MissingSender)
        ));
    }
}
"#;
