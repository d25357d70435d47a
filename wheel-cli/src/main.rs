//! wheel CLI tool

#![forbid(unsafe_code)]
#![allow(clippy::cognitive_complexity)]

mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{GenerateCommand, NewCommand};
use wheel::config::{WheelConfig, CONFIG_FILE};
use wheel::scaffold::Subject;

#[derive(Parser)]
#[command(name = "wheel")]
#[command(version)]
#[command(about = "Scaffold axum + sqlx web applications", long_about = None)]
struct Cli {
    /// Configuration file (defaults to wheel.toml in the project root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory generated files are written under
    #[arg(long, global = true, default_value = ".")]
    project_root: PathBuf,

    /// Log each step to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new application from a repository path (e.g. `github.com/acme/blog`)
    #[command(alias = "n")]
    New {
        /// Repository path; its last segment names the application
        repository: String,
        /// Do not initialize a git repository
        #[arg(short = 'G', long)]
        skip_git: bool,
    },
    /// Generate code for a resource
    #[command(alias = "g")]
    Generate {
        /// What to generate: scaffold, model, handler, entity or migration
        subject: Subject,
        /// Resource name (`post`, `UserProfile`) or migration name (`add_total_to_users`)
        name: String,
        /// Column definitions (e.g. `title`, `body:text`, `author:references`)
        columns: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    wheel::observability::init(cli.verbose).context("Failed to initialize logging")?;
    let config = load_config(cli.config.as_deref(), &cli.project_root)?;

    match cli.command {
        Commands::New {
            repository,
            skip_git,
        } => {
            let cmd = NewCommand::new(&repository, skip_git)?;
            cmd.execute(&config, &cli.project_root)?;
        }
        Commands::Generate {
            subject,
            name,
            columns,
        } => {
            let cmd = GenerateCommand::new(subject, name, columns);
            cmd.execute(&config, &cli.project_root)?;
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>, project_root: &Path) -> Result<WheelConfig> {
    let local = project_root.join(CONFIG_FILE);
    let config = match explicit {
        Some(path) => WheelConfig::load_from(path),
        None if local.is_file() => WheelConfig::load_from(&local),
        None => WheelConfig::load(),
    };
    config.context("Failed to load configuration")
}
