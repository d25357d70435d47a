//! Application creation command

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use wheel::config::WheelConfig;
use wheel::init::{AppInitializer, InitRequest};
use wheel::process::SystemRunner;
use wheel::templates::TemplateRegistry;

/// Create a new application
pub struct NewCommand {
    request: InitRequest,
}

impl NewCommand {
    /// Create a new command instance
    pub fn new(repository: &str, skip_git: bool) -> Result<Self> {
        let request = InitRequest::from_repository(repository, skip_git)?;
        Ok(Self { request })
    }

    /// Execute the command
    pub fn execute(&self, config: &WheelConfig, base_dir: &Path) -> Result<()> {
        println!(
            "{} {} {}",
            style("Creating").green().bold(),
            style("application:").bold(),
            style(&self.request.app_name).cyan().bold()
        );
        println!();

        let templates =
            TemplateRegistry::from_settings(&config.templates).context("Failed to load templates")?;
        let runner = SystemRunner;
        let initializer = AppInitializer::new(&templates, &config.layout, &config.vcs, &runner);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Failed to set progress style")?,
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        spinner.set_message("Writing project files...");

        let result = initializer.init_app(base_dir, &self.request);
        spinner.finish_and_clear();

        let destination = result
            .with_context(|| format!("Failed to create application '{}'", self.request.app_name))?;

        self.print_success(&destination);
        Ok(())
    }

    /// Print success message with next steps
    fn print_success(&self, destination: &Path) {
        println!("{}", style("✓ Application created successfully!").green().bold());
        println!();
        println!("{}", style("Next steps:").bold());
        println!();
        println!("  {} Navigate to the application:", style("1.").cyan());
        println!(
            "     {} {}",
            style("$").dim(),
            style(format!("cd {}", destination.display())).cyan()
        );
        println!();
        println!("  {} Create the database:", style("2.").cyan());
        println!(
            "     {} {}",
            style("$").dim(),
            style(format!("createdb {}_development", self.request.app_name)).cyan()
        );
        println!();
        println!("  {} Generate a resource:", style("3.").cyan());
        println!(
            "     {} {}",
            style("$").dim(),
            style("wheel generate scaffold post title body:text").cyan()
        );
        println!();
        println!("  {} Start the server:", style("4.").cyan());
        println!("     {} {}", style("$").dim(), style("cargo run").cyan());
    }
}
