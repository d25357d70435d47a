//! Resource generation command

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use wheel::config::WheelConfig;
use wheel::merge::MergeOutcome;
use wheel::scaffold::{AppliedArtifact, GenerationOptions, ResourceSpec, Scaffolder, Subject};
use wheel::store::LocalFileStore;
use wheel::templates::TemplateRegistry;

/// Generate code for a resource
pub struct GenerateCommand {
    subject: Subject,
    name: String,
    columns: Vec<String>,
}

impl GenerateCommand {
    /// Create a new command instance
    pub const fn new(subject: Subject, name: String, columns: Vec<String>) -> Self {
        Self {
            subject,
            name,
            columns,
        }
    }

    /// Execute the command
    pub fn execute(&self, config: &WheelConfig, project_root: &Path) -> Result<()> {
        println!(
            "\n{} {} {}",
            style("Generating").cyan().bold(),
            style(self.subject).cyan().bold(),
            style(&self.name).green().bold()
        );

        let spec = ResourceSpec::parse(&self.name, self.columns.as_slice())?;
        let templates =
            TemplateRegistry::from_settings(&config.templates).context("Failed to load templates")?;
        for id in templates.overridden() {
            println!("  {} template {}", style("using").dim(), style(id).yellow());
        }

        let store = LocalFileStore::new(project_root);
        let scaffolder = Scaffolder::new(&templates, &config.layout, &store);
        let options = GenerationOptions::for_subject(self.subject);

        let applied = match scaffolder.generate(&spec, &options) {
            Ok(applied) => applied,
            Err(err) => {
                if let Some((kind, resource)) = err.artifact() {
                    eprintln!(
                        "\n{} generation stopped at the {} for '{}'. Files written before this step were kept; inspect them before re-running.",
                        style("!").red().bold(),
                        kind,
                        resource
                    );
                }
                return Err(err).context(format!("Failed to generate {} '{}'", self.subject, self.name));
            }
        };

        Self::print_summary(&applied);
        Ok(())
    }

    fn print_summary(applied: &[AppliedArtifact]) {
        println!();
        for artifact in applied {
            let outcome = match artifact.outcome {
                MergeOutcome::Created => style(artifact.outcome).green(),
                MergeOutcome::Appended => style(artifact.outcome).cyan(),
                MergeOutcome::AlreadyApplied => style(artifact.outcome).dim(),
            };
            println!("  {outcome:>9} {}", artifact.path.display());
        }

        let written = applied
            .iter()
            .filter(|a| a.outcome != MergeOutcome::AlreadyApplied)
            .count();
        println!(
            "\n{} {} of {} files",
            style("✓ Updated").green().bold(),
            written,
            applied.len()
        );
    }
}
