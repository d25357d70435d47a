//! Generator configuration
//!
//! Configuration is layered with figment, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. `./wheel.toml` (or an explicitly given file)
//! 3. Environment variables prefixed with `WHEEL_`, using `__` for nesting
//!    (`WHEEL_VCS__ENABLED=false`, `WHEEL_LAYOUT__VIEWS_DIR=templates`)
//!
//! The loaded [`WheelConfig`] is passed explicitly to the scaffolder and the
//! app initializer; nothing reads it from global state.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::layout::ProjectLayout;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "wheel.toml";

/// Complete generator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Where generated files go
    pub layout: ProjectLayout,
    /// Template lookup
    pub templates: TemplateSettings,
    /// Version control for new applications
    pub vcs: VcsSettings,
}

/// Template lookup settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Directory of `<template-id>.hbs` files replacing embedded templates
    pub override_dir: Option<PathBuf>,
}

/// Version-control initialization for new applications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcsSettings {
    /// Run the init command after copying the project tree
    pub enabled: bool,
    /// Program to run
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
}

impl Default for VcsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "git".to_string(),
            args: vec!["init".to_string()],
        }
    }
}

impl WheelConfig {
    /// Load configuration from `./wheel.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a configuration source cannot be parsed.
    pub fn load() -> Result<Self, Error> {
        let local = PathBuf::from(CONFIG_FILE);
        Self::figment(local.exists().then_some(local.as_path()))?
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a specific file plus the environment
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file does not exist or a source
    /// cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        if !path.is_file() {
            return Err(Error::Config(format!(
                "configuration file {} not found",
                path.display()
            )));
        }

        Self::figment(Some(path))?
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }

    fn figment(file: Option<&Path>) -> Result<Figment, Error> {
        let defaults = toml::to_string(&Self::default()).map_err(|e| Error::Config(e.to_string()))?;

        let mut figment = Figment::new().merge(Toml::string(&defaults));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }

        Ok(figment.merge(Env::prefixed("WHEEL_").split("__").lowercase(true)))
    }
}
