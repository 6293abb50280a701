//! Configuration management for `lastmod.toml`.
//!
//! # Sections
//!
//! | Section              | Purpose                                   |
//! |----------------------|-------------------------------------------|
//! | `[site]`             | Site source directory                     |
//! | `[last_modified_at]` | Date format, timezone, git executable     |
//!
//! The file is optional. Without one every value takes its default and the
//! site source is the current directory. CLI flags override file values.

mod error;
mod util;

pub use error::ConfigError;
pub use util::find_config_file_from;

use crate::{
    cli::{Cli, DEFAULT_CONFIG},
    log,
    resolver::{Options, check_format},
    utils::path::normalize_path,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing lastmod.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LastModConfig {
    /// Absolute path to the config file, when one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory relative paths are resolved against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub site: SiteSection,

    /// Options handed to every lookup
    pub last_modified_at: Options,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Site source directory, relative to the config file
    pub source: PathBuf,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            source: PathBuf::from("."),
        }
    }
}

impl LastModConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file. The root is the config
    /// file's directory, or cwd when there is no file. A config named with
    /// `--config` must exist.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file_from(&cwd, &cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| cwd.clone());
                config.config_path = Some(path);
                config
            }
            None if cli.config != Path::new(DEFAULT_CONFIG) => {
                bail!("Config file '{}' not found", cli.config.display());
            }
            None => Self {
                root: cwd.clone(),
                ..Self::default()
            },
        };

        config.apply_cli(cli, &cwd);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let (config, _) = Self::parse_with_ignored(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Check values that would only fail later, at format time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_format(self.last_modified_at.format())
            .map_err(|e| ConfigError::Validation(format!("last_modified_at.format: {e}")))?;

        if self.last_modified_at.git.trim().is_empty() {
            return Err(ConfigError::Validation(
                "last_modified_at.git must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Absolute site source directory.
    pub fn site_source(&self) -> PathBuf {
        normalize_path(&self.root.join(&self.site.source))
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply CLI flags on top of file values.
    ///
    /// `--source` is relative to `cwd`, unlike `[site].source`.
    fn apply_cli(&mut self, cli: &Cli, cwd: &Path) {
        crate::logger::set_verbose(cli.verbose);

        if let Some(source) = &cli.source {
            self.site.source = cwd.join(source);
        }
        if let Some(format) = &cli.format {
            self.last_modified_at.format = Some(format.clone());
        }
        Self::update_option(&mut self.last_modified_at.timezone, cli.timezone.as_ref());
        Self::update_option(&mut self.last_modified_at.git, cli.git.as_ref());
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }
}

// ============================================================================
// tests
// ============================================================================
