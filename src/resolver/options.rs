//! Per-lookup options and date formatting.

use super::ResolveError;
use chrono::{
    DateTime, Local, Utc,
    format::{Item, StrftimeItems},
};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Pattern used when no `format` is configured, e.g. `07-Jan-24`.
pub const DEFAULT_FORMAT: &str = "%d-%b-%y";

/// Program used for git commands unless configured otherwise.
pub const DEFAULT_GIT: &str = "git";

/// Zone the resolved instant is rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneMode {
    #[default]
    Utc,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// strftime pattern; [`DEFAULT_FORMAT`] when unset
    pub format: Option<String>,
    pub timezone: TimeZoneMode,
    /// git executable (name on PATH or absolute path)
    pub git: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            format: None,
            timezone: TimeZoneMode::default(),
            git: DEFAULT_GIT.into(),
        }
    }
}

impl Options {
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_git(mut self, git: impl Into<String>) -> Self {
        self.git = git.into();
        self
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }
}

/// Reject patterns chrono cannot render.
pub fn check_format(pattern: &str) -> Result<(), ResolveError> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ResolveError::InvalidFormat(pattern.to_owned()));
    }
    Ok(())
}

/// Render `instant` with a strftime `pattern` in the requested zone.
pub fn format_instant(
    instant: DateTime<Utc>,
    pattern: &str,
    timezone: TimeZoneMode,
) -> Result<String, ResolveError> {
    check_format(pattern)?;

    let mut out = String::new();
    let written = match timezone {
        TimeZoneMode::Utc => write!(out, "{}", instant.format(pattern)),
        TimeZoneMode::Local => write!(out, "{}", instant.with_timezone(&Local).format(pattern)),
    };
    written.map_err(|_| ResolveError::InvalidFormat(pattern.to_owned()))?;
    Ok(out)
}
