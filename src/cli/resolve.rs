//! Resolve command implementation.
//!
//! Looks up every requested page and prints one value per page, either as
//! tab-separated lines or as a JSON object.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::cli::Cli;
use crate::config::LastModConfig;
use crate::resolver::{LastModified, ResolveError};
use crate::{debug, log};

/// Value resolved for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageValue {
    Formatted(String),
    Unix(i64),
}

impl std::fmt::Display for PageValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Formatted(s) => f.write_str(s),
            Self::Unix(secs) => write!(f, "{secs}"),
        }
    }
}

/// Result for a single page
#[derive(Debug, Serialize)]
pub struct PageResult {
    pub page: String,
    pub value: PageValue,
}

/// Resolve all pages named on the command line and print them.
///
/// Returns `false` when at least one page failed; failures are logged and
/// do not stop the remaining pages.
pub fn run_resolve(cli: &Cli, config: &LastModConfig) -> Result<bool> {
    let source = config.site_source();
    debug!("lastmod"; "site source: {}", source.display());

    let mut results = Vec::with_capacity(cli.pages.len());
    let mut ok = true;

    for page in &cli.pages {
        let lookup = LastModified::new(&source, page.as_str(), config.last_modified_at.clone());
        match resolve_page(&lookup, cli.unix) {
            Ok(value) => results.push(PageResult {
                page: page.clone(),
                value,
            }),
            Err(e) => {
                log!("error"; "{page}: {e}");
                ok = false;
            }
        }
    }

    let mut stdout = std::io::stdout().lock();
    if cli.json {
        writeln!(stdout, "{}", to_json(&results)?)?;
    } else {
        for result in &results {
            writeln!(stdout, "{}\t{}", result.page, result.value)?;
        }
    }

    Ok(ok)
}

fn resolve_page(lookup: &LastModified<'_>, unix: bool) -> Result<PageValue, ResolveError> {
    if unix {
        Ok(PageValue::Unix(lookup.to_liquid()?.timestamp()))
    } else {
        Ok(PageValue::Formatted(lookup.to_s()?.to_owned()))
    }
}

/// Pages in request order, as a single JSON object.
fn to_json(results: &[PageResult]) -> Result<String> {
    let mut map = Map::new();
    for result in results {
        map.insert(result.page.clone(), serde_json::to_value(&result.value)?);
    }
    Ok(serde_json::to_string_pretty(&JsonValue::Object(map))?)
}

// ============================================================================
// tests
// ============================================================================
