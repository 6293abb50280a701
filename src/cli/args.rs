//! Command-line interface definitions.

use crate::resolver::TimeZoneMode;
use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "lastmod.toml";

/// Print last-modified dates of site pages, from git history or file mtime
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Pages to resolve, relative to the site source
    #[arg(value_name = "PAGE", required = true, value_hint = clap::ValueHint::FilePath)]
    pub pages: Vec<String>,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: lastmod.toml, searched upward from cwd)
    #[arg(short = 'C', long, default_value = DEFAULT_CONFIG, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Site source directory (relative to current directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// strftime pattern for the output, e.g. "%Y-%m-%d"
    #[arg(short, long)]
    pub format: Option<String>,

    /// Timezone dates are rendered in
    #[arg(long, value_enum)]
    pub timezone: Option<TimeZoneMode>,

    /// git executable to query history with
    #[arg(long, value_hint = clap::ValueHint::ExecutablePath)]
    pub git: Option<String>,

    /// Print epoch seconds instead of formatted dates
    #[arg(short, long)]
    pub unix: bool,

    /// Print a JSON object mapping each page to its value
    #[arg(short, long)]
    pub json: bool,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}
