//! lastmod - print last-modified dates of static site pages.

use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use lastmod::{cli::Cli, cli::resolve::run_resolve, config::LastModConfig};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = LastModConfig::load(&cli)?;

    if run_resolve(&cli, &config)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
