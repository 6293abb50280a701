//! Command-line interface module.

mod args;
pub mod resolve;

pub use args::{Cli, DEFAULT_CONFIG};
