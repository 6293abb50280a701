//! Utility modules for last-modified resolution.

pub mod exec;
pub mod git;
pub mod path;
