//! Path utilities.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `sanitized_path`)

pub mod fs;

pub use fs::{normalize_path, sanitized_path};
