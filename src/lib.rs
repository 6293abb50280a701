//! lastmod - last-modified dates for static site content.
//!
//! Git history is preferred: a page's date is the newest commit touching it.
//! Pages outside a working tree, or never committed, fall back to their
//! filesystem mtime. Formatted dates are cached per page path.
//!
//! ```ignore
//! use lastmod::{LastModified, Options};
//!
//! let lookup = LastModified::new("/repo/site", "posts/a.md", Options::default());
//! println!("{}", lookup.formatted_last_modified_date()?);
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod logger;
pub mod resolver;
pub mod utils;

pub use cache::{LastModifiedCache, PATH_CACHE};
pub use resolver::{LastModified, Options, ResolveError, TimeZoneMode};
