//! Cache of formatted last-modified dates, keyed by page path.
//!
//! Entries are write-once: the first formatted string stored for a page is
//! the one every later lookup sees, whatever happens to the format pattern
//! or the file afterwards. Nothing is ever evicted.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::LazyLock;

/// Page path -> formatted date (thread-safe).
#[derive(Debug)]
pub struct LastModifiedCache {
    dates: DashMap<String, String>,
}

impl LastModifiedCache {
    pub fn new() -> Self {
        Self {
            dates: DashMap::new(),
        }
    }

    pub fn get(&self, page_path: &str) -> Option<String> {
        self.dates.get(page_path).map(|r| r.value().clone())
    }

    /// Store `formatted` unless the page already has an entry.
    ///
    /// Returns the value that ends up cached.
    pub fn insert(&self, page_path: &str, formatted: String) -> String {
        match self.dates.entry(page_path.to_owned()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => slot.insert(formatted).value().clone(),
        }
    }

    pub fn clear(&self) {
        self.dates.clear();
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl Default for LastModifiedCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide cache used by [`crate::LastModified::new`].
pub static PATH_CACHE: LazyLock<LastModifiedCache> = LazyLock::new(LastModifiedCache::new);
