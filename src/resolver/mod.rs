//! Last-modified resolution for a single page.
//!
//! Git history wins whenever it has an answer; the filesystem mtime is only
//! consulted when the site is not in a working tree or the page has never
//! been committed. Formatted results go through a [`LastModifiedCache`] and
//! are never recomputed once stored.
//!
//! # Example
//!
//! ```ignore
//! let lookup = LastModified::new("/repo/site", "posts/a.md", Options::default());
//! let date = lookup.formatted_last_modified_date()?; // "14-Nov-23"
//! ```

mod error;
mod options;

pub use error::ResolveError;
pub use options::{
    DEFAULT_FORMAT, DEFAULT_GIT, Options, TimeZoneMode, check_format, format_instant,
};

use crate::{
    cache::{LastModifiedCache, PATH_CACHE},
    debug,
    utils::{
        git::{self, RepoProbe},
        path::sanitized_path,
    },
};
use chrono::{DateTime, Utc};
use std::{
    cell::OnceCell,
    path::{Path, PathBuf},
};

/// One (site source, page path, options) lookup.
///
/// Cheap to build; everything expensive is computed on first use and kept
/// for the life of the instance.
#[derive(Debug)]
pub struct LastModified<'c> {
    site_source: PathBuf,
    page_path: String,
    options: Options,
    cache: &'c LastModifiedCache,

    absolute_path: OnceCell<PathBuf>,
    repo: OnceCell<RepoProbe>,
    relative_path: OnceCell<Option<PathBuf>>,
    to_s: OnceCell<String>,
    to_liquid: OnceCell<DateTime<Utc>>,
}

impl LastModified<'static> {
    /// Lookup backed by the process-wide [`PATH_CACHE`].
    pub fn new(
        site_source: impl Into<PathBuf>,
        page_path: impl Into<String>,
        options: Options,
    ) -> Self {
        Self::with_cache(site_source, page_path, options, &PATH_CACHE)
    }
}

impl<'c> LastModified<'c> {
    /// Lookup backed by a caller-owned cache.
    pub fn with_cache(
        site_source: impl Into<PathBuf>,
        page_path: impl Into<String>,
        options: Options,
        cache: &'c LastModifiedCache,
    ) -> Self {
        Self {
            site_source: site_source.into(),
            page_path: page_path.into(),
            options,
            cache,
            absolute_path: OnceCell::new(),
            repo: OnceCell::new(),
            relative_path: OnceCell::new(),
            to_s: OnceCell::new(),
            to_liquid: OnceCell::new(),
        }
    }

    pub fn site_source(&self) -> &Path {
        &self.site_source
    }

    pub fn page_path(&self) -> &str {
        &self.page_path
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    // ------------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------------

    /// Formatted last-modified date, served from the cache when present.
    ///
    /// On a miss the date is resolved, formatted with [`Self::format`] and
    /// stored under the page path.
    pub fn formatted_last_modified_date(&self) -> Result<String, ResolveError> {
        if let Some(hit) = self.cache.get(&self.page_path) {
            debug!("cache"; "{} -> {hit}", self.page_path);
            return Ok(hit);
        }

        let instant = self.last_modified_at_time()?;
        let formatted = format_instant(instant, self.format(), self.options.timezone)?;
        debug!("lastmod"; "formatted {}: {formatted}", self.page_path);

        Ok(self.cache.insert(&self.page_path, formatted))
    }

    /// Last-modified instant at whole-second precision.
    pub fn last_modified_at_time(&self) -> Result<DateTime<Utc>, ResolveError> {
        let path = self.absolute_path();
        if !path.exists() {
            return Err(ResolveError::NotFound(path.to_path_buf()));
        }

        let secs = self.last_modified_at_unix()?;
        let instant = DateTime::from_timestamp(secs, 0).ok_or(ResolveError::Timestamp(secs))?;
        debug!("lastmod"; "{} modified at {instant}", self.page_path);
        Ok(instant)
    }

    /// Last-modified time as epoch seconds.
    ///
    /// The newest commit touching the page when there is one, the file's
    /// mtime otherwise.
    pub fn last_modified_at_unix(&self) -> Result<i64, ResolveError> {
        let path = self.absolute_path();

        match self.relative_path_from_git_dir() {
            Some(relative) => {
                if let Some(stamp) = git::last_commit_unix(&self.options.git, self.repo(), relative)
                {
                    return Ok(stamp);
                }
                debug!("lastmod"; "no commit touches {}, using mtime", relative.display());
            }
            None => {
                debug!("lastmod"; "{} is outside git history, using mtime", path.display());
            }
        }

        mtime(path)
    }

    /// Active strftime pattern.
    pub fn format(&self) -> &str {
        self.options.format()
    }

    /// Replace the pattern.
    ///
    /// Has no visible effect once this page has a cached date.
    pub fn set_format(&mut self, format: impl Into<String>) {
        self.options.format = Some(format.into());
    }

    /// Memoized [`Self::formatted_last_modified_date`].
    pub fn to_s(&self) -> Result<&str, ResolveError> {
        if let Some(s) = self.to_s.get() {
            return Ok(s.as_str());
        }
        let s = self.formatted_last_modified_date()?;
        Ok(self.to_s.get_or_init(|| s).as_str())
    }

    /// Memoized [`Self::last_modified_at_time`], for template engines.
    pub fn to_liquid(&self) -> Result<DateTime<Utc>, ResolveError> {
        if let Some(t) = self.to_liquid.get() {
            return Ok(*t);
        }
        let t = self.last_modified_at_time()?;
        Ok(*self.to_liquid.get_or_init(|| t))
    }

    // ------------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------------

    fn absolute_path(&self) -> &Path {
        self.absolute_path.get_or_init(|| {
            let path = sanitized_path(&self.site_source, Path::new(&self.page_path));
            debug!("lastmod"; "absolute path: {}", path.display());
            path
        })
    }

    fn repo(&self) -> &RepoProbe {
        self.repo
            .get_or_init(|| git::probe(&self.options.git, &self.site_source))
    }

    fn relative_path_from_git_dir(&self) -> Option<&Path> {
        self.relative_path
            .get_or_init(|| {
                let repo = self.repo();
                if !repo.is_repository() {
                    debug!("lastmod"; "{} is not in a git work tree", self.site_source.display());
                    return None;
                }
                repo.relative_path(self.absolute_path())
            })
            .as_deref()
    }
}

/// Filesystem modification time in epoch seconds.
fn mtime(path: &Path) -> Result<i64, ResolveError> {
    let modified = path
        .metadata()
        .and_then(|m| m.modified())
        .map_err(|e| ResolveError::Io(path.to_path_buf(), e))?;

    let secs = DateTime::<Utc>::from(modified).timestamp();
    debug!("lastmod"; "mtime of {}: {secs}", path.display());
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::git::testing::{commit, git_available, init};
    use filetime::{FileTime, set_file_mtime};
    use std::fs;
    use tempfile::TempDir;

    /// Options that can never reach a repository.
    fn no_git() -> Options {
        Options::default().with_git("definitely-not-git-xyz")
    }

    fn write_page(root: &Path, rel: &str, mtime: i64) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel).unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
        path
    }

    /// Repo at `dir` with `site/posts/a.md` committed at 1_700_000_000.
    fn repo_with_post(dir: &Path) -> PathBuf {
        init(dir);
        write_page(dir, "site/posts/a.md", 1_690_000_000);
        commit(dir, "site/posts/a.md", 1_700_000_000);
        dir.join("site")
    }

    #[test]
    fn test_mtime_outside_repository() {
        let dir = TempDir::new().unwrap();
        write_page(dir.path(), "posts/b.md", 1_690_000_000);
        let cache = LastModifiedCache::new();

        let lookup = LastModified::with_cache(dir.path(), "posts/b.md", no_git(), &cache);
        assert_eq!(lookup.last_modified_at_unix().unwrap(), 1_690_000_000);
        assert_eq!(lookup.formatted_last_modified_date().unwrap(), "22-Jul-23");
    }

    #[test]
    fn test_mtime_in_plain_directory_with_git() {
        let dir = TempDir::new().unwrap();
        // A tempdir is not inside a repository unless TMPDIR itself is
        if !git_available() || git::probe("git", dir.path()).is_repository() {
            return;
        }
        write_page(dir.path(), "posts/b.md", 1_690_000_000);
        let cache = LastModifiedCache::new();

        let lookup = LastModified::with_cache(dir.path(), "posts/b.md", Options::default(), &cache);
        assert_eq!(lookup.last_modified_at_unix().unwrap(), 1_690_000_000);
        assert_eq!(lookup.formatted_last_modified_date().unwrap(), "22-Jul-23");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_page_uses_its_own_history() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init(dir.path());
        write_page(dir.path(), "a.md", 1_590_000_000);
        commit(dir.path(), "a.md", 1_600_000_000);
        std::os::unix::fs::symlink("a.md", dir.path().join("link.md")).unwrap();
        commit(dir.path(), "link.md", 1_700_000_000);
        let cache = LastModifiedCache::new();

        let link = LastModified::with_cache(dir.path(), "link.md", Options::default(), &cache);
        assert_eq!(link.last_modified_at_unix().unwrap(), 1_700_000_000);

        let target = LastModified::with_cache(dir.path(), "a.md", Options::default(), &cache);
        assert_eq!(target.last_modified_at_unix().unwrap(), 1_600_000_000);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let cache = LastModifiedCache::new();

        let lookup = LastModified::with_cache(dir.path(), "posts/missing.md", no_git(), &cache);
        let err = lookup.formatted_last_modified_date().unwrap_err();
        assert!(err.is_not_found());
        assert!(lookup.to_liquid().unwrap_err().is_not_found());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_hit_skips_lookup() {
        let dir = TempDir::new().unwrap();
        let path = write_page(dir.path(), "posts/b.md", 1_690_000_000);
        let cache = LastModifiedCache::new();

        let first = LastModified::with_cache(dir.path(), "posts/b.md", no_git(), &cache);
        assert_eq!(first.formatted_last_modified_date().unwrap(), "22-Jul-23");

        // Neither a new mtime, a new pattern nor a deleted file changes the answer
        set_file_mtime(&path, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();
        let mut second = LastModified::with_cache(dir.path(), "posts/b.md", no_git(), &cache);
        second.set_format("%Y-%m-%d");
        assert_eq!(second.formatted_last_modified_date().unwrap(), "22-Jul-23");

        fs::remove_file(&path).unwrap();
        let third = LastModified::with_cache(dir.path(), "posts/b.md", no_git(), &cache);
        assert_eq!(third.formatted_last_modified_date().unwrap(), "22-Jul-23");
    }

    #[test]
    fn test_format_before_first_lookup() {
        let dir = TempDir::new().unwrap();
        write_page(dir.path(), "posts/b.md", 1_690_000_000);
        let cache = LastModifiedCache::new();

        let mut lookup = LastModified::with_cache(dir.path(), "posts/b.md", no_git(), &cache);
        assert_eq!(lookup.format(), DEFAULT_FORMAT);
        lookup.set_format("%Y-%m-%d");
        assert_eq!(lookup.format(), "%Y-%m-%d");
        assert_eq!(lookup.formatted_last_modified_date().unwrap(), "2023-07-22");
    }

    #[test]
    fn test_invalid_format_is_not_cached() {
        let dir = TempDir::new().unwrap();
        write_page(dir.path(), "a.md", 1_690_000_000);
        let cache = LastModifiedCache::new();

        let lookup = LastModified::with_cache(dir.path(), "a.md", no_git().with_format("%Q"), &cache);
        assert!(matches!(
            lookup.formatted_last_modified_date(),
            Err(ResolveError::InvalidFormat(_))
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_to_s_and_to_liquid_are_memoized() {
        let dir = TempDir::new().unwrap();
        let path = write_page(dir.path(), "a.md", 1_690_000_000);
        let cache = LastModifiedCache::new();

        let lookup = LastModified::with_cache(dir.path(), "a.md", no_git(), &cache);
        assert_eq!(lookup.to_s().unwrap(), "22-Jul-23");
        assert_eq!(lookup.to_liquid().unwrap().timestamp(), 1_690_000_000);

        fs::remove_file(&path).unwrap();
        cache.clear();
        assert_eq!(lookup.to_s().unwrap(), "22-Jul-23");
        assert_eq!(lookup.to_liquid().unwrap().timestamp(), 1_690_000_000);
    }

    #[test]
    fn test_traversal_stays_in_site_source() {
        let dir = TempDir::new().unwrap();
        write_page(dir.path(), "etc/passwd", 1_690_000_000);
        let cache = LastModifiedCache::new();

        let lookup = LastModified::with_cache(dir.path(), "../../etc/passwd", no_git(), &cache);
        assert_eq!(lookup.last_modified_at_unix().unwrap(), 1_690_000_000);
    }

    #[test]
    fn test_commit_time_beats_mtime() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let site = repo_with_post(dir.path());
        let cache = LastModifiedCache::new();

        let lookup = LastModified::with_cache(&site, "posts/a.md", Options::default(), &cache);
        assert_eq!(lookup.last_modified_at_unix().unwrap(), 1_700_000_000);
        assert_eq!(lookup.to_liquid().unwrap().timestamp(), 1_700_000_000);
        assert_eq!(lookup.formatted_last_modified_date().unwrap(), "14-Nov-23");
    }

    #[test]
    fn test_format_change_after_lookup_is_ignored() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let site = repo_with_post(dir.path());

        let fresh = LastModifiedCache::new();
        let iso = Options::default().with_format("%Y-%m-%d");
        let lookup = LastModified::with_cache(&site, "posts/a.md", iso, &fresh);
        assert_eq!(lookup.formatted_last_modified_date().unwrap(), "2023-11-14");

        let cache = LastModifiedCache::new();
        let mut lookup = LastModified::with_cache(&site, "posts/a.md", Options::default(), &cache);
        assert_eq!(lookup.formatted_last_modified_date().unwrap(), "14-Nov-23");
        lookup.set_format("%Y-%m-%d");
        assert_eq!(lookup.formatted_last_modified_date().unwrap(), "14-Nov-23");
    }

    #[test]
    fn test_uncommitted_file_in_repository_uses_mtime() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let site = repo_with_post(dir.path());
        write_page(&site, "posts/draft.md", 1_690_000_000);
        let cache = LastModifiedCache::new();

        let lookup = LastModified::with_cache(&site, "posts/draft.md", Options::default(), &cache);
        assert_eq!(lookup.last_modified_at_unix().unwrap(), 1_690_000_000);
    }

    #[test]
    fn test_process_wide_cache() {
        let dir = TempDir::new().unwrap();
        write_page(dir.path(), "process-wide-cache-test.md", 1_690_000_000);

        let page = "process-wide-cache-test.md";
        let lookup = LastModified::new(dir.path(), page, no_git());
        assert_eq!(lookup.formatted_last_modified_date().unwrap(), "22-Jul-23");
        assert_eq!(PATH_CACHE.get(page).as_deref(), Some("22-Jul-23"));
    }
}
