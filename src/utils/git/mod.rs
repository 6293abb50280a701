//! Git queries for last-modified resolution.
//!
//! Every git command runs with an explicit working directory. Failures never
//! escape this module: a broken probe is just [`RepoProbe::NotARepository`],
//! and a history query that fails yields `None`.

mod log;

pub use log::{first_number, last_commit_unix};

use crate::{debug, exec};
use std::path::{Path, PathBuf};

/// Name of the control directory at the top of a working tree.
pub const CONTROL_DIR: &str = ".git";

/// Outcome of probing a directory for an enclosing git working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoProbe {
    Repository {
        /// Root of the working tree (`git rev-parse --show-toplevel`)
        top_level: PathBuf,
        /// `<top_level>/.git`
        control_dir: PathBuf,
    },
    NotARepository,
}

impl RepoProbe {
    pub const fn is_repository(&self) -> bool {
        matches!(self, Self::Repository { .. })
    }

    /// Path of `file` relative to the working tree root.
    ///
    /// The top level and the directory holding `file` are canonicalized so a
    /// site source reached through a symlink still lines up with what git
    /// reports. The file name itself is kept, so a symlinked page keeps its
    /// own history. `None` when this is not a repository or `file` lies
    /// outside it.
    pub fn relative_path(&self, file: &Path) -> Option<PathBuf> {
        let Self::Repository { top_level, .. } = self else {
            return None;
        };

        let top_level = top_level.canonicalize().unwrap_or_else(|_| top_level.clone());
        let file = canonical_parent(file);

        let relative = file.strip_prefix(&top_level).ok()?.to_path_buf();
        debug!("git"; "relative path from {}: {}", top_level.display(), relative.display());
        Some(relative)
    }
}

/// Canonicalize the parent of `path` and re-attach its final component.
fn canonical_parent(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => parent
            .canonicalize()
            .map(|parent| parent.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.canonicalize().unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// Probe `dir` for an enclosing git working tree.
///
/// `git` is the program to run. Anything short of an exact `true` from
/// `rev-parse --is-inside-work-tree` followed by a usable
/// `rev-parse --show-toplevel` is [`RepoProbe::NotARepository`].
pub fn probe(git: &str, dir: &Path) -> RepoProbe {
    if let Err(e) = which::which(git) {
        debug!("git"; "`{git}` unavailable: {e}");
        return RepoProbe::NotARepository;
    }

    match exec!(dir; git; "rev-parse", "--is-inside-work-tree") {
        Ok(answer) if answer == "true" => {}
        Ok(answer) => {
            debug!("git"; "{} is not a work tree ({answer:?})", dir.display());
            return RepoProbe::NotARepository;
        }
        Err(e) => {
            debug!("git"; "{} is not a work tree: {e:#}", dir.display());
            return RepoProbe::NotARepository;
        }
    }

    match exec!(dir; git; "rev-parse", "--show-toplevel") {
        Ok(top) if !top.is_empty() => {
            let top_level = PathBuf::from(top);
            let control_dir = top_level.join(CONTROL_DIR);
            debug!("git"; "top level git directory: {}", control_dir.display());
            RepoProbe::Repository {
                top_level,
                control_dir,
            }
        }
        Ok(_) => {
            debug!("git"; "empty top level for {}", dir.display());
            RepoProbe::NotARepository
        }
        Err(e) => {
            debug!("git"; "no top level for {}: {e:#}", dir.display());
            RepoProbe::NotARepository
        }
    }
}
