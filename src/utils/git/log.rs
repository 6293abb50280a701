//! Commit timestamp lookup.

use super::RepoProbe;
use crate::{debug, exec};
use regex::Regex;
use std::{path::Path, sync::OnceLock};

/// Epoch seconds of the newest commit touching `relative`.
///
/// Runs `git --git-dir <control_dir> log -1 --format=%ct -- <relative>` from
/// the working tree root. An empty `relative` (the root itself) is queried
/// as `.`. `None` when the probe found no repository, the
/// path has no history (untracked or not yet committed), or git fails.
pub fn last_commit_unix(git: &str, repo: &RepoProbe, relative: &Path) -> Option<i64> {
    let RepoProbe::Repository {
        top_level,
        control_dir,
    } = repo
    else {
        return None;
    };

    // Cmd drops empty arguments, which would leave no pathspec at all
    let pathspec = if relative.as_os_str().is_empty() {
        Path::new(".")
    } else {
        relative
    };

    let output = exec!(
        top_level; git;
        "--git-dir", control_dir, "log", "-1", "--format=%ct", "--", pathspec
    );

    match output {
        Ok(out) => {
            let stamp = first_number(&out);
            debug!("git"; "last commit for {}: {stamp:?}", relative.display());
            stamp
        }
        Err(e) => {
            debug!("git"; "log failed for {}: {e:#}", relative.display());
            None
        }
    }
}

/// First run of ASCII digits in `text`, as an integer.
pub fn first_number(text: &str) -> Option<i64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[0-9]+").expect("valid digit pattern"));
    re.find(text)?.as_str().parse().ok()
}
