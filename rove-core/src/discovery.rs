//! Repository discovery across search folders
//!
//! Each search folder is walked depth-first. A directory that is a
//! repository root is reported and its subtree is not entered, so nested
//! repositories (submodules, vendored checkouts) are never listed on their
//! own. Unreadable directories are logged and skipped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::git::{identifier_for, GitRepo};
use crate::paths;
use crate::Result;

/// One discovered git working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    /// Normalized path to the repository root
    pub path: PathBuf,
    /// Directory base name
    pub name: String,
    /// Normalized origin URL, or the path when there is none
    pub identifier: String,
    /// Position in the pinned-repository list
    pub pin: Option<usize>,
}

impl RepositoryHandle {
    /// Build a handle for a repository root, resolving its identifier
    ///
    /// The handle keeps the path as given. Pins match it either literally
    /// or by physical location, so a repository pinned through one symlinked
    /// route is still recognized when walked through another.
    pub fn new(path: PathBuf, pins: &[PathBuf]) -> Self {
        let path = paths::clean(&path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let identifier = identifier_for(&path);
        let physical = paths::canonical(&path);
        let pin = pins
            .iter()
            .position(|pinned| pinned == &path || pinned == &physical);

        Self {
            path,
            name,
            identifier,
            pin,
        }
    }

    pub fn pinned(&self) -> bool {
        self.pin.is_some()
    }

    /// Open the working copy for branch queries
    pub fn open(&self) -> Result<GitRepo> {
        GitRepo::open_exact(&self.path)
    }
}

/// Lazily yields repository roots below one folder
///
/// Backed by an explicit-stack walker, so deep trees cost heap rather than
/// call stack. Entries are visited in file-name order.
pub struct RepoWalker {
    inner: walkdir::IntoIter,
}

impl RepoWalker {
    pub fn new(folder: impl AsRef<Path>) -> Self {
        let inner = WalkDir::new(folder)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Self { inner }
    }
}

impl Iterator for RepoWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                    tracing::warn!(path = %path, error = %e, "error reading directory");
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            // Only reachable when a search folder is itself a repository
            if entry.file_name() == ".git" {
                self.inner.skip_current_dir();
                continue;
            }

            if GitRepo::is_repository_root(entry.path()) {
                self.inner.skip_current_dir();
                return Some(entry.into_path());
            }
        }
    }
}

/// Find repositories whose directory name contains `query`
///
/// Results are in discovery order; use [`sort_alphabetical`] or
/// [`sort_by_pins`] for presentation. A repository reachable from several
/// folders (or through a symlink) is reported once.
pub fn discover(search_folders: &[PathBuf], query: &str, pins: &[PathBuf]) -> Vec<RepositoryHandle> {
    let pins: Vec<PathBuf> = pins.iter().map(|p| paths::canonical(p)).collect();
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for folder in search_folders {
        for candidate in RepoWalker::new(folder) {
            let matches = candidate
                .file_name()
                .is_some_and(|name| name.to_string_lossy().contains(query));
            if !matches {
                continue;
            }

            let handle = RepositoryHandle::new(candidate, &pins);
            if seen.insert(paths::canonical(&handle.path)) {
                found.push(handle);
            }
        }
    }

    tracing::debug!(query, count = found.len(), "discovery finished");
    found
}

/// Order by name, ascending
pub fn sort_alphabetical(repos: &mut [RepositoryHandle]) {
    repos.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Pinned repositories first by pin position, then the rest by name
pub fn sort_by_pins(repos: &mut [RepositoryHandle]) {
    repos.sort_by(|a, b| match (a.pin, b.pin) {
        (Some(a_pin), Some(b_pin)) => a_pin.cmp(&b_pin),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
}

/// Handle for the repository enclosing `path`, if any
pub fn find_repo_for_path(path: &Path, pins: &[PathBuf]) -> Option<RepositoryHandle> {
    let repo = GitRepo::open(path).ok()?;
    let pins: Vec<PathBuf> = pins.iter().map(|p| paths::canonical(p)).collect();
    Some(RepositoryHandle::new(repo.root().to_path_buf(), &pins))
}
