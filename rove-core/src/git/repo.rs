//! Git repository detection and identity

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository};

use super::remote::normalize_remote_url;
use crate::paths;
use crate::{Error, Result};

/// A git working copy wrapper providing rove-specific queries
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the working copy root
    root: PathBuf,
    /// Branches checked out in worktrees, listed on first use
    pub(super) worktree_cache: OnceCell<Vec<String>>,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the repository containing the given path
    ///
    /// This will search upward from the given path to find the repository root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::discover(path).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                Error::NotARepository(path.to_path_buf())
            } else {
                Error::Git(e)
            }
        })?;

        Self::from_repository(repo)
    }

    /// Open a repository rooted exactly at the given path, without searching upward
    pub fn open_exact(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::open(path).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                Error::NotARepository(path.to_path_buf())
            } else {
                Error::Git(e)
            }
        })?;

        Self::from_repository(repo)
    }

    fn from_repository(repo: Repository) -> Result<Self> {
        let root = repo
            .workdir()
            .map(paths::clean)
            .ok_or_else(|| Error::Config("Bare repositories are not supported".to_string()))?;

        Ok(Self {
            repo,
            root,
            worktree_cache: OnceCell::new(),
        })
    }

    /// Get the working copy root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check whether a directory is itself a repository root
    ///
    /// A working copy root carries a `.git` entry (directory for a primary
    /// checkout, file for a linked worktree). A bare repository has `HEAD`
    /// and `objects` at its top level. The cheap marker check runs first so
    /// that ordinary directories never reach libgit2.
    pub fn is_repository_root(path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let has_marker = path.join(".git").exists()
            || (path.join("HEAD").is_file() && path.join("objects").is_dir());

        has_marker && Repository::open(path).is_ok()
    }

    /// URL of the `origin` remote, if configured
    pub fn origin_url(&self) -> Option<String> {
        let remote = self.repo.find_remote("origin").ok()?;
        remote.url().map(|url| url.to_string())
    }

    /// Stable identifier: normalized origin URL, or the root path as fallback
    pub fn identifier(&self) -> String {
        self.origin_url()
            .map(|url| normalize_remote_url(&url))
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Get access to the underlying git2 repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }
}

/// Identifier for the repository rooted at `root`
///
/// Never fails: an unopenable repository or one without a usable `origin`
/// yields the path itself.
pub fn identifier_for(root: &Path) -> String {
    match GitRepo::open_exact(root) {
        Ok(repo) => repo.identifier(),
        Err(e) => {
            tracing::debug!(path = %root.display(), error = %e, "falling back to path identifier");
            root.display().to_string()
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use git2::{Repository, Signature};

    /// Initialize a repository with one commit on `main`
    pub fn init_repo(path: &Path) -> Repository {
        let repo = Repository::init(path).unwrap();
        repo.set_head("refs/heads/main").unwrap();
        commit_file(&repo, "README.md", "initial", "initial commit");
        repo
    }

    /// Write a file and commit it on the current HEAD
    pub fn commit_file(repo: &Repository, name: &str, contents: &str, message: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(name), contents).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let sig = Signature::now("test", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Create a branch at the current HEAD commit
    pub fn branch_here(repo: &Repository, name: &str) {
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.branch(name, &head, false).unwrap();
    }

    /// Point HEAD at a branch and update the working tree
    pub fn checkout(repo: &Repository, name: &str) {
        let refname = format!("refs/heads/{}", name);
        let obj = repo.revparse_single(&refname).unwrap();
        repo.checkout_tree(&obj, Some(git2::build::CheckoutBuilder::new().force()))
            .unwrap();
        repo.set_head(&refname).unwrap();
    }

    /// Whether the `git` binary can be run
    pub fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}
