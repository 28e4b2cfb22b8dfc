//! Branch queries for git repositories
//!
//! Every query here is read-only and infallible from the caller's point of
//! view: an error while asking git is logged and answered negatively
//! ("not merged", "not stale", "no worktree", "no branches").

use std::process::Command;

use git2::{BranchType, ErrorCode, Oid};

use super::repo::GitRepo;
use crate::{Error, Result};

/// Read-only branch questions about one repository
pub trait BranchInspector {
    /// Short names of all local branches
    fn list_branches(&self) -> Vec<String>;

    /// Checked-out branch, or a 7-character commit prefix when detached
    fn current_branch(&self) -> String;

    /// Whether `branch` is a (non-strict) ancestor of any of `targets`
    fn is_merged(&self, branch: &str, targets: &[String]) -> bool;

    /// Whether `branch` tracks an upstream that no longer exists
    fn is_stale(&self, branch: &str) -> bool;

    /// Whether any worktree has `branch` checked out
    fn has_worktree(&self, branch: &str) -> bool;
}

/// How a branch deletion treats unmerged work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// `git branch -d`: git refuses branches it considers unmerged
    #[default]
    Safe,
    /// `git branch -D`
    Force,
}

/// The one write operation: deleting a local branch
pub trait BranchRemover {
    /// Delete a local branch
    fn delete_branch(&self, branch: &str, mode: DeleteMode) -> Result<()>;
}

/// Display snapshot of every flag that holds for one branch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchStatus {
    pub name: String,
    pub current: bool,
    pub global_pin: bool,
    pub repo_pin: bool,
    pub worktree: bool,
    pub stale: bool,
    pub merged: bool,
}

impl GitRepo {
    /// List all local branches
    pub fn list_local_branches(&self) -> Result<Vec<String>> {
        let mut branches = Vec::new();

        for branch in self.inner().branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name().ok().flatten() {
                branches.push(name.to_string());
            }
        }

        Ok(branches)
    }

    /// Get the current branch name
    ///
    /// A detached HEAD yields the first 7 hex digits of the commit. An unborn
    /// branch (no commits yet) yields the branch HEAD points at.
    pub fn head_name(&self) -> Result<String> {
        let head = match self.inner().head() {
            Ok(h) => h,
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head_ref = self.inner().find_reference("HEAD")?;
                let target = head_ref.symbolic_target().unwrap_or_default();
                return Ok(target.strip_prefix("refs/heads/").unwrap_or(target).to_string());
            }
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            return Ok(head.shorthand().unwrap_or_default().to_string());
        }

        let oid = head
            .target()
            .ok_or_else(|| Error::Other("HEAD has no target".to_string()))?;
        Ok(short_hash(oid))
    }

    fn resolve_commit(&self, name: &str) -> Result<Oid> {
        let local = format!("refs/heads/{}", name);
        let object = match self.inner().revparse_single(&local) {
            Ok(obj) => obj,
            Err(_) => self.inner().revparse_single(name)?,
        };
        Ok(object.peel_to_commit()?.id())
    }

    /// Whether `branch` is merged into `target`
    pub fn is_merged_into(&self, branch: &str, target: &str) -> Result<bool> {
        let branch_tip = self.resolve_commit(branch)?;
        let target_tip = self.resolve_commit(target)?;

        if branch_tip == target_tip {
            return Ok(true);
        }

        Ok(self.inner().graph_descendant_of(target_tip, branch_tip)?)
    }

    /// Whether `branch` has an upstream configured whose ref is gone
    pub fn upstream_gone(&self, branch: &str) -> Result<bool> {
        let local = format!("refs/heads/{}", branch);

        let upstream = match self.inner().branch_upstream_name(&local) {
            Ok(name) => name,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let upstream = upstream
            .as_str()
            .ok_or_else(|| Error::Other("Upstream name is not valid UTF-8".to_string()))?;

        match self.inner().find_reference(upstream) {
            Ok(_) => Ok(false),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}

fn short_hash(oid: Oid) -> String {
    let mut hex = oid.to_string();
    hex.truncate(7);
    hex
}

impl BranchInspector for GitRepo {
    fn list_branches(&self) -> Vec<String> {
        self.list_local_branches().unwrap_or_else(|e| {
            tracing::debug!(repo = %self.root().display(), error = %e, "failed to list branches");
            Vec::new()
        })
    }

    fn current_branch(&self) -> String {
        self.head_name().unwrap_or_else(|e| {
            tracing::warn!(repo = %self.root().display(), error = %e, "failed to read current branch");
            String::new()
        })
    }

    fn is_merged(&self, branch: &str, targets: &[String]) -> bool {
        targets.iter().any(|target| {
            self.is_merged_into(branch, target).unwrap_or_else(|e| {
                tracing::debug!(branch, target = %target, error = %e, "merge check failed");
                false
            })
        })
    }

    fn is_stale(&self, branch: &str) -> bool {
        self.upstream_gone(branch).unwrap_or_else(|e| {
            tracing::debug!(branch, error = %e, "upstream check failed");
            false
        })
    }

    fn has_worktree(&self, branch: &str) -> bool {
        self.worktree_branches().iter().any(|b| b == branch)
    }
}

impl BranchRemover for GitRepo {
    fn delete_branch(&self, branch: &str, mode: DeleteMode) -> Result<()> {
        let flag = match mode {
            DeleteMode::Safe => "-d",
            DeleteMode::Force => "-D",
        };

        let output = Command::new("git")
            .arg("branch")
            .arg(flag)
            .arg(branch)
            .current_dir(self.root())
            .output()
            .map_err(|e| Error::Command(format!("Failed to run git branch: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Command(stderr.trim().to_string()));
        }

        Ok(())
    }
}
