//! Worktree listing

use std::path::PathBuf;
use std::process::Command;

use super::repo::GitRepo;
use crate::{Error, Result};

/// One entry of `git worktree list --porcelain`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeEntry {
    /// Path to the worktree directory
    pub path: PathBuf,
    /// Checked-out commit, absent for a bare entry
    pub head: Option<String>,
    /// Short name of the checked-out branch, absent when detached
    pub branch: Option<String>,
}

/// Parse porcelain worktree output
///
/// Each worktree is a block of lines separated by a blank line:
/// `worktree <path>`, `HEAD <sha>`, then `branch refs/heads/<name>` or
/// `detached`.
pub fn parse_worktree_list(output: &str) -> Vec<WorktreeEntry> {
    let mut entries = Vec::new();
    let mut current: Option<WorktreeEntry> = None;

    for line in output.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            current = Some(WorktreeEntry {
                path: PathBuf::from(path),
                ..Default::default()
            });
        } else if let Some(entry) = current.as_mut() {
            if let Some(head) = line.strip_prefix("HEAD ") {
                entry.head = Some(head.to_string());
            } else if let Some(branch) = line.strip_prefix("branch ") {
                let short = branch.strip_prefix("refs/heads/").unwrap_or(branch);
                entry.branch = Some(short.to_string());
            }
        }
    }

    if let Some(entry) = current {
        entries.push(entry);
    }

    entries
}

impl GitRepo {
    /// List all worktrees for this repository, the main checkout included
    pub fn list_worktrees(&self) -> Result<Vec<WorktreeEntry>> {
        let output = Command::new("git")
            .arg("worktree")
            .arg("list")
            .arg("--porcelain")
            .current_dir(self.root())
            .output()
            .map_err(|e| Error::Command(format!("Failed to run git worktree list: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Command(format!("git worktree list failed: {}", stderr.trim())));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_worktree_list(&stdout))
    }

    /// Branches checked out in any worktree
    ///
    /// Listed once per `GitRepo` and reused by later queries. A failed
    /// listing is logged and treated as no worktrees.
    pub fn worktree_branches(&self) -> &[String] {
        self.worktree_cache.get_or_init(|| match self.list_worktrees() {
            Ok(worktrees) => worktrees.into_iter().filter_map(|wt| wt.branch).collect(),
            Err(e) => {
                tracing::debug!(repo = %self.root().display(), error = %e, "worktree listing failed");
                Vec::new()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_worktree_list() {
        let output = "\
worktree /home/dev/project
HEAD 1111111111111111111111111111111111111111
branch refs/heads/main

worktree /home/dev/project-feature
HEAD 2222222222222222222222222222222222222222
branch refs/heads/feature/login

worktree /home/dev/project-detached
HEAD 3333333333333333333333333333333333333333
detached
";
        let entries = parse_worktree_list(output);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].path, PathBuf::from("/home/dev/project"));
        assert_eq!(entries[0].branch.as_deref(), Some("main"));
        assert_eq!(entries[1].branch.as_deref(), Some("feature/login"));
        assert_eq!(entries[2].branch, None);
        assert_eq!(
            entries[2].head.as_deref(),
            Some("3333333333333333333333333333333333333333")
        );
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_worktree_list("").is_empty());
    }
}
