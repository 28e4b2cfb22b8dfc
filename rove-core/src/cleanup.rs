//! Branch cleanup: classification and deletion
//!
//! Classification walks every local branch through the protection ladder
//! and sorts it into one of four buckets. Deletion then works through the
//! `to_delete` bucket one branch at a time; a failure on one branch does not
//! stop the others.

use crate::git::{BranchInspector, BranchRemover, BranchStatus, DeleteMode};
use crate::protection::{BranchPins, ProtectionTier};
use crate::Error;

/// Options for a cleanup run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Consider unmerged branches too (default: only branches merged into a global pin)
    pub all: bool,
    /// Override per-repository pins
    pub force: bool,
}

impl CleanupOptions {
    /// Deletion flavour matching these options
    ///
    /// Merged-only runs keep git's own safety check; `all` asked for
    /// unmerged branches explicitly, so they are force-deleted.
    pub fn delete_mode(&self) -> DeleteMode {
        if self.all {
            DeleteMode::Force
        } else {
            DeleteMode::Safe
        }
    }
}

/// Outcome of classifying a repository's branches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupPlan {
    /// Branches that will be deleted, in listing order
    pub to_delete: Vec<String>,
    /// Branches left alone because a worktree has them checked out
    pub skipped_worktree: Vec<String>,
    /// Branches kept by a pin or by being current
    pub protected: Vec<(String, ProtectionTier)>,
    /// Branches excluded because they are not merged into any global pin
    pub unmerged: Vec<String>,
}

impl CleanupPlan {
    /// Nothing to delete
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty()
    }
}

/// Classify `branches` for deletion
///
/// Per branch, the first matching rule decides:
/// 1. current branch: protected
/// 2. global pin: protected, even with `force`
/// 3. repository pin: protected unless `force`
/// 4. checked out in a worktree: skipped
/// 5. without `all`, not merged into any global pin: excluded
/// 6. otherwise: deleted
pub fn classify<I: BranchInspector + ?Sized>(
    inspector: &I,
    branches: &[String],
    current_branch: &str,
    identifier: &str,
    pins: &BranchPins,
    options: CleanupOptions,
) -> CleanupPlan {
    let mut plan = CleanupPlan::default();

    for branch in branches {
        let tier = pins.resolve_tier_with(identifier, branch, current_branch, options.force, || {
            inspector.has_worktree(branch)
        });

        match tier {
            ProtectionTier::Unprotected => {}
            ProtectionTier::Worktree => {
                plan.skipped_worktree.push(branch.clone());
                continue;
            }
            protected => {
                plan.protected.push((branch.clone(), protected));
                continue;
            }
        }

        if !options.all && !inspector.is_merged(branch, &pins.global) {
            plan.unmerged.push(branch.clone());
            continue;
        }

        plan.to_delete.push(branch.clone());
    }

    tracing::debug!(
        identifier,
        delete = plan.to_delete.len(),
        skipped = plan.skipped_worktree.len(),
        protected = plan.protected.len(),
        "branches classified"
    );

    plan
}

/// Classify every local branch of a repository
pub fn plan_cleanup<I: BranchInspector + ?Sized>(
    inspector: &I,
    identifier: &str,
    pins: &BranchPins,
    options: CleanupOptions,
) -> CleanupPlan {
    let branches = inspector.list_branches();
    let current = inspector.current_branch();
    classify(inspector, &branches, &current, identifier, pins, options)
}

/// Result of executing a cleanup plan
#[derive(Debug, Default)]
pub struct DeletionReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, Error)>,
}

/// Delete every branch in the plan, continuing past failures
pub fn execute_plan<R: BranchRemover + ?Sized>(
    remover: &R,
    plan: &CleanupPlan,
    mode: DeleteMode,
) -> DeletionReport {
    let mut report = DeletionReport::default();

    for branch in &plan.to_delete {
        match remover.delete_branch(branch, mode) {
            Ok(()) => report.deleted.push(branch.clone()),
            Err(e) => {
                tracing::warn!(branch = %branch, error = %e, "failed to delete branch");
                report.failed.push((branch.clone(), e));
            }
        }
    }

    report
}

/// Status flags of every local branch, for display
///
/// Unlike [`classify`], all flags are evaluated independently, so a pinned
/// branch with a worktree shows both.
pub fn describe_branches<I: BranchInspector + ?Sized>(
    inspector: &I,
    identifier: &str,
    pins: &BranchPins,
) -> Vec<BranchStatus> {
    let current = inspector.current_branch();

    inspector
        .list_branches()
        .into_iter()
        .map(|name| BranchStatus {
            current: name == current,
            global_pin: pins.is_globally_pinned(&name),
            repo_pin: pins.is_pinned_for_repo(identifier, &name),
            worktree: inspector.has_worktree(&name),
            stale: inspector.is_stale(&name),
            merged: inspector.is_merged(&name, &pins.global),
            name,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashSet};

    use super::*;

    const REPO: &str = "github.com/acme/app";

    /// In-memory repository state
    #[derive(Default)]
    struct FakeRepo {
        branches: Vec<String>,
        current: String,
        merged: HashSet<String>,
        stale: HashSet<String>,
        worktrees: HashSet<String>,
        reject_delete: HashSet<String>,
        deleted: RefCell<Vec<(String, DeleteMode)>>,
    }

    impl FakeRepo {
        fn new(branches: &[&str], current: &str) -> Self {
            Self {
                branches: branches.iter().map(|b| b.to_string()).collect(),
                current: current.to_string(),
                ..Default::default()
            }
        }

        fn merged(mut self, names: &[&str]) -> Self {
            self.merged.extend(names.iter().map(|b| b.to_string()));
            self
        }

        fn worktree(mut self, names: &[&str]) -> Self {
            self.worktrees.extend(names.iter().map(|b| b.to_string()));
            self
        }
    }

    impl BranchInspector for FakeRepo {
        fn list_branches(&self) -> Vec<String> {
            self.branches.clone()
        }

        fn current_branch(&self) -> String {
            self.current.clone()
        }

        fn is_merged(&self, branch: &str, targets: &[String]) -> bool {
            !targets.is_empty() && (self.merged.contains(branch) || targets.iter().any(|t| t == branch))
        }

        fn is_stale(&self, branch: &str) -> bool {
            self.stale.contains(branch)
        }

        fn has_worktree(&self, branch: &str) -> bool {
            self.worktrees.contains(branch)
        }
    }

    impl BranchRemover for FakeRepo {
        fn delete_branch(&self, branch: &str, mode: DeleteMode) -> crate::Result<()> {
            if self.reject_delete.contains(branch) {
                return Err(Error::Command(format!("error: the branch '{}' is not fully merged", branch)));
            }
            self.deleted.borrow_mut().push((branch.to_string(), mode));
            Ok(())
        }
    }

    fn pins(global: &[&str], repo: &[&str]) -> BranchPins {
        let mut by_repo = BTreeMap::new();
        by_repo.insert(REPO.to_string(), repo.iter().map(|b| b.to_string()).collect());
        BranchPins::new(global.iter().map(|b| b.to_string()).collect(), by_repo)
    }

    fn scenario() -> FakeRepo {
        FakeRepo::new(&["main", "develop", "feature-x", "hotfix"], "main").merged(&["develop"])
    }

    #[test]
    fn test_merged_only_scenario() {
        let repo = scenario();
        let plan = plan_cleanup(&repo, REPO, &pins(&["main"], &["hotfix"]), CleanupOptions::default());

        assert_eq!(plan.to_delete, vec!["develop"]);
        assert_eq!(
            plan.protected,
            vec![
                ("main".to_string(), ProtectionTier::CurrentBranch),
                ("hotfix".to_string(), ProtectionTier::RepoPin),
            ]
        );
        assert_eq!(plan.unmerged, vec!["feature-x"]);
        assert!(plan.skipped_worktree.is_empty());
    }

    #[test]
    fn test_all_scenario() {
        let repo = scenario();
        let options = CleanupOptions {
            all: true,
            force: false,
        };
        let plan = plan_cleanup(&repo, REPO, &pins(&["main"], &["hotfix"]), options);

        assert_eq!(plan.to_delete, vec!["develop", "feature-x"]);
        assert!(plan.unmerged.is_empty());
    }

    #[test]
    fn test_force_overrides_repo_pin_only() {
        let repo = FakeRepo::new(&["main", "master", "hotfix", "topic"], "topic");
        let options = CleanupOptions {
            all: true,
            force: true,
        };
        let plan = plan_cleanup(&repo, REPO, &pins(&["main", "master"], &["hotfix", "main"]), options);

        assert_eq!(plan.to_delete, vec!["hotfix"]);
        assert_eq!(
            plan.protected,
            vec![
                ("main".to_string(), ProtectionTier::GlobalPin),
                ("master".to_string(), ProtectionTier::GlobalPin),
                ("topic".to_string(), ProtectionTier::CurrentBranch),
            ]
        );
    }

    #[test]
    fn test_worktree_branch_skipped_once() {
        let repo = FakeRepo::new(&["main", "wt-merged", "wt-unmerged", "done"], "main")
            .merged(&["wt-merged", "done"])
            .worktree(&["wt-merged", "wt-unmerged"]);

        for all in [false, true] {
            let options = CleanupOptions { all, force: true };
            let plan = plan_cleanup(&repo, REPO, &pins(&["main"], &[]), options);
            assert_eq!(plan.skipped_worktree, vec!["wt-merged", "wt-unmerged"]);
            assert_eq!(plan.to_delete, vec!["done"]);
        }
    }

    #[test]
    fn test_pinned_worktree_branch_reported_as_protected() {
        let repo = FakeRepo::new(&["main", "release", "hotfix"], "main").worktree(&["release", "hotfix"]);
        let plan = plan_cleanup(&repo, REPO, &pins(&["main", "release"], &["hotfix"]), CleanupOptions::default());

        assert!(plan.skipped_worktree.is_empty());
        assert!(plan.protected.contains(&("release".to_string(), ProtectionTier::GlobalPin)));
        assert!(plan.protected.contains(&("hotfix".to_string(), ProtectionTier::RepoPin)));
    }

    #[test]
    fn test_forced_repo_pin_with_worktree_is_skipped() {
        let repo = FakeRepo::new(&["main", "hotfix"], "main").worktree(&["hotfix"]);
        let options = CleanupOptions { all: true, force: true };
        let plan = plan_cleanup(&repo, REPO, &pins(&["main"], &["hotfix"]), options);

        assert_eq!(plan.skipped_worktree, vec!["hotfix"]);
        assert!(plan.to_delete.is_empty());
        assert_eq!(plan.protected, vec![("main".to_string(), ProtectionTier::CurrentBranch)]);
    }

    #[test]
    fn test_no_global_pins_deletes_nothing_merged_only() {
        let repo = scenario();
        let plan = plan_cleanup(&repo, REPO, &pins(&[], &[]), CleanupOptions::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_unknown_repo_identifier_has_no_repo_pins() {
        let repo = scenario();
        let plan = plan_cleanup(
            &repo,
            "/home/dev/scratch",
            &pins(&["main"], &["hotfix"]),
            CleanupOptions { all: true, force: false },
        );
        assert_eq!(plan.to_delete, vec!["develop", "feature-x", "hotfix"]);
    }

    #[test]
    fn test_execute_continues_after_failure() {
        let mut repo = FakeRepo::new(&["main", "a", "b", "c"], "main");
        repo.reject_delete.insert("b".to_string());
        let plan = CleanupPlan {
            to_delete: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..Default::default()
        };

        let report = execute_plan(&repo, &plan, DeleteMode::Safe);
        assert_eq!(report.deleted, vec!["a", "c"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "b");
        assert_eq!(
            *repo.deleted.borrow(),
            vec![("a".to_string(), DeleteMode::Safe), ("c".to_string(), DeleteMode::Safe)]
        );
    }

    #[test]
    fn test_delete_mode() {
        assert_eq!(CleanupOptions::default().delete_mode(), DeleteMode::Safe);
        assert_eq!(
            CleanupOptions { all: true, force: false }.delete_mode(),
            DeleteMode::Force
        );
    }

    #[test]
    fn test_describe_branches_reports_all_flags() {
        let mut repo = FakeRepo::new(&["main", "release", "old"], "main")
            .merged(&["old"])
            .worktree(&["release"]);
        repo.stale.insert("old".to_string());

        let statuses = describe_branches(&repo, REPO, &pins(&["main", "release"], &["release"]));
        let release = statuses.iter().find(|s| s.name == "release").unwrap();
        assert!(release.global_pin && release.repo_pin && release.worktree);
        assert!(!release.current);

        let old = statuses.iter().find(|s| s.name == "old").unwrap();
        assert!(old.stale && old.merged);

        let main = statuses.iter().find(|s| s.name == "main").unwrap();
        assert!(main.current && main.global_pin && main.merged);
    }
}
