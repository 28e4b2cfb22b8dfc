//! Branch protection resolution
//!
//! Tiers are checked in a fixed order and the first match wins:
//!
//! 1. the checked-out branch
//! 2. globally pinned branch names (never removable, not even with force)
//! 3. branches pinned for one repository, keyed by its identifier
//! 4. branches with a worktree (skipped rather than protected)
//!
//! Everything else is unprotected.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::ConfigStore;

/// Protection tier of a branch, highest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtectionTier {
    /// The repository's checked-out branch
    CurrentBranch,
    /// Named in the global pinned-branches list
    GlobalPin,
    /// Named in this repository's pinned-branches list; force overrides it
    RepoPin,
    /// Checked out in a worktree
    Worktree,
    /// None of the above
    Unprotected,
}

impl ProtectionTier {
    /// Whether `clean --force` still keeps the branch
    pub fn survives_force(self) -> bool {
        matches!(self, Self::CurrentBranch | Self::GlobalPin | Self::Worktree)
    }
}

impl fmt::Display for ProtectionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CurrentBranch => "current branch",
            Self::GlobalPin => "globally pinned",
            Self::RepoPin => "pinned",
            Self::Worktree => "worktree",
            Self::Unprotected => "unprotected",
        };
        f.write_str(label)
    }
}

/// Global and per-repository branch pins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchPins {
    /// Branch names protected in every repository
    pub global: Vec<String>,
    /// Branch names protected per repository identifier
    pub by_repo: BTreeMap<String, Vec<String>>,
}

impl BranchPins {
    pub fn new(global: Vec<String>, by_repo: BTreeMap<String, Vec<String>>) -> Self {
        Self { global, by_repo }
    }

    /// Snapshot the pins held by a config store
    pub fn from_store(store: &ConfigStore) -> Self {
        Self::new(
            store.global_pinned_branches().to_vec(),
            store.repo_pinned_branches().clone(),
        )
    }

    pub fn is_globally_pinned(&self, branch: &str) -> bool {
        self.global.iter().any(|b| b == branch)
    }

    /// Membership in the repository's list; an unknown identifier has no pins
    pub fn is_pinned_for_repo(&self, identifier: &str, branch: &str) -> bool {
        self.for_repo(identifier).iter().any(|b| b == branch)
    }

    pub fn for_repo(&self, identifier: &str) -> &[String] {
        self.by_repo
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolve the pin-derived tier of a branch
    ///
    /// Pure: never reports [`ProtectionTier::Worktree`], which needs a git
    /// query. Use [`BranchPins::resolve_tier_with`] for the full ladder.
    pub fn resolve_tier(&self, identifier: &str, branch: &str, current_branch: &str) -> ProtectionTier {
        if branch == current_branch {
            ProtectionTier::CurrentBranch
        } else if self.is_globally_pinned(branch) {
            ProtectionTier::GlobalPin
        } else if self.is_pinned_for_repo(identifier, branch) {
            ProtectionTier::RepoPin
        } else {
            ProtectionTier::Unprotected
        }
    }

    /// Resolve the effective tier, probing for a worktree only when no pin holds
    ///
    /// With `force`, tiers that do not [survive force](ProtectionTier::survives_force)
    /// are dropped before the worktree probe, so a force-overridden repository
    /// pin can still come out as [`ProtectionTier::Worktree`].
    pub fn resolve_tier_with(
        &self,
        identifier: &str,
        branch: &str,
        current_branch: &str,
        force: bool,
        has_worktree: impl FnOnce() -> bool,
    ) -> ProtectionTier {
        let tier = self.resolve_tier(identifier, branch, current_branch);
        let tier = if force && !tier.survives_force() {
            ProtectionTier::Unprotected
        } else {
            tier
        };

        match tier {
            ProtectionTier::Unprotected if has_worktree() => ProtectionTier::Worktree,
            tier => tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pins() -> BranchPins {
        let mut by_repo = BTreeMap::new();
        by_repo.insert(
            "github.com/acme/app".to_string(),
            vec!["hotfix".to_string(), "main".to_string()],
        );
        BranchPins::new(vec!["main".to_string(), "master".to_string()], by_repo)
    }

    #[test]
    fn test_tier_order() {
        assert!(ProtectionTier::CurrentBranch < ProtectionTier::GlobalPin);
        assert!(ProtectionTier::GlobalPin < ProtectionTier::RepoPin);
        assert!(ProtectionTier::RepoPin < ProtectionTier::Worktree);
        assert!(ProtectionTier::Worktree < ProtectionTier::Unprotected);
    }

    #[test]
    fn test_current_beats_global() {
        let tier = pins().resolve_tier("github.com/acme/app", "main", "main");
        assert_eq!(tier, ProtectionTier::CurrentBranch);
    }

    #[test]
    fn test_global_beats_repo_pin() {
        let tier = pins().resolve_tier("github.com/acme/app", "main", "develop");
        assert_eq!(tier, ProtectionTier::GlobalPin);
        assert!(tier.survives_force());
    }

    #[test]
    fn test_repo_pin_only_for_its_repo() {
        let pins = pins();
        assert_eq!(
            pins.resolve_tier("github.com/acme/app", "hotfix", "main"),
            ProtectionTier::RepoPin
        );
        assert_eq!(
            pins.resolve_tier("github.com/acme/other", "hotfix", "main"),
            ProtectionTier::Unprotected
        );
        assert!(!ProtectionTier::RepoPin.survives_force());
    }

    #[test]
    fn test_unknown_identifier_has_no_pins() {
        assert!(pins().for_repo("/home/dev/scratch").is_empty());
    }

    #[test]
    fn test_worktree_probe() {
        let pins = pins();
        assert_eq!(
            pins.resolve_tier_with("github.com/acme/app", "feature", "main", false, || true),
            ProtectionTier::Worktree
        );
        assert_eq!(
            pins.resolve_tier_with("github.com/acme/app", "feature", "main", false, || false),
            ProtectionTier::Unprotected
        );
    }

    #[test]
    fn test_worktree_probe_skipped_for_pinned() {
        let tier = pins().resolve_tier_with("github.com/acme/app", "master", "main", false, || {
            panic!("worktree probe should not run for a pinned branch")
        });
        assert_eq!(tier, ProtectionTier::GlobalPin);
    }

    #[test]
    fn test_force_drops_repo_pin_only() {
        let pins = pins();
        let app = "github.com/acme/app";

        assert_eq!(
            pins.resolve_tier_with(app, "hotfix", "main", false, || false),
            ProtectionTier::RepoPin
        );
        assert_eq!(
            pins.resolve_tier_with(app, "hotfix", "main", true, || false),
            ProtectionTier::Unprotected
        );
        assert_eq!(
            pins.resolve_tier_with(app, "hotfix", "main", true, || true),
            ProtectionTier::Worktree
        );
        assert_eq!(
            pins.resolve_tier_with(app, "master", "main", true, || true),
            ProtectionTier::GlobalPin
        );
        assert_eq!(
            pins.resolve_tier_with(app, "main", "main", true, || true),
            ProtectionTier::CurrentBranch
        );
    }
}
