//! Git operations for rove
//!
//! This module provides repository detection, remote identity, and the
//! read-only branch queries the cleanup engine relies on.

mod branch;
mod remote;
mod repo;
mod worktree;

pub use branch::{BranchInspector, BranchRemover, BranchStatus, DeleteMode};
pub use remote::normalize_remote_url;
pub use repo::{identifier_for, GitRepo};
pub use worktree::WorktreeEntry;

#[cfg(test)]
pub(crate) use repo::test_support;
