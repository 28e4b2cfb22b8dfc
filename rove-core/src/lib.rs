//! Rove Core - repository discovery and branch housekeeping
//!
//! This crate finds git working copies under a set of search folders, ranks
//! them with pin awareness, and decides which local branches are safe to
//! remove given global and per-repository branch pins.

pub mod cleanup;
pub mod config;
pub mod discovery;
pub mod error;
pub mod git;
pub mod paths;
pub mod protection;

pub use cleanup::{
    classify, describe_branches, execute_plan, plan_cleanup, CleanupOptions, CleanupPlan,
    DeletionReport,
};
pub use config::{ConfigStore, Settings, CONFIG_ENV_VAR, CONFIG_FILE_NAME};
pub use discovery::{
    discover, find_repo_for_path, sort_alphabetical, sort_by_pins, RepositoryHandle,
};
pub use error::{Error, Result};
pub use git::{
    identifier_for, normalize_remote_url, BranchInspector, BranchRemover, BranchStatus,
    DeleteMode, GitRepo,
};
pub use protection::{BranchPins, ProtectionTier};
