//! List command - show repositories, or the branches of the current one

use clap::Args;
use rove_core::{
    describe_branches, discover, find_repo_for_path, sort_alphabetical, BranchInspector,
    BranchPins, BranchStatus, ConfigStore,
};

/// List this workstation's repositories, or the current repository's branches
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show repositories whose name contains this text
    pub query: Option<String>,

    /// List branches of the current repository instead
    #[arg(short, long)]
    pub branch: bool,

    /// With --branch: only branches merged into a globally pinned branch
    #[arg(long, requires = "branch", conflicts_with = "no_merged")]
    pub merged: bool,

    /// With --branch: only branches not merged into a globally pinned branch
    #[arg(long, requires = "branch")]
    pub no_merged: bool,
}

impl ListArgs {
    /// Execute the list command
    pub fn execute(&self, store: &ConfigStore, verbose: bool) -> anyhow::Result<()> {
        if self.branch {
            self.list_branches(store, verbose)
        } else {
            self.list_repos(store)
        }
    }

    fn list_repos(&self, store: &ConfigStore) -> anyhow::Result<()> {
        let query = self.query.as_deref().unwrap_or("");
        let pins = store.pinned_repo_paths();
        let folders = store.search_folders();

        if folders.is_empty() {
            println!("No search folders configured. Add one with 'rove config add group <path>'.");
            return Ok(());
        }

        for folder in folders {
            println!("{}", folder.display());
            let mut repos = discover(std::slice::from_ref(&folder), query, &pins);
            sort_alphabetical(&mut repos);

            for repo in repos {
                let branch = repo
                    .open()
                    .map(|r| r.current_branch())
                    .unwrap_or_else(|_| "?".to_string());
                let marker = if repo.pinned() { " [pinned]" } else { "" };
                println!("- {} ({}){}", repo.name, branch, marker);
            }
        }

        Ok(())
    }

    fn list_branches(&self, store: &ConfigStore, verbose: bool) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        let Some(handle) = find_repo_for_path(&cwd, &store.pinned_repo_paths()) else {
            println!("Not in a git repository.");
            return Ok(());
        };

        let repo = handle.open()?;
        let pins = BranchPins::from_store(store);

        if verbose {
            tracing::info!(repo = %handle.name, identifier = %handle.identifier, "listing branches");
        }

        let statuses = describe_branches(&repo, &handle.identifier, &pins);
        let shown: Vec<&BranchStatus> = statuses
            .iter()
            .filter(|s| !self.merged || s.merged)
            .filter(|s| !self.no_merged || !s.merged)
            .collect();

        if shown.is_empty() {
            println!("No branches.");
            return Ok(());
        }

        for status in shown {
            println!("{}", format_status(status));
        }

        Ok(())
    }
}

/// One branch line: current marker, name, and bracketed flags
pub fn format_status(status: &BranchStatus) -> String {
    let mut flags = Vec::new();
    if status.global_pin {
        flags.push("protected");
    }
    if status.repo_pin {
        flags.push("pinned");
    }
    if status.worktree {
        flags.push("worktree");
    }
    if status.stale {
        flags.push("gone");
    }
    if status.merged {
        flags.push("merged");
    }

    let marker = if status.current { "*" } else { " " };
    if flags.is_empty() {
        format!("{} {}", marker, status.name)
    } else {
        format!("{} {} [{}]", marker, status.name, flags.join(", "))
    }
}
