//! Pin and unpin commands - repositories and branches

use std::path::PathBuf;

use clap::Args;
use rove_core::{
    find_repo_for_path, paths, BranchInspector, ConfigStore, GitRepo, RepositoryHandle,
};

/// Pin a repository (floats to the top of results) or a branch (protected from clean)
#[derive(Args, Debug)]
pub struct PinArgs {
    /// Repository path, or branch name with --branch (defaults to the current one)
    pub target: Option<String>,

    /// Pin a branch of the current repository instead of a repository
    #[arg(short, long)]
    pub branch: bool,
}

/// Unpin a repository or a branch
#[derive(Args, Debug)]
pub struct UnpinArgs {
    /// Repository path, or branch name with --branch (defaults to the current one)
    pub target: Option<String>,

    /// Unpin a branch of the current repository instead of a repository
    #[arg(short, long)]
    pub branch: bool,
}

impl PinArgs {
    /// Execute the pin command
    pub fn execute(&self, store: &mut ConfigStore) -> anyhow::Result<()> {
        if self.branch {
            pin_branch(store, self.target.as_deref())
        } else {
            pin_repo(store, self.target.as_deref())
        }
    }
}

impl UnpinArgs {
    /// Execute the unpin command
    pub fn execute(&self, store: &mut ConfigStore) -> anyhow::Result<()> {
        if self.branch {
            unpin_branch(store, self.target.as_deref())
        } else {
            unpin_repo(store, self.target.as_deref())
        }
    }
}

/// Repository root enclosing `target` (or the cwd); the normalized path itself otherwise
fn resolve_repo_path(target: Option<&str>) -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let path = match target {
        Some(raw) => paths::normalize_from(raw, &cwd)?,
        None => cwd,
    };

    Ok(match GitRepo::open(&path) {
        Ok(repo) => repo.root().to_path_buf(),
        Err(_) => path,
    })
}

fn current_repo(store: &ConfigStore) -> anyhow::Result<Option<(RepositoryHandle, GitRepo)>> {
    let cwd = std::env::current_dir()?;
    let Some(handle) = find_repo_for_path(&cwd, &store.pinned_repo_paths()) else {
        return Ok(None);
    };
    let repo = handle.open()?;
    Ok(Some((handle, repo)))
}

fn pin_repo(store: &mut ConfigStore, target: Option<&str>) -> anyhow::Result<()> {
    let path = resolve_repo_path(target)?;
    if !path.is_dir() {
        println!("Directory \"{}\" does not exist.", path.display());
        return Ok(());
    }

    if store.add_pinned_repo(&path) {
        store.save()?;
        println!("Pinned repository \"{}\".", path.display());
    } else {
        println!("Repository \"{}\" is already pinned.", path.display());
    }
    Ok(())
}

fn unpin_repo(store: &mut ConfigStore, target: Option<&str>) -> anyhow::Result<()> {
    let path = resolve_repo_path(target)?;

    if store.delete_pinned_repo(&path) {
        store.save()?;
        println!("Unpinned repository \"{}\".", path.display());
    } else {
        println!("Repository \"{}\" is not pinned.", path.display());
    }
    Ok(())
}

fn pin_branch(store: &mut ConfigStore, target: Option<&str>) -> anyhow::Result<()> {
    let Some((handle, repo)) = current_repo(store)? else {
        println!("Not in a git repository.");
        return Ok(());
    };

    let branch = target.map(str::to_string).unwrap_or_else(|| repo.current_branch());

    if !repo.list_branches().contains(&branch) {
        println!("Branch \"{}\" not found.", branch);
        return Ok(());
    }

    if store.is_branch_globally_pinned(&branch) {
        println!("Branch \"{}\" is already globally protected.", branch);
        return Ok(());
    }

    if store.add_repo_pinned_branch(&handle.identifier, &branch) {
        store.save()?;
        println!("Pinned branch \"{}\" in {}.", branch, handle.name);
    } else {
        println!("Branch \"{}\" is already pinned in {}.", branch, handle.name);
    }
    Ok(())
}

fn unpin_branch(store: &mut ConfigStore, target: Option<&str>) -> anyhow::Result<()> {
    let Some((handle, repo)) = current_repo(store)? else {
        println!("Not in a git repository.");
        return Ok(());
    };

    let branch = target.map(str::to_string).unwrap_or_else(|| repo.current_branch());

    if store.is_branch_globally_pinned(&branch) {
        println!(
            "Branch \"{}\" is globally protected. Use 'rove config delete protected' to change that.",
            branch
        );
        return Ok(());
    }

    if store.delete_repo_pinned_branch(&handle.identifier, &branch) {
        store.save()?;
        println!("Unpinned branch \"{}\" in {}.", branch, handle.name);
    } else {
        println!("Branch \"{}\" is not pinned for this repository.", branch);
    }
    Ok(())
}
