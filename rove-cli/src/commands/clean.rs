//! Clean command - bulk delete branches with protection awareness

use clap::Args;
use rove_core::{
    execute_plan, find_repo_for_path, plan_cleanup, BranchPins, CleanupOptions, CleanupPlan,
    ConfigStore,
};

/// Clean up branches in the current repository
///
/// Branches that are never deleted:
///   1. the current branch
///   2. globally pinned branches (main, master, ...), even with --force
///   3. branches pinned for this repository, unless --force
///   4. branches checked out in a worktree (reported as skipped)
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Clean branches (required)
    #[arg(short, long)]
    pub branch: bool,

    /// Delete all unpinned branches (default: only merged ones)
    #[arg(long)]
    pub all: bool,

    /// Dry run - show what would be deleted without deleting
    #[arg(long)]
    pub dry_run: bool,

    /// Include branches pinned for this repository
    #[arg(long)]
    pub force: bool,
}

impl CleanArgs {
    /// Execute the clean command
    pub fn execute(&self, store: &ConfigStore, verbose: bool) -> anyhow::Result<()> {
        if !self.branch {
            println!("Please specify -b to clean branches.");
            println!("Usage: rove clean -b [--all] [--dry-run] [--force] [-v]");
            return Ok(());
        }

        let cwd = std::env::current_dir()?;
        let Some(handle) = find_repo_for_path(&cwd, &store.pinned_repo_paths()) else {
            println!("Not in a git repository.");
            return Ok(());
        };

        let repo = handle.open()?;
        let pins = BranchPins::from_store(store);
        let options = CleanupOptions {
            all: self.all,
            force: self.force,
        };

        let plan = plan_cleanup(&repo, &handle.identifier, &pins, options);

        if self.dry_run {
            print_dry_run(&plan, verbose);
            return Ok(());
        }

        let report = execute_plan(&repo, &plan, options.delete_mode());

        for (branch, error) in &report.failed {
            eprintln!("Warning: failed to delete branch \"{}\": {}", branch, error);
        }

        if verbose {
            for branch in &report.deleted {
                println!("Deleted branch \"{}\".", branch);
            }
        }

        match report.deleted.len() {
            0 => println!("No branches deleted."),
            1 => println!("Deleted 1 branch."),
            n => println!("Deleted {} branches.", n),
        }

        if verbose {
            print_skipped(&plan);
        }

        Ok(())
    }
}

fn print_dry_run(plan: &CleanupPlan, verbose: bool) {
    if plan.is_empty() {
        println!("No branches to delete.");
    } else {
        println!("Would delete {} branches:", plan.to_delete.len());
        for branch in &plan.to_delete {
            println!("  {}", branch);
        }
    }

    print_skipped(plan);

    if verbose {
        if !plan.protected.is_empty() {
            println!();
            println!("Protected:");
            for (branch, tier) in &plan.protected {
                println!("  {} ({})", branch, tier);
            }
        }
        if !plan.unmerged.is_empty() {
            println!();
            println!("Not merged (use --all to include):");
            for branch in &plan.unmerged {
                println!("  {}", branch);
            }
        }
    }
}

fn print_skipped(plan: &CleanupPlan) {
    if plan.skipped_worktree.is_empty() {
        return;
    }
    println!();
    println!(
        "Skipped {} branches with active worktrees:",
        plan.skipped_worktree.len()
    );
    for branch in &plan.skipped_worktree {
        println!("  {}", branch);
    }
}
