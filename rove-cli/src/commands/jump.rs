//! Jump command - print the path of the best matching repository

use std::path::PathBuf;

use clap::Args;
use rove_core::{discover, paths, sort_by_pins, ConfigStore};

/// Print the root of the best matching repository
#[derive(Args, Debug)]
pub struct JumpArgs {
    /// Repository name (substring) or alias
    pub query: String,
}

/// Where a jump query leads
#[derive(Debug, PartialEq, Eq)]
pub enum JumpTarget {
    /// An alias expanding to an existing directory
    Directory(PathBuf),
    /// A search query, possibly rewritten by an alias
    Query(String),
}

/// Resolve an alias, if any, into a directory or a search query
pub fn resolve_alias(store: &ConfigStore, query: &str) -> JumpTarget {
    let Some(expanded) = store.alias(query) else {
        return JumpTarget::Query(query.to_string());
    };

    match paths::normalize(expanded) {
        Ok(path) if path.is_dir() => JumpTarget::Directory(path),
        _ => JumpTarget::Query(expanded.to_string()),
    }
}

impl JumpArgs {
    /// Execute the jump command
    pub fn execute(&self, store: &ConfigStore, verbose: bool) -> anyhow::Result<()> {
        jump(store, &self.query, verbose)
    }
}

/// Print the jump target for `query` on stdout
pub fn jump(store: &ConfigStore, query: &str, verbose: bool) -> anyhow::Result<()> {
    let query = match resolve_alias(store, query) {
        JumpTarget::Directory(path) => {
            if verbose {
                tracing::info!(alias = %query, path = %path.display(), "alias resolved to directory");
            }
            println!("{}", path.display());
            return Ok(());
        }
        JumpTarget::Query(q) => q,
    };

    let mut found = discover(&store.search_folders(), &query, &store.pinned_repo_paths());
    if found.is_empty() {
        eprintln!("No repositories or aliases found matching '{}'", query);
        return Ok(());
    }

    sort_by_pins(&mut found);

    if verbose {
        tracing::info!(query = %query, matches = found.len(), "jumping to first match");
    }

    println!("{}", found[0].path.display());
    Ok(())
}
