//! Config command - manage search groups, aliases, and protected branches

use clap::{Args, Subcommand};
use rove_core::ConfigStore;

/// Manage rove configuration
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Add configuration values
    Add {
        #[command(subcommand)]
        item: AddItem,
    },

    /// Delete configuration values
    #[command(visible_aliases = ["rm", "remove"])]
    Delete {
        #[command(subcommand)]
        item: DeleteItem,
    },

    /// List configuration values
    #[command(visible_alias = "list")]
    Ls {
        #[command(subcommand)]
        section: Option<Section>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AddItem {
    /// Add a folder to search for git repositories
    Group { path: String },

    /// Add a short name for a repository path or search query
    Alias { short: String, expanded: String },

    /// Protect a branch name in every repository
    Protected { branch: String },
}

#[derive(Subcommand, Debug)]
pub enum DeleteItem {
    /// Remove a search group by path or index
    Group { target: String },

    /// Remove an alias by its short name
    Alias { short: String },

    /// Remove a branch name from the global protected list
    Protected { branch: String },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum Section {
    /// Search groups
    #[command(visible_alias = "groups")]
    Group,

    /// Pinned repositories
    #[command(visible_alias = "pins")]
    Pin,

    /// Aliases
    #[command(visible_alias = "aliases")]
    Alias,

    /// Globally protected branches
    Protected,

    /// Branches pinned per repository
    #[command(visible_alias = "branches")]
    Branch,
}

impl ConfigArgs {
    /// Execute the config command
    pub fn execute(&self, store: &mut ConfigStore) -> anyhow::Result<()> {
        match &self.command {
            Some(ConfigCommand::Add { item }) => add(store, item),
            Some(ConfigCommand::Delete { item }) => delete(store, item),
            Some(ConfigCommand::Ls { section: Some(section) }) => {
                show(store, *section);
                Ok(())
            }
            Some(ConfigCommand::Ls { section: None }) | None => {
                show_all(store);
                Ok(())
            }
        }
    }
}

fn add(store: &mut ConfigStore, item: &AddItem) -> anyhow::Result<()> {
    match item {
        AddItem::Group { path } => {
            if !store.add_search_folder(path) {
                println!("Search group \"{}\" already exists.", path);
                return Ok(());
            }
            store.save()?;
            println!("Added search group \"{}\".", path);
        }
        AddItem::Alias { short, expanded } => {
            let previous = store.add_alias(short, expanded)?;
            store.save()?;
            match previous {
                Some(old) => println!("Updated alias {} -> {} (was {}).", short, expanded, old),
                None => println!("Added alias {} -> {}.", short, expanded),
            }
        }
        AddItem::Protected { branch } => {
            if !store.add_global_pinned_branch(branch) {
                println!("Branch \"{}\" is already protected.", branch);
                return Ok(());
            }
            store.save()?;
            println!("Protected branch \"{}\" in every repository.", branch);
        }
    }
    Ok(())
}

fn delete(store: &mut ConfigStore, item: &DeleteItem) -> anyhow::Result<()> {
    match item {
        DeleteItem::Group { target } => {
            let removed = match target.parse::<usize>() {
                Ok(index) => store.delete_search_folder_at(index),
                Err(_) => store
                    .delete_search_folder(target)
                    .then(|| target.clone()),
            };
            match removed {
                Some(folder) => {
                    store.save()?;
                    println!("Removed search group \"{}\".", folder);
                }
                None => println!("No search group matches \"{}\".", target),
            }
        }
        DeleteItem::Alias { short } => match store.delete_alias(short) {
            Some(_) => {
                store.save()?;
                println!("Removed alias \"{}\".", short);
            }
            None => println!("Alias \"{}\" not found.", short),
        },
        DeleteItem::Protected { branch } => {
            if store.delete_global_pinned_branch(branch) {
                store.save()?;
                println!("Branch \"{}\" is no longer globally protected.", branch);
            } else {
                println!("Branch \"{}\" is not globally protected.", branch);
            }
        }
    }
    Ok(())
}

fn show_all(store: &ConfigStore) {
    for (i, section) in [
        Section::Group,
        Section::Pin,
        Section::Alias,
        Section::Protected,
        Section::Branch,
    ]
    .into_iter()
    .enumerate()
    {
        if i > 0 {
            println!();
        }
        show(store, section);
    }

    println!();
    match store.path() {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not found - using defaults)", path.display()),
        None => println!("Config file: (in memory)"),
    }
}

fn show(store: &ConfigStore, section: Section) {
    match section {
        Section::Group => print_indexed("Search Groups:", store.raw_search_folders()),
        Section::Pin => print_indexed("Pinned Repositories:", store.pinned_repos()),
        Section::Protected => print_indexed("Protected Branches:", store.global_pinned_branches()),
        Section::Alias => {
            println!("Aliases:");
            if store.aliases().is_empty() {
                println!("  (none configured)");
            }
            for (short, expanded) in store.aliases() {
                println!("  {} -> {}", short, expanded);
            }
        }
        Section::Branch => {
            println!("Pinned Branches:");
            if store.repo_pinned_branches().is_empty() {
                println!("  (none configured)");
            }
            for (identifier, branches) in store.repo_pinned_branches() {
                println!("  {}: {}", identifier, branches.join(", "));
            }
        }
    }
}

fn print_indexed(title: &str, items: &[String]) {
    println!("{}", title);
    if items.is_empty() {
        println!("  (none configured)");
        return;
    }
    for (i, item) in items.iter().enumerate() {
        println!("  [{}] {}", i, item);
    }
}
