//! Rove CLI - jump between local repositories and tidy up their branches

mod commands;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use rove_core::{ConfigStore, CONFIG_ENV_VAR};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CleanArgs, ConfigArgs, JumpArgs, ListArgs, PinArgs, UnpinArgs};

/// Rove: find, jump to, and clean up the git repositories on this workstation
#[derive(Parser, Debug)]
#[command(name = "rove")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (overrides ./.rove.yaml and ~/.rove.yaml)
    #[arg(long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Repository to jump to (same as `rove jump <repo>`)
    query: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the root directory of the best matching repository
    #[command(visible_alias = "j")]
    Jump(JumpArgs),

    /// List repositories, or branches with --branch
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Pin a repository or branch
    Pin(PinArgs),

    /// Unpin a repository or branch
    Unpin(UnpinArgs),

    /// Clean up branches
    Clean(CleanArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays usable by shell wrappers
    let default_filter = if cli.verbose { "rove_core=debug,rove=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut store = ConfigStore::load_with_override(cli.config.clone())?;

    if cli.verbose {
        tracing::info!(
            config = ?store.path(),
            search_folders = store.raw_search_folders().len(),
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Jump(args)) => args.execute(&store, cli.verbose)?,
        Some(Commands::List(args)) => args.execute(&store, cli.verbose)?,
        Some(Commands::Pin(args)) => args.execute(&mut store)?,
        Some(Commands::Unpin(args)) => args.execute(&mut store)?,
        Some(Commands::Clean(args)) => args.execute(&store, cli.verbose)?,
        Some(Commands::Config(args)) => args.execute(&mut store)?,
        None => match cli.query {
            Some(query) => commands::jump::jump(&store, &query, cli.verbose)?,
            None => Cli::command().print_help()?,
        },
    }

    Ok(())
}
