use clap::{Args, Parser, Subcommand};

/// Resolves import paths to version-controlled repositories and manages their checkouts.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Base of the source tree, checkouts live under `<source root>/src`
    #[clap(short, long, env = "REPOFETCH_SOURCE_ROOT")]
    pub source_root: Option<String>,
    /// Do not consult the discovery service
    #[clap(long)]
    pub no_discovery: bool,
}

#[derive(Debug, Args)]
pub struct DependencyArgs {
    /// Import path to resolve
    pub import_path: String,
    /// Repository root import path, defaults to the import path
    #[clap(short, long)]
    pub root: Option<String>,
    /// Explicit fetch URL of the repository
    #[clap(long)]
    pub source: Option<String>,
    /// Pinned revision
    #[clap(long)]
    pub rev: Option<String>,
    /// Tracked branch
    #[clap(short, long)]
    pub branch: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows where an import path lives and what is checked out
    Resolve {
        #[clap(flatten)]
        dependency: DependencyArgs,
    },
    /// Checks out the repository of an import path, at the pinned revision if given
    Create {
        #[clap(flatten)]
        dependency: DependencyArgs,
    },
    /// Moves an existing checkout to a revision
    SetRev {
        #[clap(flatten)]
        dependency: DependencyArgs,
        /// Revision to move to
        #[clap(long = "to")]
        target: String,
    },
    /// Pulls a branch into an existing checkout
    Update {
        #[clap(flatten)]
        dependency: DependencyArgs,
        /// Branch to pull
        #[clap(long = "to")]
        target: String,
    },
}
