use std::error::Error;

use clap::Parser;
use repofetch::{
    cli::{
        args::{CliArgs, Command},
        command_handlers::{do_create, do_resolve, do_set_rev, do_update},
    },
    Repofetch,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = CliArgs::parse();

    let mut builder = Repofetch::builder();
    if let Some(source_root) = &cli_args.source_root {
        builder = builder.source_root(source_root);
    }
    if cli_args.no_discovery {
        builder = builder.discovery_enabled(false);
    }
    let repofetch = builder.try_build()?;

    match cli_args.cmd {
        Command::Resolve { dependency } => do_resolve(&repofetch, &dependency),
        Command::Create { dependency } => do_create(&repofetch, &dependency),
        Command::SetRev { dependency, target } => do_set_rev(&repofetch, &dependency, &target),
        Command::Update { dependency, target } => do_update(&repofetch, &dependency, &target),
    }
}
