use std::error::Error;

use log::info;

use crate::{cli::args::DependencyArgs, model::Dependency, Repofetch};

/// Handler to resolve command
pub fn do_resolve(repofetch: &Repofetch, args: &DependencyArgs) -> Result<(), Box<dyn Error>> {
    let dep = build_dependency(args)?;
    let vcs = repofetch.resolve(&args.import_path, Some(&dep))?;
    println!("root: {}", vcs.root());
    println!("source: {}", vcs.source()?);
    println!("revision: {}", vcs.revision()?);
    println!("branch: {}", vcs.branch()?);
    Ok(())
}

/// Handler to create command
pub fn do_create(repofetch: &Repofetch, args: &DependencyArgs) -> Result<(), Box<dyn Error>> {
    let dep = build_dependency(args)?;
    let vcs = repofetch.checkout(&args.import_path, Some(&dep))?;
    info!(
        "Checked out {} in {}",
        vcs.root(),
        repofetch.source_root().display()
    );
    Ok(())
}

/// Handler to set-rev command
pub fn do_set_rev(
    repofetch: &Repofetch,
    args: &DependencyArgs,
    revision: &str,
) -> Result<(), Box<dyn Error>> {
    let dep = build_dependency(args)?;
    repofetch.set_revision(&args.import_path, Some(&dep), revision)?;
    info!("Moved {} to {}", args.import_path, revision);
    Ok(())
}

/// Handler to update command
pub fn do_update(
    repofetch: &Repofetch,
    args: &DependencyArgs,
    branch: &str,
) -> Result<(), Box<dyn Error>> {
    let dep = build_dependency(args)?;
    let update = repofetch.update(&args.import_path, Some(&dep), branch)?;
    if update.changed {
        info!("Updated {} to {}", args.import_path, update.revision);
    } else {
        info!("{} is up to date at {}", args.import_path, update.revision);
    }
    Ok(())
}

/// Dependency record from the command line, rooted at the import path unless a root is given
fn build_dependency(args: &DependencyArgs) -> Result<Dependency, Box<dyn Error>> {
    let root = args.root.as_deref().unwrap_or(&args.import_path);
    let mut dep = Dependency::new(root)?;
    if let Some(source) = &args.source {
        dep = dep.with_source_path(source);
    }
    if let Some(rev) = &args.rev {
        dep = dep.with_revision(rev);
    }
    if let Some(branch) = &args.branch {
        dep = dep.with_branch(branch);
    }
    Ok(dep)
}
