use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::info;

use crate::{
    model::Dependency,
    resolver::{CompositeRepoResolver, MemoizedRepoResolver, RepoResolver},
    vcs::{BranchUpdate, CommandRegistry, Vcs},
};

mod builder;

pub use builder::RepofetchBuilder;

/// Resolves import paths through the local checkout, declared source and
/// discovery strategies, in that order, remembering every outcome.
pub struct Repofetch {
    resolver: MemoizedRepoResolver<CompositeRepoResolver>,
    source_root: PathBuf,
    registry: Arc<CommandRegistry>,
}

impl Repofetch {
    pub fn builder() -> RepofetchBuilder {
        RepofetchBuilder::default()
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &MemoizedRepoResolver<CompositeRepoResolver> {
        &self.resolver
    }

    /// Locates the repository of `import_path`.
    pub fn resolve(
        &self,
        import_path: &str,
        dep: Option<&Dependency>,
    ) -> anyhow::Result<Arc<dyn Vcs>> {
        Ok(self.resolver.resolve_repo(import_path, dep)?)
    }

    /// Makes sure `import_path` is checked out, at the dependency's pinned
    /// revision when it has one. An existing checkout is kept and only moved
    /// to that revision.
    pub fn checkout(
        &self,
        import_path: &str,
        dep: Option<&Dependency>,
    ) -> anyhow::Result<Arc<dyn Vcs>> {
        let vcs = self.resolve(import_path, dep)?;
        let revision = dep.and_then(Dependency::revision).unwrap_or_default();
        vcs.create(revision)?;
        info!("{} is checked out", vcs.root());
        Ok(vcs)
    }

    /// Moves the repository of `import_path` to `revision`.
    pub fn set_revision(
        &self,
        import_path: &str,
        dep: Option<&Dependency>,
        revision: &str,
    ) -> anyhow::Result<()> {
        self.resolve(import_path, dep)?.set_revision(revision)?;
        Ok(())
    }

    /// Pulls `branch` into the repository of `import_path`.
    pub fn update(
        &self,
        import_path: &str,
        dep: Option<&Dependency>,
        branch: &str,
    ) -> anyhow::Result<BranchUpdate> {
        Ok(self.resolve(import_path, dep)?.update_branch(branch)?)
    }
}
