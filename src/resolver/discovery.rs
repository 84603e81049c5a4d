use std::{path::PathBuf, sync::Arc};

use log::debug;

use crate::{
    discovery::PackageDiscovery,
    model::Dependency,
    vcs::{CommandRegistry, RemoteVcs, RepoRoot},
};

use super::{check_import_path, RepoResolver, Resolution, ResolveError};

/// Asks a discovery service where an import path lives. Declared source
/// paths are ignored.
pub struct DiscoveryRepoResolver<D> {
    discovery: D,
    source_root: PathBuf,
    registry: Arc<CommandRegistry>,
}

impl<D: PackageDiscovery> DiscoveryRepoResolver<D> {
    pub fn new(
        discovery: D,
        source_root: impl Into<PathBuf>,
        registry: Arc<CommandRegistry>,
    ) -> Self {
        DiscoveryRepoResolver {
            discovery,
            source_root: source_root.into(),
            registry,
        }
    }

    pub fn resolve_discovered(
        &self,
        import_path: &str,
        dep: Option<&Dependency>,
    ) -> Result<RemoteVcs, ResolveError> {
        check_import_path(import_path)?;
        let discovered = self.discovery.discover(import_path)?;
        check_import_path(&discovered.root).map_err(|error| {
            ResolveError::not_found(import_path, format!("discovered root: {error}"))
        })?;
        let tool = self
            .registry
            .tool(&discovered.vcs)
            .ok_or_else(|| ResolveError::UnknownVcs {
                import_path: import_path.to_owned(),
                vcs: discovered.vcs.clone(),
            })?;
        let repo = RepoRoot {
            root: discovered.root,
            repo: discovered.repo,
            tool,
        };
        debug!("Discovered {} for {}", repo, import_path);
        Ok(
            RemoteVcs::new(repo, self.source_root.clone(), self.registry.clone())
                .with_dependency(dep),
        )
    }
}

impl<D: PackageDiscovery> RepoResolver for DiscoveryRepoResolver<D> {
    fn resolve_repo(&self, import_path: &str, dep: Option<&Dependency>) -> Resolution {
        Ok(Arc::new(self.resolve_discovered(import_path, dep)?))
    }
}
