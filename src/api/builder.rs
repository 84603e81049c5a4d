use std::{path::PathBuf, sync::Arc};

use home::home_dir;

use crate::{
    config::RepofetchConfig,
    discovery::{KnownHostDiscovery, PackageDiscovery},
    resolver::{
        CompositeRepoResolver, DiscoveryRepoResolver, LocalRepoResolver, MemoizedRepoResolver,
        RemoteRepoResolver,
    },
    vcs::CommandRegistry,
    Repofetch,
};

#[derive(Default)]
pub struct RepofetchBuilder {
    source_root: Option<PathBuf>,
    registry: Option<CommandRegistry>,
    discovery: Option<Box<dyn PackageDiscovery>>,
    discovery_enabled: Option<bool>,
}

impl RepofetchBuilder {
    /// Base of the source tree.
    ///
    /// Defaults to the first entry of `$REPOFETCH_SOURCE_PATH`, then
    /// `$HOME/.repofetch`.
    pub fn source_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_root = Some(path.into());
        self
    }

    /// Tools and query commands.
    ///
    /// Defaults to the built-in git, hg, bzr and svn support.
    pub fn registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Service consulted when neither a checkout nor a declared source path
    /// resolves an import path.
    ///
    /// Defaults to [`KnownHostDiscovery`].
    pub fn discovery(mut self, discovery: impl PackageDiscovery + 'static) -> Self {
        self.discovery = Some(Box::new(discovery));
        self
    }

    /// Whether to consult the discovery service at all.
    ///
    /// Defaults to `$REPOFETCH_DISCOVERY_ENABLED`, then `true`.
    pub fn discovery_enabled(mut self, enabled: bool) -> Self {
        self.discovery_enabled = Some(enabled);
        self
    }

    pub fn try_build(self) -> anyhow::Result<Repofetch> {
        let Self {
            source_root,
            registry,
            discovery,
            discovery_enabled,
        } = self;
        let config = RepofetchConfig::load()?;

        let source_root = match source_root.or(config.source_root) {
            Some(source_root) => source_root,
            None => default_source_root()?,
        };
        let registry = Arc::new(registry.unwrap_or_default());

        let mut chain = CompositeRepoResolver::default()
            .with(LocalRepoResolver::new(&source_root, registry.clone()))
            .with(RemoteRepoResolver::new(&source_root, registry.clone()));
        if discovery_enabled.unwrap_or(config.discovery_enabled) {
            let discovery: Box<dyn PackageDiscovery> = match discovery {
                Some(discovery) => discovery,
                None => Box::new(KnownHostDiscovery::new()),
            };
            chain = chain.with(DiscoveryRepoResolver::new(
                discovery,
                &source_root,
                registry.clone(),
            ));
        }

        Ok(Repofetch {
            resolver: MemoizedRepoResolver::new(chain),
            source_root,
            registry,
        })
    }
}

fn default_source_root() -> anyhow::Result<PathBuf> {
    let mut source_root = home_dir().ok_or_else(|| {
        anyhow::anyhow!("Could not find home dir. Please define $HOME env variable.")
    })?;
    source_root.push(".repofetch");
    Ok(source_root)
}
