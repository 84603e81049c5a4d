use log::debug;

use crate::model::Dependency;

use super::{RepoResolver, Resolution, ResolveError};

/// Tries each resolver in order and returns the first success.
#[derive(Default)]
pub struct CompositeRepoResolver {
    resolvers: Vec<Box<dyn RepoResolver>>,
}

impl CompositeRepoResolver {
    pub fn new(resolvers: Vec<Box<dyn RepoResolver>>) -> Self {
        CompositeRepoResolver { resolvers }
    }

    pub fn with(mut self, resolver: impl RepoResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl RepoResolver for CompositeRepoResolver {
    /// Fails with [`ResolveError::Unresolved`] holding one failure per
    /// resolver when none succeeds.
    fn resolve_repo(&self, import_path: &str, dep: Option<&Dependency>) -> Resolution {
        let mut failures = Vec::with_capacity(self.resolvers.len());
        for (index, resolver) in self.resolvers.iter().enumerate() {
            match resolver.resolve_repo(import_path, dep) {
                Ok(vcs) => {
                    debug!("Resolved {} with resolver {}", import_path, index);
                    return Ok(vcs);
                }
                Err(error) => {
                    debug!("Resolver {} failed for {}: {}", index, import_path, error);
                    failures.push(error);
                }
            }
        }
        Err(ResolveError::Unresolved {
            import_path: import_path.to_owned(),
            failures,
        })
    }
}
