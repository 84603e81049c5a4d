use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use log::trace;

use crate::model::Dependency;

use super::{RepoResolver, Resolution};

/// Caches the outcome of a resolver per import path for the lifetime of the
/// resolver, failures included.
///
/// Each path is resolved at most once: concurrent callers for the same path
/// wait for the first one, callers for other paths do not.
pub struct MemoizedRepoResolver<R> {
    inner: R,
    cache: DashMap<String, Arc<OnceLock<Resolution>>>,
}

impl<R: RepoResolver> MemoizedRepoResolver<R> {
    pub fn new(inner: R) -> Self {
        MemoizedRepoResolver {
            inner,
            cache: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// The completed outcome for `import_path`, if any.
    pub fn cached(&self, import_path: &str) -> Option<Resolution> {
        self.cache
            .get(import_path)
            .and_then(|cell| cell.get().cloned())
    }
}

impl<R: RepoResolver> RepoResolver for MemoizedRepoResolver<R> {
    fn resolve_repo(&self, import_path: &str, dep: Option<&Dependency>) -> Resolution {
        // Clone the cell out so the map shard is not locked while resolving.
        let cell = self
            .cache
            .entry(import_path.to_owned())
            .or_default()
            .clone();
        if let Some(resolution) = cell.get() {
            trace!("Resolution of {} served from cache", import_path);
            return resolution.clone();
        }
        cell.get_or_init(|| self.inner.resolve_repo(import_path, dep))
            .clone()
    }
}
