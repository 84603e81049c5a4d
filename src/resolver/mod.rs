mod composite;
mod discovery;
mod local;
mod memoized;
mod remote;

use std::{fmt::Display, sync::Arc};

use thiserror::Error;

use crate::{
    discovery::DiscoveryError,
    model::{import_path::validate_import_path, Dependency},
    vcs::{Vcs, VcsError},
};

pub use composite::CompositeRepoResolver;
pub use discovery::DiscoveryRepoResolver;
pub use local::LocalRepoResolver;
pub use memoized::MemoizedRepoResolver;
pub use remote::RemoteRepoResolver;

/// Outcome of resolving one import path.
pub type Resolution = Result<Arc<dyn Vcs>, ResolveError>;

/// A strategy that locates the repository holding an import path.
pub trait RepoResolver: Send + Sync {
    /// `dep` is the declared dependency for `import_path`, when there is one.
    fn resolve_repo(&self, import_path: &str, dep: Option<&Dependency>) -> Resolution;
}

impl<R: RepoResolver + ?Sized> RepoResolver for Box<R> {
    fn resolve_repo(&self, import_path: &str, dep: Option<&Dependency>) -> Resolution {
        (**self).resolve_repo(import_path, dep)
    }
}

impl<R: RepoResolver + ?Sized> RepoResolver for Arc<R> {
    fn resolve_repo(&self, import_path: &str, dep: Option<&Dependency>) -> Resolution {
        (**self).resolve_repo(import_path, dep)
    }
}

#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("{import_path} not found: {reason}")]
    NotFound { import_path: String, reason: String },
    #[error("Could not reach {source_path}: {}", list(.failures))]
    Probe {
        source_path: String,
        failures: Vec<VcsError>,
    },
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("Unknown version control tool {vcs} for {import_path}")]
    UnknownVcs { import_path: String, vcs: String },
    #[error(transparent)]
    Vcs(#[from] VcsError),
    #[error("Could not resolve {import_path}: {}", list(.failures))]
    Unresolved {
        import_path: String,
        failures: Vec<ResolveError>,
    },
}

impl ResolveError {
    pub(crate) fn not_found(import_path: &str, reason: impl Into<String>) -> ResolveError {
        ResolveError::NotFound {
            import_path: import_path.to_owned(),
            reason: reason.into(),
        }
    }

    /// Whether every strategy of a chain failed.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, ResolveError::Unresolved { .. })
    }

    /// The failure of each strategy, in strategy order, for an aggregate
    /// failure.
    pub fn failures(&self) -> Option<&[ResolveError]> {
        match self {
            ResolveError::Unresolved { failures, .. } => Some(failures),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }
}

/// Import paths that would lead out of the source tree are never found.
fn check_import_path(import_path: &str) -> Result<(), ResolveError> {
    validate_import_path(import_path)
        .map_err(|error| ResolveError::not_found(import_path, error.to_string()))
}

fn list<T: Display>(failures: &[T]) -> String {
    failures
        .iter()
        .enumerate()
        .map(|(index, failure)| format!("[{}] {}", index + 1, failure))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use crate::{
        model::Dependency,
        vcs::{BranchUpdate, Vcs, VcsError},
    };

    use super::{RepoResolver, Resolution, ResolveError};

    #[derive(Debug, Default)]
    pub struct TestVcs {
        pub root: String,
    }

    impl Vcs for TestVcs {
        fn root(&self) -> &str {
            &self.root
        }

        fn source(&self) -> Result<String, VcsError> {
            Ok(String::new())
        }

        fn revision(&self) -> Result<String, VcsError> {
            Ok(String::new())
        }

        fn branch(&self) -> Result<String, VcsError> {
            Ok(String::new())
        }

        fn set_revision(&self, _revision: &str) -> Result<(), VcsError> {
            Ok(())
        }

        fn create(&self, _revision: &str) -> Result<(), VcsError> {
            Ok(())
        }

        fn update_branch(&self, _branch: &str) -> Result<BranchUpdate, VcsError> {
            Ok(BranchUpdate {
                changed: false,
                revision: String::new(),
            })
        }
    }

    pub fn test_error(reason: &str) -> ResolveError {
        ResolveError::not_found("test", reason)
    }

    /// Replays scripted outcomes and records each call.
    pub struct ScriptedResolver {
        responses: Mutex<Vec<Resolution>>,
        pub calls: Mutex<Vec<(String, Option<Dependency>)>>,
    }

    impl ScriptedResolver {
        pub fn new(responses: Vec<Resolution>) -> ScriptedResolver {
            ScriptedResolver {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl RepoResolver for ScriptedResolver {
        fn resolve_repo(&self, import_path: &str, dep: Option<&Dependency>) -> Resolution {
            self.calls
                .lock()
                .unwrap()
                .push((import_path.to_owned(), dep.cloned()));
            self.responses.lock().unwrap().remove(0)
        }
    }

    /// Always succeeds, counting calls.
    #[derive(Default)]
    pub struct CountingResolver {
        pub calls: AtomicUsize,
    }

    impl RepoResolver for CountingResolver {
        fn resolve_repo(&self, import_path: &str, _dep: Option<&Dependency>) -> Resolution {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(TestVcs {
                root: import_path.to_owned(),
            }))
        }
    }
}
