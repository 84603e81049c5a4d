mod local;
mod registry;
mod remote;
mod tool;

#[cfg(test)]
pub(crate) mod testing;

use std::{
    fmt::Debug,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;

use crate::command::CommandError;

pub use local::{default_branch_lister, LocalVcs};
pub use registry::CommandRegistry;
pub use remote::{RemoteVcs, RepoRoot};
pub use tool::VcsTool;

#[derive(Error, Debug, Clone)]
pub enum VcsError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Repository {root} is not checked out at {path}")]
    NotCheckedOut { root: String, path: PathBuf },
    #[error("{tool} does not support {operation}")]
    Unsupported {
        tool: String,
        operation: &'static str,
    },
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: Arc<io::Error>,
    },
}

impl VcsError {
    pub(crate) fn io(path: &Path, error: io::Error) -> VcsError {
        VcsError::Io {
            path: path.to_path_buf(),
            source: Arc::new(error),
        }
    }
}

/// Lists the branches of the repository checked out in a directory, the
/// current branch first.
pub type BranchLister = Arc<dyn Fn(&Path) -> Result<Vec<String>, VcsError> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchUpdate {
    pub changed: bool,
    pub revision: String,
}

/// Revision and branch operations on one repository.
pub trait Vcs: Send + Sync + Debug {
    /// Import path of the repository root.
    fn root(&self) -> &str;

    /// Location the repository is fetched from.
    fn source(&self) -> Result<String, VcsError>;

    /// The checked out revision. Empty when the tool has no way to tell.
    fn revision(&self) -> Result<String, VcsError>;

    /// The current branch. Empty when unknown.
    fn branch(&self) -> Result<String, VcsError>;

    fn set_revision(&self, revision: &str) -> Result<(), VcsError>;

    /// Creates the initial checkout. An empty revision keeps the tool's
    /// default branch.
    fn create(&self, revision: &str) -> Result<(), VcsError>;

    fn update_branch(&self, branch: &str) -> Result<BranchUpdate, VcsError>;
}
