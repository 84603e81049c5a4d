use std::{
    fmt::{Display, Formatter},
    path::PathBuf,
    sync::Arc,
};

use log::info;

use crate::model::{package_source, Dependency};

use super::{BranchUpdate, CommandRegistry, LocalVcs, Vcs, VcsError, VcsTool};

/// Where a repository lives and which tool manages it.
#[derive(Debug, Clone)]
pub struct RepoRoot {
    /// Import path of the repository root.
    pub root: String,
    /// Fetch URL.
    pub repo: String,
    pub tool: Arc<VcsTool>,
}

impl Display for RepoRoot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} {})", self.root, self.tool.name, self.repo)
    }
}

/// Handle on a repository that was located but is not necessarily checked
/// out yet. `create` materialises it under the source tree, after which
/// [`RemoteVcs::to_local`] gives a handle on the checkout.
#[derive(Debug, Clone)]
pub struct RemoteVcs {
    repo: RepoRoot,
    revision: Option<String>,
    branch: Option<String>,
    source_root: PathBuf,
    registry: Arc<CommandRegistry>,
}

impl RemoteVcs {
    pub fn new(
        repo: RepoRoot,
        source_root: impl Into<PathBuf>,
        registry: Arc<CommandRegistry>,
    ) -> RemoteVcs {
        RemoteVcs {
            repo,
            revision: None,
            branch: None,
            source_root: source_root.into(),
            registry,
        }
    }

    /// Carries the pinned revision and branch of `dep`, if any.
    pub fn with_dependency(mut self, dep: Option<&Dependency>) -> Self {
        if let Some(dep) = dep {
            self.revision = dep.revision().map(str::to_owned);
            self.branch = dep.branch().map(str::to_owned);
        }
        self
    }

    pub fn repo(&self) -> &RepoRoot {
        &self.repo
    }

    pub fn path(&self) -> PathBuf {
        package_source(&self.source_root, &self.repo.root)
    }

    pub fn is_checked_out(&self) -> Result<bool, VcsError> {
        self.repo.tool.is_checkout(&self.path())
    }

    pub fn to_local(&self) -> LocalVcs {
        LocalVcs::new(
            self.repo.root.clone(),
            self.repo.root.clone(),
            self.source_root.clone(),
            self.repo.tool.clone(),
            self.registry.clone(),
        )
    }

    fn checkout(&self) -> Result<LocalVcs, VcsError> {
        if self.is_checked_out()? {
            Ok(self.to_local())
        } else {
            Err(VcsError::NotCheckedOut {
                root: self.repo.root.clone(),
                path: self.path(),
            })
        }
    }
}

impl Vcs for RemoteVcs {
    fn root(&self) -> &str {
        &self.repo.root
    }

    fn source(&self) -> Result<String, VcsError> {
        Ok(self.repo.repo.clone())
    }

    fn revision(&self) -> Result<String, VcsError> {
        Ok(self.revision.clone().unwrap_or_default())
    }

    fn branch(&self) -> Result<String, VcsError> {
        Ok(self.branch.clone().unwrap_or_default())
    }

    fn set_revision(&self, revision: &str) -> Result<(), VcsError> {
        self.checkout()?.set_revision(revision)
    }

    fn create(&self, revision: &str) -> Result<(), VcsError> {
        let path = self.path();
        if self.is_checked_out()? {
            info!("{} is already checked out at {}", self.repo.root, path.display());
        } else {
            info!("Fetching {} into {}", self.repo, path.display());
            self.repo.tool.create(&path, &self.repo.repo)?;
        }
        if !revision.is_empty() {
            self.repo.tool.tag_sync(&path, revision)?;
        }
        Ok(())
    }

    fn update_branch(&self, branch: &str) -> Result<BranchUpdate, VcsError> {
        self.checkout()?.update_branch(branch)
    }
}
