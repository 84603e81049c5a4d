use std::{
    fmt::{Debug, Formatter},
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, info};

use crate::model::package_source;

use super::{BranchLister, BranchUpdate, CommandRegistry, Vcs, VcsError, VcsTool};

/// Handle on an existing checkout under a source tree.
pub struct LocalVcs {
    import_path: String,
    root: String,
    source_root: PathBuf,
    tool: Arc<VcsTool>,
    registry: Arc<CommandRegistry>,
    branches: BranchLister,
}

/// Lists branches with the registry's branch command for `tool`. Tools
/// without one have no known branches.
pub fn default_branch_lister(registry: Arc<CommandRegistry>, tool: String) -> BranchLister {
    Arc::new(move |path: &Path| -> Result<Vec<String>, VcsError> {
        match registry.branches(&tool) {
            Some(template) => Ok(template.exec_lines(path)?),
            None => Ok(Vec::new()),
        }
    })
}

impl LocalVcs {
    pub fn new(
        import_path: impl Into<String>,
        root: impl Into<String>,
        source_root: impl Into<PathBuf>,
        tool: Arc<VcsTool>,
        registry: Arc<CommandRegistry>,
    ) -> LocalVcs {
        let branches = default_branch_lister(registry.clone(), tool.name.clone());
        LocalVcs {
            import_path: import_path.into(),
            root: root.into(),
            source_root: source_root.into(),
            tool,
            registry,
            branches,
        }
    }

    pub fn with_branch_lister<F>(mut self, branches: F) -> Self
    where
        F: Fn(&Path) -> Result<Vec<String>, VcsError> + Send + Sync + 'static,
    {
        self.branches = Arc::new(branches);
        self
    }

    pub fn import_path(&self) -> &str {
        &self.import_path
    }

    pub fn tool(&self) -> &VcsTool {
        &self.tool
    }

    /// Directory of the repository root.
    pub fn path(&self) -> PathBuf {
        package_source(&self.source_root, &self.root)
    }
}

impl Debug for LocalVcs {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalVcs")
            .field("import_path", &self.import_path)
            .field("root", &self.root)
            .field("source_root", &self.source_root)
            .field("tool", &self.tool.name)
            .finish_non_exhaustive()
    }
}

impl Vcs for LocalVcs {
    fn root(&self) -> &str {
        &self.root
    }

    fn source(&self) -> Result<String, VcsError> {
        match self.registry.source(&self.tool.name) {
            Some(template) => Ok(template.exec(&self.path())?),
            None => Ok(String::new()),
        }
    }

    fn revision(&self) -> Result<String, VcsError> {
        match self.registry.revision(&self.tool.name) {
            Some(template) => Ok(template.exec(&self.path())?),
            None => {
                debug!(
                    "No revision command for {}, revision of {} unknown",
                    self.tool.name, self.root
                );
                Ok(String::new())
            }
        }
    }

    /// The first branch reported by the branch lister.
    fn branch(&self) -> Result<String, VcsError> {
        let branches = (self.branches)(&self.path())?;
        Ok(branches.into_iter().next().unwrap_or_default())
    }

    fn set_revision(&self, revision: &str) -> Result<(), VcsError> {
        debug!("Setting {} to revision {:?}", self.root, revision);
        self.tool.tag_sync(&self.path(), revision)
    }

    /// Clones unless a checkout already exists, then moves to `revision`.
    fn create(&self, revision: &str) -> Result<(), VcsError> {
        let path = self.path();
        if self.tool.is_checkout(&path)? {
            info!("{} is already checked out at {}", self.root, path.display());
        } else {
            let source = self.source()?;
            info!(
                "Creating {} checkout of {} at {}",
                self.tool.name,
                self.root,
                path.display()
            );
            self.tool.create(&path, &source)?;
        }
        if !revision.is_empty() {
            self.set_revision(revision)?;
        }
        Ok(())
    }

    fn update_branch(&self, branch: &str) -> Result<BranchUpdate, VcsError> {
        let path = self.path();
        let before = self.revision()?;
        self.tool.branch_sync(&path, branch)?;
        self.tool.download(&path)?;
        let after = self.revision()?;
        let changed = before != after;
        if changed {
            info!("Updated {} branch {} from {} to {}", self.root, branch, before, after);
        } else {
            debug!("{} branch {} is up to date at {}", self.root, branch, after);
        }
        Ok(BranchUpdate {
            changed,
            revision: after,
        })
    }
}
