use std::{path::PathBuf, sync::Arc};

use log::{debug, trace};

use crate::{
    model::{import_path_ancestors, package_source, Dependency},
    vcs::{CommandRegistry, LocalVcs},
};

use super::{check_import_path, RepoResolver, Resolution, ResolveError};

/// Finds an existing checkout in a source tree by looking for a tool's
/// control directory at the import path or any of its parents.
pub struct LocalRepoResolver {
    source_root: PathBuf,
    registry: Arc<CommandRegistry>,
}

impl LocalRepoResolver {
    pub fn new(source_root: impl Into<PathBuf>, registry: Arc<CommandRegistry>) -> Self {
        LocalRepoResolver {
            source_root: source_root.into(),
            registry,
        }
    }

    pub fn resolve_local(&self, import_path: &str) -> Result<LocalVcs, ResolveError> {
        check_import_path(import_path)?;
        for root in import_path_ancestors(import_path) {
            let dir = package_source(&self.source_root, root);
            for tool in self.registry.tools() {
                trace!("Looking for {} in {}", tool.marker, dir.display());
                if tool.is_checkout(&dir)? {
                    debug!(
                        "Found {} checkout of {} at {}",
                        tool.name,
                        import_path,
                        dir.display()
                    );
                    return Ok(LocalVcs::new(
                        import_path,
                        root,
                        self.source_root.clone(),
                        tool.clone(),
                        self.registry.clone(),
                    ));
                }
            }
        }
        Err(ResolveError::not_found(
            import_path,
            format!(
                "no checkout in {}",
                package_source(&self.source_root, import_path).display()
            ),
        ))
    }
}

impl RepoResolver for LocalRepoResolver {
    fn resolve_repo(&self, import_path: &str, _dep: Option<&Dependency>) -> Resolution {
        Ok(Arc::new(self.resolve_local(import_path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::vcs::Vcs;

    fn checkout(home: &std::path::Path, root: &str, marker: &str) {
        std::fs::create_dir_all(package_source(home, root).join(marker)).unwrap();
    }

    fn resolver(home: &std::path::Path) -> LocalRepoResolver {
        LocalRepoResolver::new(home, Arc::new(CommandRegistry::default()))
    }

    #[test]
    fn resolves_repository_root() {
        let home = tempfile::tempdir().unwrap();
        checkout(home.path(), "github.com/acme/widget", ".git");

        let vcs = resolver(home.path())
            .resolve_local("github.com/acme/widget")
            .unwrap();
        assert_eq!(vcs.tool().name, "git");
        assert_eq!(vcs.root(), "github.com/acme/widget");
    }

    #[test]
    fn resolves_sub_package_to_its_root() {
        let home = tempfile::tempdir().unwrap();
        checkout(home.path(), "golang.org/x/tools", ".git");
        std::fs::create_dir_all(package_source(home.path(), "golang.org/x/tools/go/vcs")).unwrap();

        let vcs = resolver(home.path())
            .resolve_local("golang.org/x/tools/go/vcs")
            .unwrap();
        assert_eq!(vcs.root(), "golang.org/x/tools");
        assert_eq!(vcs.import_path(), "golang.org/x/tools/go/vcs");
        assert_eq!(vcs.path(), package_source(home.path(), "golang.org/x/tools"));
    }

    #[test]
    fn resolves_other_tools() {
        let home = tempfile::tempdir().unwrap();
        checkout(home.path(), "hg.example.org/repo", ".hg");
        let vcs = resolver(home.path())
            .resolve_local("hg.example.org/repo/pkg")
            .unwrap();
        assert_eq!(vcs.tool().name, "hg");
    }

    #[test]
    fn single_segment_root() {
        let home = tempfile::tempdir().unwrap();
        checkout(home.path(), "camlistore.org", ".git");
        let dep = Dependency::new("camlistore.org")
            .unwrap()
            .with_source_path("https://camlistore.googlesource.com/camlistore");

        let vcs = resolver(home.path())
            .resolve_repo(dep.root(), Some(&dep))
            .unwrap();
        assert_eq!(vcs.root(), "camlistore.org");
    }

    #[test]
    fn file_inside_checkout_resolves_to_root() {
        let home = tempfile::tempdir().unwrap();
        checkout(home.path(), "example.org/pkg", ".git");
        std::fs::write(package_source(home.path(), "example.org/pkg/LICENSE"), "MIT").unwrap();

        let vcs = resolver(home.path())
            .resolve_local("example.org/pkg/LICENSE")
            .unwrap();
        assert_eq!(vcs.root(), "example.org/pkg");
    }

    #[test]
    fn parent_segments_are_not_found() {
        let home = tempfile::tempdir().unwrap();
        checkout(home.path(), "example.org/pkg", ".git");
        let error = resolver(home.path())
            .resolve_repo("example.org/pkg/../pkg", None)
            .unwrap_err();
        assert!(error.is_not_found(), "{error}");
    }

    #[test]
    fn missing_checkout_is_not_found() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(package_source(home.path(), "example.org/pkg")).unwrap();
        let error = resolver(home.path())
            .resolve_repo("example.org/pkg", None)
            .unwrap_err();
        assert!(error.is_not_found(), "{error}");
    }
}
