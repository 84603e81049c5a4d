use std::{path::PathBuf, sync::Arc};

use log::debug;

use crate::{
    model::Dependency,
    vcs::{CommandRegistry, RemoteVcs, RepoRoot, VcsTool},
};

use super::{check_import_path, RepoResolver, Resolution, ResolveError};

/// Uses the explicit source URL of a dependency, probing it with each
/// registered tool until one recognises it.
pub struct RemoteRepoResolver {
    source_root: PathBuf,
    registry: Arc<CommandRegistry>,
    probe_dir: PathBuf,
}

impl RemoteRepoResolver {
    pub fn new(source_root: impl Into<PathBuf>, registry: Arc<CommandRegistry>) -> Self {
        RemoteRepoResolver {
            source_root: source_root.into(),
            registry,
            probe_dir: std::env::temp_dir(),
        }
    }

    pub fn resolve_remote(
        &self,
        import_path: &str,
        dep: Option<&Dependency>,
    ) -> Result<RemoteVcs, ResolveError> {
        check_import_path(import_path)?;
        let dep =
            dep.ok_or_else(|| ResolveError::not_found(import_path, "no dependency declared"))?;
        let source_path = dep
            .source_path()
            .ok_or_else(|| ResolveError::not_found(import_path, "no source path declared"))?;

        let mut failures = Vec::new();
        for tool in self.candidate_tools(source_path) {
            debug!("Probing {} with {}", source_path, tool.name);
            match tool.ping(&self.probe_dir, source_path) {
                Ok(()) => {
                    let repo = RepoRoot {
                        root: dep.root().to_owned(),
                        repo: source_path.to_owned(),
                        tool,
                    };
                    debug!("Resolved {} to {}", import_path, repo);
                    return Ok(
                        RemoteVcs::new(repo, self.source_root.clone(), self.registry.clone())
                            .with_dependency(Some(dep)),
                    );
                }
                Err(error) => {
                    debug!("{} probe of {} failed: {}", tool.name, source_path, error);
                    failures.push(error);
                }
            }
        }
        Err(ResolveError::Probe {
            source_path: source_path.to_owned(),
            failures,
        })
    }

    /// Registered tools, git first when the URL looks like a git remote.
    fn candidate_tools(&self, source_path: &str) -> Vec<Arc<VcsTool>> {
        let mut tools: Vec<Arc<VcsTool>> = self.registry.tools().cloned().collect();
        if looks_like_git(source_path) {
            tools.sort_by_key(|tool| tool.name != "git");
        }
        tools
    }
}

fn looks_like_git(source_path: &str) -> bool {
    source_path.ends_with(".git")
        || source_path.starts_with("git@")
        || source_path.starts_with("git://")
        || source_path.starts_with("git+ssh://")
}

impl RepoResolver for RemoteRepoResolver {
    fn resolve_repo(&self, import_path: &str, dep: Option<&Dependency>) -> Resolution {
        Ok(Arc::new(self.resolve_remote(import_path, dep)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::vcs::Vcs;

    fn probe_tool(name: &str, program: &str) -> VcsTool {
        VcsTool {
            name: name.to_owned(),
            program: program.to_owned(),
            ping: vec!["{repo}".to_owned()],
            ..VcsTool::svn()
        }
    }

    fn resolver(tools: Vec<VcsTool>) -> RemoteRepoResolver {
        let mut registry = CommandRegistry::empty();
        for tool in tools {
            registry.register_tool(tool);
        }
        RemoteRepoResolver::new(std::env::temp_dir(), Arc::new(registry))
    }

    #[test]
    fn resolves_declared_source() {
        let dep = Dependency::new("github.com/acme/widget")
            .unwrap()
            .with_source_path("git@github.com:acme/widget.git");
        let vcs = resolver(vec![probe_tool("git", "echo")])
            .resolve_remote(dep.root(), Some(&dep))
            .unwrap();
        assert_eq!(vcs.root(), "github.com/acme/widget");
        assert_eq!(vcs.source().unwrap(), "git@github.com:acme/widget.git");
        assert_eq!(vcs.repo().tool.name, "git");
    }

    #[test]
    fn single_segment_root() {
        let dep = Dependency::new("camlistore.org")
            .unwrap()
            .with_source_path("https://camlistore.googlesource.com/camlistore");
        let vcs = resolver(vec![probe_tool("git", "echo")])
            .resolve_repo(dep.root(), Some(&dep))
            .unwrap();
        assert_eq!(vcs.root(), "camlistore.org");
    }

    #[test]
    fn falls_through_failing_probes() {
        let dep = Dependency::new("example.org/pkg")
            .unwrap()
            .with_source_path("https://example.org/pkg");
        let vcs = resolver(vec![probe_tool("git", "false"), probe_tool("hg", "echo")])
            .resolve_remote(dep.root(), Some(&dep))
            .unwrap();
        assert_eq!(vcs.repo().tool.name, "hg");
    }

    #[test]
    fn git_urls_probe_git_first() {
        let remote = resolver(vec![probe_tool("hg", "echo"), probe_tool("git", "echo")]);
        let names: Vec<String> = remote
            .candidate_tools("https://example.org/pkg.git")
            .iter()
            .map(|tool| tool.name.clone())
            .collect();
        assert_eq!(names, vec!["git".to_owned(), "hg".to_owned()]);
    }

    #[test]
    fn missing_source_path_is_not_found() {
        let remote = resolver(vec![probe_tool("git", "echo")]);
        let dep = Dependency::new("example.org/pkg").unwrap();
        assert!(remote
            .resolve_repo("example.org/pkg", Some(&dep))
            .unwrap_err()
            .is_not_found());
        assert!(remote
            .resolve_repo("example.org/pkg", None)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn unreachable_source_fails() {
        let dep = Dependency::new("nothere.invalid/viper-cog/cant")
            .unwrap()
            .with_source_path("https://nothere.invalid/viper-cog/cant.git");
        let registry = Arc::new(CommandRegistry::default());
        let error = RemoteRepoResolver::new(std::env::temp_dir(), registry)
            .resolve_repo(dep.root(), Some(&dep))
            .unwrap_err();
        match error {
            ResolveError::Probe { failures, .. } => assert_eq!(failures.len(), 4),
            other => panic!("unexpected error {other}"),
        }
    }
}
