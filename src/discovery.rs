use log::trace;
use regex_lite::Regex;
use thiserror::Error;

use crate::model::import_path::validate_import_path;

/// Repository metadata reported by a discovery service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    /// Import path of the repository root.
    pub root: String,
    /// Fetch URL.
    pub repo: String,
    /// Name of the version control tool.
    pub vcs: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("No repository metadata found for {import_path}")]
    NoMetadata { import_path: String },
    #[error(
        "Import path {import_path} matches several repository roots: {}",
        .candidates.join(", ")
    )]
    Ambiguous {
        import_path: String,
        candidates: Vec<String>,
    },
}

/// Maps an import path to the repository that holds it.
pub trait PackageDiscovery: Send + Sync {
    fn discover(&self, import_path: &str) -> Result<Discovered, DiscoveryError>;
}

impl<D: PackageDiscovery + ?Sized> PackageDiscovery for Box<D> {
    fn discover(&self, import_path: &str) -> Result<Discovered, DiscoveryError> {
        (**self).discover(import_path)
    }
}

struct HostRule {
    prefix: String,
    pattern: Regex,
    vcs: &'static str,
}

/// `host.tld[:port]/path/repo.<tool>[/sub/pkg]`
const SUFFIX_PATTERN: &str = concat!(
    r"^(?P<root>[a-z0-9.\-]+\.[a-z0-9.\-]+(?::[0-9]+)?",
    r"(?:/~?[A-Za-z0-9_.\-]+)+?\.(?P<vcs>bzr|git|hg|svn))",
    r"(?:/~?[A-Za-z0-9_.\-]+)*$",
);

/// A path segment other than `.` and `..`.
const SEGMENT: &str = r"\.?[A-Za-z0-9_\-][A-Za-z0-9_.\-]*";

/// Offline discovery for well known hosting sites, plus the convention of
/// naming a repository root with a tool suffix (`example.org/repo.git/pkg`).
pub struct KnownHostDiscovery {
    hosts: Vec<HostRule>,
    suffix: Regex,
}

impl KnownHostDiscovery {
    pub fn new() -> KnownHostDiscovery {
        let mut discovery = KnownHostDiscovery {
            hosts: Vec::new(),
            suffix: Regex::new(SUFFIX_PATTERN).unwrap(),
        };
        discovery
            .add_host("github.com", "git")
            .add_host("bitbucket.org", "git")
            .add_host("gitlab.com", "git");
        discovery.hosts.push(HostRule {
            prefix: "launchpad.net/".to_owned(),
            pattern: Regex::new(&format!(
                r"^(?P<root>launchpad\.net/(?:~{SEGMENT}/(?:\+junk|{SEGMENT})/{SEGMENT}|{SEGMENT}))(?:/{SEGMENT})*$"
            ))
            .unwrap(),
            vcs: "bzr",
        });
        discovery
    }

    /// Treats `host` like github.com: the first two path segments after the
    /// host name the repository.
    pub fn add_host(&mut self, host: &str, vcs: &'static str) -> &mut Self {
        let pattern = format!(
            r"^(?P<root>{}/{SEGMENT}/{SEGMENT})(?:/{SEGMENT})*$",
            regex_lite::escape(host)
        );
        self.hosts.push(HostRule {
            prefix: format!("{host}/"),
            pattern: Regex::new(&pattern).unwrap(),
            vcs,
        });
        self
    }

    fn discover_by_suffix(&self, import_path: &str) -> Result<Discovered, DiscoveryError> {
        let captures = self
            .suffix
            .captures(import_path)
            .ok_or_else(|| DiscoveryError::NoMetadata {
                import_path: import_path.to_owned(),
            })?;

        let candidates: Vec<String> = suffix_roots(import_path);
        if candidates.len() > 1 {
            return Err(DiscoveryError::Ambiguous {
                import_path: import_path.to_owned(),
                candidates,
            });
        }

        let root = captures["root"].to_owned();
        Ok(Discovered {
            repo: format!("https://{root}"),
            vcs: captures["vcs"].to_owned(),
            root,
        })
    }
}

impl Default for KnownHostDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageDiscovery for KnownHostDiscovery {
    fn discover(&self, import_path: &str) -> Result<Discovered, DiscoveryError> {
        if validate_import_path(import_path).is_err() {
            return Err(DiscoveryError::NoMetadata {
                import_path: import_path.to_owned(),
            });
        }
        for rule in &self.hosts {
            if !import_path.starts_with(&rule.prefix) {
                continue;
            }
            trace!("Matching {} against {}", import_path, rule.prefix);
            return match rule.pattern.captures(import_path) {
                Some(captures) => {
                    let root = captures["root"].to_owned();
                    Ok(Discovered {
                        repo: format!("https://{root}"),
                        vcs: rule.vcs.to_owned(),
                        root,
                    })
                }
                None => Err(DiscoveryError::NoMetadata {
                    import_path: import_path.to_owned(),
                }),
            };
        }
        self.discover_by_suffix(import_path)
    }
}

/// Every prefix of `import_path` ending in a tool suffix.
fn suffix_roots(import_path: &str) -> Vec<String> {
    let mut roots = Vec::new();
    let mut end = 0;
    for segment in import_path.split('/') {
        end += segment.len();
        if [".git", ".hg", ".bzr", ".svn"]
            .iter()
            .any(|suffix| segment.len() > suffix.len() && segment.ends_with(suffix))
        {
            roots.push(import_path[..end].to_owned());
        }
        end += 1;
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn github_root_is_two_segments() {
        let discovered = KnownHostDiscovery::new()
            .discover("github.com/acme/widget/cmd")
            .unwrap();
        assert_eq!(
            discovered,
            Discovered {
                root: "github.com/acme/widget".to_owned(),
                repo: "https://github.com/acme/widget".to_owned(),
                vcs: "git".to_owned(),
            }
        );
    }

    #[test]
    fn incomplete_github_path() {
        let error = KnownHostDiscovery::new()
            .discover("github.com/acme")
            .unwrap_err();
        assert!(matches!(error, DiscoveryError::NoMetadata { .. }));
    }

    #[test]
    fn launchpad_project() {
        let discovered = KnownHostDiscovery::new()
            .discover("launchpad.net/goyaml/sub")
            .unwrap();
        assert_eq!(discovered.root, "launchpad.net/goyaml");
        assert_eq!(discovered.vcs, "bzr");
    }

    #[test]
    fn vcs_suffix() {
        let discovered = KnownHostDiscovery::new()
            .discover("example.org/user/repo.hg/pkg")
            .unwrap();
        assert_eq!(discovered.root, "example.org/user/repo.hg");
        assert_eq!(discovered.repo, "https://example.org/user/repo.hg");
        assert_eq!(discovered.vcs, "hg");
    }

    #[test]
    fn several_suffixes_are_ambiguous() {
        let error = KnownHostDiscovery::new()
            .discover("example.org/a.git/b.hg/c")
            .unwrap_err();
        assert_eq!(
            error,
            DiscoveryError::Ambiguous {
                import_path: "example.org/a.git/b.hg/c".to_owned(),
                candidates: vec![
                    "example.org/a.git".to_owned(),
                    "example.org/a.git/b.hg".to_owned()
                ],
            }
        );
    }

    #[test]
    fn dot_segments_have_no_metadata() {
        let discovery = KnownHostDiscovery::new();
        for import_path in ["github.com/../..", "github.com/acme/..", "example.org/./repo.git"] {
            let error = discovery.discover(import_path).unwrap_err();
            assert!(matches!(error, DiscoveryError::NoMetadata { .. }), "{import_path}");
        }
        let discovered = discovery.discover("github.com/acme/.github").unwrap();
        assert_eq!(discovered.root, "github.com/acme/.github");
    }

    #[test]
    fn single_segment_has_no_metadata() {
        let error = KnownHostDiscovery::new()
            .discover("camlistore.org")
            .unwrap_err();
        assert!(matches!(error, DiscoveryError::NoMetadata { .. }));
    }

    #[test]
    fn custom_host() {
        let mut discovery = KnownHostDiscovery::new();
        discovery.add_host("git.example.com", "git");
        let discovered = discovery.discover("git.example.com/team/repo/pkg").unwrap();
        assert_eq!(discovered.root, "git.example.com/team/repo");
    }
}
