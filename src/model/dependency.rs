use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::{import_path::validate_import_path, ParseError};

/// Desired source of one package: where its repository lives and which
/// revision should be checked out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDependency")]
pub struct Dependency {
    root: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    source_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    branch: Option<String>,
}

#[derive(Deserialize)]
struct RawDependency {
    root: String,
    source_path: Option<String>,
    revision: Option<String>,
    branch: Option<String>,
}

impl TryFrom<RawDependency> for Dependency {
    type Error = ParseError;

    fn try_from(raw: RawDependency) -> Result<Self, Self::Error> {
        let mut dep = Dependency::new(raw.root)?;
        if let Some(source_path) = raw.source_path {
            dep = dep.with_source_path(source_path);
        }
        if let Some(revision) = raw.revision {
            dep = dep.with_revision(revision);
        }
        if let Some(branch) = raw.branch {
            dep = dep.with_branch(branch);
        }
        Ok(dep)
    }
}

impl Dependency {
    pub fn new(root: impl Into<String>) -> Result<Dependency, ParseError> {
        let root = root.into();
        if root.is_empty() {
            return Err(ParseError::EmptyRoot);
        }
        validate_import_path(&root)?;
        Ok(Dependency {
            root,
            source_path: None,
            revision: None,
            branch: None,
        })
    }

    pub fn with_source_path(mut self, source_path: impl Into<String>) -> Self {
        self.source_path = Some(source_path.into()).filter(|s| !s.is_empty());
        self
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into()).filter(|s| !s.is_empty());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into()).filter(|s| !s.is_empty());
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }
}

impl Display for Dependency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.root)?;
        if let Some(source_path) = &self.source_path {
            write!(f, " ({source_path})")?;
        }
        match (&self.branch, &self.revision) {
            (Some(branch), Some(revision)) => write!(f, " {branch}@{revision}"),
            (Some(branch), None) => write!(f, " {branch}"),
            (None, Some(revision)) => write!(f, " @{revision}"),
            (None, None) => Ok(()),
        }
    }
}
