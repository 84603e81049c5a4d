use std::{fs, path::Path};

use log::{debug, trace};

use crate::command::{expand, run, CommandError, CommandTemplate};

use super::VcsError;

/// How to drive one version control tool.
///
/// Argument templates may use `{repo}`, `{dir}`, `{tag}` and `{branch}`
/// placeholders.
#[derive(Debug, Clone)]
pub struct VcsTool {
    pub name: String,
    pub program: String,
    /// Control directory that marks a checkout, e.g. `.git`.
    pub marker: String,
    pub create: Vec<String>,
    pub download: Vec<String>,
    /// Tried in order to turn a requested tag into something `tag_sync`
    /// accepts.
    pub tag_lookup: Vec<CommandTemplate>,
    pub tag_sync: Vec<String>,
    pub tag_sync_default: Vec<String>,
    /// Switches the working copy onto a named branch so that `download`
    /// advances it. Empty when `download` alone updates the checkout.
    pub branch_sync: Vec<String>,
    pub ping: Vec<String>,
    pub env: Vec<(String, String)>,
}

/// Git prints `<hash> refs/...` per line; the first matching line wins.
const GIT_TAG_LOOKUP_PATTERN: &str = r"(?m)((?:tags|origin)/\S+)$";

fn args(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

impl VcsTool {
    pub fn git() -> VcsTool {
        let env = vec![("GIT_TERMINAL_PROMPT".to_owned(), "0".to_owned())];
        let tag_lookup = CommandTemplate::new(
            "git-tag-lookup",
            "git",
            ["show-ref", "tags/{tag}", "origin/{tag}"],
            GIT_TAG_LOOKUP_PATTERN,
        )
        .expect("built-in git pattern")
        .with_env(&env);
        VcsTool {
            name: "git".to_owned(),
            program: "git".to_owned(),
            marker: ".git".to_owned(),
            create: args(&["clone", "--", "{repo}", "{dir}"]),
            download: args(&["pull", "--ff-only"]),
            tag_lookup: vec![tag_lookup],
            tag_sync: args(&["checkout", "{tag}"]),
            tag_sync_default: Vec::new(),
            branch_sync: args(&["checkout", "{branch}"]),
            ping: args(&["ls-remote", "--", "{repo}"]),
            env,
        }
    }

    pub fn hg() -> VcsTool {
        VcsTool {
            name: "hg".to_owned(),
            program: "hg".to_owned(),
            marker: ".hg".to_owned(),
            create: args(&["clone", "-U", "--", "{repo}", "{dir}"]),
            download: args(&["pull", "--update"]),
            tag_lookup: Vec::new(),
            tag_sync: args(&["update", "-r", "{tag}"]),
            tag_sync_default: args(&["update", "default"]),
            branch_sync: args(&["update", "{branch}"]),
            ping: args(&["identify", "--", "{repo}"]),
            env: Vec::new(),
        }
    }

    pub fn bzr() -> VcsTool {
        VcsTool {
            name: "bzr".to_owned(),
            program: "bzr".to_owned(),
            marker: ".bzr".to_owned(),
            create: args(&["branch", "--", "{repo}", "{dir}"]),
            download: args(&["pull"]),
            tag_lookup: Vec::new(),
            tag_sync: args(&["update", "-r", "{tag}"]),
            tag_sync_default: args(&["update", "-r", "revno:-1"]),
            branch_sync: Vec::new(),
            ping: args(&["info", "--", "{repo}"]),
            env: Vec::new(),
        }
    }

    pub fn svn() -> VcsTool {
        VcsTool {
            name: "svn".to_owned(),
            program: "svn".to_owned(),
            marker: ".svn".to_owned(),
            create: args(&["checkout", "--", "{repo}", "{dir}"]),
            download: args(&["update"]),
            tag_lookup: Vec::new(),
            tag_sync: Vec::new(),
            tag_sync_default: Vec::new(),
            branch_sync: Vec::new(),
            ping: args(&["info", "--", "{repo}"]),
            env: Vec::new(),
        }
    }

    /// Whether `dir` holds this tool's control directory. A `dir` that runs
    /// through a regular file holds nothing.
    pub fn is_checkout(&self, dir: &Path) -> Result<bool, VcsError> {
        let marker = dir.join(&self.marker);
        match marker.try_exists() {
            Ok(exists) => Ok(exists),
            Err(_) if crosses_file(dir) => Ok(false),
            Err(error) => Err(VcsError::io(&marker, error)),
        }
    }

    /// Clones `repo` into `dir`, running from the parent directory.
    pub fn create(&self, dir: &Path, repo: &str) -> Result<(), VcsError> {
        let parent = dir.parent().unwrap_or(dir);
        fs::create_dir_all(parent).map_err(|error| VcsError::io(parent, error))?;
        let target = dir.to_string_lossy().into_owned();
        let args = expand(&self.create, &[("repo", repo), ("dir", target.as_str())]);
        run(&self.program, &args, parent, &self.env)?;
        Ok(())
    }

    pub fn download(&self, dir: &Path) -> Result<(), VcsError> {
        if self.download.is_empty() {
            return Err(self.unsupported("download"));
        }
        run(&self.program, &self.download, dir, &self.env)?;
        Ok(())
    }

    /// Moves the checkout in `dir` to `tag`, or to the default tip when `tag`
    /// is empty.
    pub fn tag_sync(&self, dir: &Path, tag: &str) -> Result<(), VcsError> {
        if tag.is_empty() {
            if !self.tag_sync_default.is_empty() {
                run(&self.program, &self.tag_sync_default, dir, &self.env)?;
            }
            return Ok(());
        }
        if self.tag_sync.is_empty() {
            return Err(self.unsupported("revision sync"));
        }

        let mut target = tag.to_owned();
        for lookup in &self.tag_lookup {
            match lookup.exec_with(dir, &[("tag", tag)]) {
                Ok(found) => {
                    debug!("{} resolved {} to {}", lookup.name(), tag, found);
                    target = found;
                    break;
                }
                Err(error @ (CommandError::Parse { .. } | CommandError::Failed { .. })) => {
                    trace!("{} found nothing for {}: {}", lookup.name(), tag, error);
                }
                Err(error) => return Err(error.into()),
            }
        }

        let args = expand(&self.tag_sync, &[("tag", target.as_str())]);
        run(&self.program, &args, dir, &self.env)?;
        Ok(())
    }

    /// Puts the checkout in `dir` on `branch` ahead of a `download`.
    pub fn branch_sync(&self, dir: &Path, branch: &str) -> Result<(), VcsError> {
        if branch.is_empty() {
            return self.tag_sync(dir, "");
        }
        if self.branch_sync.is_empty() {
            debug!("{} has no branch switch, updating in place", self.name);
            return Ok(());
        }
        let args = expand(&self.branch_sync, &[("branch", branch)]);
        run(&self.program, &args, dir, &self.env)?;
        Ok(())
    }

    /// Checks that `repo` is reachable without fetching it.
    pub fn ping(&self, dir: &Path, repo: &str) -> Result<(), VcsError> {
        if self.ping.is_empty() {
            return Err(self.unsupported("remote probe"));
        }
        let args = expand(&self.ping, &[("repo", repo)]);
        run(&self.program, &args, dir, &self.env)?;
        Ok(())
    }

    fn unsupported(&self, operation: &'static str) -> VcsError {
        VcsError::Unsupported {
            tool: self.name.clone(),
            operation,
        }
    }
}

/// Whether the nearest existing ancestor of `path` is something other than
/// a directory.
fn crosses_file(path: &Path) -> bool {
    path.ancestors()
        .find_map(|ancestor| fs::metadata(ancestor).ok())
        .is_some_and(|metadata| !metadata.is_dir())
}
