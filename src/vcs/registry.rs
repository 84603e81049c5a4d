use std::{collections::HashMap, sync::Arc};

use crate::command::CommandTemplate;

use super::VcsTool;

/// Tools and tool specific query commands, keyed by tool name.
///
/// Build and extend it before sharing it behind an `Arc`; resolvers and
/// handles only read from it.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    tools: Vec<Arc<VcsTool>>,
    revisions: HashMap<String, CommandTemplate>,
    branches: HashMap<String, CommandTemplate>,
    sources: HashMap<String, CommandTemplate>,
}

fn builtin(name: &str, program: &str, args: &[&str], pattern: &str) -> CommandTemplate {
    CommandTemplate::new(name, program, args.iter().copied(), pattern)
        .expect("built-in command pattern must compile")
}

impl CommandRegistry {
    pub fn empty() -> CommandRegistry {
        CommandRegistry {
            tools: Vec::new(),
            revisions: HashMap::new(),
            branches: HashMap::new(),
            sources: HashMap::new(),
        }
    }

    /// Adds a tool, replacing a registered tool of the same name in place.
    pub fn register_tool(&mut self, tool: VcsTool) -> &mut Self {
        let tool = Arc::new(tool);
        match self.tools.iter_mut().find(|t| t.name == tool.name) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
        self
    }

    pub fn register_revision(
        &mut self,
        tool: impl Into<String>,
        template: CommandTemplate,
    ) -> &mut Self {
        self.revisions.insert(tool.into(), template);
        self
    }

    pub fn register_branches(
        &mut self,
        tool: impl Into<String>,
        template: CommandTemplate,
    ) -> &mut Self {
        self.branches.insert(tool.into(), template);
        self
    }

    pub fn register_source(
        &mut self,
        tool: impl Into<String>,
        template: CommandTemplate,
    ) -> &mut Self {
        self.sources.insert(tool.into(), template);
        self
    }

    pub fn tool(&self, name: &str) -> Option<Arc<VcsTool>> {
        self.tools.iter().find(|t| t.name == name).cloned()
    }

    /// Registered tools in registration order.
    pub fn tools(&self) -> impl Iterator<Item = &Arc<VcsTool>> {
        self.tools.iter()
    }

    pub fn revision(&self, tool: &str) -> Option<&CommandTemplate> {
        self.revisions.get(tool)
    }

    pub fn branches(&self, tool: &str) -> Option<&CommandTemplate> {
        self.branches.get(tool)
    }

    pub fn source(&self, tool: &str) -> Option<&CommandTemplate> {
        self.sources.get(tool)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        let mut registry = CommandRegistry::empty();
        registry
            .register_tool(VcsTool::git())
            .register_tool(VcsTool::hg())
            .register_tool(VcsTool::bzr())
            .register_tool(VcsTool::svn());

        registry
            .register_revision("git", builtin("git-rev", "git", &["rev-parse", "HEAD"], r"^(\S+)$"))
            .register_revision("hg", builtin("hg-rev", "hg", &["id", "-i"], r"^([0-9a-f]+)\+?$"))
            .register_revision("bzr", builtin("bzr-rev", "bzr", &["revno"], r"^(\S+)$"))
            .register_revision("svn", builtin("svn-rev", "svnversion", &["."], r"^(\S+)$"));

        // The checked out branch sorts first.
        registry
            .register_branches(
                "git",
                builtin(
                    "git-branches",
                    "git",
                    &["for-each-ref", "--sort=-HEAD", "--format=%(refname:short)", "refs/heads/"],
                    r"^(\S+)$",
                ),
            )
            .register_branches("hg", builtin("hg-branches", "hg", &["branch"], r"^(\S+)$"))
            .register_branches("bzr", builtin("bzr-branches", "bzr", &["nick"], r"^(\S+)$"));

        registry
            .register_source(
                "git",
                builtin("git-source", "git", &["config", "--get", "remote.origin.url"], r"^(\S+)$"),
            )
            .register_source("hg", builtin("hg-source", "hg", &["paths", "default"], r"^(\S+)$"))
            .register_source(
                "bzr",
                builtin("bzr-source", "bzr", &["config", "parent_location"], r"^(\S+)$"),
            )
            .register_source(
                "svn",
                builtin("svn-source", "svn", &["info", "--show-item", "url"], r"^(\S+)$"),
            );

        registry
    }
}
