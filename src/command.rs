use std::{
    io,
    path::Path,
    process::{Command, ExitStatus, Stdio},
    sync::Arc,
};

use log::trace;
use regex_lite::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CommandError {
    #[error("Could not run `{command}`: {source}")]
    Launch {
        command: String,
        source: Arc<io::Error>,
    },
    #[error("`{command}` failed with {status}: {output}")]
    Failed {
        command: String,
        status: ExitStatus,
        output: String,
    },
    #[error("Output of `{command}` did not match the expected format: {output:?}")]
    Parse { command: String, output: String },
    #[error("Invalid extraction pattern for command {name}: {message}")]
    Pattern { name: String, message: String },
}

impl CommandError {
    /// The program could not be started or exited with a failure status.
    pub fn is_execution(&self) -> bool {
        matches!(self, CommandError::Launch { .. } | CommandError::Failed { .. })
    }

    /// The program succeeded but its output was not in the expected format.
    pub fn is_parse(&self) -> bool {
        matches!(self, CommandError::Parse { .. })
    }
}

/// A named external command whose trimmed output is parsed by a regular
/// expression. The first capture group of the pattern is the result.
#[derive(Debug, Clone)]
pub struct CommandTemplate {
    name: String,
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    pattern: Regex,
}

impl CommandTemplate {
    pub fn new<I, S>(
        name: impl Into<String>,
        program: impl Into<String>,
        args: I,
        pattern: &str,
    ) -> Result<CommandTemplate, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|error| CommandError::Pattern {
            name: name.clone(),
            message: error.to_string(),
        })?;
        if pattern.captures_len() < 2 {
            return Err(CommandError::Pattern {
                name,
                message: "pattern has no capture group".to_owned(),
            });
        }
        Ok(CommandTemplate {
            name,
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
            pattern,
        })
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, env: &[(String, String)]) -> Self {
        self.env = env.to_vec();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn exec(&self, dir: &Path) -> Result<String, CommandError> {
        self.exec_with(dir, &[])
    }

    /// Runs the command in `dir` after replacing each `{key}` in the argument
    /// template with its value from `vars`.
    pub fn exec_with(&self, dir: &Path, vars: &[(&str, &str)]) -> Result<String, CommandError> {
        let args = expand(&self.args, vars);
        let output = run(&self.program, &args, dir, &self.env)?;
        self.pattern
            .captures(&output)
            .and_then(|captures| captures.get(1))
            .map(|capture| capture.as_str().to_owned())
            .ok_or_else(|| CommandError::Parse {
                command: command_line(&self.program, &args),
                output,
            })
    }

    /// Runs the command and applies the pattern to every output line,
    /// collecting the first capture of each matching line in order.
    pub fn exec_lines(&self, dir: &Path) -> Result<Vec<String>, CommandError> {
        let args = expand(&self.args, &[]);
        let output = run(&self.program, &args, dir, &self.env)?;
        let values: Vec<String> = output
            .lines()
            .filter_map(|line| self.pattern.captures(line.trim()))
            .filter_map(|captures| captures.get(1).map(|c| c.as_str().to_owned()))
            .collect();
        if values.is_empty() && !output.is_empty() {
            return Err(CommandError::Parse {
                command: command_line(&self.program, &args),
                output,
            });
        }
        Ok(values)
    }
}

/// Replaces `{key}` placeholders in every argument.
pub fn expand(args: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            vars.iter().fold(arg.clone(), |arg, (key, value)| {
                arg.replace(&format!("{{{key}}}"), value)
            })
        })
        .collect()
}

/// Runs `program` in `dir` and returns its trimmed output, stdout followed by
/// stderr. Nothing is returned unless the program exits successfully.
pub fn run(
    program: &str,
    args: &[String],
    dir: &Path,
    env: &[(String, String)],
) -> Result<String, CommandError> {
    let command = command_line(program, args);
    trace!("Running `{}` in {}", command, dir.display());

    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .envs(env.iter().map(|(key, value)| (key, value)))
        .stdin(Stdio::null())
        .output()
        .map_err(|error| CommandError::Launch {
            command: command.clone(),
            source: Arc::new(error),
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    let text = text.trim().to_owned();

    if !output.status.success() {
        return Err(CommandError::Failed {
            command,
            status: output.status,
            output: text,
        });
    }
    Ok(text)
}

fn command_line(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_owned()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
