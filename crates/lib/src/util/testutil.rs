//! Test utilities for stackbuild-lib.
//!
//! [`RecordingRunner`] stands in for the host so tests can assert on the exact
//! commands the orchestrator would run without needing real build tools.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::env::EnvMap;
use crate::error::{BuildError, Result};
use crate::exec::{CommandSpec, Output, Runner};

type Hook = Box<dyn Fn(&CommandSpec) -> Result<()>>;

/// A runner that records every command and succeeds without executing anything.
#[derive(Default)]
pub struct RecordingRunner {
  commands: RefCell<Vec<CommandSpec>>,
  missing_tools: HashSet<String>,
  hook: Option<Hook>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Pretend `tool` is not installed.
  pub fn without_tool(mut self, tool: &str) -> Self {
    self.missing_tools.insert(tool.to_string());
    self
  }

  /// Run `hook` for every command, e.g. to simulate files a command would create.
  pub fn with_hook(mut self, hook: impl Fn(&CommandSpec) -> Result<()> + 'static) -> Self {
    self.hook = Some(Box::new(hook));
    self
  }

  pub fn commands(&self) -> Vec<CommandSpec> {
    self.commands.borrow().clone()
  }

  pub fn command_lines(&self) -> Vec<String> {
    self.commands.borrow().iter().map(CommandSpec::command_line).collect()
  }

  /// The first recorded command whose program file name is `name`.
  pub fn find(&self, name: &str) -> Option<CommandSpec> {
    self
      .commands
      .borrow()
      .iter()
      .find(|c| c.program.file_name().is_some_and(|f| f == name))
      .cloned()
  }
}

impl Runner for RecordingRunner {
  fn run(&self, cmd: &CommandSpec) -> Result<Output> {
    self.commands.borrow_mut().push(cmd.clone());
    if let Some(hook) = &self.hook {
      hook(cmd)?;
    }
    Ok(Output::default())
  }

  fn find_tool(&self, tool: &str, _env: &EnvMap) -> Result<PathBuf> {
    if self.missing_tools.contains(tool) {
      return Err(BuildError::ToolMissing { tool: tool.to_string() });
    }
    Ok(PathBuf::from(tool))
  }
}

/// Extract the value of a `--prefix=` argument from a configure command.
pub fn configure_prefix(cmd: &CommandSpec) -> Option<PathBuf> {
  cmd
    .args
    .iter()
    .find_map(|a| a.strip_prefix("--prefix="))
    .map(PathBuf::from)
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
}

/// Returns true when every tool in `tools` is available on the host.
pub fn have_tools(tools: &[&str]) -> bool {
  tools.iter().all(|t| which::which(t).is_ok())
}
