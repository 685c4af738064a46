//! External process execution.
//!
//! Every build step of a component is an external command: fetch tools, `tar`,
//! `git`, `configure`, `make`. [`CommandSpec`] describes one invocation and a
//! [`Runner`] executes it, blocking until the child exits.

mod manifest;

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::env::EnvMap;
use crate::error::{BuildError, Result};

pub use manifest::{ManifestTarget, manifest_path, write_manifest};

/// A single external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
  pub program: PathBuf,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  /// Overlaid on the environment inherited from the current process.
  pub env: EnvMap,
  pub manifest: Option<ManifestTarget>,
}

impl CommandSpec {
  pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.into(),
      env: EnvMap::new(),
      manifest: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, env: &EnvMap) -> Self {
    self.env = env.clone();
    self
  }

  /// Record this command under `<dir>/<name>.manifest` when the runner keeps manifests.
  pub fn manifest(mut self, dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
    self.manifest = Some(ManifestTarget {
      dir: dir.into(),
      name: name.into(),
    });
    self
  }

  /// The command line as a single space-separated string.
  pub fn command_line(&self) -> String {
    let mut line = self.program.to_string_lossy().to_string();
    for arg in &self.args {
      line.push(' ');
      line.push_str(arg);
    }
    line
  }
}

impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.command_line())
  }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
  pub stdout: String,
  pub stderr: String,
}

/// Executes external commands on behalf of the orchestrator.
pub trait Runner {
  /// Run `cmd` to completion. A non-zero exit is a [`BuildError::ProcessFailure`].
  fn run(&self, cmd: &CommandSpec) -> Result<Output>;

  /// Locate `tool`, searching the `PATH` of `env` before the process `PATH`.
  fn find_tool(&self, tool: &str, env: &EnvMap) -> Result<PathBuf>;
}

/// Runs commands on the host with `std::process`.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
  record_manifests: bool,
}

impl SystemRunner {
  pub fn new(record_manifests: bool) -> Self {
    Self { record_manifests }
  }
}

impl Runner for SystemRunner {
  fn run(&self, cmd: &CommandSpec) -> Result<Output> {
    info!(cmd = %cmd, cwd = ?cmd.cwd, "executing command");

    if self.record_manifests
      && let Some(target) = &cmd.manifest
    {
      write_manifest(target, cmd)?;
    }

    let output = Command::new(&cmd.program)
      .args(&cmd.args)
      .current_dir(&cmd.cwd)
      .envs(cmd.env.iter())
      .output()
      .map_err(|e| match e.kind() {
        ErrorKind::NotFound => BuildError::ToolMissing {
          tool: cmd.program.to_string_lossy().to_string(),
        },
        _ => BuildError::io(&cmd.program, e),
      })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
      return Err(BuildError::ProcessFailure {
        cmd: cmd.command_line(),
        code: output.status.code(),
        stdout,
        stderr,
      });
    }

    if !stdout.is_empty() {
      debug!(stdout = %stdout.trim_end(), "command stdout");
    }
    if !stderr.is_empty() {
      debug!(stderr = %stderr.trim_end(), "command stderr");
    }

    Ok(Output { stdout, stderr })
  }

  fn find_tool(&self, tool: &str, env: &EnvMap) -> Result<PathBuf> {
    lookup_tool(tool, env)
  }
}

/// Resolve `tool` to an executable path.
///
/// Paths containing a separator are checked as-is. Bare names are searched in the
/// `PATH` entry of `env` first, then in the process `PATH`.
pub fn lookup_tool(tool: &str, env: &EnvMap) -> Result<PathBuf> {
  let missing = || BuildError::ToolMissing { tool: tool.to_string() };

  if tool.contains(std::path::MAIN_SEPARATOR) {
    let path = Path::new(tool);
    return if path.is_file() { Ok(path.to_path_buf()) } else { Err(missing()) };
  }

  if let Some(search) = env.get(crate::env::PATH_VAR) {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if let Ok(found) = which::which_in(tool, Some(search), cwd) {
      return Ok(found);
    }
  }

  which::which(tool).map_err(|_| missing())
}
