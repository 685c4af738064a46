//! Error types for stack installation.
//!
//! Every failure in the orchestrator is fatal: nothing is retried and the first
//! failing component aborts the whole stack.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::reference::ReferenceError;

/// Orchestration phase a component was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Prepared,
  Acquired,
  Detected,
  Built,
  Recorded,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Phase::Prepared => "prepare",
      Phase::Acquired => "acquire",
      Phase::Detected => "detect",
      Phase::Built => "build",
      Phase::Recorded => "record",
    };
    f.write_str(name)
  }
}

/// Errors that can occur while loading, building, or installing a stack.
#[derive(Debug, Error)]
pub enum BuildError {
  /// Malformed or missing configuration documents, or undefined required fields.
  #[error("configuration error: {0}")]
  Config(String),

  /// A required external binary could not be found.
  #[error("required tool '{tool}' not found on PATH")]
  ToolMissing { tool: String },

  /// The source URL scheme is not recognized.
  #[error("unsupported source URL: {url}")]
  UnsupportedSource { url: String },

  /// No configure script, Makefile, or custom build script was found.
  #[error("no build mechanism found for {component} in {}", src_dir.display())]
  NoBuildMechanism { component: String, src_dir: PathBuf },

  /// An external command exited with a non-zero status.
  #[error("command failed with exit code {code:?}: {cmd} - stdout: {stdout} - stderr: {stderr}")]
  ProcessFailure {
    cmd: String,
    code: Option<i32>,
    stdout: String,
    stderr: String,
  },

  /// Unpacking an archive produced an ambiguous directory layout.
  #[error("inconsistent layout in {}: expected a single unpacked directory, found {entries:?}", dir.display())]
  AmbiguousLayout { dir: PathBuf, entries: Vec<String> },

  /// A reference token could not be parsed.
  #[error("malformed reference: {0}")]
  Reference(#[from] ReferenceError),

  /// I/O error, annotated with the path involved.
  #[error("io error on {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A component failed; wraps the underlying error.
  #[error("unable to install {component} ({phase} phase): {source}")]
  Component {
    component: String,
    phase: Phase,
    #[source]
    source: Box<BuildError>,
  },
}

impl BuildError {
  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    BuildError::Io {
      path: path.into(),
      source,
    }
  }

  pub(crate) fn in_component(self, component: &str, phase: Phase) -> Self {
    BuildError::Component {
      component: component.to_string(),
      phase,
      source: Box::new(self),
    }
  }

  /// Returns the innermost error, unwrapping component wrappers.
  pub fn root_cause(&self) -> &BuildError {
    match self {
      BuildError::Component { source, .. } => source.root_cause(),
      other => other,
    }
  }
}

pub type Result<T> = std::result::Result<T, BuildError>;
