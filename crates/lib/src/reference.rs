//! Reference tokens.
//!
//! Configuration strings may point at the directories of components installed
//! earlier in the stack, e.g. `FOO_LIB_DIR=@ref:foo_install_dir@/lib`. The body
//! of a reference is `<component>_<kind>`: the component name is everything
//! before the first underscore, the kind everything after it.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::consts::{REF_END, REF_START};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
  #[error("unable to find start delimiter '@ref:' in {0}")]
  MissingStart(String),

  #[error("unable to find end delimiter '@' in {0}")]
  MissingEnd(String),

  #[error("reference '{0}' is not of the form <component>_<kind>")]
  Malformed(String),

  #[error("unknown reference kind '{kind}' in {token} (expected install_dir, build_dir or src_dir)")]
  UnknownKind { kind: String, token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
  InstallDir,
  BuildDir,
  SrcDir,
}

impl RefKind {
  pub fn as_str(self) -> &'static str {
    match self {
      RefKind::InstallDir => "install_dir",
      RefKind::BuildDir => "build_dir",
      RefKind::SrcDir => "src_dir",
    }
  }

  fn parse(kind: &str) -> Option<Self> {
    match kind {
      "install_dir" => Some(RefKind::InstallDir),
      "build_dir" => Some(RefKind::BuildDir),
      "src_dir" => Some(RefKind::SrcDir),
      _ => None,
    }
  }
}

impl fmt::Display for RefKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A parsed reference together with the byte span it occupies in its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
  pub component: String,
  pub kind: RefKind,
  /// Start of the start marker.
  pub start: usize,
  /// One past the end marker.
  pub end: usize,
}

impl Reference {
  /// Parse the first reference embedded in `token`.
  pub fn parse(token: &str) -> Result<Self, ReferenceError> {
    let start = token
      .find(REF_START)
      .ok_or_else(|| ReferenceError::MissingStart(token.to_string()))?;
    let body_start = start + REF_START.len();
    let body_len = token[body_start..]
      .find(REF_END)
      .ok_or_else(|| ReferenceError::MissingEnd(token.to_string()))?;
    let body = &token[body_start..body_start + body_len];

    let (component, kind) = body
      .split_once('_')
      .filter(|(component, kind)| !component.is_empty() && !kind.is_empty())
      .ok_or_else(|| ReferenceError::Malformed(body.to_string()))?;
    let kind = RefKind::parse(kind).ok_or_else(|| ReferenceError::UnknownKind {
      kind: kind.to_string(),
      token: token.to_string(),
    })?;

    Ok(Self {
      component: component.to_string(),
      kind,
      start,
      end: body_start + body_len + REF_END.len_utf8(),
    })
  }
}

/// Whether `token` contains a reference start marker.
pub fn has_reference(token: &str) -> bool {
  token.contains(REF_START)
}

/// Directories of every component processed so far, keyed by component name.
///
/// Entries are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionMap {
  installed: HashMap<String, PathBuf>,
  built: HashMap<String, PathBuf>,
  sources: HashMap<String, PathBuf>,
}

impl ResolutionMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&mut self, component: &str, install_dir: PathBuf, build_dir: PathBuf, src_dir: PathBuf) {
    self.installed.insert(component.to_string(), install_dir);
    self.built.insert(component.to_string(), build_dir);
    self.sources.insert(component.to_string(), src_dir);
  }

  pub fn get(&self, component: &str, kind: RefKind) -> Option<&Path> {
    let map = match kind {
      RefKind::InstallDir => &self.installed,
      RefKind::BuildDir => &self.built,
      RefKind::SrcDir => &self.sources,
    };
    map.get(component).map(PathBuf::as_path)
  }

  pub fn install_dir(&self, component: &str) -> Option<&Path> {
    self.get(component, RefKind::InstallDir)
  }

  pub fn contains(&self, component: &str) -> bool {
    self.installed.contains_key(component)
  }

  pub fn len(&self) -> usize {
    self.installed.len()
  }

  pub fn is_empty(&self) -> bool {
    self.installed.is_empty()
  }
}

/// Replace the reference embedded in `token` with the path it names.
///
/// A reference to a component that is not in `map` yet is left untouched and
/// reported with a warning.
pub fn resolve(token: &str, map: &ResolutionMap) -> Result<String, ReferenceError> {
  let reference = Reference::parse(token)?;
  let Some(path) = map.get(&reference.component, reference.kind) else {
    warn!(
      token,
      component = %reference.component,
      kind = %reference.kind,
      "unresolved reference, component not installed yet"
    );
    return Ok(token.to_string());
  };

  let mut resolved = String::with_capacity(token.len());
  resolved.push_str(&token[..reference.start]);
  resolved.push_str(&path.to_string_lossy());
  resolved.push_str(&token[reference.end..]);
  Ok(resolved)
}
