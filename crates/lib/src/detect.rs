//! Build-system detection.
//!
//! Inspects an acquired source tree and classifies how it is built. A tree
//! without an autogen script, a configure script or a Makefile stays
//! [`Detection::Unknown`] so a later call (for instance after a prelude command
//! generated a `configure` script) may detect again. Once any of them is found
//! the result is cached and returned as-is.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BuildError, Result};

pub const AUTOGEN_SCRIPTS: [&str; 2] = ["autogen.sh", "autogen.pl"];
pub const CONFIGURE_SCRIPT: &str = "configure";
pub const MAKEFILES: [&str; 2] = ["Makefile", "makefile"];

/// What a source tree provides to build itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSystem {
  pub has_autogen: bool,
  pub has_configure: bool,
  pub has_make_install: bool,
  /// A `Makefile` was found at the top of the tree.
  pub has_makefile: bool,
}

impl BuildSystem {
  fn is_conclusive(&self) -> bool {
    self.has_autogen || self.has_configure || self.has_make_install || self.has_makefile
  }
}

/// Per-component detection state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Detection {
  #[default]
  Unknown,
  Detected(BuildSystem),
}

impl Detection {
  /// Detect the build system of `src_dir` unless a conclusive result is cached.
  pub fn detect(&mut self, src_dir: &Path) -> Result<BuildSystem> {
    if let Detection::Detected(system) = self {
      return Ok(*system);
    }
    let system = inspect(src_dir)?;
    if system.is_conclusive() {
      *self = Detection::Detected(system);
    }
    debug!(src_dir = ?src_dir, ?system, "detected build system");
    Ok(system)
  }

  /// The cached result, or an empty [`BuildSystem`] when nothing was detected.
  pub fn system(&self) -> BuildSystem {
    match self {
      Detection::Detected(system) => *system,
      Detection::Unknown => BuildSystem::default(),
    }
  }
}

/// Classify `src_dir`, first match wins: autogen script, configure script, Makefile.
pub fn inspect(src_dir: &Path) -> Result<BuildSystem> {
  if AUTOGEN_SCRIPTS.iter().any(|s| src_dir.join(s).is_file()) {
    return Ok(BuildSystem {
      has_autogen: true,
      has_configure: true,
      has_make_install: true,
      has_makefile: false,
    });
  }

  if src_dir.join(CONFIGURE_SCRIPT).is_file() {
    return Ok(BuildSystem {
      has_autogen: false,
      has_configure: true,
      has_make_install: true,
      has_makefile: false,
    });
  }

  if let Some(makefile) = find_makefile_in(src_dir) {
    return Ok(BuildSystem {
      has_make_install: makefile_has_target(&makefile, "install")?,
      has_makefile: true,
      ..BuildSystem::default()
    });
  }

  Ok(BuildSystem::default())
}

/// The autogen script present in `src_dir`, if any.
pub fn autogen_script(src_dir: &Path) -> Option<PathBuf> {
  AUTOGEN_SCRIPTS
    .iter()
    .map(|s| src_dir.join(s))
    .find(|p| p.is_file())
}

/// `Makefile` or `makefile` directly inside `dir`.
pub fn find_makefile_in(dir: &Path) -> Option<PathBuf> {
  MAKEFILES.iter().map(|m| dir.join(m)).find(|p| p.is_file())
}

/// Whether `makefile` has a line starting with `<target>:`.
pub fn makefile_has_target(makefile: &Path, target: &str) -> Result<bool> {
  let file = File::open(makefile).map_err(|e| BuildError::io(makefile, e))?;
  let rule = format!("{target}:");
  for line in BufReader::new(file).lines() {
    let line = line.map_err(|e| BuildError::io(makefile, e))?;
    if line.starts_with(&rule) {
      return Ok(true);
    }
  }
  Ok(false)
}
