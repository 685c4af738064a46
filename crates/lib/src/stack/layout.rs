//! On-disk layout of an installed stack.
//!
//! ```text
//! <install_dir>/<stack>/
//!   scratch/
//!   install/<component>/
//!   build/<component>/<unpacked dir>/
//!   src/<dir containing the component name>/
//!   modulefiles/<component>
//! ```

use std::path::{Path, PathBuf};

use crate::consts::{BUILD_DIR, INSTALL_COMPLETE_MARKER, INSTALL_DIR, MODULEFILES_DIR, SCRATCH_DIR, SRC_DIR};
use crate::error::Result;
use crate::util::fs::{ensure_dir, list_entries};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLayout {
  base: PathBuf,
}

impl StackLayout {
  pub fn new(base: impl Into<PathBuf>) -> Self {
    Self { base: base.into() }
  }

  pub fn base(&self) -> &Path {
    &self.base
  }

  pub fn scratch_dir(&self) -> PathBuf {
    self.base.join(SCRATCH_DIR)
  }

  pub fn install_dir(&self) -> PathBuf {
    self.base.join(INSTALL_DIR)
  }

  pub fn build_dir(&self) -> PathBuf {
    self.base.join(BUILD_DIR)
  }

  pub fn src_dir(&self) -> PathBuf {
    self.base.join(SRC_DIR)
  }

  pub fn modulefiles_dir(&self) -> PathBuf {
    self.base.join(MODULEFILES_DIR)
  }

  /// Create the stack base and its four subdirectories. Existing directories are fine.
  pub fn ensure(&self) -> Result<()> {
    ensure_dir(&self.base)?;
    for dir in [self.scratch_dir(), self.install_dir(), self.build_dir(), self.src_dir()] {
      ensure_dir(&dir)?;
    }
    Ok(())
  }

  pub fn component_install_dir(&self, name: &str) -> PathBuf {
    self.install_dir().join(name)
  }

  pub fn completion_marker(&self, name: &str) -> PathBuf {
    self.component_install_dir(name).join(INSTALL_COMPLETE_MARKER)
  }

  pub fn is_installed(&self, name: &str) -> bool {
    self.completion_marker(name).is_file()
  }

  /// The first directory inside `build/<name>/`, e.g. the unpacked tarball.
  ///
  /// Returns `Ok(None)` when the component was never built here (e.g. an imported stack).
  pub fn component_build_dir(&self, name: &str) -> Result<Option<PathBuf>> {
    let dir = self.build_dir().join(name);
    if !dir.is_dir() {
      return Ok(None);
    }
    Ok(
      list_entries(&dir)?
        .into_iter()
        .map(|entry| dir.join(entry))
        .find(|path| path.is_dir()),
    )
  }

  /// The first entry of `src/` whose name contains `name`.
  pub fn component_src_dir(&self, name: &str) -> Result<Option<PathBuf>> {
    let dir = self.src_dir();
    if !dir.is_dir() {
      return Ok(None);
    }
    Ok(
      list_entries(&dir)?
        .into_iter()
        .find(|entry| entry.contains(name))
        .map(|entry| dir.join(entry)),
    )
  }
}
