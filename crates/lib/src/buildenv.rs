//! Per-component build environment.
//!
//! A [`BuildEnv`] is created fresh for every component of a stack. Its four
//! directories are derived from the stack base directory; its environment is
//! seeded from the environment accumulated over the components installed
//! before it.

use std::path::{Path, PathBuf};

use crate::consts::{BUILD_DIR, INSTALL_DIR, SCRATCH_DIR, SRC_DIR};
use crate::env::EnvMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnv {
  /// Directory for temporary data.
  pub scratch_dir: PathBuf,

  /// Stack install root; each component installs into `<install_dir>/<name>`.
  pub install_dir: PathBuf,

  /// Stack build root; each component's sources land in `<build_dir>/<name>`.
  pub build_dir: PathBuf,

  /// Where the component's source code is.
  ///
  /// Starts as the stack `src` directory and is updated to the acquired source
  /// tree once the component's sources are materialized.
  pub src_dir: PathBuf,

  /// The acquired artifact: a tarball, a copied directory, or a Git checkout.
  pub src_path: Option<PathBuf>,

  /// Environment handed to every command run for the component.
  pub env: EnvMap,

  /// Extra arguments appended to every `make` invocation.
  pub make_extra_args: Vec<String>,
}

impl BuildEnv {
  /// Derive the environment for a stack rooted at `stack_base`.
  pub fn for_stack(stack_base: &Path, env: EnvMap) -> Self {
    Self {
      scratch_dir: stack_base.join(SCRATCH_DIR),
      install_dir: stack_base.join(INSTALL_DIR),
      build_dir: stack_base.join(BUILD_DIR),
      src_dir: stack_base.join(SRC_DIR),
      src_path: None,
      env,
      make_extra_args: Vec::new(),
    }
  }

  pub fn component_install_dir(&self, name: &str) -> PathBuf {
    self.install_dir.join(name)
  }

  pub fn component_build_dir(&self, name: &str) -> PathBuf {
    self.build_dir.join(name)
  }

  /// Point the environment at an acquired source tree.
  pub fn set_source(&mut self, src_dir: PathBuf, src_path: PathBuf) {
    self.src_dir = src_dir;
    self.src_path = Some(src_path);
  }
}
