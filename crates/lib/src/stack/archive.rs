//! Export and import of installed stacks as `<stack>.tar.bz2`.

use std::path::{Path, PathBuf};

use tracing::info;

use super::layout::StackLayout;
use super::load::Stack;
use crate::env::EnvMap;
use crate::error::{BuildError, Result};
use crate::exec::{CommandSpec, Runner};
use crate::util::fs::ensure_dir;

/// File name of the export archive of `stack`.
pub fn archive_name(stack: &Stack) -> String {
  format!("{}.tar.bz2", stack.name())
}

/// Archive the `install/` subtree of `stack` into `<base>/<stack>.tar.bz2`.
pub fn export(runner: &impl Runner, stack: &Stack) -> Result<PathBuf> {
  let layout = StackLayout::new(stack.base_dir());
  for dir in [layout.base().to_path_buf(), layout.install_dir()] {
    if !dir.is_dir() {
      return Err(BuildError::Config(format!("{} does not exist", dir.display())));
    }
  }

  let tar = runner.find_tool("tar", &EnvMap::new())?;
  let name = archive_name(stack);
  let cmd = CommandSpec::new(tar, layout.base()).args(["-cjf", &name, "install"]);
  runner.run(&cmd)?;

  let archive = layout.base().join(name);
  info!(stack = %stack.name(), archive = ?archive, "stack exported");
  Ok(archive)
}

/// Unpack an exported `archive` into the base directory of `stack`.
pub fn import(runner: &impl Runner, stack: &Stack, archive: &Path) -> Result<PathBuf> {
  let archive = dunce::canonicalize(archive).map_err(|e| BuildError::io(archive, e))?;
  let layout = StackLayout::new(stack.base_dir());
  ensure_dir(layout.base())?;

  let tar = runner.find_tool("tar", &EnvMap::new())?;
  let cmd = CommandSpec::new(tar, layout.base())
    .arg("-xjf")
    .arg(archive.to_string_lossy());
  runner.run(&cmd)?;

  info!(stack = %stack.name(), base = ?layout.base(), "stack imported");
  Ok(layout.base().to_path_buf())
}
