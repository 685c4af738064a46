//! Command manifests.
//!
//! A manifest is a small text file recording how a command was invoked, kept next
//! to the installed component so a build can be reproduced by hand.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::CommandSpec;
use crate::error::{BuildError, Result};

/// Where a command's manifest is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestTarget {
  pub dir: PathBuf,
  pub name: String,
}

pub fn manifest_path(dir: &Path, name: &str) -> PathBuf {
  dir.join(format!("{name}.manifest"))
}

/// Write the manifest of `cmd` to `target`, creating the directory if needed.
pub fn write_manifest(target: &ManifestTarget, cmd: &CommandSpec) -> Result<PathBuf> {
  fs::create_dir_all(&target.dir).map_err(|e| BuildError::io(&target.dir, e))?;

  let mut content = String::new();
  content.push_str("# working directory\n");
  content.push_str(&cmd.cwd.to_string_lossy());
  content.push_str("\n# command\n");
  content.push_str(&cmd.command_line());
  content.push('\n');
  if !cmd.env.is_empty() {
    content.push_str("# environment\n");
    for entry in cmd.env.entries() {
      content.push_str(&entry);
      content.push('\n');
    }
  }

  let path = manifest_path(&target.dir, &target.name);
  fs::write(&path, content).map_err(|e| BuildError::io(&path, e))?;
  debug!(path = ?path, "wrote command manifest");
  Ok(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::env::EnvMap;
  use tempfile::TempDir;

  #[test]
  fn manifest_lists_cwd_command_and_environment() {
    let temp = TempDir::new().unwrap();
    let cmd = CommandSpec::new("/src/configure", "/src")
      .args(["--prefix=/opt/x"])
      .env(&EnvMap::parse("CC=gcc"));
    let target = ManifestTarget {
      dir: temp.path().join("nested"),
      name: "configure".to_string(),
    };

    let path = write_manifest(&target, &cmd).unwrap();
    let content = fs::read_to_string(path).unwrap();

    assert_eq!(
      content,
      "# working directory\n/src\n# command\n/src/configure --prefix=/opt/x\n# environment\nCC=gcc\n"
    );
  }
}
