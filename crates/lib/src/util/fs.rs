//! Filesystem helpers shared by the acquirer, driver, and orchestrator.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{BuildError, Result};

/// Create `dir` and its parents. Pre-existing directories are not an error.
pub fn ensure_dir(dir: &Path) -> Result<()> {
  if dir.is_dir() {
    return Ok(());
  }

  let mut builder = fs::DirBuilder::new();
  builder.recursive(true);
  #[cfg(unix)]
  {
    use std::os::unix::fs::DirBuilderExt;
    builder.mode(crate::consts::DIR_MODE);
  }
  builder.create(dir).map_err(|e| BuildError::io(dir, e))
}

/// Recursively copy the contents of `src` into `dest`, creating `dest` if needed.
///
/// Existing files in `dest` are overwritten. Symlinks are recreated, not followed.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
  ensure_dir(dest)?;

  for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
    let entry = entry.map_err(|e| {
      let path = e.path().unwrap_or(src).to_path_buf();
      BuildError::io(path, std::io::Error::other(e.to_string()))
    })?;
    let relative = match entry.path().strip_prefix(src) {
      Ok(rel) if !rel.as_os_str().is_empty() => rel,
      _ => continue,
    };
    let target = dest.join(relative);
    let file_type = entry.file_type();

    if file_type.is_dir() {
      ensure_dir(&target)?;
    } else if file_type.is_symlink() {
      copy_symlink(entry.path(), &target)?;
    } else {
      fs::copy(entry.path(), &target).map_err(|e| BuildError::io(entry.path(), e))?;
    }
  }

  Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, target: &Path) -> Result<()> {
  let link = fs::read_link(src).map_err(|e| BuildError::io(src, e))?;
  if target.symlink_metadata().is_ok() {
    fs::remove_file(target).map_err(|e| BuildError::io(target, e))?;
  }
  std::os::unix::fs::symlink(&link, target).map_err(|e| BuildError::io(target, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, target: &Path) -> Result<()> {
  fs::copy(src, target).map(|_| ()).map_err(|e| BuildError::io(src, e))
}

/// Mark `path` as executable by everyone.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|e| BuildError::io(path, e))
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<()> {
  Ok(())
}

/// Names of the entries of `dir`, sorted.
pub fn list_entries(dir: &Path) -> Result<Vec<String>> {
  let mut names = fs::read_dir(dir)
    .map_err(|e| BuildError::io(dir, e))?
    .map(|entry| {
      entry
        .map(|e| e.file_name().to_string_lossy().to_string())
        .map_err(|e| BuildError::io(dir, e))
    })
    .collect::<Result<Vec<_>>>()?;
  names.sort();
  Ok(names)
}
