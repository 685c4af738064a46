//! Tarball detection and unpacking.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::EnvMap;
use crate::error::{BuildError, Result};
use crate::exec::{CommandSpec, Runner};
use crate::util::fs::list_entries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
  Tar,
  Gz,
  Bz2,
  Tgz,
}

impl ArchiveFormat {
  /// Detect the format from a file name.
  pub fn detect(filename: &str) -> Option<Self> {
    if filename.ends_with(".tgz") {
      Some(Self::Tgz)
    } else if filename.ends_with(".gz") {
      Some(Self::Gz)
    } else if filename.ends_with(".bz2") {
      Some(Self::Bz2)
    } else if filename.ends_with(".tar") {
      Some(Self::Tar)
    } else {
      None
    }
  }

  /// Flags handed to `tar` to extract this format.
  pub fn tar_args(self) -> &'static str {
    match self {
      Self::Tar => "-xf",
      Self::Gz | Self::Tgz => "-xzf",
      Self::Bz2 => "-xjf",
    }
  }
}

/// Unpack `archive` in place and return the single directory it produced.
///
/// Returns `Ok(None)` when `archive` is not a recognized archive. The directory
/// holding the archive may contain at most the archive itself plus one unpacked
/// directory; anything else is an ambiguous layout. An archive that was already
/// unpacked is not extracted again.
pub fn unpack(runner: &impl Runner, archive: &Path, env: &EnvMap) -> Result<Option<PathBuf>> {
  let Some(filename) = archive.file_name().map(|f| f.to_string_lossy().to_string()) else {
    return Ok(None);
  };
  let Some(format) = ArchiveFormat::detect(&filename) else {
    debug!(path = ?archive, "not a recognized archive, skipping unpack");
    return Ok(None);
  };
  let dir = archive
    .parent()
    .map(Path::to_path_buf)
    .unwrap_or_else(|| PathBuf::from("."));

  let existing = unpacked_entries(&dir, &filename)?;
  if existing.len() == 1 {
    let src_dir = dir.join(&existing[0]);
    if src_dir.is_dir() {
      info!(path = ?src_dir, "archive already unpacked");
      return Ok(Some(src_dir));
    }
  }
  if !existing.is_empty() {
    return Err(BuildError::AmbiguousLayout { dir, entries: existing });
  }

  let tar = runner.find_tool("tar", env)?;
  info!(path = ?archive, "unpacking archive");
  let cmd = CommandSpec::new(tar, &dir).arg(format.tar_args()).arg(archive.to_string_lossy());
  runner.run(&cmd)?;

  let entries = unpacked_entries(&dir, &filename)?;
  match entries.as_slice() {
    [single] if dir.join(single).is_dir() => {
      let src_dir = dir.join(single);
      debug!(src_dir = ?src_dir, "source directory is now the unpacked tree");
      Ok(Some(src_dir))
    }
    _ => Err(BuildError::AmbiguousLayout { dir, entries }),
  }
}

fn unpacked_entries(dir: &Path, archive_name: &str) -> Result<Vec<String>> {
  Ok(
    list_entries(dir)?
      .into_iter()
      .filter(|name| name != archive_name)
      .collect(),
  )
}
