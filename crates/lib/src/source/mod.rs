//! Source acquisition.
//!
//! Materializes a component's source tree under `<build_dir>/<name>/`:
//!
//! - `file://` directory: recursive copy into `<build_dir>/<name>/<basename>`
//! - `file://` file: copy into `<build_dir>/<name>/<basename>`, then unpack
//! - `http(s)://`: download into `<build_dir>/<name>/<basename>`, then unpack
//! - Git: clone into `<build_dir>/<name>/<repo_name>`
//!
//! Acquisition is idempotent: an existing target is reused, never fetched or
//! copied again.

pub mod archive;
pub mod git;
pub mod url;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::buildenv::BuildEnv;
use crate::env::EnvMap;
use crate::error::{BuildError, Result};
use crate::exec::{CommandSpec, Runner};
use crate::util::fs::{copy_tree, ensure_dir};

pub use url::SourceKind;

/// Where a component's sources come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDescriptor {
  pub url: String,
  /// Git branch or tag to check out.
  pub branch: Option<String>,
  /// Command run in the checkout before switching branch.
  pub branch_checkout_prelude: Option<String>,
}

impl SourceDescriptor {
  pub fn new(url: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      ..Self::default()
    }
  }
}

/// Result of acquiring a component's sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
  /// Directory holding the source tree to configure and build.
  pub src_dir: PathBuf,
  /// The acquired artifact (tarball, copied directory, or checkout).
  pub src_path: PathBuf,
}

/// Acquire the sources of component `name` described by `source`.
pub fn acquire(runner: &impl Runner, name: &str, source: &SourceDescriptor, env: &BuildEnv) -> Result<Acquired> {
  if source.url.is_empty() {
    return Err(BuildError::Config(format!("undefined source URL for {name}")));
  }

  info!(component = %name, url = %source.url, "acquiring sources");
  let target_dir = env.component_build_dir(name);
  ensure_dir(&target_dir)?;

  let acquired = match url::classify(&source.url)? {
    SourceKind::LocalDir(path) => {
      let copy = target_dir.join(basename(&path, name));
      if copy.exists() {
        info!(path = ?copy, "source directory already copied");
      } else {
        copy_tree(&path, &copy)?;
      }
      Acquired {
        src_dir: copy.clone(),
        src_path: copy,
      }
    }
    SourceKind::LocalFile(path) => {
      let copy = target_dir.join(basename(&path, name));
      if copy.exists() {
        info!(path = ?copy, "source file already copied");
      } else {
        std::fs::copy(&path, &copy).map_err(|e| BuildError::io(&path, e))?;
      }
      unpacked(runner, target_dir, copy, &env.env)?
    }
    SourceKind::Http => {
      let file = target_dir.join(url::url_basename(&source.url));
      if file.exists() {
        info!(path = ?file, "already downloaded");
      } else {
        download(runner, &source.url, &file, &env.env)?;
      }
      unpacked(runner, target_dir, file, &env.env)?
    }
    SourceKind::Git => {
      let checkout = git::clone_or_update(
        runner,
        &source.url,
        source.branch.as_deref().filter(|b| !b.is_empty()),
        source.branch_checkout_prelude.as_deref().filter(|p| !p.is_empty()),
        &target_dir,
        &env.env,
      )?;
      Acquired {
        src_dir: checkout.clone(),
        src_path: checkout,
      }
    }
  };

  info!(component = %name, src_dir = ?acquired.src_dir, "sources ready");
  Ok(acquired)
}

/// Unpack `artifact` if it is an archive; otherwise the sources are `target_dir` itself.
fn unpacked(runner: &impl Runner, target_dir: PathBuf, artifact: PathBuf, env: &EnvMap) -> Result<Acquired> {
  let src_dir = archive::unpack(runner, &artifact, env)?.unwrap_or(target_dir);
  Ok(Acquired {
    src_dir,
    src_path: artifact,
  })
}

/// Download `url` to `dest` with `wget`, falling back to `curl`.
fn download(runner: &impl Runner, url: &str, dest: &Path, env: &EnvMap) -> Result<()> {
  let cwd = dest.parent().unwrap_or(dest);
  let dest_arg = dest.to_string_lossy().to_string();

  let cmd = if let Ok(wget) = runner.find_tool("wget", env) {
    CommandSpec::new(wget, cwd).args(["-q", "-O", &dest_arg, url])
  } else if let Ok(curl) = runner.find_tool("curl", env) {
    CommandSpec::new(curl, cwd).args(["-fsSL", "-o", &dest_arg, url])
  } else {
    return Err(BuildError::ToolMissing {
      tool: "wget or curl".to_string(),
    });
  };

  info!(url, dest = ?dest, "downloading");
  if let Err(e) = runner.run(&cmd.env(env)) {
    // A partial download would otherwise be mistaken for a cached one.
    if let Err(cleanup) = std::fs::remove_file(dest)
      && cleanup.kind() != ErrorKind::NotFound
    {
      warn!(dest = ?dest, error = %cleanup, "unable to remove partial download");
    }
    return Err(e);
  }
  Ok(())
}

fn basename(path: &Path, fallback: &str) -> String {
  path
    .file_name()
    .map(|f| f.to_string_lossy().to_string())
    .unwrap_or_else(|| fallback.to_string())
}
