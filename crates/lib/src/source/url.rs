//! Source URL classification.

use std::path::PathBuf;

use crate::error::{BuildError, Result};

const FILE_SCHEME: &str = "file://";

/// How a component's sources are obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
  /// `file://` URL pointing at a directory.
  LocalDir(PathBuf),
  /// `file://` URL pointing at anything else, treated as a tarball candidate.
  LocalFile(PathBuf),
  /// `http://` or `https://` download.
  Http,
  /// Git repository, cloned with `git`.
  Git,
}

/// Classify `url` into the acquisition strategy it needs.
///
/// Git is checked before HTTP so `https://host/repo.git` clones instead of downloading.
pub fn classify(url: &str) -> Result<SourceKind> {
  if let Some(path) = url.strip_prefix(FILE_SCHEME) {
    let path = PathBuf::from(path);
    return Ok(if path.is_dir() {
      SourceKind::LocalDir(path)
    } else {
      SourceKind::LocalFile(path)
    });
  }

  if is_git_url(url) {
    return Ok(SourceKind::Git);
  }

  if url.starts_with("http://") || url.starts_with("https://") {
    return Ok(SourceKind::Http);
  }

  Err(BuildError::UnsupportedSource { url: url.to_string() })
}

fn is_git_url(url: &str) -> bool {
  let trimmed = url.trim_end_matches('/');
  trimmed.ends_with(".git") || url.starts_with("git://") || url.starts_with("ssh://") || is_scp_like(url)
}

/// `user@host:path` SSH short form.
fn is_scp_like(url: &str) -> bool {
  if url.contains("://") {
    return false;
  }
  match (url.find('@'), url.find(':')) {
    (Some(at), Some(colon)) => at > 0 && colon > at + 1 && colon + 1 < url.len(),
    _ => false,
  }
}

/// The directory name a clone of `url` produces, e.g. `c_hello_world` for `.../c_hello_world.git`.
pub fn repo_name(url: &str) -> String {
  let trimmed = url.trim_end_matches('/');
  let base = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
  base.strip_suffix(".git").unwrap_or(base).to_string()
}

/// Last path component of `url`, without query string.
pub fn url_basename(url: &str) -> String {
  let without_query = url.split(['?', '#']).next().unwrap_or(url);
  without_query
    .trim_end_matches('/')
    .rsplit('/')
    .next()
    .unwrap_or(without_query)
    .to_string()
}
