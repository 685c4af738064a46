//! Ordered build environment.
//!
//! The environment handed to every external process of a component is an
//! ordered `KEY=VALUE` mapping. Setting a key that already exists replaces its
//! value in place, so the insertion order of the first occurrence is kept and a
//! key never appears twice.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::warn;

pub const PATH_VAR: &str = "PATH";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
  vars: IndexMap<String, String>,
}

impl EnvMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse a whitespace-separated list of `KEY=VALUE` entries.
  ///
  /// Entries without `=` or with an empty key are skipped with a warning.
  pub fn parse(input: &str) -> Self {
    let mut env = Self::new();
    for entry in input.split_whitespace() {
      if !env.insert_entry(entry) {
        warn!(entry, "ignoring malformed environment entry");
      }
    }
    env
  }

  /// Insert a single `KEY=VALUE` entry. Returns `false` if the entry is malformed.
  pub fn insert_entry(&mut self, entry: &str) -> bool {
    match entry.split_once('=') {
      Some((key, value)) if !key.is_empty() => {
        self.set(key, value);
        true
      }
      _ => false,
    }
  }

  /// Set `key` to `value`, replacing any existing value but keeping its position.
  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.vars.insert(key.into(), value.into());
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.vars.get(key).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.vars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Overlay every entry of `other` onto this map; `other` wins on conflicts.
  pub fn merge(&mut self, other: &EnvMap) {
    for (key, value) in other.iter() {
      self.set(key, value);
    }
  }

  /// Prepend `dir` to the `PATH` entry.
  ///
  /// When no `PATH` entry exists yet, a new one is created from `dir` followed by
  /// the `PATH` of the current process.
  pub fn prepend_path(&mut self, dir: &Path) {
    let dir = dir.to_string_lossy();
    let value = match self.get(PATH_VAR) {
      Some(existing) if !existing.is_empty() => format!("{dir}:{existing}"),
      _ => match std::env::var(PATH_VAR) {
        Ok(process_path) if !process_path.is_empty() => format!("{dir}:{process_path}"),
        _ => dir.to_string(),
      },
    };
    self.set(PATH_VAR, value);
  }

  /// Directories listed in this map's `PATH` entry, in order.
  pub fn path_dirs(&self) -> Vec<PathBuf> {
    self
      .get(PATH_VAR)
      .map(|p| std::env::split_paths(p).collect())
      .unwrap_or_default()
  }

  /// Entries rendered as `KEY=VALUE` strings.
  pub fn entries(&self) -> Vec<String> {
    self.iter().map(|(k, v)| format!("{k}={v}")).collect()
  }
}

impl fmt::Display for EnvMap {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.entries().join(" "))
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvMap {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut env = Self::new();
    for (k, v) in iter {
      env.set(k, v);
    }
    env
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  fn parse_preserves_order_and_replaces_duplicates() {
    let env = EnvMap::parse("CC=gcc CFLAGS=-O2 CC=clang");
    assert_eq!(env.entries(), vec!["CC=clang", "CFLAGS=-O2"]);
  }

  #[test]
  fn parse_skips_malformed_entries() {
    let env = EnvMap::parse("CC=gcc nonsense =empty");
    assert_eq!(env.entries(), vec!["CC=gcc"]);
  }

  #[test]
  fn values_may_contain_equals() {
    let env = EnvMap::parse("LDFLAGS=-Wl,-rpath=/opt/lib");
    assert_eq!(env.get("LDFLAGS"), Some("-Wl,-rpath=/opt/lib"));
  }

  #[test]
  fn merge_overrides_in_place() {
    let mut base = EnvMap::parse("A=1 B=2");
    base.merge(&EnvMap::parse("B=3 C=4"));
    assert_eq!(base.entries(), vec!["A=1", "B=3", "C=4"]);
  }

  #[test]
  fn prepend_path_replaces_existing_entry() {
    let mut env = EnvMap::parse("CC=gcc PATH=/opt/a/bin");
    env.prepend_path(Path::new("/opt/b/bin"));

    assert_eq!(env.entries(), vec!["CC=gcc", "PATH=/opt/b/bin:/opt/a/bin"]);
    assert_eq!(env.iter().filter(|(k, _)| *k == PATH_VAR).count(), 1);
  }

  #[test]
  #[serial]
  fn prepend_path_seeds_from_process_path() {
    temp_env::with_var("PATH", Some("/usr/bin:/bin"), || {
      let mut env = EnvMap::new();
      env.prepend_path(Path::new("/opt/x/bin"));
      assert_eq!(env.get(PATH_VAR), Some("/opt/x/bin:/usr/bin:/bin"));
    });
  }

  #[test]
  #[serial]
  fn prepend_path_without_process_path() {
    temp_env::with_var_unset("PATH", || {
      let mut env = EnvMap::new();
      env.prepend_path(Path::new("/opt/x/bin"));
      assert_eq!(env.get(PATH_VAR), Some("/opt/x/bin"));
    });
  }

  #[test]
  fn path_dirs_splits_entry() {
    let env = EnvMap::parse("PATH=/a/bin:/b/bin");
    assert_eq!(env.path_dirs(), vec![PathBuf::from("/a/bin"), PathBuf::from("/b/bin")]);
  }
}
