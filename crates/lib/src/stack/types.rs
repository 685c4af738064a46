//! Stack documents.
//!
//! # Stack definition
//!
//! ```json
//! {
//!   "name": "hpc",
//!   "system": "host",
//!   "type": "public",
//!   "components": [
//!     {
//!       "name": "ompi",
//!       "URL": "https://download.open-mpi.org/release/open-mpi/v4.1/openmpi-4.1.5.tar.bz2",
//!       "configure_id": "mpi",
//!       "configure_params": "--enable-debug"
//!     }
//!   ]
//! }
//! ```
//!
//! # Stack config
//!
//! ```json
//! { "installDir": "/opt/stacks", "system": "host" }
//! ```
//!
//! Optional component fields are plain strings; an empty string means unset.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::source::SourceDescriptor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackType {
  #[default]
  Public,
  Private,
}

impl StackType {
  pub fn as_str(self) -> &'static str {
    match self {
      StackType::Public => "public",
      StackType::Private => "private",
    }
  }
}

/// One buildable unit of a stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
  pub name: String,

  #[serde(rename = "URL")]
  pub url: String,

  /// Git branch or tag to check out.
  #[serde(skip_serializing_if = "String::is_empty")]
  pub branch: String,

  /// Command run in the checkout before the branch is checked out, e.g. to fetch tags.
  #[serde(skip_serializing_if = "String::is_empty")]
  pub branch_checkout_prelude: String,

  /// Identifier dependents configure against, producing `--with-<id>=<path>`.
  #[serde(skip_serializing_if = "String::is_empty")]
  pub configure_id: String,

  /// Comma-separated names of earlier components needed at configure time.
  #[serde(skip_serializing_if = "String::is_empty")]
  pub configure_dependency: String,

  /// Command run from the source tree before configuring, e.g. to init submodules.
  #[serde(skip_serializing_if = "String::is_empty")]
  pub configure_prelude: String,

  /// Space-separated extra configure flags.
  #[serde(skip_serializing_if = "String::is_empty")]
  pub configure_params: String,

  /// Space-separated `KEY=VALUE` entries, may contain `@ref:...@` tokens.
  #[serde(skip_serializing_if = "String::is_empty")]
  pub build_env: String,

  /// Script run instead of `make`.
  #[serde(skip_serializing_if = "String::is_empty")]
  pub build_script: String,
}

impl Component {
  pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      url: url.into(),
      ..Self::default()
    }
  }

  /// Names of the declared configure dependencies, in order.
  pub fn dependencies(&self) -> Vec<&str> {
    self
      .configure_dependency
      .split(',')
      .map(str::trim)
      .filter(|d| !d.is_empty())
      .collect()
  }

  pub fn configure_params(&self) -> Vec<String> {
    self.configure_params.split_whitespace().map(str::to_string).collect()
  }

  /// The identifier used in `--with-<id>=` flags of dependents.
  pub fn configure_ref(&self) -> &str {
    if self.configure_id.is_empty() {
      &self.name
    } else {
      &self.configure_id
    }
  }

  pub fn source(&self) -> SourceDescriptor {
    SourceDescriptor {
      url: self.url.clone(),
      branch: non_empty(&self.branch),
      branch_checkout_prelude: non_empty(&self.branch_checkout_prelude),
    }
  }

  pub fn configure_prelude(&self) -> Option<String> {
    non_empty(&self.configure_prelude)
  }

  pub fn build_script(&self) -> Option<PathBuf> {
    non_empty(&self.build_script).map(PathBuf::from)
  }
}

fn non_empty(value: &str) -> Option<String> {
  let value = value.trim();
  (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDefinition {
  pub name: String,

  /// Target system tag, e.g. `host` or `dpu`.
  #[serde(default)]
  pub system: String,

  #[serde(default, rename = "type")]
  pub stack_type: StackType,

  /// Build order is declaration order.
  #[serde(default)]
  pub components: Vec<Component>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
  /// Root under which every stack gets `<install_dir>/<stack name>/`.
  pub install_dir: PathBuf,

  #[serde(default)]
  pub system: String,
}
