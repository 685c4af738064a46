//! Loading and validating the two stack documents.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::types::{StackConfig, StackDefinition};
use crate::error::{BuildError, Result};

/// A stack definition paired with the config that places it on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
  pub definition: StackDefinition,
  pub config: StackConfig,
}

impl Stack {
  /// Validate and pair two parsed documents.
  pub fn new(definition: StackDefinition, config: StackConfig) -> Result<Self> {
    let stack = Self { definition, config };
    stack.validate()?;
    Ok(stack)
  }

  /// Read and parse both documents from disk.
  pub fn load(definition_path: &Path, config_path: &Path) -> Result<Self> {
    let definition = read_document(definition_path)?;
    let config = read_document(config_path)?;
    Self::from_slices(&definition, &config)
  }

  /// Parse both documents from raw JSON bytes.
  pub fn from_slices(definition: &[u8], config: &[u8]) -> Result<Self> {
    let definition: StackDefinition = serde_json::from_slice(definition)
      .map_err(|e| BuildError::Config(format!("invalid stack definition: {e}")))?;
    let config: StackConfig =
      serde_json::from_slice(config).map_err(|e| BuildError::Config(format!("invalid stack config: {e}")))?;
    Self::new(definition, config)
  }

  /// Replace the install root of the config document.
  pub fn with_install_dir(mut self, install_dir: impl Into<PathBuf>) -> Result<Self> {
    self.config.install_dir = install_dir.into();
    self.validate()?;
    Ok(self)
  }

  pub fn name(&self) -> &str {
    &self.definition.name
  }

  /// `<install_dir>/<stack name>`.
  pub fn base_dir(&self) -> PathBuf {
    self.config.install_dir.join(&self.definition.name)
  }

  pub fn validate(&self) -> Result<()> {
    let definition = &self.definition;
    if definition.name.trim().is_empty() {
      return Err(BuildError::Config("undefined stack name".to_string()));
    }
    if self.config.install_dir.as_os_str().is_empty() {
      return Err(BuildError::Config("undefined install directory".to_string()));
    }
    if !definition.system.is_empty() && !self.config.system.is_empty() && definition.system != self.config.system {
      return Err(BuildError::Config(format!(
        "stack {} targets system '{}' but the config is for system '{}'",
        definition.name, definition.system, self.config.system
      )));
    }

    let mut seen = HashSet::new();
    for component in &definition.components {
      if component.name.trim().is_empty() {
        return Err(BuildError::Config(format!("component without a name in stack {}", definition.name)));
      }
      if component.url.trim().is_empty() {
        return Err(BuildError::Config(format!("undefined URL for component {}", component.name)));
      }
      for dep in component.dependencies() {
        if !seen.contains(dep) {
          warn!(
            component = %component.name,
            dependency = dep,
            "dependency is not declared before the component, its --with flag will be empty"
          );
        }
      }
      if !seen.insert(component.name.as_str()) {
        return Err(BuildError::Config(format!("duplicate component name {}", component.name)));
      }
    }

    debug!(stack = %definition.name, components = definition.components.len(), "stack documents validated");
    Ok(())
  }
}

fn read_document(path: &Path) -> Result<Vec<u8>> {
  fs::read(path).map_err(|e| BuildError::Config(format!("unable to read {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stack::types::Component;
  use crate::util::testutil::write_file;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  fn definition(components: Vec<Component>) -> StackDefinition {
    StackDefinition {
      name: "test".to_string(),
      system: "host".to_string(),
      components,
      ..StackDefinition::default()
    }
  }

  fn config() -> StackConfig {
    StackConfig {
      install_dir: PathBuf::from("/opt/stacks"),
      system: "host".to_string(),
    }
  }

  #[test]
  fn load_from_files() {
    let temp = TempDir::new().unwrap();
    let def_path = temp.path().join("stack.json");
    let cfg_path = temp.path().join("config.json");
    write_file(
      &def_path,
      r#"{"name": "test", "system": "host", "type": "public",
          "components": [{"name": "Comp1", "URL": "git@github.com:gvallee/c_hello_world.git"}]}"#,
    );
    write_file(&cfg_path, r#"{"installDir": "/opt/stacks", "system": "host"}"#);

    let stack = Stack::load(&def_path, &cfg_path).unwrap();

    assert_eq!(stack.name(), "test");
    assert_eq!(stack.base_dir(), PathBuf::from("/opt/stacks/test"));
    assert_eq!(stack.definition.components[0].name, "Comp1");
  }

  #[test]
  fn missing_or_malformed_documents_are_config_errors() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.json");
    assert!(matches!(Stack::load(&missing, &missing), Err(BuildError::Config(_))));

    let err = Stack::from_slices(b"{not json", br#"{"installDir": "/x"}"#).unwrap_err();
    assert!(matches!(err, BuildError::Config(msg) if msg.contains("stack definition")));
  }

  #[test]
  fn install_dir_is_required() {
    let err = Stack::from_slices(br#"{"name": "test"}"#, br#"{"installDir": ""}"#).unwrap_err();
    assert!(matches!(err, BuildError::Config(msg) if msg.contains("install directory")));
  }

  #[test]
  fn component_names_must_be_unique_and_non_empty() {
    let dup = definition(vec![Component::new("A", "file:///a"), Component::new("A", "file:///b")]);
    assert!(matches!(Stack::new(dup, config()), Err(BuildError::Config(msg)) if msg.contains("duplicate")));

    let unnamed = definition(vec![Component::new("", "file:///a")]);
    assert!(Stack::new(unnamed, config()).is_err());

    let no_url = definition(vec![Component::new("A", "")]);
    assert!(matches!(Stack::new(no_url, config()), Err(BuildError::Config(msg)) if msg.contains("URL")));
  }

  #[test]
  fn mismatched_system_is_rejected() {
    let mut cfg = config();
    cfg.system = "dpu".to_string();
    assert!(Stack::new(definition(Vec::new()), cfg).is_err());
  }

  #[test]
  #[traced_test]
  fn forward_dependency_only_warns() {
    let b = Component {
      configure_dependency: "A".to_string(),
      ..Component::new("B", "file:///b")
    };
    let stack = Stack::new(definition(vec![b, Component::new("A", "file:///a")]), config());

    assert!(stack.is_ok());
    assert!(logs_contain("dependency is not declared before the component"));
  }

  #[test]
  fn install_dir_override() {
    let stack = Stack::new(definition(Vec::new()), config())
      .unwrap()
      .with_install_dir("/scratch/me")
      .unwrap();
    assert_eq!(stack.base_dir(), PathBuf::from("/scratch/me/test"));
  }
}
