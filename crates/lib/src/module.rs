//! Environment module descriptors.
//!
//! One modulefile per component under `<stack>/modulefiles/`, loadable with
//! `module use <stack>/modulefiles && module load <component>`.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{BuildError, Result};
use crate::stack::{Component, Stack, StackLayout};
use crate::util::fs::ensure_dir;

pub const MODULE_PRELUDE: &str = "#%Module1.0";

/// Environment variables prepended with a component subdirectory, in emission order.
const PREPEND_LAYOUT: [(&str, &str); 6] = [
  ("PATH", "bin"),
  ("LIBRARY_PATH", "lib"),
  ("LD_LIBRARY_PATH", "lib"),
  ("CPATH", "include"),
  ("MANPATH", "man"),
  ("PKG_CONFIG_PATH", "lib/pkgconfig"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleFile {
  pub name: String,
  pub requires: Vec<String>,
  pub conflicts: Vec<String>,
  pub vars: Vec<(String, String)>,
  pub env_vars: Vec<(String, String)>,
  pub prepend_paths: Vec<(String, PathBuf)>,
}

impl ModuleFile {
  /// Describe `component` as installed under `layout`.
  ///
  /// Environment variable names are `<prefix><NAME>_DIR` and `<prefix><NAME>_BUILD_DIR`.
  pub fn for_component(layout: &StackLayout, component: &Component, prefix: &str) -> Result<Self> {
    let name = &component.name;
    let install_dir = layout.component_install_dir(name);
    let var_base = format!("{prefix}{}", name.to_uppercase());

    let mut env_vars = vec![(format!("{var_base}_DIR"), install_dir.to_string_lossy().to_string())];
    let build_dir = match layout.component_build_dir(name)? {
      Some(dir) => Some(dir),
      None => layout.component_src_dir(name)?,
    };
    if let Some(dir) = build_dir {
      env_vars.push((format!("{var_base}_BUILD_DIR"), dir.to_string_lossy().to_string()));
    }

    let prepend_paths = PREPEND_LAYOUT
      .iter()
      .map(|(var, sub)| (var.to_string(), install_dir.join(sub)))
      .filter(|(_, dir)| dir.is_dir())
      .collect();

    Ok(Self {
      name: name.clone(),
      requires: component.dependencies().into_iter().map(str::to_string).collect(),
      conflicts: Vec::new(),
      vars: vec![(
        "software_stack_dir".to_string(),
        layout.base().to_string_lossy().to_string(),
      )],
      env_vars,
      prepend_paths,
    })
  }

  pub fn render(&self, copyright: &str) -> String {
    let mut out = format!("{MODULE_PRELUDE}\n\n{copyright}\n\n");
    for dep in &self.requires {
      out.push_str(&format!("module load {dep}\n"));
    }
    out.push('\n');
    for conflict in &self.conflicts {
      out.push_str(&format!("conflict {conflict}\n"));
    }
    out.push('\n');
    for (name, value) in &self.vars {
      out.push_str(&format!("set {name} {value}\n"));
    }
    out.push('\n');
    for (name, value) in &self.env_vars {
      out.push_str(&format!("setenv {name} {value}\n"));
    }
    out.push('\n');
    for (var, path) in &self.prepend_paths {
      out.push_str(&format!("prepend-path {var} {}\n", path.display()));
    }
    out
  }

  pub fn write(&self, dir: &Path, copyright: &str) -> Result<PathBuf> {
    let path = dir.join(&self.name);
    std::fs::write(&path, self.render(copyright)).map_err(|e| BuildError::io(&path, e))?;
    Ok(path)
  }
}

/// Write a modulefile for every component of an installed `stack`.
pub fn generate(stack: &Stack, copyright: &str, prefix: &str) -> Result<Vec<PathBuf>> {
  let layout = StackLayout::new(stack.base_dir());
  if !layout.base().is_dir() {
    return Err(BuildError::Config(format!(
      "stack base directory {} does not exist",
      layout.base().display()
    )));
  }
  let dir = layout.modulefiles_dir();
  ensure_dir(&dir)?;

  let mut written = Vec::with_capacity(stack.definition.components.len());
  for component in &stack.definition.components {
    let path = ModuleFile::for_component(&layout, component, prefix)?.write(&dir, copyright)?;
    written.push(path);
  }
  info!(stack = %stack.name(), dir = ?dir, count = written.len(), "modulefiles generated");
  Ok(written)
}
