//! Stack installation.
//!
//! Components are installed one at a time in declaration order. For each one
//! the installer:
//!
//! 1. resolves `@ref:...@` tokens in its `build_env` and derives its
//!    environment from the environment accumulated so far
//! 2. turns its configure dependencies into `--with-<id>=<path>` flags using
//!    the components recorded so far
//! 3. acquires the sources, detects the build system and runs the driver
//! 4. records the component's directories and prepends its `bin/` to `PATH`
//!
//! The first failing component aborts the whole installation; components
//! installed before it are left in place.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, info};

use super::layout::StackLayout;
use super::load::Stack;
use super::types::{Component, StackType};
use crate::buildenv::BuildEnv;
use crate::detect::Detection;
use crate::driver::{Driver, Recipe};
use crate::env::EnvMap;
use crate::error::{BuildError, Phase, Result};
use crate::exec::{Runner, SystemRunner};
use crate::reference::{self, ResolutionMap};
use crate::source::{self, Acquired};
use crate::util::fs::ensure_dir;

/// Caller-side switches for an installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOptions {
  /// The target system is shared; private stacks may not be installed on it.
  pub public_system: bool,
  /// Run `make install` through `sudo`.
  pub sudo: bool,
  /// Write a manifest for every command run.
  pub record_manifests: bool,
}

impl Default for InstallOptions {
  fn default() -> Self {
    Self {
      public_system: true,
      sudo: false,
      record_manifests: true,
    }
  }
}

impl InstallOptions {
  /// A host runner honoring these options.
  pub fn system_runner(&self) -> SystemRunner {
    SystemRunner::new(self.record_manifests)
  }
}

/// Outcome of a successful installation.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
  /// Components built during this run, in order.
  pub installed: Vec<String>,
  /// Components already complete from an earlier run.
  pub skipped: Vec<String>,
  /// Directories of every component of the stack.
  pub resolution: ResolutionMap,
  /// Environment accumulated over the whole stack.
  pub env: EnvMap,
}

pub struct StackInstaller<'a, R: Runner> {
  stack: &'a Stack,
  runner: &'a R,
  options: InstallOptions,
  layout: StackLayout,
  env: EnvMap,
  resolution: ResolutionMap,
  configure_ids: HashMap<String, String>,
}

impl<'a, R: Runner> StackInstaller<'a, R> {
  pub fn new(stack: &'a Stack, runner: &'a R, options: InstallOptions) -> Self {
    Self {
      stack,
      runner,
      options,
      layout: StackLayout::new(stack.base_dir()),
      env: EnvMap::new(),
      resolution: ResolutionMap::new(),
      configure_ids: HashMap::new(),
    }
  }

  /// Seed the accumulated environment.
  pub fn with_env(mut self, env: EnvMap) -> Self {
    self.env = env;
    self
  }

  /// Install every component of the stack.
  pub fn install(mut self) -> Result<InstallReport> {
    let stack = self.stack;
    let definition = &stack.definition;
    if definition.stack_type == StackType::Private && self.options.public_system {
      return Err(BuildError::Config(format!(
        "stack {} is private and cannot be installed on a public system",
        definition.name
      )));
    }

    self.layout.ensure()?;
    info!(stack = %definition.name, base = ?self.layout.base(), "installing stack");

    let mut report = InstallReport::default();
    for component in &definition.components {
      if self.layout.is_installed(&component.name) {
        info!(component = %component.name, "already installed, skipping");
        self.record(component, None);
        report.skipped.push(component.name.clone());
        continue;
      }
      self.install_component(component)?;
      report.installed.push(component.name.clone());
    }

    info!(
      stack = %definition.name,
      installed = report.installed.len(),
      skipped = report.skipped.len(),
      "stack installed"
    );
    report.resolution = self.resolution;
    report.env = self.env;
    Ok(report)
  }

  fn install_component(&mut self, component: &Component) -> Result<()> {
    let name = component.name.as_str();
    info!(component = %name, "installing component");

    let (mut build_env, recipe) = self.prepare(component).map_err(|e| e.in_component(name, Phase::Prepared))?;

    let acquired = source::acquire(self.runner, name, &component.source(), &build_env)
      .map_err(|e| e.in_component(name, Phase::Acquired))?;
    build_env.set_source(acquired.src_dir.clone(), acquired.src_path.clone());

    let mut detection = Detection::default();
    let system = detection
      .detect(&build_env.src_dir)
      .map_err(|e| e.in_component(name, Phase::Detected))?;
    debug!(component = %name, ?system, "build system");

    Driver::new(self.runner, self.options.sudo)
      .build(&recipe, &mut detection, &build_env)
      .map_err(|e| e.in_component(name, Phase::Built))?;

    ensure_dir(&self.layout.component_install_dir(name)).map_err(|e| e.in_component(name, Phase::Recorded))?;
    let marker = self.layout.completion_marker(name);
    std::fs::write(&marker, "")
      .map_err(|e| BuildError::io(&marker, e).in_component(name, Phase::Recorded))?;
    self.record(component, Some(&acquired));

    info!(component = %name, install_dir = ?self.layout.component_install_dir(name), "component installed");
    Ok(())
  }

  /// Build environment and recipe of `component` from what is recorded so far.
  fn prepare(&self, component: &Component) -> Result<(BuildEnv, Recipe)> {
    let mut env = self.env.clone();
    env.merge(&self.custom_env(component)?);

    let mut configure_args: Vec<String> = component
      .dependencies()
      .into_iter()
      .map(|dep| self.with_flag(dep))
      .collect();
    for param in component.configure_params() {
      configure_args.push(self.resolve_refs(&param)?);
    }

    let recipe = Recipe {
      name: component.name.clone(),
      configure_prelude: component.configure_prelude(),
      configure_args,
      build_script: component.build_script(),
    };
    Ok((BuildEnv::for_stack(self.layout.base(), env), recipe))
  }

  /// The component's `build_env` with its references resolved.
  fn custom_env(&self, component: &Component) -> Result<EnvMap> {
    let mut custom = EnvMap::new();
    for entry in component.build_env.split_whitespace() {
      let entry = self.resolve_refs(entry)?;
      if !custom.insert_entry(&entry) {
        return Err(BuildError::Config(format!(
          "invalid build_env entry '{entry}' for {}, expected KEY=VALUE",
          component.name
        )));
      }
    }
    Ok(custom)
  }

  /// `token` with its `@ref:...@` reference, if any, replaced from the recorded components.
  fn resolve_refs(&self, token: &str) -> Result<String> {
    if reference::has_reference(token) {
      Ok(reference::resolve(token, &self.resolution)?)
    } else {
      Ok(token.to_string())
    }
  }

  /// `--with-<id>=<install dir>` for dependency `dep`.
  fn with_flag(&self, dep: &str) -> String {
    let id = self.configure_ids.get(dep).map(String::as_str).unwrap_or(dep);
    let path = self
      .resolution
      .install_dir(dep)
      .map(|p| p.to_string_lossy().to_string())
      .unwrap_or_default();
    format!("--with-{id}={path}")
  }

  fn record(&mut self, component: &Component, acquired: Option<&Acquired>) {
    let name = component.name.as_str();
    let install_dir = self.layout.component_install_dir(name);
    let fallback = acquired
      .map(|a| a.src_dir.clone())
      .unwrap_or_else(|| install_dir.clone());
    let build_dir = self.discovered(self.layout.component_build_dir(name)).unwrap_or_else(|| fallback.clone());
    let src_dir = self.discovered(self.layout.component_src_dir(name)).unwrap_or(fallback);
    self.resolution.record(name, install_dir.clone(), build_dir, src_dir);

    if !component.configure_id.is_empty() {
      self.configure_ids.insert(component.name.clone(), component.configure_id.clone());
    }

    let bin = install_dir.join("bin");
    if bin.is_dir() {
      self.env.prepend_path(&bin);
      debug!(component = %name, bin = ?bin, "added to PATH");
    }
  }

  fn discovered(&self, found: Result<Option<PathBuf>>) -> Option<PathBuf> {
    match found {
      Ok(path) => path,
      Err(e) => {
        debug!(error = %e, "unable to inspect stack layout");
        None
      }
    }
  }
}
