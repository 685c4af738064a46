//! Configure, compile and install driver.
//!
//! Runs the external command sequence for one component in three phases:
//!
//! 1. configure: prelude command, autogen (unless `configure` already exists),
//!    `configure --prefix=<install>/<name> <args>`
//! 2. compile: a custom build script, or `make -j`
//! 3. install: `make -j install`, or a copy of the component build directory
//!
//! Every command runs with the component's accumulated environment and records
//! a manifest under the component install directory.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::buildenv::BuildEnv;
use crate::detect::{self, BuildSystem, CONFIGURE_SCRIPT, Detection};
use crate::error::{BuildError, Result};
use crate::exec::{CommandSpec, Runner};
use crate::source::git::prelude_command;
use crate::util::fs::{copy_tree, ensure_dir, make_executable};

const BUILDDIR: &str = "builddir";

/// How one component is configured and built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipe {
  pub name: String,
  /// Command run from the source tree before configuring.
  pub configure_prelude: Option<String>,
  /// `--with-...` dependency flags followed by the free-form configure parameters.
  pub configure_args: Vec<String>,
  /// Script run instead of `make`.
  pub build_script: Option<PathBuf>,
}

/// A located Makefile and the arguments `make` needs to use it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakefileLocation {
  pub path: PathBuf,
  pub make_args: Vec<String>,
}

/// Look for a Makefile in `src_dir`, then in `src_dir/builddir`.
pub fn find_makefile(src_dir: &Path) -> Option<MakefileLocation> {
  if let Some(path) = detect::find_makefile_in(src_dir) {
    return Some(MakefileLocation {
      path,
      make_args: Vec::new(),
    });
  }
  let path = src_dir.join(BUILDDIR).join("Makefile");
  path.is_file().then(|| MakefileLocation {
    path,
    make_args: vec!["-C".to_string(), BUILDDIR.to_string()],
  })
}

pub struct Driver<'r, R: Runner> {
  runner: &'r R,
  sudo: bool,
}

impl<'r, R: Runner> Driver<'r, R> {
  pub fn new(runner: &'r R, sudo: bool) -> Self {
    Self { runner, sudo }
  }

  /// Configure, compile and install `recipe` from `env.src_dir`.
  pub fn build(&self, recipe: &Recipe, detection: &mut Detection, env: &BuildEnv) -> Result<()> {
    self.configure(recipe, detection, env)?;
    let makefile = self.compile(recipe, env)?;
    self.install(recipe, detection.system(), makefile, env)
  }

  /// Configure phase. A tree without a configure script is left as is.
  pub fn configure(&self, recipe: &Recipe, detection: &mut Detection, env: &BuildEnv) -> Result<()> {
    let src_dir = &env.src_dir;
    let manifest_dir = env.component_install_dir(&recipe.name);

    if let Some(prelude) = recipe.configure_prelude.as_deref().filter(|p| !p.trim().is_empty()) {
      info!(component = %recipe.name, prelude, "running configure prelude");
      self.run_prelude(prelude, src_dir, &manifest_dir, env)?;
    }

    // The prelude may have generated the build system.
    let system = detection.detect(src_dir)?;

    let configure = src_dir.join(CONFIGURE_SCRIPT);
    if system.has_autogen {
      if configure.is_file() {
        info!(component = %recipe.name, "configure script already exists, skipping autogen");
      } else if let Some(script) = detect::autogen_script(src_dir) {
        info!(component = %recipe.name, script = ?script, "running autogen");
        let cmd = CommandSpec::new(script, src_dir)
          .env(&env.env)
          .manifest(&manifest_dir, "autogen");
        self.runner.run(&cmd)?;
      }
    }

    if !system.has_configure || !configure.is_file() {
      info!(component = %recipe.name, "no configure script, skipping configuration");
      return Ok(());
    }

    let prefix = env.component_install_dir(&recipe.name);
    let cmd = CommandSpec::new(configure, src_dir)
      .arg(format!("--prefix={}", prefix.display()))
      .args(recipe.configure_args.iter().cloned())
      .env(&env.env)
      .manifest(&manifest_dir, "configure");
    info!(component = %recipe.name, cmd = %cmd, "configuring");
    self.runner.run(&cmd).map(|_| ())
  }

  /// Compile phase. Returns the Makefile used, if any.
  pub fn compile(&self, recipe: &Recipe, env: &BuildEnv) -> Result<Option<MakefileLocation>> {
    let src_dir = &env.src_dir;
    let manifest_dir = env.component_install_dir(&recipe.name);

    if let Some(script) = &recipe.build_script {
      let file_name = script.file_name().ok_or_else(|| {
        BuildError::Config(format!("invalid build script {} for {}", script.display(), recipe.name))
      })?;
      let dest = src_dir.join(file_name);
      if !dest.exists() {
        std::fs::copy(script, &dest).map_err(|e| BuildError::io(script, e))?;
      }
      make_executable(&dest)?;
      info!(component = %recipe.name, script = ?dest, "building with custom script");
      let cmd = CommandSpec::new(dest, src_dir)
        .env(&env.env)
        .manifest(&manifest_dir, "build_script");
      self.runner.run(&cmd)?;
      return Ok(find_makefile(src_dir));
    }

    let makefile = find_makefile(src_dir).ok_or_else(|| BuildError::NoBuildMechanism {
      component: recipe.name.clone(),
      src_dir: src_dir.clone(),
    })?;
    info!(component = %recipe.name, makefile = ?makefile.path, "compiling");
    self.run_make(&makefile, None, env, &manifest_dir, false)?;
    Ok(Some(makefile))
  }

  /// Install phase.
  pub fn install(
    &self,
    recipe: &Recipe,
    system: BuildSystem,
    makefile: Option<MakefileLocation>,
    env: &BuildEnv,
  ) -> Result<()> {
    let install_dir = env.component_install_dir(&recipe.name);

    if system.has_make_install {
      ensure_dir(&install_dir)?;
      let makefile = makefile
        .or_else(|| find_makefile(&env.src_dir))
        .ok_or_else(|| BuildError::NoBuildMechanism {
          component: recipe.name.clone(),
          src_dir: env.src_dir.clone(),
        })?;
      info!(component = %recipe.name, install_dir = ?install_dir, "installing with make install");
      return self.run_make(&makefile, Some("install"), env, &install_dir, self.sudo);
    }

    let build_dir = env.component_build_dir(&recipe.name);
    info!(component = %recipe.name, from = ?build_dir, to = ?install_dir, "no install target, copying build output");
    copy_tree(&build_dir, &install_dir)
  }

  fn run_prelude(&self, prelude: &str, src_dir: &Path, manifest_dir: &Path, env: &BuildEnv) -> Result<()> {
    if let Some(cmd) = prelude_command(self.runner, prelude, src_dir, &env.env)? {
      self.runner.run(&cmd.manifest(manifest_dir, "configure_prelude"))?;
    }
    Ok(())
  }

  fn run_make(
    &self,
    makefile: &MakefileLocation,
    target: Option<&str>,
    env: &BuildEnv,
    manifest_dir: &Path,
    sudo: bool,
  ) -> Result<()> {
    let make = self.runner.find_tool("make", &env.env)?;
    let mut args = vec!["-j".to_string()];
    args.extend(makefile.make_args.iter().cloned());
    if let Some(target) = target {
      args.push(target.to_string());
    }
    args.extend(env.make_extra_args.iter().cloned());

    let manifest = match target {
      Some(target) => format!("make_{target}"),
      None => "make".to_string(),
    };

    let cmd = if self.sudo_needed(sudo) {
      let sudo = self.runner.find_tool("sudo", &env.env)?;
      CommandSpec::new(sudo, &env.src_dir)
        .arg(make.to_string_lossy())
        .args(args)
    } else {
      CommandSpec::new(make, &env.src_dir).args(args)
    };
    self.runner.run(&cmd.env(&env.env).manifest(manifest_dir, manifest))?;
    Ok(())
  }

  fn sudo_needed(&self, requested: bool) -> bool {
    requested && !running_as_root()
  }
}

#[cfg(unix)]
pub(crate) fn running_as_root() -> bool {
  rustix::process::geteuid().is_root()
}

#[cfg(not(unix))]
pub(crate) fn running_as_root() -> bool {
  false
}
