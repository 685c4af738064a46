//! Git acquisition.
//!
//! Repositories are cloned into `<target_dir>/<repo_name>` with the `git`
//! binary found on the build environment's `PATH`.

use std::path::{Path, PathBuf};

use tracing::info;

use super::url::repo_name;
use crate::env::EnvMap;
use crate::error::Result;
use crate::exec::{CommandSpec, Runner};

/// Clone `url` into `target_dir`, or update an existing clone.
///
/// When `branch` is set, `prelude` (if any) runs in the checkout first, then the
/// branch is checked out. An existing clone with a declared branch is fetched
/// rather than pulled, because a tag checkout leaves no upstream to pull from.
pub fn clone_or_update(
  runner: &impl Runner,
  url: &str,
  branch: Option<&str>,
  prelude: Option<&str>,
  target_dir: &Path,
  env: &EnvMap,
) -> Result<PathBuf> {
  let git = runner.find_tool("git", env)?;
  let checkout = target_dir.join(repo_name(url));

  if checkout.exists() {
    let update = match branch {
      Some(_) => CommandSpec::new(&git, &checkout).args(["fetch", "--tags", "origin"]),
      None => CommandSpec::new(&git, &checkout).arg("pull"),
    };
    info!(path = ?checkout, "updating existing clone");
    runner.run(&update.env(env))?;
  } else {
    info!(url, path = ?checkout, "cloning repository");
    let clone = CommandSpec::new(&git, target_dir)
      .arg("clone")
      .arg(url)
      .arg(checkout.to_string_lossy())
      .env(env);
    runner.run(&clone)?;
  }

  if let Some(branch) = branch {
    if let Some(prelude) = prelude {
      run_prelude(runner, prelude, &checkout, env)?;
    }
    info!(branch, "checking out branch");
    runner.run(&CommandSpec::new(&git, &checkout).arg("checkout").arg(branch).env(env))?;
  }

  Ok(checkout)
}

/// Build the command for a space-separated prelude, run from `cwd`.
///
/// Returns `None` for a blank prelude.
pub(crate) fn prelude_command(
  runner: &impl Runner,
  prelude: &str,
  cwd: &Path,
  env: &EnvMap,
) -> Result<Option<CommandSpec>> {
  let mut tokens = prelude.split_whitespace();
  let Some(program) = tokens.next() else {
    return Ok(None);
  };
  let program = runner.find_tool(program, env)?;
  Ok(Some(CommandSpec::new(program, cwd).args(tokens).env(env)))
}

fn run_prelude(runner: &impl Runner, prelude: &str, cwd: &Path, env: &EnvMap) -> Result<()> {
  if let Some(cmd) = prelude_command(runner, prelude, cwd, env)? {
    runner.run(&cmd)?;
  }
  Ok(())
}
