//! Implementation of the `stackbuild install` command.
//!
//! Builds every component of the stack in definition order. Components that
//! completed on an earlier run are skipped.

use std::time::Instant;

use anyhow::{Context, Result};
use stackbuild_lib::stack::{InstallOptions, Stack, StackInstaller};
use tracing::debug;

use crate::output::{format_duration, print_info, print_stat, print_success};

pub fn cmd_install(stack: &Stack, options: InstallOptions) -> Result<()> {
  let start = Instant::now();
  print_info(&format!(
    "Installing stack {} into {}",
    stack.name(),
    stack.base_dir().display()
  ));
  debug!(?options, "install options");

  let runner = options.system_runner();
  let report = StackInstaller::new(stack, &runner, options)
    .install()
    .with_context(|| format!("Failed to install stack {}", stack.name()))?;

  print_success(&format!(
    "Stack {} installed in {}",
    stack.name(),
    format_duration(start.elapsed())
  ));
  print_stat("Built", &report.installed.len().to_string());
  print_stat("Already installed", &report.skipped.len().to_string());
  if let Some(path) = report.env.get("PATH") {
    debug!(path, "accumulated PATH");
  }

  Ok(())
}
