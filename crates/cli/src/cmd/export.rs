use anyhow::{Context, Result};
use stackbuild_lib::exec::SystemRunner;
use stackbuild_lib::stack::{self, Stack};

use crate::output::print_success;

/// Archive `<stack>/install` into `<stack>/<name>.tar.bz2`.
pub fn cmd_export(stack: &Stack) -> Result<()> {
  let runner = SystemRunner::new(false);
  let archive = stack::export(&runner, stack).with_context(|| format!("Failed to export stack {}", stack.name()))?;
  print_success(&format!("Exported {} to {}", stack.name(), archive.display()));
  Ok(())
}
