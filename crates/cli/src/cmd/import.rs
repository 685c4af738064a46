use std::path::Path;

use anyhow::{Context, Result, bail};
use stackbuild_lib::exec::SystemRunner;
use stackbuild_lib::stack::{self, Stack};

use crate::output::print_success;

/// Unpack an exported archive into the stack base directory.
pub fn cmd_import(stack: &Stack, archive: &Path) -> Result<()> {
  if !archive.is_file() {
    bail!("Archive not found: {}", archive.display());
  }
  let runner = SystemRunner::new(false);
  let base = stack::import(&runner, stack, archive)
    .with_context(|| format!("Failed to import {} into stack {}", archive.display(), stack.name()))?;
  print_success(&format!("Imported {} into {}", archive.display(), base.display()));
  Ok(())
}
