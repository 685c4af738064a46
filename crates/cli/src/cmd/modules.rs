//! Implementation of the `stackbuild modules` command.

use anyhow::{Context, Result};
use stackbuild_lib::module;
use stackbuild_lib::stack::Stack;

use crate::output::{print_item, print_success};

pub fn cmd_modules(stack: &Stack, copyright: &str, prefix: &str) -> Result<()> {
  let written = module::generate(stack, copyright, prefix)
    .with_context(|| format!("Failed to write modulefiles for stack {}", stack.name()))?;

  print_success(&format!("Wrote {} modulefile(s)", written.len()));
  for path in &written {
    print_item(&path.display().to_string());
  }
  Ok(())
}
