use anyhow::Result;
use stackbuild_lib::stack::Stack;

use crate::output::{print_item, print_stat};

pub fn cmd_info(stack: &Stack) -> Result<()> {
  let definition = &stack.definition;
  println!("Stack:");
  print_stat("Name", &definition.name);
  print_stat("System", non_empty(&definition.system));
  print_stat("Type", definition.stack_type.as_str());
  print_stat("Base dir", &stack.base_dir().display().to_string());

  println!("Components:");
  if definition.components.is_empty() {
    println!("  (none)");
  }
  for component in &definition.components {
    let deps = component.dependencies();
    if deps.is_empty() {
      print_item(&component.name);
    } else {
      print_item(&format!("{} (after {})", component.name, deps.join(", ")));
    }
  }
  Ok(())
}

fn non_empty(value: &str) -> &str {
  if value.is_empty() { "(any)" } else { value }
}
