//! Export, import and modulefile generation of an installed stack.

use serde_json::json;
use stackbuild_lib::exec::SystemRunner;
use stackbuild_lib::module;
use stackbuild_lib::stack::{self, InstallOptions, StackInstaller};

use super::common::{TestStack, hello_tree, have_tools};

#[test]
fn export_import_and_modules_round_trip() {
  if !have_tools(&["tar", "bzip2", "make"]) {
    return;
  }
  let built = TestStack::new();
  let tree = hello_tree(&built.upstream(), "hello-1.0");
  built.write("public", json!([{ "name": "hello", "URL": format!("file://{}", tree.display()) }]));
  let installed = built.load();
  let runner = SystemRunner::new(false);
  StackInstaller::new(&installed, &runner, InstallOptions::default())
    .install()
    .unwrap();

  let archive = stack::export(&runner, &installed).unwrap();
  assert_eq!(archive, built.base_dir().join("test.tar.bz2"));

  let target = TestStack::new();
  target.write("public", json!([{ "name": "hello", "URL": "https://example.com/hello-1.0.tar.gz" }]));
  let imported = target.load();
  let base = stack::import(&runner, &imported, &archive).unwrap();

  let helloworld = base.join("install").join("hello").join("bin").join("helloworld");
  assert!(helloworld.is_file());

  // The imported stack has no build tree; modulefiles still describe the install.
  let written = module::generate(&imported, "Copyright (c) Example Lab", "").unwrap();
  assert_eq!(written, vec![base.join("modulefiles").join("hello")]);
  let content = std::fs::read_to_string(&written[0]).unwrap();
  assert!(content.starts_with("#%Module1.0\n\nCopyright (c) Example Lab\n"));
  assert!(content.contains(&format!("setenv HELLO_DIR {}", base.join("install").join("hello").display())));
  assert!(content.contains(&format!(
    "prepend-path PATH {}",
    base.join("install").join("hello").join("bin").display()
  )));
  assert!(!content.contains("HELLO_BUILD_DIR"));
}
