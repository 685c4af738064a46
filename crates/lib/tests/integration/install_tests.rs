//! Installing stacks end to end with real build tools.

use serde_json::json;
use stackbuild_lib::BuildError;
use stackbuild_lib::env::EnvMap;
use stackbuild_lib::exec::{SystemRunner, manifest_path};
use stackbuild_lib::reference::RefKind;
use stackbuild_lib::stack::{InstallOptions, StackInstaller};

use super::common::{TestStack, hello_repo, hello_tarball, hello_tree, have_tools};

fn file_url(path: &std::path::Path) -> String {
  format!("file://{}", path.display())
}

#[test]
fn tarball_component_installs_helloworld() {
  if !have_tools(&["tar", "gzip", "make"]) {
    return;
  }
  let test = TestStack::new();
  let tarball = hello_tarball(&test.upstream(), "c_hello_world-1.0");
  test.write("public", json!([{ "name": "c_hello_world", "URL": file_url(&tarball) }]));
  let stack = test.load();
  let options = InstallOptions::default();

  let report = StackInstaller::new(&stack, &options.system_runner(), options)
    .install()
    .unwrap();

  let install_dir = report.resolution.get("c_hello_world", RefKind::InstallDir).unwrap();
  assert_eq!(install_dir, test.base_dir().join("install").join("c_hello_world"));
  assert!(install_dir.join("bin").join("helloworld").is_file());
  assert_eq!(
    report.resolution.get("c_hello_world", RefKind::BuildDir).unwrap(),
    test.base_dir().join("build").join("c_hello_world").join("c_hello_world-1.0")
  );
  assert_eq!(report.env.path_dirs()[0], install_dir.join("bin"));
  assert!(manifest_path(install_dir, "configure").is_file());
  assert!(manifest_path(install_dir, "make_install").is_file());
}

#[test]
fn dependent_configures_with_dependency_install_dir() {
  if !have_tools(&["tar", "gzip", "make"]) {
    return;
  }
  let test = TestStack::new();
  let a = hello_tarball(&test.upstream(), "A-1.0");
  let b = hello_tarball(&test.upstream(), "B-2.0");
  test.write(
    "public",
    json!([
      { "name": "A", "URL": file_url(&a) },
      { "name": "B", "URL": file_url(&b), "configure_dependency": "A", "configure_params": "--enable-hello" },
    ]),
  );
  let stack = test.load();

  StackInstaller::new(&stack, &SystemRunner::new(false), InstallOptions::default())
    .install()
    .unwrap();

  let b_src = test.base_dir().join("build").join("B").join("B-2.0");
  let args = std::fs::read_to_string(b_src.join("configure.args")).unwrap();
  let a_install = test.base_dir().join("install").join("A");
  assert_eq!(
    args.trim(),
    format!(
      "--prefix={} --with-A={} --enable-hello",
      test.base_dir().join("install").join("B").display(),
      a_install.display()
    )
  );

  // B was configured with A's bin directory first on PATH.
  let env = std::fs::read_to_string(b_src.join("configure.env")).unwrap();
  let path_line = env.lines().find(|l| l.starts_with("PATH=")).unwrap();
  assert!(path_line.starts_with(&format!("PATH={}", a_install.join("bin").display())));
}

#[test]
fn rerun_reuses_completed_components() {
  if !have_tools(&["make"]) {
    return;
  }
  let test = TestStack::new();
  let tree = hello_tree(&test.upstream(), "hello");
  test.write("public", json!([{ "name": "hello", "URL": file_url(&tree) }]));
  let stack = test.load();

  let first = StackInstaller::new(&stack, &SystemRunner::new(false), InstallOptions::default())
    .install()
    .unwrap();
  let second = StackInstaller::new(&stack, &SystemRunner::new(false), InstallOptions::default())
    .install()
    .unwrap();

  assert_eq!(first.installed, vec!["hello"]);
  assert_eq!(second.skipped, vec!["hello"]);
  assert_eq!(first.env, second.env);
}

#[test]
fn git_component_checks_out_branch() {
  if !have_tools(&["git", "make"]) {
    return;
  }
  let test = TestStack::new();
  let repo = hello_repo(&test.upstream(), "hello.git");
  test.write(
    "public",
    json!([{
      "name": "hello",
      "URL": repo.display().to_string(),
      "branch": "v1.0",
      "branch_checkout_prelude": "git fetch --tags",
    }]),
  );
  let stack = test.load();

  let report = StackInstaller::new(&stack, &SystemRunner::new(false), InstallOptions::default())
    .install()
    .unwrap();

  let checkout = test.base_dir().join("build").join("hello").join("hello");
  assert!(checkout.join(".git").is_dir());
  assert!(
    report
      .resolution
      .get("hello", RefKind::InstallDir)
      .unwrap()
      .join("bin")
      .join("helloworld")
      .is_file()
  );
}

#[test]
fn failing_configure_reports_output() {
  if !have_tools(&["make"]) {
    return;
  }
  let test = TestStack::new();
  let tree = test.upstream().join("broken");
  super::common::write_executable(&tree.join("configure"), "#!/bin/sh\necho checking for cc\necho 'no compiler' >&2\nexit 1\n");
  test.write("public", json!([{ "name": "broken", "URL": file_url(&tree) }]));
  let stack = test.load();

  let err = StackInstaller::new(&stack, &SystemRunner::new(false), InstallOptions::default())
    .with_env(EnvMap::new())
    .install()
    .unwrap_err();

  let message = err.to_string();
  assert!(message.contains("broken"));
  match err.root_cause() {
    BuildError::ProcessFailure { stdout, stderr, code, .. } => {
      assert_eq!(*code, Some(1));
      assert!(stdout.contains("checking for cc"));
      assert!(stderr.contains("no compiler"));
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn private_stack_is_refused_on_public_system() {
  let test = TestStack::new();
  test.write("private", json!([{ "name": "hello", "URL": "https://example.com/hello-1.0.tar.gz" }]));
  let stack = test.load();

  let err = StackInstaller::new(&stack, &SystemRunner::new(false), InstallOptions::default())
    .install()
    .unwrap_err();

  assert!(matches!(err, BuildError::Config(_)));
  assert!(!test.base_dir().exists());
}
