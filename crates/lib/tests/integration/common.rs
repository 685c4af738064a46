//! Shared helpers for integration tests.
//!
//! `have_tools` and `write_file` mirror `src/util/testutil.rs`, which is only
//! compiled for unit tests. Keep the two copies in step.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::json;
use stackbuild_lib::stack::Stack;
use tempfile::TempDir;

/// Returns true when every tool in `tools` is available on the host.
pub fn have_tools(tools: &[&str]) -> bool {
  tools.iter().all(|t| which::which(t).is_ok())
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
}

pub fn write_executable(path: &Path, content: &str) {
  write_file(path, content);
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// A configure script that records its arguments and writes a Makefile whose
/// `install` target places `bin/helloworld` under `--prefix`.
const CONFIGURE: &str = "#!/bin/sh
prefix=/usr/local
for arg in \"$@\"; do
  case \"$arg\" in
    --prefix=*) prefix=\"${arg#--prefix=}\" ;;
  esac
done
echo \"$@\" > configure.args
env > configure.env
cat > Makefile <<EOF
PREFIX = $prefix
all:
\tcp helloworld.sh helloworld
\tchmod +x helloworld
install: all
\tmkdir -p \\$(PREFIX)/bin
\tcp helloworld \\$(PREFIX)/bin/helloworld
EOF
";

const HELLOWORLD: &str = "#!/bin/sh\necho 'Hello World!'\n";

/// Write an autotools-like source tree named `dir_name` under `root`.
pub fn hello_tree(root: &Path, dir_name: &str) -> PathBuf {
  let dir = root.join(dir_name);
  write_executable(&dir.join("configure"), CONFIGURE);
  write_executable(&dir.join("helloworld.sh"), HELLOWORLD);
  dir
}

/// Pack a hello tree into `<root>/<dir_name>.tar.gz` and return the tarball path.
pub fn hello_tarball(root: &Path, dir_name: &str) -> PathBuf {
  let staging = root.join("staging");
  hello_tree(&staging, dir_name);
  let tarball = root.join(format!("{dir_name}.tar.gz"));
  let status = Command::new("tar")
    .arg("-czf")
    .arg(&tarball)
    .arg(dir_name)
    .current_dir(&staging)
    .status()
    .unwrap();
  assert!(status.success(), "failed to create {}", tarball.display());
  tarball
}

/// Initialize a Git repository holding a hello tree, with a `v1.0` tag.
pub fn hello_repo(root: &Path, repo_name: &str) -> PathBuf {
  let repo = hello_tree(root, repo_name);
  let git = |args: &[&str]| {
    let status = Command::new("git")
      .args(["-c", "user.name=stackbuild", "-c", "user.email=stackbuild@example.com"])
      .args(args)
      .current_dir(&repo)
      .status()
      .unwrap();
    assert!(status.success(), "git {args:?} failed");
  };
  git(&["init", "-q"]);
  git(&["add", "."]);
  git(&["commit", "-q", "-m", "initial"]);
  git(&["tag", "v1.0"]);
  repo
}

/// Test stack whose documents are written to disk.
pub struct TestStack {
  pub temp: TempDir,
  pub definition_path: PathBuf,
  pub config_path: PathBuf,
}

impl TestStack {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let definition_path = temp.path().join("stack.json");
    let config_path = temp.path().join("config.json");
    Self {
      temp,
      definition_path,
      config_path,
    }
  }

  /// Write a `test` stack for system `host` with the given components.
  pub fn write(&self, stack_type: &str, components: serde_json::Value) {
    let definition = json!({
      "name": "test",
      "system": "host",
      "type": stack_type,
      "components": components,
    });
    let config = json!({
      "installDir": self.temp.path().join("stacks"),
      "system": "host",
    });
    write_file(&self.definition_path, &definition.to_string());
    write_file(&self.config_path, &config.to_string());
  }

  /// Directory for generated upstream sources.
  pub fn upstream(&self) -> PathBuf {
    self.temp.path().join("upstream")
  }

  pub fn load(&self) -> Stack {
    Stack::load(&self.definition_path, &self.config_path).unwrap()
  }

  pub fn base_dir(&self) -> PathBuf {
    self.temp.path().join("stacks").join("test")
  }
}
