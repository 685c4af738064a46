//! End-to-end tests running real `tar`, `make` and `git` against locally
//! generated sources. Each test returns early when a tool it needs is missing.

mod integration {
  pub mod common;
  mod archive_tests;
  mod install_tests;
}
