//! stackbuild-lib: build and install stacks of interdependent software components
//!
//! A stack is an ordered list of components, each fetched from a URL and built
//! from source into `<install_dir>/<stack>/install/<component>`:
//! - `source`: fetch tarballs, copy local trees, clone Git repositories
//! - `detect`: classify a source tree (autogen, configure, Makefile)
//! - `driver`: run configure, make and make install
//! - `reference`: resolve `@ref:<component>_<kind>@` tokens
//! - `stack`: load stack documents and install, export or import whole stacks
//! - `module`: emit environment modulefiles for an installed stack

pub mod buildenv;
pub mod consts;
pub mod detect;
pub mod driver;
pub mod env;
pub mod error;
pub mod exec;
pub mod module;
pub mod reference;
pub mod source;
pub mod stack;
pub mod util;

pub use error::{BuildError, Phase, Result};
