//! Shared utilities.
//!
//! Filesystem helpers used across the crate, plus test doubles.

pub mod fs;

#[cfg(test)]
pub mod testutil;
