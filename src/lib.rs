//! andpython - cross-compile CPython for Android
//!
//! This crate drives a three-stage build: a native host python (for its
//! parser generator), patching of the CPython source tree, and a configure,
//! build and install pass per Android architecture using NDK standalone
//! toolchains.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for andpython unit tests.
///
/// Only available when compiling tests. Provides a mock command runner and
/// scratch directory trees.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildEnv, NdkToolchain};
pub use self::core::{Arch, Layout, ARCHS};
pub use ops::{xcompile, BuildError, XcompileOptions, XcompileReport};
pub use util::config::Options;
