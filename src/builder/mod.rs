//! Cross-compilation environment.
//!
//! This module locates NDK toolchains and derives the search paths and
//! compiler flags each stage runs with.

pub mod context;
pub mod toolchain;

pub use context::BuildEnv;
pub use toolchain::{build_triple, NdkToolchain};
