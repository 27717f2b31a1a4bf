//! High-level operations.
//!
//! One module per pipeline stage, plus [`xcompile`] which runs them in order.

pub mod errors;
pub mod host_build;
pub mod patch;
pub mod target_build;
pub mod xcompile;

pub use errors::BuildError;
pub use host_build::{build_host_python, StageOutcome};
pub use patch::{apply_patch_dir, regenerate_sources, PatchPolicy};
pub use target_build::{build_target, ArchState, TargetBuildOptions};
pub use xcompile::{default_jobs, xcompile, XcompileOptions, XcompileReport};
