//! The full cross-compilation pipeline.
//!
//! Stages run strictly in order and any fatal error aborts the run. Output
//! directories may be left half-built; rerunning skips whatever already has
//! its interpreter installed.

use anyhow::Result;

use crate::builder::context::BuildEnv;
use crate::core::arch::parse_platforms;
use crate::core::layout::Layout;
use crate::ops::host_build::{build_host_python, StageOutcome};
use crate::ops::patch::{apply_patch_dir, regenerate_sources, PatchPolicy};
use crate::ops::target_build::{build_target, ArchState, TargetBuildOptions};
use crate::util::config::Options;
use crate::util::process::CommandRunner;

/// Options for a cross-compilation run.
#[derive(Debug, Clone)]
pub struct XcompileOptions {
    pub options: Options,
    pub layout: Layout,
    /// Parallel `make` jobs
    pub jobs: usize,
    pub patch_policy: PatchPolicy,
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XcompileReport {
    pub host: StageOutcome,
    /// Final state per architecture, in build order
    pub targets: Vec<(String, ArchState)>,
}

/// Default number of `make` jobs: the detected CPU count.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Run all three stages.
///
/// `env` is the environment captured before anything ran; every stage
/// derives its own environment from it.
pub fn xcompile(
    opts: &XcompileOptions,
    env: &BuildEnv,
    runner: &mut dyn CommandRunner,
) -> Result<XcompileReport> {
    let layout = &opts.layout;
    let archs = parse_platforms(&opts.options.platforms)?;

    tracing::info!("Stage 1: Building host python");
    let host = build_host_python(layout, env, opts.jobs, runner)?;
    let host_env = env.with_host_python(&layout.host_install_dir());

    tracing::info!("Stage 2: applying patches to Python source tree");
    apply_patch_dir(
        &layout.prepatch_dir,
        &layout.python_source,
        &host_env,
        opts.patch_policy,
        runner,
    )?;
    regenerate_sources(&layout.python_source, &host_env, opts.patch_policy, runner)?;

    tracing::info!("Stage 3: Building android python");
    let target_opts = TargetBuildOptions {
        layout,
        env: &host_env,
        toolchain_suffix: &opts.options.ndk_toolchain_suffix,
        jobs: opts.jobs,
        patch_policy: opts.patch_policy,
    };

    let mut targets = Vec::with_capacity(archs.len());
    for arch in archs {
        let state = build_target(arch, &target_opts, runner)?;
        targets.push((arch.tag.to_string(), state));
    }

    Ok(XcompileReport { host, targets })
}
