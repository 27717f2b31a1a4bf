//! Stage 3: cross-compile python for one Android architecture.

use std::fmt;

use anyhow::Result;

use crate::builder::context::BuildEnv;
use crate::builder::toolchain::{build_triple, NdkToolchain};
use crate::core::arch::Arch;
use crate::core::layout::{Layout, MAKEFILE};
use crate::ops::errors::BuildError;
use crate::ops::patch::{apply_patch_dir, PatchPolicy};
use crate::util::fs::ensure_dir;
use crate::util::process::{path_arg, CommandRunner, ProcessBuilder};

/// Cache values `configure` cannot probe when cross-compiling.
const CROSS_CONFIGURE_ARGS: &[&str] = &[
    "--disable-ipv6",
    "ac_cv_file__dev_ptmx=no",
    "ac_cv_file__dev_ptc=no",
    "ac_cv_little_endian_double=no",
    "--without-ensurepip",
];

/// Progress of one architecture through the target build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchState {
    Pending,
    Configured,
    Built,
    Installed,
    /// The interpreter was already installed
    Skipped,
}

impl fmt::Display for ArchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArchState::Pending => "pending",
            ArchState::Configured => "configured",
            ArchState::Built => "built",
            ArchState::Installed => "installed",
            ArchState::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Settings shared by every architecture in a run.
#[derive(Debug, Clone, Copy)]
pub struct TargetBuildOptions<'a> {
    pub layout: &'a Layout,
    /// Environment after the host build (host python on the search paths)
    pub env: &'a BuildEnv,
    pub toolchain_suffix: &'a str,
    pub jobs: usize,
    pub patch_policy: PatchPolicy,
}

/// Configure, patch, build and install python for `arch`.
///
/// Skipped when the architecture's interpreter is already installed.
pub fn build_target(
    arch: &Arch,
    opts: &TargetBuildOptions<'_>,
    runner: &mut dyn CommandRunner,
) -> Result<ArchState> {
    let layout = opts.layout;
    tracing::info!("Building for {}", arch);

    let toolchain = NdkToolchain::locate(&layout.toolchains_dir, arch, opts.toolchain_suffix);
    let build_dir = layout.target_build_dir(arch);
    let install_dir = layout.target_install_dir(arch);
    let env = opts
        .env
        .for_toolchain(&toolchain, &layout.python_source, &build_dir);

    ensure_dir(&build_dir)?;

    if layout.target_python(arch).is_file() {
        tracing::info!("Nothing to do for {}", arch);
        return Ok(ArchState::Skipped);
    }

    let mut state = ArchState::Pending;
    let command = |cmd: ProcessBuilder| env.apply(cmd.cwd(&build_dir));

    if build_dir.join(MAKEFILE).is_file() {
        let code = runner.run(&command(ProcessBuilder::new("make").arg("distclean")))?;
        if code != 0 {
            tracing::warn!("`make distclean` exited with code {} for {}", code, arch);
        }
    }

    // Configure first: the post-configure patches apply to the generated build tree.
    let configure = command(
        ProcessBuilder::new(layout.configure_script())
            .arg("--enable-shared")
            .arg(path_arg("--prefix=", &install_dir))
            .arg(format!("--build={}", build_triple()))
            .arg(format!("--host={}", toolchain.host_triple))
            .args(CROSS_CONFIGURE_ARGS),
    );
    let code = runner.run(&configure)?;
    if code != 0 {
        return Err(BuildError::Configure {
            arch: arch.tag.to_string(),
            code,
        }
        .into());
    }
    state = advance(arch, state, ArchState::Configured);

    apply_patch_dir(&layout.postpatch_dir, &build_dir, &env, opts.patch_policy, runner)?;

    let steps = [
        (
            ArchState::Built,
            ProcessBuilder::new("make")
                .arg(format!("-j{}", opts.jobs))
                .arg(path_arg("HOSTPGEN=", &layout.host_pgen())),
        ),
        (ArchState::Installed, ProcessBuilder::new("make").arg("install")),
    ];

    for (next, step) in steps {
        let cmd = command(step);
        let code = runner.run(&cmd)?;
        if code != 0 {
            return Err(BuildError::TargetBuild {
                arch: arch.tag.to_string(),
                step: cmd.display_command(),
                code,
            }
            .into());
        }
        state = advance(arch, state, next);
    }

    Ok(state)
}

fn advance(arch: &Arch, from: ArchState, to: ArchState) -> ArchState {
    tracing::debug!("{}: {} -> {}", arch, from, to);
    to
}
