//! Patch application and source regeneration.
//!
//! Patches are applied with `patch -N -p1`, so a patch that is already in
//! place is refused rather than reversed. On a rerun every patch reports
//! "previously applied" and exits non-zero; that is expected, hence the
//! lenient default.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::context::BuildEnv;
use crate::ops::errors::BuildError;
use crate::util::fs::files_with_extension;
use crate::util::process::{CommandRunner, ProcessBuilder};

/// File extension of patch files.
pub const PATCH_EXTENSION: &str = "patch";

/// Applies the patch file passed as `$1` to the working directory.
const PATCH_SCRIPT: &str = "patch -N -p1 < \"$1\"";

/// How to treat failing patch and regeneration commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatchPolicy {
    /// Log a warning and carry on
    #[default]
    Lenient,
    /// Abort the run
    Strict,
}

/// Apply every `*.patch` file in `patch_dir` to the tree at `tree`, in name order.
///
/// Returns the patches that were attempted. A missing directory applies nothing.
pub fn apply_patch_dir(
    patch_dir: &Path,
    tree: &Path,
    env: &BuildEnv,
    policy: PatchPolicy,
    runner: &mut dyn CommandRunner,
) -> Result<Vec<PathBuf>> {
    if !patch_dir.is_dir() {
        tracing::warn!(
            "patch directory {} not found, nothing to apply",
            patch_dir.display()
        );
        return Ok(Vec::new());
    }

    let patches = files_with_extension(patch_dir, PATCH_EXTENSION)?;
    for patch in &patches {
        let cmd = ProcessBuilder::shell(PATCH_SCRIPT).arg(patch).cwd(tree);
        let code = runner.run(&env.apply(cmd))?;

        if code != 0 {
            match policy {
                PatchPolicy::Strict => {
                    return Err(BuildError::Patch {
                        patch: patch.clone(),
                        code,
                    }
                    .into())
                }
                PatchPolicy::Lenient => tracing::warn!(
                    "patch {} exited with code {} (already applied?)",
                    patch.display(),
                    code
                ),
            }
        }
    }

    Ok(patches)
}

/// Regenerate `pyconfig.h.in` and `configure` in the source tree.
pub fn regenerate_sources(
    python_source: &Path,
    env: &BuildEnv,
    policy: PatchPolicy,
    runner: &mut dyn CommandRunner,
) -> Result<()> {
    for tool in ["autoheader", "autoconf"] {
        let cmd = env.apply(ProcessBuilder::new(tool).cwd(python_source));
        let code = runner.run(&cmd)?;

        if code != 0 {
            match policy {
                PatchPolicy::Strict => {
                    return Err(BuildError::Regenerate {
                        command: cmd.display_command(),
                        code,
                    }
                    .into())
                }
                PatchPolicy::Lenient => {
                    tracing::warn!("`{}` exited with code {}", tool, code)
                }
            }
        }
    }

    Ok(())
}
