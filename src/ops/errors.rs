//! Fatal build errors.

use std::path::PathBuf;

use thiserror::Error;

/// A failure that aborts the cross-compilation run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Could not build host python: `{step}` exited with code {code}; see logs for details.")]
    HostBuild { step: String, code: i32 },

    #[error("Configuration failed for arch: {arch}; see logs for details.")]
    Configure { arch: String, code: i32 },

    #[error("Build failed for arch: {arch} (`{step}` exited with code {code})")]
    TargetBuild { arch: String, step: String, code: i32 },

    #[error("patch `{}` failed to apply (exit code {code})", .patch.display())]
    Patch { patch: PathBuf, code: i32 },

    #[error("`{command}` failed with exit code {code}")]
    Regenerate { command: String, code: i32 },

    #[error("unknown platform `{tag}` (supported: {supported})")]
    UnknownPlatform { tag: String, supported: String },
}

impl BuildError {
    /// Exit code of the subprocess behind this error, if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildError::HostBuild { code, .. }
            | BuildError::Configure { code, .. }
            | BuildError::TargetBuild { code, .. }
            | BuildError::Patch { code, .. }
            | BuildError::Regenerate { code, .. } => Some(*code),
            BuildError::UnknownPlatform { .. } => None,
        }
    }
}
