//! Build environment threaded through the stages.
//!
//! Each stage derives a new [`BuildEnv`] from the previous one and applies
//! it to the commands it runs. The process environment itself is never
//! modified.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::builder::toolchain::NdkToolchain;
use crate::util::process::ProcessBuilder;

/// Search paths and compiler flags for one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnv {
    /// `PATH` as captured before any stage ran
    base_path: OsString,

    /// `PATH` for this stage
    path: OsString,

    /// `LD_LIBRARY_PATH` for this stage, if any
    ld_library_path: Option<OsString>,

    /// `CFLAGS` override, if any
    cflags: Option<String>,

    /// `LDFLAGS` override, if any
    ldflags: Option<String>,
}

impl BuildEnv {
    /// Create an environment from explicit search paths.
    pub fn new(path: impl Into<OsString>, ld_library_path: Option<OsString>) -> Self {
        let path = path.into();
        BuildEnv {
            base_path: path.clone(),
            path,
            ld_library_path,
            cflags: None,
            ldflags: None,
        }
    }

    /// Capture `PATH` and `LD_LIBRARY_PATH` from the current process.
    pub fn from_process() -> Self {
        BuildEnv::new(
            std::env::var_os("PATH").unwrap_or_default(),
            std::env::var_os("LD_LIBRARY_PATH"),
        )
    }

    /// Put the host python installed in `install_dir` first on the search paths.
    pub fn with_host_python(&self, install_dir: &Path) -> Self {
        BuildEnv {
            path: prepend(&install_dir.join("bin"), Some(self.path.as_os_str())),
            ld_library_path: Some(prepend(
                &install_dir.join("lib"),
                self.ld_library_path.as_deref(),
            )),
            ..self.clone()
        }
    }

    /// Environment for a cross build with `toolchain`.
    ///
    /// `PATH` is rebuilt from the base path so toolchains never accumulate
    /// across architectures. `LD_LIBRARY_PATH` is carried over.
    pub fn for_toolchain(&self, toolchain: &NdkToolchain, python_source: &Path, build_dir: &Path) -> Self {
        BuildEnv {
            path: prepend(&toolchain.bin_dir(), Some(self.base_path.as_os_str())),
            cflags: Some(toolchain.cflags(python_source)),
            ldflags: Some(toolchain.ldflags(build_dir)),
            ..self.clone()
        }
    }

    pub fn path(&self) -> &OsStr {
        &self.path
    }

    pub fn ld_library_path(&self) -> Option<&OsStr> {
        self.ld_library_path.as_deref()
    }

    pub fn cflags(&self) -> Option<&str> {
        self.cflags.as_deref()
    }

    pub fn ldflags(&self) -> Option<&str> {
        self.ldflags.as_deref()
    }

    /// Apply this environment to a command.
    pub fn apply(&self, cmd: ProcessBuilder) -> ProcessBuilder {
        let mut cmd = cmd.env("PATH", &self.path);
        if let Some(ref ld) = self.ld_library_path {
            cmd = cmd.env("LD_LIBRARY_PATH", ld);
        }
        if let Some(ref cflags) = self.cflags {
            cmd = cmd.env("CFLAGS", cflags);
        }
        if let Some(ref ldflags) = self.ldflags {
            cmd = cmd.env("LDFLAGS", ldflags);
        }
        cmd
    }
}

/// `dir` followed by `rest` in `PATH` syntax.
fn prepend(dir: &Path, rest: Option<&OsStr>) -> OsString {
    let mut paths: Vec<PathBuf> = vec![dir.to_path_buf()];
    if let Some(rest) = rest.filter(|r| !r.is_empty()) {
        paths.extend(std::env::split_paths(rest));
    }
    // Only fails if a path contains the separator; fall back to plain concatenation.
    std::env::join_paths(&paths).unwrap_or_else(|_| {
        let mut joined = dir.as_os_str().to_os_string();
        if let Some(rest) = rest.filter(|r| !r.is_empty()) {
            joined.push(":");
            joined.push(rest);
        }
        joined
    })
}
