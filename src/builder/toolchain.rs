//! Android NDK standalone toolchains.
//!
//! A standalone toolchain lives in `{toolchains_dir}/{triple}[-{suffix}]`
//! and exposes its cross-compilers in `bin/` and the Android headers and
//! libraries in `sysroot/`.

use std::path::{Path, PathBuf};

use crate::core::arch::Arch;

/// A standalone NDK toolchain for one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdkToolchain {
    /// Toolchain root directory
    pub root: PathBuf,
    /// Triple passed to `configure --host`
    pub host_triple: &'static str,
}

impl NdkToolchain {
    /// Locate the toolchain for `arch`.
    ///
    /// The suffix (usually the compiler version, e.g. `4.9`) is appended to
    /// the directory name only when it is non-empty. It never changes the
    /// configure host triple.
    pub fn locate(toolchains_dir: &Path, arch: &Arch, suffix: &str) -> Self {
        let name = if suffix.is_empty() {
            arch.triple.to_string()
        } else {
            format!("{}-{}", arch.triple, suffix)
        };

        NdkToolchain {
            root: toolchains_dir.join(name),
            host_triple: arch.triple,
        }
    }

    /// Directory with the cross-compilers.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn sysroot(&self) -> PathBuf {
        self.root.join("sysroot")
    }

    /// `CFLAGS` for a cross build of `python_source`.
    pub fn cflags(&self, python_source: &Path) -> String {
        format!(
            "--sysroot={} -I{}",
            self.sysroot().display(),
            python_source.join("FIXLOCALE").display()
        )
    }

    /// `LDFLAGS` for a cross build in `build_dir`.
    pub fn ldflags(&self, build_dir: &Path) -> String {
        format!(
            "--sysroot={} -L{}",
            self.sysroot().display(),
            build_dir.display()
        )
    }
}

/// Triple of the machine running the build, passed to `configure --build`.
pub fn build_triple() -> String {
    format!("{}-linux-gnu", std::env::consts::ARCH)
}
