//! Where everything lives on disk.
//!
//! Presence of the interpreter and pgen binaries is the only "already
//! built" signal; there is no manifest or timestamp check.

use std::path::{Path, PathBuf};

use crate::core::arch::Arch;
use crate::util::config::Options;
use crate::util::fs::absolutize;

/// Installed interpreter, relative to an install prefix.
pub const PYTHON_BIN: &str = "bin/python3";

/// Parser generator, relative to a build directory.
pub const PGEN_BIN: &str = "Parser/pgen";

/// Written by `configure`; its presence means the tree needs `make distclean`.
pub const MAKEFILE: &str = "Makefile";

/// Resolved directory layout for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub python_source: PathBuf,
    pub toolchains_dir: PathBuf,
    pub build_dir: PathBuf,
    pub output_dir: PathBuf,
    pub prepatch_dir: PathBuf,
    pub postpatch_dir: PathBuf,
}

impl Layout {
    /// Build the layout, anchoring relative paths at `cwd`.
    pub fn new(options: &Options, cwd: &Path, prepatch_dir: &Path, postpatch_dir: &Path) -> Self {
        Layout {
            python_source: absolutize(cwd, &options.python_source),
            toolchains_dir: absolutize(cwd, &options.ndk_toolchains_dir),
            build_dir: absolutize(cwd, &options.build_dir),
            output_dir: absolutize(cwd, &options.output_dir),
            prepatch_dir: absolutize(cwd, prepatch_dir),
            postpatch_dir: absolutize(cwd, postpatch_dir),
        }
    }

    /// `configure` script of the source tree.
    pub fn configure_script(&self) -> PathBuf {
        self.python_source.join("configure")
    }

    pub fn host_install_dir(&self) -> PathBuf {
        self.build_dir.join("hostpython")
    }

    pub fn host_build_dir(&self) -> PathBuf {
        self.build_dir.join("hostpython_build")
    }

    pub fn host_python(&self) -> PathBuf {
        self.host_install_dir().join(PYTHON_BIN)
    }

    /// pgen from the host build; the cross build cannot run its own.
    pub fn host_pgen(&self) -> PathBuf {
        self.host_build_dir().join(PGEN_BIN)
    }

    pub fn target_build_dir(&self, arch: &Arch) -> PathBuf {
        self.build_dir.join(format!("andbuild-{}", arch.tag))
    }

    pub fn target_install_dir(&self, arch: &Arch) -> PathBuf {
        self.output_dir.join("andpython").join(arch.tag)
    }

    pub fn target_python(&self, arch: &Arch) -> PathBuf {
        self.target_install_dir(arch).join(PYTHON_BIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let options = Options {
            build_dir: PathBuf::from("/b"),
            output_dir: PathBuf::from("out"),
            python_source: PathBuf::from("/src/cpython"),
            ..Options::default()
        };
        let layout = Layout::new(
            &options,
            Path::new("/work"),
            Path::new("prepatch"),
            Path::new("/patches/post"),
        );
        let x86 = Arch::lookup("x86").unwrap();

        assert_eq!(layout.host_python(), PathBuf::from("/b/hostpython/bin/python3"));
        assert_eq!(layout.host_pgen(), PathBuf::from("/b/hostpython_build/Parser/pgen"));
        assert_eq!(layout.target_build_dir(x86), PathBuf::from("/b/andbuild-x86"));
        assert_eq!(
            layout.target_python(x86),
            PathBuf::from("/work/out/andpython/x86/bin/python3")
        );
        assert_eq!(layout.configure_script(), PathBuf::from("/src/cpython/configure"));
        assert_eq!(layout.toolchains_dir, PathBuf::from("/work/android-toolchains"));
        assert_eq!(layout.prepatch_dir, PathBuf::from("/work/prepatch"));
        assert_eq!(layout.postpatch_dir, PathBuf::from("/patches/post"));
    }
}
