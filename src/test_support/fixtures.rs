//! Scratch directory trees for stage tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::builder::context::BuildEnv;
use crate::core::arch::Arch;
use crate::core::layout::Layout;
use crate::util::config::Options;

/// A temporary source/build/output tree.
pub struct TestTree {
    pub tmp: TempDir,
    pub options: Options,
    pub layout: Layout,
}

impl TestTree {
    /// Create an empty tree with patch directories in place.
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let root = tmp.path();

        let options = Options {
            ndk_toolchains_dir: root.join("ndk"),
            python_source: root.join("cpython"),
            build_dir: root.join("build"),
            output_dir: root.join("out"),
            ..Options::default()
        };
        let layout = Layout::new(&options, root, Path::new("prepatch"), Path::new("postpatch"));

        std::fs::create_dir_all(&layout.python_source).expect("failed to create source dir");
        std::fs::create_dir_all(&layout.prepatch_dir).expect("failed to create prepatch dir");
        std::fs::create_dir_all(&layout.postpatch_dir).expect("failed to create postpatch dir");

        TestTree { tmp, options, layout }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Environment with a fixed base `PATH`.
    pub fn env(&self) -> BuildEnv {
        BuildEnv::new("/usr/bin:/bin", None)
    }

    /// Create an empty file, and its parent directories.
    pub fn touch(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = self.root().join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, "").expect("failed to write file");
        path
    }

    /// Pretend the host build already happened.
    pub fn with_host_artifacts(self) -> Self {
        self.touch(self.layout.host_python());
        self.touch(self.layout.host_pgen());
        self
    }

    /// Pretend the target build for `tag` already happened.
    pub fn with_target_artifact(self, tag: &str) -> Self {
        let arch = Arch::lookup(tag).expect("unknown arch");
        self.touch(self.layout.target_python(arch));
        self
    }
}

impl Default for TestTree {
    fn default() -> Self {
        TestTree::new()
    }
}
