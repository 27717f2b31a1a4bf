//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use andpython::util::OptionOverrides;

/// Cross-compile CPython for Android using NDK standalone toolchains.
///
/// Every option can also be set through its environment variable or in
/// andpython.toml; flags take precedence over both.
#[derive(Parser, Debug)]
#[command(name = "andpython")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to NDK standalone toolchains [env: NDK_TOOLCHAINS_PATH]
    #[arg(long, value_name = "PATH/TO/ANDROID/TOOLCHAINS")]
    pub ndk_toolchains_dir: Option<String>,

    /// Toolchain directory suffix, usually the compiler version [env: NDK_TOOLCHAIN_SUFFIX]
    #[arg(long, value_name = "4.9")]
    pub ndk_toolchain_suffix: Option<String>,

    /// Comma-separated list of target platforms [env: TARGET_PLATFORMS]
    #[arg(long, value_name = "armeabi,x86,mips")]
    pub platforms: Option<String>,

    /// Path to Python sources [env: PYTHON_SOURCE_PATH]
    #[arg(long, value_name = "PATH/TO/CPYTHON/SOURCE/TREE")]
    pub python_source: Option<String>,

    /// Path to building directory [env: BUILD_DIR_PATH]
    #[arg(long, value_name = "PATH/TO/BUILD/DIR")]
    pub build_dir: Option<String>,

    /// Path to output directory [env: OUTPUT_PATH]
    #[arg(long, value_name = "PATH/TO/OUTPUT/DIRECTORY")]
    pub output_dir: Option<String>,

    /// Config file (defaults to ./andpython.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Patches applied to the source tree before any build
    #[arg(long, value_name = "DIR", default_value = "prepatch")]
    pub prepatch_dir: PathBuf,

    /// Patches applied to each architecture's build tree after configure
    #[arg(long, value_name = "DIR", default_value = "postpatch")]
    pub postpatch_dir: PathBuf,

    /// Number of parallel make jobs (defaults to the CPU count)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Abort when a patch or autoconf step fails instead of warning
    #[arg(long)]
    pub strict_patches: bool,
}

impl Cli {
    /// The option layer supplied on the command line.
    pub fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            platforms: self.platforms.clone(),
            ndk_toolchains_dir: self.ndk_toolchains_dir.clone(),
            ndk_toolchain_suffix: self.ndk_toolchain_suffix.clone(),
            python_source: self.python_source.clone(),
            build_dir: self.build_dir.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_only_contain_given_flags() {
        let cli = Cli::parse_from(["andpython", "--platforms", "x86", "--build-dir", "/b"]);
        let flags = cli.overrides();

        assert_eq!(flags.platforms.as_deref(), Some("x86"));
        assert_eq!(flags.build_dir.as_deref(), Some("/b"));
        assert!(flags.output_dir.is_none());
        assert!(flags.ndk_toolchain_suffix.is_none());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["andpython"]);

        assert_eq!(cli.prepatch_dir, PathBuf::from("prepatch"));
        assert_eq!(cli.postpatch_dir, PathBuf::from("postpatch"));
        assert!(cli.jobs.is_none());
        assert!(!cli.strict_patches);
    }
}
