//! Option resolution for the cross-compiler.
//!
//! Options come from four layers, lowest precedence first:
//! - Built-in defaults
//! - Config file: `andpython.toml` in the invocation directory, or `--config`
//! - Environment variables (see [`OptionKey::env_var`])
//! - Command-line flags
//!
//! A value present in a higher layer replaces the lower one. Values are not
//! validated here; a bad path surfaces later when the command using it fails.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::arch::default_platforms;

/// Name of the config file picked up from the invocation directory.
pub const CONFIG_FILE_NAME: &str = "andpython.toml";

/// The recognized options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Platforms,
    NdkToolchainsDir,
    NdkToolchainSuffix,
    PythonSource,
    BuildDir,
    OutputDir,
}

impl OptionKey {
    pub const ALL: [OptionKey; 6] = [
        OptionKey::Platforms,
        OptionKey::NdkToolchainsDir,
        OptionKey::NdkToolchainSuffix,
        OptionKey::PythonSource,
        OptionKey::BuildDir,
        OptionKey::OutputDir,
    ];

    /// Option name, as used for the flag and the config file key.
    pub fn name(self) -> &'static str {
        match self {
            OptionKey::Platforms => "platforms",
            OptionKey::NdkToolchainsDir => "ndk-toolchains-dir",
            OptionKey::NdkToolchainSuffix => "ndk-toolchain-suffix",
            OptionKey::PythonSource => "python-source",
            OptionKey::BuildDir => "build-dir",
            OptionKey::OutputDir => "output-dir",
        }
    }

    /// Environment variable aliasing this option.
    pub fn env_var(self) -> &'static str {
        match self {
            OptionKey::Platforms => "TARGET_PLATFORMS",
            OptionKey::NdkToolchainsDir => "NDK_TOOLCHAINS_PATH",
            OptionKey::NdkToolchainSuffix => "NDK_TOOLCHAIN_SUFFIX",
            OptionKey::PythonSource => "PYTHON_SOURCE_PATH",
            OptionKey::BuildDir => "BUILD_DIR_PATH",
            OptionKey::OutputDir => "OUTPUT_PATH",
        }
    }
}

/// A partial set of option values: one layer of configuration.
///
/// Used for both the config file and the command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct OptionOverrides {
    pub platforms: Option<String>,
    pub ndk_toolchains_dir: Option<String>,
    pub ndk_toolchain_suffix: Option<String>,
    pub python_source: Option<String>,
    pub build_dir: Option<String>,
    pub output_dir: Option<String>,
}

impl OptionOverrides {
    /// Value supplied for `key` in this layer, if any.
    pub fn get(&self, key: OptionKey) -> Option<&str> {
        let value = match key {
            OptionKey::Platforms => &self.platforms,
            OptionKey::NdkToolchainsDir => &self.ndk_toolchains_dir,
            OptionKey::NdkToolchainSuffix => &self.ndk_toolchain_suffix,
            OptionKey::PythonSource => &self.python_source,
            OptionKey::BuildDir => &self.build_dir,
            OptionKey::OutputDir => &self.output_dir,
        };
        value.as_deref()
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }
}

/// Fully resolved options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Comma-separated architecture tags
    pub platforms: String,

    /// Directory holding the NDK standalone toolchains
    pub ndk_toolchains_dir: PathBuf,

    /// Toolchain directory suffix, usually the compiler version
    pub ndk_toolchain_suffix: String,

    /// CPython source tree
    pub python_source: PathBuf,

    /// Scratch directory for host and target builds
    pub build_dir: PathBuf,

    /// Root of the installed target interpreters
    pub output_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            platforms: default_platforms(),
            ndk_toolchains_dir: PathBuf::from("android-toolchains"),
            ndk_toolchain_suffix: String::new(),
            python_source: PathBuf::from("cpython"),
            build_dir: PathBuf::from("build"),
            output_dir: PathBuf::from("dist"),
        }
    }
}

impl Options {
    /// Resolve options from every layer.
    ///
    /// `env` looks up an environment variable; a variable that is set
    /// overrides even when empty.
    pub fn resolve<F>(file: &OptionOverrides, env: F, flags: &OptionOverrides) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Options::default();

        for key in OptionKey::ALL {
            if let Some(value) = file.get(key) {
                options.set(key, value.to_string());
            }
            if let Some(value) = env(key.env_var()) {
                options.set(key, value);
            }
            if let Some(value) = flags.get(key) {
                options.set(key, value.to_string());
            }
        }

        options
    }

    /// Resolve against the real process environment.
    pub fn from_env(file: &OptionOverrides, flags: &OptionOverrides) -> Self {
        Self::resolve(file, |var| std::env::var(var).ok(), flags)
    }

    fn set(&mut self, key: OptionKey, value: String) {
        match key {
            OptionKey::Platforms => self.platforms = value,
            OptionKey::NdkToolchainsDir => self.ndk_toolchains_dir = value.into(),
            OptionKey::NdkToolchainSuffix => self.ndk_toolchain_suffix = value,
            OptionKey::PythonSource => self.python_source = value.into(),
            OptionKey::BuildDir => self.build_dir = value.into(),
            OptionKey::OutputDir => self.output_dir = value.into(),
        }
    }

    /// Current value of `key`, rendered as a string.
    pub fn get(&self, key: OptionKey) -> String {
        match key {
            OptionKey::Platforms => self.platforms.clone(),
            OptionKey::NdkToolchainsDir => self.ndk_toolchains_dir.display().to_string(),
            OptionKey::NdkToolchainSuffix => self.ndk_toolchain_suffix.clone(),
            OptionKey::PythonSource => self.python_source.display().to_string(),
            OptionKey::BuildDir => self.build_dir.display().to_string(),
            OptionKey::OutputDir => self.output_dir.display().to_string(),
        }
    }
}

/// Load the config file layer.
///
/// An explicit path must exist. Otherwise `andpython.toml` in `cwd` is read
/// if present, and an empty layer is returned if not.
pub fn load_config_layer(explicit: Option<&Path>, cwd: &Path) -> Result<OptionOverrides> {
    match explicit {
        Some(path) => OptionOverrides::load(path),
        None => {
            let path = cwd.join(CONFIG_FILE_NAME);
            if path.is_file() {
                tracing::debug!("loading options from {}", path.display());
                OptionOverrides::load(&path)
            } else {
                Ok(OptionOverrides::default())
            }
        }
    }
}
