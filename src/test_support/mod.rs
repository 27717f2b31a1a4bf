//! Test utilities for andpython unit tests.
//!
//! [`MockRunner`] stands in for the real subprocess runner: it records every
//! command, answers with scripted exit codes, and can create files to mimic
//! the artifacts a real `make install` would leave behind.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut runner = MockRunner::new();
//! runner.fail_on("configure", 1);
//! runner.touch_on("make install", "/tmp/out/bin/python3");
//! ```

pub mod fixtures;

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::process::{CommandRunner, ProcessBuilder};

pub use fixtures::*;

/// A command observed by [`MockRunner`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Command as displayed in logs
    pub command: String,
    /// Working directory
    pub cwd: Option<PathBuf>,
    /// Environment overrides
    pub env: BTreeMap<String, OsString>,
    /// Whether it ran through `sh -c`
    pub shell: bool,
}

impl RecordedCall {
    pub fn env(&self, key: &str) -> Option<String> {
        self.env.get(key).map(|v| v.to_string_lossy().into_owned())
    }
}

/// Side effect applied when a matching command runs.
#[derive(Debug, Clone)]
struct Effect {
    /// Substring the command must contain
    pattern: String,
    /// Path to create, relative paths resolved against the command's cwd
    path: PathBuf,
}

/// Mock command runner.
#[derive(Debug, Default)]
pub struct MockRunner {
    exit_codes: Vec<(String, i32)>,
    effects: Vec<Effect>,
    calls: Vec<RecordedCall>,
}

impl MockRunner {
    /// Create a runner where every command succeeds.
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Make commands containing `pattern` exit with `code`.
    ///
    /// The first matching rule wins.
    pub fn fail_on(&mut self, pattern: &str, code: i32) -> &mut Self {
        self.exit_codes.push((pattern.to_string(), code));
        self
    }

    /// Create `path` whenever a command containing `pattern` succeeds.
    pub fn touch_on(&mut self, pattern: &str, path: impl AsRef<Path>) -> &mut Self {
        self.effects.push(Effect {
            pattern: pattern.to_string(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// All commands run so far.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Displayed command lines run so far.
    pub fn commands(&self) -> Vec<String> {
        self.calls.iter().map(|c| c.command.clone()).collect()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl CommandRunner for MockRunner {
    fn run(&mut self, cmd: &ProcessBuilder) -> Result<i32> {
        let command = cmd.display_command();

        let mut env = BTreeMap::new();
        for key in ["PATH", "LD_LIBRARY_PATH", "CFLAGS", "LDFLAGS"] {
            if let Some(value) = cmd.get_env(key) {
                env.insert(key.to_string(), value.to_os_string());
            }
        }

        self.calls.push(RecordedCall {
            command: command.clone(),
            cwd: cmd.get_cwd().map(Path::to_path_buf),
            env,
            shell: cmd.is_shell(),
        });

        let code = self
            .exit_codes
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, code)| *code)
            .unwrap_or(0);

        if code == 0 {
            for effect in self.effects.iter().filter(|e| command.contains(&e.pattern)) {
                let path = match cmd.get_cwd() {
                    Some(cwd) => cwd.join(&effect.path),
                    None => effect.path.clone(),
                };
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, "")?;
            }
        }

        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_records_and_scripts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut runner = MockRunner::new();
        runner.fail_on("autoconf", 2);
        runner.touch_on("make install", "bin/python3");

        let install = ProcessBuilder::new("make").arg("install").cwd(tmp.path());
        assert_eq!(runner.run(&install).unwrap(), 0);
        assert!(tmp.path().join("bin/python3").is_file());

        assert_eq!(runner.run(&ProcessBuilder::new("autoconf")).unwrap(), 2);
        assert_eq!(runner.commands(), vec!["make install", "autoconf"]);
    }
}
